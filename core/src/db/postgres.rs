// CarShop
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Common utilities to interact with a PostgreSQL database.
//!
//! Besides the connection pool, this module knows how to provision the database on startup: the
//! target database is created if it does not exist yet, and so is the schema that holds the
//! service's tables.  All pooled connections use that schema as their `search_path`.

use crate::db::{Db, DbError, DbResult, Executor, TxExecutor, split_statements};
use crate::env::get_optional_var;
use async_trait::async_trait;
use derivative::Derivative;
use futures::Future;
use log::{info, warn};
use sqlx::pool::PoolConnection;
use sqlx::postgres::{
    PgConnectOptions, PgConnection, PgDatabaseError, PgPool, PgPoolOptions, Postgres,
};
use sqlx::{Connection, Transaction};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Default value for the `max_retries` configuration property.
const DEFAULT_MAX_RETRIES: u16 = 60;

/// Default value for the `url` configuration property.
const DEFAULT_URL: &str = "postgres://postgres@localhost:5432/carshop";

/// Default value for the `schema` configuration property.
const DEFAULT_SCHEMA: &str = "carshop";

/// Name of the maintenance database that always exists and that we connect to in order to create
/// the target database.
const MAINTENANCE_DATABASE: &str = "postgres";

/// Takes a raw SQLx error `e` and converts it to our generic error type.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::Database(e) => match e.downcast_ref::<PgDatabaseError>().code() {
            "23503" /* foreign_key_violation */ => DbError::NotFound,
            "23505" /* unique_violation */ => DbError::AlreadyExists,
            "53300" /* too_many_connections */ => DbError::Unavailable,
            "57P03" /* cannot_connect_now */ => DbError::Unavailable,
            number => DbError::BackendError(format!("pgsql error {}: {}", number, e)),
        },
        sqlx::Error::Io(_) => DbError::Unavailable,
        sqlx::Error::PoolTimedOut => DbError::Unavailable,
        sqlx::Error::RowNotFound => DbError::NotFound,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Quotes `name` so that it can be used as an SQL identifier.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Validates that `schema` is a plain identifier: ASCII letters, digits and underscores, not
/// starting with a digit.
fn validate_schema_name(schema: &str) -> Result<(), String> {
    let mut chars = schema.chars();
    match chars.next() {
        Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => (),
        _ => return Err(format!("Invalid schema name '{}'", schema)),
    }
    if !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Err(format!("Invalid schema name '{}'", schema));
    }
    Ok(())
}

/// Options to establish a connection to a PostgreSQL database.
#[derive(Derivative)]
#[derivative(Debug)]
#[cfg_attr(test, derivative(PartialEq))]
pub struct PostgresOptions {
    /// Connection string, which must name the target database.  Ignored in debug output as it
    /// may contain the password.
    #[derivative(Debug = "ignore")]
    pub url: Url,

    /// Schema to create the tables in.
    pub schema: String,

    /// Minimum number of connections to keep open against the database.
    pub min_connections: Option<u32>,

    /// Maximum number of connections to allow against the database.
    pub max_connections: Option<u32>,

    /// Maximum number of attempts to retry a connection operation when the database does not seem
    /// to be available.
    pub max_retries: u16,
}

impl PostgresOptions {
    /// Initializes a set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_URL`, `<prefix>_SCHEMA`,
    /// `<prefix>_MIN_CONNECTIONS`, `<prefix>_MAX_CONNECTIONS` and `<prefix>_MAX_RETRIES`.  All
    /// of them are optional.
    pub fn from_env(prefix: &str) -> Result<PostgresOptions, String> {
        let url = match get_optional_var::<Url>(prefix, "URL")? {
            Some(url) => url,
            None => Url::parse(DEFAULT_URL).map_err(|e| e.to_string())?,
        };
        match url.scheme() {
            "postgres" | "postgresql" => (),
            scheme => {
                return Err(format!(
                    "{}_URL must point to a PostgreSQL database but has scheme {}",
                    prefix, scheme
                ));
            }
        }

        let schema = get_optional_var::<String>(prefix, "SCHEMA")?
            .unwrap_or_else(|| DEFAULT_SCHEMA.to_owned());
        validate_schema_name(&schema)?;

        let opts = PostgresOptions {
            url,
            schema,
            min_connections: get_optional_var::<u32>(prefix, "MIN_CONNECTIONS")?,
            max_connections: get_optional_var::<u32>(prefix, "MAX_CONNECTIONS")?,
            max_retries: get_optional_var::<u16>(prefix, "MAX_RETRIES")?
                .unwrap_or(DEFAULT_MAX_RETRIES),
        };
        if opts.database().is_empty() {
            return Err(format!("{}_URL must name a database", prefix));
        }
        Ok(opts)
    }

    /// Returns the name of the target database as given in the connection string.
    pub fn database(&self) -> &str {
        self.url.path().trim_start_matches('/')
    }

    /// Computes the connection options to the target database.
    fn connect_options(&self) -> DbResult<PgConnectOptions> {
        PgConnectOptions::from_str(self.url.as_str()).map_err(map_sqlx_error)
    }
}

/// A generic database executor implementation for PostgreSQL.
#[derive(Debug)]
pub enum PostgresExecutor {
    /// An executor backed by a connection.
    PoolExec(PoolConnection<Postgres>),

    /// An executor backed by a transaction.
    TxExec(Transaction<'static, Postgres>),
}

impl PostgresExecutor {
    /// Returns the raw connection to issue `sqlx` queries against.
    pub fn conn(&mut self) -> &mut PgConnection {
        match self {
            PostgresExecutor::PoolExec(conn) => &mut **conn,
            PostgresExecutor::TxExec(tx) => &mut **tx,
        }
    }

    /// Commits the transaction if this executor is backed by one.
    ///
    /// Calling this on a non-transaction-based executor results in a panic.
    pub(super) async fn commit(self) -> DbResult<()> {
        match self {
            PostgresExecutor::PoolExec(_) => unreachable!("Do not call commit on direct executors"),
            PostgresExecutor::TxExec(tx) => tx.commit().await.map_err(map_sqlx_error),
        }
    }
}

/// Retries a database operation up to `retries` times.
async fn retry<Op, OpFut, T>(op: Op, mut retries: u16) -> DbResult<T>
where
    Op: Fn() -> OpFut,
    OpFut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut delay = Duration::from_millis(100 + u64::from(rand::random::<u16>() % 900));
    loop {
        match op().await.map_err(map_sqlx_error) {
            Ok(result) => return Ok(result),
            Err(DbError::Unavailable) => {
                if retries == 0 {
                    return Err(DbError::Unavailable);
                }
                retries -= 1;

                warn!(
                    "Database is unavailable; waiting {}ms before retrying with {} attempts left",
                    delay.as_millis(),
                    retries
                );

                tokio::time::sleep(delay).await;
                if delay < Duration::from_secs(5) {
                    delay += Duration::from_millis(u64::from(rand::random::<u16>() % 1000));
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// Creates the database named in `opts` if it does not exist yet.
///
/// This connects to the maintenance database of the server with the same credentials, so the
/// configured user must be allowed to create databases if the target one is missing.
pub async fn ensure_database(opts: &PostgresOptions) -> DbResult<()> {
    let target = opts.database().to_owned();
    let admin_options = opts.connect_options()?.database(MAINTENANCE_DATABASE);
    let admin_options = &admin_options;

    let mut conn =
        retry(move || PgConnection::connect_with(admin_options), opts.max_retries).await?;

    let exists = sqlx::query("SELECT 1 FROM pg_database WHERE datname = $1")
        .bind(&target)
        .fetch_optional(&mut conn)
        .await
        .map_err(map_sqlx_error)?
        .is_some();
    if !exists {
        info!("Creating database {}", target);
        let query_str = format!("CREATE DATABASE {}", quote_ident(&target));
        sqlx::query(&query_str).execute(&mut conn).await.map_err(map_sqlx_error)?;
    }

    conn.close().await.map_err(map_sqlx_error)
}

/// Shareable connection across transactions and `PostgresDb` types.
pub struct PostgresDb {
    /// Shared PostgreSQL connection pool.  This is a cloneable type that all concurrent
    /// transactions can use it concurrently.
    pool: PgPool,

    /// Schema that all connections in the pool use as their search path.
    schema: String,

    /// Maximum number of attempts to retry a connection operation when the database does not seem
    /// to be available.
    max_retries: u16,
}

impl Drop for PostgresDb {
    fn drop(&mut self) {
        if !self.pool.is_closed() {
            warn!("Dropping connection without having called close() first");
        }
    }
}

impl PostgresDb {
    /// Creates a new connection based on a set of options.
    ///
    /// Note that this does *not* establish the connection.
    pub fn connect(opts: PostgresOptions) -> DbResult<Self> {
        let mut pool_options = PgPoolOptions::new();
        if let Some(min_connections) = opts.min_connections {
            pool_options = pool_options.min_connections(min_connections);
        }
        if let Some(max_connections) = opts.max_connections {
            pool_options = pool_options.max_connections(max_connections);
        }
        pool_options = pool_options.acquire_timeout(Duration::from_secs(2));

        let options =
            opts.connect_options()?.options([("search_path", opts.schema.as_str())]);

        let pool = pool_options.connect_lazy_with(options);
        Ok(Self { pool, schema: opts.schema, max_retries: opts.max_retries })
    }

    /// Creates the schema configured for this database if it does not exist yet.
    pub async fn ensure_schema(&self) -> DbResult<()> {
        let mut ex = self.typed_ex().await?;
        info!("Ensuring schema {} exists", self.schema);
        let query_str = format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(&self.schema));
        sqlx::query(&query_str).execute(ex.conn()).await.map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Returns an executor of the specific type used by this database.
    pub async fn typed_ex(&self) -> DbResult<PostgresExecutor> {
        let conn = retry(|| self.pool.acquire(), self.max_retries).await?;
        Ok(PostgresExecutor::PoolExec(conn))
    }
}

#[async_trait]
impl Db for PostgresDb {
    async fn ex(&self) -> DbResult<Executor> {
        let ex = self.typed_ex().await?;
        Ok(Executor::Postgres(ex))
    }

    async fn begin(&self) -> DbResult<TxExecutor> {
        let tx = retry(|| self.pool.begin(), self.max_retries).await?;
        Ok(TxExecutor(Executor::Postgres(PostgresExecutor::TxExec(tx))))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Helper function to initialize the database with a schema.
pub async fn run_schema(e: &mut PostgresExecutor, schema: &str) -> DbResult<()> {
    for query_str in split_statements(schema) {
        sqlx::query(&query_str).execute(e.conn()).await.map_err(map_sqlx_error)?;
    }
    Ok(())
}

/// Test utilities for the PostgreSQL connection.
#[cfg(any(feature = "testutils", test))]
pub mod testutils {
    use super::*;

    /// Creates a new connection to the test database and initializes it.
    ///
    /// This sets up the database to use the `pg_temp` schema by default so that any tables
    /// created during the test are deleted at disconnection time.  Note that for this to work,
    /// the connection pool must maintain a single connection open at all times, but not more.
    ///
    /// Given that this is for testing purposes only, any errors will panic.
    pub async fn setup() -> PostgresDb {
        let _can_fail = env_logger::builder().is_test(true).try_init();

        let mut opts = PostgresOptions::from_env("PGSQL_TEST").unwrap();
        opts.min_connections = Some(1);
        opts.max_connections = Some(1);
        let db = PostgresDb::connect(opts).unwrap();

        let mut ex = db.typed_ex().await.unwrap();
        sqlx::query("SET search_path TO pg_temp").execute(ex.conn()).await.unwrap();
        db
    }
}
