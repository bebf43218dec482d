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

//! Persistence of the clients of the dealership.

use crate::model::{BirthDate, Client, ClientFilter, ClientId, ClientName, Cpf, NewClient};
#[cfg(feature = "postgres")]
use carshop_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use carshop_core::db::sqlite;
use carshop_core::db::{DbError, DbResult, Executor, expect_one_row};
use futures::TryStreamExt;
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Client {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
        let cpf: String = row.try_get("cpf").map_err(postgres::map_sqlx_error)?;
        let birth_date: time::Date = row.try_get("birth_date").map_err(postgres::map_sqlx_error)?;

        let client = NewClient {
            name: ClientName::new(name)?,
            cpf: Cpf::new(cpf)?,
            birth_date: BirthDate::from_stored(birth_date)?,
        };
        Ok(Client::new(ClientId::new(id), client))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Client {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
        let cpf: String = row.try_get("cpf").map_err(sqlite::map_sqlx_error)?;
        let birth_date: String = row.try_get("birth_date").map_err(sqlite::map_sqlx_error)?;

        let client = NewClient {
            name: ClientName::new(name)?,
            cpf: Cpf::new(cpf)?,
            birth_date: BirthDate::try_from(birth_date)?,
        };
        Ok(Client::new(ClientId::new(id), client))
    }
}

/// Registers a new `client` and returns it with its assigned identifier.
///
/// Fails with `AlreadyExists` if another client has the same CPF.
pub async fn create_client(ex: &mut Executor, client: NewClient) -> DbResult<Client> {
    let id = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str =
                "INSERT INTO clients (name, cpf, birth_date) VALUES ($1, $2, $3) RETURNING id";
            let row = sqlx::query(query_str)
                .bind(client.name.as_str())
                .bind(client.cpf.as_str())
                .bind(client.birth_date.as_date())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get::<i64, _>("id").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "INSERT INTO clients (name, cpf, birth_date) VALUES (?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(client.name.as_str())
                .bind(client.cpf.as_str())
                .bind(client.birth_date.to_string())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.last_insert_rowid()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    Ok(Client::new(ClientId::new(id), client))
}

/// Gets the client identified by `id`.
pub async fn get_client(ex: &mut Executor, id: ClientId) -> DbResult<Client> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let row = sqlx::query("SELECT * FROM clients WHERE id = $1")
                .bind(id.as_i64())
                .fetch_optional(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.ok_or(DbError::NotFound)?.try_into()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let row = sqlx::query("SELECT * FROM clients WHERE id = ?")
                .bind(id.as_i64())
                .fetch_optional(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.ok_or(DbError::NotFound)?.try_into()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets all clients that match `filter`, sorted by name.
pub async fn list_clients(ex: &mut Executor, filter: &ClientFilter) -> DbResult<Vec<Client>> {
    let name = filter.name.as_deref();
    let cpf = filter.cpf.as_ref().map(|p| p.as_str());

    let mut clients = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT * FROM clients
                WHERE
                    ($1::TEXT IS NULL OR STRPOS(LOWER(name), LOWER($1)) > 0)
                    AND ($2::TEXT IS NULL OR cpf LIKE ($2 || '%'))
                ORDER BY name, id
            ";
            let mut rows = sqlx::query(query_str).bind(name).bind(cpf).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                clients.push(Client::try_from(row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT * FROM clients
                WHERE
                    (? IS NULL OR INSTR(LOWER(name), LOWER(?)) > 0)
                    AND (? IS NULL OR cpf LIKE (? || '%'))
                ORDER BY name, id
            ";
            let mut rows =
                sqlx::query(query_str).bind(name).bind(name).bind(cpf).bind(cpf).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                clients.push(Client::try_from(row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(clients)
}

/// Overwrites all the fields of the client identified by `id` with the values in `client`.
pub async fn update_client(ex: &mut Executor, id: ClientId, client: &NewClient) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "UPDATE clients SET name = $1, cpf = $2, birth_date = $3 WHERE id = $4";
            let done = sqlx::query(query_str)
                .bind(client.name.as_str())
                .bind(client.cpf.as_str())
                .bind(client.birth_date.as_date())
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "UPDATE clients SET name = ?, cpf = ?, birth_date = ? WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(client.name.as_str())
                .bind(client.cpf.as_str())
                .bind(client.birth_date.to_string())
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    expect_one_row(rows_affected, "Client update")
}

/// Deletes the client identified by `id`.
pub async fn delete_client(ex: &mut Executor, id: ClientId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM clients WHERE id = $1")
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM clients WHERE id = ?")
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    expect_one_row(rows_affected, "Client deletion")
}
