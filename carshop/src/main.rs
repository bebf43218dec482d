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

//! Entry point to the CarShop service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use carshop::db::init_schema;
use carshop::serve;
use carshop_core::db::Db;
use carshop_core::db::postgres::{PostgresDb, PostgresOptions, ensure_database};
use carshop_core::env::get_optional_var;
use std::error::Error;
use std::net::Ipv4Addr;
use std::process;
use std::sync::Arc;

/// Prefix of the environment variables that configure the database connection.
const DB_ENV_PREFIX: &str = "DATABASE";

/// Port to listen on when `CARSHOP_PORT` is not set.
const DEFAULT_PORT: u16 = 8000;

/// Provisions the database and serves the application until termination.
async fn run() -> Result<(), Box<dyn Error>> {
    let port = get_optional_var::<u16>("CARSHOP", "PORT")?.unwrap_or(DEFAULT_PORT);
    let addr = (Ipv4Addr::LOCALHOST, port);

    let db_opts = PostgresOptions::from_env(DB_ENV_PREFIX)?;
    ensure_database(&db_opts).await?;

    let db = Arc::new(PostgresDb::connect(db_opts)?);
    db.ensure_schema().await?;
    init_schema(&mut db.ex().await?).await?;

    let result = serve(addr, db.clone()).await;
    db.close().await;
    result
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        log::error!("{}", e);
        process::exit(1);
    }
}
