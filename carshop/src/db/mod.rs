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

//! Database abstraction for the inventory of the dealership.
//!
//! Every operation is a free function that takes an `Executor`, which can be backed by a pool or
//! by an open transaction.  The driver layer decides which one to use.

#[cfg(feature = "postgres")]
use carshop_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use carshop_core::db::sqlite;
use carshop_core::db::{DbResult, Executor};

mod brands;
pub use brands::{create_brand, delete_brand, get_brand, list_brands, update_brand};
mod cars;
pub use cars::{create_car, delete_car, get_car, list_cars, rebrand_cars_of_model, update_car};
mod clients;
pub use clients::{create_client, delete_client, get_client, list_clients, update_client};
mod models;
pub use models::{create_model, delete_model, get_model, list_models, update_model};

/// Initializes the database schema.
///
/// This is idempotent: tables that already exist are left untouched.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}
