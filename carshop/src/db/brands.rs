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

//! Persistence of the brands in the catalog.

use crate::model::{Brand, BrandFilter, BrandId, BrandName};
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

/// Implements the conversion of a raw `row_type` into a `Brand`.
macro_rules! brand_from_row [
    ( $row_type:ty, $map_err:path ) => {
        impl TryFrom<$row_type> for Brand {
            type Error = DbError;

            fn try_from(row: $row_type) -> DbResult<Self> {
                let id: i64 = row.try_get("id").map_err($map_err)?;
                let name: String = row.try_get("name").map_err($map_err)?;
                Ok(Brand::new(BrandId::new(id), BrandName::new(name)?))
            }
        }
    }
];

#[cfg(feature = "postgres")]
brand_from_row!(PgRow, postgres::map_sqlx_error);

#[cfg(any(feature = "sqlite", test))]
brand_from_row!(SqliteRow, sqlite::map_sqlx_error);

/// Adds a brand named `name` to the catalog.
///
/// Fails with `AlreadyExists` if the name is taken.
pub async fn create_brand(ex: &mut Executor, name: BrandName) -> DbResult<Brand> {
    let id = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let row = sqlx::query("INSERT INTO brands (name) VALUES ($1) RETURNING id")
                .bind(name.as_str())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get::<i64, _>("id").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query("INSERT INTO brands (name) VALUES (?)")
                .bind(name.as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.last_insert_rowid()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    Ok(Brand::new(BrandId::new(id), name))
}

/// Gets the brand identified by `id`.
pub async fn get_brand(ex: &mut Executor, id: BrandId) -> DbResult<Brand> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let row = sqlx::query("SELECT * FROM brands WHERE id = $1")
                .bind(id.as_i64())
                .fetch_optional(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.ok_or(DbError::NotFound)?.try_into()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let row = sqlx::query("SELECT * FROM brands WHERE id = ?")
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

/// Gets all brands that match `filter`, sorted by name.
pub async fn list_brands(ex: &mut Executor, filter: &BrandFilter) -> DbResult<Vec<Brand>> {
    let name = filter.name.as_deref();

    let mut brands = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT * FROM brands
                WHERE $1::TEXT IS NULL OR STRPOS(LOWER(name), LOWER($1)) > 0
                ORDER BY name, id
            ";
            let mut rows = sqlx::query(query_str).bind(name).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                brands.push(Brand::try_from(row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT * FROM brands
                WHERE ? IS NULL OR INSTR(LOWER(name), LOWER(?)) > 0
                ORDER BY name, id
            ";
            let mut rows = sqlx::query(query_str).bind(name).bind(name).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                brands.push(Brand::try_from(row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(brands)
}

/// Renames the brand identified by `id` to `name`.
pub async fn update_brand(ex: &mut Executor, id: BrandId, name: &BrandName) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let done = sqlx::query("UPDATE brands SET name = $1 WHERE id = $2")
                .bind(name.as_str())
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query("UPDATE brands SET name = ? WHERE id = ?")
                .bind(name.as_str())
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    expect_one_row(rows_affected, "Brand update")
}

/// Deletes the brand identified by `id`.
///
/// The models of the brand are deleted as well, and any cars that referenced the brand or its
/// models lose those references.
pub async fn delete_brand(ex: &mut Executor, id: BrandId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM brands WHERE id = $1")
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM brands WHERE id = ?")
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    expect_one_row(rows_affected, "Brand deletion")
}
