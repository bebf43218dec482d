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

//! Persistence of the car models in the catalog.

use crate::model::{BrandId, Model, ModelFilter, ModelId, ModelName, NewModel};
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

/// Implements the conversion of a raw `row_type` into a `Model`.
macro_rules! model_from_row [
    ( $row_type:ty, $map_err:path ) => {
        impl TryFrom<$row_type> for Model {
            type Error = DbError;

            fn try_from(row: $row_type) -> DbResult<Self> {
                let id: i64 = row.try_get("id").map_err($map_err)?;
                let brand_id: i64 = row.try_get("brand_id").map_err($map_err)?;
                let name: String = row.try_get("name").map_err($map_err)?;

                let model = NewModel { brand_id: BrandId::new(brand_id), name: ModelName::new(name)? };
                Ok(Model::new(ModelId::new(id), model))
            }
        }
    }
];

#[cfg(feature = "postgres")]
model_from_row!(PgRow, postgres::map_sqlx_error);

#[cfg(any(feature = "sqlite", test))]
model_from_row!(SqliteRow, sqlite::map_sqlx_error);

/// Adds a new `model` to the catalog.
///
/// Fails with `NotFound` if the brand of the model does not exist.
pub async fn create_model(ex: &mut Executor, model: NewModel) -> DbResult<Model> {
    let id = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let row = sqlx::query("INSERT INTO models (brand_id, name) VALUES ($1, $2) RETURNING id")
                .bind(model.brand_id.as_i64())
                .bind(model.name.as_str())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get::<i64, _>("id").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query("INSERT INTO models (brand_id, name) VALUES (?, ?)")
                .bind(model.brand_id.as_i64())
                .bind(model.name.as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.last_insert_rowid()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    Ok(Model::new(ModelId::new(id), model))
}

/// Gets the model identified by `id`.
pub async fn get_model(ex: &mut Executor, id: ModelId) -> DbResult<Model> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let row = sqlx::query("SELECT * FROM models WHERE id = $1")
                .bind(id.as_i64())
                .fetch_optional(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.ok_or(DbError::NotFound)?.try_into()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let row = sqlx::query("SELECT * FROM models WHERE id = ?")
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

/// Gets all models that match `filter`, sorted by name.
pub async fn list_models(ex: &mut Executor, filter: &ModelFilter) -> DbResult<Vec<Model>> {
    let brand_id = filter.brand_id.map(BrandId::as_i64);
    let name = filter.name.as_deref();

    let mut models = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT * FROM models
                WHERE
                    ($1::BIGINT IS NULL OR brand_id = $1)
                    AND ($2::TEXT IS NULL OR STRPOS(LOWER(name), LOWER($2)) > 0)
                ORDER BY name, id
            ";
            let mut rows = sqlx::query(query_str).bind(brand_id).bind(name).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                models.push(Model::try_from(row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT * FROM models
                WHERE
                    (? IS NULL OR brand_id = ?)
                    AND (? IS NULL OR INSTR(LOWER(name), LOWER(?)) > 0)
                ORDER BY name, id
            ";
            let mut rows = sqlx::query(query_str)
                .bind(brand_id)
                .bind(brand_id)
                .bind(name)
                .bind(name)
                .fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                models.push(Model::try_from(row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(models)
}

/// Overwrites all the fields of the model identified by `id` with the values in `model`.
pub async fn update_model(ex: &mut Executor, id: ModelId, model: &NewModel) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let done = sqlx::query("UPDATE models SET brand_id = $1, name = $2 WHERE id = $3")
                .bind(model.brand_id.as_i64())
                .bind(model.name.as_str())
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query("UPDATE models SET brand_id = ?, name = ? WHERE id = ?")
                .bind(model.brand_id.as_i64())
                .bind(model.name.as_str())
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    expect_one_row(rows_affected, "Model update")
}

/// Deletes the model identified by `id`.  Cars that referenced it lose the reference.
pub async fn delete_model(ex: &mut Executor, id: ModelId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM models WHERE id = $1")
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM models WHERE id = ?")
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    expect_one_row(rows_affected, "Model deletion")
}
