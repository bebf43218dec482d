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

//! Persistence of the cars in the inventory.

use crate::model::{
    Brand, BrandId, BrandName, Car, CarFilter, CarId, CarStatus, Color, Mileage, ModelId,
    ModelName, NewCar, Price, Quantity, Year,
};
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

/// Implements the conversion of a raw `row_type` into a `Car`, using `map_err` to translate
/// the errors of the backend.
macro_rules! car_from_row [
    ( $row_type:ty, $map_err:path ) => {
        impl TryFrom<$row_type> for Car {
            type Error = DbError;

            fn try_from(row: $row_type) -> DbResult<Self> {
                let id: i64 = row.try_get("id").map_err($map_err)?;
                let brand: String = row.try_get("brand").map_err($map_err)?;
                let model: String = row.try_get("model").map_err($map_err)?;
                let year: i32 = row.try_get("year").map_err($map_err)?;
                let color: String = row.try_get("color").map_err($map_err)?;
                let mileage_km: i32 = row.try_get("mileage_km").map_err($map_err)?;
                let price_cents: i64 = row.try_get("price_cents").map_err($map_err)?;
                let quantity: i32 = row.try_get("quantity").map_err($map_err)?;
                let status: String = row.try_get("status").map_err($map_err)?;
                let brand_id: Option<i64> = row.try_get("brand_id").map_err($map_err)?;
                let model_id: Option<i64> = row.try_get("model_id").map_err($map_err)?;

                let car = NewCar {
                    brand: BrandName::new(brand)?,
                    model: ModelName::new(model)?,
                    year: Year::new(i64::from(year))?,
                    color: Color::new(color)?,
                    mileage_km: Mileage::new(i64::from(mileage_km))?,
                    price: Price::from_cents(price_cents)?,
                    quantity: Quantity::new(i64::from(quantity))?,
                    status: status.parse::<CarStatus>()?,
                    brand_id: brand_id.map(BrandId::new),
                    model_id: model_id.map(ModelId::new),
                };
                Ok(Car::new(CarId::new(id), car))
            }
        }
    }
];

#[cfg(feature = "postgres")]
car_from_row!(PgRow, postgres::map_sqlx_error);

#[cfg(any(feature = "sqlite", test))]
car_from_row!(SqliteRow, sqlite::map_sqlx_error);

/// Adds a new `car` to the inventory and returns it with its assigned identifier.
pub async fn create_car(ex: &mut Executor, car: NewCar) -> DbResult<Car> {
    let id = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO cars
                    (brand, model, year, color, mileage_km, price_cents, quantity, status,
                    brand_id, model_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING id
            ";
            let row = sqlx::query(query_str)
                .bind(car.brand.as_str())
                .bind(car.model.as_str())
                .bind(car.year.as_i32())
                .bind(car.color.as_str())
                .bind(car.mileage_km.as_i32())
                .bind(car.price.as_cents())
                .bind(car.quantity.as_i32())
                .bind(car.status.as_str())
                .bind(car.brand_id.map(BrandId::as_i64))
                .bind(car.model_id.map(ModelId::as_i64))
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get::<i64, _>("id").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO cars
                    (brand, model, year, color, mileage_km, price_cents, quantity, status,
                    brand_id, model_id)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ";
            let done = sqlx::query(query_str)
                .bind(car.brand.as_str())
                .bind(car.model.as_str())
                .bind(car.year.as_i32())
                .bind(car.color.as_str())
                .bind(car.mileage_km.as_i32())
                .bind(car.price.as_cents())
                .bind(car.quantity.as_i32())
                .bind(car.status.as_str())
                .bind(car.brand_id.map(BrandId::as_i64))
                .bind(car.model_id.map(ModelId::as_i64))
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.last_insert_rowid()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    Ok(Car::new(CarId::new(id), car))
}

/// Gets the car identified by `id`.
pub async fn get_car(ex: &mut Executor, id: CarId) -> DbResult<Car> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM cars WHERE id = $1";
            let row = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_optional(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.ok_or(DbError::NotFound)?.try_into()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM cars WHERE id = ?";
            let row = sqlx::query(query_str)
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

/// Gets all cars that match `filter`, newest first.
pub async fn list_cars(ex: &mut Executor, filter: &CarFilter) -> DbResult<Vec<Car>> {
    let brand = filter.brand.as_deref();
    let model = filter.model.as_deref();
    let status = filter.status.map(CarStatus::as_str);

    let mut cars = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT * FROM cars
                WHERE
                    ($1::TEXT IS NULL OR STRPOS(LOWER(brand), LOWER($1)) > 0)
                    AND ($2::TEXT IS NULL OR STRPOS(LOWER(model), LOWER($2)) > 0)
                    AND ($3::TEXT IS NULL OR status = $3)
                ORDER BY id DESC
            ";
            let mut rows =
                sqlx::query(query_str).bind(brand).bind(model).bind(status).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                cars.push(Car::try_from(row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT * FROM cars
                WHERE
                    (? IS NULL OR INSTR(LOWER(brand), LOWER(?)) > 0)
                    AND (? IS NULL OR INSTR(LOWER(model), LOWER(?)) > 0)
                    AND (? IS NULL OR status = ?)
                ORDER BY id DESC
            ";
            let mut rows = sqlx::query(query_str)
                .bind(brand)
                .bind(brand)
                .bind(model)
                .bind(model)
                .bind(status)
                .bind(status)
                .fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                cars.push(Car::try_from(row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(cars)
}

/// Overwrites all the fields of the car identified by `id` with the values in `car`.
pub async fn update_car(ex: &mut Executor, id: CarId, car: &NewCar) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE cars SET
                    brand = $1, model = $2, year = $3, color = $4, mileage_km = $5,
                    price_cents = $6, quantity = $7, status = $8, brand_id = $9, model_id = $10
                WHERE id = $11
            ";
            let done = sqlx::query(query_str)
                .bind(car.brand.as_str())
                .bind(car.model.as_str())
                .bind(car.year.as_i32())
                .bind(car.color.as_str())
                .bind(car.mileage_km.as_i32())
                .bind(car.price.as_cents())
                .bind(car.quantity.as_i32())
                .bind(car.status.as_str())
                .bind(car.brand_id.map(BrandId::as_i64))
                .bind(car.model_id.map(ModelId::as_i64))
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE cars SET
                    brand = ?, model = ?, year = ?, color = ?, mileage_km = ?,
                    price_cents = ?, quantity = ?, status = ?, brand_id = ?, model_id = ?
                WHERE id = ?
            ";
            let done = sqlx::query(query_str)
                .bind(car.brand.as_str())
                .bind(car.model.as_str())
                .bind(car.year.as_i32())
                .bind(car.color.as_str())
                .bind(car.mileage_km.as_i32())
                .bind(car.price.as_cents())
                .bind(car.quantity.as_i32())
                .bind(car.status.as_str())
                .bind(car.brand_id.map(BrandId::as_i64))
                .bind(car.model_id.map(ModelId::as_i64))
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    expect_one_row(rows_affected, "Car update")
}

/// Moves all cars that reference the model `model_id` to `brand`, updating both the catalog
/// reference and the brand name.  Returns the number of affected cars.
pub async fn rebrand_cars_of_model(
    ex: &mut Executor,
    model_id: ModelId,
    brand: &Brand,
) -> DbResult<u64> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let done = sqlx::query("UPDATE cars SET brand = $1, brand_id = $2 WHERE model_id = $3")
                .bind(brand.name().as_str())
                .bind(brand.id().as_i64())
                .bind(model_id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query("UPDATE cars SET brand = ?, brand_id = ? WHERE model_id = ?")
                .bind(brand.name().as_str())
                .bind(brand.id().as_i64())
                .bind(model_id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    Ok(rows_affected)
}

/// Deletes the car identified by `id`.
pub async fn delete_car(ex: &mut Executor, id: CarId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM cars WHERE id = $1")
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM cars WHERE id = ?")
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    expect_one_row(rows_affected, "Car deletion")
}
