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

//! Operations on the cars of the inventory.

use crate::db;
use crate::driver::{Driver, not_found};
use crate::model::*;
use carshop_core::db::TxExecutor;
use carshop_core::driver::{DriverError, DriverResult};

/// Validates the catalog references of `car` within `tx`.
///
/// If the car names a model but no brand, the brand is taken from the model.  If it names both,
/// the model must belong to the brand.
async fn resolve_catalog(tx: &mut TxExecutor, mut car: NewCar) -> DriverResult<NewCar> {
    if let Some(model_id) = car.model_id {
        let model = db::get_model(tx.ex(), model_id)
            .await
            .map_err(|e| not_found(e, "Model", model_id))?;
        match car.brand_id {
            None => car.brand_id = Some(*model.brand_id()),
            Some(brand_id) if brand_id != *model.brand_id() => {
                return Err(DriverError::InvalidInput(format!(
                    "Model {} does not belong to brand {}",
                    model_id, brand_id
                )));
            }
            Some(_) => (),
        }
    }

    if let Some(brand_id) = car.brand_id {
        db::get_brand(tx.ex(), brand_id).await.map_err(|e| not_found(e, "Brand", brand_id))?;
    }

    Ok(car)
}

impl Driver {
    /// Adds a new `car` to the inventory.
    pub(crate) async fn create_car(self, car: NewCar) -> DriverResult<Car> {
        let mut tx = self.db.begin().await?;
        let car = resolve_catalog(&mut tx, car).await?;
        let car = db::create_car(tx.ex(), car).await?;
        tx.commit().await?;
        Ok(car)
    }

    /// Gets the car identified by `id`.
    pub(crate) async fn get_car(self, id: CarId) -> DriverResult<Car> {
        let mut tx = self.db.begin().await?;
        let car = db::get_car(tx.ex(), id).await.map_err(|e| not_found(e, "Car", id))?;
        tx.commit().await?;
        Ok(car)
    }

    /// Gets all cars that match `filter`, newest first.
    pub(crate) async fn list_cars(self, filter: CarFilter) -> DriverResult<Vec<Car>> {
        let mut tx = self.db.begin().await?;
        let cars = db::list_cars(tx.ex(), &filter).await?;
        tx.commit().await?;
        Ok(cars)
    }

    /// Modifies the fields of the car identified by `id` that are present in `update`.
    pub(crate) async fn update_car(self, id: CarId, update: CarUpdate) -> DriverResult<Car> {
        let mut tx = self.db.begin().await?;
        let (_, car) =
            db::get_car(tx.ex(), id).await.map_err(|e| not_found(e, "Car", id))?.into_parts();

        let car = car.apply(update);
        let car = resolve_catalog(&mut tx, car).await?;
        db::update_car(tx.ex(), id, &car).await?;

        tx.commit().await?;
        Ok(Car::new(id, car))
    }

    /// Deletes the car identified by `id`.
    pub(crate) async fn delete_car(self, id: CarId) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        db::delete_car(tx.ex(), id).await.map_err(|e| not_found(e, "Car", id))?;
        tx.commit().await?;
        Ok(())
    }
}
