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

//! Test utilities for the business layer.

use crate::db;
use crate::driver::Driver;
use crate::model::*;
use carshop_core::clocks::testutils::SettableClock;
use carshop_core::db::{Db, Executor};
use std::sync::Arc;
use time::macros::{date, datetime};

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the driver.
    db: Arc<dyn Db + Send + Sync>,

    /// The clock backing the driver, pinned to a known date.
    clock: Arc<SettableClock>,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes the driver using an in-memory database and a clock set to 2024-06-15.
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::new(carshop_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let clock = Arc::new(SettableClock::new(datetime!(2024-06-15 12:00:00 UTC)));
        let driver = Driver::new(db.clone(), clock.clone());
        Self { db, clock, driver }
    }

    /// Gets a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Gets the clock used by the driver.
    pub(crate) fn clock(&self) -> &SettableClock {
        &self.clock
    }

    /// Gets a copy of the driver in this test context.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Syntactic sugar to insert a car with the mandatory fields only.
    pub(crate) async fn create_car(&self, brand: &'static str, model: &'static str) -> Car {
        let car = NewCar::new(
            BrandName::from(brand),
            ModelName::from(model),
            Year::new(2015).unwrap(),
            Price::from_cents(5_000_000).unwrap(),
        );
        db::create_car(&mut self.ex().await, car).await.unwrap()
    }

    /// Syntactic sugar to insert a client born on 1990-01-31.
    pub(crate) async fn create_client(&self, name: &'static str, cpf: &'static str) -> Client {
        let client = NewClient {
            name: ClientName::from(name),
            cpf: Cpf::from(cpf),
            birth_date: BirthDate::from_stored(date!(1990 - 01 - 31)).unwrap(),
        };
        db::create_client(&mut self.ex().await, client).await.unwrap()
    }

    /// Syntactic sugar to insert a brand.
    pub(crate) async fn create_brand(&self, name: &'static str) -> Brand {
        db::create_brand(&mut self.ex().await, BrandName::from(name)).await.unwrap()
    }

    /// Syntactic sugar to insert a model of `brand`.
    pub(crate) async fn create_model(&self, brand: &Brand, name: &'static str) -> Model {
        let model = NewModel { brand_id: *brand.id(), name: ModelName::from(name) };
        db::create_model(&mut self.ex().await, model).await.unwrap()
    }
}
