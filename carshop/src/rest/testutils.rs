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

//! Test utilities for the REST API.

use crate::db;
use crate::driver;
use crate::model::*;
use crate::rest::app;
use axum::Router;
use carshop_core::db::DbError;

/// State of a running test.
pub(crate) struct TestContext {
    /// Context of the driver that backs the app.
    inner: driver::testutils::TestContext,

    /// The app under test.
    app: Router,
}

impl TestContext {
    /// Initializes the app on top of an in-memory database.
    pub(crate) async fn setup() -> Self {
        let inner = driver::testutils::TestContext::setup().await;
        let app = app(inner.driver());
        Self { inner, app }
    }

    /// Gets a clone of the app router.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and transforms it into the app router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Inserts a car with the mandatory fields only.
    pub(crate) async fn create_car(&self, brand: &'static str, model: &'static str) -> Car {
        self.inner.create_car(brand, model).await
    }

    /// Inserts a client born on 1990-01-31.
    pub(crate) async fn create_client(&self, name: &'static str, cpf: &'static str) -> Client {
        self.inner.create_client(name, cpf).await
    }

    /// Inserts a brand.
    pub(crate) async fn create_brand(&self, name: &'static str) -> Brand {
        self.inner.create_brand(name).await
    }

    /// Inserts a model of `brand`.
    pub(crate) async fn create_model(&self, brand: &Brand, name: &'static str) -> Model {
        self.inner.create_model(brand, name).await
    }

    /// Gets the car `id` from the database, if it exists.
    pub(crate) async fn get_car(&self, id: CarId) -> Option<Car> {
        match db::get_car(&mut self.inner.ex().await, id).await {
            Ok(car) => Some(car),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }

    /// Gets the client `id` from the database, if it exists.
    pub(crate) async fn get_client(&self, id: ClientId) -> Option<Client> {
        match db::get_client(&mut self.inner.ex().await, id).await {
            Ok(client) => Some(client),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }

    /// Gets the brand `id` from the database, if it exists.
    pub(crate) async fn get_brand(&self, id: BrandId) -> Option<Brand> {
        match db::get_brand(&mut self.inner.ex().await, id).await {
            Ok(brand) => Some(brand),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }

    /// Gets the model `id` from the database, if it exists.
    pub(crate) async fn get_model(&self, id: ModelId) -> Option<Model> {
        match db::get_model(&mut self.inner.ex().await, id).await {
            Ok(model) => Some(model),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }
}
