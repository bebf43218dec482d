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

//! API to add a car to the inventory.

use crate::driver::Driver;
use crate::model::*;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Json, http};
use carshop_core::model::ModelError;
use carshop_core::rest::{Payload, RestError, blank_as_none};
use serde::{Deserialize, Serialize};

/// Message sent to the server to add a car.
///
/// Only the brand, model, year and price are mandatory.
#[derive(Deserialize, Serialize)]
pub(crate) struct CarRequest {
    /// Brand of the car.
    pub(crate) brand: String,

    /// Model of the car.
    pub(crate) model: String,

    /// Manufacturing year.
    pub(crate) year: i64,

    /// Color of the car.
    #[serde(default)]
    pub(crate) color: Option<String>,

    /// Odometer reading in kilometers.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub(crate) mileage_km: Option<i64>,

    /// Asking price.
    pub(crate) price: f64,

    /// Number of units in stock.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub(crate) quantity: Option<i64>,

    /// Status of the car, `Active` if not given.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub(crate) status: Option<String>,

    /// Brand in the catalog.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub(crate) brand_id: Option<i64>,

    /// Model in the catalog.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub(crate) model_id: Option<i64>,
}

impl TryFrom<CarRequest> for NewCar {
    type Error = ModelError;

    fn try_from(request: CarRequest) -> Result<Self, Self::Error> {
        let mut car = NewCar::new(
            BrandName::new(request.brand)?,
            ModelName::new(request.model)?,
            Year::new(request.year)?,
            Price::from_f64(request.price)?,
        );
        if let Some(color) = request.color {
            car.color = Color::new(color)?;
        }
        if let Some(mileage_km) = request.mileage_km {
            car.mileage_km = Mileage::new(mileage_km)?;
        }
        if let Some(quantity) = request.quantity {
            car.quantity = Quantity::new(quantity)?;
        }
        if let Some(status) = request.status {
            car.status = status.parse()?;
        }
        car.brand_id = request.brand_id.map(BrandId::new);
        car.model_id = request.model_id.map(ModelId::new);
        Ok(car)
    }
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Payload(request): Payload<CarRequest>,
) -> Result<impl IntoResponse, RestError> {
    let car = driver.create_car(NewCar::try_from(request)?).await?;

    Ok((http::StatusCode::CREATED, Json(car)))
}
