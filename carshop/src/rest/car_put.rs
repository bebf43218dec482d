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

//! API to modify a car.

use crate::driver::Driver;
use crate::model::*;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use carshop_core::model::ModelError;
use carshop_core::rest::{Payload, RestError, blank_as_none};
use serde::{Deserialize, Serialize};

/// Message sent to the server to modify a car.  Fields that are not present are left untouched.
#[derive(Default, Deserialize, Serialize)]
pub(crate) struct CarUpdateRequest {
    /// New brand.
    #[serde(default)]
    pub(crate) brand: Option<String>,

    /// New model.
    #[serde(default)]
    pub(crate) model: Option<String>,

    /// New manufacturing year.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub(crate) year: Option<i64>,

    /// New color.
    #[serde(default)]
    pub(crate) color: Option<String>,

    /// New odometer reading.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub(crate) mileage_km: Option<i64>,

    /// New price.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub(crate) price: Option<f64>,

    /// New quantity.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub(crate) quantity: Option<i64>,

    /// New status.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub(crate) status: Option<String>,

    /// New brand in the catalog.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub(crate) brand_id: Option<i64>,

    /// New model in the catalog.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub(crate) model_id: Option<i64>,
}

impl TryFrom<CarUpdateRequest> for CarUpdate {
    type Error = ModelError;

    fn try_from(request: CarUpdateRequest) -> Result<Self, Self::Error> {
        Ok(CarUpdate {
            brand: request.brand.map(BrandName::new).transpose()?,
            model: request.model.map(ModelName::new).transpose()?,
            year: request.year.map(Year::new).transpose()?,
            color: request.color.map(Color::new).transpose()?,
            mileage_km: request.mileage_km.map(Mileage::new).transpose()?,
            price: request.price.map(Price::from_f64).transpose()?,
            quantity: request.quantity.map(Quantity::new).transpose()?,
            status: request.status.map(|s| s.parse()).transpose()?,
            brand_id: request.brand_id.map(BrandId::new),
            model_id: request.model_id.map(ModelId::new),
        })
    }
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    Payload(request): Payload<CarUpdateRequest>,
) -> Result<impl IntoResponse, RestError> {
    let car = driver.update_car(CarId::new(id), CarUpdate::try_from(request)?).await?;

    Ok(Json(car))
}
