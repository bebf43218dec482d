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

//! API to list the cars in the inventory.

use crate::driver::Driver;
use crate::model::{CarFilter, CarStatus};
use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use carshop_core::rest::{EmptyBody, RestError};
use serde::Deserialize;

/// Filters accepted in the query string.
#[derive(Deserialize)]
pub(crate) struct CarsQuery {
    /// Case-insensitive substring to look for in the brand.
    brand: Option<String>,

    /// Case-insensitive substring to look for in the model.
    model: Option<String>,

    /// Status to match.  Blank means any.
    status: Option<String>,
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Query(query): Query<CarsQuery>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(status) => Some(status.parse::<CarStatus>()?),
    };
    let filter = CarFilter::new(query.brand, query.model, status);

    let cars = driver.list_cars(filter).await?;

    Ok(Json(cars))
}
