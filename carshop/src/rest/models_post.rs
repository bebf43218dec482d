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

//! API to add a model to the catalog.

use crate::driver::Driver;
use crate::model::{BrandId, ModelName, NewModel};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Json, http};
use carshop_core::rest::{Payload, RestError};
use serde::{Deserialize, Serialize};

/// Message sent to the server to create a model.
#[derive(Deserialize, Serialize)]
pub(crate) struct ModelRequest {
    /// Brand that manufactures the model.
    brand_id: i64,

    /// Name of the model.
    name: String,
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Payload(request): Payload<ModelRequest>,
) -> Result<impl IntoResponse, RestError> {
    let model = NewModel {
        brand_id: BrandId::new(request.brand_id),
        name: ModelName::new(request.name)?,
    };
    let model = driver.create_model(model).await?;

    Ok((http::StatusCode::CREATED, Json(model)))
}
