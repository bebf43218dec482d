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

//! API to modify a model.

use crate::driver::Driver;
use crate::model::{BrandId, ModelId, ModelName, ModelUpdate};
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use carshop_core::model::ModelError;
use carshop_core::rest::{Payload, RestError, blank_as_none};
use serde::{Deserialize, Serialize};

/// Message sent to the server to modify a model.  Absent fields are left untouched.
#[derive(Default, Deserialize, Serialize)]
pub(crate) struct ModelUpdateRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    brand_id: Option<i64>,

    #[serde(default)]
    name: Option<String>,
}

impl TryFrom<ModelUpdateRequest> for ModelUpdate {
    type Error = ModelError;

    fn try_from(request: ModelUpdateRequest) -> Result<Self, Self::Error> {
        Ok(ModelUpdate {
            brand_id: request.brand_id.map(BrandId::new),
            name: request.name.map(ModelName::new).transpose()?,
        })
    }
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    Payload(request): Payload<ModelUpdateRequest>,
) -> Result<impl IntoResponse, RestError> {
    let model = driver.update_model(ModelId::new(id), ModelUpdate::try_from(request)?).await?;

    Ok(Json(model))
}
