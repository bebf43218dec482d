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

//! API to list the models in the catalog.

use crate::driver::Driver;
use crate::model::{BrandId, ModelFilter};
use crate::rest::parse_optional_id;
use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use carshop_core::rest::{EmptyBody, RestError};
use serde::Deserialize;

/// Filters accepted in the query string.
#[derive(Deserialize)]
pub(crate) struct ModelsQuery {
    /// Brand the models must belong to.  Kept as text so that empty form values are accepted.
    brand_id: Option<String>,

    /// Case-insensitive substring to look for in the name.
    name: Option<String>,
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Query(query): Query<ModelsQuery>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let brand_id = parse_optional_id("brand_id", query.brand_id)?.map(BrandId::new);
    let models = driver.list_models(ModelFilter::new(brand_id, query.name)).await?;

    Ok(Json(models))
}
