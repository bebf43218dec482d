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

//! API to rename a brand.

use crate::driver::Driver;
use crate::model::{BrandId, BrandName};
use crate::rest::brands_post::BrandRequest;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use carshop_core::rest::{Payload, RestError};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    Payload(request): Payload<BrandRequest>,
) -> Result<impl IntoResponse, RestError> {
    let brand = driver.update_brand(BrandId::new(id), BrandName::new(request.name)?).await?;

    Ok(Json(brand))
}
