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

//! API to add a brand to the catalog.

use crate::driver::Driver;
use crate::model::BrandName;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Json, http};
use carshop_core::rest::{Payload, RestError};
use serde::{Deserialize, Serialize};

/// Message sent to the server to create or rename a brand.
#[derive(Deserialize, Serialize)]
pub(crate) struct BrandRequest {
    /// Name of the brand.
    pub(crate) name: String,
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Payload(request): Payload<BrandRequest>,
) -> Result<impl IntoResponse, RestError> {
    let brand = driver.create_brand(BrandName::new(request.name)?).await?;

    Ok((http::StatusCode::CREATED, Json(brand)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::rest::testutils::*;
    use carshop_core::rest::testutils::*;

    fn route() -> (http::Method, &'static str) {
        (http::Method::POST, "/api/brands")
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_json(BrandRequest { name: "  Peugeot ".to_owned() })
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<Brand>()
            .await;

        assert_eq!("Peugeot", response.name().as_str());
        assert_eq!(Some(response.clone()), context.get_brand(*response.id()).await);
    }

    #[tokio::test]
    async fn test_duplicate() {
        let context = TestContext::setup().await;
        context.create_brand("Peugeot").await;

        OneShotBuilder::new(context.into_app(), route())
            .send_form(BrandRequest { name: "Peugeot".to_owned() })
            .await
            .expect_status(http::StatusCode::CONFLICT)
            .expect_error("Brand Peugeot already exists")
            .await;
    }

    #[tokio::test]
    async fn test_invalid_name() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route())
            .send_json(BrandRequest { name: "x".repeat(61) })
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Brand cannot be longer than 60 characters")
            .await;

        assert!(context.get_brand(BrandId::new(1)).await.is_none());
    }

    test_payload_must_be_data!(TestContext::setup().await.into_app(), route());
}
