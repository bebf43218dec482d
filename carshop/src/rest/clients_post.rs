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

//! API to register a client.

use crate::driver::Driver;
use crate::model::{ClientName, Cpf};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Json, http};
use carshop_core::rest::{Payload, RestError};
use serde::{Deserialize, Serialize};

/// Message sent to the server to register a client.
#[derive(Deserialize, Serialize)]
pub(crate) struct ClientRequest {
    /// Full name.
    pub(crate) name: String,

    /// CPF, with or without formatting characters.
    pub(crate) cpf: String,

    /// Birth date in `YYYY-MM-DD` form.
    pub(crate) birth_date: String,
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Payload(request): Payload<ClientRequest>,
) -> Result<impl IntoResponse, RestError> {
    let name = ClientName::new(request.name)?;
    let cpf = Cpf::new(request.cpf)?;

    let client = driver.create_client(name, cpf, &request.birth_date).await?;

    Ok((http::StatusCode::CREATED, Json(client)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::rest::testutils::*;
    use carshop_core::rest::testutils::*;
    use time::macros::date;

    fn route() -> (http::Method, &'static str) {
        (http::Method::POST, "/api/clients")
    }

    fn request(name: &str, cpf: &str, birth_date: &str) -> ClientRequest {
        ClientRequest {
            name: name.to_owned(),
            cpf: cpf.to_owned(),
            birth_date: birth_date.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_ok_json() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_json(request("Joana Prado", "529.982.247-25", "1979-11-23"))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<Client>()
            .await;

        assert_eq!("Joana Prado", response.name().as_str());
        assert_eq!("52998224725", response.cpf().as_str());
        assert_eq!(date!(1979 - 11 - 23), response.birth_date().as_date());
        assert_eq!(Some(response.clone()), context.get_client(*response.id()).await);
    }

    #[tokio::test]
    async fn test_ok_form() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_form(request("Joana Prado", "52998224725", "1979-11-23"))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<Client>()
            .await;

        assert_eq!(Some(response.clone()), context.get_client(*response.id()).await);
    }

    #[tokio::test]
    async fn test_duplicate_cpf() {
        let context = TestContext::setup().await;
        context.create_client("Joana Prado", "52998224725").await;

        OneShotBuilder::new(context.into_app(), route())
            .send_json(request("Outra Pessoa", "529.982.247-25", "1980-01-01"))
            .await
            .expect_status(http::StatusCode::CONFLICT)
            .expect_error("CPF 52998224725 is already registered")
            .await;
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let context = TestContext::setup().await;

        for (request, error) in [
            (request("", "52998224725", "1980-01-01"), "Name cannot be empty"),
            (request("Joana", "5299822472", "1980-01-01"), "CPF must have exactly 11 digits"),
            (request("Joana", "5299822472a", "1980-01-01"), "CPF must have exactly 11 digits"),
            (request("Joana", "52998224725", "2030-01-01"), "Birth date cannot be in the future"),
            (request("Joana", "52998224725", "01/01/1980"), "not a valid YYYY-MM-DD date"),
        ] {
            OneShotBuilder::new(context.app(), route())
                .send_json(request)
                .await
                .expect_status(http::StatusCode::BAD_REQUEST)
                .expect_error(error)
                .await;
        }

        assert!(context.get_client(ClientId::new(1)).await.is_none());
    }

    test_payload_must_be_data!(TestContext::setup().await.into_app(), route());
}
