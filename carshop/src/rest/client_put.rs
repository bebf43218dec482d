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

//! API to modify a client.

use crate::driver::Driver;
use crate::model::{ClientId, ClientName, Cpf};
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use carshop_core::rest::{Payload, RestError};
use serde::{Deserialize, Serialize};

/// Message sent to the server to modify a client.  Fields that are not present are left
/// untouched.
#[derive(Default, Deserialize, Serialize)]
pub(crate) struct ClientUpdateRequest {
    /// New name.
    #[serde(default)]
    pub(crate) name: Option<String>,

    /// New CPF.
    #[serde(default)]
    pub(crate) cpf: Option<String>,

    /// New birth date in `YYYY-MM-DD` form.
    #[serde(default)]
    pub(crate) birth_date: Option<String>,
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<i64>,
    Payload(request): Payload<ClientUpdateRequest>,
) -> Result<impl IntoResponse, RestError> {
    let name = request.name.map(ClientName::new).transpose()?;
    let cpf = request.cpf.map(Cpf::new).transpose()?;

    let client = driver
        .update_client(ClientId::new(id), name, cpf, request.birth_date.as_deref())
        .await?;

    Ok(Json(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::rest::testutils::*;
    use axum::http;
    use carshop_core::rest::testutils::*;
    use time::macros::date;

    fn route(id: ClientId) -> (http::Method, String) {
        (http::Method::PUT, format!("/api/clients/{}", id))
    }

    #[tokio::test]
    async fn test_partial_update() {
        let context = TestContext::setup().await;
        let client = context.create_client("Rafael Costa", "39053344705").await;

        let request = ClientUpdateRequest {
            name: Some("Rafael da Costa".to_owned()),
            ..Default::default()
        };
        let response = OneShotBuilder::new(context.app(), route(*client.id()))
            .send_json(request)
            .await
            .expect_json::<Client>()
            .await;

        assert_eq!("Rafael da Costa", response.name().as_str());
        assert_eq!(client.cpf(), response.cpf());
        assert_eq!(client.birth_date(), response.birth_date());
        assert_eq!(Some(response), context.get_client(*client.id()).await);
    }

    #[tokio::test]
    async fn test_update_birth_date_form() {
        let context = TestContext::setup().await;
        let client = context.create_client("Rafael Costa", "39053344705").await;

        let response = OneShotBuilder::new(context.app(), route(*client.id()))
            .send_form([("birth_date", "1970-05-05")])
            .await
            .expect_json::<Client>()
            .await;

        assert_eq!(date!(1970 - 05 - 05), response.birth_date().as_date());
    }

    #[tokio::test]
    async fn test_duplicate_cpf() {
        let context = TestContext::setup().await;
        context.create_client("Rafael Costa", "39053344705").await;
        let other = context.create_client("Paula Dias", "11144477735").await;

        let request =
            ClientUpdateRequest { cpf: Some("390.533.447-05".to_owned()), ..Default::default() };
        OneShotBuilder::new(context.app(), route(*other.id()))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::CONFLICT)
            .expect_error("CPF 39053344705 is already registered")
            .await;
    }

    #[tokio::test]
    async fn test_invalid_birth_date() {
        let context = TestContext::setup().await;
        let client = context.create_client("Rafael Costa", "39053344705").await;

        let request =
            ClientUpdateRequest { birth_date: Some("1850-01-01".to_owned()), ..Default::default() };
        OneShotBuilder::new(context.app(), route(*client.id()))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("before 1900-01-01")
            .await;

        assert_eq!(Some(client.clone()), context.get_client(*client.id()).await);
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route(ClientId::new(3)))
            .send_json(ClientUpdateRequest::default())
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("Client 3 not found")
            .await;
    }

    test_payload_must_be_data!(TestContext::setup().await.into_app(), route(ClientId::new(1)));
}
