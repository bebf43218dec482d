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

//! API to search for clients.

use crate::driver::Driver;
use crate::model::ClientFilter;
use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use carshop_core::rest::{EmptyBody, RestError};
use serde::Deserialize;

/// Filters accepted in the query string.
#[derive(Deserialize)]
pub(crate) struct ClientsQuery {
    /// Case-insensitive substring to look for in the name.
    name: Option<String>,

    /// Leading digits of the CPF, possibly with formatting characters.
    cpf: Option<String>,
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Query(query): Query<ClientsQuery>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let filter = ClientFilter::new(query.name, query.cpf)?;

    let clients = driver.list_clients(filter).await?;

    Ok(Json(clients))
}

#[cfg(test)]
mod tests {
    use crate::model::*;
    use crate::rest::testutils::*;
    use axum::http;
    use carshop_core::rest::testutils::*;

    fn route() -> (http::Method, &'static str) {
        (http::Method::GET, "/api/clients")
    }

    #[tokio::test]
    async fn test_filters() {
        let context = TestContext::setup().await;
        let ana = context.create_client("Ana Pereira", "52998224725").await;
        let bia = context.create_client("Beatriz Pereira", "52911111111").await;
        let caio = context.create_client("Caio Alves", "11144477735").await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_empty()
            .await
            .expect_json::<Vec<Client>>()
            .await;
        assert_eq!(vec![ana.clone(), bia.clone(), caio.clone()], response);

        let response = OneShotBuilder::new(context.app(), route())
            .with_query([("name", "PEREIRA")])
            .send_empty()
            .await
            .expect_json::<Vec<Client>>()
            .await;
        assert_eq!(vec![ana.clone(), bia.clone()], response);

        let response = OneShotBuilder::new(context.app(), route())
            .with_query([("cpf", "529.98")])
            .send_empty()
            .await
            .expect_json::<Vec<Client>>()
            .await;
        assert_eq!(vec![ana], response);

        let response = OneShotBuilder::new(context.app(), route())
            .with_query([("name", "alves"), ("cpf", "529")])
            .send_empty()
            .await
            .expect_json::<Vec<Client>>()
            .await;
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_bad_cpf_filter() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route())
            .with_query([("cpf", "123456789012")])
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("CPF filter must have at most 11 digits")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route());
}
