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

//! Static pages and assets of the web frontend.
//!
//! Pages are embedded in the binary and carry the validation bounds of the model so that the
//! forms can check user input before it reaches the API.

use crate::model::{
    BIRTH_DATE_MIN, BRAND_NAME_MAX_LEN, CLIENT_NAME_MAX_LEN, COLOR_MAX_LEN, CPF_DIGITS,
    MODEL_NAME_MAX_LEN, PRICE_MAX_CENTS, YEAR_MAX, YEAR_MIN,
};
use axum::extract::Path;
use axum::http;
use axum::response::{Html, IntoResponse};
use carshop_core::rest::{EmptyBody, RestError};
use carshop_core::template;

/// Template for the inventory page.
const CARS_TEMPLATE: &str = include_str!("../../static/index.html");

/// Template for the clients page.
const CLIENTS_TEMPLATE: &str = include_str!("../../static/clients.html");

/// Template for the brands and models page.
const CATALOG_TEMPLATE: &str = include_str!("../../static/catalog.html");

/// Content type of the scripts.
const JS: &str = "application/javascript; charset=utf-8";

/// Content type of the stylesheets.
const CSS: &str = "text/css; charset=utf-8";

/// Assets served verbatim, keyed by their name, along with their content type.
const ASSETS: &[(&str, &str, &str)] = &[
    ("cars.js", JS, include_str!("../../static/cars.js")),
    ("catalog.js", JS, include_str!("../../static/catalog.js")),
    ("clients.js", JS, include_str!("../../static/clients.js")),
    ("styles.css", CSS, include_str!("../../static/styles.css")),
];

/// Expands the validation bounds referenced by the page `input`.
fn render(input: &str) -> Html<String> {
    let year_min = YEAR_MIN.to_string();
    let year_max = YEAR_MAX.to_string();
    let price_max = (PRICE_MAX_CENTS / 100).to_string();
    let cpf_digits = CPF_DIGITS.to_string();
    let birth_date_min = BIRTH_DATE_MIN.to_string();
    let brand_name_max_len = BRAND_NAME_MAX_LEN.to_string();
    let model_name_max_len = MODEL_NAME_MAX_LEN.to_string();
    let color_max_len = COLOR_MAX_LEN.to_string();
    let client_name_max_len = CLIENT_NAME_MAX_LEN.to_string();

    Html(template::apply(
        input,
        &[
            ("YEAR_MIN", &year_min),
            ("YEAR_MAX", &year_max),
            ("PRICE_MAX", &price_max),
            ("CPF_DIGITS", &cpf_digits),
            ("BIRTH_DATE_MIN", &birth_date_min),
            ("BRAND_NAME_MAX_LEN", &brand_name_max_len),
            ("MODEL_NAME_MAX_LEN", &model_name_max_len),
            ("COLOR_MAX_LEN", &color_max_len),
            ("CLIENT_NAME_MAX_LEN", &client_name_max_len),
        ],
    ))
}

/// Handler for the inventory page.
pub(crate) async fn cars_handler(_: EmptyBody) -> Html<String> {
    render(CARS_TEMPLATE)
}

/// Handler for the clients page.
pub(crate) async fn clients_handler(_: EmptyBody) -> Html<String> {
    render(CLIENTS_TEMPLATE)
}

/// Handler for the catalog page.
pub(crate) async fn catalog_handler(_: EmptyBody) -> Html<String> {
    render(CATALOG_TEMPLATE)
}

/// Handler for the scripts and stylesheets referenced by the pages.
pub(crate) async fn asset_handler(
    Path(name): Path<String>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    match ASSETS.iter().find(|(key, _, _)| *key == name) {
        Some((_, content_type, body)) => Ok(([(http::header::CONTENT_TYPE, *content_type)], *body)),
        None => Err(RestError::NotFound(format!("Asset {} not found", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use carshop_core::rest::testutils::*;

    #[test]
    fn test_render_all_templates() {
        for input in [CARS_TEMPLATE, CLIENTS_TEMPLATE, CATALOG_TEMPLATE] {
            let Html(output) = render(input);
            assert!(!output.contains("%"), "Unexpanded key in {}", output);
        }
    }

    #[tokio::test]
    async fn test_cars_page() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), (http::Method::GET, "/"))
            .send_empty()
            .await
            .expect_text(r#"(?s)<title>CarShop.*min="1900".*max="2100""#)
            .await;
    }

    #[tokio::test]
    async fn test_clients_page() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), (http::Method::GET, "/clients"))
            .send_empty()
            .await
            .expect_text(r#"pattern="\[0-9\]\{11\}""#)
            .await;
    }

    #[tokio::test]
    async fn test_catalog_page() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), (http::Method::GET, "/catalog"))
            .send_empty()
            .await
            .expect_text(r#"maxlength="60""#)
            .await;
    }

    #[tokio::test]
    async fn test_asset_ok() {
        let context = TestContext::setup().await;

        let route = (http::Method::GET, "/assets/cars.js");
        let response = OneShotBuilder::new(context.into_app(), route)
            .send_empty()
            .await
            .take_response()
            .await;
        assert_eq!(
            JS,
            response.headers().get(http::header::CONTENT_TYPE).unwrap().to_str().unwrap()
        );
    }

    #[tokio::test]
    async fn test_asset_not_found() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), (http::Method::GET, "/assets/secret.txt"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("Asset secret.txt not found")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), (http::Method::GET, "/"));
}
