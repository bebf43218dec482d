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

//! Entry point to the REST server.

use crate::driver::Driver;
use axum::Router;
use carshop_core::rest::RestError;

mod brand_delete;
mod brand_get;
mod brand_put;
mod brands_get;
mod brands_post;
mod car_delete;
mod car_get;
mod car_put;
mod cars_get;
mod cars_post;
mod client_delete;
mod client_get;
mod client_put;
mod clients_get;
mod clients_post;
mod model_delete;
mod model_get;
mod model_put;
mod models_get;
mod models_post;
mod pages;
#[cfg(test)]
mod testutils;

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::get;

    let api = Router::new()
        .route("/brands", get(brands_get::handler).post(brands_post::handler))
        .route(
            "/brands/:id",
            get(brand_get::handler).put(brand_put::handler).delete(brand_delete::handler),
        )
        .route("/cars", get(cars_get::handler).post(cars_post::handler))
        .route(
            "/cars/:id",
            get(car_get::handler).put(car_put::handler).delete(car_delete::handler),
        )
        .route("/clients", get(clients_get::handler).post(clients_post::handler))
        .route(
            "/clients/:id",
            get(client_get::handler).put(client_put::handler).delete(client_delete::handler),
        )
        .route("/models", get(models_get::handler).post(models_post::handler))
        .route(
            "/models/:id",
            get(model_get::handler).put(model_put::handler).delete(model_delete::handler),
        )
        .with_state(driver);

    Router::new()
        .nest("/api", api)
        .route("/", get(pages::cars_handler))
        .route("/assets/:name", get(pages::asset_handler))
        .route("/catalog", get(pages::catalog_handler))
        .route("/clients", get(pages::clients_handler))
}

/// Parses an optional identifier received as text in a query string.
///
/// HTML forms send empty values for unselected fields, so blank strings are treated as absent.
fn parse_optional_id(field: &str, value: Option<String>) -> Result<Option<i64>, RestError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| RestError::InvalidRequest(format!("Invalid {} '{}'", field, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::rest::testutils::*;
    use axum::http;
    use carshop_core::rest::testutils::*;
    use serde_json::json;

    #[test]
    fn test_parse_optional_id() {
        assert_eq!(Ok(None), parse_optional_id("brand_id", None));
        assert_eq!(Ok(None), parse_optional_id("brand_id", Some(" ".to_owned())));
        assert_eq!(Ok(Some(12)), parse_optional_id("brand_id", Some("12".to_owned())));
        assert_eq!(
            Err(RestError::InvalidRequest("Invalid brand_id 'x'".to_owned())),
            parse_optional_id("brand_id", Some("x".to_owned()))
        );
    }

    #[tokio::test]
    async fn test_e2e_catalog_and_inventory_flow() {
        let context = TestContext::setup().await;

        let brand = OneShotBuilder::new(context.app(), (http::Method::POST, "/api/brands"))
            .send_form([("name", "Volkswagen")])
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<Brand>()
            .await;

        let model = OneShotBuilder::new(context.app(), (http::Method::POST, "/api/models"))
            .send_json(json!({"brand_id": brand.id(), "name": "Gol"}))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<Model>()
            .await;

        let car = OneShotBuilder::new(context.app(), (http::Method::POST, "/api/cars"))
            .send_json(json!({
                "brand": "Volkswagen",
                "model": "Gol",
                "year": 2014,
                "color": "Branco",
                "mileage_km": 80000,
                "price": 32000.5,
                "quantity": 1,
                "status": "Active",
                "model_id": model.id(),
            }))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<Car>()
            .await;
        assert_eq!(Some(*brand.id()), *car.brand_id());

        let cars = OneShotBuilder::new(context.app(), (http::Method::GET, "/api/cars"))
            .with_query([("brand", "volks")])
            .send_empty()
            .await
            .expect_json::<Vec<Car>>()
            .await;
        assert_eq!(vec![car.clone()], cars);

        let route = (http::Method::DELETE, format!("/api/brands/{}", brand.id()));
        OneShotBuilder::new(context.app(), route)
            .send_empty()
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;

        let route = (http::Method::GET, format!("/api/cars/{}", car.id()));
        let car = OneShotBuilder::new(context.app(), route)
            .send_empty()
            .await
            .expect_json::<Car>()
            .await;
        assert_eq!(None, *car.brand_id());
        assert_eq!(None, *car.model_id());
    }

    #[tokio::test]
    async fn test_unknown_api() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), (http::Method::GET, "/api/trucks"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .take_response()
            .await;
    }
}
