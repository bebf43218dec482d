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

//! Generic code for REST handlers.
//!
//! All services should implement an `app` function in this module that returns the `Router` for the
//! application.
//!
//! Every API should be put in its own `.rs` file, using a name like `<entity>_<method>.rs`.  This
//! may seem overkill, but putting every API in its own file makes it easy to ensure all the
//! integration tests for the given API truly belong to that API.
//!
//! More specifically, the `tests` module within an API should define a `route` method that
//! returns the HTTP method and the API path under test.  All integration tests within the module
//! then rely on `route` to obtain this information, ensuring that they all test the desired API.

use crate::driver::DriverError;
use crate::model::ModelError;
use async_trait::async_trait;
use axum::Json;
use axum::body::{Bytes, HttpBody};
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use log::error;
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// Frontend errors.  These are the errors that are visible to the user on failed requests.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RestError {
    /// Indicates that the request conflicts with the current state of another entity, such as
    /// when a value that must be unique is already taken.
    #[error("{0}")]
    Conflict(String),

    /// Catch-all error type for all unexpected errors.
    #[error("{0}")]
    InternalError(String),

    /// Indicates an error in the contents of the request.
    #[error("{0}")]
    InvalidRequest(String),

    /// Indicates that a requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Indicates that a request that should have empty content did not.
    #[error("Content should be empty")]
    PayloadNotEmpty,

    /// Indicates that the payload of the request is in a format we do not understand.
    #[error("Content-Type must be application/json or application/x-www-form-urlencoded")]
    UnsupportedMediaType,
}

impl From<DriverError> for RestError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::AlreadyExists(_) => RestError::Conflict(e.to_string()),
            DriverError::BackendError(_) => RestError::InternalError(e.to_string()),
            DriverError::InvalidInput(_) => RestError::InvalidRequest(e.to_string()),
            DriverError::NotFound(_) => RestError::NotFound(e.to_string()),
        }
    }
}

impl From<ModelError> for RestError {
    fn from(e: ModelError) -> Self {
        RestError::InvalidRequest(e.to_string())
    }
}

impl From<serde_json::Error> for RestError {
    fn from(e: serde_json::Error) -> Self {
        RestError::InvalidRequest(e.to_string())
    }
}

impl<E: fmt::Display> From<serde_path_to_error::Error<E>> for RestError {
    fn from(e: serde_path_to_error::Error<E>) -> Self {
        let path = e.path().to_string();
        if path == "." {
            RestError::InvalidRequest(e.into_inner().to_string())
        } else {
            RestError::InvalidRequest(format!("{}: {}", path, e.into_inner()))
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            RestError::Conflict(_) => http::StatusCode::CONFLICT,
            RestError::InternalError(ref message) => {
                error!("Request failed with internal error: {}", message);
                http::StatusCode::INTERNAL_SERVER_ERROR
            }
            RestError::InvalidRequest(_) => http::StatusCode::BAD_REQUEST,
            RestError::NotFound(_) => http::StatusCode::NOT_FOUND,
            RestError::PayloadNotEmpty => http::StatusCode::PAYLOAD_TOO_LARGE,
            RestError::UnsupportedMediaType => http::StatusCode::UNSUPPORTED_MEDIA_TYPE,
        };

        let response = ErrorResponse { message: self.to_string() };

        (status, Json(response)).into_response()
    }
}

/// Result type for this module.
pub type RestResult<T> = Result<T, RestError>;

/// Representation of the details of an error response.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ErrorResponse {
    /// Textual representation of the error message.
    pub(crate) message: String,
}

/// A request body extractor that forbids any content.
///
/// Any API that doesn't expect a body should use this to ensure we don't get garbage data that we
/// don't care about.  This future-proofs the service.
pub struct EmptyBody {}

#[async_trait]
impl<S> FromRequest<S> for EmptyBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if req.into_body().is_end_stream() {
            Ok(EmptyBody {})
        } else {
            Err(RestError::PayloadNotEmpty)
        }
    }
}

/// Formats in which a `Payload` can arrive.
#[derive(Debug, PartialEq)]
enum PayloadFormat {
    /// `application/json`.
    Json,

    /// `application/x-www-form-urlencoded`.
    Form,
}

/// Determines the format of a payload given the value of its `Content-Type` header.
///
/// Parameters such as `charset` are ignored.
fn payload_format(content_type: Option<&str>) -> Option<PayloadFormat> {
    let mime = content_type?.parse::<mime::Mime>().ok()?;
    if mime.type_() != mime::APPLICATION {
        None
    } else if mime.subtype() == mime::JSON {
        Some(PayloadFormat::Json)
    } else if mime.subtype() == mime::WWW_FORM_URLENCODED {
        Some(PayloadFormat::Form)
    } else {
        None
    }
}

/// A request body extractor that deserializes `T` from either a JSON document or an URL-encoded
/// form, depending on the `Content-Type` of the request.
///
/// HTML forms and `fetch` calls from the frontend can thus hit the same APIs.
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
        let format = payload_format(content_type).ok_or(RestError::UnsupportedMediaType)?;

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| RestError::InvalidRequest(e.body_text()))?;

        let value = match format {
            PayloadFormat::Json => {
                let mut de = serde_json::Deserializer::from_slice(&body);
                let value = serde_path_to_error::deserialize(&mut de)?;
                de.end()?;
                value
            }
            PayloadFormat::Form => {
                let de = serde_urlencoded::Deserializer::new(form_urlencoded::parse(&body));
                serde_path_to_error::deserialize(de)?
            }
        };
        Ok(Payload(value))
    }
}

/// Visitor for `blank_as_none`.
struct BlankAsNone<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for BlankAsNone<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    type Value = Option<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number, a string or nothing")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        match v.trim() {
            "" => Ok(None),
            v => v.parse::<T>().map(Some).map_err(E::custom),
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        self.visit_str(&v.to_string())
    }
}

/// Deserializes an optional field that HTML forms send as an empty string when left blank.
///
/// Use via `#[serde(default, deserialize_with = "blank_as_none")]`.  JSON `null`, a missing field
/// and blank text all yield `None`.  Anything else is parsed with `FromStr`, so the same field
/// accepts JSON numbers and form text.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    deserializer.deserialize_option(BlankAsNone(PhantomData))
}

/// Common test code for the REST server.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;
    use axum::Router;
    use axum::http::{self, HeaderName, HeaderValue};
    use tower::util::ServiceExt;

    /// Maximum body size for testing purposes.
    const MAX_BODY_SIZE: usize = 64 * 1024;

    /// Builder for a single request to the API server.
    #[must_use]
    pub struct OneShotBuilder {
        /// The router for the app being tested.
        app: Router,

        /// Builder for the request that will be sent to the app.
        builder: axum::http::request::Builder,
    }

    impl OneShotBuilder {
        /// Creates a new request against a given `method`/`uri` pair served by an `app` router.
        pub fn new<U: AsRef<str>>(app: Router, (method, uri): (http::Method, U)) -> Self {
            let builder = Request::builder().method(method).uri(uri.as_ref());
            Self { app, builder }
        }

        /// Extends the URI in the request with a `query`.
        pub fn with_query<Q: Serialize>(mut self, query: Q) -> Self {
            let uri = self.builder.uri_ref().unwrap().to_string();
            assert!(!uri.contains('?'), "URI already contains a query: {}", uri);
            self.builder = self.builder.uri(format!(
                "{}?{}",
                uri,
                serde_urlencoded::to_string(query).unwrap()
            ));
            self
        }

        /// Sets the header `name` to `value` in the outgoing request.
        pub fn with_header<K, V>(mut self, name: K, value: V) -> Self
        where
            HeaderName: TryFrom<K>,
            <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
            HeaderValue: TryFrom<V>,
            <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
        {
            self.builder = self.builder.header(name, value);
            self
        }

        /// Finishes building the request and sends it with an empty payload.
        pub async fn send_empty(self) -> ResponseChecker {
            let request = self.builder.body(axum::body::Body::empty()).unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }

        /// Finishes building the request and sends it with a text payload.
        ///
        /// The content type is only set to `text/plain` if the caller did not set one already.
        pub async fn send_text<T: Into<String>>(mut self, text: T) -> ResponseChecker {
            let has_type = self
                .builder
                .headers_ref()
                .is_some_and(|h| h.contains_key(http::header::CONTENT_TYPE));
            if !has_type {
                self.builder =
                    self.builder.header(http::header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref());
            }
            let request = self.builder.body(axum::body::Body::from(text.into())).unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }

        /// Finishes building the request and sends it with a form encoded in the
        /// body as the payload.
        pub async fn send_form<T: Serialize>(self, request: T) -> ResponseChecker {
            let request = self
                .builder
                .header(http::header::CONTENT_TYPE, mime::APPLICATION_WWW_FORM_URLENCODED.as_ref())
                .body(axum::body::Body::from(serde_urlencoded::to_string(&request).unwrap()))
                .unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }

        /// Finishes building the request and sends it with a JSON payload.
        pub async fn send_json<T: Serialize>(self, request: T) -> ResponseChecker {
            let request = self
                .builder
                .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(axum::body::Body::from(serde_json::to_vec(&request).unwrap()))
                .unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }
    }

    /// Type alias for the complex type returned by the `oneshot` function.
    type HttpResponse = http::Response<axum::body::Body>;

    /// Validator for the outcome of a request sent by a `OneShotBuilder`.
    #[must_use]
    pub struct ResponseChecker {
        /// Actual response that we received from the app.
        response: HttpResponse,

        /// Expected HTTP status code in the response above.
        exp_status: http::StatusCode,
    }

    impl From<HttpResponse> for ResponseChecker {
        fn from(response: HttpResponse) -> Self {
            Self { response, exp_status: http::StatusCode::OK }
        }
    }

    impl ResponseChecker {
        /// Sets the expected exit HTTP status to `status`.
        pub fn expect_status(mut self, status: http::StatusCode) -> Self {
            self.exp_status = status;
            self
        }

        /// Performs common validation operations on the response.
        pub fn verify(&self) {
            assert_eq!(self.exp_status, self.response.status());
        }

        /// Consumes the response and returns its body as a string.
        async fn body_text(self) -> String {
            let body =
                axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
            String::from_utf8(body.to_vec()).unwrap()
        }

        /// Finishes checking the response and expects it to contain an empty body.
        pub async fn expect_empty(self) {
            self.verify();

            let body = self.body_text().await;
            assert!(body.is_empty(), "Body not empty; got {}", body);
        }

        /// Finishes checking the response and expects its body to be an `ErrorResponse` that
        /// matches `exp_re`.
        pub async fn expect_error(self, exp_re: &str) {
            self.verify();

            let body = self.body_text().await;
            let response: ErrorResponse = match serde_json::from_str(&body) {
                Ok(response) => response,
                Err(e) => panic!("Invalid error response due to {}; content was {}", e, body),
            };
            let re = regex::Regex::new(exp_re).unwrap();
            assert!(
                re.is_match(&response.message),
                "Response content '{:?}' does not match re '{}'",
                response,
                exp_re
            );
        }

        /// Finishes checking the response and expects it to contain a valid JSON object of
        /// type `T`.
        pub async fn expect_json<T: DeserializeOwned>(self) -> T {
            self.verify();

            let body = self.body_text().await;
            match serde_json::from_str::<T>(&body) {
                Ok(value) => value,
                Err(e) => panic!("Invalid JSON response due to {}; content was {}", e, body),
            }
        }

        /// Finishes checking the response and expects its body to be valid UTF-8 and to match
        /// `exp_re`.
        pub async fn expect_text(self, exp_re: &str) {
            assert!(!exp_re.is_empty(), "Use expect_empty to validate empty responses");

            self.verify();

            let body = self.body_text().await;
            let re = regex::Regex::new(exp_re).unwrap();
            assert!(re.is_match(&body), "Body content '{}' does not match re '{}'", body, exp_re);
        }

        /// Finishes checking the response and returns the response itself for out of band
        /// validation of properties not supported by the `ResponseChecker`.
        pub async fn take_response(self) -> HttpResponse {
            self.verify();

            self.response
        }
    }

    /// Generates a test to verify that an API that expects a JSON or form payload fails when it
    /// gets something else.
    #[macro_export]
    macro_rules! test_payload_must_be_data {
        ( $app:expr, $route:expr $(, $query:expr)? ) => {
            #[tokio::test]
            async fn test_payload_must_be_data() {
                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    .send_text("this is not json")
                    .await
                    .expect_status(axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE)
                    .expect_error("Content-Type")
                    .await;

                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    .with_header(axum::http::header::CONTENT_TYPE, "application/json")
                    .send_text("this is not json")
                    .await
                    .expect_status(axum::http::StatusCode::BAD_REQUEST)
                    .expect_error("expected ident")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_data;

    /// Generates a test to verify that an API that does not expect a payload fails as necessary.
    #[macro_export]
    macro_rules! test_payload_must_be_empty {
        ( $app:expr, $route:expr $(, $query:expr)? ) => {
            #[tokio::test]
            async fn test_payload_must_be_empty() {
                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    .send_text("should not be here")
                    .await
                    .expect_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE)
                    .expect_error("should be empty")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_empty;
}

#[cfg(test)]
mod tests {
    use super::testutils::*;
    use super::*;
    use axum::Router;
    use axum::routing::post;
    use http::StatusCode;

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Optionals {
        #[serde(default, deserialize_with = "blank_as_none")]
        number: Option<i64>,

        #[serde(default, deserialize_with = "blank_as_none")]
        text: Option<String>,
    }

    async fn echo(Payload(sample): Payload<Sample>) -> Json<Sample> {
        Json(sample)
    }

    async fn echo_optionals(Payload(optionals): Payload<Optionals>) -> Json<Optionals> {
        Json(optionals)
    }

    async fn fail(_: EmptyBody) -> RestResult<()> {
        Err(DriverError::AlreadyExists("Duplicate".to_owned()).into())
    }

    fn app() -> Router {
        Router::new()
            .route("/echo", post(echo))
            .route("/optionals", post(echo_optionals))
            .route("/fail", post(fail))
    }

    fn route() -> (http::Method, &'static str) {
        (http::Method::POST, "/echo")
    }

    fn optionals_route() -> (http::Method, &'static str) {
        (http::Method::POST, "/optionals")
    }

    #[test]
    fn test_payload_format() {
        assert_eq!(Some(PayloadFormat::Json), payload_format(Some("application/json")));
        assert_eq!(
            Some(PayloadFormat::Json),
            payload_format(Some("application/json; charset=utf-8"))
        );
        assert_eq!(
            Some(PayloadFormat::Form),
            payload_format(Some("application/x-www-form-urlencoded"))
        );
        assert_eq!(None, payload_format(Some("text/plain")));
        assert_eq!(None, payload_format(Some("application/octet-stream")));
        assert_eq!(None, payload_format(Some("garbage")));
        assert_eq!(None, payload_format(None));
    }

    #[tokio::test]
    async fn test_payload_json() {
        let sample = Sample { name: "Corolla".to_owned(), count: 3 };
        let response = OneShotBuilder::new(app(), route())
            .send_json(&sample)
            .await
            .expect_json::<Sample>()
            .await;
        assert_eq!(sample, response);
    }

    #[tokio::test]
    async fn test_payload_form() {
        let sample = Sample { name: "Civic Si".to_owned(), count: 1 };
        let response = OneShotBuilder::new(app(), route())
            .send_form(&sample)
            .await
            .expect_json::<Sample>()
            .await;
        assert_eq!(sample, response);
    }

    #[tokio::test]
    async fn test_payload_form_bad_field() {
        OneShotBuilder::new(app(), route())
            .with_header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .send_text("name=foo&count=many")
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_error("^count: invalid digit")
            .await;
    }

    #[tokio::test]
    async fn test_payload_json_bad_field() {
        OneShotBuilder::new(app(), route())
            .send_json(serde_json::json!({"name": "foo", "count": "many"}))
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_error("^count: invalid type: string")
            .await;
    }

    #[tokio::test]
    async fn test_blank_as_none_form() {
        let response = OneShotBuilder::new(app(), optionals_route())
            .send_form([("number", ""), ("text", "  ")])
            .await
            .expect_json::<Optionals>()
            .await;
        assert_eq!(Optionals { number: None, text: None }, response);

        let response = OneShotBuilder::new(app(), optionals_route())
            .send_form([("number", " 42 "), ("text", "abc")])
            .await
            .expect_json::<Optionals>()
            .await;
        assert_eq!(Optionals { number: Some(42), text: Some("abc".to_owned()) }, response);

        let response = OneShotBuilder::new(app(), optionals_route())
            .send_form(Vec::<(&str, &str)>::new())
            .await
            .expect_json::<Optionals>()
            .await;
        assert_eq!(Optionals { number: None, text: None }, response);

        OneShotBuilder::new(app(), optionals_route())
            .send_form([("number", "x")])
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_error("^number: invalid digit")
            .await;
    }

    #[tokio::test]
    async fn test_blank_as_none_json() {
        let response = OneShotBuilder::new(app(), optionals_route())
            .send_json(serde_json::json!({"number": 7, "text": null}))
            .await
            .expect_json::<Optionals>()
            .await;
        assert_eq!(Optionals { number: Some(7), text: None }, response);

        let response = OneShotBuilder::new(app(), optionals_route())
            .send_json(serde_json::json!({"number": "", "text": "x"}))
            .await
            .expect_json::<Optionals>()
            .await;
        assert_eq!(Optionals { number: None, text: Some("x".to_owned()) }, response);

        OneShotBuilder::new(app(), optionals_route())
            .send_json(serde_json::json!({"number": 1.5}))
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_error("^number: invalid digit")
            .await;

        OneShotBuilder::new(app(), optionals_route())
            .send_json(serde_json::json!({"number": true}))
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_error("^number: invalid type: boolean")
            .await;
    }

    #[tokio::test]
    async fn test_payload_json_missing_field() {
        OneShotBuilder::new(app(), route())
            .send_json(serde_json::json!({"name": "foo"}))
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_error("missing field `count`")
            .await;
    }

    test_payload_must_be_data!(app(), route());

    #[tokio::test]
    async fn test_conflict_status() {
        OneShotBuilder::new(app(), (http::Method::POST, "/fail"))
            .send_empty()
            .await
            .expect_status(StatusCode::CONFLICT)
            .expect_error("Duplicate")
            .await;
    }

    test_payload_must_be_empty!(app(), (http::Method::POST, "/fail"));

    #[test]
    fn test_from_driver_error() {
        assert_eq!(
            RestError::NotFound("Car not found".to_owned()),
            RestError::from(DriverError::NotFound("Car not found".to_owned()))
        );
        assert_eq!(
            RestError::InvalidRequest("Bad year".to_owned()),
            RestError::from(DriverError::InvalidInput("Bad year".to_owned()))
        );
        assert_eq!(
            RestError::InternalError("Boom".to_owned()),
            RestError::from(DriverError::BackendError("Boom".to_owned()))
        );
    }
}
