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

//! Scaffolding shared by the layers of the CarShop service.
//!
//! The service adheres to the following layered architecture, and this crate provides the
//! pieces that are not specific to the dealership domain:
//!
//! 1.  `model`: This is the base layer, providing high-level data types that represent concepts in
//!     the domain of the application.  Validation happens when these types are constructed, so
//!     any instance that exists is known to be valid.  This crate only offers the `ModelError`.
//!
//! 1.  `db`: This is the persistence layer.  The service implements free functions that take an
//!     `Executor` and that dispatch to the right SQL dialect for the backing database.
//!
//! 1.  `driver`: This is the business logic layer.  The service provides its own `Driver` type
//!     to coordinate access to the database within transactions.
//!
//! 1.  `rest`: This is the HTTP layer, offering the REST APIs.  The service provides its own
//!     `axum::Router` and backs every API with a `Driver`.
//!
//! 1.  `main`: This is the app launcher.  Its sole purpose is to gather configuration data from
//!     environment variables and call the `serve` function to start the application.
//!
//! There are result and error types in every layer, such as `DbResult` and `DbError`.  Errors can
//! transparently float to the top of the app using the `?` operator, being translated to HTTP
//! status codes once returned from the REST layer.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

pub mod clocks;
pub mod db;
pub mod driver;
pub mod env;
pub mod model;
pub mod rest;
pub mod template;
