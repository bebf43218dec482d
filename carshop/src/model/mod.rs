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

//! High-level data types for the dealership.
//!
//! Every type in this module validates its contents at construction time, so the layers above
//! can assume that any instance they get is valid.

use serde::{Deserialize, Serialize};

mod car;
pub use car::{
    Car, CarFilter, CarStatus, CarUpdate, Mileage, NewCar, PRICE_MAX_CENTS, Price, Quantity,
    YEAR_MAX, YEAR_MIN, Year,
};
mod catalog;
pub use catalog::{Brand, BrandFilter, Model, ModelFilter, ModelUpdate, NewModel};
mod client;
pub use client::{
    BIRTH_DATE_MIN, BirthDate, CPF_DIGITS, Client, ClientFilter, ClientUpdate, Cpf, CpfPrefix,
    NewClient,
};
mod text;
pub use text::{
    BRAND_NAME_MAX_LEN, BrandName, CLIENT_NAME_MAX_LEN, COLOR_MAX_LEN, ClientName, Color,
    MODEL_NAME_MAX_LEN, ModelName,
};

/// Generates a newtype wrapper for the numeric identifier of an entity.
macro_rules! id_type {
    ( $name:ident, $what:expr ) => {
        #[doc = concat!("Identifier of ", $what, ".")]
        #[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier from its raw database value.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw value of the identifier.
            pub fn as_i64(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(BrandId, "a brand");
id_type!(CarId, "a car in the inventory");
id_type!(ClientId, "a client");
id_type!(ModelId, "a car model in the catalog");

/// Normalizes a free-form search term: trims it and turns empty strings into `None`.
pub(crate) fn search_term(term: Option<String>) -> Option<String> {
    term.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}
