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

//! Short, length-bounded text fields.

use carshop_core::model::{ModelError, ModelResult, bounded_text};
use serde::{Deserialize, Serialize};

/// Maximum length of a brand name.
pub const BRAND_NAME_MAX_LEN: usize = 60;

/// Maximum length of a model name.
pub const MODEL_NAME_MAX_LEN: usize = 80;

/// Maximum length of a color description.
pub const COLOR_MAX_LEN: usize = 40;

/// Maximum length of a client's name.
pub const CLIENT_NAME_MAX_LEN: usize = 120;

/// Generates a text newtype that trims its input and bounds its length.
macro_rules! text_type {
    ( $name:ident, $field:expr, $max_len:expr, $required:expr ) => {
        #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
        #[serde(into = "String", try_from = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new value after validating it.
            pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
                bounded_text($field, s, $max_len, $required).map(Self)
            }

            /// Returns a string view of the value.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ModelError;

            fn try_from(value: String) -> ModelResult<Self> {
                Self::new(value)
            }
        }

        #[cfg(test)]
        impl From<&'static str> for $name {
            fn from(s: &'static str) -> Self {
                Self::new(s).unwrap()
            }
        }
    };
}

text_type!(BrandName, "Brand", BRAND_NAME_MAX_LEN, true);
text_type!(ModelName, "Model", MODEL_NAME_MAX_LEN, true);
text_type!(Color, "Color", COLOR_MAX_LEN, false);
text_type!(ClientName, "Name", CLIENT_NAME_MAX_LEN, true);

impl Default for Color {
    fn default() -> Self {
        Self(String::new())
    }
}
