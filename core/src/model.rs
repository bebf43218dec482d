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

//! Errors for the data types of the model layer.

/// Errors caused by invalid data in the model.
///
/// The message is meant to be shown to the user as is, so it should name the offending field
/// and the constraint that was violated.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ModelError(pub String);

/// Result type for this module.
pub type ModelResult<T> = Result<T, ModelError>;

/// Validates that the text in `s` is not longer than `max_len` characters, after trimming
/// leading and trailing whitespace, and returns the trimmed text.
///
/// `field` is the user-visible name of the field for error reporting purposes.  If `required`
/// is true, the trimmed text must also not be empty.
pub fn bounded_text<S: Into<String>>(
    field: &str,
    s: S,
    max_len: usize,
    required: bool,
) -> ModelResult<String> {
    let s = s.into();
    let trimmed = s.trim();
    if required && trimmed.is_empty() {
        return Err(ModelError(format!("{} cannot be empty", field)));
    }
    if trimmed.chars().count() > max_len {
        return Err(ModelError(format!("{} cannot be longer than {} characters", field, max_len)));
    }
    Ok(trimmed.to_owned())
}
