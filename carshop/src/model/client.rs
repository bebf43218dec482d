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

//! Clients of the dealership.

use crate::model::{ClientId, ClientName, search_term};
use carshop_core::model::{ModelError, ModelResult};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::Date;
use time::format_description::FormatItem;
use time::macros::{date, format_description};

/// Number of digits in a CPF.
pub const CPF_DIGITS: usize = 11;

/// Earliest birth date we accept.
pub const BIRTH_DATE_MIN: Date = date!(1900 - 01 - 01);

/// Format of birth dates in the API and in text columns.
const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Removes the punctuation that is typically used to format a CPF (`123.456.789-01`).
fn strip_cpf_formatting(s: &str) -> String {
    s.chars().filter(|ch| !matches!(ch, '.' | '-' | ' ')).collect()
}

/// A CPF, the 11-digit identifier of individual taxpayers in Brazil.
///
/// Only the number of digits is validated.  The check digits are not verified.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(into = "String", try_from = "String")]
pub struct Cpf(String);

impl Cpf {
    /// Creates a new CPF from text that may contain formatting characters.
    pub fn new<S: AsRef<str>>(s: S) -> ModelResult<Self> {
        let digits = strip_cpf_formatting(s.as_ref());
        if digits.len() != CPF_DIGITS || !digits.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(ModelError(format!("CPF must have exactly {} digits", CPF_DIGITS)));
        }
        Ok(Self(digits))
    }

    /// Returns the bare digits of the CPF.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Cpf> for String {
    fn from(value: Cpf) -> Self {
        value.0
    }
}

impl TryFrom<String> for Cpf {
    type Error = ModelError;

    fn try_from(value: String) -> ModelResult<Self> {
        Self::new(value)
    }
}

#[cfg(test)]
impl From<&'static str> for Cpf {
    fn from(s: &'static str) -> Self {
        Self::new(s).unwrap()
    }
}

/// The leading digits of a CPF, used to search for clients.
#[derive(Clone, Debug, PartialEq)]
pub struct CpfPrefix(String);

impl CpfPrefix {
    /// Creates a new prefix from text that may contain formatting characters.
    pub fn new<S: AsRef<str>>(s: S) -> ModelResult<Self> {
        let digits = strip_cpf_formatting(s.as_ref());
        if digits.len() > CPF_DIGITS || !digits.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(ModelError(format!(
                "CPF filter must have at most {} digits",
                CPF_DIGITS
            )));
        }
        Ok(Self(digits))
    }

    /// Returns the digits in the prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Birth date of a client.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(into = "String", try_from = "String")]
pub struct BirthDate(Date);

impl BirthDate {
    /// Creates a new birth date after validating that it is not earlier than `BIRTH_DATE_MIN`
    /// and not later than `today`.
    pub fn new(date: Date, today: Date) -> ModelResult<Self> {
        if date > today {
            return Err(ModelError("Birth date cannot be in the future".to_owned()));
        }
        Self::from_stored(date)
    }

    /// Parses a birth date in `YYYY-MM-DD` form and validates it against `today`.
    pub fn parse(s: &str, today: Date) -> ModelResult<Self> {
        Self::new(parse_date(s)?, today)
    }

    /// Creates a birth date that was validated at some point in the past.
    ///
    /// The upper bound cannot be checked here because "today" has moved since then, but the
    /// lower bound still holds.
    pub fn from_stored(date: Date) -> ModelResult<Self> {
        if date < BIRTH_DATE_MIN {
            return Err(ModelError("Birth date cannot be before 1900-01-01".to_owned()));
        }
        Ok(Self(date))
    }

    /// Returns the date.
    pub fn as_date(self) -> Date {
        self.0
    }
}

/// Parses a date in `YYYY-MM-DD` form.
fn parse_date(s: &str) -> ModelResult<Date> {
    Date::parse(s.trim(), DATE_FORMAT)
        .map_err(|_| ModelError(format!("Birth date '{}' is not a valid YYYY-MM-DD date", s)))
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.format(DATE_FORMAT) {
            Ok(s) => write!(f, "{}", s),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl From<BirthDate> for String {
    fn from(value: BirthDate) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for BirthDate {
    type Error = ModelError;

    fn try_from(value: String) -> ModelResult<Self> {
        Self::from_stored(parse_date(&value)?)
    }
}

/// Contents of a client record, without its identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct NewClient {
    /// Full name.
    pub name: ClientName,

    /// Taxpayer identifier, unique across clients.
    pub cpf: Cpf,

    /// Date of birth.
    pub birth_date: BirthDate,
}

impl NewClient {
    /// Overwrites the fields of this record with those present in `update`.
    pub fn apply(mut self, update: ClientUpdate) -> Self {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(cpf) = update.cpf {
            self.cpf = cpf;
        }
        if let Some(birth_date) = update.birth_date {
            self.birth_date = birth_date;
        }
        self
    }
}

/// Partial modification of a client record.  Only the fields that are present change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientUpdate {
    /// New name, if any.
    pub name: Option<ClientName>,

    /// New CPF, if any.
    pub cpf: Option<Cpf>,

    /// New birth date, if any.
    pub birth_date: Option<BirthDate>,
}

/// A registered client.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize)]
pub struct Client {
    /// Identifier of the client.
    id: ClientId,

    /// Full name.
    name: ClientName,

    /// Taxpayer identifier, unique across clients.
    cpf: Cpf,

    /// Date of birth.
    birth_date: BirthDate,
}

impl Client {
    /// Creates a stored client from its identifier and its contents.
    pub fn new(id: ClientId, client: NewClient) -> Self {
        Self { id, name: client.name, cpf: client.cpf, birth_date: client.birth_date }
    }

    /// Splits the client into its identifier and its contents.
    pub fn into_parts(self) -> (ClientId, NewClient) {
        (self.id, NewClient { name: self.name, cpf: self.cpf, birth_date: self.birth_date })
    }
}

/// Criteria to select clients.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientFilter {
    /// Case-insensitive substring to look for in the name.
    pub name: Option<String>,

    /// Leading digits of the CPF.
    pub cpf: Option<CpfPrefix>,
}

impl ClientFilter {
    /// Creates a new filter.  Blank search terms are ignored.
    pub fn new(name: Option<String>, cpf: Option<String>) -> ModelResult<Self> {
        let cpf = match search_term(cpf) {
            Some(cpf) => Some(CpfPrefix::new(cpf)?),
            None => None,
        };
        Ok(Self { name: search_term(name), cpf })
    }
}
