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

//! Cars in the inventory of the dealership.

use crate::model::{BrandId, BrandName, CarId, Color, ModelId, ModelName, search_term};
use carshop_core::model::{ModelError, ModelResult};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Oldest manufacturing year we accept.
pub const YEAR_MIN: i32 = 1900;

/// Newest manufacturing year we accept.
pub const YEAR_MAX: i32 = 2100;

/// Upper bound (exclusive) for prices, in cents.  Matches a `NUMERIC(12, 2)` column.
pub const PRICE_MAX_CENTS: i64 = 1_000_000_000_000;

/// Manufacturing year of a car.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(into = "i32", try_from = "i64")]
pub struct Year(i32);

impl Year {
    /// Creates a new year after validating that it falls in the accepted range.
    pub fn new(year: i64) -> ModelResult<Self> {
        if !(i64::from(YEAR_MIN)..=i64::from(YEAR_MAX)).contains(&year) {
            return Err(ModelError(format!(
                "Year must be between {} and {}",
                YEAR_MIN, YEAR_MAX
            )));
        }
        Ok(Self(year as i32))
    }

    /// Returns the year as a number.
    pub fn as_i32(self) -> i32 {
        self.0
    }
}

impl From<Year> for i32 {
    fn from(value: Year) -> Self {
        value.0
    }
}

impl TryFrom<i64> for Year {
    type Error = ModelError;

    fn try_from(value: i64) -> ModelResult<Self> {
        Self::new(value)
    }
}

/// Generates a newtype for a non-negative count that fits in an `INTEGER` column.
macro_rules! count_type {
    ( $name:ident, $field:expr ) => {
        #[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
        #[serde(into = "i32", try_from = "i64")]
        pub struct $name(i32);

        impl $name {
            /// Creates a new value after validating that it is not negative.
            pub fn new(value: i64) -> ModelResult<Self> {
                if value < 0 {
                    return Err(ModelError(format!("{} cannot be negative", $field)));
                }
                match i32::try_from(value) {
                    Ok(value) => Ok(Self(value)),
                    Err(_) => Err(ModelError(format!("{} is too large", $field))),
                }
            }

            /// Returns the value as a number.
            pub fn as_i32(self) -> i32 {
                self.0
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = ModelError;

            fn try_from(value: i64) -> ModelResult<Self> {
                Self::new(value)
            }
        }
    };
}

count_type!(Mileage, "Mileage");
count_type!(Quantity, "Quantity");

/// Price of a car with two decimal places of precision.
///
/// Prices are kept as an integral number of cents to avoid rounding surprises when they go in
/// and out of the database, and are exposed as a decimal number in the API.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(into = "f64", try_from = "f64")]
pub struct Price(i64);

impl Price {
    /// Creates a price from an amount expressed in cents.
    pub fn from_cents(cents: i64) -> ModelResult<Self> {
        if cents < 0 {
            return Err(ModelError("Price cannot be negative".to_owned()));
        }
        if cents >= PRICE_MAX_CENTS {
            return Err(ModelError(format!(
                "Price must be less than {}",
                PRICE_MAX_CENTS / 100
            )));
        }
        Ok(Self(cents))
    }

    /// Creates a price from a decimal amount, rounding it to the nearest cent.
    pub fn from_f64(amount: f64) -> ModelResult<Self> {
        if !amount.is_finite() {
            return Err(ModelError("Price must be a number".to_owned()));
        }
        let cents = (amount * 100.0).round();
        if cents >= PRICE_MAX_CENTS as f64 {
            return Self::from_cents(PRICE_MAX_CENTS);
        }
        Self::from_cents(cents as i64)
    }

    /// Returns the price in cents.
    pub fn as_cents(self) -> i64 {
        self.0
    }

    /// Returns the price as a decimal amount.
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.as_f64()
    }
}

impl TryFrom<f64> for Price {
    type Error = ModelError;

    fn try_from(value: f64) -> ModelResult<Self> {
        Self::from_f64(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Availability of a car for sale.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(into = "String", try_from = "String")]
pub enum CarStatus {
    /// The car is listed for sale.
    #[default]
    Active,

    /// The car is kept in the inventory but not listed.
    Inactive,
}

impl CarStatus {
    /// Returns the canonical textual representation of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            CarStatus::Active => "Active",
            CarStatus::Inactive => "Inactive",
        }
    }
}

impl FromStr for CarStatus {
    type Err = ModelError;

    /// Parses a status case-insensitively.  The Portuguese names used by older records of the
    /// dealership are accepted as aliases.
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" | "ativo" => Ok(CarStatus::Active),
            "inactive" | "inativo" => Ok(CarStatus::Inactive),
            _ => Err(ModelError("Status must be Active or Inactive".to_owned())),
        }
    }
}

impl From<CarStatus> for String {
    fn from(value: CarStatus) -> Self {
        value.as_str().to_owned()
    }
}

impl TryFrom<String> for CarStatus {
    type Error = ModelError;

    fn try_from(value: String) -> ModelResult<Self> {
        value.parse()
    }
}

/// Contents of a car record, without its identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCar {
    /// Brand of the car as free text.
    pub brand: BrandName,

    /// Model of the car as free text.
    pub model: ModelName,

    /// Manufacturing year.
    pub year: Year,

    /// Color of the car, which may be empty.
    pub color: Color,

    /// Odometer reading in kilometers.
    pub mileage_km: Mileage,

    /// Asking price.
    pub price: Price,

    /// Number of units of this car in stock.
    pub quantity: Quantity,

    /// Whether the car is listed for sale.
    pub status: CarStatus,

    /// Optional link to the brand in the catalog.
    pub brand_id: Option<BrandId>,

    /// Optional link to the model in the catalog.
    pub model_id: Option<ModelId>,
}

impl NewCar {
    /// Creates a car record with the mandatory fields and defaults for the rest.
    pub fn new(brand: BrandName, model: ModelName, year: Year, price: Price) -> Self {
        Self {
            brand,
            model,
            year,
            color: Color::default(),
            mileage_km: Mileage::default(),
            price,
            quantity: Quantity::default(),
            status: CarStatus::default(),
            brand_id: None,
            model_id: None,
        }
    }

    /// Overwrites the fields of this record with those present in `update`.
    pub fn apply(mut self, update: CarUpdate) -> Self {
        if let Some(brand) = update.brand {
            self.brand = brand;
        }
        if let Some(model) = update.model {
            self.model = model;
        }
        if let Some(year) = update.year {
            self.year = year;
        }
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(mileage_km) = update.mileage_km {
            self.mileage_km = mileage_km;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if update.brand_id.is_some() {
            self.brand_id = update.brand_id;
        }
        if update.model_id.is_some() {
            self.model_id = update.model_id;
        }
        self
    }
}

/// Partial modification of a car record.  Only the fields that are present change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CarUpdate {
    /// New brand, if any.
    pub brand: Option<BrandName>,

    /// New model, if any.
    pub model: Option<ModelName>,

    /// New year, if any.
    pub year: Option<Year>,

    /// New color, if any.
    pub color: Option<Color>,

    /// New mileage, if any.
    pub mileage_km: Option<Mileage>,

    /// New price, if any.
    pub price: Option<Price>,

    /// New quantity, if any.
    pub quantity: Option<Quantity>,

    /// New status, if any.
    pub status: Option<CarStatus>,

    /// New catalog brand, if any.
    pub brand_id: Option<BrandId>,

    /// New catalog model, if any.
    pub model_id: Option<ModelId>,
}

/// A car stored in the inventory.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize)]
pub struct Car {
    /// Identifier of the car.
    id: CarId,

    /// Brand of the car as free text.
    brand: BrandName,

    /// Model of the car as free text.
    model: ModelName,

    /// Manufacturing year.
    year: Year,

    /// Color of the car, which may be empty.
    color: Color,

    /// Odometer reading in kilometers.
    mileage_km: Mileage,

    /// Asking price.
    price: Price,

    /// Number of units of this car in stock.
    quantity: Quantity,

    /// Whether the car is listed for sale.
    status: CarStatus,

    /// Link to the brand in the catalog.
    brand_id: Option<BrandId>,

    /// Link to the model in the catalog.
    model_id: Option<ModelId>,
}

impl Car {
    /// Creates a stored car from its identifier and its contents.
    pub fn new(id: CarId, car: NewCar) -> Self {
        Self {
            id,
            brand: car.brand,
            model: car.model,
            year: car.year,
            color: car.color,
            mileage_km: car.mileage_km,
            price: car.price,
            quantity: car.quantity,
            status: car.status,
            brand_id: car.brand_id,
            model_id: car.model_id,
        }
    }

    /// Splits the car into its identifier and its contents.
    pub fn into_parts(self) -> (CarId, NewCar) {
        let car = NewCar {
            brand: self.brand,
            model: self.model,
            year: self.year,
            color: self.color,
            mileage_km: self.mileage_km,
            price: self.price,
            quantity: self.quantity,
            status: self.status,
            brand_id: self.brand_id,
            model_id: self.model_id,
        };
        (self.id, car)
    }
}

/// Criteria to select cars when listing the inventory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CarFilter {
    /// Case-insensitive substring to look for in the brand.
    pub brand: Option<String>,

    /// Case-insensitive substring to look for in the model.
    pub model: Option<String>,

    /// Exact status to match.
    pub status: Option<CarStatus>,
}

impl CarFilter {
    /// Creates a new filter.  Blank search terms are ignored.
    pub fn new(brand: Option<String>, model: Option<String>, status: Option<CarStatus>) -> Self {
        Self { brand: search_term(brand), model: search_term(model), status }
    }
}
