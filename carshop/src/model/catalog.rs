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

//! Catalog of brands and the models they manufacture.

use crate::model::{BrandId, BrandName, ModelId, ModelName, search_term};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A car manufacturer.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize)]
pub struct Brand {
    /// Identifier of the brand.
    id: BrandId,

    /// Name of the brand, unique across brands.
    name: BrandName,
}

impl Brand {
    /// Creates a new brand.
    pub fn new(id: BrandId, name: BrandName) -> Self {
        Self { id, name }
    }
}

/// Criteria to select brands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BrandFilter {
    /// Case-insensitive substring to look for in the name.
    pub name: Option<String>,
}

impl BrandFilter {
    /// Creates a new filter.  Blank search terms are ignored.
    pub fn new(name: Option<String>) -> Self {
        Self { name: search_term(name) }
    }
}

/// Contents of a model record, without its identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct NewModel {
    /// Brand that manufactures this model.
    pub brand_id: BrandId,

    /// Name of the model.
    pub name: ModelName,
}

impl NewModel {
    /// Overwrites the fields of this record with those present in `update`.
    pub fn apply(mut self, update: ModelUpdate) -> Self {
        if let Some(brand_id) = update.brand_id {
            self.brand_id = brand_id;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        self
    }
}

/// Partial modification of a model record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelUpdate {
    /// New brand, if any.
    pub brand_id: Option<BrandId>,

    /// New name, if any.
    pub name: Option<ModelName>,
}

/// A car model in the catalog.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize)]
pub struct Model {
    /// Identifier of the model.
    id: ModelId,

    /// Brand that manufactures this model.
    brand_id: BrandId,

    /// Name of the model.
    name: ModelName,
}

impl Model {
    /// Creates a stored model from its identifier and its contents.
    pub fn new(id: ModelId, model: NewModel) -> Self {
        Self { id, brand_id: model.brand_id, name: model.name }
    }

    /// Splits the model into its identifier and its contents.
    pub fn into_parts(self) -> (ModelId, NewModel) {
        (self.id, NewModel { brand_id: self.brand_id, name: self.name })
    }
}

/// Criteria to select models.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelFilter {
    /// Brand the models must belong to.
    pub brand_id: Option<BrandId>,

    /// Case-insensitive substring to look for in the name.
    pub name: Option<String>,
}

impl ModelFilter {
    /// Creates a new filter.  Blank search terms are ignored.
    pub fn new(brand_id: Option<BrandId>, name: Option<String>) -> Self {
        Self { brand_id, name: search_term(name) }
    }
}
