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

//! Operations on the brands of the catalog.

use crate::db;
use crate::driver::{Driver, not_found};
use crate::model::*;
use carshop_core::db::DbError;
use carshop_core::driver::{DriverError, DriverResult};

/// Converts a database error raised while writing the brand `name` into a driver error.
fn name_conflict(e: DbError, name: &BrandName) -> DriverError {
    match e {
        DbError::AlreadyExists => {
            DriverError::AlreadyExists(format!("Brand {} already exists", name.as_str()))
        }
        e => e.into(),
    }
}

impl Driver {
    /// Adds a brand named `name` to the catalog.
    pub(crate) async fn create_brand(self, name: BrandName) -> DriverResult<Brand> {
        let mut tx = self.db.begin().await?;
        let brand =
            db::create_brand(tx.ex(), name.clone()).await.map_err(|e| name_conflict(e, &name))?;
        tx.commit().await?;
        Ok(brand)
    }

    /// Gets the brand identified by `id`.
    pub(crate) async fn get_brand(self, id: BrandId) -> DriverResult<Brand> {
        let mut tx = self.db.begin().await?;
        let brand = db::get_brand(tx.ex(), id).await.map_err(|e| not_found(e, "Brand", id))?;
        tx.commit().await?;
        Ok(brand)
    }

    /// Gets all brands that match `filter`, sorted by name.
    pub(crate) async fn list_brands(self, filter: BrandFilter) -> DriverResult<Vec<Brand>> {
        let mut tx = self.db.begin().await?;
        let brands = db::list_brands(tx.ex(), &filter).await?;
        tx.commit().await?;
        Ok(brands)
    }

    /// Renames the brand identified by `id` to `name`.
    pub(crate) async fn update_brand(self, id: BrandId, name: BrandName) -> DriverResult<Brand> {
        let mut tx = self.db.begin().await?;
        db::update_brand(tx.ex(), id, &name).await.map_err(|e| match e {
            DbError::NotFound => not_found(e, "Brand", id),
            e => name_conflict(e, &name),
        })?;
        tx.commit().await?;
        Ok(Brand::new(id, name))
    }

    /// Deletes the brand identified by `id` together with its models.
    pub(crate) async fn delete_brand(self, id: BrandId) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        db::delete_brand(tx.ex(), id).await.map_err(|e| not_found(e, "Brand", id))?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;

    #[tokio::test]
    async fn test_create_brand_ok() {
        let context = TestContext::setup().await;

        let brand = context.driver().create_brand(BrandName::from("Renault")).await.unwrap();

        assert_eq!(brand, db::get_brand(&mut context.ex().await, *brand.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_brand_duplicate() {
        let context = TestContext::setup().await;
        context.create_brand("Renault").await;

        assert_eq!(
            DriverError::AlreadyExists("Brand Renault already exists".to_owned()),
            context.driver().create_brand(BrandName::from("Renault")).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_get_brand() {
        let context = TestContext::setup().await;
        let brand = context.create_brand("Renault").await;

        assert_eq!(brand, context.driver().get_brand(*brand.id()).await.unwrap());
        assert_eq!(
            DriverError::NotFound("Brand 99 not found".to_owned()),
            context.driver().get_brand(BrandId::new(99)).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_list_brands() {
        let context = TestContext::setup().await;
        let renault = context.create_brand("Renault").await;
        let peugeot = context.create_brand("Peugeot").await;

        assert_eq!(
            vec![peugeot, renault.clone()],
            context.driver().list_brands(BrandFilter::default()).await.unwrap()
        );
        assert_eq!(
            vec![renault],
            context.driver().list_brands(BrandFilter::new(Some("nau".to_owned()))).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_update_brand() {
        let context = TestContext::setup().await;
        let brand = context.create_brand("Renalt").await;
        context.create_brand("Peugeot").await;

        let updated =
            context.driver().update_brand(*brand.id(), BrandName::from("Renault")).await.unwrap();
        assert_eq!(Brand::new(*brand.id(), BrandName::from("Renault")), updated);

        assert_eq!(
            DriverError::AlreadyExists("Brand Peugeot already exists".to_owned()),
            context.driver().update_brand(*brand.id(), BrandName::from("Peugeot")).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_update_brand_not_found() {
        let context = TestContext::setup().await;

        assert_eq!(
            DriverError::NotFound("Brand 2 not found".to_owned()),
            context.driver().update_brand(BrandId::new(2), BrandName::from("X")).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_delete_brand_cascades_to_models() {
        let context = TestContext::setup().await;
        let brand = context.create_brand("Renault").await;
        let model = context.create_model(&brand, "Sandero").await;

        context.driver().delete_brand(*brand.id()).await.unwrap();

        assert_eq!(
            DriverError::NotFound(format!("Model {} not found", model.id())),
            context.driver().get_model(*model.id()).await.unwrap_err()
        );
        assert_eq!(
            DriverError::NotFound(format!("Brand {} not found", brand.id())),
            context.driver().delete_brand(*brand.id()).await.unwrap_err()
        );
    }
}
