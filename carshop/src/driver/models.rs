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

//! Operations on the models of the catalog.

use crate::db;
use crate::driver::{Driver, not_found};
use crate::model::*;
use carshop_core::driver::DriverResult;

impl Driver {
    /// Adds a new `model` to the catalog.  Its brand must exist.
    pub(crate) async fn create_model(self, model: NewModel) -> DriverResult<Model> {
        let brand_id = model.brand_id;

        let mut tx = self.db.begin().await?;
        db::get_brand(tx.ex(), brand_id).await.map_err(|e| not_found(e, "Brand", brand_id))?;
        let model = db::create_model(tx.ex(), model).await?;
        tx.commit().await?;
        Ok(model)
    }

    /// Gets the model identified by `id`.
    pub(crate) async fn get_model(self, id: ModelId) -> DriverResult<Model> {
        let mut tx = self.db.begin().await?;
        let model = db::get_model(tx.ex(), id).await.map_err(|e| not_found(e, "Model", id))?;
        tx.commit().await?;
        Ok(model)
    }

    /// Gets all models that match `filter`, sorted by name.
    pub(crate) async fn list_models(self, filter: ModelFilter) -> DriverResult<Vec<Model>> {
        let mut tx = self.db.begin().await?;
        let models = db::list_models(tx.ex(), &filter).await?;
        tx.commit().await?;
        Ok(models)
    }

    /// Modifies the fields of the model identified by `id` that are present in `update`.
    pub(crate) async fn update_model(self, id: ModelId, update: ModelUpdate) -> DriverResult<Model> {
        let mut tx = self.db.begin().await?;
        let (_, model) =
            db::get_model(tx.ex(), id).await.map_err(|e| not_found(e, "Model", id))?.into_parts();

        let old_brand_id = model.brand_id;
        let new_brand = match update.brand_id {
            Some(brand_id) => Some(
                db::get_brand(tx.ex(), brand_id)
                    .await
                    .map_err(|e| not_found(e, "Brand", brand_id))?,
            ),
            None => None,
        };
        let model = model.apply(update);
        db::update_model(tx.ex(), id, &model).await?;

        // Cars that reference this model must follow it to its new brand.
        if let Some(brand) = new_brand.filter(|brand| *brand.id() != old_brand_id) {
            db::rebrand_cars_of_model(tx.ex(), id, &brand).await?;
        }

        tx.commit().await?;
        Ok(Model::new(id, model))
    }

    /// Deletes the model identified by `id`.
    pub(crate) async fn delete_model(self, id: ModelId) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        db::delete_model(tx.ex(), id).await.map_err(|e| not_found(e, "Model", id))?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;
    use carshop_core::driver::DriverError;

    #[tokio::test]
    async fn test_create_model_ok() {
        let context = TestContext::setup().await;
        let brand = context.create_brand("Jeep").await;

        let model = context
            .driver()
            .create_model(NewModel { brand_id: *brand.id(), name: ModelName::from("Renegade") })
            .await
            .unwrap();

        assert_eq!(model, db::get_model(&mut context.ex().await, *model.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_model_unknown_brand() {
        let context = TestContext::setup().await;

        assert_eq!(
            DriverError::NotFound("Brand 6 not found".to_owned()),
            context
                .driver()
                .create_model(NewModel { brand_id: BrandId::new(6), name: ModelName::from("X") })
                .await
                .unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_list_models_by_brand() {
        let context = TestContext::setup().await;
        let jeep = context.create_brand("Jeep").await;
        let fiat = context.create_brand("Fiat").await;
        let renegade = context.create_model(&jeep, "Renegade").await;
        let compass = context.create_model(&jeep, "Compass").await;
        context.create_model(&fiat, "Toro").await;

        let filter = ModelFilter::new(Some(*jeep.id()), None);
        assert_eq!(vec![compass, renegade], context.driver().list_models(filter).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_model_partial() {
        let context = TestContext::setup().await;
        let jeep = context.create_brand("Jeep").await;
        let fiat = context.create_brand("Fiat").await;
        let toro = context.create_model(&jeep, "Toro").await;

        let update = ModelUpdate { brand_id: Some(*fiat.id()), name: None };
        let updated = context.driver().update_model(*toro.id(), update).await.unwrap();

        let exp_model =
            Model::new(*toro.id(), NewModel { brand_id: *fiat.id(), name: ModelName::from("Toro") });
        assert_eq!(exp_model, updated);
        assert_eq!(exp_model, db::get_model(&mut context.ex().await, *toro.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_model_brand_moves_cars() {
        let context = TestContext::setup().await;
        let jeep = context.create_brand("Jeep").await;
        let fiat = context.create_brand("Fiat").await;
        let toro = context.create_model(&jeep, "Toro").await;
        let compass = context.create_model(&jeep, "Compass").await;

        let mut car = NewCar::new(
            BrandName::from("Jeep"),
            ModelName::from("Toro"),
            Year::new(2020).unwrap(),
            Price::from_cents(1).unwrap(),
        );
        car.model_id = Some(*toro.id());
        let toro_car = context.driver().create_car(car.clone()).await.unwrap();
        assert_eq!(Some(*jeep.id()), *toro_car.brand_id());

        car.model_id = Some(*compass.id());
        let compass_car = context.driver().create_car(car).await.unwrap();

        let update = ModelUpdate { brand_id: Some(*fiat.id()), name: None };
        context.driver().update_model(*toro.id(), update).await.unwrap();

        let toro_car = context.driver().get_car(*toro_car.id()).await.unwrap();
        assert_eq!(Some(*fiat.id()), *toro_car.brand_id());
        assert_eq!(Some(*toro.id()), *toro_car.model_id());
        assert_eq!("Fiat", toro_car.brand().as_str());

        let compass_car2 = context.driver().get_car(*compass_car.id()).await.unwrap();
        assert_eq!(compass_car, compass_car2);

        // Fails with an inconsistent brand if the references were left stale.
        let update = CarUpdate { quantity: Some(Quantity::new(2).unwrap()), ..Default::default() };
        context.driver().update_car(*toro_car.id(), update).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_model_same_brand_keeps_cars() {
        let context = TestContext::setup().await;
        let jeep = context.create_brand("Jeep").await;
        let toro = context.create_model(&jeep, "Toro").await;

        let mut car = NewCar::new(
            BrandName::from("Jeep Custom"),
            ModelName::from("Toro"),
            Year::new(2020).unwrap(),
            Price::from_cents(1).unwrap(),
        );
        car.model_id = Some(*toro.id());
        let car = context.driver().create_car(car).await.unwrap();

        let update = ModelUpdate { brand_id: Some(*jeep.id()), name: Some(ModelName::from("Toro 2")) };
        context.driver().update_model(*toro.id(), update).await.unwrap();

        assert_eq!(car, context.driver().get_car(*car.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_model_errors() {
        let context = TestContext::setup().await;
        let jeep = context.create_brand("Jeep").await;
        let toro = context.create_model(&jeep, "Toro").await;

        assert_eq!(
            DriverError::NotFound("Model 50 not found".to_owned()),
            context
                .driver()
                .update_model(ModelId::new(50), ModelUpdate::default())
                .await
                .unwrap_err()
        );

        let update = ModelUpdate { brand_id: Some(BrandId::new(51)), name: None };
        assert_eq!(
            DriverError::NotFound("Brand 51 not found".to_owned()),
            context.driver().update_model(*toro.id(), update).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_delete_model_clears_car_reference() {
        let context = TestContext::setup().await;
        let jeep = context.create_brand("Jeep").await;
        let toro = context.create_model(&jeep, "Toro").await;

        let mut car = NewCar::new(
            BrandName::from("Jeep"),
            ModelName::from("Toro"),
            Year::new(2022).unwrap(),
            Price::from_cents(1).unwrap(),
        );
        car.model_id = Some(*toro.id());
        let car = context.driver().create_car(car).await.unwrap();

        context.driver().delete_model(*toro.id()).await.unwrap();

        let car = context.driver().get_car(*car.id()).await.unwrap();
        assert_eq!(None, *car.model_id());
        assert_eq!(Some(*jeep.id()), *car.brand_id());
    }
}
