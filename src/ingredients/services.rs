use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::repo_types::{Ingredient, IngredientChanges, NewIngredient};
use crate::error::{ApiError, ApiResult};
use crate::pricing::services::PricingEngine;
use crate::store::Store;

pub(crate) async fn require_ingredient(store: &dyn Store, id: Uuid) -> ApiResult<Ingredient> {
    store.get_ingredient(id).await?.ok_or_else(|| {
        ApiError::invalid("ingredient_id", "referenced ingredient does not exist")
    })
}

pub struct IngredientManager {
    store: Arc<dyn Store>,
}

impl IngredientManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn pricing(&self) -> PricingEngine {
        PricingEngine::new(self.store.clone())
    }

    pub async fn create(&self, new: NewIngredient) -> ApiResult<Ingredient> {
        let ingredient = self.store.insert_ingredient(new).await?;
        info!(ingredient_id = %ingredient.id, name = %ingredient.name, "ingredient created");
        Ok(ingredient)
    }

    pub async fn get_by_id(&self, id: Uuid) -> ApiResult<Option<Ingredient>> {
        Ok(self.store.get_ingredient(id).await?)
    }

    pub async fn list_all(&self) -> ApiResult<Vec<Ingredient>> {
        Ok(self.store.list_ingredients().await?)
    }

    /// A price change re-prices every meal using the ingredient, and is
    /// refused when a resulting meal price or plan total would not fit.
    pub async fn update(
        &self,
        id: Uuid,
        changes: IngredientChanges,
    ) -> ApiResult<Option<Ingredient>> {
        let reprice = changes.price_per_unit.is_some();
        if let Some(price_per_unit) = changes.price_per_unit {
            self.check_new_price(id, price_per_unit).await?;
        }
        let updated = self.store.update_ingredient(id, changes).await?;
        if reprice && updated.is_some() {
            let meals = self.store.meals_using_ingredient(id).await?;
            self.pricing().refresh_meals(&meals).await?;
        }
        Ok(updated)
    }

    async fn check_new_price(&self, id: Uuid, price_per_unit: Decimal) -> ApiResult<()> {
        let mut projected = Vec::new();
        for meal_id in self.store.meals_using_ingredient(id).await? {
            let lines = self.store.list_meal_ingredients(meal_id).await?;
            let price = lines
                .iter()
                .map(|l| {
                    let unit = if l.ingredient_id == id { price_per_unit } else { l.price_per_unit };
                    unit * l.quantity
                })
                .sum::<Decimal>();
            projected.push((meal_id, price));
        }
        self.pricing()
            .check_meal_prices(&projected, "price_per_unit")
            .await
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        // collect before the cascade drops the links
        let meals = self.store.meals_using_ingredient(id).await?;
        let deleted = self.store.delete_ingredient(id).await?;
        if deleted {
            info!(ingredient_id = %id, affected_meals = meals.len(), "ingredient deleted");
            self.pricing().refresh_meals(&meals).await?;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::repo_types::NewMeal;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn price_changes_and_deletes_reprice_meals() {
        let store = Arc::new(MemoryStore::new());
        let manager = IngredientManager::new(store.clone());
        let egg = manager
            .create(NewIngredient {
                name: "Egg".into(),
                price_per_unit: Decimal::new(50, 2),
                unit: "piece".into(),
                store_name: None,
                valid_from: None,
            })
            .await
            .unwrap();
        let meal = store
            .insert_meal(NewMeal {
                name: "Omelette".into(),
                description: None,
                diet_type_id: None,
            })
            .await
            .unwrap();
        store
            .add_meal_ingredient(meal.id, egg.id, Decimal::from(3))
            .await
            .unwrap();

        manager
            .update(
                egg.id,
                IngredientChanges {
                    price_per_unit: Some(Decimal::new(40, 2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        let price = store.get_meal(meal.id).await.unwrap().unwrap().price;
        assert_eq!(price, Decimal::new(120, 2));

        assert!(manager.delete(egg.id).await.unwrap());
        assert!(!manager.delete(egg.id).await.unwrap());
        let price = store.get_meal(meal.id).await.unwrap().unwrap().price;
        assert_eq!(price, Decimal::ZERO);
    }

    #[tokio::test]
    async fn price_change_that_would_overflow_a_meal_is_refused() {
        let store = Arc::new(MemoryStore::new());
        let manager = IngredientManager::new(store.clone());
        let saffron = manager
            .create(NewIngredient {
                name: "Saffron".into(),
                price_per_unit: Decimal::ONE,
                unit: "g".into(),
                store_name: None,
                valid_from: None,
            })
            .await
            .unwrap();
        let meal = store
            .insert_meal(NewMeal {
                name: "Paella".into(),
                description: None,
                diet_type_id: None,
            })
            .await
            .unwrap();
        store
            .add_meal_ingredient(meal.id, saffron.id, Decimal::new(99_999, 2))
            .await
            .unwrap();

        let err = manager
            .update(
                saffron.id,
                IngredientChanges {
                    price_per_unit: Some(Decimal::new(9_999_999_999, 2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        match err {
            ApiError::Validation(fields) => assert!(fields.get("price_per_unit").is_some()),
            other => panic!("unexpected {other:?}"),
        }
        let kept = manager.get_by_id(saffron.id).await.unwrap().unwrap();
        assert_eq!(kept.price_per_unit, Decimal::ONE);
    }
}
