use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use super::repo_types::{Meal, MealChanges, MealIngredient, MealIngredientLine, NewMeal};
use crate::diet_types::services::require_diet_type;
use crate::error::{ApiError, ApiResult};
use crate::ingredients::services::require_ingredient;
use crate::pricing::services::{meal_price, PricingEngine};
use crate::store::Store;

pub(crate) async fn require_meal(store: &dyn Store, id: Uuid) -> ApiResult<Meal> {
    store
        .get_meal(id)
        .await?
        .ok_or_else(|| ApiError::invalid("meal_id", "referenced meal does not exist"))
}

pub struct MealManager {
    store: Arc<dyn Store>,
}

impl MealManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn pricing(&self) -> PricingEngine {
        PricingEngine::new(self.store.clone())
    }

    /// New meals start at price zero until ingredients are linked.
    pub async fn create(&self, new: NewMeal) -> ApiResult<Meal> {
        require_diet_type(self.store.as_ref(), new.diet_type_id).await?;
        let meal = self.store.insert_meal(new).await?;
        info!(meal_id = %meal.id, name = %meal.name, "meal created");
        Ok(meal)
    }

    pub async fn get_by_id(&self, id: Uuid) -> ApiResult<Option<Meal>> {
        Ok(self.store.get_meal(id).await?)
    }

    pub async fn list_all(&self) -> ApiResult<Vec<Meal>> {
        Ok(self.store.list_meals().await?)
    }

    pub async fn update(&self, id: Uuid, changes: MealChanges) -> ApiResult<Option<Meal>> {
        require_diet_type(self.store.as_ref(), changes.diet_type_id.flatten()).await?;
        Ok(self.store.update_meal(id, changes).await?)
    }

    /// Plans that held the meal are re-totalled afterwards.
    pub async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let plans = self.store.plans_containing_meal(id).await?;
        let deleted = self.store.delete_meal(id).await?;
        if deleted {
            info!(meal_id = %id, affected_plans = plans.len(), "meal deleted");
            self.pricing().refresh_plans(&plans).await?;
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    pub async fn add_ingredient(
        &self,
        meal_id: Uuid,
        ingredient_id: Uuid,
        quantity: Decimal,
    ) -> ApiResult<MealIngredient> {
        if self.store.get_meal(meal_id).await?.is_none() {
            return Err(ApiError::NotFound("meal"));
        }
        let ingredient = require_ingredient(self.store.as_ref(), ingredient_id).await?;
        let lines = self.store.list_meal_ingredients(meal_id).await?;
        let projected = meal_price(&lines) + ingredient.price_per_unit * quantity;
        self.pricing()
            .check_meal_price(meal_id, projected, "quantity")
            .await?;
        let link = self
            .store
            .add_meal_ingredient(meal_id, ingredient_id, quantity)
            .await?;
        self.pricing().refresh_meal(meal_id).await?;
        Ok(link)
    }

    pub async fn list_ingredients(&self, meal_id: Uuid) -> ApiResult<Vec<MealIngredientLine>> {
        if self.store.get_meal(meal_id).await?.is_none() {
            return Err(ApiError::NotFound("meal"));
        }
        Ok(self.store.list_meal_ingredients(meal_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn remove_ingredient(&self, meal_id: Uuid, ingredient_id: Uuid) -> ApiResult<bool> {
        let removed = self
            .store
            .remove_meal_ingredient(meal_id, ingredient_id)
            .await?;
        if removed {
            self.pricing().refresh_meal(meal_id).await?;
        }
        Ok(removed)
    }
}
