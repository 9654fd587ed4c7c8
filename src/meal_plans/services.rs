use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use super::repo_types::{MealPlan, MealPlanChanges, NewMealPlan, PlanMeal};
use crate::error::{ApiError, ApiResult};
use crate::meals::repo_types::Meal;
use crate::meals::services::require_meal;
use crate::pricing::services::{plan_price, PricingEngine};
use crate::store::Store;
use crate::users::services::require_user;

pub struct MealPlanManager {
    store: Arc<dyn Store>,
}

impl MealPlanManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn pricing(&self) -> PricingEngine {
        PricingEngine::new(self.store.clone())
    }

    async fn require_plan(&self, plan_id: Uuid) -> ApiResult<()> {
        match self.store.get_meal_plan(plan_id).await? {
            Some(_) => Ok(()),
            None => Err(ApiError::NotFound("meal plan")),
        }
    }

    pub async fn create(&self, new: NewMealPlan) -> ApiResult<MealPlan> {
        require_user(self.store.as_ref(), new.user_id).await?;
        let plan = self.store.insert_meal_plan(new).await?;
        info!(plan_id = %plan.id, user_id = %plan.user_id, "meal plan created");
        Ok(plan)
    }

    pub async fn get_by_id(&self, id: Uuid) -> ApiResult<Option<MealPlan>> {
        Ok(self.store.get_meal_plan(id).await?)
    }

    pub async fn list_all(&self) -> ApiResult<Vec<MealPlan>> {
        Ok(self.store.list_meal_plans().await?)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> ApiResult<Vec<MealPlan>> {
        Ok(self.store.list_meal_plans_for_user(user_id).await?)
    }

    pub async fn update(&self, id: Uuid, changes: MealPlanChanges) -> ApiResult<Option<MealPlan>> {
        Ok(self.store.update_meal_plan(id, changes).await?)
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let deleted = self.store.delete_meal_plan(id).await?;
        if deleted {
            info!(plan_id = %id, "meal plan deleted");
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    pub async fn add_meal(&self, plan_id: Uuid, meal_id: Uuid) -> ApiResult<PlanMeal> {
        self.require_plan(plan_id).await?;
        let meal = require_meal(self.store.as_ref(), meal_id).await?;
        let meals = self.store.list_plan_meals(plan_id).await?;
        if !meals.iter().any(|m| m.id == meal_id) {
            self.pricing()
                .check_plan_total(plan_price(&meals) + meal.price, "meal_id")?;
        }
        let link = self.store.add_plan_meal(plan_id, meal_id).await?;
        self.pricing().refresh_plan(plan_id).await?;
        Ok(link)
    }

    pub async fn list_meals(&self, plan_id: Uuid) -> ApiResult<Vec<Meal>> {
        self.require_plan(plan_id).await?;
        Ok(self.store.list_plan_meals(plan_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn remove_meal(&self, plan_id: Uuid, meal_id: Uuid) -> ApiResult<bool> {
        let removed = self.store.remove_plan_meal(plan_id, meal_id).await?;
        if removed {
            self.pricing().refresh_plan(plan_id).await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::repo_types::NewMeal;
    use crate::store::MemoryStore;
    use crate::users::repo_types::NewUser;
    use rust_decimal::Decimal;

    async fn user(store: &MemoryStore, username: &str) -> Uuid {
        store
            .create_user(NewUser {
                username: username.into(),
                email: format!("{username}@example.com"),
                password_hash: "x".into(),
                is_staff: false,
                weight: None,
                height: None,
                age: None,
                diet_type_id: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn priced_meal(store: &MemoryStore, name: &str, price: Decimal) -> Uuid {
        let meal = store
            .insert_meal(NewMeal { name: name.into(), description: None, diet_type_id: None })
            .await
            .unwrap();
        store.set_meal_price(meal.id, price).await.unwrap();
        meal.id
    }

    #[tokio::test]
    async fn total_follows_plan_meals() {
        let store = Arc::new(MemoryStore::new());
        let plans = MealPlanManager::new(store.clone());
        let ann = user(&store, "ann").await;
        let plan = plans.create(NewMealPlan { user_id: ann, duration: 7 }).await.unwrap();
        let soup = priced_meal(&store, "Soup", Decimal::new(350, 2)).await;
        let salad = priced_meal(&store, "Salad", Decimal::new(425, 2)).await;

        plans.add_meal(plan.id, soup).await.unwrap();
        plans.add_meal(plan.id, salad).await.unwrap();
        let total = plans.get_by_id(plan.id).await.unwrap().unwrap().total_price;
        assert_eq!(total, Decimal::new(775, 2));
        assert_eq!(plans.list_meals(plan.id).await.unwrap().len(), 2);

        let dup = plans.add_meal(plan.id, soup).await.unwrap_err();
        assert!(matches!(dup, ApiError::Conflict(_)));

        assert!(plans.remove_meal(plan.id, soup).await.unwrap());
        let total = plans.get_by_id(plan.id).await.unwrap().unwrap().total_price;
        assert_eq!(total, Decimal::new(425, 2));
    }

    #[tokio::test]
    async fn lists_per_user_and_checks_references() {
        let store = Arc::new(MemoryStore::new());
        let plans = MealPlanManager::new(store.clone());
        let ann = user(&store, "ann").await;
        let bob = user(&store, "bob").await;
        plans.create(NewMealPlan { user_id: ann, duration: 7 }).await.unwrap();
        plans.create(NewMealPlan { user_id: bob, duration: 3 }).await.unwrap();
        assert_eq!(plans.list_all().await.unwrap().len(), 2);
        assert_eq!(plans.list_for_user(ann).await.unwrap().len(), 1);

        match plans
            .create(NewMealPlan { user_id: Uuid::new_v4(), duration: 1 })
            .await
            .unwrap_err()
        {
            ApiError::Validation(fields) => assert!(fields.get("user_id").is_some()),
            other => panic!("unexpected {other:?}"),
        }
        let missing = plans.add_meal(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(missing, ApiError::NotFound("meal plan")));
    }

    #[tokio::test]
    async fn meal_that_would_overflow_the_plan_total_is_refused() {
        let store = Arc::new(MemoryStore::new());
        let plans = MealPlanManager::new(store.clone());
        let ann = user(&store, "ann").await;
        let plan = plans.create(NewMealPlan { user_id: ann, duration: 365 }).await.unwrap();
        let top = Decimal::new(9_999_999_999, 2);
        for n in 0..100 {
            let meal = priced_meal(&store, &format!("Banquet {n}"), top).await;
            plans.add_meal(plan.id, meal).await.unwrap();
        }
        let total = plans.get_by_id(plan.id).await.unwrap().unwrap().total_price;
        assert_eq!(total, Decimal::new(999_999_999_900, 2));

        let one_more = priced_meal(&store, "Banquet 100", top).await;
        match plans.add_meal(plan.id, one_more).await.unwrap_err() {
            ApiError::Validation(fields) => assert!(fields.get("meal_id").is_some()),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(plans.list_meals(plan.id).await.unwrap().len(), 100);
    }
}
