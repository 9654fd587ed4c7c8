//! In-process store with the same constraint and cascade rules as the SQL
//! schema. Backs `DATABASE_URL=memory://` and the test suite.

use async_trait::async_trait;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ClearReport, Store, StoreError, StoreResult, MEAL_PRICE, PLAN_TOTAL};
use crate::diet_types::repo_types::{DietType, DietTypeChanges, NewDietType};
use crate::favorites::repo_types::{Favorite, FavoriteChanges, NewFavorite};
use crate::ingredients::repo_types::{Ingredient, IngredientChanges, NewIngredient};
use crate::meal_plans::repo_types::{MealPlan, MealPlanChanges, NewMealPlan, PlanMeal};
use crate::meals::repo_types::{Meal, MealChanges, MealIngredient, MealIngredientLine, NewMeal};
use crate::users::repo_types::{NewUser, User, UserChanges};

#[derive(Default)]
struct Tables {
    diet_types: Vec<DietType>,
    users: Vec<User>,
    ingredients: Vec<Ingredient>,
    meals: Vec<Meal>,
    meal_ingredients: Vec<MealIngredient>,
    meal_plans: Vec<MealPlan>,
    plan_meals: Vec<PlanMeal>,
    favorites: Vec<Favorite>,
}

impl Tables {
    fn require_diet_type(&self, id: Option<Uuid>) -> StoreResult<()> {
        match id {
            Some(id) if !self.diet_types.iter().any(|d| d.id == id) => {
                Err(StoreError::MissingReference("diet_type_id".into()))
            }
            _ => Ok(()),
        }
    }

    fn require_user(&self, id: Uuid) -> StoreResult<()> {
        if self.users.iter().any(|u| u.id == id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference("user_id".into()))
        }
    }

    fn require_meal(&self, id: Uuid) -> StoreResult<()> {
        if self.meals.iter().any(|m| m.id == id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference("meal_id".into()))
        }
    }

    fn remove_plan_cascade(&mut self, plan_id: Uuid) -> bool {
        let before = self.meal_plans.len();
        self.meal_plans.retain(|p| p.id != plan_id);
        self.plan_meals.retain(|pm| pm.plan_id != plan_id);
        self.meal_plans.len() != before
    }
}

/// `0.00`, the column default for cached prices.
const ZERO_MONEY: Decimal = Decimal::from_parts(0, 0, 0, false, 2);

fn drain_count<T>(rows: &mut Vec<T>) -> u64 {
    let n = rows.len() as u64;
    rows.clear();
    n
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn migrate(&self) -> StoreResult<()> {
        Ok(())
    }

    // --- diet types ---

    async fn insert_diet_type(&self, new: NewDietType) -> StoreResult<DietType> {
        let row = DietType {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            is_restricted: new.is_restricted,
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables.write().await.diet_types.push(row.clone());
        Ok(row)
    }

    async fn get_diet_type(&self, id: Uuid) -> StoreResult<Option<DietType>> {
        let t = self.tables.read().await;
        Ok(t.diet_types.iter().find(|d| d.id == id).cloned())
    }

    async fn list_diet_types(&self) -> StoreResult<Vec<DietType>> {
        let mut rows = self.tables.read().await.diet_types.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn update_diet_type(
        &self,
        id: Uuid,
        changes: DietTypeChanges,
    ) -> StoreResult<Option<DietType>> {
        let mut t = self.tables.write().await;
        let Some(row) = t.diet_types.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(description) = changes.description {
            row.description = description;
        }
        if let Some(is_restricted) = changes.is_restricted {
            row.is_restricted = is_restricted;
        }
        Ok(Some(row.clone()))
    }

    async fn delete_diet_type(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.diet_types.len();
        t.diet_types.retain(|d| d.id != id);
        if t.diet_types.len() == before {
            return Ok(false);
        }
        for user in t.users.iter_mut().filter(|u| u.diet_type_id == Some(id)) {
            user.diet_type_id = None;
        }
        for meal in t.meals.iter_mut().filter(|m| m.diet_type_id == Some(id)) {
            meal.diet_type_id = None;
        }
        Ok(true)
    }

    // --- users ---

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.username == new.username) {
            return Err(StoreError::conflict("auth_identities_username_key"));
        }
        t.require_diet_type(new.diet_type_id)?;
        let row = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            is_staff: new.is_staff,
            weight: new.weight,
            height: new.height,
            age: new.age,
            diet_type_id: new.diet_type_id,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(row.clone());
        Ok(row)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut rows = self.tables.read().await.users.clone();
        rows.reverse();
        Ok(rows)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>> {
        let mut t = self.tables.write().await;
        t.require_diet_type(changes.diet_type_id.flatten())?;
        let Some(row) = t.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(email) = changes.email {
            row.email = email;
        }
        if let Some(hash) = changes.password_hash {
            row.password_hash = hash;
        }
        if let Some(is_staff) = changes.is_staff {
            row.is_staff = is_staff;
        }
        if let Some(weight) = changes.weight {
            row.weight = weight;
        }
        if let Some(height) = changes.height {
            row.height = height;
        }
        if let Some(age) = changes.age {
            row.age = age;
        }
        if let Some(diet_type_id) = changes.diet_type_id {
            row.diet_type_id = diet_type_id;
        }
        Ok(Some(row.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.users.len();
        t.users.retain(|u| u.id != id);
        if t.users.len() == before {
            return Ok(false);
        }
        let plan_ids: Vec<Uuid> = t
            .meal_plans
            .iter()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        for plan_id in plan_ids {
            t.remove_plan_cascade(plan_id);
        }
        t.favorites.retain(|f| f.user_id != id);
        Ok(true)
    }

    // --- ingredients ---

    async fn insert_ingredient(&self, new: NewIngredient) -> StoreResult<Ingredient> {
        let row = Ingredient {
            id: Uuid::new_v4(),
            name: new.name,
            price_per_unit: new.price_per_unit,
            unit: new.unit,
            store_name: new.store_name,
            valid_from: new.valid_from,
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables.write().await.ingredients.push(row.clone());
        Ok(row)
    }

    async fn get_ingredient(&self, id: Uuid) -> StoreResult<Option<Ingredient>> {
        let t = self.tables.read().await;
        Ok(t.ingredients.iter().find(|i| i.id == id).cloned())
    }

    async fn list_ingredients(&self) -> StoreResult<Vec<Ingredient>> {
        Ok(self.tables.read().await.ingredients.clone())
    }

    async fn update_ingredient(
        &self,
        id: Uuid,
        changes: IngredientChanges,
    ) -> StoreResult<Option<Ingredient>> {
        let mut t = self.tables.write().await;
        let Some(row) = t.ingredients.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(price) = changes.price_per_unit {
            row.price_per_unit = price;
        }
        if let Some(unit) = changes.unit {
            row.unit = unit;
        }
        if let Some(store_name) = changes.store_name {
            row.store_name = store_name;
        }
        if let Some(valid_from) = changes.valid_from {
            row.valid_from = valid_from;
        }
        Ok(Some(row.clone()))
    }

    async fn delete_ingredient(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.ingredients.len();
        t.ingredients.retain(|i| i.id != id);
        if t.ingredients.len() == before {
            return Ok(false);
        }
        t.meal_ingredients.retain(|mi| mi.ingredient_id != id);
        Ok(true)
    }

    // --- meals ---

    async fn insert_meal(&self, new: NewMeal) -> StoreResult<Meal> {
        let mut t = self.tables.write().await;
        t.require_diet_type(new.diet_type_id)?;
        let row = Meal {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            price: ZERO_MONEY,
            diet_type_id: new.diet_type_id,
            created_at: OffsetDateTime::now_utc(),
        };
        t.meals.push(row.clone());
        Ok(row)
    }

    async fn get_meal(&self, id: Uuid) -> StoreResult<Option<Meal>> {
        let t = self.tables.read().await;
        Ok(t.meals.iter().find(|m| m.id == id).cloned())
    }

    async fn list_meals(&self) -> StoreResult<Vec<Meal>> {
        Ok(self.tables.read().await.meals.clone())
    }

    async fn update_meal(&self, id: Uuid, changes: MealChanges) -> StoreResult<Option<Meal>> {
        let mut t = self.tables.write().await;
        t.require_diet_type(changes.diet_type_id.flatten())?;
        let Some(row) = t.meals.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(description) = changes.description {
            row.description = description;
        }
        if let Some(diet_type_id) = changes.diet_type_id {
            row.diet_type_id = diet_type_id;
        }
        Ok(Some(row.clone()))
    }

    async fn delete_meal(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.meals.len();
        t.meals.retain(|m| m.id != id);
        if t.meals.len() == before {
            return Ok(false);
        }
        t.meal_ingredients.retain(|mi| mi.meal_id != id);
        t.plan_meals.retain(|pm| pm.meal_id != id);
        t.favorites.retain(|f| f.meal_id != id);
        Ok(true)
    }

    async fn set_meal_price(&self, id: Uuid, price: Decimal) -> StoreResult<bool> {
        if !MEAL_PRICE.fits(price) {
            return Err(StoreError::OutOfRange("price".into()));
        }
        let mut t = self.tables.write().await;
        match t.meals.iter_mut().find(|m| m.id == id) {
            Some(meal) => {
                meal.price = price;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_meal_ingredient(
        &self,
        meal_id: Uuid,
        ingredient_id: Uuid,
        quantity: Decimal,
    ) -> StoreResult<MealIngredient> {
        let mut t = self.tables.write().await;
        t.require_meal(meal_id)?;
        if !t.ingredients.iter().any(|i| i.id == ingredient_id) {
            return Err(StoreError::MissingReference("ingredient_id".into()));
        }
        if t
            .meal_ingredients
            .iter()
            .any(|mi| mi.meal_id == meal_id && mi.ingredient_id == ingredient_id)
        {
            return Err(StoreError::conflict("unique_meal_ingredient"));
        }
        let row = MealIngredient {
            id: Uuid::new_v4(),
            meal_id,
            ingredient_id,
            quantity,
            created_at: OffsetDateTime::now_utc(),
        };
        t.meal_ingredients.push(row.clone());
        Ok(row)
    }

    async fn list_meal_ingredients(&self, meal_id: Uuid) -> StoreResult<Vec<MealIngredientLine>> {
        let t = self.tables.read().await;
        let lines = t
            .meal_ingredients
            .iter()
            .filter(|mi| mi.meal_id == meal_id)
            .filter_map(|mi| {
                t.ingredients
                    .iter()
                    .find(|i| i.id == mi.ingredient_id)
                    .map(|i| MealIngredientLine {
                        ingredient_id: i.id,
                        name: i.name.clone(),
                        unit: i.unit.clone(),
                        price_per_unit: i.price_per_unit,
                        quantity: mi.quantity,
                    })
            })
            .collect();
        Ok(lines)
    }

    async fn remove_meal_ingredient(
        &self,
        meal_id: Uuid,
        ingredient_id: Uuid,
    ) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.meal_ingredients.len();
        t.meal_ingredients
            .retain(|mi| !(mi.meal_id == meal_id && mi.ingredient_id == ingredient_id));
        Ok(t.meal_ingredients.len() != before)
    }

    async fn meals_using_ingredient(&self, ingredient_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let t = self.tables.read().await;
        Ok(t.meal_ingredients
            .iter()
            .filter(|mi| mi.ingredient_id == ingredient_id)
            .map(|mi| mi.meal_id)
            .collect())
    }

    // --- meal plans ---

    async fn insert_meal_plan(&self, new: NewMealPlan) -> StoreResult<MealPlan> {
        let mut t = self.tables.write().await;
        t.require_user(new.user_id)?;
        let row = MealPlan {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            duration: new.duration,
            total_price: ZERO_MONEY,
            created_at: OffsetDateTime::now_utc(),
        };
        t.meal_plans.push(row.clone());
        Ok(row)
    }

    async fn get_meal_plan(&self, id: Uuid) -> StoreResult<Option<MealPlan>> {
        let t = self.tables.read().await;
        Ok(t.meal_plans.iter().find(|p| p.id == id).cloned())
    }

    async fn list_meal_plans(&self) -> StoreResult<Vec<MealPlan>> {
        Ok(self.tables.read().await.meal_plans.clone())
    }

    async fn list_meal_plans_for_user(&self, user_id: Uuid) -> StoreResult<Vec<MealPlan>> {
        let t = self.tables.read().await;
        Ok(t.meal_plans
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_meal_plan(
        &self,
        id: Uuid,
        changes: MealPlanChanges,
    ) -> StoreResult<Option<MealPlan>> {
        let mut t = self.tables.write().await;
        let Some(row) = t.meal_plans.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(duration) = changes.duration {
            row.duration = duration;
        }
        Ok(Some(row.clone()))
    }

    async fn delete_meal_plan(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.remove_plan_cascade(id))
    }

    async fn set_plan_total(&self, id: Uuid, total: Decimal) -> StoreResult<bool> {
        if !PLAN_TOTAL.fits(total) {
            return Err(StoreError::OutOfRange("total_price".into()));
        }
        let mut t = self.tables.write().await;
        match t.meal_plans.iter_mut().find(|p| p.id == id) {
            Some(plan) => {
                plan.total_price = total;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_plan_meal(&self, plan_id: Uuid, meal_id: Uuid) -> StoreResult<PlanMeal> {
        let mut t = self.tables.write().await;
        if !t.meal_plans.iter().any(|p| p.id == plan_id) {
            return Err(StoreError::MissingReference("plan_id".into()));
        }
        t.require_meal(meal_id)?;
        if t
            .plan_meals
            .iter()
            .any(|pm| pm.plan_id == plan_id && pm.meal_id == meal_id)
        {
            return Err(StoreError::conflict("unique_meal_plan"));
        }
        let row = PlanMeal {
            id: Uuid::new_v4(),
            plan_id,
            meal_id,
            created_at: OffsetDateTime::now_utc(),
        };
        t.plan_meals.push(row.clone());
        Ok(row)
    }

    async fn list_plan_meals(&self, plan_id: Uuid) -> StoreResult<Vec<Meal>> {
        let t = self.tables.read().await;
        Ok(t.plan_meals
            .iter()
            .filter(|pm| pm.plan_id == plan_id)
            .filter_map(|pm| t.meals.iter().find(|m| m.id == pm.meal_id).cloned())
            .collect())
    }

    async fn remove_plan_meal(&self, plan_id: Uuid, meal_id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.plan_meals.len();
        t.plan_meals
            .retain(|pm| !(pm.plan_id == plan_id && pm.meal_id == meal_id));
        Ok(t.plan_meals.len() != before)
    }

    async fn plans_containing_meal(&self, meal_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let t = self.tables.read().await;
        Ok(t.plan_meals
            .iter()
            .filter(|pm| pm.meal_id == meal_id)
            .map(|pm| pm.plan_id)
            .collect())
    }

    // --- favorites ---

    async fn insert_favorite(&self, new: NewFavorite) -> StoreResult<Favorite> {
        let mut t = self.tables.write().await;
        t.require_user(new.user_id)?;
        t.require_meal(new.meal_id)?;
        if t
            .favorites
            .iter()
            .any(|f| f.user_id == new.user_id && f.meal_id == new.meal_id)
        {
            return Err(StoreError::conflict("unique_favorite"));
        }
        let row = Favorite {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            meal_id: new.meal_id,
            created_at: OffsetDateTime::now_utc(),
        };
        t.favorites.push(row.clone());
        Ok(row)
    }

    async fn get_favorite(&self, id: Uuid) -> StoreResult<Option<Favorite>> {
        let t = self.tables.read().await;
        Ok(t.favorites.iter().find(|f| f.id == id).cloned())
    }

    async fn list_favorites(&self) -> StoreResult<Vec<Favorite>> {
        Ok(self.tables.read().await.favorites.clone())
    }

    async fn list_favorites_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Favorite>> {
        let t = self.tables.read().await;
        Ok(t.favorites
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_favorite(
        &self,
        id: Uuid,
        changes: FavoriteChanges,
    ) -> StoreResult<Option<Favorite>> {
        let mut t = self.tables.write().await;
        let Some(current) = t.favorites.iter().find(|f| f.id == id).cloned() else {
            return Ok(None);
        };
        if let Some(meal_id) = changes.meal_id {
            t.require_meal(meal_id)?;
            if t
                .favorites
                .iter()
                .any(|f| f.id != id && f.user_id == current.user_id && f.meal_id == meal_id)
            {
                return Err(StoreError::conflict("unique_favorite"));
            }
        }
        let Some(row) = t.favorites.iter_mut().find(|f| f.id == id) else {
            return Ok(None);
        };
        if let Some(meal_id) = changes.meal_id {
            row.meal_id = meal_id;
        }
        Ok(Some(row.clone()))
    }

    async fn delete_favorite(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.favorites.len();
        t.favorites.retain(|f| f.id != id);
        Ok(t.favorites.len() != before)
    }

    // --- admin ---

    async fn clear_all(&self) -> StoreResult<ClearReport> {
        let mut t = self.tables.write().await;
        let users = drain_count(&mut t.users);
        Ok(vec![
            ("meal_ingredients", drain_count(&mut t.meal_ingredients)),
            ("meal_plan_meals", drain_count(&mut t.plan_meals)),
            ("favorites", drain_count(&mut t.favorites)),
            ("meal_plans", drain_count(&mut t.meal_plans)),
            ("meals", drain_count(&mut t.meals)),
            ("ingredients", drain_count(&mut t.ingredients)),
            ("users", users),
            ("auth_identities", users),
            ("diet_types", drain_count(&mut t.diet_types)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: format!("{username}@example.com"),
            password_hash: "hash".into(),
            is_staff: false,
            weight: None,
            height: None,
            age: None,
            diet_type_id: None,
        }
    }

    fn new_meal(name: &str) -> NewMeal {
        NewMeal {
            name: name.into(),
            description: None,
            diet_type_id: None,
        }
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_plans_and_favorites() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("alice")).await.unwrap();
        let meal = store.insert_meal(new_meal("Soup")).await.unwrap();
        let plan = store
            .insert_meal_plan(NewMealPlan { user_id: user.id, duration: 7 })
            .await
            .unwrap();
        store.add_plan_meal(plan.id, meal.id).await.unwrap();
        store
            .insert_favorite(NewFavorite { user_id: user.id, meal_id: meal.id })
            .await
            .unwrap();

        assert!(store.delete_user(user.id).await.unwrap());

        assert!(store.list_meal_plans_for_user(user.id).await.unwrap().is_empty());
        assert!(store.list_favorites_for_user(user.id).await.unwrap().is_empty());
        assert!(store.plans_containing_meal(meal.id).await.unwrap().is_empty());
        assert!(!store.delete_user(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_pairs_are_conflicts() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("bob")).await.unwrap();
        let meal = store.insert_meal(new_meal("Salad")).await.unwrap();
        let fav = NewFavorite { user_id: user.id, meal_id: meal.id };
        store.insert_favorite(fav.clone()).await.unwrap();
        let err = store.insert_favorite(fav).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let err = store.create_user(new_user("bob")).await.unwrap_err();
        assert_eq!(err.to_string(), "username is already taken");
    }

    #[tokio::test]
    async fn deleting_diet_type_nulls_references() {
        let store = MemoryStore::new();
        let keto = store
            .insert_diet_type(NewDietType {
                name: "Keto".into(),
                description: None,
                is_restricted: true,
            })
            .await
            .unwrap();
        let meal = store
            .insert_meal(NewMeal {
                diet_type_id: Some(keto.id),
                ..new_meal("Omelette")
            })
            .await
            .unwrap();

        assert!(store.delete_diet_type(keto.id).await.unwrap());
        let meal = store.get_meal(meal.id).await.unwrap().unwrap();
        assert_eq!(meal.diet_type_id, None);
    }

    #[tokio::test]
    async fn unknown_references_are_rejected() {
        let store = MemoryStore::new();
        let err = store
            .insert_meal_plan(NewMealPlan { user_id: Uuid::new_v4(), duration: 3 })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(ref f) if f == "user_id"));
    }

    #[tokio::test]
    async fn price_caches_reject_values_wider_than_their_columns() {
        let store = MemoryStore::new();
        let meal = store.insert_meal(new_meal("Caviar")).await.unwrap();
        let err = store
            .set_meal_price(meal.id, Decimal::new(9_999_999_999, 2) * Decimal::new(99_999, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange(ref f) if f == "price"));
        assert!(store.set_meal_price(meal.id, MEAL_PRICE.max()).await.unwrap());

        let user = store.create_user(new_user("dave")).await.unwrap();
        let plan = store
            .insert_meal_plan(NewMealPlan { user_id: user.id, duration: 1 })
            .await
            .unwrap();
        let err = store
            .set_plan_total(plan.id, PLAN_TOTAL.max() + Decimal::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange(ref f) if f == "total_price"));
        assert_eq!(
            store.get_meal_plan(plan.id).await.unwrap().unwrap().total_price,
            Decimal::ZERO
        );
    }

    #[tokio::test]
    async fn clear_all_reports_counts_and_empties_tables() {
        let store = MemoryStore::new();
        store.create_user(new_user("carol")).await.unwrap();
        store.insert_meal(new_meal("Stew")).await.unwrap();

        let report = store.clear_all().await.unwrap();
        assert!(report.contains(&("users", 1)));
        assert!(report.contains(&("meals", 1)));
        assert!(store.list_users().await.unwrap().is_empty());
        assert!(store.list_meals().await.unwrap().is_empty());
    }
}
