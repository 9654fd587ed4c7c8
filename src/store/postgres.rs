use anyhow::Context;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;
use uuid::Uuid;

use super::{ClearReport, Store, StoreResult};
use crate::config::AppConfig;
use crate::diet_types::{
    repo as diet_types_repo,
    repo_types::{DietType, DietTypeChanges, NewDietType},
};
use crate::favorites::{
    repo as favorites_repo,
    repo_types::{Favorite, FavoriteChanges, NewFavorite},
};
use crate::ingredients::{
    repo as ingredients_repo,
    repo_types::{Ingredient, IngredientChanges, NewIngredient},
};
use crate::meal_plans::{
    repo as meal_plans_repo,
    repo_types::{MealPlan, MealPlanChanges, NewMealPlan, PlanMeal},
};
use crate::meals::{
    repo as meals_repo,
    repo_types::{Meal, MealChanges, MealIngredient, MealIngredientLine, NewMeal},
};
use crate::users::{
    repo as users_repo,
    repo_types::{NewUser, User, UserChanges},
};

/// Tables in the order `clear_all` empties them: join tables first, then
/// dependents, then the rows they point at.
const CLEAR_ORDER: [&str; 9] = [
    "meal_ingredients",
    "meal_plan_meals",
    "favorites",
    "meal_plans",
    "meals",
    "ingredients",
    "users",
    "auth_identities",
    "diet_types",
];

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("migrations applied");
        Ok(())
    }

    async fn insert_diet_type(&self, new: NewDietType) -> StoreResult<DietType> {
        Ok(diet_types_repo::insert(&self.pool, new).await?)
    }

    async fn get_diet_type(&self, id: Uuid) -> StoreResult<Option<DietType>> {
        Ok(diet_types_repo::get(&self.pool, id).await?)
    }

    async fn list_diet_types(&self) -> StoreResult<Vec<DietType>> {
        Ok(diet_types_repo::list(&self.pool).await?)
    }

    async fn update_diet_type(
        &self,
        id: Uuid,
        changes: DietTypeChanges,
    ) -> StoreResult<Option<DietType>> {
        Ok(diet_types_repo::update(&self.pool, id, changes).await?)
    }

    async fn delete_diet_type(&self, id: Uuid) -> StoreResult<bool> {
        Ok(diet_types_repo::delete(&self.pool, id).await?)
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        Ok(users_repo::create(&self.pool, new).await?)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(users_repo::get(&self.pool, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(users_repo::find_by_username(&self.pool, username).await?)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(users_repo::list(&self.pool).await?)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>> {
        Ok(users_repo::update(&self.pool, id, changes).await?)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(users_repo::delete(&self.pool, id).await?)
    }

    async fn insert_ingredient(&self, new: NewIngredient) -> StoreResult<Ingredient> {
        Ok(ingredients_repo::insert(&self.pool, new).await?)
    }

    async fn get_ingredient(&self, id: Uuid) -> StoreResult<Option<Ingredient>> {
        Ok(ingredients_repo::get(&self.pool, id).await?)
    }

    async fn list_ingredients(&self) -> StoreResult<Vec<Ingredient>> {
        Ok(ingredients_repo::list(&self.pool).await?)
    }

    async fn update_ingredient(
        &self,
        id: Uuid,
        changes: IngredientChanges,
    ) -> StoreResult<Option<Ingredient>> {
        Ok(ingredients_repo::update(&self.pool, id, changes).await?)
    }

    async fn delete_ingredient(&self, id: Uuid) -> StoreResult<bool> {
        Ok(ingredients_repo::delete(&self.pool, id).await?)
    }

    async fn insert_meal(&self, new: NewMeal) -> StoreResult<Meal> {
        Ok(meals_repo::insert(&self.pool, new).await?)
    }

    async fn get_meal(&self, id: Uuid) -> StoreResult<Option<Meal>> {
        Ok(meals_repo::get(&self.pool, id).await?)
    }

    async fn list_meals(&self) -> StoreResult<Vec<Meal>> {
        Ok(meals_repo::list(&self.pool).await?)
    }

    async fn update_meal(&self, id: Uuid, changes: MealChanges) -> StoreResult<Option<Meal>> {
        Ok(meals_repo::update(&self.pool, id, changes).await?)
    }

    async fn delete_meal(&self, id: Uuid) -> StoreResult<bool> {
        Ok(meals_repo::delete(&self.pool, id).await?)
    }

    async fn set_meal_price(&self, id: Uuid, price: Decimal) -> StoreResult<bool> {
        Ok(meals_repo::set_price(&self.pool, id, price).await?)
    }

    async fn add_meal_ingredient(
        &self,
        meal_id: Uuid,
        ingredient_id: Uuid,
        quantity: Decimal,
    ) -> StoreResult<MealIngredient> {
        Ok(meals_repo::add_ingredient(&self.pool, meal_id, ingredient_id, quantity).await?)
    }

    async fn list_meal_ingredients(&self, meal_id: Uuid) -> StoreResult<Vec<MealIngredientLine>> {
        Ok(meals_repo::list_ingredients(&self.pool, meal_id).await?)
    }

    async fn remove_meal_ingredient(
        &self,
        meal_id: Uuid,
        ingredient_id: Uuid,
    ) -> StoreResult<bool> {
        Ok(meals_repo::remove_ingredient(&self.pool, meal_id, ingredient_id).await?)
    }

    async fn meals_using_ingredient(&self, ingredient_id: Uuid) -> StoreResult<Vec<Uuid>> {
        Ok(meals_repo::using_ingredient(&self.pool, ingredient_id).await?)
    }

    async fn insert_meal_plan(&self, new: NewMealPlan) -> StoreResult<MealPlan> {
        Ok(meal_plans_repo::insert(&self.pool, new).await?)
    }

    async fn get_meal_plan(&self, id: Uuid) -> StoreResult<Option<MealPlan>> {
        Ok(meal_plans_repo::get(&self.pool, id).await?)
    }

    async fn list_meal_plans(&self) -> StoreResult<Vec<MealPlan>> {
        Ok(meal_plans_repo::list(&self.pool).await?)
    }

    async fn list_meal_plans_for_user(&self, user_id: Uuid) -> StoreResult<Vec<MealPlan>> {
        Ok(meal_plans_repo::list_by_user(&self.pool, user_id).await?)
    }

    async fn update_meal_plan(
        &self,
        id: Uuid,
        changes: MealPlanChanges,
    ) -> StoreResult<Option<MealPlan>> {
        Ok(meal_plans_repo::update(&self.pool, id, changes).await?)
    }

    async fn delete_meal_plan(&self, id: Uuid) -> StoreResult<bool> {
        Ok(meal_plans_repo::delete(&self.pool, id).await?)
    }

    async fn set_plan_total(&self, id: Uuid, total: Decimal) -> StoreResult<bool> {
        Ok(meal_plans_repo::set_total(&self.pool, id, total).await?)
    }

    async fn add_plan_meal(&self, plan_id: Uuid, meal_id: Uuid) -> StoreResult<PlanMeal> {
        Ok(meal_plans_repo::add_meal(&self.pool, plan_id, meal_id).await?)
    }

    async fn list_plan_meals(&self, plan_id: Uuid) -> StoreResult<Vec<Meal>> {
        Ok(meal_plans_repo::list_meals(&self.pool, plan_id).await?)
    }

    async fn remove_plan_meal(&self, plan_id: Uuid, meal_id: Uuid) -> StoreResult<bool> {
        Ok(meal_plans_repo::remove_meal(&self.pool, plan_id, meal_id).await?)
    }

    async fn plans_containing_meal(&self, meal_id: Uuid) -> StoreResult<Vec<Uuid>> {
        Ok(meal_plans_repo::containing_meal(&self.pool, meal_id).await?)
    }

    async fn insert_favorite(&self, new: NewFavorite) -> StoreResult<Favorite> {
        Ok(favorites_repo::insert(&self.pool, new).await?)
    }

    async fn get_favorite(&self, id: Uuid) -> StoreResult<Option<Favorite>> {
        Ok(favorites_repo::get(&self.pool, id).await?)
    }

    async fn list_favorites(&self) -> StoreResult<Vec<Favorite>> {
        Ok(favorites_repo::list(&self.pool).await?)
    }

    async fn list_favorites_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Favorite>> {
        Ok(favorites_repo::list_by_user(&self.pool, user_id).await?)
    }

    async fn update_favorite(
        &self,
        id: Uuid,
        changes: FavoriteChanges,
    ) -> StoreResult<Option<Favorite>> {
        Ok(favorites_repo::update(&self.pool, id, changes).await?)
    }

    async fn delete_favorite(&self, id: Uuid) -> StoreResult<bool> {
        Ok(favorites_repo::delete(&self.pool, id).await?)
    }

    async fn clear_all(&self) -> StoreResult<ClearReport> {
        let mut tx = self.pool.begin().await?;
        let mut report = Vec::with_capacity(CLEAR_ORDER.len());
        for table in CLEAR_ORDER {
            // table names come from the constant above, never from input
            let res = sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
            report.push((table, res.rows_affected()));
        }
        tx.commit().await?;
        Ok(report)
    }
}
