//! Persistence port. Managers only ever see `Arc<dyn Store>`; the concrete
//! backend is picked at startup from `DATABASE_URL`.

use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::diet_types::repo_types::{DietType, DietTypeChanges, NewDietType};
use crate::favorites::repo_types::{Favorite, FavoriteChanges, NewFavorite};
use crate::ingredients::repo_types::{Ingredient, IngredientChanges, NewIngredient};
use crate::meal_plans::repo_types::{MealPlan, MealPlanChanges, NewMealPlan, PlanMeal};
use crate::meals::repo_types::{Meal, MealChanges, MealIngredient, MealIngredientLine, NewMeal};
use crate::users::repo_types::{NewUser, User, UserChanges};

mod error;
pub mod memory;
pub mod postgres;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Shape of a `NUMERIC(precision, scale)` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Numeric {
    pub precision: u32,
    pub scale: u32,
}

/// `meals.price`
pub const MEAL_PRICE: Numeric = Numeric::new(10, 2);
/// `meal_plans.total_price`
pub const PLAN_TOTAL: Numeric = Numeric::new(12, 2);

impl Numeric {
    pub const fn new(precision: u32, scale: u32) -> Self {
        Self { precision, scale }
    }

    /// Largest magnitude the column stores, e.g. `99999999.99` for `NUMERIC(10,2)`.
    pub fn max(self) -> Decimal {
        let whole = Decimal::from(10i64.pow(self.precision - self.scale));
        whole - Decimal::new(1, self.scale)
    }

    /// Whether Postgres would accept `value` once rounded to the column's scale.
    pub fn fits(self, value: Decimal) -> bool {
        value
            .round_dp_with_strategy(self.scale, RoundingStrategy::MidpointAwayFromZero)
            .abs()
            <= self.max()
    }
}

/// Rows removed per table by [`Store::clear_all`], in deletion order.
pub type ClearReport = Vec<(&'static str, u64)>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Apply pending schema migrations.
    async fn migrate(&self) -> StoreResult<()>;

    // --- diet types ---

    async fn insert_diet_type(&self, new: NewDietType) -> StoreResult<DietType>;
    async fn get_diet_type(&self, id: Uuid) -> StoreResult<Option<DietType>>;
    /// Ordered by name.
    async fn list_diet_types(&self) -> StoreResult<Vec<DietType>>;
    async fn update_diet_type(
        &self,
        id: Uuid,
        changes: DietTypeChanges,
    ) -> StoreResult<Option<DietType>>;
    /// Users and meals referencing the diet type keep existing with a null diet type.
    async fn delete_diet_type(&self, id: Uuid) -> StoreResult<bool>;

    // --- users ---

    /// Creates the auth identity and the user row in one transaction.
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    /// Newest first.
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>>;
    /// Removes the identity too; meal plans and favorites cascade.
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;

    // --- ingredients ---

    async fn insert_ingredient(&self, new: NewIngredient) -> StoreResult<Ingredient>;
    async fn get_ingredient(&self, id: Uuid) -> StoreResult<Option<Ingredient>>;
    async fn list_ingredients(&self) -> StoreResult<Vec<Ingredient>>;
    async fn update_ingredient(
        &self,
        id: Uuid,
        changes: IngredientChanges,
    ) -> StoreResult<Option<Ingredient>>;
    async fn delete_ingredient(&self, id: Uuid) -> StoreResult<bool>;

    // --- meals ---

    async fn insert_meal(&self, new: NewMeal) -> StoreResult<Meal>;
    async fn get_meal(&self, id: Uuid) -> StoreResult<Option<Meal>>;
    async fn list_meals(&self) -> StoreResult<Vec<Meal>>;
    async fn update_meal(&self, id: Uuid, changes: MealChanges) -> StoreResult<Option<Meal>>;
    async fn delete_meal(&self, id: Uuid) -> StoreResult<bool>;
    /// Fails with [`StoreError::OutOfRange`] when `price` does not fit [`MEAL_PRICE`].
    async fn set_meal_price(&self, id: Uuid, price: Decimal) -> StoreResult<bool>;

    async fn add_meal_ingredient(
        &self,
        meal_id: Uuid,
        ingredient_id: Uuid,
        quantity: Decimal,
    ) -> StoreResult<MealIngredient>;
    /// Ingredient links of a meal joined with the ingredient's current price.
    async fn list_meal_ingredients(&self, meal_id: Uuid) -> StoreResult<Vec<MealIngredientLine>>;
    async fn remove_meal_ingredient(&self, meal_id: Uuid, ingredient_id: Uuid)
        -> StoreResult<bool>;
    async fn meals_using_ingredient(&self, ingredient_id: Uuid) -> StoreResult<Vec<Uuid>>;

    // --- meal plans ---

    async fn insert_meal_plan(&self, new: NewMealPlan) -> StoreResult<MealPlan>;
    async fn get_meal_plan(&self, id: Uuid) -> StoreResult<Option<MealPlan>>;
    async fn list_meal_plans(&self) -> StoreResult<Vec<MealPlan>>;
    async fn list_meal_plans_for_user(&self, user_id: Uuid) -> StoreResult<Vec<MealPlan>>;
    async fn update_meal_plan(
        &self,
        id: Uuid,
        changes: MealPlanChanges,
    ) -> StoreResult<Option<MealPlan>>;
    async fn delete_meal_plan(&self, id: Uuid) -> StoreResult<bool>;
    /// Fails with [`StoreError::OutOfRange`] when `total` does not fit [`PLAN_TOTAL`].
    async fn set_plan_total(&self, id: Uuid, total: Decimal) -> StoreResult<bool>;

    async fn add_plan_meal(&self, plan_id: Uuid, meal_id: Uuid) -> StoreResult<PlanMeal>;
    async fn list_plan_meals(&self, plan_id: Uuid) -> StoreResult<Vec<Meal>>;
    async fn remove_plan_meal(&self, plan_id: Uuid, meal_id: Uuid) -> StoreResult<bool>;
    async fn plans_containing_meal(&self, meal_id: Uuid) -> StoreResult<Vec<Uuid>>;

    // --- favorites ---

    async fn insert_favorite(&self, new: NewFavorite) -> StoreResult<Favorite>;
    async fn get_favorite(&self, id: Uuid) -> StoreResult<Option<Favorite>>;
    async fn list_favorites(&self) -> StoreResult<Vec<Favorite>>;
    async fn list_favorites_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Favorite>>;
    async fn update_favorite(
        &self,
        id: Uuid,
        changes: FavoriteChanges,
    ) -> StoreResult<Option<Favorite>>;
    async fn delete_favorite(&self, id: Uuid) -> StoreResult<bool>;

    // --- admin ---

    /// Deletes every row, dependents first, inside one transaction.
    async fn clear_all(&self) -> StoreResult<ClearReport>;
}
