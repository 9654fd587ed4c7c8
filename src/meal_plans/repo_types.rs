use rust_decimal::Decimal;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct MealPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub duration: i32, // days
    pub total_price: Decimal,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewMealPlan {
    pub user_id: Uuid,
    pub duration: i32,
}

#[derive(Debug, Clone, Default)]
pub struct MealPlanChanges {
    pub duration: Option<i32>,
}

/// Row of the plan/meal join table.
#[derive(Debug, Clone, FromRow)]
pub struct PlanMeal {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub meal_id: Uuid,
    pub created_at: OffsetDateTime,
}
