use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{MealPlan, MealPlanChanges, NewMealPlan, PlanMeal};
use crate::meals::repo_types::Meal;

pub async fn insert(db: &PgPool, new: NewMealPlan) -> sqlx::Result<MealPlan> {
    sqlx::query_as::<_, MealPlan>(
        r#"
        INSERT INTO meal_plans (id, user_id, duration, total_price)
        VALUES ($1, $2, $3, 0)
        RETURNING id, user_id, duration, total_price, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.user_id)
    .bind(new.duration)
    .fetch_one(db)
    .await
}

pub async fn get(db: &PgPool, id: Uuid) -> sqlx::Result<Option<MealPlan>> {
    sqlx::query_as::<_, MealPlan>(
        r#"
        SELECT id, user_id, duration, total_price, created_at
          FROM meal_plans
         WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<MealPlan>> {
    sqlx::query_as::<_, MealPlan>(
        r#"
        SELECT id, user_id, duration, total_price, created_at
          FROM meal_plans
         ORDER BY created_at ASC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<MealPlan>> {
    sqlx::query_as::<_, MealPlan>(
        r#"
        SELECT id, user_id, duration, total_price, created_at
          FROM meal_plans
         WHERE user_id = $1
         ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    changes: MealPlanChanges,
) -> sqlx::Result<Option<MealPlan>> {
    sqlx::query_as::<_, MealPlan>(
        r#"
        UPDATE meal_plans
           SET duration = COALESCE($2, duration)
         WHERE id = $1
        RETURNING id, user_id, duration, total_price, created_at
        "#,
    )
    .bind(id)
    .bind(changes.duration)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM meal_plans WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn set_total(db: &PgPool, id: Uuid, total: Decimal) -> sqlx::Result<bool> {
    let res = sqlx::query("UPDATE meal_plans SET total_price = $2 WHERE id = $1")
        .bind(id)
        .bind(total)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

// ---- meal links ----

pub async fn add_meal(db: &PgPool, plan_id: Uuid, meal_id: Uuid) -> sqlx::Result<PlanMeal> {
    sqlx::query_as::<_, PlanMeal>(
        r#"
        INSERT INTO meal_plan_meals (id, plan_id, meal_id)
        VALUES ($1, $2, $3)
        RETURNING id, plan_id, meal_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(plan_id)
    .bind(meal_id)
    .fetch_one(db)
    .await
}

pub async fn list_meals(db: &PgPool, plan_id: Uuid) -> sqlx::Result<Vec<Meal>> {
    sqlx::query_as::<_, Meal>(
        r#"
        SELECT m.id, m.name, m.description, m.price, m.diet_type_id, m.created_at
          FROM meal_plan_meals pm
          JOIN meals m ON m.id = pm.meal_id
         WHERE pm.plan_id = $1
         ORDER BY pm.created_at ASC
        "#,
    )
    .bind(plan_id)
    .fetch_all(db)
    .await
}

pub async fn remove_meal(db: &PgPool, plan_id: Uuid, meal_id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM meal_plan_meals WHERE plan_id = $1 AND meal_id = $2")
        .bind(plan_id)
        .bind(meal_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn containing_meal(db: &PgPool, meal_id: Uuid) -> sqlx::Result<Vec<Uuid>> {
    sqlx::query_scalar::<_, Uuid>("SELECT DISTINCT plan_id FROM meal_plan_meals WHERE meal_id = $1")
        .bind(meal_id)
        .fetch_all(db)
        .await
}
