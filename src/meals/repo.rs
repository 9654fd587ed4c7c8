use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Meal, MealChanges, MealIngredient, MealIngredientLine, NewMeal};

pub async fn insert(db: &PgPool, new: NewMeal) -> sqlx::Result<Meal> {
    sqlx::query_as::<_, Meal>(
        r#"
        INSERT INTO meals (id, name, description, price, diet_type_id)
        VALUES ($1, $2, $3, 0, $4)
        RETURNING id, name, description, price, diet_type_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.name)
    .bind(new.description)
    .bind(new.diet_type_id)
    .fetch_one(db)
    .await
}

pub async fn get(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Meal>> {
    sqlx::query_as::<_, Meal>(
        r#"
        SELECT id, name, description, price, diet_type_id, created_at
          FROM meals
         WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<Meal>> {
    sqlx::query_as::<_, Meal>(
        r#"
        SELECT id, name, description, price, diet_type_id, created_at
          FROM meals
         ORDER BY created_at ASC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn update(db: &PgPool, id: Uuid, changes: MealChanges) -> sqlx::Result<Option<Meal>> {
    sqlx::query_as::<_, Meal>(
        r#"
        UPDATE meals
           SET name = COALESCE($2, name),
               description = CASE WHEN $3 THEN $4 ELSE description END,
               diet_type_id = CASE WHEN $5 THEN $6 ELSE diet_type_id END
         WHERE id = $1
        RETURNING id, name, description, price, diet_type_id, created_at
        "#,
    )
    .bind(id)
    .bind(changes.name)
    .bind(changes.description.is_some())
    .bind(changes.description.flatten())
    .bind(changes.diet_type_id.is_some())
    .bind(changes.diet_type_id.flatten())
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM meals WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn set_price(db: &PgPool, id: Uuid, price: Decimal) -> sqlx::Result<bool> {
    let res = sqlx::query("UPDATE meals SET price = $2 WHERE id = $1")
        .bind(id)
        .bind(price)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

// ---- ingredient links ----

pub async fn add_ingredient(
    db: &PgPool,
    meal_id: Uuid,
    ingredient_id: Uuid,
    quantity: Decimal,
) -> sqlx::Result<MealIngredient> {
    sqlx::query_as::<_, MealIngredient>(
        r#"
        INSERT INTO meal_ingredients (id, meal_id, ingredient_id, quantity)
        VALUES ($1, $2, $3, $4)
        RETURNING id, meal_id, ingredient_id, quantity, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(meal_id)
    .bind(ingredient_id)
    .bind(quantity)
    .fetch_one(db)
    .await
}

pub async fn list_ingredients(db: &PgPool, meal_id: Uuid) -> sqlx::Result<Vec<MealIngredientLine>> {
    sqlx::query_as::<_, MealIngredientLine>(
        r#"
        SELECT mi.ingredient_id, i.name, i.unit, i.price_per_unit, mi.quantity
          FROM meal_ingredients mi
          JOIN ingredients i ON i.id = mi.ingredient_id
         WHERE mi.meal_id = $1
         ORDER BY mi.created_at ASC
        "#,
    )
    .bind(meal_id)
    .fetch_all(db)
    .await
}

pub async fn remove_ingredient(db: &PgPool, meal_id: Uuid, ingredient_id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM meal_ingredients WHERE meal_id = $1 AND ingredient_id = $2")
        .bind(meal_id)
        .bind(ingredient_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn using_ingredient(db: &PgPool, ingredient_id: Uuid) -> sqlx::Result<Vec<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT DISTINCT meal_id FROM meal_ingredients WHERE ingredient_id = $1",
    )
    .bind(ingredient_id)
    .fetch_all(db)
    .await
}
