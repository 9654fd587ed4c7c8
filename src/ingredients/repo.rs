use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Ingredient, IngredientChanges, NewIngredient};

pub async fn insert(db: &PgPool, new: NewIngredient) -> sqlx::Result<Ingredient> {
    sqlx::query_as::<_, Ingredient>(
        r#"
        INSERT INTO ingredients (id, name, price_per_unit, unit, store_name, valid_from)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, price_per_unit, unit, store_name, valid_from, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.name)
    .bind(new.price_per_unit)
    .bind(new.unit)
    .bind(new.store_name)
    .bind(new.valid_from)
    .fetch_one(db)
    .await
}

pub async fn get(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Ingredient>> {
    sqlx::query_as::<_, Ingredient>(
        r#"
        SELECT id, name, price_per_unit, unit, store_name, valid_from, created_at
          FROM ingredients
         WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<Ingredient>> {
    sqlx::query_as::<_, Ingredient>(
        r#"
        SELECT id, name, price_per_unit, unit, store_name, valid_from, created_at
          FROM ingredients
         ORDER BY created_at ASC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    changes: IngredientChanges,
) -> sqlx::Result<Option<Ingredient>> {
    sqlx::query_as::<_, Ingredient>(
        r#"
        UPDATE ingredients
           SET name = COALESCE($2, name),
               price_per_unit = COALESCE($3, price_per_unit),
               unit = COALESCE($4, unit),
               store_name = CASE WHEN $5 THEN $6 ELSE store_name END,
               valid_from = CASE WHEN $7 THEN $8 ELSE valid_from END
         WHERE id = $1
        RETURNING id, name, price_per_unit, unit, store_name, valid_from, created_at
        "#,
    )
    .bind(id)
    .bind(changes.name)
    .bind(changes.price_per_unit)
    .bind(changes.unit)
    .bind(changes.store_name.is_some())
    .bind(changes.store_name.flatten())
    .bind(changes.valid_from.is_some())
    .bind(changes.valid_from.flatten())
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM ingredients WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
