use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{DietType, DietTypeChanges, NewDietType};

pub async fn insert(db: &PgPool, new: NewDietType) -> sqlx::Result<DietType> {
    sqlx::query_as::<_, DietType>(
        r#"
        INSERT INTO diet_types (id, name, description, is_restricted)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, description, is_restricted, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.name)
    .bind(new.description)
    .bind(new.is_restricted)
    .fetch_one(db)
    .await
}

pub async fn get(db: &PgPool, id: Uuid) -> sqlx::Result<Option<DietType>> {
    sqlx::query_as::<_, DietType>(
        r#"
        SELECT id, name, description, is_restricted, created_at
          FROM diet_types
         WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<DietType>> {
    sqlx::query_as::<_, DietType>(
        r#"
        SELECT id, name, description, is_restricted, created_at
          FROM diet_types
         ORDER BY name ASC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    changes: DietTypeChanges,
) -> sqlx::Result<Option<DietType>> {
    sqlx::query_as::<_, DietType>(
        r#"
        UPDATE diet_types
           SET name = COALESCE($2, name),
               description = CASE WHEN $3 THEN $4 ELSE description END,
               is_restricted = COALESCE($5, is_restricted)
         WHERE id = $1
        RETURNING id, name, description, is_restricted, created_at
        "#,
    )
    .bind(id)
    .bind(changes.name)
    .bind(changes.description.is_some())
    .bind(changes.description.flatten())
    .bind(changes.is_restricted)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM diet_types WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
