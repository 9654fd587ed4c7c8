use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Favorite, FavoriteChanges, NewFavorite};

pub async fn insert(db: &PgPool, new: NewFavorite) -> sqlx::Result<Favorite> {
    sqlx::query_as::<_, Favorite>(
        r#"
        INSERT INTO favorites (id, user_id, meal_id)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, meal_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.user_id)
    .bind(new.meal_id)
    .fetch_one(db)
    .await
}

pub async fn get(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Favorite>> {
    sqlx::query_as::<_, Favorite>(
        "SELECT id, user_id, meal_id, created_at FROM favorites WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<Favorite>> {
    sqlx::query_as::<_, Favorite>(
        "SELECT id, user_id, meal_id, created_at FROM favorites ORDER BY created_at ASC",
    )
    .fetch_all(db)
    .await
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<Favorite>> {
    sqlx::query_as::<_, Favorite>(
        r#"
        SELECT id, user_id, meal_id, created_at
          FROM favorites
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
    changes: FavoriteChanges,
) -> sqlx::Result<Option<Favorite>> {
    sqlx::query_as::<_, Favorite>(
        r#"
        UPDATE favorites
           SET meal_id = COALESCE($2, meal_id)
         WHERE id = $1
        RETURNING id, user_id, meal_id, created_at
        "#,
    )
    .bind(id)
    .bind(changes.meal_id)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM favorites WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
