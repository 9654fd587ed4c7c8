use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{NewUser, User, UserChanges};

const SELECT_USER: &str = r#"
    SELECT u.id, i.username, i.email, i.password_hash, i.is_staff,
           u.weight, u.height, u.age, u.diet_type_id, u.created_at
      FROM users u
      JOIN auth_identities i ON i.id = u.identity_id
"#;

/// Identity first, then the user row pointing at it; one transaction.
pub async fn create(db: &PgPool, new: NewUser) -> sqlx::Result<User> {
    let mut tx = db.begin().await?;
    let identity_id = insert_identity_tx(&mut tx, &new).await?;

    let user_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO users (id, identity_id, weight, height, age, diet_type_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(user_id)
    .bind(identity_id)
    .bind(new.weight)
    .bind(new.height)
    .bind(new.age)
    .bind(new.diet_type_id)
    .execute(&mut *tx)
    .await?;

    let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE u.id = $1"))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(user)
}

async fn insert_identity_tx(tx: &mut Transaction<'_, Postgres>, new: &NewUser) -> sqlx::Result<Uuid> {
    let identity_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO auth_identities (id, username, email, password_hash, is_staff)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(identity_id)
    .bind(&new.username)
    .bind(&new.email)
    .bind(&new.password_hash)
    .bind(new.is_staff)
    .execute(&mut **tx)
    .await?;
    Ok(identity_id)
}

pub async fn get(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE u.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_by_username(db: &PgPool, username: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE i.username = $1"))
        .bind(username)
        .fetch_optional(db)
        .await
}

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<User>> {
    sqlx::query_as::<_, User>(&format!("{SELECT_USER} ORDER BY u.created_at DESC"))
        .fetch_all(db)
        .await
}

pub async fn update(db: &PgPool, id: Uuid, changes: UserChanges) -> sqlx::Result<Option<User>> {
    let mut tx = db.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE users
           SET weight = CASE WHEN $2 THEN $3 ELSE weight END,
               height = CASE WHEN $4 THEN $5 ELSE height END,
               age = CASE WHEN $6 THEN $7 ELSE age END,
               diet_type_id = CASE WHEN $8 THEN $9 ELSE diet_type_id END
         WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(changes.weight.is_some())
    .bind(changes.weight.flatten())
    .bind(changes.height.is_some())
    .bind(changes.height.flatten())
    .bind(changes.age.is_some())
    .bind(changes.age.flatten())
    .bind(changes.diet_type_id.is_some())
    .bind(changes.diet_type_id.flatten())
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Ok(None);
    }

    if changes.touches_identity() {
        sqlx::query(
            r#"
            UPDATE auth_identities
               SET email = COALESCE($2, email),
                   password_hash = COALESCE($3, password_hash),
                   is_staff = COALESCE($4, is_staff)
             WHERE id = (SELECT identity_id FROM users WHERE id = $1)
            "#,
        )
        .bind(id)
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(changes.is_staff)
        .execute(&mut *tx)
        .await?;
    }

    let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE u.id = $1"))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(user)
}

/// Deleting the identity cascades to the user row and from there to plans and favorites.
pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query(
        r#"
        DELETE FROM auth_identities
         WHERE id = (SELECT identity_id FROM users WHERE id = $1)
        "#,
    )
    .bind(id)
    .execute(db)
    .await?;
    Ok(res.rows_affected() > 0)
}
