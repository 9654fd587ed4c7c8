use rust_decimal::Decimal;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User row joined with its auth identity.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String, // argon2, never leaves the server
    pub is_staff: bool,
    pub weight: Option<Decimal>,
    pub height: Option<Decimal>,
    pub age: Option<i32>,
    pub diet_type_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub weight: Option<Decimal>,
    pub height: Option<Decimal>,
    pub age: Option<i32>,
    pub diet_type_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_staff: Option<bool>,
    pub weight: Option<Option<Decimal>>,
    pub height: Option<Option<Decimal>>,
    pub age: Option<Option<i32>>,
    pub diet_type_id: Option<Option<Uuid>>,
}

impl UserChanges {
    pub fn touches_identity(&self) -> bool {
        self.email.is_some() || self.password_hash.is_some() || self.is_staff.is_some()
    }
}
