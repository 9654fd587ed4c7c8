use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Diet type record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct DietType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_restricted: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewDietType {
    pub name: String,
    pub description: Option<String>,
    pub is_restricted: bool,
}

/// Partial update; `None` leaves the column untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct DietTypeChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_restricted: Option<bool>,
}
