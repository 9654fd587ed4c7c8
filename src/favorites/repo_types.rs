use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// A user's bookmark on a meal; (user_id, meal_id) is unique.
#[derive(Debug, Clone, FromRow)]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meal_id: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewFavorite {
    pub user_id: Uuid,
    pub meal_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct FavoriteChanges {
    pub meal_id: Option<Uuid>,
}
