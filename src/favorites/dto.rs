use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Favorite, FavoriteChanges};
use crate::error::{ApiResult, Validate};

#[derive(Debug, Deserialize)]
pub struct CreateFavoriteRequest {
    pub user_id: Option<Uuid>,
    pub meal_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateFavoriteRequest {
    pub meal_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meal_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

// Both bodies are fully checked by their types; references are checked by the manager.
impl Validate for CreateFavoriteRequest {
    fn validate(&self) -> ApiResult<()> {
        Ok(())
    }
}

impl Validate for UpdateFavoriteRequest {
    fn validate(&self) -> ApiResult<()> {
        Ok(())
    }
}

impl From<UpdateFavoriteRequest> for FavoriteChanges {
    fn from(r: UpdateFavoriteRequest) -> Self {
        Self { meal_id: r.meal_id }
    }
}

impl From<Favorite> for FavoriteResponse {
    fn from(f: Favorite) -> Self {
        Self {
            id: f.id,
            user_id: f.user_id,
            meal_id: f.meal_id,
            created_at: f.created_at,
        }
    }
}
