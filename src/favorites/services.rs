use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::repo_types::{Favorite, FavoriteChanges, NewFavorite};
use crate::error::ApiResult;
use crate::meals::services::require_meal;
use crate::store::Store;
use crate::users::services::require_user;

pub struct FavoriteManager {
    store: Arc<dyn Store>,
}

impl FavoriteManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// A second favorite for the same (user, meal) is a conflict.
    pub async fn create(&self, new: NewFavorite) -> ApiResult<Favorite> {
        require_user(self.store.as_ref(), new.user_id).await?;
        require_meal(self.store.as_ref(), new.meal_id).await?;
        let favorite = self.store.insert_favorite(new).await?;
        info!(favorite_id = %favorite.id, user_id = %favorite.user_id, meal_id = %favorite.meal_id, "favorite created");
        Ok(favorite)
    }

    pub async fn get_by_id(&self, id: Uuid) -> ApiResult<Option<Favorite>> {
        Ok(self.store.get_favorite(id).await?)
    }

    pub async fn list_all(&self) -> ApiResult<Vec<Favorite>> {
        Ok(self.store.list_favorites().await?)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> ApiResult<Vec<Favorite>> {
        Ok(self.store.list_favorites_for_user(user_id).await?)
    }

    pub async fn update(&self, id: Uuid, changes: FavoriteChanges) -> ApiResult<Option<Favorite>> {
        if let Some(meal_id) = changes.meal_id {
            require_meal(self.store.as_ref(), meal_id).await?;
        }
        Ok(self.store.update_favorite(id, changes).await?)
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        Ok(self.store.delete_favorite(id).await?)
    }
}
