use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::repo_types::{DietType, DietTypeChanges, NewDietType};
use crate::error::{ApiError, ApiResult};
use crate::store::Store;

pub struct DietTypeManager {
    store: Arc<dyn Store>,
}

impl DietTypeManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, new: NewDietType) -> ApiResult<DietType> {
        let diet_type = self.store.insert_diet_type(new).await?;
        info!(diet_type_id = %diet_type.id, name = %diet_type.name, "diet type created");
        Ok(diet_type)
    }

    pub async fn get_by_id(&self, id: Uuid) -> ApiResult<Option<DietType>> {
        Ok(self.store.get_diet_type(id).await?)
    }

    pub async fn list_all(&self) -> ApiResult<Vec<DietType>> {
        Ok(self.store.list_diet_types().await?)
    }

    pub async fn update(&self, id: Uuid, changes: DietTypeChanges) -> ApiResult<Option<DietType>> {
        Ok(self.store.update_diet_type(id, changes).await?)
    }

    /// Users and meals on this diet keep existing without one.
    pub async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let deleted = self.store.delete_diet_type(id).await?;
        if deleted {
            info!(diet_type_id = %id, "diet type deleted");
        }
        Ok(deleted)
    }
}

/// Field error when an optional `diet_type_id` points nowhere.
pub(crate) async fn require_diet_type(store: &dyn Store, id: Option<Uuid>) -> ApiResult<()> {
    match id {
        Some(id) if store.get_diet_type(id).await?.is_none() => Err(ApiError::invalid(
            "diet_type_id",
            "referenced diet type does not exist",
        )),
        _ => Ok(()),
    }
}
