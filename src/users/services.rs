use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{normalize_email, CreateUserRequest, UpdateUserRequest};
use super::repo_types::{NewUser, User, UserChanges};
use crate::auth::services::{hash_password, verify_password};
use crate::diet_types::services::require_diet_type;
use crate::error::{ApiError, ApiResult};
use crate::store::Store;

/// Field error when `user_id` points nowhere.
pub(crate) async fn require_user(store: &dyn Store, user_id: Uuid) -> ApiResult<()> {
    if store.get_user(user_id).await?.is_none() {
        return Err(ApiError::invalid("user_id", "referenced user does not exist"));
    }
    Ok(())
}

pub struct UserManager {
    store: Arc<dyn Store>,
}

impl UserManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Hashes the password and stores identity plus profile together.
    pub async fn create(&self, req: CreateUserRequest, is_staff: bool) -> ApiResult<User> {
        require_diet_type(self.store.as_ref(), req.diet_type_id).await?;
        let password_hash = hash_password(&req.password)?;
        let user = self
            .store
            .create_user(NewUser {
                username: req.username.trim().to_string(),
                email: normalize_email(&req.email),
                password_hash,
                is_staff,
                weight: req.weight,
                height: req.height,
                age: req.age,
                diet_type_id: req.diet_type_id,
            })
            .await?;
        info!(user_id = %user.id, username = %user.username, is_staff, "user created");
        Ok(user)
    }

    pub async fn get_by_id(&self, id: Uuid) -> ApiResult<Option<User>> {
        Ok(self.store.get_user(id).await?)
    }

    pub async fn list_all(&self) -> ApiResult<Vec<User>> {
        Ok(self.store.list_users().await?)
    }

    /// A new password is re-hashed before it reaches the store.
    pub async fn update(&self, id: Uuid, req: UpdateUserRequest) -> ApiResult<Option<User>> {
        require_diet_type(self.store.as_ref(), req.diet_type_id.flatten()).await?;
        let password_hash = req.password.as_deref().map(hash_password).transpose()?;
        let changes = UserChanges {
            email: req.email.as_deref().map(normalize_email),
            password_hash,
            is_staff: req.is_staff,
            weight: req.weight,
            height: req.height,
            age: req.age,
            diet_type_id: req.diet_type_id,
        };
        Ok(self.store.update_user(id, changes).await?)
    }

    /// Removes the identity too; plans and favorites go with it.
    pub async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let deleted = self.store.delete_user(id).await?;
        if deleted {
            info!(user_id = %id, "user deleted");
        }
        Ok(deleted)
    }

    /// `None` when the user does not exist.
    pub async fn verify_password(&self, id: Uuid, password: &str) -> ApiResult<Option<bool>> {
        let Some(user) = self.store.get_user(id).await? else {
            return Ok(None);
        };
        Ok(Some(verify_password(password, &user.password_hash)?))
    }

    /// Username/password check for token issuance.
    pub async fn authenticate(&self, username: &str, password: &str) -> ApiResult<Option<User>> {
        let Some(user) = self.store.find_user_by_username(username.trim()).await? else {
            warn!(%username, "login for unknown username");
            return Ok(None);
        };
        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            warn!(user_id = %user.id, "login with wrong password");
            Ok(None)
        }
    }
}
