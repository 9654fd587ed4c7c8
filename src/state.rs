use crate::config::AppConfig;
use crate::diet_types::services::DietTypeManager;
use crate::favorites::services::FavoriteManager;
use crate::ingredients::services::IngredientManager;
use crate::meal_plans::services::MealPlanManager;
use crate::meals::services::MealManager;
use crate::pricing::services::PricingEngine;
use crate::store::{MemoryStore, PgStore, Store};
use crate::users::services::UserManager;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::from_config(config).await
    }

    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn Store> = if config.uses_memory_store() {
            info!("using in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(PgStore::connect(&config).await?)
        };
        Ok(Self::from_parts(store, Arc::new(config)))
    }

    pub fn from_parts(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    pub fn diet_types(&self) -> DietTypeManager {
        DietTypeManager::new(self.store.clone())
    }

    pub fn users(&self) -> UserManager {
        UserManager::new(self.store.clone())
    }

    pub fn ingredients(&self) -> IngredientManager {
        IngredientManager::new(self.store.clone())
    }

    pub fn meals(&self) -> MealManager {
        MealManager::new(self.store.clone())
    }

    pub fn meal_plans(&self) -> MealPlanManager {
        MealPlanManager::new(self.store.clone())
    }

    pub fn favorites(&self) -> FavoriteManager {
        FavoriteManager::new(self.store.clone())
    }

    pub fn pricing(&self) -> PricingEngine {
        PricingEngine::new(self.store.clone())
    }

    /// In-memory store with a fixed JWT config, for tests.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: "memory://".into(),
            max_connections: 1,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::from_parts(Arc::new(MemoryStore::new()), config)
    }
}
