use std::{env, sync::Arc};

use ai_llm_service::{HealthService, LlmModelConfig, TextCompletion, config_gemini};
use migration_store::{MigrationStore, StoreConfig};

use crate::{core::session::SessionController, error_handler::AppError};

pub const DEFAULT_API_ADDRESS: &str = "127.0.0.1:8080";

/// Process configuration assembled from the environment at boot.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address, e.g. "127.0.0.1:8080".
    pub address: String,
    pub store: StoreConfig,
    pub llm: LlmModelConfig,
}

impl AppConfig {
    /// Reads `API_ADDRESS`, the store variables and the model variables.
    pub fn from_env() -> Result<Self, AppError> {
        let address = env::var("API_ADDRESS")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string());

        Ok(Self {
            address,
            store: StoreConfig::from_env()?,
            llm: config_gemini()?,
        })
    }
}

/// Shared state for all HTTP handlers.
pub struct AppState {
    pub session: SessionController,
    /// Same handle the session uses; `/health` pings it directly.
    pub store: Arc<dyn MigrationStore>,
    pub llm_config: LlmModelConfig,
    pub health: HealthService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn MigrationStore>,
        llm: Arc<dyn TextCompletion>,
        llm_config: LlmModelConfig,
        health: HealthService,
    ) -> Self {
        Self {
            session: SessionController::new(Arc::clone(&store), llm),
            store,
            llm_config,
            health,
        }
    }
}
