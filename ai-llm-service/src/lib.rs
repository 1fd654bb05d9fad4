//! Hosted LLM access for the migration analysis backend.
//!
//! - [`config`]: model config, loaded from environment
//! - [`services::gemini_service`]: Gemini `generateContent` client
//! - [`completion`]: the [`TextCompletion`] interface everything else depends on
//! - [`health_service`]: resilient model probe for `/health`
//! - [`telemetry`]: tracing layer and filter helpers used by the binary

pub mod completion;
pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod services;
pub mod telemetry;

pub use completion::{CompletionFuture, TextCompletion};
pub use config::{
    default_config::config_gemini, llm_model_config::LlmModelConfig, llm_provider::LlmProvider,
};
pub use error_handler::AiLlmError;
pub use health_service::{HealthService, HealthStatus};
pub use services::gemini_service::GeminiService;
