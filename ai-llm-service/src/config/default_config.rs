//! Default model config loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! Required:
//! - `GOOGLE_AI_KEY`   = API key for the Generative Language API
//!
//! Optional:
//! - `GEMINI_MODEL`     = model identifier (default [`DEFAULT_GEMINI_MODEL`])
//! - `GEMINI_URL`       = API base URL (default [`DEFAULT_GEMINI_ENDPOINT`])
//! - `LLM_MAX_TOKENS`   = max output tokens (u32)
//! - `LLM_TEMPERATURE`  = sampling temperature (f32, `0.0..=2.0`)
//! - `LLM_TIMEOUT_SECS` = HTTP timeout in seconds (u64); unset means no timeout

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, env_opt_f32, env_opt_u32, env_opt_u64, must_env, validate_http_endpoint,
        validate_range_f32,
    },
};

/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro-latest";

/// Public Generative Language API base.
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Constructs the Gemini config used by both the chat path and report generation.
///
/// # Errors
///
/// - [`crate::error_handler::ConfigError::MissingVar`] if `GOOGLE_AI_KEY` is absent
/// - [`crate::error_handler::ConfigError::InvalidFormat`] if `GEMINI_URL` is not http(s)
/// - [`crate::error_handler::ConfigError::InvalidNumber`] for unparsable numeric knobs
/// - [`crate::error_handler::ConfigError::OutOfRange`] if the temperature is outside `0.0..=2.0`
pub fn config_gemini() -> Result<LlmModelConfig, AiLlmError> {
    let api_key = must_env("GOOGLE_AI_KEY")?;

    let model = std::env::var("GEMINI_MODEL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

    let endpoint = std::env::var("GEMINI_URL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_GEMINI_ENDPOINT.to_string());
    validate_http_endpoint("GEMINI_URL", &endpoint)?;

    let temperature = env_opt_f32("LLM_TEMPERATURE")?;
    if let Some(t) = temperature {
        validate_range_f32("temperature", t, 0.0, 2.0)?;
    }

    Ok(LlmModelConfig {
        provider: LlmProvider::Gemini,
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature,
        top_p: None,
        timeout_secs: env_opt_u64("LLM_TIMEOUT_SECS")?,
    })
}
