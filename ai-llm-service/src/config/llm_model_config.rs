use crate::config::llm_provider::LlmProvider;

/// Configuration for a single model invocation target.
///
/// # Fields
///
/// - `provider`: which hosted backend to use.
/// - `model`: model identifier (e.g., `"gemini-1.5-pro-latest"`).
/// - `endpoint`: API base URL, without the `/v1beta/...` suffix.
/// - `api_key`: API key sent with every request.
/// - `max_tokens`: maximum number of output tokens (if set).
/// - `temperature`: sampling temperature (if set).
/// - `top_p`: nucleus sampling cutoff (if set).
/// - `timeout_secs`: HTTP timeout. `None` leaves the request unbounded.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Gemini,
///     model: "gemini-1.5-pro-latest".to_string(),
///     endpoint: "https://generativelanguage.googleapis.com".to_string(),
///     api_key: Some("AIza...".to_string()),
///     max_tokens: None,
///     temperature: None,
///     top_p: None,
///     timeout_secs: None,
/// };
/// assert_eq!(cfg.provider, LlmProvider::Gemini);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The hosted provider.
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// API base URL.
    pub endpoint: String,

    /// API key for authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
