//! Typed error for the report-engine crate.

use ai_llm_service::AiLlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// The model call failed; the inner error is passed through unchanged.
    #[error("Model error: {0}")]
    Llm(#[from] AiLlmError),

    /// The PDF canvas could not be built or serialized.
    #[error("PDF error: {0}")]
    Pdf(String),
}
