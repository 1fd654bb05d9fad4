use ai_llm_service::AiLlmError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use migration_store::StoreError;
use thiserror::Error;

use crate::core::{
    http::response_envelope::ApiResponse,
    session::{ChatError, SessionError},
};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("model configuration: {0}")]
    LlmConfig(#[from] AiLlmError),

    #[error("store configuration: {0}")]
    StoreConfig(#[from] StoreError),

    #[error("startup check failed: {0}")]
    Startup(#[source] SessionError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,

            AppError::Http { status, .. } => *status,

            // startup-only
            AppError::LlmConfig(_)
            | AppError::StoreConfig(_)
            | AppError::Startup(_)
            | AppError::Bind(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::LlmConfig(_) | AppError::StoreConfig(_) => "CONFIG_ERROR",
            AppError::Startup(_) => "STARTUP_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ApiResponse::<()>::error(self.error_code(), self.to_string(), Vec::new())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Session failures keep their message; status and code follow the cause.
impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        let (status, code) = match &err {
            SessionError::Store(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
            SessionError::Model(_) => (StatusCode::BAD_GATEWAY, "MODEL_ERROR"),
            SessionError::Pdf(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PDF_ERROR"),
            SessionError::NoYearData | SessionError::NoCountries => {
                (StatusCode::SERVICE_UNAVAILABLE, "NO_DATA")
            }
            SessionError::NoReport => (StatusCode::NOT_FOUND, "NO_REPORT"),
            SessionError::InvalidYearRange { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        };
        AppError::Http {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        let (status, code) = match &err {
            ChatError::Store(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
            ChatError::Model(_) => (StatusCode::BAD_GATEWAY, "MODEL_ERROR"),
        };
        AppError::Http {
            status,
            code,
            message: format!("Error processing your request: {err}"),
        }
    }
}
