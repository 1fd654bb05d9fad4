//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Invalid or missing configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Driver-level failures: connection, server selection, command errors.
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// A returned document did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}
