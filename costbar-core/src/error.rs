//! Core error types for `costbar`.

use thiserror::Error;

/// Core error type for `costbar` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid data in an API response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
