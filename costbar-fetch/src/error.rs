//! Fetch error types.
//!
//! Every failure a run can hit maps onto one [`CostError`] variant; the
//! binary renders it into menu lines only at the very end.

use std::path::PathBuf;
use std::time::Duration;

use costbar_core::CoreError;
use thiserror::Error;

/// Longest raw response body excerpt carried in an upstream error.
pub const BODY_EXCERPT_CHARS: usize = 120;

// ============================================================================
// Error Kind
// ============================================================================

/// Coarse failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No admin key configured.
    MissingCredential,
    /// DNS, connection or timeout failure.
    Transport,
    /// Non-2xx HTTP status.
    Upstream,
    /// Anything else.
    Unexpected,
}

// ============================================================================
// Cost Error
// ============================================================================

/// Error type for a cost report run.
#[derive(Debug, Error)]
pub enum CostError {
    /// No admin key in the environment or the key file.
    #[error("No Admin API key found")]
    MissingCredential {
        /// Environment variable that was checked.
        env_var: String,
        /// Key file that was checked.
        key_file: Option<PathBuf>,
    },

    /// Network-level failure.
    #[error("Network error: {0}")]
    Transport(String),

    /// Request timed out.
    #[error("Network error: request timed out after {}", format_timeout(.0))]
    Timeout(Duration),

    /// The API answered with an error status.
    #[error("API error {status}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// `error.message` from the body, or a raw body excerpt.
        message: String,
    },

    /// Anything else, including malformed responses.
    #[error("{0}")]
    Unexpected(String),
}

impl CostError {
    /// Returns the failure class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential { .. } => ErrorKind::MissingCredential,
            Self::Transport(_) | Self::Timeout(_) => ErrorKind::Transport,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Builds an upstream error from a status and raw response body.
    ///
    /// Uses `error.message` when the body is JSON carrying one, otherwise the
    /// first [`BODY_EXCERPT_CHARS`] characters of the body.
    pub fn upstream(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_string))
            .unwrap_or_else(|| body.chars().take(BODY_EXCERPT_CHARS).collect());
        Self::Upstream { status, message }
    }

    /// Returns true if a later run might succeed without user action.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            Self::MissingCredential { .. } | Self::Unexpected(_) => false,
        }
    }
}

/// Whole seconds as `10s`, anything finer as `250ms`.
fn format_timeout(timeout: &Duration) -> String {
    if timeout.subsec_nanos() == 0 {
        format!("{}s", timeout.as_secs())
    } else {
        format!("{}ms", timeout.as_millis())
    }
}

impl From<CoreError> for CostError {
    fn from(err: CoreError) -> Self {
        Self::Unexpected(err.to_string())
    }
}

impl From<serde_json::Error> for CostError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unexpected(format!("Invalid JSON response: {err}"))
    }
}

// ============================================================================
// Tests
// ============================================================================
