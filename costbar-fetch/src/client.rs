//! HTTP client for the cost report endpoint.
//!
//! One GET, bounded by a timeout, with every failure sorted into the
//! [`CostError`] taxonomy:
//!
//! - connection, DNS, dropped-body and timeout failures become `Transport` / `Timeout`
//! - non-2xx responses become `Upstream` with the API's error message
//! - unreadable or non-JSON bodies become `Unexpected`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::error::CostError;
use crate::request::CostReportRequest;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Cost Source
// ============================================================================

/// Something that can answer a cost report request with a JSON document.
#[async_trait]
pub trait CostSource: Send + Sync {
    /// Performs the request and returns the parsed JSON body.
    async fn fetch(&self, request: &CostReportRequest) -> Result<serde_json::Value, CostError>;
}

// ============================================================================
// HTTP Client
// ============================================================================

/// `reqwest`-backed [`CostSource`].
#[derive(Debug, Clone)]
pub struct HttpCostClient {
    inner: Client,
    timeout: Duration,
}

impl HttpCostClient {
    /// Creates a client with the default 10 second timeout.
    ///
    /// # Errors
    ///
    /// Returns [`CostError::Unexpected`] if the TLS backend cannot be set up.
    pub fn new() -> Result<Self, CostError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns [`CostError::Unexpected`] if the TLS backend cannot be set up.
    pub fn with_timeout(timeout: Duration) -> Result<Self, CostError> {
        let inner = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CostError::Unexpected(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { inner, timeout })
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sorts a `reqwest` error into the taxonomy.
    fn classify(&self, err: &reqwest::Error) -> CostError {
        if err.is_timeout() {
            CostError::Timeout(self.timeout)
        } else if err.is_connect() || err.is_request() || err.is_body() || err.is_decode() {
            CostError::Transport(root_cause(err))
        } else {
            CostError::Unexpected(err.to_string())
        }
    }
}

#[async_trait]
impl CostSource for HttpCostClient {
    #[instrument(skip(self, request), fields(url = %request.url.path()))]
    async fn fetch(&self, request: &CostReportRequest) -> Result<serde_json::Value, CostError> {
        debug!("GET cost report");

        let response = self
            .inner
            .get(request.url.clone())
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        debug!(status = %status, "Response received");

        let body = response.text().await.map_err(|e| self.classify(&e))?;

        if !status.is_success() {
            warn!(status = %status, len = body.len(), "Cost report request failed");
            return Err(CostError::upstream(status.as_u16(), &body));
        }

        debug!(len = body.len(), "Received cost report");
        Ok(serde_json::from_str(&body)?)
    }
}

/// Innermost error message, e.g. "Connection refused (os error 111)".
fn root_cause(err: &reqwest::Error) -> String {
    let mut current: &dyn std::error::Error = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
