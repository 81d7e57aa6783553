//! Cost report request construction.
//!
//! # API Endpoint
//!
//! ```text
//! GET https://api.anthropic.com/v1/organizations/cost_report
//!     ?starting_at=2025-01-01T00:00:00Z
//!     &ending_at=2025-01-03T09:30:00Z
//!     &bucket_width=1d
//!     &group_by[]=description
//! x-api-key: <admin key>
//! anthropic-version: 2023-06-01
//! ```

use costbar_core::ReportWindow;
use reqwest::header::{self, HeaderMap, HeaderValue};
use url::Url;

use crate::credentials::ApiKey;
use crate::error::CostError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the Anthropic API.
pub const API_BASE_URL: &str = "https://api.anthropic.com";

/// Cost report endpoint.
pub const COST_REPORT_ENDPOINT: &str = "/v1/organizations/cost_report";

/// Value of the `anthropic-version` header.
pub const API_VERSION: &str = "2023-06-01";

/// User agent string for costbar.
pub const USER_AGENT: &str = concat!("costbar/", env!("CARGO_PKG_VERSION"));

/// Bucket width; the API returns one bucket per UTC day.
const BUCKET_WIDTH: &str = "1d";

/// Grouping dimension; `description` breaks costs down by model.
const GROUP_BY: &str = "description";

/// Header carrying the admin key.
const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying [`API_VERSION`].
const VERSION_HEADER: &str = "anthropic-version";

// ============================================================================
// Request
// ============================================================================

/// A fully formed cost report request.
#[derive(Debug, Clone)]
pub struct CostReportRequest {
    /// Endpoint URL including the query string.
    pub url: Url,
    /// Authentication, version and user agent headers.
    pub headers: HeaderMap,
}

impl CostReportRequest {
    /// Builds the request for `window` against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CostError::Unexpected`] if `base_url` is not a valid URL or
    /// the key contains characters not allowed in a header.
    pub fn build(base_url: &str, key: &ApiKey, window: &ReportWindow) -> Result<Self, CostError> {
        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), COST_REPORT_ENDPOINT);
        let url = Url::parse_with_params(
            &endpoint,
            &[
                ("starting_at", window.starting_at_param()),
                ("ending_at", window.ending_at_param()),
                ("bucket_width", BUCKET_WIDTH.to_string()),
                ("group_by[]", GROUP_BY.to_string()),
            ],
        )
        .map_err(|e| CostError::Unexpected(format!("Invalid API URL {endpoint}: {e}")))?;

        let mut key_value = HeaderValue::from_str(key.expose())
            .map_err(|_| CostError::Unexpected("Admin API key contains invalid characters".into()))?;
        key_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key_value);
        headers.insert(VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));

        Ok(Self { url, headers })
    }

    /// Returns the value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

// ============================================================================
// Tests
// ============================================================================
