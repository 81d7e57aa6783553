//! Cost report response types.
//!
//! These mirror the JSON returned by `GET /v1/organizations/cost_report`:
//!
//! ```json
//! {
//!   "data": [
//!     {
//!       "starting_at": "2025-01-01T00:00:00Z",
//!       "ending_at": "2025-01-02T00:00:00Z",
//!       "results": [
//!         {"amount": "123.45", "currency": "USD", "model": "claude-opus-4-6"}
//!       ]
//!     }
//!   ],
//!   "has_more": false,
//!   "next_page": null
//! }
//! ```
//!
//! Amounts are in cents (hundredths of a dollar), encoded as decimal strings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Model name used when a result carries no model.
pub const OTHER_MODEL: &str = "Other";

// ============================================================================
// Response
// ============================================================================

/// Top-level cost report response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostReportResponse {
    /// Time buckets, oldest first.
    #[serde(default)]
    pub data: Vec<CostBucket>,
    /// Whether more pages are available.
    #[serde(default)]
    pub has_more: bool,
    /// Cursor for the next page.
    #[serde(default)]
    pub next_page: Option<String>,
}

// ============================================================================
// Bucket
// ============================================================================

/// One time bucket (a single day for `bucket_width=1d`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBucket {
    /// Bucket start (inclusive).
    pub starting_at: DateTime<Utc>,
    /// Bucket end (exclusive).
    pub ending_at: DateTime<Utc>,
    /// Cost line items in this bucket.
    #[serde(default)]
    pub results: Vec<CostResult>,
}

impl CostBucket {
    /// Creates an empty bucket for the given range.
    pub fn new(starting_at: DateTime<Utc>, ending_at: DateTime<Utc>) -> Self {
        Self {
            starting_at,
            ending_at,
            results: Vec::new(),
        }
    }

    /// Sum of all result amounts in cents.
    pub fn total_cents(&self) -> Decimal {
        self.results.iter().map(|r| r.amount).sum()
    }
}

// ============================================================================
// Result
// ============================================================================

/// A single cost line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostResult {
    /// Amount in cents. Missing amounts count as zero.
    #[serde(default)]
    pub amount: Decimal,
    /// Model identifier, absent for non-model costs.
    #[serde(default)]
    pub model: Option<String>,
}

impl CostResult {
    /// Creates a result for the given amount and model.
    pub fn new(amount: Decimal, model: Option<&str>) -> Self {
        Self {
            amount,
            model: model.map(str::to_string),
        }
    }

    /// Model identifier, or [`OTHER_MODEL`] when absent or empty.
    pub fn model_or_other(&self) -> &str {
        match self.model.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => OTHER_MODEL,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
