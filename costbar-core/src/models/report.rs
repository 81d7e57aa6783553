//! Aggregated cost report.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Smallest per-model amount (USD) that earns its own menu line: $0.001.
fn min_visible_usd() -> Decimal {
    Decimal::new(1, 3)
}

/// Cents per dollar.
const CENTS_PER_USD: Decimal = Decimal::ONE_HUNDRED;

/// Converts cents to dollars rounded half away from zero.
fn cents_to_usd(cents: Decimal, dp: u32) -> Decimal {
    (cents / CENTS_PER_USD).round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

// ============================================================================
// Cost Report
// ============================================================================

/// Total spend plus per-model breakdown over one or more buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostReport {
    /// Exact total in cents.
    pub total_cents: Decimal,
    /// Per-model totals, sorted by descending amount.
    pub models: Vec<ModelTotal>,
    /// UTC date of the first bucket counted.
    pub period_start: NaiveDate,
    /// UTC date of the last bucket counted.
    pub period_end: NaiveDate,
    /// Number of buckets counted.
    pub bucket_count: usize,
}

impl CostReport {
    /// Total in USD, rounded to cents.
    pub fn total_usd(&self) -> Decimal {
        cents_to_usd(self.total_cents, 2)
    }

    /// Returns true if no result rows were present at all.
    pub fn has_usage(&self) -> bool {
        !self.models.is_empty()
    }

    /// Models large enough to be listed individually.
    pub fn visible_models(&self) -> impl Iterator<Item = &ModelTotal> {
        self.models.iter().filter(|m| m.is_visible())
    }

    /// Returns true if the report covers a single UTC day.
    pub fn is_single_day(&self) -> bool {
        self.period_start == self.period_end
    }
}

// ============================================================================
// Model Total
// ============================================================================

/// Accumulated spend for one model identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelTotal {
    /// Raw model identifier (or "Other").
    pub model: String,
    /// Exact amount in cents.
    pub cents: Decimal,
}

impl ModelTotal {
    /// Creates a new model total.
    pub fn new(model: impl Into<String>, cents: Decimal) -> Self {
        Self {
            model: model.into(),
            cents,
        }
    }

    /// Amount in USD, rounded to four places.
    pub fn usd(&self) -> Decimal {
        cents_to_usd(self.cents, 4)
    }

    /// Whether the amount is at least $0.001.
    pub fn is_visible(&self) -> bool {
        self.cents / CENTS_PER_USD >= min_visible_usd()
    }
}

// ============================================================================
// Tests
// ============================================================================
