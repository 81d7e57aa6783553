//! Aggregation of cost buckets into a [`CostReport`].
//!
//! Every result in every selected bucket is added to the grand total and to
//! its model's running total, so the per-model sums always add up to the
//! grand total.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::models::{CostBucket, CostReport, CostReportResponse, ModelTotal};

// ============================================================================
// Bucket Selection
// ============================================================================

/// Which buckets of a response count towards the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketSelection {
    /// Sum every bucket in the response.
    #[default]
    All,
    /// Only the most recent bucket.
    Latest,
}

impl BucketSelection {
    fn select(self, buckets: &[CostBucket]) -> &[CostBucket] {
        match self {
            Self::All => buckets,
            Self::Latest => match buckets.len() {
                0 => buckets,
                n => &buckets[n - 1..],
            },
        }
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Aggregates a raw JSON cost report document.
///
/// Returns `Ok(None)` when the document has no buckets at all, which is
/// distinct from a report whose total happens to be zero.
///
/// # Errors
///
/// Returns [`CoreError::InvalidData`] if the document does not have the
/// cost report shape or an amount is not a decimal.
pub fn aggregate(
    document: &serde_json::Value,
    selection: BucketSelection,
) -> Result<Option<CostReport>, CoreError> {
    let response = CostReportResponse::deserialize(document)
        .map_err(|e| CoreError::InvalidData(format!("malformed cost report: {e}")))?;
    if response.has_more {
        warn!(
            next_page = response.next_page.as_deref().unwrap_or(""),
            "Cost report has more pages; only the first page is counted"
        );
    }
    Ok(aggregate_response(&response, selection))
}

/// Aggregates an already parsed response.
pub fn aggregate_response(
    response: &CostReportResponse,
    selection: BucketSelection,
) -> Option<CostReport> {
    let buckets = selection.select(&response.data);
    let (first, last) = (buckets.first()?, buckets.last()?);

    let mut total_cents = Decimal::ZERO;
    let mut by_model: BTreeMap<&str, Decimal> = BTreeMap::new();

    for bucket in buckets {
        for result in &bucket.results {
            total_cents += result.amount;
            *by_model.entry(result.model_or_other()).or_default() += result.amount;
        }
    }

    let mut models: Vec<ModelTotal> = by_model
        .into_iter()
        .map(|(model, cents)| ModelTotal::new(model, cents))
        .collect();
    // Stable sort keeps the BTreeMap's name order for ties.
    models.sort_by(|a, b| b.cents.cmp(&a.cents));

    debug!(
        buckets = buckets.len(),
        models = models.len(),
        total_cents = %total_cents,
        "Aggregated cost report"
    );

    Some(CostReport {
        total_cents,
        models,
        period_start: first.starting_at.date_naive(),
        period_end: last.starting_at.date_naive(),
        bucket_count: buckets.len(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn two_day_document() -> serde_json::Value {
        json!({
            "data": [
                {
                    "starting_at": "2025-03-01T00:00:00Z",
                    "ending_at": "2025-03-02T00:00:00Z",
                    "results": [
                        {"amount": "150.25", "model": "claude-sonnet-4-5"},
                        {"amount": "10.10", "model": "claude-opus-4-6"}
                    ]
                },
                {
                    "starting_at": "2025-03-02T00:00:00Z",
                    "ending_at": "2025-03-03T00:00:00Z",
                    "results": [
                        {"amount": "200.5", "model": "claude-opus-4-6"},
                        {"amount": "0.01", "model": null},
                        {"amount": "3.3"}
                    ]
                }
            ],
            "has_more": false
        })
    }

    #[test]
    fn test_aggregate_all_buckets() {
        let report = aggregate(&two_day_document(), BucketSelection::All)
            .unwrap()
            .unwrap();

        assert_eq!(report.total_cents, dec("364.16"));
        assert_eq!(report.bucket_count, 2);
        assert_eq!(report.period_start, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(report.period_end, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());

        let names: Vec<_> = report.models.iter().map(|m| m.model.as_str()).collect();
        assert_eq!(names, vec!["claude-opus-4-6", "claude-sonnet-4-5", "Other"]);
        assert_eq!(report.models[0].cents, dec("210.6"));
        assert_eq!(report.models[2].cents, dec("3.31"));
    }

    #[test]
    fn test_aggregate_latest_bucket() {
        let report = aggregate(&two_day_document(), BucketSelection::Latest)
            .unwrap()
            .unwrap();

        assert_eq!(report.total_cents, dec("203.81"));
        assert_eq!(report.bucket_count, 1);
        assert!(report.is_single_day());
        assert_eq!(report.period_start, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
    }

    #[test]
    fn test_grouping_preserves_total() {
        let report = aggregate(&two_day_document(), BucketSelection::All)
            .unwrap()
            .unwrap();
        let grouped: Decimal = report.models.iter().map(|m| m.cents).sum();
        assert_eq!(grouped, report.total_cents);
    }

    #[test]
    fn test_no_rounding_drift() {
        let results: Vec<_> = (0..1000)
            .map(|_| json!({"amount": "0.1", "model": "claude-haiku-4-5"}))
            .collect();
        let doc = json!({
            "data": [{
                "starting_at": "2025-03-01T00:00:00Z",
                "ending_at": "2025-03-02T00:00:00Z",
                "results": results
            }]
        });

        let report = aggregate(&doc, BucketSelection::All).unwrap().unwrap();
        assert_eq!(report.total_cents, Decimal::from(100));
        assert_eq!(report.total_usd(), Decimal::ONE);
    }

    #[test]
    fn test_empty_data_is_none() {
        let doc = json!({"data": [], "has_more": false});
        assert!(aggregate(&doc, BucketSelection::All).unwrap().is_none());
        assert!(aggregate(&doc, BucketSelection::Latest).unwrap().is_none());
    }

    #[test]
    fn test_missing_data_is_none() {
        assert!(aggregate(&json!({}), BucketSelection::All).unwrap().is_none());
    }

    #[test]
    fn test_bucket_without_results_is_zero_report() {
        let doc = json!({
            "data": [{
                "starting_at": "2025-03-01T00:00:00Z",
                "ending_at": "2025-03-02T00:00:00Z",
                "results": []
            }]
        });

        let report = aggregate(&doc, BucketSelection::All).unwrap().unwrap();
        assert_eq!(report.total_cents, Decimal::ZERO);
        assert!(!report.has_usage());
    }

    #[test]
    fn test_ties_are_ordered_by_name() {
        let doc = json!({
            "data": [{
                "starting_at": "2025-03-01T00:00:00Z",
                "ending_at": "2025-03-02T00:00:00Z",
                "results": [
                    {"amount": "5", "model": "claude-sonnet-4-5"},
                    {"amount": "5", "model": "claude-haiku-4-5"}
                ]
            }]
        });

        let report = aggregate(&doc, BucketSelection::All).unwrap().unwrap();
        let names: Vec<_> = report.models.iter().map(|m| m.model.as_str()).collect();
        assert_eq!(names, vec!["claude-haiku-4-5", "claude-sonnet-4-5"]);
    }

    #[test]
    fn test_malformed_amount_is_error() {
        let doc = json!({
            "data": [{
                "starting_at": "2025-03-01T00:00:00Z",
                "ending_at": "2025-03-02T00:00:00Z",
                "results": [{"amount": "lots", "model": "claude-opus-4-6"}]
            }]
        });

        assert!(matches!(
            aggregate(&doc, BucketSelection::All),
            Err(CoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_wrong_shape_is_error() {
        let doc = json!({"data": "nope"});
        let err = aggregate(&doc, BucketSelection::All).unwrap_err();
        assert!(matches!(err, CoreError::InvalidData(_)));
        assert!(err.to_string().starts_with("Invalid data: malformed cost report"));
    }
}
