//! Domain models for costbar.
//!
//! ## Submodules
//!
//! - [`cost`] - Raw cost report response (buckets and results)
//! - [`report`] - Aggregated report (total and per-model breakdown)

mod cost;
mod report;

pub use cost::{CostBucket, CostReportResponse, CostResult, OTHER_MODEL};
pub use report::{CostReport, ModelTotal};
