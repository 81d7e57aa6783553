// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `costbar` Core
//!
//! Domain types and pure logic for the `costbar` menu bar script.
//!
//! Nothing in this crate touches the network, the filesystem or the process
//! environment, so everything here is testable with fixed inputs:
//!
//! - Cost report models as returned by the Admin Cost Report API
//! - Aggregation of buckets into a total and a per-model breakdown
//! - Model identifier shortening for display
//! - Report windows and the clock abstraction they are computed from
//!
//! ## Key Types
//!
//! - [`CostBucket`] / [`CostResult`] - Raw API response entries
//! - [`CostReport`] / [`ModelTotal`] - Aggregated spend
//! - [`WindowPolicy`] / [`ReportWindow`] - Which time range to request
//! - [`Clock`] - Source of "now"

pub mod aggregate;
pub mod error;
pub mod model_name;
pub mod models;
pub mod window;

// Re-export error types
pub use error::CoreError;

// Re-export model types
pub use models::{CostBucket, CostReport, CostReportResponse, CostResult, ModelTotal};

pub use aggregate::{BucketSelection, aggregate, aggregate_response};
pub use model_name::{DateStampPolicy, shorten_model};
pub use window::{Clock, FixedClock, ReportWindow, SystemClock, WindowPolicy};
