// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # costbar Fetch
//!
//! Everything between "we need a cost report" and a parsed JSON document:
//!
//! - [`credentials`] - Admin API key from the environment or a key file
//! - [`request`] - URL and headers for the cost report endpoint
//! - [`client`] - HTTP client with timeout and failure classification
//! - [`error`] - The error taxonomy rendered into the menu
//!
//! ## Example
//!
//! ```ignore
//! use costbar_core::{ReportWindow, SystemClock, WindowPolicy};
//! use costbar_fetch::{CostReportRequest, CostSource, CredentialResolver, HttpCostClient};
//!
//! let key = CredentialResolver::default().resolve().expect("no key");
//! let window = ReportWindow::from_clock(WindowPolicy::RecentUtcDays, &SystemClock);
//! let request = CostReportRequest::build(API_BASE_URL, &key, &window)?;
//! let document = HttpCostClient::new()?.fetch(&request).await?;
//! ```

pub mod client;
pub mod credentials;
pub mod error;
pub mod request;

// Re-export key types at crate root
pub use client::{CostSource, DEFAULT_TIMEOUT_SECS, HttpCostClient};
pub use credentials::{ApiKey, CredentialResolver, DEFAULT_API_KEY_ENV, default_key_file};
pub use error::{CostError, ErrorKind};
pub use request::{API_BASE_URL, API_VERSION, COST_REPORT_ENDPOINT, CostReportRequest, USER_AGENT};
