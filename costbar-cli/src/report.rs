//! One cost report run: key, window, request, fetch, aggregate.

use costbar_core::{Clock, CostReport, ReportWindow, aggregate};
use costbar_fetch::{CostError, CostReportRequest, CostSource};
use tracing::{debug, info, warn};

use crate::settings::Settings;

/// Ties settings, clock and data source together for a single run.
pub struct ReportRunner<'a> {
    settings: &'a Settings,
    clock: &'a dyn Clock,
    source: &'a dyn CostSource,
}

impl<'a> ReportRunner<'a> {
    /// Creates a runner.
    pub fn new(settings: &'a Settings, clock: &'a dyn Clock, source: &'a dyn CostSource) -> Self {
        Self {
            settings,
            clock,
            source,
        }
    }

    /// Runs against the process environment.
    pub async fn run(&self) -> Result<Option<CostReport>, CostError> {
        self.run_with(|name| std::env::var(name).ok()).await
    }

    /// Runs with `lookup` standing in for the process environment.
    ///
    /// `Ok(None)` means the API returned no buckets for the window.
    pub async fn run_with<F>(&self, lookup: F) -> Result<Option<CostReport>, CostError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolver = self.settings.resolver();
        let key = resolver
            .resolve_with(lookup)
            .ok_or_else(|| CostError::MissingCredential {
                env_var: resolver.env_var().to_string(),
                key_file: resolver.key_file().map(ToOwned::to_owned),
            })?;

        let window = ReportWindow::from_clock(self.settings.window, self.clock);
        debug!(
            policy = window.policy.as_str(),
            starting_at = %window.starting_at_param(),
            ending_at = %window.ending_at_param(),
            "Computed report window"
        );

        let request = CostReportRequest::build(&self.settings.base_url, &key, &window)?;
        let document = match self.source.fetch(&request).await {
            Ok(document) => document,
            Err(e) => {
                if e.is_transient() {
                    info!(error = %e, "Cost report unavailable, will retry on next refresh");
                } else {
                    warn!(error = %e, "Cost report request failed");
                }
                return Err(e);
            }
        };

        let report = aggregate(&document, self.settings.buckets)?;
        match &report {
            Some(r) => debug!(total_cents = %r.total_cents, buckets = r.bucket_count, "Report ready"),
            None => debug!("No cost buckets in window"),
        }
        Ok(report)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use costbar_core::{BucketSelection, FixedClock, WindowPolicy};
    use costbar_fetch::ErrorKind;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Records requests and replays a canned answer.
    struct FakeSource {
        answer: Result<serde_json::Value, u16>,
        seen: Mutex<Vec<CostReportRequest>>,
    }

    impl FakeSource {
        fn ok(document: serde_json::Value) -> Self {
            Self {
                answer: Ok(document),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn status(status: u16) -> Self {
            Self {
                answer: Err(status),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CostSource for FakeSource {
        async fn fetch(&self, request: &CostReportRequest) -> Result<serde_json::Value, CostError> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.answer {
                Ok(document) => Ok(document.clone()),
                Err(status) => Err(CostError::upstream(*status, r#"{"error":{"message":"invalid key"}}"#)),
            }
        }
    }

    fn settings() -> Settings {
        Settings {
            key_file: Some(PathBuf::from("/nonexistent/claude-cost/admin_key")),
            ..Settings::default()
        }
    }

    fn clock() -> FixedClock {
        FixedClock::parse("2025-03-03T09:30:00+00:00").unwrap()
    }

    fn with_key(name: &str) -> Option<String> {
        (name == "ANTHROPIC_ADMIN_KEY").then(|| "sk-ant-admin-test".to_string())
    }

    #[tokio::test]
    async fn test_missing_key_skips_network() {
        let settings = settings();
        let clock = clock();
        let source = FakeSource::ok(json!({"data": []}));

        let err = ReportRunner::new(&settings, &clock, &source)
            .run_with(|_| None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingCredential);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_successful_run() {
        let settings = settings();
        let clock = clock();
        let source = FakeSource::ok(json!({
            "data": [{
                "starting_at": "2025-03-02T00:00:00Z",
                "ending_at": "2025-03-03T00:00:00Z",
                "results": [
                    {"amount": "1000", "model": "claude-opus-4-6"},
                    {"amount": "234.5", "model": "claude-sonnet-4-5"}
                ]
            }]
        }));

        let report = ReportRunner::new(&settings, &clock, &source)
            .run_with(with_key)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.total_usd(), Decimal::new(1235, 2));
        assert_eq!(source.calls(), 1);

        let seen = source.seen.lock().unwrap();
        assert_eq!(seen[0].query_param("starting_at").as_deref(), Some("2025-03-01T00:00:00Z"));
        assert_eq!(seen[0].headers["x-api-key"], "sk-ant-admin-test");
    }

    #[tokio::test]
    async fn test_local_today_window() {
        let settings = Settings {
            window: WindowPolicy::LocalToday,
            buckets: BucketSelection::Latest,
            ..settings()
        };
        let clock = FixedClock::parse("2025-03-03T09:30:00-05:00").unwrap();
        let source = FakeSource::ok(json!({"data": []}));

        let report = ReportRunner::new(&settings, &clock, &source)
            .run_with(with_key)
            .await
            .unwrap();

        assert!(report.is_none());
        let seen = source.seen.lock().unwrap();
        assert_eq!(seen[0].query_param("starting_at").as_deref(), Some("2025-03-03T05:00:00Z"));
        assert_eq!(seen[0].query_param("ending_at").as_deref(), Some("2025-03-03T14:30:00Z"));
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let settings = settings();
        let clock = clock();
        let source = FakeSource::status(401);

        let err = ReportRunner::new(&settings, &clock, &source)
            .run_with(with_key)
            .await
            .unwrap_err();

        assert!(matches!(err, CostError::Upstream { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_malformed_document_is_unexpected() {
        let settings = settings();
        let clock = clock();
        let source = FakeSource::ok(json!({"data": [{"results": []}]}));

        let err = ReportRunner::new(&settings, &clock, &source)
            .run_with(with_key)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }
}
