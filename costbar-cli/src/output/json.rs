//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDate};
use costbar_core::{CostReport, DateStampPolicy, WindowPolicy, shorten_model};
use costbar_fetch::{CostError, ErrorKind};
use rust_decimal::Decimal;
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// Top-level JSON document.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutput {
    /// A report was produced.
    Ok(ReportOutput),
    /// The API returned no buckets.
    NoData {
        #[serde(rename = "updatedAt")]
        updated_at: DateTime<FixedOffset>,
    },
    /// The run failed.
    Error(ErrorOutput),
}

/// Aggregated report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutput {
    pub total_usd: Decimal,
    pub total_cents: Decimal,
    pub window: &'static str,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub models: Vec<ModelOutput>,
    pub updated_at: DateTime<FixedOffset>,
}

/// One model line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelOutput {
    pub model: String,
    pub name: String,
    pub usd: Decimal,
}

/// Failure details.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

fn kind_name(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::MissingCredential => "missing_credential",
        ErrorKind::Transport => "transport",
        ErrorKind::Upstream => "upstream",
        ErrorKind::Unexpected => "unexpected",
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter for scripting.
pub struct JsonFormatter {
    pretty: bool,
    date_stamps: DateStampPolicy,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool, date_stamps: DateStampPolicy) -> Self {
        Self {
            pretty,
            date_stamps,
        }
    }

    /// Builds the output document for a run.
    pub fn build(
        &self,
        outcome: &Result<Option<CostReport>, CostError>,
        window: WindowPolicy,
        now: DateTime<FixedOffset>,
    ) -> RunOutput {
        match outcome {
            Ok(Some(report)) => RunOutput::Ok(ReportOutput {
                total_usd: report.total_usd(),
                total_cents: report.total_cents,
                window: window.as_str(),
                period_start: report.period_start,
                period_end: report.period_end,
                models: report
                    .models
                    .iter()
                    .map(|m| ModelOutput {
                        model: m.model.clone(),
                        name: shorten_model(&m.model, self.date_stamps),
                        usd: m.usd(),
                    })
                    .collect(),
                updated_at: now,
            }),
            Ok(None) => RunOutput::NoData { updated_at: now },
            Err(e) => RunOutput::Error(ErrorOutput {
                kind: kind_name(e.kind()),
                message: e.to_string(),
                http_status: match e {
                    CostError::Upstream { status, .. } => Some(*status),
                    _ => None,
                },
                detail: match e {
                    CostError::Upstream { message, .. } => Some(message.clone()),
                    _ => None,
                },
            }),
        }
    }

    /// Formats a run as a JSON string.
    pub fn format(
        &self,
        outcome: &Result<Option<CostReport>, CostError>,
        window: WindowPolicy,
        now: DateTime<FixedOffset>,
    ) -> Result<String> {
        let output = self.build(outcome, window, now);
        let json = if self.pretty {
            serde_json::to_string_pretty(&output)?
        } else {
            serde_json::to_string(&output)?
        };
        Ok(json)
    }
}
