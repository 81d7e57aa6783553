//! SwiftBar/xbar menu output.
//!
//! The host reads stdout line by line. The first line is the menu bar title,
//! a line of exactly `---` separates sections, and `Text | key=value` lines
//! are actions (`refresh=true`, `href=<url>`).

use chrono::{DateTime, FixedOffset};
use costbar_core::{CostReport, DateStampPolicy, WindowPolicy, shorten_model};
use costbar_fetch::CostError;

use crate::settings::DEFAULT_CONSOLE_URL;

/// Section separator recognised by the host.
pub const SEPARATOR: &str = "---";

/// Title shown when anything went wrong.
pub const WARNING_TITLE: &str = "claude ⚠";

/// Title shown when the API returned no buckets.
pub const NO_DATA_TITLE: &str = "$--";

const HEADER_LABEL: &str = "Claude API Cost";
const REFRESH_ACTION: &str = "Refresh | refresh=true";

/// Renders reports and errors into menu lines.
#[derive(Debug, Clone)]
pub struct MenuFormatter {
    date_stamps: DateStampPolicy,
    console_url: String,
}

impl Default for MenuFormatter {
    fn default() -> Self {
        Self::new(DateStampPolicy::default(), DEFAULT_CONSOLE_URL)
    }
}

impl MenuFormatter {
    /// Creates a formatter.
    pub fn new(date_stamps: DateStampPolicy, console_url: impl Into<String>) -> Self {
        Self {
            date_stamps,
            console_url: console_url.into(),
        }
    }

    /// Renders the outcome of a run.
    pub fn render(
        &self,
        outcome: &Result<Option<CostReport>, CostError>,
        window: WindowPolicy,
        now: DateTime<FixedOffset>,
    ) -> Vec<String> {
        match outcome {
            Ok(Some(report)) => self.format_report(report, window, now),
            Ok(None) => self.format_no_data(now),
            Err(e) => self.format_error(e),
        }
    }

    /// Formats a successful report.
    pub fn format_report(
        &self,
        report: &CostReport,
        window: WindowPolicy,
        now: DateTime<FixedOffset>,
    ) -> Vec<String> {
        let mut lines = vec![
            format!("${:.2}", report.total_usd()),
            SEPARATOR.to_string(),
            Self::header(report, window),
            SEPARATOR.to_string(),
        ];

        if report.has_usage() {
            lines.extend(report.visible_models().map(|m| {
                format!(
                    "${:.4}  {}",
                    m.usd(),
                    menu_safe(&shorten_model(&m.model, self.date_stamps))
                )
            }));
        } else {
            lines.push("No usage recorded".to_string());
        }

        self.push_footer(&mut lines, now);
        lines
    }

    /// Formats the "no buckets" case, kept distinct from a real `$0.00`.
    pub fn format_no_data(&self, now: DateTime<FixedOffset>) -> Vec<String> {
        let mut lines = vec![
            NO_DATA_TITLE.to_string(),
            SEPARATOR.to_string(),
            "No cost data available yet".to_string(),
        ];
        self.push_footer(&mut lines, now);
        lines
    }

    /// Formats an error: warning title, then diagnostic lines.
    pub fn format_error(&self, err: &CostError) -> Vec<String> {
        let mut lines = vec![WARNING_TITLE.to_string(), SEPARATOR.to_string()];

        match err {
            CostError::MissingCredential { env_var, key_file } => {
                lines.push(err.to_string());
                lines.push(SEPARATOR.to_string());
                match key_file {
                    Some(path) => {
                        let file = path.display();
                        lines.push("Create config file:".to_string());
                        if let Some(dir) = path.parent() {
                            lines.push(format!("mkdir -p {}", dir.display()));
                        }
                        lines.push(format!("echo 'sk-ant-admin...' > {file}"));
                        lines.push(format!("chmod 600 {file}"));
                        lines.push(format!("or set {env_var}"));
                    }
                    None => lines.push(format!("Set {env_var}")),
                }
            }
            CostError::Upstream { message, .. } => {
                lines.push(err.to_string());
                if !message.trim().is_empty() {
                    lines.push(menu_safe(message));
                }
            }
            CostError::Transport(_) | CostError::Timeout(_) | CostError::Unexpected(_) => {
                lines.push(menu_safe(&err.to_string()));
            }
        }

        lines.push(SEPARATOR.to_string());
        lines.push(REFRESH_ACTION.to_string());
        lines
    }

    fn header(report: &CostReport, window: WindowPolicy) -> String {
        match window {
            WindowPolicy::LocalToday => format!("{HEADER_LABEL}  (today)"),
            WindowPolicy::RecentUtcDays if report.is_single_day() => {
                format!("{HEADER_LABEL}  ({} UTC)", report.period_start)
            }
            WindowPolicy::RecentUtcDays => format!(
                "{HEADER_LABEL}  ({} to {} UTC)",
                report.period_start, report.period_end
            ),
        }
    }

    fn push_footer(&self, lines: &mut Vec<String>, now: DateTime<FixedOffset>) {
        lines.push(SEPARATOR.to_string());
        lines.push(format!("Updated: {}", now.format("%H:%M:%S")));
        lines.push(REFRESH_ACTION.to_string());
        lines.push(format!("Open Console | href={}", self.console_url));
    }
}

/// Keeps free text on one line and out of the host's `|` parameter syntax.
fn menu_safe(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "¦")
}
