// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! claude-cost - Anthropic API spend in the menu bar.
//!
//! A SwiftBar/xbar plugin: the host runs it on a schedule (e.g. as
//! `claude-cost.5m`) and turns stdout into a menu bar title and dropdown.
//!
//! # Examples
//!
//! ```bash
//! # Menu output, as the host sees it
//! claude-cost
//!
//! # Today's spend in local time instead of the last two UTC days
//! claude-cost --window local-today
//!
//! # JSON output for scripting
//! claude-cost --format json
//!
//! # Debug logging on stderr
//! claude-cost --verbose
//! ```

mod output;
mod report;
mod settings;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use costbar_core::{Clock, CostReport, SystemClock, WindowPolicy};
use costbar_fetch::{CostError, HttpCostClient};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use output::{JsonFormatter, MenuFormatter};
use report::ReportRunner;
use settings::Settings;

// ============================================================================
// CLI Definition
// ============================================================================

/// claude-cost - Anthropic API spend for SwiftBar/xbar.
#[derive(Parser)]
#[command(name = "claude-cost")]
#[command(about = "Shows Anthropic API spend from the Admin Cost Report API")]
#[command(long_about = r#"
Shows Anthropic API spend from the Admin Cost Report API, formatted for
SwiftBar/xbar menu bar plugins.

The admin key is read from ANTHROPIC_ADMIN_KEY or from
~/.config/claude-cost/admin_key. Optional settings live in
~/.config/claude-cost/config.json.

Every flag is optional; the host runs this with no arguments.
"#)]
#[command(version)]
pub struct Cli {
    /// Settings file (JSON).
    #[arg(long, env = "COSTBAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Time window: recent-utc-days or local-today.
    #[arg(long, env = "COSTBAR_WINDOW", value_parser = parse_window)]
    pub window: Option<WindowPolicy>,

    /// Output format.
    #[arg(long, short = 'f', default_value = "text", env = "COSTBAR_FORMAT")]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Verbose logging on stderr.
    #[arg(long, short)]
    pub verbose: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// SwiftBar/xbar menu text.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

fn parse_window(s: &str) -> Result<WindowPolicy, String> {
    s.parse().map_err(|e: costbar_core::CoreError| e.to_string())
}

// ============================================================================
// Logging Setup
// ============================================================================

/// Logs go to stderr; stdout belongs to the menu host.
fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("claude_cost=debug,costbar_core=debug,costbar_fetch=debug,warn")
    } else {
        EnvFilter::try_from_env("COSTBAR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            // Bad flags or env overrides still render a menu and exit 0.
            let err = CostError::Unexpected(e.kind().to_string());
            print_lines(&MenuFormatter::default().format_error(&err));
            return;
        }
    };

    setup_logging(cli.verbose);

    let lines = run(&cli).await;
    print_lines(&lines);
}

/// Runs one report and renders it. Never fails; errors become menu lines.
async fn run(cli: &Cli) -> Vec<String> {
    let mut settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Failed to load settings");
            let outcome = Err(CostError::Unexpected(format!("{e:#}")));
            return render(cli, &Settings::default(), &outcome, &SystemClock);
        }
    };
    if let Some(window) = cli.window {
        settings.window = window;
    }

    let clock = SystemClock;
    let outcome = match HttpCostClient::with_timeout(settings.timeout()) {
        Ok(client) => ReportRunner::new(&settings, &clock, &client).run().await,
        Err(e) => Err(e),
    };

    render(cli, &settings, &outcome, &clock)
}

fn render(
    cli: &Cli,
    settings: &Settings,
    outcome: &Result<Option<CostReport>, CostError>,
    clock: &dyn Clock,
) -> Vec<String> {
    let now = clock.now();
    match cli.format {
        OutputFormat::Text => MenuFormatter::new(settings.date_stamps, settings.console_url.clone())
            .render(outcome, settings.window, now),
        OutputFormat::Json => json_or_menu(
            JsonFormatter::new(cli.pretty, settings.date_stamps).format(outcome, settings.window, now),
        ),
    }
}

/// Falls back to a menu error page when JSON serialization fails.
fn json_or_menu(json: anyhow::Result<String>) -> Vec<String> {
    match json {
        Ok(json) => vec![json],
        Err(e) => {
            error!(error = %e, "Failed to serialize JSON output");
            MenuFormatter::default().format_error(&CostError::Unexpected(e.to_string()))
        }
    }
}

fn print_lines(lines: &[String]) {
    let mut out = std::io::stdout().lock();
    for line in lines {
        if writeln!(out, "{line}").is_err() {
            break;
        }
    }
    let _ = out.flush();
}

// ============================================================================
// Tests
// ============================================================================
