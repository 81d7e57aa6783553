//! Settings management.
//!
//! Settings live in an optional JSON file next to the key file:
//!
//! ```json
//! {
//!   "window": "local_today",
//!   "buckets": "all",
//!   "date_stamps": "strip",
//!   "timeout_secs": 10
//! }
//! ```
//!
//! Every field is optional; a missing file means all defaults.

use anyhow::{Context, Result};
use costbar_core::{BucketSelection, DateStampPolicy, WindowPolicy};
use costbar_fetch::{API_BASE_URL, CredentialResolver, DEFAULT_API_KEY_ENV, DEFAULT_TIMEOUT_SECS, default_key_file};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Web console page linked from the menu.
pub const DEFAULT_CONSOLE_URL: &str = "https://console.anthropic.com/cost";

/// Shortest request timeout accepted.
const MIN_TIMEOUT_SECS: u64 = 1;

/// Settings file location relative to the home directory.
const SETTINGS_RELATIVE: &str = ".config/claude-cost/config.json";

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// API base URL.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Which time range to request.
    pub window: WindowPolicy,
    /// Which returned buckets to count.
    pub buckets: BucketSelection,
    /// How model date stamps are displayed.
    pub date_stamps: DateStampPolicy,
    /// Console link shown in the menu.
    pub console_url: String,
    /// Environment variable holding the admin key.
    pub api_key_env: String,
    /// Key file override; defaults to `~/.config/claude-cost/admin_key`.
    pub key_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            window: WindowPolicy::default(),
            buckets: BucketSelection::default(),
            date_stamps: DateStampPolicy::default(),
            console_url: DEFAULT_CONSOLE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            key_file: None,
        }
    }
}

impl Settings {
    /// Returns the default settings file path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(SETTINGS_RELATIVE))
    }

    /// Loads settings from `path`, or from the default path when `None`.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads settings from a specific path.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        if settings.timeout_secs < MIN_TIMEOUT_SECS {
            warn!(path = %path.display(), timeout_secs = settings.timeout_secs, "Timeout too short, using 1s");
            settings.timeout_secs = MIN_TIMEOUT_SECS;
        }

        info!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Key file to consult, with the default applied.
    pub fn key_file(&self) -> Option<PathBuf> {
        self.key_file.clone().or_else(default_key_file)
    }

    /// Credential resolver for these settings.
    pub fn resolver(&self) -> CredentialResolver {
        CredentialResolver::new(self.api_key_env.clone(), self.key_file())
    }

    /// Request timeout, never below one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(MIN_TIMEOUT_SECS))
    }
}

// ============================================================================
// Tests
// ============================================================================
