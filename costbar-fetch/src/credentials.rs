//! Admin API key resolution.
//!
//! Resolution order:
//!
//! 1. `ANTHROPIC_ADMIN_KEY` environment variable, trimmed, if non-empty
//! 2. `~/.config/claude-cost/admin_key`, trimmed, if it exists and is non-empty
//! 3. Nothing
//!
//! The key file is expected to be `chmod 600`; looser permissions are logged
//! but not refused.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Environment variable holding the admin key.
pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_ADMIN_KEY";

/// Key file location relative to the home directory.
const KEY_FILE_RELATIVE: &str = ".config/claude-cost/admin_key";

/// Returns the default key file path, `~/.config/claude-cost/admin_key`.
pub fn default_key_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(KEY_FILE_RELATIVE))
}

// ============================================================================
// API Key
// ============================================================================

/// A non-empty admin API key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a key, trimming whitespace. Returns `None` if nothing is left.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// The key itself.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Looks up the admin key from the environment, then from a key file.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    env_var: String,
    key_file: Option<PathBuf>,
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self::new(DEFAULT_API_KEY_ENV, default_key_file())
    }
}

impl CredentialResolver {
    /// Creates a resolver for the given variable and key file.
    pub fn new(env_var: impl Into<String>, key_file: Option<PathBuf>) -> Self {
        Self {
            env_var: env_var.into(),
            key_file,
        }
    }

    /// Name of the environment variable consulted first.
    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    /// Key file consulted second.
    pub fn key_file(&self) -> Option<&Path> {
        self.key_file.as_deref()
    }

    /// Resolves the key from the process environment and the key file.
    pub fn resolve(&self) -> Option<ApiKey> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolves the key using `lookup` in place of the process environment.
    pub fn resolve_with<F>(&self, lookup: F) -> Option<ApiKey>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(&self.env_var).as_deref().and_then(ApiKey::new) {
            debug!(var = %self.env_var, "Using admin key from environment");
            return Some(key);
        }

        let path = self.key_file.as_deref()?;
        if !path.exists() {
            debug!(path = %path.display(), "Key file not found");
            return None;
        }

        warn_if_exposed(path);

        match std::fs::read_to_string(path) {
            Ok(content) => {
                let key = ApiKey::new(&content);
                if key.is_some() {
                    debug!(path = %path.display(), "Using admin key from file");
                } else {
                    debug!(path = %path.display(), "Key file is empty");
                }
                key
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read key file");
                None
            }
        }
    }
}

#[cfg(unix)]
fn warn_if_exposed(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(meta) = std::fs::metadata(path) {
        let mode = meta.permissions().mode();
        if mode & 0o077 != 0 {
            warn!(
                path = %path.display(),
                mode = %format!("{:o}", mode & 0o777),
                "Key file is readable by other users; chmod 600 recommended"
            );
        }
    }
}

#[cfg(not(unix))]
fn warn_if_exposed(_path: &Path) {}

// ============================================================================
// Tests
// ============================================================================
