//! Display names for model identifiers.
//!
//! Turns identifiers like `claude-opus-4-6` into `Opus 4.6`.

use serde::{Deserialize, Serialize};

/// Vendor prefix removed from identifiers.
const VENDOR_PREFIX: &str = "claude-";

/// Segment separator in model identifiers.
const SEPARATOR: char = '-';

/// Length of a `YYYYMMDD` date stamp segment.
const DATE_STAMP_LEN: usize = 8;

/// Longest numeric segment treated as a version when stripping date stamps.
const MAX_VERSION_LEN: usize = 2;

/// How trailing date stamps in model identifiers are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStampPolicy {
    /// Drop trailing 8-digit segments; versions are 1-2 digit segments.
    #[default]
    Strip,
    /// Keep everything; any trailing numeric segment is part of the version.
    Keep,
}

impl DateStampPolicy {
    fn is_version_segment(self, segment: &str) -> bool {
        if !is_numeric(segment) {
            return false;
        }
        match self {
            Self::Strip => segment.len() <= MAX_VERSION_LEN,
            Self::Keep => true,
        }
    }
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Shortens a raw model identifier into a display label.
///
/// ```
/// use costbar_core::{DateStampPolicy, shorten_model};
///
/// assert_eq!(shorten_model("claude-opus-4-6", DateStampPolicy::Strip), "Opus 4.6");
/// assert_eq!(shorten_model("claude-haiku-3-5-20241022", DateStampPolicy::Strip), "Haiku 3.5");
/// assert_eq!(
///     shorten_model("claude-haiku-3-5-20241022", DateStampPolicy::Keep),
///     "Haiku 3.5.20241022"
/// );
/// ```
pub fn shorten_model(raw: &str, policy: DateStampPolicy) -> String {
    let lowered = raw.trim().to_lowercase();
    let name = lowered.strip_prefix(VENDOR_PREFIX).unwrap_or(&lowered);

    let mut parts: Vec<&str> = name.split(SEPARATOR).filter(|p| !p.is_empty()).collect();

    if policy == DateStampPolicy::Strip {
        while parts
            .last()
            .is_some_and(|p| p.len() == DATE_STAMP_LEN && is_numeric(p))
        {
            parts.pop();
        }
    }

    let split = parts
        .iter()
        .rposition(|p| !policy.is_version_segment(p))
        .map_or(0, |i| i + 1);
    let (family_parts, version_parts) = parts.split_at(split);

    let family = family_parts
        .iter()
        .map(|p| capitalize(p))
        .collect::<Vec<_>>()
        .join(" ");
    let version = version_parts.join(".");

    match (family.is_empty(), version.is_empty()) {
        (_, true) => family,
        (true, false) => version,
        (false, false) => format!("{family} {version}"),
    }
}

// ============================================================================
// Tests
// ============================================================================
