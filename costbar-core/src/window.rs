//! Report windows and the clock they are computed from.
//!
//! The cost report API rejects timestamps in the future, so every window
//! ends at "now" (truncated to whole seconds) and never later.

use chrono::{DateTime, Days, FixedOffset, Local, NaiveDate, NaiveTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Timestamp format accepted by the cost report API.
const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Days covered by [`WindowPolicy::RecentUtcDays`], counted back from today.
const RECENT_DAYS: u64 = 2;

// ============================================================================
// Clock
// ============================================================================

/// Source of the current local wall-clock time.
pub trait Clock {
    /// Current time with the local UTC offset.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    /// Parses an RFC 3339 timestamp such as `2025-03-03T09:30:00+01:00`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the timestamp does not parse.
    pub fn parse(rfc3339: &str) -> Result<Self, CoreError> {
        DateTime::parse_from_rfc3339(rfc3339)
            .map(Self)
            .map_err(|e| CoreError::InvalidConfig(format!("bad timestamp {rfc3339}: {e}")))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

// ============================================================================
// Window Policy
// ============================================================================

/// Which time range to request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    /// From UTC midnight two days ago until now.
    #[default]
    RecentUtcDays,
    /// From local midnight today until now. At exactly midnight, the
    /// previous local day.
    LocalToday,
}

impl WindowPolicy {
    /// Short identifier used in settings and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RecentUtcDays => "recent_utc_days",
            Self::LocalToday => "local_today",
        }
    }
}

impl std::str::FromStr for WindowPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "recent_utc_days" | "utc" => Ok(Self::RecentUtcDays),
            "local_today" | "today" | "local" => Ok(Self::LocalToday),
            other => Err(CoreError::InvalidConfig(format!("unknown window policy: {other}"))),
        }
    }
}

// ============================================================================
// Report Window
// ============================================================================

/// A half-open UTC time range `[starting_at, ending_at)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    /// Window start.
    pub starting_at: DateTime<Utc>,
    /// Window end, never after the instant the window was computed at.
    pub ending_at: DateTime<Utc>,
    /// Policy this window was computed with.
    pub policy: WindowPolicy,
}

impl ReportWindow {
    /// Computes the window for `policy` as of `now`.
    pub fn for_policy(policy: WindowPolicy, now: DateTime<FixedOffset>) -> Self {
        let ending_at = now.with_timezone(&Utc).trunc_subsecs(0);

        let starting_at = match policy {
            WindowPolicy::RecentUtcDays => {
                let day = ending_at.date_naive() - Days::new(RECENT_DAYS);
                day.and_time(NaiveTime::default()).and_utc()
            }
            WindowPolicy::LocalToday => {
                let today = now.date_naive();
                // Right at local midnight today is still empty; report yesterday.
                let day = if local_midnight(now, today) < Some(ending_at) {
                    today
                } else {
                    today - Days::new(1)
                };
                local_midnight(now, day).unwrap_or(ending_at)
            }
        };

        Self {
            starting_at,
            ending_at,
            policy,
        }
    }

    /// Computes the window for `policy` using `clock`.
    pub fn from_clock(policy: WindowPolicy, clock: &dyn Clock) -> Self {
        Self::for_policy(policy, clock.now())
    }

    /// Start formatted for the API.
    pub fn starting_at_param(&self) -> String {
        self.starting_at.format(API_TIMESTAMP_FORMAT).to_string()
    }

    /// End formatted for the API.
    pub fn ending_at_param(&self) -> String {
        self.ending_at.format(API_TIMESTAMP_FORMAT).to_string()
    }
}

/// Midnight starting `day` in the offset of `now`.
fn local_midnight(now: DateTime<FixedOffset>, day: NaiveDate) -> Option<DateTime<Utc>> {
    // A fixed offset maps every local time to exactly one instant.
    now.offset()
        .from_local_datetime(&day.and_time(NaiveTime::default()))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

// ============================================================================
// Tests
// ============================================================================
