//! Snapshot decision policy.
//!
//! Decides, from the current body and the most recent snapshot, whether an
//! edit warrants a new snapshot. The length delta is a cheap stand-in for
//! edit distance; the time threshold catches slow incremental edits but only
//! when the content actually differs.
//!
//! The clock is a parameter so the policy stays a pure function.

use chrono::Duration;
use serde::Serialize;

use crate::content_stats::char_len;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length delta (in characters) above which an edit is significant.
pub const DEFAULT_CHAR_THRESHOLD: usize = 100;

/// Minutes after which any content change warrants a snapshot.
pub const DEFAULT_TIME_THRESHOLD_MINS: i64 = 5;

/// Number of snapshots retained per document.
pub const DEFAULT_RETENTION_COUNT: usize = 20;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Why a snapshot was (or was not) taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionReason {
    FirstVersion,
    SignificantChange,
    TimeThreshold,
    NoVersionNeeded,
}

impl VersionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstVersion => "first_version",
            Self::SignificantChange => "significant_change",
            Self::TimeThreshold => "time_threshold",
            Self::NoVersionNeeded => "no_version_needed",
        }
    }
}

impl std::fmt::Display for VersionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`VersionPolicy::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionDecision {
    pub should_snapshot: bool,
    pub reason: VersionReason,
}

impl VersionDecision {
    const fn snapshot(reason: VersionReason) -> Self {
        Self {
            should_snapshot: true,
            reason,
        }
    }

    const fn skip() -> Self {
        Self {
            should_snapshot: false,
            reason: VersionReason::NoVersionNeeded,
        }
    }
}

/// The parts of the latest snapshot the policy compares against.
#[derive(Debug, Clone, Copy)]
pub struct LastSnapshot<'a> {
    pub body: &'a str,
    pub created_at: Timestamp,
}

/// Tunable thresholds. [`Default`] holds the behavioural constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionPolicy {
    pub char_threshold: usize,
    pub time_threshold: Duration,
    pub retention_count: usize,
}

impl Default for VersionPolicy {
    fn default() -> Self {
        Self {
            char_threshold: DEFAULT_CHAR_THRESHOLD,
            time_threshold: Duration::minutes(DEFAULT_TIME_THRESHOLD_MINS),
            retention_count: DEFAULT_RETENTION_COUNT,
        }
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

impl VersionPolicy {
    /// Decide whether `current` needs a snapshot. First match wins:
    ///
    /// 1. no prior snapshot: [`VersionReason::FirstVersion`]
    /// 2. length delta above `char_threshold`: [`VersionReason::SignificantChange`]
    /// 3. older than `time_threshold` and content differs: [`VersionReason::TimeThreshold`]
    /// 4. otherwise [`VersionReason::NoVersionNeeded`]
    pub fn decide(
        &self,
        current: &str,
        last: Option<LastSnapshot<'_>>,
        now: Timestamp,
    ) -> VersionDecision {
        let Some(last) = last else {
            return VersionDecision::snapshot(VersionReason::FirstVersion);
        };

        let char_diff = char_len(current).abs_diff(char_len(last.body));
        if char_diff > self.char_threshold {
            return VersionDecision::snapshot(VersionReason::SignificantChange);
        }

        let elapsed = now - last.created_at;
        if elapsed > self.time_threshold && current != last.body {
            return VersionDecision::snapshot(VersionReason::TimeThreshold);
        }

        VersionDecision::skip()
    }
}

/// [`VersionPolicy::decide`] with the default thresholds.
pub fn decide(current: &str, last: Option<LastSnapshot<'_>>, now: Timestamp) -> VersionDecision {
    VersionPolicy::default().decide(current, last, now)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
