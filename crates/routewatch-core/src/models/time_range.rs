use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{RoutewatchError, RoutewatchResult};

/// Half-open analysis window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Fails when `start` is not strictly before `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> RoutewatchResult<Self> {
        if start >= end {
            return Err(RoutewatchError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The window of length `duration` ending at `end`.
    pub fn ending_at(end: DateTime<Utc>, duration: Duration) -> RoutewatchResult<Self> {
        let start = end
            .checked_sub_signed(duration)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Window length in fractional days.
    pub fn duration_days(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / Duration::days(1).num_milliseconds() as f64
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }
}
