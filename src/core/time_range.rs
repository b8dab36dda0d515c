use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_millis, millis_between, offset_by_millis};
use crate::error::{TimelineError, TimelineResult};

/// Half-open interval of wall-clock time with `start < end`.
///
/// Values are immutable; every navigation produces a new range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange")]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawTimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = TimelineError;

    fn try_from(raw: RawTimeRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> TimelineResult<Self> {
        if start >= end {
            return Err(TimelineError::InvalidRange {
                start_ms: datetime_to_millis(start),
                end_ms: datetime_to_millis(end),
            });
        }
        Ok(Self { start, end })
    }

    /// Builds a range of `duration_ms` whose midpoint is `center`.
    pub fn centered_on(center: DateTime<Utc>, duration_ms: i64) -> TimelineResult<Self> {
        if duration_ms <= 0 {
            return Err(TimelineError::InvalidData(
                "range duration must be > 0".to_owned(),
            ));
        }
        let half = duration_ms as f64 / 2.0;
        let start = offset_by_millis(center, -half);
        let end = offset_by_millis(start, duration_ms as f64);
        Self::new(start, end)
    }

    #[must_use]
    pub fn start(self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub fn end(self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub fn duration_ms(self) -> i64 {
        millis_between(self.start, self.end)
    }

    #[must_use]
    pub fn midpoint(self) -> DateTime<Utc> {
        offset_by_millis(self.start, self.duration_ms() as f64 / 2.0)
    }

    /// Translates both edges by the same signed offset.
    ///
    /// Returns the range unchanged if the shift would collapse it at the
    /// representable time bounds.
    #[must_use]
    pub fn shifted_by_millis(self, delta_ms: f64) -> Self {
        let start = offset_by_millis(self.start, delta_ms);
        let end = offset_by_millis(self.end, delta_ms);
        Self::new(start, end).unwrap_or(self)
    }

    /// Expands the range by `multiplier × duration` on both sides.
    #[must_use]
    pub fn padded(self, multiplier: f64) -> Self {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return self;
        }
        let margin = self.duration_ms() as f64 * multiplier;
        let start = offset_by_millis(self.start, -margin);
        let end = offset_by_millis(self.end, margin);
        Self::new(start, end).unwrap_or(self)
    }

    #[must_use]
    pub fn contains_range(self, other: TimeRange) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    #[must_use]
    pub fn contains_instant(self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Length of the intersection in milliseconds, `0` when disjoint.
    #[must_use]
    pub fn overlap_ms(self, other: TimeRange) -> i64 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        millis_between(start, end).max(0)
    }
}
