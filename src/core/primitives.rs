use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{TimelineError, TimelineResult};

#[must_use]
pub fn datetime_to_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

/// Converts unix milliseconds back into a UTC instant.
///
/// Values outside chrono's representable range are rejected.
pub fn millis_to_datetime(millis: i64) -> TimelineResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| TimelineError::InvalidData(format!("{millis}ms is out of range")))
}

/// Adds a floating millisecond offset, rounding to the nearest millisecond.
///
/// Saturates at chrono's bounds so callers never observe an overflow.
#[must_use]
pub fn offset_by_millis(time: DateTime<Utc>, offset_ms: f64) -> DateTime<Utc> {
    if !offset_ms.is_finite() {
        return time;
    }
    let rounded = offset_ms.round();
    let clamped = rounded.clamp(i64::MIN as f64, i64::MAX as f64) as i64;
    TimeDelta::try_milliseconds(clamped)
        .and_then(|delta| time.checked_add_signed(delta))
        .unwrap_or(if clamped >= 0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        })
}

#[must_use]
pub fn millis_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_milliseconds()
}
