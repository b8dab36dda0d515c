use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::core::axis::{AxisLength, pixel_at_time};
use crate::core::primitives::{datetime_to_millis, millis_to_datetime};
use crate::core::time_range::TimeRange;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Tick label placed on the time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeLabel {
    pub at: DateTime<Utc>,
    pub position_px: f64,
    /// `HH:MM` in the display offset.
    pub text: String,
    /// `DD.MM`, only present once the window spans a day or more.
    pub date_text: Option<String>,
    pub major: bool,
}

/// Spacing between labels for a given visible duration.
#[must_use]
pub fn label_cadence_ms(visible_duration_ms: i64) -> i64 {
    if visible_duration_ms <= 5 * MINUTE_MS {
        MINUTE_MS
    } else if visible_duration_ms <= 30 * MINUTE_MS {
        5 * MINUTE_MS
    } else if visible_duration_ms <= 2 * HOUR_MS {
        15 * MINUTE_MS
    } else if visible_duration_ms <= 12 * HOUR_MS {
        HOUR_MS
    } else {
        4 * HOUR_MS
    }
}

/// Generates labels aligned to multiples of the cadence inside `visible`.
#[must_use]
pub fn time_labels(visible: TimeRange, axis: AxisLength, offset: FixedOffset) -> Vec<TimeLabel> {
    let duration = visible.duration_ms();
    let cadence = label_cadence_ms(duration);
    let major = cadence >= HOUR_MS;
    let show_date = duration >= DAY_MS;

    let start_ms = datetime_to_millis(visible.start());
    let end_ms = datetime_to_millis(visible.end());
    let mut tick_ms = start_ms.div_euclid(cadence) * cadence;
    if tick_ms < start_ms {
        tick_ms += cadence;
    }

    let mut labels = Vec::new();
    while tick_ms <= end_ms {
        let Ok(at) = millis_to_datetime(tick_ms) else {
            break;
        };
        let local = at.with_timezone(&offset);
        labels.push(TimeLabel {
            at,
            position_px: pixel_at_time(visible, axis, at),
            text: local.format("%H:%M").to_string(),
            date_text: show_date.then(|| local.format("%d.%m").to_string()),
            major,
        });
        tick_ms += cadence;
    }
    labels
}
