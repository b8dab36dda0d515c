use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::{millis_between, offset_by_millis};
use crate::core::time_range::TimeRange;
use crate::error::{TimelineError, TimelineResult};

/// Direction along which time flows on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Picks the coordinate along the scrub axis.
    #[must_use]
    pub fn primary(self, x: f64, y: f64) -> f64 {
        match self {
            Self::Horizontal => x,
            Self::Vertical => y,
        }
    }

    /// Picks the coordinate across the scrub axis.
    #[must_use]
    pub fn perpendicular(self, x: f64, y: f64) -> f64 {
        match self {
            Self::Horizontal => y,
            Self::Vertical => x,
        }
    }
}

/// Validated on-screen length of the scrub axis in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct AxisLength(f64);

impl AxisLength {
    pub fn new(length_px: f64) -> TimelineResult<Self> {
        if !length_px.is_finite() || length_px <= 0.0 {
            return Err(TimelineError::InvalidAxis { length_px });
        }
        Ok(Self(length_px))
    }

    #[must_use]
    pub fn px(self) -> f64 {
        self.0
    }

    /// Clamps a raw coordinate into `[0, len]`; non-finite input maps to `0`.
    #[must_use]
    pub fn clamp_coord(self, coord_px: f64) -> f64 {
        if coord_px.is_nan() {
            return 0.0;
        }
        coord_px.clamp(0.0, self.0)
    }
}

impl TryFrom<f64> for AxisLength {
    type Error = TimelineError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AxisLength> for f64 {
    fn from(value: AxisLength) -> Self {
        value.0
    }
}

/// Maps a coordinate on the scrub axis to the instant it represents.
#[must_use]
pub fn time_at_pixel(range: TimeRange, axis: AxisLength, coord_px: f64) -> DateTime<Utc> {
    let normalized = coord_px / axis.px();
    let offset = normalized * range.duration_ms() as f64;
    offset_by_millis(range.start(), offset)
}

/// Inverse of [`time_at_pixel`]. Instants outside `range` map outside `[0, len]`.
#[must_use]
pub fn pixel_at_time(range: TimeRange, axis: AxisLength, time: DateTime<Utc>) -> f64 {
    let offset = millis_between(range.start(), time) as f64;
    offset / range.duration_ms() as f64 * axis.px()
}

/// Time displacement produced by dragging `delta_px` along the scrub axis.
///
/// Dragging towards larger coordinates moves the window into the past.
#[must_use]
pub fn pan_delta_millis(delta_px: f64, axis: AxisLength, visible_duration_ms: i64) -> f64 {
    let delta = -(delta_px / axis.px()) * visible_duration_ms as f64;
    if delta.is_finite() { delta } else { 0.0 }
}
