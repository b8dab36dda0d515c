use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::axis::{AxisLength, pixel_at_time};
use crate::core::primitives::{millis_between, offset_by_millis};
use crate::core::time_range::TimeRange;

/// Per-bucket archive presence flags, aligned to the start of the range they
/// were fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityVector(Vec<bool>);

impl AvailabilityVector {
    #[must_use]
    pub fn new(flags: Vec<bool>) -> Self {
        Self(flags)
    }

    /// Accepts the server's `0`/`1` encoding; any non-zero value counts as present.
    pub fn from_flags<I>(flags: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        Self(flags.into_iter().map(|flag| flag != 0).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<bool> {
        self.0.get(index).copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

/// Availability data together with the exact request it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferedRange {
    pub range: TimeRange,
    pub availability: AvailabilityVector,
    pub zoom_index: usize,
    pub unit_length_secs: u32,
}

impl BufferedRange {
    #[must_use]
    pub fn unit_length_ms(&self) -> i64 {
        i64::from(self.unit_length_secs.max(1)) * 1_000
    }

    /// Presence flag of the bucket covering `instant`, if any.
    #[must_use]
    pub fn availability_at(&self, instant: DateTime<Utc>) -> Option<bool> {
        if !self.range.contains_instant(instant) {
            return None;
        }
        let offset = millis_between(self.range.start(), instant);
        let index = usize::try_from(offset / self.unit_length_ms()).ok()?;
        self.availability.get(index)
    }
}

/// Contiguous run of buckets sharing the same presence flag, clipped to the
/// visible range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvailabilitySegment {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub has_archive: bool,
    pub start_px: f64,
    pub end_px: f64,
}

pub type AvailabilitySegments = SmallVec<[AvailabilitySegment; 8]>;

/// Projects the buffered availability onto the visible window.
///
/// Adjacent buckets with the same flag are merged so renderers draw one
/// block per run instead of one per bucket.
#[must_use]
pub fn project_availability(
    buffered: &BufferedRange,
    visible: TimeRange,
    axis: AxisLength,
) -> AvailabilitySegments {
    let mut segments = AvailabilitySegments::new();
    let unit_ms = buffered.unit_length_ms();
    let visible_offset = millis_between(buffered.range.start(), visible.start());
    let first = usize::try_from(visible_offset.max(0) / unit_ms).unwrap_or(0);

    for index in first..buffered.availability.len() {
        let Some(has_archive) = buffered.availability.get(index) else {
            break;
        };
        let bucket_start = offset_by_millis(buffered.range.start(), (index as i64 * unit_ms) as f64);
        if bucket_start >= visible.end() || bucket_start >= buffered.range.end() {
            break;
        }
        let bucket_end = offset_by_millis(bucket_start, unit_ms as f64)
            .min(buffered.range.end())
            .min(visible.end());
        let clipped_start = bucket_start.max(visible.start());
        if clipped_start >= bucket_end {
            continue;
        }

        match segments.last_mut() {
            Some(last) if last.has_archive == has_archive && last.end == clipped_start => {
                last.end = bucket_end;
                last.end_px = pixel_at_time(visible, axis, bucket_end);
            }
            _ => segments.push(AvailabilitySegment {
                start: clipped_start,
                end: bucket_end,
                has_archive,
                start_px: pixel_at_time(visible, axis, clipped_start),
                end_px: pixel_at_time(visible, axis, bucket_end),
            }),
        }
    }

    segments
}
