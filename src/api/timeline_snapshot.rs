use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{
    AvailabilitySegments, AvailabilityVector, AxisLength, BufferedRange, TimeLabel, TimeRange,
    ZoomLevel, project_availability, time_labels,
};
use crate::error::{TimelineError, TimelineResult};

use super::{ControllerPhase, ErrorState, PlaybackMode, TimeWindowController};

pub const TIMELINE_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

/// Everything a renderer needs to draw one frame of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    pub phase: ControllerPhase,
    pub visible_range: Option<TimeRange>,
    pub buffered_range: Option<TimeRange>,
    pub zoom_index: usize,
    pub zoom: ZoomLevel,
    pub mode: PlaybackMode,
    pub availability: AvailabilityVector,
    pub axis_length_px: f64,
    pub error_state: Option<ErrorState>,
    pub loading: bool,
    pub server_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: TimelineSnapshot,
}

impl TimelineSnapshot {
    /// Error text for the overlay, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error_state.as_ref().map(ErrorState::message)
    }

    #[must_use]
    pub fn is_archive_restricted(&self) -> bool {
        self.error_state
            .as_ref()
            .is_some_and(ErrorState::is_archive_restricted)
    }

    /// Visible availability runs with pixel extents.
    ///
    /// Empty before initialization or when nothing is buffered.
    #[must_use]
    pub fn availability_segments(&self) -> AvailabilitySegments {
        let (Some(visible), Some(buffered), Ok(axis)) = (
            self.visible_range,
            self.buffered_range,
            AxisLength::new(self.axis_length_px),
        ) else {
            return AvailabilitySegments::new();
        };
        let buffered = BufferedRange {
            range: buffered,
            availability: self.availability.clone(),
            zoom_index: self.zoom_index,
            unit_length_secs: self.zoom.unit_length_secs,
        };
        project_availability(&buffered, visible, axis)
    }

    /// Axis labels for the visible window, rendered in `offset`.
    #[must_use]
    pub fn time_labels(&self, offset: FixedOffset) -> Vec<TimeLabel> {
        let (Some(visible), Ok(axis)) = (self.visible_range, AxisLength::new(self.axis_length_px))
        else {
            return Vec::new();
        };
        time_labels(visible, axis, offset)
    }

    pub fn to_json_contract_v1_pretty(&self) -> TimelineResult<String> {
        let payload = TimelineSnapshotJsonContractV1 {
            schema_version: TIMELINE_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            TimelineError::InvalidData(format!("failed to serialize timeline snapshot v1: {e}"))
        })
    }

    /// Accepts either a bare snapshot or a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> TimelineResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<TimelineSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: TimelineSnapshotJsonContractV1 =
            serde_json::from_str(input).map_err(|e| {
                TimelineError::InvalidData(format!("failed to parse timeline snapshot json: {e}"))
            })?;
        if payload.schema_version != TIMELINE_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(TimelineError::InvalidData(format!(
                "unsupported timeline snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}

impl TimeWindowController {
    #[must_use]
    pub fn snapshot(&self) -> TimelineSnapshot {
        let (buffered_range, availability) = match &self.buffered {
            Some(buffered) => (Some(buffered.range), buffered.availability.clone()),
            None => (None, AvailabilityVector::default()),
        };
        TimelineSnapshot {
            phase: self.phase,
            visible_range: self.visible_range,
            buffered_range,
            zoom_index: self.zoom_index,
            zoom: self.zoom_level().clone(),
            mode: self.mode,
            availability,
            axis_length_px: self.axis.px(),
            error_state: self.error.clone(),
            loading: self.is_loading(),
            server_time: self.server_time,
        }
    }

    pub fn snapshot_json_contract_v1_pretty(&self) -> TimelineResult<String> {
        self.snapshot().to_json_contract_v1_pretty()
    }
}
