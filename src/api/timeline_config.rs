use serde::{Deserialize, Serialize};

use crate::core::{AxisLength, Orientation, ZoomTable};
use crate::error::{TimelineError, TimelineResult};
use crate::interaction::GestureConfig;

/// Prefetch and refresh thresholds used by the buffer manager.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BufferPolicy {
    /// Padding on each side of the visible range, in visible durations.
    pub margin_multiplier: f64,
    /// Live mode refetches when the new padded request overlaps less than
    /// this share of the buffered duration.
    pub live_min_overlap_ratio: f64,
    /// Live mode refetches when server time is this close (as a share of the
    /// buffered duration) to either buffered edge.
    pub live_edge_refresh_ratio: f64,
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self {
            margin_multiplier: 2.0,
            live_min_overlap_ratio: 0.8,
            live_edge_refresh_ratio: 0.2,
        }
    }
}

/// Live clock polling and auto-recenter tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveSyncPolicy {
    pub tick_interval_ms: u64,
    /// Auto-recenter stays off for this long after any gesture.
    pub interaction_cooldown_ms: i64,
}

impl Default for LiveSyncPolicy {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            interaction_cooldown_ms: 800,
        }
    }
}

/// Which recorded stream availability is queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamSelector {
    #[default]
    Video,
    Audio,
}

impl StreamSelector {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub orientation: Orientation,
    pub axis_length_px: f64,
    pub zoom_table: ZoomTable,
    pub initial_zoom_index: usize,
    #[serde(default)]
    pub buffer: BufferPolicy,
    #[serde(default)]
    pub live_sync: LiveSyncPolicy,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub stream: StreamSelector,
}

impl TimelineConfig {
    #[must_use]
    pub fn new(axis_length_px: f64) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            axis_length_px,
            zoom_table: ZoomTable::default(),
            initial_zoom_index: ZoomTable::DEFAULT_INDEX,
            buffer: BufferPolicy::default(),
            live_sync: LiveSyncPolicy::default(),
            gesture: GestureConfig::default(),
            stream: StreamSelector::default(),
        }
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn with_zoom_table(mut self, zoom_table: ZoomTable) -> Self {
        self.zoom_table = zoom_table;
        self
    }

    #[must_use]
    pub fn with_initial_zoom_index(mut self, index: usize) -> Self {
        self.initial_zoom_index = index;
        self
    }

    #[must_use]
    pub fn with_buffer_policy(mut self, policy: BufferPolicy) -> Self {
        self.buffer = policy;
        self
    }

    #[must_use]
    pub fn with_live_sync_policy(mut self, policy: LiveSyncPolicy) -> Self {
        self.live_sync = policy;
        self
    }

    #[must_use]
    pub fn with_gesture_config(mut self, config: GestureConfig) -> Self {
        self.gesture = config;
        self
    }

    #[must_use]
    pub fn with_stream(mut self, stream: StreamSelector) -> Self {
        self.stream = stream;
        self
    }

    pub fn validate(&self) -> TimelineResult<()> {
        AxisLength::new(self.axis_length_px)?;
        validate_buffer_policy(self.buffer)?;
        validate_live_sync_policy(self.live_sync)?;
        self.gesture.validate()?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> TimelineResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TimelineError::InvalidConfig(format!("failed to serialize config: {e}")))
    }

    pub fn from_json_str(input: &str) -> TimelineResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| TimelineError::InvalidConfig(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

pub(super) fn validate_buffer_policy(policy: BufferPolicy) -> TimelineResult<BufferPolicy> {
    if !policy.margin_multiplier.is_finite() || policy.margin_multiplier < 0.0 {
        return Err(TimelineError::InvalidConfig(
            "buffer margin multiplier must be finite and >= 0".to_owned(),
        ));
    }
    if !(0.0..=1.0).contains(&policy.live_min_overlap_ratio) {
        return Err(TimelineError::InvalidConfig(
            "live min overlap ratio must be within [0, 1]".to_owned(),
        ));
    }
    if !(0.0..0.5).contains(&policy.live_edge_refresh_ratio) {
        return Err(TimelineError::InvalidConfig(
            "live edge refresh ratio must be within [0, 0.5)".to_owned(),
        ));
    }
    Ok(policy)
}

pub(super) fn validate_live_sync_policy(policy: LiveSyncPolicy) -> TimelineResult<LiveSyncPolicy> {
    if policy.tick_interval_ms == 0 {
        return Err(TimelineError::InvalidConfig(
            "live tick interval must be > 0".to_owned(),
        ));
    }
    if policy.interaction_cooldown_ms < 0 {
        return Err(TimelineError::InvalidConfig(
            "interaction cooldown must be >= 0".to_owned(),
        ));
    }
    Ok(policy)
}
