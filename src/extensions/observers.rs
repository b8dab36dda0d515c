use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ControllerPhase, ErrorState, PlaybackMode};
use crate::core::TimeRange;

/// Read-only state passed along with every event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineContext {
    pub phase: ControllerPhase,
    pub visible_range: Option<TimeRange>,
    pub zoom_index: usize,
    pub mode: PlaybackMode,
    pub archive_restricted: bool,
    pub loading: bool,
}

/// Notifications fired after each accepted state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimelineEvent {
    TimeSelected { at: DateTime<Utc> },
    VisibleRangeChanged { range: TimeRange },
    ModeChanged { mode: PlaybackMode },
    ZoomChanged { index: usize },
    AvailabilityUpdated { range: TimeRange, buckets: usize },
    ErrorStateChanged { error: Option<ErrorState> },
}

/// Hook interface for hosts (video player glue, analytics, tests).
///
/// Observers see events and context but cannot mutate the controller.
pub trait TimelineObserver: Send {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &TimelineEvent, context: TimelineContext);
}
