use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::TimeRange;
use crate::error::ServiceError;

use super::StreamSelector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackMode {
    Live,
    Archive { at: DateTime<Utc> },
}

impl PlaybackMode {
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }

    #[must_use]
    pub(crate) fn tag(self) -> ModeTag {
        match self {
            Self::Live => ModeTag::Live,
            Self::Archive { .. } => ModeTag::Archive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeTag {
    Live,
    Archive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerPhase {
    Uninitialized,
    /// Waiting for the first server time.
    Initializing,
    Ready,
}

/// Error sub-state surfaced to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorState {
    /// Sticky per server: only live viewing is possible.
    ArchiveUnsupported,
    /// Sticky per session: the user may not browse the archive.
    PermissionDenied,
    /// Transient; retried on the next tick or fetch trigger.
    Connection(String),
    /// Reported verbatim; retried only through an explicit retry.
    Server(String),
}

impl ErrorState {
    #[must_use]
    pub fn is_archive_restricted(&self) -> bool {
        matches!(self, Self::ArchiveUnsupported | Self::PermissionDenied)
    }

    /// Whether automatic fetch triggers may retry past this error.
    #[must_use]
    pub fn allows_automatic_retry(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::ArchiveUnsupported => {
                "Archive is not available on this server. Only live view is available.".to_owned()
            }
            Self::PermissionDenied => {
                "Insufficient permissions to view the archive. Only live mode is available."
                    .to_owned()
            }
            Self::Connection(_) => "Server connection error".to_owned(),
            Self::Server(message) => message.clone(),
        }
    }
}

impl From<ServiceError> for ErrorState {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::ArchiveUnsupported => Self::ArchiveUnsupported,
            ServiceError::PermissionDenied => Self::PermissionDenied,
            ServiceError::Connection(message) => Self::Connection(message),
            ServiceError::Server(message) => Self::Server(message),
        }
    }
}

/// Relevance key attached to every fetch. A result is applied only while the
/// controller still has the same generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchGeneration {
    pub zoom_index: usize,
    pub mode: ModeTag,
    /// Bumped whenever the timeline is hidden, so results issued before a
    /// hide never land after it.
    pub visibility_epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchTicket {
    pub generation: FetchGeneration,
    /// Monotonic issue order across all fetches of one controller.
    pub sequence: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    /// Padded range the availability vector must be aligned to.
    pub range: TimeRange,
    pub unit_length_secs: u32,
    pub stream: StreamSelector,
}

/// Work the host must perform on behalf of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineRequest {
    ServerTime,
    Availability(FetchRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntervalStep {
    Previous,
    Next,
}
