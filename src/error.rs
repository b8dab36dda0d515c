use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type TimelineResult<T> = Result<T, TimelineError>;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid time range: start={start_ms}ms, end={end_ms}ms")]
    InvalidRange { start_ms: i64, end_ms: i64 },

    #[error("invalid axis length: {length_px}px")]
    InvalidAxis { length_px: f64 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("timeline driver has stopped")]
    DriverStopped,
}

/// Failures reported by the external clock and archive collaborators.
///
/// These never escape the controller: they are folded into
/// [`crate::api::ErrorState`] so the renderer can display them.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ServiceError {
    #[error("server does not support archive queries")]
    ArchiveUnsupported,

    #[error("user has no permission to browse the archive")]
    PermissionDenied,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("server error: {0}")]
    Server(String),
}
