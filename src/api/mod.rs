//! Timeline controller and its policies.
//!
//! `TimeWindowController` is split across several files that each add one
//! `impl` block: lifecycle (visibility and server clock), navigation,
//! gestures and fetch bookkeeping.

mod buffer_manager;
mod controller;
mod fetch_coordinator;
mod gesture_coordinator;
mod lifecycle_controller;
mod live_clock;
mod local_clock;
mod navigation_controller;
mod playback;
mod timeline_config;
mod timeline_snapshot;
mod timeline_state;

pub use buffer_manager::{BufferManager, FetchDecision, FetchReason, needs_fetch, padded_request};
pub use controller::TimeWindowController;
pub use fetch_coordinator::FetchApplication;
pub use live_clock::{LiveClockSync, RecenterDecision, RecenterGuard, auto_center_bucket};
pub use local_clock::{LocalClock, ManualClock, SystemClock};
pub use playback::PlaybackUriBuilder;
pub use timeline_config::{BufferPolicy, LiveSyncPolicy, StreamSelector, TimelineConfig};
pub use timeline_snapshot::{
    TIMELINE_SNAPSHOT_JSON_SCHEMA_V1, TimelineSnapshot, TimelineSnapshotJsonContractV1,
};
pub use timeline_state::{
    ControllerPhase, ErrorState, FetchGeneration, FetchRequest, FetchTicket, IntervalStep,
    ModeTag, PlaybackMode, TimelineRequest,
};
