//! timeline-rs: time-window and buffer controller for recorder timelines.
//!
//! The crate keeps a visible window, a prefetched availability buffer, a
//! zoom level and a live/archive playback mode consistent while a live
//! clock ticks, gestures arrive and availability fetches race each other.
//! The controller itself is synchronous; the optional `runtime` feature
//! drives it from a tokio task.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod telemetry;

#[cfg(feature = "runtime")]
pub mod runtime;

pub use api::{TimeWindowController, TimelineConfig, TimelineSnapshot};
pub use error::{ServiceError, TimelineError, TimelineResult};
