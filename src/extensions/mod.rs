//! Host-facing hooks that sit outside the controller's core state.

pub mod observers;

pub use observers::{TimelineContext, TimelineEvent, TimelineObserver};
