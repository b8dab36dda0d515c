//! Tokio driver that owns a controller and talks to the collaborators.

mod driver;
mod ports;

pub use driver::{DriverCommand, TimelineDriver, TimelineHandle};
pub use ports::{ArchiveAvailabilityClient, ServerClock};
