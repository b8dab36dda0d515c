//! Collaborator ports the driver calls out to.
//!
//! Transport, authentication and response parsing live in the host's
//! implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::api::StreamSelector;
use crate::core::{AvailabilityVector, TimeRange};
use crate::error::ServiceError;

/// Authoritative "now" of the recorder.
#[async_trait]
pub trait ServerClock: Send + Sync {
    async fn server_time(&self) -> Result<DateTime<Utc>, ServiceError>;
}

/// Archive availability query.
#[async_trait]
pub trait ArchiveAvailabilityClient: Send + Sync {
    /// One presence flag per `unit_length_secs` bucket, aligned to
    /// `range.start()`.
    async fn fetch_availability(
        &self,
        range: TimeRange,
        unit_length_secs: u32,
        stream: StreamSelector,
    ) -> Result<AvailabilityVector, ServiceError>;
}
