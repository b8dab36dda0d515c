use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{AvailabilityVector, BufferedRange};
use crate::error::ServiceError;
use crate::extensions::TimelineEvent;
use crate::interaction::InteractionMode;

use super::{
    ControllerPhase, ErrorState, FetchDecision, FetchReason, FetchRequest, FetchTicket,
    TimeWindowController, TimelineRequest,
};

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchApplication {
    Applied,
    /// Zoom level, mode or visibility changed since the fetch was issued.
    DiscardedStale,
    /// A newer fetch has already been applied.
    DiscardedSuperseded,
    Failed,
}

impl TimeWindowController {
    /// Applies an availability result if it is still relevant.
    ///
    /// Failures are converted into the error sub-state and never propagate.
    pub fn on_fetch_complete(
        &mut self,
        request: FetchRequest,
        result: Result<AvailabilityVector, ServiceError>,
    ) -> FetchApplication {
        let ticket = request.ticket;
        if self.in_flight_fetch.map(|f| f.ticket) == Some(ticket) {
            self.in_flight_fetch = None;
        }

        if !self.visible || ticket.generation != self.current_generation() {
            debug!(
                sequence = ticket.sequence,
                issued = ?ticket.generation,
                current = ?self.current_generation(),
                "discarding stale availability result"
            );
            return FetchApplication::DiscardedStale;
        }
        if self
            .last_applied_sequence
            .is_some_and(|applied| applied >= ticket.sequence)
        {
            debug!(sequence = ticket.sequence, "discarding superseded availability result");
            return FetchApplication::DiscardedSuperseded;
        }

        match result {
            Ok(availability) => {
                let buckets = availability.len();
                self.buffered = Some(BufferedRange {
                    range: request.range,
                    availability,
                    zoom_index: ticket.generation.zoom_index,
                    unit_length_secs: request.unit_length_secs,
                });
                self.last_applied_sequence = Some(ticket.sequence);
                debug!(sequence = ticket.sequence, buckets, "availability applied");
                self.replace_error(None);
                self.emit(TimelineEvent::AvailabilityUpdated {
                    range: request.range,
                    buckets,
                });
                // The window may have moved while the request was in flight.
                self.schedule_fetch();
                FetchApplication::Applied
            }
            Err(err) => {
                warn!(error = %err, sequence = ticket.sequence, "availability fetch failed");
                let error = ErrorState::from(err);
                if error.is_archive_restricted() {
                    self.buffered = None;
                    self.gestures.reset();
                    self.scrub_origin = None;
                }
                self.replace_error(Some(error));
                FetchApplication::Failed
            }
        }
    }

    /// Explicit user retry: clears the error and refetches unconditionally.
    ///
    /// While initializing this re-queues the server-time query instead.
    pub fn retry(&mut self) {
        match self.phase {
            ControllerPhase::Uninitialized => {}
            ControllerPhase::Initializing => {
                if self.visible {
                    self.request_server_time();
                }
            }
            ControllerPhase::Ready => {
                self.replace_error(None);
                self.drop_in_flight_fetch();
                self.issue_fetch(FetchReason::Retry);
            }
        }
    }

    /// Gate shared by every fetch the controller issues on its own.
    ///
    /// Requires a visible, initialized timeline with no scrub in progress
    /// and no error that waits for an explicit `retry()`.
    pub(super) fn can_auto_fetch(&self) -> bool {
        if !self.visible || self.phase != ControllerPhase::Ready {
            return false;
        }
        if self.gestures.mode() == InteractionMode::Scrubbing {
            return false;
        }
        if self
            .error
            .as_ref()
            .is_some_and(|error| !error.allows_automatic_retry())
        {
            trace!("automatic fetch suppressed by error state");
            return false;
        }
        true
    }

    /// Runs the coverage check and queues a fetch when it fails.
    pub(super) fn schedule_fetch(&mut self) {
        if !self.can_auto_fetch() {
            return;
        }
        let Some(visible) = self.visible_range else {
            return;
        };

        let decision =
            self.buffer_manager
                .decide(visible, self.buffered.as_ref(), self.zoom_index, self.mode);
        if let FetchDecision::Fetch(reason) = decision {
            self.issue_fetch(reason);
        }
    }

    pub(super) fn issue_fetch(&mut self, reason: FetchReason) {
        if !self.visible || self.phase != ControllerPhase::Ready {
            return;
        }
        let Some(visible) = self.visible_range else {
            return;
        };
        let padded = self.buffer_manager.padded_request(visible);
        let generation = self.current_generation();

        if let Some(in_flight) = self.in_flight_fetch {
            if in_flight.ticket.generation == generation && in_flight.range.contains_range(padded) {
                trace!(?reason, "in-flight fetch already covers request");
                return;
            }
        }

        let request = FetchRequest {
            ticket: FetchTicket {
                generation,
                sequence: self.next_sequence,
            },
            range: padded,
            unit_length_secs: self.zoom_level().unit_length_secs,
            stream: self.config.stream,
        };
        self.next_sequence += 1;
        debug!(
            ?reason,
            sequence = request.ticket.sequence,
            start = %padded.start(),
            end = %padded.end(),
            unit_length_secs = request.unit_length_secs,
            "issuing availability fetch"
        );
        self.in_flight_fetch = Some(request);
        self.requests.push_back(TimelineRequest::Availability(request));
    }
}
