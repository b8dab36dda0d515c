use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

use crate::core::TimeRange;
use crate::error::ServiceError;
use crate::extensions::TimelineEvent;

use super::{
    ControllerPhase, ErrorState, PlaybackMode, RecenterDecision, TimeWindowController,
    TimelineRequest,
};

impl TimeWindowController {
    /// Mounts or unmounts the timeline.
    ///
    /// Becoming visible for the first time starts initialization. Hiding
    /// discards gesture, cooldown and auto-center state, drops queued work
    /// and invalidates every outstanding request.
    pub fn set_visibility(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        self.live_sync.reset();

        if !visible {
            self.visibility_epoch += 1;
            self.gestures.reset();
            self.scrub_origin = None;
            self.requests.clear();
            self.clock_request_pending = false;
            self.drop_in_flight_fetch();
            debug!(epoch = self.visibility_epoch, "timeline hidden");
            return;
        }

        debug!(phase = ?self.phase, "timeline shown");
        match self.phase {
            ControllerPhase::Uninitialized => {
                self.phase = ControllerPhase::Initializing;
                self.request_server_time();
            }
            ControllerPhase::Initializing => {
                self.request_server_time();
            }
            ControllerPhase::Ready => {
                if self.mode.is_live() {
                    self.request_server_time();
                }
                self.run_live_sync();
                self.schedule_fetch();
            }
        }
    }

    /// Periodic clock hook, called by the host once per tick interval.
    ///
    /// Queues a server-time request while initializing, or while live and
    /// visible. Returns whether a request was queued.
    pub fn poll_clock(&mut self) -> bool {
        if !self.visible {
            return false;
        }
        let wants_clock = match self.phase {
            ControllerPhase::Uninitialized => false,
            ControllerPhase::Initializing => true,
            ControllerPhase::Ready => self.mode.is_live(),
        };
        wants_clock && self.request_server_time()
    }

    /// Applies a server-time query result.
    ///
    /// The first success completes initialization. Later successes advance
    /// the live clock and run auto-recentering. Failures never change mode.
    pub fn on_tick(&mut self, server_time: Result<DateTime<Utc>, ServiceError>) {
        self.clock_request_pending = false;
        if !self.visible {
            trace!("ignoring server time for hidden timeline");
            return;
        }

        let server_time = match server_time {
            Ok(time) => time,
            Err(err) => {
                warn!(error = %err, phase = ?self.phase, "server time query failed");
                if self.phase == ControllerPhase::Initializing {
                    self.replace_error(Some(ErrorState::from(err)));
                }
                return;
            }
        };
        self.server_time = Some(server_time);

        match self.phase {
            ControllerPhase::Uninitialized => {}
            ControllerPhase::Initializing => self.complete_initialization(server_time),
            ControllerPhase::Ready => {
                if !self.mode.is_live() {
                    return;
                }
                self.run_live_sync();
                self.maybe_refresh_live_edge(server_time);
                self.schedule_fetch();
            }
        }
    }

    fn complete_initialization(&mut self, server_time: DateTime<Utc>) {
        let range = match TimeRange::centered_on(server_time, self.zoom_duration_ms()) {
            Ok(range) => range,
            Err(err) => {
                warn!(error = %err, "cannot center timeline on server time");
                return;
            }
        };
        debug!(%server_time, zoom_index = self.zoom_index, "timeline initialized");
        self.phase = ControllerPhase::Ready;
        if matches!(self.error, Some(ErrorState::Connection(_))) {
            self.replace_error(None);
        }
        self.replace_mode(PlaybackMode::Live);
        self.replace_visible_range(range);
        self.run_live_sync();
        self.schedule_fetch();
    }

    /// Auto-recenter pass for live mode.
    pub(super) fn run_live_sync(&mut self) {
        if !self.visible || self.phase != ControllerPhase::Ready || !self.mode.is_live() {
            return;
        }
        let Some(reference) = self.server_time else {
            return;
        };

        let decision = self.live_sync.evaluate(
            self.clock.now(),
            reference,
            self.zoom_level().unit_length_ms(),
            self.gestures.in_progress(),
        );
        match decision {
            RecenterDecision::Skip(guard) => trace!(?guard, "auto-recenter skipped"),
            RecenterDecision::Recenter { center, bucket } => {
                let Ok(range) = TimeRange::centered_on(center, self.zoom_duration_ms()) else {
                    return;
                };
                self.live_sync.commit(bucket);
                if self.replace_visible_range(range) {
                    trace!(bucket, "auto-recentered on live time");
                }
            }
        }
    }

    fn maybe_refresh_live_edge(&mut self, server_time: DateTime<Utc>) {
        if !self.can_auto_fetch() {
            return;
        }
        let Some(visible) = self.visible_range else {
            return;
        };
        let decision = self
            .buffer_manager
            .edge_refresh(server_time, visible, self.buffered.as_ref());
        if let super::FetchDecision::Fetch(reason) = decision {
            self.issue_fetch(reason);
        }
    }

    /// Queues a server-time request unless one is already outstanding.
    pub(super) fn request_server_time(&mut self) -> bool {
        if self.clock_request_pending {
            return false;
        }
        self.clock_request_pending = true;
        self.requests.push_back(TimelineRequest::ServerTime);
        true
    }

    pub(super) fn emit_time_selected(&mut self, at: DateTime<Utc>) {
        self.emit(TimelineEvent::TimeSelected { at });
    }
}
