use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::core::{TimeRange, time_at_pixel};
use crate::extensions::TimelineEvent;
use crate::interaction::ZoomStep;

use super::{ControllerPhase, IntervalStep, PlaybackMode, TimeWindowController};

impl TimeWindowController {
    /// Replaces the visible window directly.
    ///
    /// Ignored until the controller is ready. Coverage is re-checked
    /// normally, so small moves inside the buffer do not refetch.
    pub fn set_visible(&mut self, range: TimeRange) {
        if !self.is_navigable() {
            trace!("set_visible ignored before initialization");
            return;
        }
        self.replace_visible_range(range);
        self.schedule_fetch();
    }

    /// Switches zoom level, recentered on the midpoint of the current window.
    ///
    /// Out-of-range indices are clamped. The buffered availability is
    /// dropped because it was bucketed for the previous unit length.
    pub fn set_zoom(&mut self, index: usize) {
        let index = self.config.zoom_table.clamp_index(index);
        if index == self.zoom_index {
            return;
        }
        let center = self.visible_range.map(TimeRange::midpoint);
        debug!(from = self.zoom_index, to = index, "zoom level changed");

        self.zoom_index = index;
        self.buffered = None;
        self.drop_in_flight_fetch();
        self.live_sync.reset_bucket();
        self.emit(TimelineEvent::ZoomChanged { index });

        let Some(center) = center else {
            return;
        };
        if let Ok(range) = TimeRange::centered_on(center, self.zoom_duration_ms()) {
            self.replace_visible_range(range);
        }
        self.run_live_sync();
        self.schedule_fetch();
    }

    pub fn zoom_in(&mut self) {
        self.step_zoom(ZoomStep::In);
    }

    pub fn zoom_out(&mut self) {
        self.step_zoom(ZoomStep::Out);
    }

    pub(super) fn step_zoom(&mut self, step: ZoomStep) {
        let index = match step {
            ZoomStep::In => self.zoom_index.saturating_sub(1),
            ZoomStep::Out => self.zoom_index.saturating_add(1),
        };
        self.set_zoom(index);
    }

    /// Seeks the archive: recenters on `at` and freezes the mode there.
    ///
    /// Ignored while archive browsing is restricted.
    pub fn select_time(&mut self, at: DateTime<Utc>) {
        if !self.is_navigable() {
            trace!("select_time ignored before initialization");
            return;
        }
        if self.is_archive_restricted() {
            debug!(%at, "archive restricted, ignoring time selection");
            return;
        }
        let Ok(range) = TimeRange::centered_on(at, self.zoom_duration_ms()) else {
            return;
        };
        debug!(%at, "archive time selected");
        self.replace_mode(PlaybackMode::Archive { at });
        self.replace_visible_range(range);
        self.emit_time_selected(at);
        self.schedule_fetch();
    }

    /// Seeks to the instant under `coord_px` on the scrub axis.
    pub(super) fn select_time_at_pixel(&mut self, coord_px: f64) {
        let Some(visible) = self.visible_range else {
            return;
        };
        let coord = self.axis.clamp_coord(coord_px);
        self.select_time(time_at_pixel(visible, self.axis, coord));
    }

    /// Returns to the live feed, centered on the latest server time.
    ///
    /// Clears any error state, including archive restrictions.
    pub fn go_live(&mut self) {
        debug!(phase = ?self.phase, "go live");
        self.replace_error(None);
        if self.phase != ControllerPhase::Ready {
            return;
        }
        self.replace_mode(PlaybackMode::Live);
        if let Some(server_time) = self.server_time {
            if let Ok(range) = TimeRange::centered_on(server_time, self.zoom_duration_ms()) {
                self.replace_visible_range(range);
            }
        }
        if self.visible {
            self.request_server_time();
        }
        self.run_live_sync();
        self.schedule_fetch();
    }

    /// Moves the window by one full zoom duration and refetches.
    pub fn step_interval(&mut self, step: IntervalStep) {
        let Some(visible) = self.visible_range.filter(|_| self.is_navigable()) else {
            return;
        };
        let duration = self.zoom_duration_ms() as f64;
        let delta = match step {
            IntervalStep::Previous => -duration,
            IntervalStep::Next => duration,
        };
        self.buffered = None;
        self.replace_visible_range(visible.shifted_by_millis(delta));
        self.schedule_fetch();
    }

    /// Recenters on the reference instant (live time or selected archive time).
    pub fn center_on_reference(&mut self) {
        if !self.is_navigable() {
            return;
        }
        let Some(reference) = self.reference_time() else {
            return;
        };
        let Ok(range) = TimeRange::centered_on(reference, self.zoom_duration_ms()) else {
            return;
        };
        self.buffered = None;
        self.live_sync.reset_bucket();
        self.replace_visible_range(range);
        self.schedule_fetch();
    }

    fn is_navigable(&self) -> bool {
        self.phase == ControllerPhase::Ready && self.visible_range.is_some()
    }
}
