use tracing::trace;

use crate::core::pan_delta_millis;
use crate::interaction::{GestureKind, GestureOutcome, PointerEvent};

use super::{ControllerPhase, TimeWindowController};

impl TimeWindowController {
    /// Feeds one pointer sample through the gesture arbiter and applies the
    /// resulting tap, scrub or zoom step.
    ///
    /// Every gesture is a no-op while the timeline is hidden, not yet
    /// initialized, or archive-restricted.
    pub fn on_gesture(&mut self, event: PointerEvent) -> GestureOutcome {
        if !self.visible || self.phase != ControllerPhase::Ready {
            return GestureOutcome::None;
        }
        if self.is_archive_restricted() {
            trace!("gesture ignored while archive restricted");
            return GestureOutcome::None;
        }

        let now = self.clock.now();
        let outcome = self.gestures.handle(event, now);
        match outcome {
            GestureOutcome::None => {}
            GestureOutcome::Pressed | GestureOutcome::ZoomPanStarted => {
                self.live_sync.mark_interaction(now);
            }
            GestureOutcome::Tap { coord_px } => {
                self.live_sync.mark_interaction(now);
                self.select_time_at_pixel(coord_px);
            }
            GestureOutcome::ScrubStarted { delta_px } => {
                self.live_sync.mark_interaction(now);
                self.scrub_origin = self.visible_range;
                self.apply_scrub(delta_px);
            }
            GestureOutcome::ScrubMoved { delta_px } => self.apply_scrub(delta_px),
            GestureOutcome::ScrubEnded { delta_px } => {
                if self.scrub_origin.is_none() {
                    self.scrub_origin = self.visible_range;
                }
                self.apply_scrub(delta_px);
                self.scrub_origin = None;
                self.live_sync.mark_interaction(now);
                self.schedule_fetch();
            }
            GestureOutcome::ZoomStepped(step) => {
                self.live_sync.mark_interaction(now);
                self.step_zoom(step);
            }
            GestureOutcome::ZoomPanEnded => self.live_sync.mark_interaction(now),
            GestureOutcome::Cancelled { kind } => {
                self.live_sync.mark_interaction(now);
                if kind == Some(GestureKind::ScrubPan) {
                    if let Some(origin) = self.scrub_origin.take() {
                        self.replace_visible_range(origin);
                    }
                    self.schedule_fetch();
                }
            }
        }
        outcome
    }

    /// Translates the pan-start snapshot by the cumulative drag distance.
    fn apply_scrub(&mut self, delta_px: f64) {
        let Some(origin) = self.scrub_origin else {
            return;
        };
        let delta_ms = pan_delta_millis(delta_px, self.axis, origin.duration_ms());
        self.replace_visible_range(origin.shifted_by_millis(delta_ms));
    }
}
