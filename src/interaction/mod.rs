//! Pointer gesture classification.
//!
//! One pointer interaction resolves to at most one of tap, scrub pan or
//! zoom pan. The arbiter is a pure state machine: callers feed pointer
//! samples plus the current instant and apply the returned outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Orientation;
use crate::core::primitives::millis_between;
use crate::error::{TimelineError, TimelineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionMode {
    Idle,
    /// Pointer is down and has not left the movement slop yet.
    Pressed,
    Scrubbing,
    ZoomPanning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Raw pointer sample in timeline-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    #[must_use]
    pub fn down(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Down,
            x,
            y,
        }
    }

    #[must_use]
    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Move,
            x,
            y,
        }
    }

    #[must_use]
    pub fn up(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Up,
            x,
            y,
        }
    }

    #[must_use]
    pub fn cancel() -> Self {
        Self {
            phase: PointerPhase::Cancel,
            x: 0.0,
            y: 0.0,
        }
    }
}

/// Timing and distance thresholds for gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// A press released within this window (and within the slop) is a tap.
    pub tap_max_duration_ms: i64,
    /// Movement beyond this distance on either axis classifies a pan.
    pub movement_slop_px: f64,
    /// Perpendicular release displacement needed to step the zoom level.
    pub zoom_step_threshold_px: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_max_duration_ms: 250,
            movement_slop_px: 10.0,
            zoom_step_threshold_px: 30.0,
        }
    }
}

impl GestureConfig {
    pub(crate) fn validate(self) -> TimelineResult<Self> {
        if self.tap_max_duration_ms <= 0 {
            return Err(TimelineError::InvalidConfig(
                "tap max duration must be > 0".to_owned(),
            ));
        }
        if !self.movement_slop_px.is_finite() || self.movement_slop_px < 0.0 {
            return Err(TimelineError::InvalidConfig(
                "movement slop must be finite and >= 0".to_owned(),
            ));
        }
        if !self.zoom_step_threshold_px.is_finite()
            || self.zoom_step_threshold_px < self.movement_slop_px
        {
            return Err(TimelineError::InvalidConfig(
                "zoom step threshold must be finite and >= movement slop".to_owned(),
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureKind {
    Tap,
    ScrubPan,
    ZoomPan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomStep {
    /// Towards shorter visible durations (lower index).
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureOutcome {
    None,
    Pressed,
    Tap { coord_px: f64 },
    /// `delta_px` is always cumulative from the press origin.
    ScrubStarted { delta_px: f64 },
    ScrubMoved { delta_px: f64 },
    ScrubEnded { delta_px: f64 },
    ZoomPanStarted,
    ZoomStepped(ZoomStep),
    /// Perpendicular pan released below the step threshold.
    ZoomPanEnded,
    Cancelled { kind: Option<GestureKind> },
}

impl GestureOutcome {
    #[must_use]
    pub fn kind(self) -> Option<GestureKind> {
        match self {
            Self::Tap { .. } => Some(GestureKind::Tap),
            Self::ScrubStarted { .. } | Self::ScrubMoved { .. } | Self::ScrubEnded { .. } => {
                Some(GestureKind::ScrubPan)
            }
            Self::ZoomPanStarted | Self::ZoomStepped(_) | Self::ZoomPanEnded => {
                Some(GestureKind::ZoomPan)
            }
            Self::None | Self::Pressed | Self::Cancelled { .. } => None,
        }
    }

    /// True for outcomes that end the interaction.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Tap { .. }
                | Self::ScrubEnded { .. }
                | Self::ZoomStepped(_)
                | Self::ZoomPanEnded
                | Self::Cancelled { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureArbiter {
    config: GestureConfig,
    orientation: Orientation,
    mode: InteractionMode,
    origin_x: f64,
    origin_y: f64,
    pressed_at: Option<DateTime<Utc>>,
}

impl GestureArbiter {
    #[must_use]
    pub fn new(config: GestureConfig, orientation: Orientation) -> Self {
        Self {
            config,
            orientation,
            mode: InteractionMode::Idle,
            origin_x: 0.0,
            origin_y: 0.0,
            pressed_at: None,
        }
    }

    #[must_use]
    pub fn mode(self) -> InteractionMode {
        self.mode
    }

    #[must_use]
    pub fn in_progress(self) -> bool {
        self.mode != InteractionMode::Idle
    }

    #[must_use]
    pub fn config(self) -> GestureConfig {
        self.config
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        self.reset();
    }

    /// Drops any in-flight interaction without producing an outcome.
    pub fn reset(&mut self) {
        self.mode = InteractionMode::Idle;
        self.pressed_at = None;
    }

    pub fn handle(&mut self, event: PointerEvent, now: DateTime<Utc>) -> GestureOutcome {
        if event.phase != PointerPhase::Cancel && (!event.x.is_finite() || !event.y.is_finite()) {
            return GestureOutcome::None;
        }

        match event.phase {
            PointerPhase::Down => self.on_down(event, now),
            PointerPhase::Move => self.on_move(event),
            PointerPhase::Up => self.on_up(event, now),
            PointerPhase::Cancel => self.on_cancel(),
        }
    }

    fn on_down(&mut self, event: PointerEvent, now: DateTime<Utc>) -> GestureOutcome {
        if self.mode != InteractionMode::Idle {
            // Extra pointers do not start a second interaction.
            return GestureOutcome::None;
        }
        self.mode = InteractionMode::Pressed;
        self.origin_x = event.x;
        self.origin_y = event.y;
        self.pressed_at = Some(now);
        GestureOutcome::Pressed
    }

    fn on_move(&mut self, event: PointerEvent) -> GestureOutcome {
        let (primary, perpendicular) = self.deltas(event);
        match self.mode {
            InteractionMode::Idle => GestureOutcome::None,
            InteractionMode::Pressed => match self.classify(primary, perpendicular) {
                Some(GestureKind::ScrubPan) => {
                    self.mode = InteractionMode::Scrubbing;
                    GestureOutcome::ScrubStarted { delta_px: primary }
                }
                Some(GestureKind::ZoomPan) => {
                    self.mode = InteractionMode::ZoomPanning;
                    GestureOutcome::ZoomPanStarted
                }
                Some(GestureKind::Tap) | None => GestureOutcome::None,
            },
            InteractionMode::Scrubbing => GestureOutcome::ScrubMoved { delta_px: primary },
            // Zoom pans are evaluated on release only.
            InteractionMode::ZoomPanning => GestureOutcome::None,
        }
    }

    fn on_up(&mut self, event: PointerEvent, now: DateTime<Utc>) -> GestureOutcome {
        let (primary, perpendicular) = self.deltas(event);
        let mode = self.mode;
        let pressed_at = self.pressed_at;
        self.reset();

        match mode {
            InteractionMode::Idle => GestureOutcome::None,
            InteractionMode::Pressed => match self.classify(primary, perpendicular) {
                Some(GestureKind::ScrubPan) => GestureOutcome::ScrubEnded { delta_px: primary },
                Some(GestureKind::ZoomPan) => self.resolve_zoom_release(perpendicular),
                Some(GestureKind::Tap) | None => {
                    let held_ms = pressed_at
                        .map(|at| millis_between(at, now))
                        .unwrap_or(i64::MAX);
                    if held_ms <= self.config.tap_max_duration_ms {
                        GestureOutcome::Tap {
                            coord_px: self.orientation.primary(event.x, event.y),
                        }
                    } else {
                        GestureOutcome::None
                    }
                }
            },
            InteractionMode::Scrubbing => GestureOutcome::ScrubEnded { delta_px: primary },
            InteractionMode::ZoomPanning => self.resolve_zoom_release(perpendicular),
        }
    }

    fn on_cancel(&mut self) -> GestureOutcome {
        let kind = match self.mode {
            InteractionMode::Idle => return GestureOutcome::None,
            InteractionMode::Pressed => None,
            InteractionMode::Scrubbing => Some(GestureKind::ScrubPan),
            InteractionMode::ZoomPanning => Some(GestureKind::ZoomPan),
        };
        self.reset();
        GestureOutcome::Cancelled { kind }
    }

    fn deltas(self, event: PointerEvent) -> (f64, f64) {
        let dx = event.x - self.origin_x;
        let dy = event.y - self.origin_y;
        (
            self.orientation.primary(dx, dy),
            self.orientation.perpendicular(dx, dy),
        )
    }

    /// First axis past the slop wins; the dominant axis breaks same-sample ties.
    fn classify(self, primary: f64, perpendicular: f64) -> Option<GestureKind> {
        let slop = self.config.movement_slop_px;
        let primary_abs = primary.abs();
        let perpendicular_abs = perpendicular.abs();
        if primary_abs <= slop && perpendicular_abs <= slop {
            return None;
        }
        if primary_abs >= perpendicular_abs {
            Some(GestureKind::ScrubPan)
        } else {
            Some(GestureKind::ZoomPan)
        }
    }

    fn resolve_zoom_release(self, perpendicular: f64) -> GestureOutcome {
        if perpendicular.abs() < self.config.zoom_step_threshold_px {
            return GestureOutcome::ZoomPanEnded;
        }
        if perpendicular < 0.0 {
            GestureOutcome::ZoomStepped(ZoomStep::In)
        } else {
            GestureOutcome::ZoomStepped(ZoomStep::Out)
        }
    }
}
