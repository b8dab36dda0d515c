use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::debug;

use crate::core::{AxisLength, BufferedRange, TimeRange, ZoomLevel};
use crate::error::{TimelineError, TimelineResult};
use crate::extensions::{TimelineContext, TimelineEvent, TimelineObserver};
use crate::interaction::{GestureArbiter, InteractionMode};

use super::{
    BufferManager, ControllerPhase, ErrorState, FetchGeneration, FetchRequest, LiveClockSync,
    LocalClock, PlaybackMode, SystemClock, TimelineConfig, TimelineRequest,
};

/// Orchestrates the visible window, buffered availability, zoom level and
/// playback mode of one timeline.
///
/// The controller never suspends. Work that needs the network is queued as
/// [`TimelineRequest`]s; hosts drain them, perform the calls and feed results
/// back through [`TimeWindowController::on_tick`] and
/// [`TimeWindowController::on_fetch_complete`].
pub struct TimeWindowController {
    pub(super) config: TimelineConfig,
    pub(super) axis: AxisLength,
    pub(super) clock: Arc<dyn LocalClock>,
    pub(super) buffer_manager: BufferManager,
    pub(super) phase: ControllerPhase,
    pub(super) visible: bool,
    pub(super) visibility_epoch: u64,
    pub(super) visible_range: Option<TimeRange>,
    pub(super) buffered: Option<BufferedRange>,
    pub(super) zoom_index: usize,
    pub(super) mode: PlaybackMode,
    pub(super) error: Option<ErrorState>,
    pub(super) server_time: Option<DateTime<Utc>>,
    pub(super) gestures: GestureArbiter,
    pub(super) scrub_origin: Option<TimeRange>,
    pub(super) live_sync: LiveClockSync,
    pub(super) next_sequence: u64,
    pub(super) in_flight_fetch: Option<FetchRequest>,
    pub(super) last_applied_sequence: Option<u64>,
    pub(super) clock_request_pending: bool,
    pub(super) requests: VecDeque<TimelineRequest>,
    pub(super) observers: IndexMap<String, Box<dyn TimelineObserver>>,
}

impl TimeWindowController {
    pub fn new(config: TimelineConfig) -> TimelineResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: TimelineConfig, clock: Arc<dyn LocalClock>) -> TimelineResult<Self> {
        config.validate()?;
        let axis = AxisLength::new(config.axis_length_px)?;
        let zoom_index = config.zoom_table.clamp_index(config.initial_zoom_index);
        debug!(
            axis_length_px = axis.px(),
            zoom_index,
            levels = config.zoom_table.len(),
            "create timeline controller"
        );

        Ok(Self {
            axis,
            clock,
            buffer_manager: BufferManager::new(config.buffer),
            phase: ControllerPhase::Uninitialized,
            visible: false,
            visibility_epoch: 0,
            visible_range: None,
            buffered: None,
            zoom_index,
            mode: PlaybackMode::Live,
            error: None,
            server_time: None,
            gestures: GestureArbiter::new(config.gesture, config.orientation),
            scrub_origin: None,
            live_sync: LiveClockSync::new(config.live_sync),
            next_sequence: 0,
            in_flight_fetch: None,
            last_applied_sequence: None,
            clock_request_pending: false,
            requests: VecDeque::new(),
            observers: IndexMap::new(),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn visible_range(&self) -> Option<TimeRange> {
        self.visible_range
    }

    #[must_use]
    pub fn buffered(&self) -> Option<&BufferedRange> {
        self.buffered.as_ref()
    }

    #[must_use]
    pub fn zoom_index(&self) -> usize {
        self.zoom_index
    }

    #[must_use]
    pub fn zoom_level(&self) -> &ZoomLevel {
        self.config.zoom_table.level(self.zoom_index)
    }

    #[must_use]
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    #[must_use]
    pub fn error_state(&self) -> Option<&ErrorState> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn is_archive_restricted(&self) -> bool {
        self.error
            .as_ref()
            .is_some_and(ErrorState::is_archive_restricted)
    }

    #[must_use]
    pub fn server_time(&self) -> Option<DateTime<Utc>> {
        self.server_time
    }

    #[must_use]
    pub fn axis_length(&self) -> AxisLength {
        self.axis
    }

    #[must_use]
    pub fn interaction_mode(&self) -> InteractionMode {
        self.gestures.mode()
    }

    #[must_use]
    pub fn in_flight_fetch(&self) -> Option<FetchRequest> {
        self.in_flight_fetch
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight_fetch.is_some()
            || (self.phase == ControllerPhase::Initializing && self.clock_request_pending)
    }

    /// Instant the timeline cursor points at: server time when live, the
    /// selected instant otherwise.
    #[must_use]
    pub fn reference_time(&self) -> Option<DateTime<Utc>> {
        match self.mode {
            PlaybackMode::Live => self.server_time,
            PlaybackMode::Archive { at } => Some(at),
        }
    }

    /// Resizes the scrub axis (e.g. on rotation).
    pub fn set_axis_length(&mut self, length_px: f64) -> TimelineResult<()> {
        self.axis = AxisLength::new(length_px)?;
        self.config.axis_length_px = length_px;
        Ok(())
    }

    /// Takes all queued collaborator requests in issue order.
    pub fn drain_requests(&mut self) -> Vec<TimelineRequest> {
        self.requests.drain(..).collect()
    }

    pub fn add_observer(&mut self, observer: Box<dyn TimelineObserver>) -> TimelineResult<()> {
        let id = observer.id().to_owned();
        if self.observers.contains_key(&id) {
            return Err(TimelineError::InvalidData(format!(
                "observer `{id}` is already registered"
            )));
        }
        self.observers.insert(id, observer);
        Ok(())
    }

    pub fn remove_observer(&mut self, id: &str) -> bool {
        self.observers.shift_remove(id).is_some()
    }

    #[must_use]
    pub fn observer_ids(&self) -> Vec<String> {
        self.observers.keys().cloned().collect()
    }

    pub(super) fn context(&self) -> TimelineContext {
        TimelineContext {
            phase: self.phase,
            visible_range: self.visible_range,
            zoom_index: self.zoom_index,
            mode: self.mode,
            archive_restricted: self.is_archive_restricted(),
            loading: self.is_loading(),
        }
    }

    pub(super) fn emit(&mut self, event: TimelineEvent) {
        let context = self.context();
        for observer in self.observers.values_mut() {
            observer.on_event(&event, context);
        }
    }

    pub(super) fn current_generation(&self) -> FetchGeneration {
        FetchGeneration {
            zoom_index: self.zoom_index,
            mode: self.mode.tag(),
            visibility_epoch: self.visibility_epoch,
        }
    }

    pub(super) fn zoom_duration_ms(&self) -> i64 {
        self.zoom_level().total_duration_ms
    }

    /// Replaces the visible range, emitting only on an actual change.
    pub(super) fn replace_visible_range(&mut self, range: TimeRange) -> bool {
        if self.visible_range == Some(range) {
            return false;
        }
        self.visible_range = Some(range);
        self.emit(TimelineEvent::VisibleRangeChanged { range });
        true
    }

    pub(super) fn replace_mode(&mut self, mode: PlaybackMode) {
        if self.mode == mode {
            return;
        }
        let generation_changed = self.mode.tag() != mode.tag();
        self.mode = mode;
        self.live_sync.reset_bucket();
        if generation_changed {
            self.drop_in_flight_fetch();
        }
        self.emit(TimelineEvent::ModeChanged { mode });
    }

    pub(super) fn replace_error(&mut self, error: Option<ErrorState>) {
        if self.error == error {
            return;
        }
        self.error = error.clone();
        self.emit(TimelineEvent::ErrorStateChanged { error });
    }

    /// Forgets the outstanding fetch; its result will fail the relevance check.
    pub(super) fn drop_in_flight_fetch(&mut self) {
        if let Some(request) = self.in_flight_fetch.take() {
            debug!(sequence = request.ticket.sequence, "superseding in-flight fetch");
            // Not yet handed to the host: withdraw it instead.
            self.requests.retain(|queued| {
                !matches!(queued, TimelineRequest::Availability(r) if r.ticket == request.ticket)
            });
        }
    }
}
