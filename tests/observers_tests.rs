use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use timeline_rs::TimelineError;
use timeline_rs::api::{
    ManualClock, PlaybackMode, TimeWindowController, TimelineConfig, TimelineRequest,
};
use timeline_rs::core::AvailabilityVector;
use timeline_rs::extensions::{TimelineContext, TimelineEvent, TimelineObserver};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("t0")
}

type Recorded = Arc<Mutex<Vec<(TimelineEvent, TimelineContext)>>>;

struct RecordingObserver {
    id: String,
    events: Recorded,
}

impl RecordingObserver {
    fn new(id: impl Into<String>, events: Recorded) -> Self {
        Self {
            id: id.into(),
            events,
        }
    }
}

impl TimelineObserver for RecordingObserver {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_event(&mut self, event: &TimelineEvent, context: TimelineContext) {
        self.events
            .lock()
            .expect("observer lock")
            .push((event.clone(), context));
    }
}

fn event_kind(event: &TimelineEvent) -> &'static str {
    match event {
        TimelineEvent::TimeSelected { .. } => "time_selected",
        TimelineEvent::VisibleRangeChanged { .. } => "range",
        TimelineEvent::ModeChanged { .. } => "mode",
        TimelineEvent::ZoomChanged { .. } => "zoom",
        TimelineEvent::AvailabilityUpdated { .. } => "availability",
        TimelineEvent::ErrorStateChanged { .. } => "error",
    }
}

fn kinds(events: &Recorded) -> Vec<&'static str> {
    events
        .lock()
        .expect("observer lock")
        .iter()
        .map(|(event, _)| event_kind(event))
        .collect()
}

fn controller() -> TimeWindowController {
    let clock = ManualClock::new(t0());
    TimeWindowController::with_clock(TimelineConfig::new(600.0), Arc::new(clock))
        .expect("controller init")
}

#[test]
fn observer_sees_deterministic_event_sequence() {
    let mut controller = controller();
    let events = Recorded::default();
    controller
        .add_observer(Box::new(RecordingObserver::new("recorder", events.clone())))
        .expect("register observer");

    controller.set_visibility(true);
    controller.on_tick(Ok(t0()));
    assert_eq!(kinds(&events), vec!["range"]);

    let request = controller
        .drain_requests()
        .into_iter()
        .find_map(|request| match request {
            TimelineRequest::Availability(fetch) => Some(fetch),
            TimelineRequest::ServerTime => None,
        })
        .expect("initial fetch");
    controller.on_fetch_complete(request, Ok(AvailabilityVector::new(vec![true; 300])));

    let selected = t0() - chrono::TimeDelta::minutes(20);
    controller.select_time(selected);
    controller.set_zoom(3);

    assert_eq!(
        kinds(&events),
        vec!["range", "availability", "mode", "range", "time_selected", "zoom", "range"]
    );

    let recorded = events.lock().expect("observer lock");
    let (event, context) = &recorded[4];
    assert_eq!(event, &TimelineEvent::TimeSelected { at: selected });
    assert_eq!(context.mode, PlaybackMode::Archive { at: selected });
    assert!(!context.archive_restricted);
}

#[test]
fn duplicate_observer_ids_are_rejected() {
    let mut controller = controller();
    let events = Recorded::default();
    controller
        .add_observer(Box::new(RecordingObserver::new("a", events.clone())))
        .expect("first");
    let duplicate = controller.add_observer(Box::new(RecordingObserver::new("a", events.clone())));
    assert!(matches!(duplicate, Err(TimelineError::InvalidData(_))));

    controller
        .add_observer(Box::new(RecordingObserver::new("b", events)))
        .expect("second");
    assert_eq!(controller.observer_ids(), vec!["a".to_owned(), "b".to_owned()]);
    assert!(controller.remove_observer("a"));
    assert!(!controller.remove_observer("a"));
    assert_eq!(controller.observer_ids(), vec!["b".to_owned()]);
}

#[test]
fn error_transitions_are_reported_once() {
    let mut controller = controller();
    let events = Recorded::default();
    controller
        .add_observer(Box::new(RecordingObserver::new("recorder", events.clone())))
        .expect("register observer");

    controller.set_visibility(true);
    controller.on_tick(Err(timeline_rs::ServiceError::Connection("down".to_owned())));
    controller.poll_clock();
    controller.on_tick(Err(timeline_rs::ServiceError::Connection("down".to_owned())));
    controller.on_tick(Ok(t0()));

    assert_eq!(kinds(&events), vec!["error", "error", "range"]);
}
