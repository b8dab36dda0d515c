use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;
use timeline_rs::core::Orientation;
use timeline_rs::interaction::{
    GestureArbiter, GestureConfig, GestureKind, GestureOutcome, InteractionMode, PointerEvent,
};

fn t0() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).single().expect("t0")
}

fn pointer_event() -> impl Strategy<Value = (u8, f64, f64, i64)> {
    (0u8..4, -400.0f64..400.0, -400.0f64..400.0, 0i64..600)
}

fn to_event(phase: u8, x: f64, y: f64) -> PointerEvent {
    match phase {
        0 => PointerEvent::down(x, y),
        1 | 2 => PointerEvent::moved(x, y),
        _ if x > 0.0 => PointerEvent::up(x, y),
        _ => PointerEvent::cancel(),
    }
}

proptest! {
    #[test]
    fn each_interaction_resolves_to_at_most_one_gesture(
        vertical in any::<bool>(),
        events in prop::collection::vec(pointer_event(), 1..64)
    ) {
        let orientation = if vertical { Orientation::Vertical } else { Orientation::Horizontal };
        let mut arbiter = GestureArbiter::new(GestureConfig::default(), orientation);
        let mut now = t0();
        let mut current: Option<GestureKind> = None;

        for (phase, x, y, gap_ms) in events {
            now += TimeDelta::milliseconds(gap_ms);
            let outcome = arbiter.handle(to_event(phase, x, y), now);

            if let Some(kind) = outcome.kind() {
                if let Some(existing) = current {
                    prop_assert_eq!(existing, kind);
                }
                current = Some(kind);
            }
            if outcome.is_terminal() {
                prop_assert_eq!(arbiter.mode(), InteractionMode::Idle);
                current = None;
            }
            if outcome == GestureOutcome::Pressed {
                prop_assert!(current.is_none());
            }
            prop_assert_eq!(arbiter.in_progress(), arbiter.mode() != InteractionMode::Idle);
        }
    }

    #[test]
    fn scrub_deltas_are_cumulative_from_press_origin(
        origin in 0.0f64..500.0,
        steps in prop::collection::vec(11.0f64..80.0, 1..10)
    ) {
        let mut arbiter = GestureArbiter::new(GestureConfig::default(), Orientation::Horizontal);
        arbiter.handle(PointerEvent::down(origin, 50.0), t0());

        let mut x = origin;
        for step in steps {
            x += step;
            let outcome = arbiter.handle(PointerEvent::moved(x, 50.0), t0());
            match outcome {
                GestureOutcome::ScrubStarted { delta_px } | GestureOutcome::ScrubMoved { delta_px } => {
                    prop_assert!((delta_px - (x - origin)).abs() < 1e-9);
                }
                other => return Err(TestCaseError::fail(format!("unexpected outcome {other:?}"))),
            }
        }
    }
}
