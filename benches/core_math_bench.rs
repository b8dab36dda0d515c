use std::hint::black_box;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use timeline_rs::api::{
    BufferManager, BufferPolicy, ManualClock, PlaybackMode, TimeWindowController, TimelineConfig,
    TimelineRequest,
};
use timeline_rs::core::{
    AvailabilityVector, AxisLength, BufferedRange, TimeRange, pixel_at_time,
    project_availability, time_at_pixel,
};
use timeline_rs::interaction::PointerEvent;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn bench_pixel_time_round_trip(c: &mut Criterion) {
    let axis = AxisLength::new(1920.0).expect("valid axis");
    let range = TimeRange::centered_on(t0(), 3_600_000).expect("valid range");

    c.bench_function("pixel_time_round_trip", |b| {
        b.iter(|| {
            let at = time_at_pixel(black_box(range), axis, black_box(1_234.5));
            let _ = pixel_at_time(range, axis, at);
        })
    });
}

fn bench_fetch_decision(c: &mut Criterion) {
    let manager = BufferManager::new(BufferPolicy::default());
    let visible = TimeRange::centered_on(t0(), 3_600_000).expect("valid range");
    let buffered = BufferedRange {
        range: visible.padded(2.0),
        availability: AvailabilityVector::new(vec![true; 300]),
        zoom_index: 4,
        unit_length_secs: 60,
    };

    c.bench_function("fetch_decision_live", |b| {
        b.iter(|| {
            let _ = manager.decide(
                black_box(visible.shifted_by_millis(30_000.0)),
                black_box(Some(&buffered)),
                4,
                PlaybackMode::Live,
            );
        })
    });
}

fn bench_availability_projection_1day(c: &mut Criterion) {
    let axis = AxisLength::new(1920.0).expect("valid axis");
    let visible = TimeRange::centered_on(t0(), 86_400_000).expect("valid range");
    let flags = (0..300).map(|i| u8::from(i % 7 != 0)).collect::<Vec<_>>();
    let buffered = BufferedRange {
        range: visible.padded(2.0),
        availability: AvailabilityVector::from_flags(flags),
        zoom_index: 7,
        unit_length_secs: 1_440,
    };

    c.bench_function("availability_projection_1day", |b| {
        b.iter(|| {
            let _ = project_availability(black_box(&buffered), black_box(visible), axis);
        })
    });
}

fn bench_scrub_gesture_60_moves(c: &mut Criterion) {
    let clock = ManualClock::new(t0());
    let mut controller =
        TimeWindowController::with_clock(TimelineConfig::new(1080.0), Arc::new(clock))
            .expect("controller init");
    controller.set_visibility(true);
    controller.on_tick(Ok(t0()));
    let _: Vec<TimelineRequest> = controller.drain_requests();

    c.bench_function("scrub_gesture_60_moves", |b| {
        b.iter(|| {
            controller.on_gesture(PointerEvent::down(100.0, 20.0));
            for step in 1..=60 {
                controller.on_gesture(PointerEvent::moved(100.0 + f64::from(step) * 5.0, 20.0));
            }
            controller.on_gesture(PointerEvent::cancel());
        })
    });
}

criterion_group!(
    benches,
    bench_pixel_time_round_trip,
    bench_fetch_decision,
    bench_availability_projection_1day,
    bench_scrub_gesture_60_moves
);
criterion_main!(benches);
