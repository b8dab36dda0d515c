use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use timeline_rs::api::{LiveClockSync, LiveSyncPolicy, RecenterDecision, RecenterGuard, needs_fetch};
use timeline_rs::core::{
    AvailabilityVector, AxisLength, BufferedRange, TimeRange, pixel_at_time, time_at_pixel,
};

fn at_ms(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().expect("timestamp")
}

fn buffered(start_ms: i64, end_ms: i64, zoom_index: usize) -> BufferedRange {
    BufferedRange {
        range: TimeRange::new(at_ms(start_ms), at_ms(end_ms)).expect("buffer"),
        availability: AvailabilityVector::default(),
        zoom_index,
        unit_length_secs: 60,
    }
}

proptest! {
    #[test]
    fn pixel_time_round_trip_property(
        start_ms in 0i64..4_000_000_000_000,
        duration_ms in 60_000i64..86_400_000,
        axis_px in 100.0f64..4_000.0,
        coord_factor in 0.0f64..=1.0
    ) {
        let range = TimeRange::new(at_ms(start_ms), at_ms(start_ms + duration_ms)).expect("range");
        let axis = AxisLength::new(axis_px).expect("axis");
        let coord = coord_factor * axis_px;

        let instant = time_at_pixel(range, axis, coord);
        let recovered = pixel_at_time(range, axis, instant);

        prop_assert!((recovered - coord).abs() <= 1.0);
        prop_assert!(range.contains_instant(instant));
    }

    #[test]
    fn needs_fetch_is_monotone_in_buffer_containment(
        visible_start in -10_000_000i64..10_000_000,
        visible_len in 1_000i64..1_000_000,
        inner_start in -20_000_000i64..20_000_000,
        inner_len in 1_000i64..10_000_000,
        grow_before in 0i64..10_000_000,
        grow_after in 0i64..10_000_000,
        margin in 0.0f64..3.0
    ) {
        let visible = TimeRange::new(at_ms(visible_start), at_ms(visible_start + visible_len))
            .expect("visible");
        let inner = buffered(inner_start, inner_start + inner_len, 4);
        let outer = buffered(inner_start - grow_before, inner_start + inner_len + grow_after, 4);

        if !needs_fetch(visible, Some(&inner), 4, margin) {
            prop_assert!(!needs_fetch(visible, Some(&outer), 4, margin));
        }
        prop_assert!(needs_fetch(visible, None, 4, margin));
        prop_assert!(needs_fetch(visible, Some(&outer), 3, margin));
    }

    #[test]
    fn auto_center_is_idempotent_within_a_bucket(
        bucket in -1_000_000i64..1_000_000,
        first_offset in 0i64..60_000,
        second_offset in 0i64..60_000
    ) {
        let unit_ms = 60_000;
        let now = at_ms(0);
        let mut sync = LiveClockSync::new(LiveSyncPolicy::default());

        let first = sync.evaluate(now, at_ms(bucket * unit_ms + first_offset), unit_ms, false);
        let RecenterDecision::Recenter { bucket: committed, .. } = first else {
            return Err(TestCaseError::fail("fresh sync must recenter"));
        };
        prop_assert_eq!(committed, bucket);
        sync.commit(committed);

        let second = sync.evaluate(now, at_ms(bucket * unit_ms + second_offset), unit_ms, false);
        prop_assert_eq!(second, RecenterDecision::Skip(RecenterGuard::SameBucket));
    }
}
