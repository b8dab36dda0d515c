use approx::assert_abs_diff_eq;
use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone, Utc};
use timeline_rs::core::{
    AvailabilityVector, AxisLength, BufferedRange, Orientation, TimeRange, ZoomLevel, ZoomTable,
    label_cadence_ms, pan_delta_millis, pixel_at_time, project_availability, time_at_pixel,
    time_labels,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("t0")
}

fn after_secs(secs: i64) -> DateTime<Utc> {
    t0() + TimeDelta::seconds(secs)
}

#[test]
fn pixel_round_trip_within_one_pixel() {
    let axis = AxisLength::new(1080.0).expect("axis");
    let range = TimeRange::centered_on(t0(), 3_600_000).expect("range");

    for coord in [0.0, 1.0, 333.3, 540.0, 1079.5, 1080.0] {
        let at = time_at_pixel(range, axis, coord);
        let recovered = pixel_at_time(range, axis, at);
        assert_abs_diff_eq!(recovered, coord, epsilon = 1.0);
    }
}

#[test]
fn axis_edges_map_to_range_edges() {
    let axis = AxisLength::new(600.0).expect("axis");
    let range = TimeRange::new(after_secs(0), after_secs(600)).expect("range");

    assert_eq!(time_at_pixel(range, axis, 0.0), range.start());
    assert_eq!(time_at_pixel(range, axis, 600.0), range.end());
    assert_eq!(time_at_pixel(range, axis, 300.0), range.midpoint());
    assert_abs_diff_eq!(pixel_at_time(range, axis, after_secs(150)), 150.0);
}

#[test]
fn out_of_axis_coordinates_are_clamped_by_helper() {
    let axis = AxisLength::new(400.0).expect("axis");
    assert_eq!(axis.clamp_coord(-25.0), 0.0);
    assert_eq!(axis.clamp_coord(425.0), 400.0);
    assert_eq!(axis.clamp_coord(f64::NAN), 0.0);
    assert!(AxisLength::new(0.0).is_err());
    assert!(AxisLength::new(f64::INFINITY).is_err());
}

#[test]
fn orientation_selects_scrub_axis() {
    assert_eq!(Orientation::Horizontal.primary(3.0, 7.0), 3.0);
    assert_eq!(Orientation::Horizontal.perpendicular(3.0, 7.0), 7.0);
    assert_eq!(Orientation::Vertical.primary(3.0, 7.0), 7.0);
    assert_eq!(Orientation::Vertical.perpendicular(3.0, 7.0), 3.0);
}

#[test]
fn dragging_half_the_axis_moves_half_the_window_into_the_past() {
    let axis = AxisLength::new(600.0).expect("axis");
    assert_abs_diff_eq!(pan_delta_millis(300.0, axis, 3_600_000), -1_800_000.0);
    assert_abs_diff_eq!(pan_delta_millis(-150.0, axis, 3_600_000), 900_000.0);
}

#[test]
fn shifted_range_preserves_duration() {
    let range = TimeRange::centered_on(t0(), 600_000).expect("range");
    let shifted = range.shifted_by_millis(-1_800_000.0);
    assert_eq!(shifted.duration_ms(), 600_000);
    assert_eq!(shifted.midpoint(), t0() - TimeDelta::minutes(30));
}

#[test]
fn default_zoom_table_matches_recorder_intervals() {
    let table = ZoomTable::default();
    let minutes: Vec<i64> = table
        .levels()
        .iter()
        .map(|level| level.total_duration_ms / 60_000)
        .collect();
    assert_eq!(minutes, vec![5, 10, 15, 30, 60, 240, 360, 1_440]);
    assert_eq!(table.level(ZoomTable::DEFAULT_INDEX).display_name, "1 hour");
    for level in table.levels() {
        assert_eq!(level.total_duration_ms / level.unit_length_ms(), 60);
    }
}

#[test]
fn zoom_table_rejects_unordered_levels() {
    let levels = vec![
        ZoomLevel::new(600_000, 10, "10 min"),
        ZoomLevel::new(300_000, 5, "5 min"),
    ];
    assert!(ZoomTable::new(levels).is_err());
    assert!(ZoomTable::new(Vec::new()).is_err());
    assert!(ZoomTable::new(vec![ZoomLevel::new(60_000, 0, "bad")]).is_err());
}

#[test]
fn availability_projection_merges_runs_inside_visible_window() {
    let buffered = BufferedRange {
        range: TimeRange::new(after_secs(0), after_secs(300)).expect("buffer"),
        availability: AvailabilityVector::from_flags([1, 1, 0, 0, 1]),
        zoom_index: 0,
        unit_length_secs: 60,
    };
    let visible = TimeRange::new(after_secs(60), after_secs(240)).expect("visible");
    let axis = AxisLength::new(180.0).expect("axis");

    let segments = project_availability(&buffered, visible, axis);
    assert_eq!(segments.len(), 2);

    assert!(segments[0].has_archive);
    assert_eq!(segments[0].start, after_secs(60));
    assert_eq!(segments[0].end, after_secs(120));
    assert_abs_diff_eq!(segments[0].start_px, 0.0);
    assert_abs_diff_eq!(segments[0].end_px, 60.0);

    assert!(!segments[1].has_archive);
    assert_eq!(segments[1].end, after_secs(240));
    assert_abs_diff_eq!(segments[1].end_px, 180.0);
}

#[test]
fn availability_lookup_uses_bucket_alignment() {
    let buffered = BufferedRange {
        range: TimeRange::new(after_secs(0), after_secs(180)).expect("buffer"),
        availability: AvailabilityVector::from_flags([0, 1, 0]),
        zoom_index: 0,
        unit_length_secs: 60,
    };
    assert_eq!(buffered.availability_at(after_secs(30)), Some(false));
    assert_eq!(buffered.availability_at(after_secs(90)), Some(true));
    assert_eq!(buffered.availability_at(after_secs(-1)), None);
}

#[test]
fn label_cadence_follows_visible_duration() {
    assert_eq!(label_cadence_ms(5 * 60_000), 60_000);
    assert_eq!(label_cadence_ms(30 * 60_000), 5 * 60_000);
    assert_eq!(label_cadence_ms(60 * 60_000), 15 * 60_000);
    assert_eq!(label_cadence_ms(6 * 3_600_000), 3_600_000);
    assert_eq!(label_cadence_ms(24 * 3_600_000), 4 * 3_600_000);
}

#[test]
fn hourly_window_gets_quarter_hour_labels() {
    let visible = TimeRange::new(t0(), t0() + TimeDelta::hours(1)).expect("visible");
    let axis = AxisLength::new(800.0).expect("axis");
    let utc = FixedOffset::east_opt(0).expect("utc offset");

    let labels = time_labels(visible, axis, utc);
    let texts: Vec<&str> = labels.iter().map(|label| label.text.as_str()).collect();
    assert_eq!(texts, vec!["12:00", "12:15", "12:30", "12:45", "13:00"]);
    assert!(labels.iter().all(|label| !label.major && label.date_text.is_none()));
    assert_abs_diff_eq!(labels[2].position_px, 400.0);
}

#[test]
fn day_window_labels_carry_dates_in_display_offset() {
    let visible = TimeRange::centered_on(t0(), 24 * 3_600_000).expect("visible");
    let axis = AxisLength::new(960.0).expect("axis");
    let plus_three = FixedOffset::east_opt(3 * 3_600).expect("offset");

    let labels = time_labels(visible, axis, plus_three);
    assert_eq!(labels.len(), 7);
    assert!(labels.iter().all(|label| label.major));
    assert_eq!(labels[0].text, "03:00");
    assert_eq!(labels[0].date_text.as_deref(), Some("01.03"));
}
