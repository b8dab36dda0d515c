pub mod availability;
pub mod axis;
pub mod primitives;
pub mod time_labels;
pub mod time_range;
pub mod zoom;

pub use availability::{
    AvailabilitySegment, AvailabilitySegments, AvailabilityVector, BufferedRange,
    project_availability,
};
pub use axis::{AxisLength, Orientation, pan_delta_millis, pixel_at_time, time_at_pixel};
pub use time_labels::{TimeLabel, label_cadence_ms, time_labels};
pub use time_range::TimeRange;
pub use zoom::{ZoomLevel, ZoomTable};
