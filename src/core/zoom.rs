use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};

/// One entry of the zoom table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomLevel {
    /// Total visible duration at this level.
    pub total_duration_ms: i64,
    /// Width of one availability bucket.
    pub unit_length_secs: u32,
    pub display_name: String,
}

impl ZoomLevel {
    #[must_use]
    pub fn new(total_duration_ms: i64, unit_length_secs: u32, display_name: impl Into<String>) -> Self {
        Self {
            total_duration_ms,
            unit_length_secs,
            display_name: display_name.into(),
        }
    }

    #[must_use]
    pub fn unit_length_ms(&self) -> i64 {
        i64::from(self.unit_length_secs) * 1_000
    }
}

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;

/// Ordered zoom levels, strictly increasing by visible duration.
///
/// Index `0` is the most zoomed-in level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ZoomLevel>", into = "Vec<ZoomLevel>")]
pub struct ZoomTable {
    levels: Vec<ZoomLevel>,
}

impl Default for ZoomTable {
    fn default() -> Self {
        Self {
            levels: vec![
                ZoomLevel::new(5 * MINUTE_MS, 5, "5 min"),
                ZoomLevel::new(10 * MINUTE_MS, 10, "10 min"),
                ZoomLevel::new(15 * MINUTE_MS, 15, "15 min"),
                ZoomLevel::new(30 * MINUTE_MS, 30, "30 min"),
                ZoomLevel::new(HOUR_MS, 60, "1 hour"),
                ZoomLevel::new(4 * HOUR_MS, 240, "4 hours"),
                ZoomLevel::new(6 * HOUR_MS, 360, "6 hours"),
                ZoomLevel::new(24 * HOUR_MS, 1_440, "1 day"),
            ],
        }
    }
}

impl ZoomTable {
    /// Index of the "1 hour" level in the default table.
    pub const DEFAULT_INDEX: usize = 4;

    pub fn new(levels: Vec<ZoomLevel>) -> TimelineResult<Self> {
        if levels.is_empty() {
            return Err(TimelineError::InvalidConfig(
                "zoom table must contain at least one level".to_owned(),
            ));
        }
        for level in &levels {
            if level.total_duration_ms <= 0 {
                return Err(TimelineError::InvalidConfig(format!(
                    "zoom level `{}` must have a positive duration",
                    level.display_name
                )));
            }
            if level.unit_length_secs == 0 {
                return Err(TimelineError::InvalidConfig(format!(
                    "zoom level `{}` must have a positive unit length",
                    level.display_name
                )));
            }
        }
        if levels
            .windows(2)
            .any(|pair| pair[0].total_duration_ms >= pair[1].total_duration_ms)
        {
            return Err(TimelineError::InvalidConfig(
                "zoom durations must be strictly increasing".to_owned(),
            ));
        }
        Ok(Self { levels })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[must_use]
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.levels.len().saturating_sub(1))
    }

    /// Clamps a signed index request (e.g. `current - 1`) into the table.
    #[must_use]
    pub fn clamp_signed_index(&self, index: i64) -> usize {
        if index <= 0 {
            return 0;
        }
        self.clamp_index(usize::try_from(index).unwrap_or(usize::MAX))
    }

    /// Level at `index`, clamped into the table.
    #[must_use]
    pub fn level(&self, index: usize) -> &ZoomLevel {
        &self.levels[self.clamp_index(index)]
    }

    #[must_use]
    pub fn levels(&self) -> &[ZoomLevel] {
        &self.levels
    }
}

impl TryFrom<Vec<ZoomLevel>> for ZoomTable {
    type Error = TimelineError;

    fn try_from(levels: Vec<ZoomLevel>) -> Result<Self, Self::Error> {
        Self::new(levels)
    }
}

impl From<ZoomTable> for Vec<ZoomLevel> {
    fn from(table: ZoomTable) -> Self {
        table.levels
    }
}

#[cfg(test)]
mod tests {
    use super::{ZoomLevel, ZoomTable};

    #[test]
    fn default_table_is_valid_and_ordered() {
        let table = ZoomTable::default();
        let rebuilt = ZoomTable::new(table.levels().to_vec()).expect("valid table");
        assert_eq!(rebuilt.len(), 8);
        assert_eq!(table.level(ZoomTable::DEFAULT_INDEX).unit_length_secs, 60);
    }

    #[test]
    fn index_is_clamped() {
        let table = ZoomTable::default();
        assert_eq!(table.clamp_index(99), 7);
        assert_eq!(table.clamp_signed_index(-1), 0);
        assert_eq!(table.level(42).display_name, "1 day");
    }

    #[test]
    fn rejects_non_increasing_durations() {
        let err = ZoomTable::new(vec![
            ZoomLevel::new(60_000, 1, "a"),
            ZoomLevel::new(60_000, 1, "b"),
        ])
        .expect_err("duplicate duration");
        assert!(format!("{err}").contains("strictly increasing"));
    }

    #[test]
    fn rejects_empty_table() {
        assert!(ZoomTable::new(Vec::new()).is_err());
    }
}
