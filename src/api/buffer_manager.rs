use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::millis_between;
use crate::core::{BufferedRange, TimeRange};

use super::{BufferPolicy, PlaybackMode};

/// Why a fetch was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchReason {
    NoBuffer,
    ZoomChanged,
    NotCovered,
    /// Live buffer is oversized relative to the window around the live edge.
    LiveOverlap,
    /// Live instant approaches a buffered edge.
    LiveEdge,
    /// Explicit user retry.
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchDecision {
    Keep,
    Fetch(FetchReason),
}

impl FetchDecision {
    #[must_use]
    pub fn is_fetch(self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

/// Range to request for `visible`, padded by `margin × duration` per side.
#[must_use]
pub fn padded_request(visible: TimeRange, margin_multiplier: f64) -> TimeRange {
    visible.padded(margin_multiplier)
}

/// Strict coverage check.
///
/// `true` when there is no buffer, the buffer belongs to another zoom level,
/// or it does not contain the padded request.
#[must_use]
pub fn needs_fetch(
    visible: TimeRange,
    buffered: Option<&BufferedRange>,
    zoom_index: usize,
    margin_multiplier: f64,
) -> bool {
    coverage_decision(visible, buffered, zoom_index, margin_multiplier).is_fetch()
}

fn coverage_decision(
    visible: TimeRange,
    buffered: Option<&BufferedRange>,
    zoom_index: usize,
    margin_multiplier: f64,
) -> FetchDecision {
    let Some(buffered) = buffered else {
        return FetchDecision::Fetch(FetchReason::NoBuffer);
    };
    if buffered.zoom_index != zoom_index {
        return FetchDecision::Fetch(FetchReason::ZoomChanged);
    }
    let padded = padded_request(visible, margin_multiplier);
    if !buffered.range.contains_range(padded) {
        return FetchDecision::Fetch(FetchReason::NotCovered);
    }
    FetchDecision::Keep
}

/// Decides whether the buffered availability must be refreshed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferManager {
    policy: BufferPolicy,
}

impl BufferManager {
    #[must_use]
    pub fn new(policy: BufferPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(self) -> BufferPolicy {
        self.policy
    }

    #[must_use]
    pub fn padded_request(self, visible: TimeRange) -> TimeRange {
        padded_request(visible, self.policy.margin_multiplier)
    }

    /// Coverage check plus the live-mode overlap refinement.
    #[must_use]
    pub fn decide(
        self,
        visible: TimeRange,
        buffered: Option<&BufferedRange>,
        zoom_index: usize,
        mode: PlaybackMode,
    ) -> FetchDecision {
        let decision = coverage_decision(visible, buffered, zoom_index, self.policy.margin_multiplier);
        if decision.is_fetch() || !mode.is_live() {
            return decision;
        }
        let Some(buffered) = buffered else {
            return decision;
        };

        let padded = self.padded_request(visible);
        let overlap = buffered.range.overlap_ms(padded) as f64;
        let buffered_ms = buffered.range.duration_ms() as f64;
        if overlap < self.policy.live_min_overlap_ratio * buffered_ms {
            return FetchDecision::Fetch(FetchReason::LiveOverlap);
        }
        FetchDecision::Keep
    }

    /// Proactive live refresh when `server_time` nears a buffered edge.
    ///
    /// Returns `Keep` when a refetch would request the same range again.
    #[must_use]
    pub fn edge_refresh(
        self,
        server_time: DateTime<Utc>,
        visible: TimeRange,
        buffered: Option<&BufferedRange>,
    ) -> FetchDecision {
        let Some(buffered) = buffered else {
            return FetchDecision::Keep;
        };
        let range = buffered.range;
        if !range.contains_instant(server_time) {
            return FetchDecision::Keep;
        }
        let threshold = self.policy.live_edge_refresh_ratio * range.duration_ms() as f64;
        let to_start = millis_between(range.start(), server_time) as f64;
        let to_end = millis_between(server_time, range.end()) as f64;
        if to_start >= threshold && to_end >= threshold {
            return FetchDecision::Keep;
        }
        if self.padded_request(visible) == range {
            return FetchDecision::Keep;
        }
        FetchDecision::Fetch(FetchReason::LiveEdge)
    }
}
