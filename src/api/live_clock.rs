use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_millis, millis_between};

use super::LiveSyncPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecenterGuard {
    GestureInProgress,
    Cooldown,
    SameBucket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecenterDecision {
    Skip(RecenterGuard),
    Recenter { center: DateTime<Utc>, bucket: i64 },
}

/// Floor-divided bucket index of `reference` at the given unit length.
#[must_use]
pub fn auto_center_bucket(reference: DateTime<Utc>, unit_length_ms: i64) -> i64 {
    datetime_to_millis(reference).div_euclid(unit_length_ms.max(1))
}

/// Auto-recenter policy for live mode.
///
/// Holds the interaction clock and the last auto-center bucket of one
/// visible timeline instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveClockSync {
    policy: LiveSyncPolicy,
    last_interaction: Option<DateTime<Utc>>,
    last_bucket: Option<i64>,
}

impl LiveClockSync {
    #[must_use]
    pub fn new(policy: LiveSyncPolicy) -> Self {
        Self {
            policy,
            last_interaction: None,
            last_bucket: None,
        }
    }

    #[must_use]
    pub fn policy(self) -> LiveSyncPolicy {
        self.policy
    }

    #[must_use]
    pub fn last_interaction(self) -> Option<DateTime<Utc>> {
        self.last_interaction
    }

    #[must_use]
    pub fn last_bucket(self) -> Option<i64> {
        self.last_bucket
    }

    pub fn mark_interaction(&mut self, now: DateTime<Utc>) {
        self.last_interaction = Some(now);
    }

    /// Forgets the dedup key so the next evaluation recenters.
    pub fn reset_bucket(&mut self) {
        self.last_bucket = None;
    }

    /// Discards all per-instance state.
    pub fn reset(&mut self) {
        self.last_interaction = None;
        self.last_bucket = None;
    }

    #[must_use]
    pub fn evaluate(
        self,
        now: DateTime<Utc>,
        reference: DateTime<Utc>,
        unit_length_ms: i64,
        gesture_in_progress: bool,
    ) -> RecenterDecision {
        if gesture_in_progress {
            return RecenterDecision::Skip(RecenterGuard::GestureInProgress);
        }
        if let Some(last) = self.last_interaction {
            if millis_between(last, now) < self.policy.interaction_cooldown_ms {
                return RecenterDecision::Skip(RecenterGuard::Cooldown);
            }
        }
        let bucket = auto_center_bucket(reference, unit_length_ms);
        if self.last_bucket == Some(bucket) {
            return RecenterDecision::Skip(RecenterGuard::SameBucket);
        }
        RecenterDecision::Recenter {
            center: reference,
            bucket,
        }
    }

    pub fn commit(&mut self, bucket: i64) {
        self.last_bucket = Some(bucket);
    }
}
