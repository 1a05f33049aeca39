//! Temporal decay.
//!
//! An agent's score is recomputed as a decay-weighted mean of the scores its
//! recent audit entries left it with. Each entry's weight halves every
//! `half_life_days` whole days of age:
//!
//! ```text
//! weight  = 0.5 ^ (days_since / half_life)
//! decayed = Σ(weight × resulting_score) / Σ weight
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::event::TrustEvent;

/// Result of one decay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecaySummary {
    /// Agents whose score was recomputed.
    pub agents_rescored: usize,
    /// Audit entries that contributed.
    pub events_considered: usize,
}

/// Half-life based decay of audit history.
#[derive(Debug, Clone, Copy)]
pub struct TemporalDecayProcessor {
    half_life_days: f64,
}

impl TemporalDecayProcessor {
    /// Creates a processor with the given half-life in days.
    #[must_use]
    pub const fn new(half_life_days: f64) -> Self {
        Self { half_life_days }
    }

    /// Weight of an entry `days_since` whole days old.
    #[must_use]
    pub fn decay_factor(&self, days_since: i64) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let days = days_since.max(0) as f64;
        0.5_f64.powf(days / self.half_life_days)
    }

    /// Whether `event` falls inside a window of `window_days` ending at `now`.
    #[must_use]
    pub fn in_window(event: &TrustEvent, now: DateTime<Utc>, window_days: u32) -> bool {
        event.timestamp >= now - Duration::days(i64::from(window_days))
    }

    /// Decayed score over `events`, or `None` if none fall in the window.
    ///
    /// Returns the score clipped to `[0, 1]` and the number of entries used.
    #[must_use]
    pub fn decayed_score(
        &self,
        events: &[TrustEvent],
        now: DateTime<Utc>,
        window_days: u32,
    ) -> Option<(f64, usize)> {
        let mut total_weight = 0.0;
        let mut weighted_sum = 0.0;
        let mut used = 0;

        for event in events.iter().filter(|e| Self::in_window(e, now, window_days)) {
            let weight = self.decay_factor((now - event.timestamp).num_days());
            total_weight += weight;
            weighted_sum += weight * event.resulting_score();
            used += 1;
        }

        (total_weight > 0.0).then(|| ((weighted_sum / total_weight).clamp(0.0, 1.0), used))
    }
}
