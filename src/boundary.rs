//! Trust boundaries and soft enforcement.
//!
//! Each agent has an acceptable score range derived from its tier. Scores
//! that leave the range are never rejected: the enforcer pulls them partway
//! back toward the violated bound and the check reports a warning level.

use serde::{Deserialize, Serialize};

/// Share of an out-of-range score kept by `soft_clamp`.
const SOFT_CLAMP_RETENTION: f64 = 0.3;

/// Relative distance beyond a bound after which a violation is critical.
const CRITICAL_BAND: f64 = 0.2;

/// Fraction of the range above `min` that still raises a low warning.
const WARNING_FRACTION: f64 = 0.2;

/// Acceptable score range for one agent.
///
/// Invariant: `0 <= min <= warning_threshold <= max <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustBoundary {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Scores at or below this value raise a low warning.
    pub warning_threshold: f64,
}

impl TrustBoundary {
    /// Builds a boundary from a range, placing the warning threshold 20% of
    /// the way up from `min`.
    #[must_use]
    pub fn from_range(min: f64, max: f64) -> Self {
        let min = min.clamp(0.0, 1.0);
        let max = max.clamp(min, 1.0);
        Self {
            min,
            max,
            warning_threshold: min + (max - min) * WARNING_FRACTION,
        }
    }

    /// Whether `score` lies within `[min, max]`.
    #[must_use]
    pub fn contains(&self, score: f64) -> bool {
        self.min <= score && score <= self.max
    }
}

/// Severity of a boundary observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningLevel {
    /// Comfortably within bounds.
    #[default]
    None,
    /// Near the lower bound, or slightly out of range.
    Low,
    /// Far out of range.
    Critical,
}

/// Result of checking a score against a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCheck {
    /// Whether the score lies within `[min_bound, max_bound]`.
    pub within_bounds: bool,
    /// The score that was checked.
    pub current_score: f64,
    /// Lower bound used.
    pub min_bound: f64,
    /// Upper bound used.
    pub max_bound: f64,
    /// Severity of the observation.
    pub warning_level: WarningLevel,
}

impl BoundaryCheck {
    /// Check reported for an unusable agent id.
    #[must_use]
    pub const fn invalid_agent() -> Self {
        Self {
            within_bounds: false,
            current_score: 0.0,
            min_bound: 0.0,
            max_bound: 1.0,
            warning_level: WarningLevel::Critical,
        }
    }
}

/// Evaluates and softly enforces trust boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryEnforcer;

impl BoundaryEnforcer {
    /// Checks `score` against `boundary`.
    #[must_use]
    pub fn check(score: f64, boundary: &TrustBoundary) -> BoundaryCheck {
        let TrustBoundary {
            min,
            max,
            warning_threshold,
        } = *boundary;

        let warning_level = if score < min {
            if score < min * (1.0 - CRITICAL_BAND) {
                WarningLevel::Critical
            } else {
                WarningLevel::Low
            }
        } else if score > max {
            if score > max * (1.0 + CRITICAL_BAND) {
                WarningLevel::Critical
            } else {
                WarningLevel::Low
            }
        } else if score <= warning_threshold {
            WarningLevel::Low
        } else {
            WarningLevel::None
        };

        BoundaryCheck {
            within_bounds: boundary.contains(score),
            current_score: score,
            min_bound: min,
            max_bound: max,
            warning_level,
        }
    }

    /// Pulls an out-of-range score 70% of the way toward the violated bound.
    ///
    /// In-range scores are returned unchanged. The result lies strictly
    /// between the input and the bound unless the two are equal.
    #[must_use]
    pub fn soft_clamp(score: f64, min: f64, max: f64) -> f64 {
        if score < min {
            score * SOFT_CLAMP_RETENTION + min * (1.0 - SOFT_CLAMP_RETENTION)
        } else if score > max {
            score * SOFT_CLAMP_RETENTION + max * (1.0 - SOFT_CLAMP_RETENTION)
        } else {
            score
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn medium() -> TrustBoundary {
        TrustBoundary::from_range(0.4, 0.85)
    }

    #[test]
    fn warning_threshold_is_twenty_percent_above_min() {
        let b = medium();
        assert!((b.warning_threshold - 0.49).abs() < 1e-12);
    }

    #[test]
    fn check_within_bounds() {
        let check = BoundaryEnforcer::check(0.7, &medium());
        assert!(check.within_bounds);
        assert_eq!(check.warning_level, WarningLevel::None);
        assert_eq!(check.min_bound, 0.4);
        assert_eq!(check.max_bound, 0.85);
    }

    #[test]
    fn check_near_lower_bound_is_low() {
        let check = BoundaryEnforcer::check(0.45, &medium());
        assert!(check.within_bounds);
        assert_eq!(check.warning_level, WarningLevel::Low);
    }

    #[test]
    fn check_slightly_below_min_is_low() {
        let check = BoundaryEnforcer::check(0.35, &medium());
        assert!(!check.within_bounds);
        assert_eq!(check.warning_level, WarningLevel::Low);
    }

    #[test]
    fn check_far_below_min_is_critical() {
        let check = BoundaryEnforcer::check(0.3, &medium());
        assert_eq!(check.warning_level, WarningLevel::Critical);
    }

    #[test]
    fn check_above_max() {
        let b = TrustBoundary::from_range(0.0, 0.5);
        assert_eq!(BoundaryEnforcer::check(0.55, &b).warning_level, WarningLevel::Low);
        assert_eq!(BoundaryEnforcer::check(0.65, &b).warning_level, WarningLevel::Critical);
    }

    #[test]
    fn soft_clamp_blends_toward_bound() {
        let below = BoundaryEnforcer::soft_clamp(0.2, 0.4, 0.85);
        assert!((below - 0.34).abs() < 1e-12);
        assert!(below > 0.2 && below < 0.4);

        let above = BoundaryEnforcer::soft_clamp(1.0, 0.4, 0.85);
        assert!((above - 0.895).abs() < 1e-12);
        assert!(above > 0.85 && above < 1.0);
    }

    #[test]
    fn soft_clamp_leaves_in_range_scores() {
        assert_eq!(BoundaryEnforcer::soft_clamp(0.5, 0.4, 0.85), 0.5);
        assert_eq!(BoundaryEnforcer::soft_clamp(0.4, 0.4, 0.85), 0.4);
    }

    #[test]
    fn invalid_agent_check_is_critical() {
        let check = BoundaryCheck::invalid_agent();
        assert!(!check.within_bounds);
        assert_eq!(check.warning_level, WarningLevel::Critical);
    }
}
