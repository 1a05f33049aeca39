//! Baseline trust tiers.
//!
//! A tier is assigned to an agent by the baseline configuration. It fixes the
//! agent's seed score and the range its score is expected to stay within.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::boundary::TrustBoundary;

/// Baseline trust level of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustTier {
    /// Components the system cannot run without.
    SystemCritical,
    /// Highly trusted agents.
    High,
    /// Default level for configured agents.
    Medium,
    /// Agents granted limited trust.
    Low,
    /// Agents allowed some interaction but not trusted.
    Untrusted,
    /// Agents blocked from interaction.
    Blocked,
    /// A level name the engine does not know.
    Unrecognized,
}

impl TrustTier {
    /// Parses a tier name. Unknown names map to `Unrecognized`.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "system_critical" => Self::SystemCritical,
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            "untrusted" => Self::Untrusted,
            "blocked" => Self::Blocked,
            _ => Self::Unrecognized,
        }
    }

    /// Seed score for a newly created record of this tier.
    #[must_use]
    pub const fn seed_score(self) -> f64 {
        match self {
            Self::SystemCritical | Self::High => 0.9,
            Self::Medium => 0.65,
            Self::Low => 0.4,
            Self::Untrusted => 0.2,
            Self::Blocked => 0.0,
            Self::Unrecognized => 0.5,
        }
    }

    /// Acceptable score range for this tier.
    #[must_use]
    pub fn boundary(self) -> TrustBoundary {
        let (min, max) = match self {
            Self::SystemCritical => (0.7, 1.0),
            Self::High => (0.6, 0.95),
            Self::Medium => (0.4, 0.85),
            Self::Low => (0.2, 0.7),
            Self::Untrusted => (0.0, 0.5),
            Self::Blocked | Self::Unrecognized => (0.0, 0.3),
        };
        TrustBoundary::from_range(min, max)
    }
}

impl Default for TrustTier {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for TrustTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SystemCritical => write!(f, "system_critical"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
            Self::Untrusted => write!(f, "untrusted"),
            Self::Blocked => write!(f, "blocked"),
            Self::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

/// Coarse description of how far an agent can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustStanding {
    /// Score of at least 0.9.
    HighlyTrusted,
    /// Score of at least 0.75.
    Trusted,
    /// Score of at least 0.5.
    ModeratelyTrusted,
    /// Score of at least 0.25.
    LimitedTrust,
    /// Anything lower.
    MinimalTrust,
}

impl TrustStanding {
    /// Classifies a score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            Self::HighlyTrusted
        } else if score >= 0.75 {
            Self::Trusted
        } else if score >= 0.5 {
            Self::ModeratelyTrusted
        } else if score >= 0.25 {
            Self::LimitedTrust
        } else {
            Self::MinimalTrust
        }
    }
}

impl fmt::Display for TrustStanding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighlyTrusted => write!(f, "Highly Trusted"),
            Self::Trusted => write!(f, "Trusted"),
            Self::ModeratelyTrusted => write!(f, "Moderately Trusted"),
            Self::LimitedTrust => write!(f, "Limited Trust"),
            Self::MinimalTrust => write!(f, "Minimal Trust"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_and_unknown_levels() {
        assert_eq!(TrustTier::parse("system_critical"), TrustTier::SystemCritical);
        assert_eq!(TrustTier::parse(" HIGH "), TrustTier::High);
        assert_eq!(TrustTier::parse("galactic"), TrustTier::Unrecognized);
    }

    #[test]
    fn seed_scores_follow_table() {
        assert_eq!(TrustTier::SystemCritical.seed_score(), 0.9);
        assert_eq!(TrustTier::High.seed_score(), 0.9);
        assert_eq!(TrustTier::Medium.seed_score(), 0.65);
        assert_eq!(TrustTier::Low.seed_score(), 0.4);
        assert_eq!(TrustTier::Untrusted.seed_score(), 0.2);
        assert_eq!(TrustTier::Blocked.seed_score(), 0.0);
        assert_eq!(TrustTier::Unrecognized.seed_score(), 0.5);
    }

    #[test]
    fn boundaries_follow_table() {
        let high = TrustTier::High.boundary();
        assert_eq!((high.min, high.max), (0.6, 0.95));
        assert!((high.warning_threshold - 0.67).abs() < 1e-9);

        let blocked = TrustTier::Blocked.boundary();
        assert_eq!(blocked, TrustTier::Unrecognized.boundary());
        assert_eq!((blocked.min, blocked.max), (0.0, 0.3));
    }

    #[test]
    fn standing_thresholds() {
        assert_eq!(TrustStanding::from_score(0.95), TrustStanding::HighlyTrusted);
        assert_eq!(TrustStanding::from_score(0.75), TrustStanding::Trusted);
        assert_eq!(TrustStanding::from_score(0.5), TrustStanding::ModeratelyTrusted);
        assert_eq!(TrustStanding::from_score(0.3), TrustStanding::LimitedTrust);
        assert_eq!(TrustStanding::from_score(0.1), TrustStanding::MinimalTrust);
        assert_eq!(TrustStanding::LimitedTrust.to_string(), "Limited Trust");
    }
}
