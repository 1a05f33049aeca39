//! Per-agent trust state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::bayesian::{BayesianModel, BetaParams};
use crate::boundary::TrustBoundary;
use crate::dimension::{DimensionScores, DimensionalModel};
use crate::tier::TrustTier;

/// Everything the engine knows about one agent's trust.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTrustRecord {
    /// Agent the record describes.
    pub agent_id: AgentId,
    /// Baseline tier, if the agent was configured.
    pub tier: Option<TrustTier>,
    /// Current aggregate score in `[0, 1]`.
    pub aggregate_score: f64,
    /// Per-dimension scores.
    pub dimensions: DimensionScores,
    /// Beta-distribution parameters.
    pub bayesian: BetaParams,
    /// Acceptable score range.
    pub boundary: TrustBoundary,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl AgentTrustRecord {
    /// Creates a fresh record.
    ///
    /// Configured agents are seeded from their tier. Agents first seen
    /// through an event start at `neutral_score` and get the medium range.
    #[must_use]
    pub fn seeded(
        agent_id: AgentId,
        tier: Option<TrustTier>,
        neutral_score: f64,
        bayesian: &BayesianModel,
        dimensional: &DimensionalModel,
        now: DateTime<Utc>,
    ) -> Self {
        let score = tier.map_or(neutral_score, TrustTier::seed_score).clamp(0.0, 1.0);
        let boundary = tier.unwrap_or_default().boundary();
        let dimensions = dimensional.initial_scores(agent_id.as_str(), score);
        Self {
            agent_id,
            tier,
            aggregate_score: score,
            dimensions,
            bayesian: bayesian.prior(),
            boundary,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the aggregate score, clipped to `[0, 1]`.
    ///
    /// A NaN score leaves the record unchanged.
    pub fn set_score(&mut self, score: f64, now: DateTime<Utc>) {
        if score.is_nan() {
            return;
        }
        self.aggregate_score = score.clamp(0.0, 1.0);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BayesianConfig, DimensionSeeding};

    fn models() -> (BayesianModel, DimensionalModel) {
        (
            BayesianModel::new(BayesianConfig::default()),
            DimensionalModel::new(0.3, DimensionSeeding::default()),
        )
    }

    #[test]
    fn seeded_from_tier() {
        let (b, d) = models();
        let id = AgentId::parse("Cascade").unwrap();
        let record = AgentTrustRecord::seeded(id, Some(TrustTier::High), 0.5, &b, &d, Utc::now());
        assert_eq!(record.aggregate_score, 0.9);
        assert_eq!(record.dimensions, DimensionScores::uniform(0.9));
        assert_eq!(record.boundary, TrustTier::High.boundary());
        assert_eq!(record.bayesian, b.prior());
    }

    #[test]
    fn nan_score_is_ignored() {
        let (b, d) = models();
        let id = AgentId::parse("Cascade").unwrap();
        let mut record = AgentTrustRecord::seeded(id, Some(TrustTier::High), 0.5, &b, &d, Utc::now());
        record.set_score(f64::NAN, Utc::now());
        assert_eq!(record.aggregate_score, 0.9);
        record.set_score(2.0, Utc::now());
        assert_eq!(record.aggregate_score, 1.0);
    }

    #[test]
    fn seeded_without_tier_uses_neutral_score_and_medium_range() {
        let (b, d) = models();
        let id = AgentId::parse("Ghost").unwrap();
        let record = AgentTrustRecord::seeded(id, None, 0.5, &b, &d, Utc::now());
        assert_eq!(record.aggregate_score, 0.5);
        assert_eq!(record.boundary, TrustTier::Medium.boundary());
    }

    #[test]
    fn seeded_with_unrecognized_tier() {
        let (b, d) = models();
        let id = AgentId::parse("Odd").unwrap();
        let record =
            AgentTrustRecord::seeded(id, Some(TrustTier::Unrecognized), 0.5, &b, &d, Utc::now());
        assert_eq!(record.aggregate_score, 0.5);
        assert_eq!((record.boundary.min, record.boundary.max), (0.0, 0.3));
    }

    #[test]
    fn set_score_clips() {
        let (b, d) = models();
        let id = AgentId::parse("A").unwrap();
        let mut record = AgentTrustRecord::seeded(id, None, 0.5, &b, &d, Utc::now());
        record.set_score(1.7, Utc::now());
        assert_eq!(record.aggregate_score, 1.0);
        record.set_score(-0.2, Utc::now());
        assert_eq!(record.aggregate_score, 0.0);
    }
}
