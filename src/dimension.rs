//! Multi-dimensional trust.
//!
//! Trust is decomposed into six fixed dimensions. Events move the dimensions
//! they concern, weighted by a fixed event-type table, and the dimensional
//! score of an agent is the plain mean of the six.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::DimensionSeeding;
use crate::event::Outcome;

/// One axis of the trust decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustDimension {
    /// Consistency and dependability.
    Reliability,
    /// Skill and capability.
    Competence,
    /// Honesty and moral principles.
    Integrity,
    /// Care for others' interests.
    Benevolence,
    /// Open and clear communication.
    Transparency,
    /// Protection against threats.
    Security,
}

impl TrustDimension {
    /// All dimensions, in canonical order.
    pub const ALL: [Self; 6] = [
        Self::Reliability,
        Self::Competence,
        Self::Integrity,
        Self::Benevolence,
        Self::Transparency,
        Self::Security,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reliability => "reliability",
            Self::Competence => "competence",
            Self::Integrity => "integrity",
            Self::Benevolence => "benevolence",
            Self::Transparency => "transparency",
            Self::Security => "security",
        }
    }
}

impl fmt::Display for TrustDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scores of the six dimensions, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    /// Reliability score.
    pub reliability: f64,
    /// Competence score.
    pub competence: f64,
    /// Integrity score.
    pub integrity: f64,
    /// Benevolence score.
    pub benevolence: f64,
    /// Transparency score.
    pub transparency: f64,
    /// Security score.
    pub security: f64,
}

impl DimensionScores {
    /// All dimensions at `score` (clipped to `[0, 1]`).
    #[must_use]
    pub fn uniform(score: f64) -> Self {
        let s = score.clamp(0.0, 1.0);
        Self {
            reliability: s,
            competence: s,
            integrity: s,
            benevolence: s,
            transparency: s,
            security: s,
        }
    }

    /// Score of one dimension.
    #[must_use]
    pub const fn get(&self, dimension: TrustDimension) -> f64 {
        match dimension {
            TrustDimension::Reliability => self.reliability,
            TrustDimension::Competence => self.competence,
            TrustDimension::Integrity => self.integrity,
            TrustDimension::Benevolence => self.benevolence,
            TrustDimension::Transparency => self.transparency,
            TrustDimension::Security => self.security,
        }
    }

    fn slot(&mut self, dimension: TrustDimension) -> &mut f64 {
        match dimension {
            TrustDimension::Reliability => &mut self.reliability,
            TrustDimension::Competence => &mut self.competence,
            TrustDimension::Integrity => &mut self.integrity,
            TrustDimension::Benevolence => &mut self.benevolence,
            TrustDimension::Transparency => &mut self.transparency,
            TrustDimension::Security => &mut self.security,
        }
    }

    /// Sets one dimension, clipped to `[0, 1]`.
    pub fn set(&mut self, dimension: TrustDimension, score: f64) {
        *self.slot(dimension) = score.clamp(0.0, 1.0);
    }

    /// Iterates `(dimension, score)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (TrustDimension, f64)> + '_ {
        TrustDimension::ALL.into_iter().map(|d| (d, self.get(d)))
    }

    /// Arithmetic mean of the six scores.
    #[must_use]
    pub fn mean(&self) -> f64 {
        let sum: f64 = self.iter().map(|(_, s)| s).sum();
        #[allow(clippy::cast_precision_loss)]
        let count = TrustDimension::ALL.len() as f64;
        sum / count
    }
}

/// Dimensions affected by an event, with their weights in `(0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AffectedDimensions(Vec<(TrustDimension, f64)>);

impl AffectedDimensions {
    /// The affected dimensions and weights.
    #[must_use]
    pub fn entries(&self) -> &[(TrustDimension, f64)] {
        &self.0
    }

    /// Weight of `dimension`, if affected.
    #[must_use]
    pub fn weight(&self, dimension: TrustDimension) -> Option<f64> {
        self.0.iter().find(|(d, _)| *d == dimension).map(|(_, w)| *w)
    }
}

/// Fixed event-type to dimension weighting.
fn event_weights(event_type: &str) -> Option<&'static [(TrustDimension, f64)]> {
    use TrustDimension::{Benevolence, Competence, Integrity, Reliability, Security, Transparency};

    let weights: &'static [(TrustDimension, f64)] = match event_type {
        "security_breach" => &[(Security, 1.0), (Reliability, 0.5)],
        "data_leak" => &[(Security, 1.0), (Integrity, 0.7)],
        "security_check" => &[(Security, 0.8)],

        "task_completion" => &[(Reliability, 0.9), (Competence, 0.6)],
        "system_failure" => &[(Reliability, 1.0), (Competence, 0.4)],
        "response_time" => &[(Reliability, 0.7)],

        "ethical_decision" => &[(Integrity, 1.0), (Benevolence, 0.5)],
        "honesty_check" => &[(Integrity, 0.9)],
        "misinformation" => &[(Integrity, 1.0), (Transparency, 0.7)],

        "skill_assessment" => &[(Competence, 1.0)],
        "problem_solving" => &[(Competence, 0.8), (Reliability, 0.3)],
        "learning_rate" => &[(Competence, 0.6)],

        "help_behavior" => &[(Benevolence, 1.0)],
        "user_satisfaction" => &[(Benevolence, 0.8), (Competence, 0.4)],
        "agent_empathy" => &[(Benevolence, 0.9)],

        "information_sharing" => &[(Transparency, 1.0)],
        "explanation_quality" => &[(Transparency, 0.8), (Competence, 0.3)],
        "decision_visibility" => &[(Transparency, 0.7)],

        _ => return None,
    };
    Some(weights)
}

/// Maintains dimension scores and derives the dimensional aggregate.
#[derive(Debug, Clone, Copy)]
pub struct DimensionalModel {
    unknown_event_weight: f64,
    seeding: DimensionSeeding,
}

impl DimensionalModel {
    /// Creates a model.
    #[must_use]
    pub const fn new(unknown_event_weight: f64, seeding: DimensionSeeding) -> Self {
        Self {
            unknown_event_weight,
            seeding,
        }
    }

    /// Dimensions moved by an event of `event_type`.
    ///
    /// Event types missing from the table spread evenly over all dimensions.
    #[must_use]
    pub fn affected_dimensions(&self, event_type: &str) -> AffectedDimensions {
        match event_weights(event_type) {
            Some(weights) => AffectedDimensions(weights.to_vec()),
            None => AffectedDimensions(
                TrustDimension::ALL
                    .into_iter()
                    .map(|d| (d, self.unknown_event_weight))
                    .collect(),
            ),
        }
    }

    /// Dimensions named explicitly by the caller, each at full weight.
    ///
    /// A dimension listed twice is moved twice.
    #[must_use]
    pub fn explicit_dimensions(dimensions: &[TrustDimension]) -> AffectedDimensions {
        AffectedDimensions(dimensions.iter().map(|&d| (d, 1.0)).collect())
    }

    /// Moves one dimension by the signed magnitude.
    pub fn update_dimension(
        scores: &mut DimensionScores,
        dimension: TrustDimension,
        outcome: Outcome,
        magnitude: f64,
    ) {
        let current = scores.get(dimension);
        scores.set(dimension, current + outcome.signed(magnitude));
    }

    /// Applies an event to every affected dimension, scaling `magnitude` by
    /// each dimension's weight.
    pub fn apply(
        scores: &mut DimensionScores,
        affected: &AffectedDimensions,
        outcome: Outcome,
        magnitude: f64,
    ) {
        for &(dimension, weight) in affected.entries() {
            Self::update_dimension(scores, dimension, outcome, magnitude * weight);
        }
    }

    /// Dimensional aggregate.
    #[must_use]
    pub fn aggregate(scores: &DimensionScores) -> f64 {
        scores.mean()
    }

    /// Initial dimension scores for an agent seeded at `base_score`.
    #[must_use]
    pub fn initial_scores(&self, agent_id: &str, base_score: f64) -> DimensionScores {
        if !self.seeding.enabled {
            return DimensionScores::uniform(base_score);
        }
        let mut scores = DimensionScores::uniform(base_score);
        for dimension in TrustDimension::ALL {
            let h = seed_hash(self.seeding.seed, agent_id, dimension);
            #[allow(clippy::cast_precision_loss)]
            let spread = (h % 100) as f64 / 100.0;
            scores.set(dimension, base_score * (0.9 + 0.2 * spread));
        }
        scores
    }
}

fn seed_hash(seed: u64, agent_id: &str, dimension: TrustDimension) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&seed.to_le_bytes());
    hasher.update(agent_id.as_bytes());
    hasher.update(&[0]);
    hasher.update(dimension.as_str().as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> DimensionalModel {
        DimensionalModel::new(0.3, DimensionSeeding::default())
    }

    #[test]
    fn table_lookup() {
        let affected = model().affected_dimensions("task_completion");
        assert_eq!(affected.weight(TrustDimension::Reliability), Some(0.9));
        assert_eq!(affected.weight(TrustDimension::Competence), Some(0.6));
        assert_eq!(affected.weight(TrustDimension::Security), None);

        let breach = model().affected_dimensions("security_breach");
        assert_eq!(breach.weight(TrustDimension::Security), Some(1.0));
        assert_eq!(breach.weight(TrustDimension::Reliability), Some(0.5));

        let ethics = model().affected_dimensions("ethical_decision");
        assert_eq!(ethics.weight(TrustDimension::Integrity), Some(1.0));
        assert_eq!(ethics.weight(TrustDimension::Benevolence), Some(0.5));
    }

    #[test]
    fn unknown_event_spreads_evenly() {
        let affected = model().affected_dimensions("minor_error");
        assert_eq!(affected.entries().len(), 6);
        assert!(affected.entries().iter().all(|(_, w)| (*w - 0.3).abs() < f64::EPSILON));
    }

    #[test]
    fn explicit_dimensions_apply_once_per_entry() {
        let affected = DimensionalModel::explicit_dimensions(&[
            TrustDimension::Security,
            TrustDimension::Security,
            TrustDimension::Integrity,
        ]);
        assert_eq!(affected.entries().len(), 3);
        assert_eq!(affected.weight(TrustDimension::Security), Some(1.0));

        let mut scores = DimensionScores::uniform(0.5);
        DimensionalModel::apply(&mut scores, &affected, Outcome::Positive, 0.1);
        assert!((scores.security - 0.7).abs() < 1e-12);
        assert!((scores.integrity - 0.6).abs() < 1e-12);
        assert_eq!(scores.competence, 0.5);
    }

    #[test]
    fn update_clips_to_unit_range() {
        let mut scores = DimensionScores::uniform(0.95);
        DimensionalModel::update_dimension(&mut scores, TrustDimension::Security, Outcome::Positive, 0.2);
        assert_eq!(scores.security, 1.0);

        DimensionalModel::update_dimension(&mut scores, TrustDimension::Integrity, Outcome::Negative, 5.0);
        assert_eq!(scores.integrity, 0.0);

        DimensionalModel::update_dimension(&mut scores, TrustDimension::Competence, Outcome::Neutral, 0.5);
        assert_eq!(scores.competence, 0.95);
    }

    #[test]
    fn apply_scales_by_weight() {
        let mut scores = DimensionScores::uniform(0.5);
        let affected = model().affected_dimensions("task_completion");
        DimensionalModel::apply(&mut scores, &affected, Outcome::Positive, 0.1);
        assert!((scores.reliability - 0.59).abs() < 1e-12);
        assert!((scores.competence - 0.56).abs() < 1e-12);
        assert_eq!(scores.security, 0.5);
    }

    #[test]
    fn aggregate_is_mean() {
        let mut scores = DimensionScores::uniform(0.6);
        scores.set(TrustDimension::Security, 0.0);
        assert!((DimensionalModel::aggregate(&scores) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn seeding_disabled_is_uniform() {
        let scores = model().initial_scores("Cascade", 0.9);
        assert_eq!(scores, DimensionScores::uniform(0.9));
    }

    #[test]
    fn seeding_is_deterministic_and_bounded() {
        let seeded = DimensionalModel::new(0.3, DimensionSeeding { enabled: true, seed: 42 });
        let a = seeded.initial_scores("Cascade", 0.9);
        let b = seeded.initial_scores("Cascade", 0.9);
        assert_eq!(a, b);
        for (_, score) in a.iter() {
            assert!((0.8..=1.0).contains(&score), "score {score} outside seeded spread");
        }

        let other_seed = DimensionalModel::new(0.3, DimensionSeeding { enabled: true, seed: 43 });
        assert_ne!(a, other_seed.initial_scores("Cascade", 0.9));
    }
}
