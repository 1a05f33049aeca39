//! Engine configuration.
//!
//! Every numeric constant of the scoring algorithms whose value is a policy
//! choice lives here with its default. A configuration can be loaded from
//! JSON; missing fields fall back to the defaults.
//!
//! # Examples
//!
//! ```
//! use trustweave::TrustConfig;
//!
//! let config = TrustConfig::from_json_str(r#"{ "delegation_threshold": 0.7 }"#).unwrap();
//! assert!((config.delegation_threshold - 0.7).abs() < f64::EPSILON);
//! assert!((config.combination.dimensional - 0.4).abs() < f64::EPSILON);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{TrustResult, ValidationError};

/// Weights used to blend the three scoring models in full mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinationWeights {
    /// Weight of the direct (contextual + ethical) model. Default: 0.3.
    pub traditional: f64,
    /// Weight of the Beta-distribution model. Default: 0.3.
    pub bayesian: f64,
    /// Weight of the dimensional aggregate. Default: 0.4.
    pub dimensional: f64,
}

impl Default for CombinationWeights {
    fn default() -> Self {
        Self {
            traditional: 0.3,
            bayesian: 0.3,
            dimensional: 0.4,
        }
    }
}

impl CombinationWeights {
    /// Weighted blend of the three model scores.
    #[must_use]
    pub fn combine(&self, traditional: f64, bayesian: f64, dimensional: f64) -> f64 {
        traditional * self.traditional + bayesian * self.bayesian + dimensional * self.dimensional
    }
}

/// Additive nudges applied for ethically relevant events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EthicalNudges {
    /// Penalty for misinformation, deception and data manipulation. Default: 0.05.
    pub dishonesty_penalty: f64,
    /// Bonus for privacy-respecting behavior. Default: 0.03.
    pub privacy_bonus: f64,
    /// Penalty for potentially biased actions. Default: 0.04.
    pub bias_penalty: f64,
    /// Bonus for transparent behavior. Default: 0.02.
    pub transparency_bonus: f64,
    /// Bonus for accepting responsibility. Default: 0.04.
    pub accountability_bonus: f64,
}

impl Default for EthicalNudges {
    fn default() -> Self {
        Self {
            dishonesty_penalty: 0.05,
            privacy_bonus: 0.03,
            bias_penalty: 0.04,
            transparency_bonus: 0.02,
            accountability_bonus: 0.04,
        }
    }
}

/// Beta-distribution prior and evidence scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BayesianConfig {
    /// Prior successes. Default: 1.0.
    pub prior_alpha: f64,
    /// Prior failures. Default: 1.0.
    pub prior_beta: f64,
    /// Evidence added per unit of magnitude. Default: 10.0.
    pub increment_scale: f64,
}

impl Default for BayesianConfig {
    fn default() -> Self {
        Self {
            prior_alpha: 1.0,
            prior_beta: 1.0,
            increment_scale: 10.0,
        }
    }
}

/// Temporal decay settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// Age in days at which an event's weight halves. Default: 30.
    pub half_life_days: f64,
    /// Window used by `apply_time_decay` callers that do not pick one. Default: 30.
    pub default_window_days: u32,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            half_life_days: 30.0,
            default_window_days: 30,
        }
    }
}

/// Optional per-dimension variation of initial scores.
///
/// Disabled by default: every dimension starts at the seed score. When
/// enabled, each dimension is scaled by a factor in `[0.9, 1.1)` derived from
/// a keyed hash of `(seed, agent, dimension)`, so runs are reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionSeeding {
    /// Whether the variation is applied. Default: false.
    pub enabled: bool,
    /// Key mixed into the hash. Default: 0.
    pub seed: u64,
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Score reported for agents without a record. Default: 0.5.
    pub neutral_score: f64,
    /// Minimum delegatee score for a delegation to pass. Default: 0.6.
    pub delegation_threshold: f64,
    /// Dimension weight used for event types missing from the table. Default: 0.3.
    pub unknown_event_weight: f64,
    /// Model blend weights.
    pub combination: CombinationWeights,
    /// Ethical adjustments.
    pub ethics: EthicalNudges,
    /// Bayesian model settings.
    pub bayesian: BayesianConfig,
    /// Temporal decay settings.
    pub decay: DecayConfig,
    /// Initial dimension variation.
    pub dimension_seeding: DimensionSeeding,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            neutral_score: 0.5,
            delegation_threshold: 0.6,
            unknown_event_weight: 0.3,
            combination: CombinationWeights::default(),
            ethics: EthicalNudges::default(),
            bayesian: BayesianConfig::default(),
            decay: DecayConfig::default(),
            dimension_seeding: DimensionSeeding::default(),
        }
    }
}

impl TrustConfig {
    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed JSON and a validation
    /// error for out-of-range values.
    pub fn from_json_str(json: &str) -> TrustResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that all values are usable by the scoring algorithms.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ValidationError> {
        unit_range("neutral_score", self.neutral_score)?;
        unit_range("delegation_threshold", self.delegation_threshold)?;
        unit_range("unknown_event_weight", self.unknown_event_weight)?;

        let w = &self.combination;
        let sum = w.traditional + w.bayesian + w.dimensional;
        let negative = w.traditional < 0.0 || w.bayesian < 0.0 || w.dimensional < 0.0;
        if negative || !sum.is_finite() || (sum - 1.0).abs() > 1e-6 {
            return Err(ValidationError::InvalidCombinationWeights { sum });
        }

        positive("bayesian.prior_alpha", self.bayesian.prior_alpha)?;
        positive("bayesian.prior_beta", self.bayesian.prior_beta)?;
        positive("bayesian.increment_scale", self.bayesian.increment_scale)?;
        positive("decay.half_life_days", self.decay.half_life_days)?;
        Ok(())
    }
}

fn unit_range(field: &str, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::ScoreOutOfRange {
            field: field.to_string(),
            value,
        })
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositive {
            field: field.to_string(),
            value,
        })
    }
}
