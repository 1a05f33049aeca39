//! Bayesian trust.
//!
//! Trust is represented as a Beta distribution: `alpha` accumulates positive
//! evidence, `beta` negative evidence, and the point estimate is the
//! distribution mean `alpha / (alpha + beta)`.

use serde::{Deserialize, Serialize};

use crate::config::BayesianConfig;
use crate::event::Outcome;

/// Beta-distribution parameters. Both stay strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaParams {
    /// Accumulated positive evidence.
    pub alpha: f64,
    /// Accumulated negative evidence.
    pub beta: f64,
}

impl BetaParams {
    /// Mean of the distribution, clipped to `[0, 1]`; 0.5 when undefined.
    #[must_use]
    pub fn mean(&self) -> f64 {
        match (self.alpha.is_infinite(), self.beta.is_infinite()) {
            (true, false) => return 1.0,
            (false, true) => return 0.0,
            _ => {}
        }
        // Halved so two large finite counts cannot overflow the sum.
        let (alpha, beta) = (self.alpha / 2.0, self.beta / 2.0);
        let total = alpha + beta;
        if total == 0.0 || !total.is_finite() {
            return 0.5;
        }
        (alpha / total).clamp(0.0, 1.0)
    }
}

/// Updates Beta parameters from event outcomes.
#[derive(Debug, Clone, Copy)]
pub struct BayesianModel {
    config: BayesianConfig,
}

impl BayesianModel {
    /// Creates a model.
    #[must_use]
    pub const fn new(config: BayesianConfig) -> Self {
        Self { config }
    }

    /// Parameters for an agent with no evidence yet.
    #[must_use]
    pub const fn prior(&self) -> BetaParams {
        BetaParams {
            alpha: self.config.prior_alpha,
            beta: self.config.prior_beta,
        }
    }

    /// Adds the evidence of one event.
    ///
    /// The increment is `|magnitude| * increment_scale`, added to `alpha` for
    /// positive outcomes and to `beta` for negative ones. Both saturate at
    /// `f64::MAX`.
    pub fn update(&self, params: &mut BetaParams, outcome: Outcome, magnitude: f64) {
        let increment = magnitude.abs() * self.config.increment_scale;
        match outcome {
            Outcome::Positive => params.alpha = (params.alpha + increment).min(f64::MAX),
            Outcome::Negative => params.beta = (params.beta + increment).min(f64::MAX),
            Outcome::Neutral => {}
        }
    }

    /// Point estimate of trust.
    #[must_use]
    pub fn score(params: &BetaParams) -> f64 {
        params.mean()
    }
}
