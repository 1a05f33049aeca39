//! Delegation gating.
//!
//! A delegation is allowed when the delegator's baseline grants a scope other
//! than `none`, lists the delegatee (or `*`), and the delegatee's current
//! score reaches the delegation threshold.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::baseline::{BaselineSet, DelegationScope};

/// Outcome of a delegation check, with the reason for a refusal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum DelegationDecision {
    /// Delegation is allowed.
    Allowed {
        /// Delegatee's score at the time of the check.
        delegatee_score: f64,
    },
    /// The delegator has no baseline rule.
    NoBaseline,
    /// The delegator's scope is `none`.
    ScopeNone,
    /// The delegatee is not in the delegator's list.
    DelegateeNotAllowed,
    /// The delegatee's score is under the threshold.
    BelowThreshold {
        /// Delegatee's score at the time of the check.
        delegatee_score: f64,
        /// Required score.
        threshold: f64,
    },
}

impl DelegationDecision {
    /// Whether the delegation may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Applies baseline rules and the score threshold to delegation requests.
#[derive(Debug, Clone, Copy)]
pub struct DelegationPolicyEvaluator {
    threshold: f64,
}

impl DelegationPolicyEvaluator {
    /// Creates an evaluator requiring `threshold` from delegatees.
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Evaluates a delegation from `delegator` to `delegatee`.
    ///
    /// `delegatee_score` is only consulted once the baseline checks pass.
    pub fn evaluate(
        &self,
        baselines: &BaselineSet,
        delegator: &str,
        delegatee: &str,
        action: &str,
        delegatee_score: impl FnOnce() -> f64,
    ) -> DelegationDecision {
        debug!(delegator, delegatee, action, "assessing delegation");

        let Some(baseline) = baselines.get(delegator) else {
            warn!(delegator, "delegation denied: delegator has no baseline");
            return DelegationDecision::NoBaseline;
        };

        if baseline.scope == DelegationScope::None {
            info!(delegator, "delegation denied: scope is none");
            return DelegationDecision::ScopeNone;
        }

        if !baseline.delegatees.allows(delegatee) {
            info!(delegator, delegatee, "delegation denied: delegatee not allowed");
            return DelegationDecision::DelegateeNotAllowed;
        }

        let score = delegatee_score();
        if score < self.threshold {
            info!(
                delegatee,
                score,
                threshold = self.threshold,
                "delegation denied: delegatee score below threshold"
            );
            return DelegationDecision::BelowThreshold {
                delegatee_score: score,
                threshold: self.threshold,
            };
        }

        info!(delegator, delegatee, score, "delegation allowed");
        DelegationDecision::Allowed {
            delegatee_score: score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentId;
    use crate::baseline::{DelegateTargets, DelegationBaseline};
    use crate::tier::TrustTier;

    fn baselines() -> BaselineSet {
        let id = |s: &str| AgentId::parse(s).unwrap();
        [
            DelegationBaseline::new(id("Cascade"), TrustTier::High)
                .with_scope(DelegationScope::Full)
                .with_delegatees(DelegateTargets::Any),
            DelegationBaseline::new(id("UserA"), TrustTier::Medium)
                .with_scope(DelegationScope::Partial)
                .with_delegatees(DelegateTargets::from_ids(["ToolX", "ToolY"])),
            DelegationBaseline::new(id("ToolX"), TrustTier::Medium),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn allowed_when_all_checks_pass() {
        let eval = DelegationPolicyEvaluator::new(0.6);
        let d = eval.evaluate(&baselines(), "UserA", "ToolX", "read", || 0.65);
        assert_eq!(d, DelegationDecision::Allowed { delegatee_score: 0.65 });
        assert!(d.is_allowed());
    }

    #[test]
    fn threshold_is_inclusive() {
        let eval = DelegationPolicyEvaluator::new(0.6);
        assert!(eval.evaluate(&baselines(), "UserA", "ToolX", "read", || 0.6).is_allowed());
        assert!(matches!(
            eval.evaluate(&baselines(), "UserA", "ToolX", "read", || 0.5),
            DelegationDecision::BelowThreshold { .. }
        ));
    }

    #[test]
    fn baseline_refusals_skip_score_lookup() {
        let eval = DelegationPolicyEvaluator::new(0.6);
        let never = || -> f64 { panic!("score should not be consulted") };
        assert_eq!(
            eval.evaluate(&baselines(), "Nobody", "ToolX", "read", never),
            DelegationDecision::NoBaseline
        );
        assert_eq!(
            eval.evaluate(&baselines(), "ToolX", "UserA", "read", never),
            DelegationDecision::ScopeNone
        );
        assert_eq!(
            eval.evaluate(&baselines(), "UserA", "ToolZ", "read", never),
            DelegationDecision::DelegateeNotAllowed
        );
    }

    #[test]
    fn wildcard_allows_anyone() {
        let eval = DelegationPolicyEvaluator::new(0.6);
        assert!(eval.evaluate(&baselines(), "Cascade", "Anyone", "write", || 0.9).is_allowed());
    }
}
