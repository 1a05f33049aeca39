//! Trust update strategies.
//!
//! `update_trust_score` validates its input, resolves the agent's record and
//! recent history, then hands the work to one of two strategies selected by
//! [`UpdateMode`]:
//!
//! - [`SimpleUpdate`] moves the score by the signed magnitude.
//! - [`FullUpdate`] blends a context-adjusted direct model with the Bayesian
//!   and dimensional models and softly enforces the agent's boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bayesian::BayesianModel;
use crate::boundary::BoundaryEnforcer;
use crate::config::{CombinationWeights, EthicalNudges};
use crate::dimension::{DimensionalModel, TrustDimension};
use crate::event::{
    BayesianBreakdown, ContextualFactors, DimensionalBreakdown, EventContext, FullBreakdown,
    Outcome, TraditionalBreakdown, TrustEvent, UpdateDetails,
};
use crate::record::AgentTrustRecord;

/// Number of recent audit entries consulted for frequency and trend.
pub(crate) const HISTORY_WINDOW: usize = 5;

const FREQUENCY_STEP: f64 = 0.1;
const FREQUENCY_FLOOR: f64 = 0.5;
const CRITICAL_MULTIPLIER: f64 = 1.5;
const REINFORCING_FACTOR: f64 = 0.9;
const CORRECTING_FACTOR: f64 = 1.1;

const CRITICAL_EVENT_TYPES: [&str; 3] = ["security_breach", "ethical_violation", "critical_failure"];
const DISHONESTY_EVENT_TYPES: [&str; 3] = ["misinformation", "deception", "data_manipulation"];

/// Which update model to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Direct adjustment by the signed magnitude.
    #[default]
    Simple,
    /// Contextual, Bayesian and dimensional blend with boundary enforcement.
    Full,
}

fn default_magnitude() -> f64 {
    TrustUpdate::DEFAULT_MAGNITUDE
}

/// A request to update an agent's trust.
///
/// # Examples
///
/// ```
/// use trustweave::{EventContext, TrustUpdate, UpdateMode};
///
/// let update = TrustUpdate::new("Cascade", "task_completion", "positive")
///     .with_magnitude(0.05)
///     .with_reason("finished the report")
///     .with_context(EventContext::new().with_transparent())
///     .with_mode(UpdateMode::Full);
/// assert_eq!(update.magnitude, 0.05);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustUpdate {
    /// Agent concerned. Surrounding whitespace is ignored.
    pub agent_id: String,
    /// Kind of interaction.
    pub event_type: String,
    /// `positive`, `negative` or `neutral`, in any case.
    pub outcome: String,
    /// Size of the change. Default: 0.1.
    #[serde(default = "default_magnitude")]
    pub magnitude: f64,
    /// Free-text justification.
    #[serde(default)]
    pub reason: String,
    /// Circumstances of the event.
    #[serde(default)]
    pub context: EventContext,
    /// Dimensions to move instead of the event-type table.
    #[serde(default)]
    pub dimensions: Vec<TrustDimension>,
    /// Update model. Default: simple.
    #[serde(default)]
    pub mode: UpdateMode,
}

impl TrustUpdate {
    /// Magnitude used when the caller gives none.
    pub const DEFAULT_MAGNITUDE: f64 = 0.1;

    /// Creates a simple-mode update with the default magnitude.
    #[must_use]
    pub fn new(
        agent_id: impl Into<String>,
        event_type: impl Into<String>,
        outcome: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            event_type: event_type.into(),
            outcome: outcome.into(),
            magnitude: Self::DEFAULT_MAGNITUDE,
            reason: String::new(),
            context: EventContext::default(),
            dimensions: Vec::new(),
            mode: UpdateMode::Simple,
        }
    }

    /// Sets the magnitude.
    #[must_use]
    pub const fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = magnitude;
        self
    }

    /// Sets the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Sets the context.
    #[must_use]
    pub fn with_context(mut self, context: EventContext) -> Self {
        self.context = context;
        self
    }

    /// Names the dimensions to move.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: impl IntoIterator<Item = TrustDimension>) -> Self {
        self.dimensions = dimensions.into_iter().collect();
        self
    }

    /// Sets the update mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: UpdateMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Recent audit history of one agent, as seen before the current event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentHistory {
    /// Entries of the same event type among the last few of that type.
    pub same_type_count: usize,
    /// Adjustments of the agent's most recent entries, oldest first.
    pub recent_adjustments: Vec<f64>,
}

impl RecentHistory {
    /// Builds the history from audit query results.
    #[must_use]
    pub fn from_entries(same_type: &[TrustEvent], recent: &[TrustEvent]) -> Self {
        let skip = recent.len().saturating_sub(HISTORY_WINDOW);
        Self {
            same_type_count: same_type.len().min(HISTORY_WINDOW),
            recent_adjustments: recent[skip..].iter().map(|e| e.adjustment).collect(),
        }
    }

    /// Mean recent adjustment; 0 with fewer than two entries.
    #[must_use]
    pub fn trend(&self) -> f64 {
        if self.recent_adjustments.len() < 2 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.recent_adjustments.len() as f64;
        self.recent_adjustments.iter().sum::<f64>() / n
    }
}

/// Validated input shared by both strategies.
#[derive(Debug, Clone, Copy)]
pub struct UpdateInputs<'a> {
    /// Parsed outcome.
    pub outcome: Outcome,
    /// Finite magnitude.
    pub magnitude: f64,
    /// Kind of interaction.
    pub event_type: &'a str,
    /// Circumstances of the event.
    pub context: &'a EventContext,
    /// Explicit dimensions; empty means use the event-type table.
    pub dimensions: &'a [TrustDimension],
    /// Agent history before this event.
    pub history: &'a RecentHistory,
}

/// Contextual factors for an event.
#[must_use]
pub fn contextual_factors(inputs: &UpdateInputs<'_>) -> ContextualFactors {
    let significance = inputs.context.significance();

    #[allow(clippy::cast_precision_loss)]
    let repeats = inputs.history.same_type_count as f64;
    let frequency_dampening = (1.0 - FREQUENCY_STEP * repeats).max(FREQUENCY_FLOOR);

    let critical_multiplier = if CRITICAL_EVENT_TYPES.contains(&inputs.event_type) {
        CRITICAL_MULTIPLIER
    } else {
        1.0
    };

    let trend = inputs.history.trend();
    let trend_factor = match inputs.outcome {
        Outcome::Positive if trend > 0.0 => REINFORCING_FACTOR,
        Outcome::Negative if trend < 0.0 => REINFORCING_FACTOR,
        Outcome::Positive if trend < 0.0 => CORRECTING_FACTOR,
        Outcome::Negative if trend > 0.0 => CORRECTING_FACTOR,
        _ => 1.0,
    };

    ContextualFactors {
        significance,
        frequency_dampening,
        critical_multiplier,
        trend_factor,
        multiplier: (significance * frequency_dampening * critical_multiplier * trend_factor)
            .clamp(-f64::MAX, f64::MAX),
    }
}

/// Additive ethical nudge for an event.
#[must_use]
pub fn ethical_adjustment(nudges: &EthicalNudges, event_type: &str, context: &EventContext) -> f64 {
    let mut adjustment = 0.0;
    if DISHONESTY_EVENT_TYPES.contains(&event_type) {
        adjustment -= nudges.dishonesty_penalty;
    }
    if event_type == "privacy_protection" || context.privacy_respecting {
        adjustment += nudges.privacy_bonus;
    }
    if context.potentially_biased {
        adjustment -= nudges.bias_penalty;
    }
    if context.transparent {
        adjustment += nudges.transparency_bonus;
    }
    if event_type == "accepted_responsibility" || context.accountable {
        adjustment += nudges.accountability_bonus;
    }
    adjustment
}

/// A way of applying an event to an agent's record.
pub trait UpdateStrategy {
    /// Name of the strategy (for logs).
    fn name(&self) -> &str;

    /// Applies the event to `record` and describes what was done.
    ///
    /// On return `record.aggregate_score` holds the new score.
    fn apply(
        &self,
        record: &mut AgentTrustRecord,
        inputs: &UpdateInputs<'_>,
        now: DateTime<Utc>,
    ) -> UpdateDetails;
}

/// Direct adjustment by the signed magnitude.
#[derive(Debug, Clone, Copy)]
pub struct SimpleUpdate<'a> {
    ethics: &'a EthicalNudges,
}

impl<'a> SimpleUpdate<'a> {
    /// Creates the strategy.
    #[must_use]
    pub const fn new(ethics: &'a EthicalNudges) -> Self {
        Self { ethics }
    }
}

impl UpdateStrategy for SimpleUpdate<'_> {
    fn name(&self) -> &str {
        "simple"
    }

    fn apply(
        &self,
        record: &mut AgentTrustRecord,
        inputs: &UpdateInputs<'_>,
        now: DateTime<Utc>,
    ) -> UpdateDetails {
        let base = inputs.outcome.signed(inputs.magnitude);
        record.set_score(record.aggregate_score + base, now);

        UpdateDetails::Simple {
            contextual: contextual_factors(inputs),
            ethical_adjustment: ethical_adjustment(self.ethics, inputs.event_type, inputs.context),
        }
    }
}

/// Multi-model update.
#[derive(Debug, Clone, Copy)]
pub struct FullUpdate<'a> {
    combination: &'a CombinationWeights,
    ethics: &'a EthicalNudges,
    bayesian: &'a BayesianModel,
    dimensional: &'a DimensionalModel,
}

impl<'a> FullUpdate<'a> {
    /// Creates the strategy.
    #[must_use]
    pub const fn new(
        combination: &'a CombinationWeights,
        ethics: &'a EthicalNudges,
        bayesian: &'a BayesianModel,
        dimensional: &'a DimensionalModel,
    ) -> Self {
        Self {
            combination,
            ethics,
            bayesian,
            dimensional,
        }
    }
}

impl UpdateStrategy for FullUpdate<'_> {
    fn name(&self) -> &str {
        "full"
    }

    fn apply(
        &self,
        record: &mut AgentTrustRecord,
        inputs: &UpdateInputs<'_>,
        now: DateTime<Utc>,
    ) -> UpdateDetails {
        let original = record.aggregate_score;
        let base = inputs.outcome.signed(inputs.magnitude);

        let contextual = contextual_factors(inputs);
        let ethical = ethical_adjustment(self.ethics, inputs.event_type, inputs.context);
        let direct = if base == 0.0 { 0.0 } else { base * contextual.multiplier };
        let traditional = (original + direct + ethical).clamp(0.0, 1.0);

        self.bayesian
            .update(&mut record.bayesian, inputs.outcome, inputs.magnitude);
        let bayesian_score = BayesianModel::score(&record.bayesian);

        let affected = if inputs.dimensions.is_empty() {
            self.dimensional.affected_dimensions(inputs.event_type)
        } else {
            DimensionalModel::explicit_dimensions(inputs.dimensions)
        };
        DimensionalModel::apply(
            &mut record.dimensions,
            &affected,
            inputs.outcome,
            inputs.magnitude,
        );
        let dimensional_score = DimensionalModel::aggregate(&record.dimensions);

        let combined = self
            .combination
            .combine(traditional, bayesian_score, dimensional_score);
        let boundary = BoundaryEnforcer::check(combined, &record.boundary);
        let enforced = BoundaryEnforcer::soft_clamp(combined, record.boundary.min, record.boundary.max);
        if !boundary.within_bounds {
            warn!(
                agent_id = %record.agent_id,
                combined,
                enforced,
                min = record.boundary.min,
                max = record.boundary.max,
                "score outside boundary, soft enforcement applied"
            );
        }
        record.set_score(enforced, now);

        debug!(
            agent_id = %record.agent_id,
            traditional,
            bayesian = bayesian_score,
            dimensional = dimensional_score,
            combined,
            "full update combined"
        );

        UpdateDetails::Full(Box::new(FullBreakdown {
            traditional: TraditionalBreakdown {
                score: traditional,
                weight: self.combination.traditional,
                contextual,
                ethical_adjustment: ethical,
            },
            bayesian: BayesianBreakdown {
                score: bayesian_score,
                weight: self.combination.bayesian,
                alpha: record.bayesian.alpha,
                beta: record.bayesian.beta,
            },
            dimensional: DimensionalBreakdown {
                score: dimensional_score,
                weight: self.combination.dimensional,
                dimensions: record.dimensions,
            },
            combined_score: combined,
            boundary,
            soft_clamped: !boundary.within_bounds,
        }))
    }
}
