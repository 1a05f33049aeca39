//! Trust events and their audit representation.
//!
//! A `TrustEvent` is written for every call to `update_trust_score`, whether
//! the update was applied or rejected. Events are immutable once appended.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryCheck;
use crate::dimension::DimensionScores;
use crate::error::ValidationError;

/// Unique identifier of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustEventId(uuid::Uuid);

impl TrustEventId {
    /// Creates a new random event ID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for TrustEventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrustEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of an observed interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The agent behaved as expected or better.
    Positive,
    /// The agent misbehaved or failed.
    Negative,
    /// Informational; no score change.
    Neutral,
}

impl Outcome {
    /// Parses an outcome name, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnrecognizedOutcome` for any other value.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            _ => Err(ValidationError::UnrecognizedOutcome {
                value: raw.to_string(),
            }),
        }
    }

    /// Applies the outcome's sign to a magnitude.
    #[must_use]
    pub fn signed(self, magnitude: f64) -> f64 {
        match self {
            Self::Positive => magnitude.abs(),
            Self::Negative => -magnitude.abs(),
            Self::Neutral => 0.0,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl FromStr for Outcome {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Circumstances of a trust event.
///
/// The recognized fields feed the contextual and ethical adjustments of full
/// mode. Anything else a caller attaches is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventContext {
    /// Multiplier for the event's importance. Absent means 1.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub significance: Option<f64>,
    /// The agent protected private data.
    pub privacy_respecting: bool,
    /// The action may have been biased.
    pub potentially_biased: bool,
    /// The agent explained itself openly.
    pub transparent: bool,
    /// The agent took responsibility for the outcome.
    pub accountable: bool,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EventContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the significance multiplier.
    #[must_use]
    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = Some(significance);
        self
    }

    /// Marks the event as privacy respecting.
    #[must_use]
    pub fn with_privacy_respecting(mut self) -> Self {
        self.privacy_respecting = true;
        self
    }

    /// Marks the event as potentially biased.
    #[must_use]
    pub fn with_potentially_biased(mut self) -> Self {
        self.potentially_biased = true;
        self
    }

    /// Marks the event as transparent.
    #[must_use]
    pub fn with_transparent(mut self) -> Self {
        self.transparent = true;
        self
    }

    /// Marks the event as accountable.
    #[must_use]
    pub fn with_accountable(mut self) -> Self {
        self.accountable = true;
        self
    }

    /// Attaches an unrecognized field.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Effective significance multiplier.
    #[must_use]
    pub fn significance(&self) -> f64 {
        self.significance.filter(|s| s.is_finite()).unwrap_or(1.0)
    }
}

/// Factors that scale the base adjustment in full mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextualFactors {
    /// Caller-provided significance.
    pub significance: f64,
    /// Dampening for repeated events of the same type.
    pub frequency_dampening: f64,
    /// Amplification for critical event types.
    pub critical_multiplier: f64,
    /// Dampening when reinforcing the recent trend, amplification when correcting it.
    pub trend_factor: f64,
    /// Product of all factors.
    pub multiplier: f64,
}

/// Direct-adjustment component of a full-mode update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraditionalBreakdown {
    /// Model score.
    pub score: f64,
    /// Blend weight.
    pub weight: f64,
    /// Contextual factors applied.
    pub contextual: ContextualFactors,
    /// Sum of ethical nudges applied.
    pub ethical_adjustment: f64,
}

/// Beta-distribution component of a full-mode update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BayesianBreakdown {
    /// Model score.
    pub score: f64,
    /// Blend weight.
    pub weight: f64,
    /// Accumulated positive evidence.
    pub alpha: f64,
    /// Accumulated negative evidence.
    pub beta: f64,
}

/// Dimensional component of a full-mode update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionalBreakdown {
    /// Mean of the dimension scores.
    pub score: f64,
    /// Blend weight.
    pub weight: f64,
    /// Dimension scores after the update.
    pub dimensions: DimensionScores,
}

/// Per-model breakdown of a full-mode update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullBreakdown {
    /// Direct adjustment model.
    pub traditional: TraditionalBreakdown,
    /// Bayesian model.
    pub bayesian: BayesianBreakdown,
    /// Dimensional model.
    pub dimensional: DimensionalBreakdown,
    /// Weighted blend before boundary enforcement.
    pub combined_score: f64,
    /// Check of the blended score against the agent's boundary.
    pub boundary: BoundaryCheck,
    /// Whether soft enforcement changed the score.
    pub soft_clamped: bool,
}

/// Structured explanation attached to an audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum UpdateDetails {
    /// The update was refused.
    Rejected {
        /// Why.
        message: String,
    },
    /// Direct adjustment. The factors are informational only.
    Simple {
        /// Factors full mode would have applied.
        contextual: ContextualFactors,
        /// Ethical nudge full mode would have applied.
        ethical_adjustment: f64,
    },
    /// Multi-model update.
    Full(Box<FullBreakdown>),
}

/// Identifying fields of an audit entry, shared by accepted and rejected updates.
#[derive(Debug, Clone)]
pub(crate) struct EventHeader {
    pub timestamp: DateTime<Utc>,
    pub agent_id: String,
    pub event_type: String,
    pub outcome: String,
    pub magnitude: f64,
    pub reason: String,
}

/// One entry of the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustEvent {
    /// Unique entry id.
    pub id: TrustEventId,
    /// When the update was attempted (UTC).
    pub timestamp: DateTime<Utc>,
    /// Agent concerned, as supplied after trimming.
    pub agent_id: String,
    /// Kind of interaction.
    pub event_type: String,
    /// Outcome as supplied; lowercase when recognized.
    pub outcome: String,
    /// Requested magnitude.
    pub magnitude: f64,
    /// Score before the update.
    pub original_score: f64,
    /// Applied change (`new_score - original_score`).
    pub adjustment: f64,
    /// Score after the update.
    pub new_score: f64,
    /// Free-text justification.
    pub reason: String,
    /// Whether the update was applied.
    pub success: bool,
    /// Structured breakdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<UpdateDetails>,
}

impl TrustEvent {
    pub(crate) fn applied(
        header: EventHeader,
        original_score: f64,
        new_score: f64,
        details: UpdateDetails,
    ) -> Self {
        Self::from_header(header, original_score, new_score, true, details)
    }

    pub(crate) fn rejected(header: EventHeader, score: f64, message: impl Into<String>) -> Self {
        let details = UpdateDetails::Rejected {
            message: message.into(),
        };
        Self::from_header(header, score, score, false, details)
    }

    fn from_header(
        header: EventHeader,
        original_score: f64,
        new_score: f64,
        success: bool,
        details: UpdateDetails,
    ) -> Self {
        Self {
            id: TrustEventId::new(),
            timestamp: header.timestamp,
            agent_id: header.agent_id,
            event_type: header.event_type,
            outcome: header.outcome,
            magnitude: header.magnitude,
            original_score: round4(original_score),
            adjustment: round4(new_score - original_score),
            new_score: round4(new_score),
            reason: header.reason,
            success,
            details: Some(details),
        }
    }

    /// Score the event left the agent with, as used by temporal decay.
    #[must_use]
    pub fn resulting_score(&self) -> f64 {
        self.original_score + self.adjustment
    }
}

/// Rounds to the four decimals kept in audit entries.
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> EventHeader {
        EventHeader {
            timestamp: Utc::now(),
            agent_id: "Cascade".to_string(),
            event_type: "task_completion".to_string(),
            outcome: "positive".to_string(),
            magnitude: 0.05,
            reason: "done".to_string(),
        }
    }

    #[test]
    fn outcome_parse_is_case_insensitive() {
        assert_eq!(Outcome::parse("Positive").unwrap(), Outcome::Positive);
        assert_eq!(" NEGATIVE ".parse::<Outcome>().unwrap(), Outcome::Negative);
        assert_eq!(Outcome::parse("neutral").unwrap(), Outcome::Neutral);
        assert!(Outcome::parse("bogus").is_err());
    }

    #[test]
    fn outcome_signed_uses_absolute_magnitude() {
        assert_eq!(Outcome::Positive.signed(-0.2), 0.2);
        assert_eq!(Outcome::Negative.signed(0.2), -0.2);
        assert_eq!(Outcome::Neutral.signed(0.2), 0.0);
    }

    #[test]
    fn context_round_trips_unknown_fields() {
        let json = r#"{ "significance": 2.0, "transparent": true, "channel": "chat" }"#;
        let ctx: EventContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.significance(), 2.0);
        assert!(ctx.transparent);
        assert!(!ctx.accountable);
        assert_eq!(ctx.extra.get("channel"), Some(&serde_json::json!("chat")));
    }

    #[test]
    fn context_defaults_significance() {
        assert_eq!(EventContext::new().significance(), 1.0);
        assert_eq!(EventContext::new().with_significance(f64::NAN).significance(), 1.0);
    }

    #[test]
    fn applied_event_rounds_scores() {
        let event = TrustEvent::applied(
            header(),
            0.123_456,
            0.234_567,
            UpdateDetails::Rejected {
                message: String::new(),
            },
        );
        assert_eq!(event.original_score, 0.1235);
        assert_eq!(event.new_score, 0.2346);
        assert_eq!(event.adjustment, 0.1111);
        assert!(event.success);
    }

    #[test]
    fn rejected_event_keeps_score() {
        let event = TrustEvent::rejected(header(), 0.9, "invalid outcome");
        assert!(!event.success);
        assert_eq!(event.adjustment, 0.0);
        assert_eq!(event.original_score, event.new_score);
        assert!(matches!(event.details, Some(UpdateDetails::Rejected { .. })));
    }

    #[test]
    fn serialized_event_has_audit_fields() {
        let event = TrustEvent::rejected(header(), 0.9, "invalid outcome");
        let value = serde_json::to_value(&event).unwrap();
        for field in [
            "timestamp",
            "agent_id",
            "event_type",
            "outcome",
            "original_score",
            "adjustment",
            "new_score",
            "reason",
            "success",
            "details",
        ] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
        assert_eq!(value["details"]["mode"], "rejected");
    }
}
