//! # trustweave - Auditable Trust Scoring for Multi-Agent Systems
//!
//! trustweave keeps a dynamic trust score per agent, updates it from observed
//! interactions, and uses it to gate delegation between agents. Every update
//! attempt is written to an append-only audit log.
//!
//! ## Core Concepts
//!
//! - **Baseline**: the configured tier, delegation scope and allowed delegatees of an agent
//! - **Trust record**: an agent's aggregate score, six dimension scores, Beta parameters and boundary
//! - **Trust event**: one audited update attempt, applied or rejected
//! - **Update mode**: `simple` direct adjustment, or `full` blend of a contextual,
//!   a Bayesian and a dimensional model with soft boundary enforcement
//! - **Temporal decay**: rescoring from recent history, older events weighing less
//!
//! ## Usage
//!
//! ```rust
//! use trustweave::{TrustConfig, TrustEngine, TrustUpdate, UpdateMode};
//!
//! let engine = TrustEngine::new(TrustConfig::default());
//! engine.load_baselines_from_json(r#"{
//!     "trust_rules": [
//!         { "agent": "UserA", "level": "medium", "delegation": "partial", "can_delegate_to": ["ToolX"] },
//!         { "agent": "ToolX", "level": "medium", "delegation": "none" }
//!     ]
//! }"#);
//!
//! assert!(engine.can_delegate_action("UserA", "ToolX", "summarize"));
//!
//! let event = engine.update_trust_score(
//!     TrustUpdate::new("ToolX", "task_completion", "negative").with_mode(UpdateMode::Full),
//! );
//! assert!(event.success);
//! assert!(engine.get_trust_score("ToolX") < 0.65);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod agent;
pub mod boundary;
pub mod config;
pub mod error;
pub mod event;
pub mod tier;
pub mod time;

// Models
pub mod bayesian;
pub mod decay;
pub mod delegation;
pub mod dimension;

// State and orchestration
pub mod baseline;
pub mod engine;
pub mod record;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use agent::AgentId;
pub use baseline::{BaselineSet, DelegateTargets, DelegationBaseline, DelegationScope};
pub use bayesian::{BayesianModel, BetaParams};
pub use boundary::{BoundaryCheck, BoundaryEnforcer, TrustBoundary, WarningLevel};
pub use config::{
    BayesianConfig, CombinationWeights, DecayConfig, DimensionSeeding, EthicalNudges, TrustConfig,
};
pub use decay::{DecaySummary, TemporalDecayProcessor};
pub use delegation::{DelegationDecision, DelegationPolicyEvaluator};
pub use dimension::{AffectedDimensions, DimensionScores, DimensionalModel, TrustDimension};
pub use engine::{TrustEngine, TrustUpdate, UpdateMode};
pub use error::{BaselineError, TrustError, TrustResult, ValidationError};
pub use event::{
    ContextualFactors, EventContext, FullBreakdown, Outcome, TrustEvent, TrustEventId,
    UpdateDetails,
};
pub use record::AgentTrustRecord;
pub use storage::{
    AuditLog, AuditQuery, InMemoryAuditLog, InMemoryRecordStore, StorageError, TrustRecordStore,
};
pub use tier::{TrustStanding, TrustTier};
pub use time::{Clock, ManualClock, SystemClock};
