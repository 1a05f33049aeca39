//! The trust engine.
//!
//! [`TrustEngine`] owns the record store, the audit log, the baseline set and
//! the per-agent locks, and exposes every public trust operation. It always
//! answers: invalid input and storage failures are logged and turned into
//! safe defaults (or a failed audit entry for updates), never into panics.
//!
//! Locking: an engine-wide lifecycle lock is held shared by updates and decay
//! and exclusively by baseline reloads. Mutations of one agent additionally
//! hold that agent's mutex for the whole read-modify-write-append. Reads take
//! neither.

mod locks;
mod update;

pub use update::{
    contextual_factors, ethical_adjustment, FullUpdate, RecentHistory, SimpleUpdate, TrustUpdate,
    UpdateInputs, UpdateMode, UpdateStrategy,
};

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::agent::AgentId;
use crate::baseline::BaselineSet;
use crate::bayesian::BayesianModel;
use crate::boundary::{BoundaryCheck, BoundaryEnforcer};
use crate::config::TrustConfig;
use crate::decay::{DecaySummary, TemporalDecayProcessor};
use crate::delegation::{DelegationDecision, DelegationPolicyEvaluator};
use crate::dimension::{DimensionScores, DimensionalModel, TrustDimension};
use crate::error::{TrustResult, ValidationError};
use crate::event::{EventHeader, Outcome, TrustEvent};
use crate::record::AgentTrustRecord;
use crate::storage::{
    AuditLog, AuditQuery, InMemoryAuditLog, InMemoryRecordStore, StorageError, TrustRecordStore,
};
use crate::tier::{TrustStanding, TrustTier};
use crate::time::{Clock, SystemClock};

use locks::AgentLocks;
use update::HISTORY_WINDOW;

/// Multi-model trust engine.
pub struct TrustEngine {
    config: TrustConfig,
    records: Arc<dyn TrustRecordStore>,
    audit: Arc<dyn AuditLog>,
    baselines: RwLock<BaselineSet>,
    locks: AgentLocks,
    lifecycle: RwLock<()>,
    clock: Arc<dyn Clock>,
    bayesian: BayesianModel,
    dimensional: DimensionalModel,
    decay: TemporalDecayProcessor,
    delegation: DelegationPolicyEvaluator,
}

impl Default for TrustEngine {
    fn default() -> Self {
        Self::new(TrustConfig::default())
    }
}

impl TrustEngine {
    /// Creates an engine with in-memory storage and the system clock.
    #[must_use]
    pub fn new(config: TrustConfig) -> Self {
        Self::with_stores(
            config,
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(InMemoryAuditLog::new()),
        )
    }

    /// Creates an engine over the given stores.
    #[must_use]
    pub fn with_stores(
        config: TrustConfig,
        records: Arc<dyn TrustRecordStore>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        let bayesian = BayesianModel::new(config.bayesian);
        let dimensional = DimensionalModel::new(config.unknown_event_weight, config.dimension_seeding);
        let decay = TemporalDecayProcessor::new(config.decay.half_life_days);
        let delegation = DelegationPolicyEvaluator::new(config.delegation_threshold);
        Self {
            config,
            records,
            audit,
            baselines: RwLock::new(BaselineSet::new()),
            locks: AgentLocks::default(),
            lifecycle: RwLock::new(()),
            clock: Arc::new(SystemClock),
            bayesian,
            dimensional,
            decay,
            delegation,
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validates `config` and creates an in-memory engine.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::Validation` if the configuration is inconsistent.
    pub fn try_new(config: TrustConfig) -> TrustResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// The engine configuration.
    #[must_use]
    pub const fn config(&self) -> &TrustConfig {
        &self.config
    }

    /// The record store.
    #[must_use]
    pub fn record_store(&self) -> &Arc<dyn TrustRecordStore> {
        &self.records
    }

    /// The audit log.
    #[must_use]
    pub fn audit_log(&self) -> &Arc<dyn AuditLog> {
        &self.audit
    }

    // ------------------------------------------------------------------
    // Baselines
    // ------------------------------------------------------------------

    /// Replaces the baseline set and re-initializes every record.
    ///
    /// All existing records are dropped and one fresh record is seeded per
    /// configured agent. The audit log is kept. Returns the number of records
    /// created.
    #[instrument(skip(self, baselines), fields(rules = baselines.len()))]
    pub fn load_baselines(&self, baselines: BaselineSet) -> usize {
        let _reload = self.lifecycle.write().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();

        if let Err(err) = self.records.clear() {
            error!(error = %err, "failed to clear trust records before reload");
        }

        let mut created = 0;
        for baseline in baselines.iter() {
            let record = self.seed_record(baseline.agent_id.clone(), Some(baseline.tier), now);
            debug!(
                agent_id = %baseline.agent_id,
                tier = %baseline.tier,
                score = record.aggregate_score,
                "seeded trust record from baseline"
            );
            match self.records.put(record) {
                Ok(()) => created += 1,
                Err(err) => error!(agent_id = %baseline.agent_id, error = %err, "failed to seed trust record"),
            }
        }

        *self.baselines.write().unwrap_or_else(PoisonError::into_inner) = baselines;
        info!(records = created, "trust baselines loaded");
        created
    }

    /// Parses a JSON baseline document and loads it.
    ///
    /// A malformed document is logged and loaded as an empty set.
    pub fn load_baselines_from_json(&self, json: &str) -> usize {
        let baselines = BaselineSet::from_json_str(json).unwrap_or_else(|err| {
            warn!(error = %err, "invalid baseline document, using empty baselines");
            BaselineSet::new()
        });
        self.load_baselines(baselines)
    }

    /// Reads a JSON baseline file and loads it.
    ///
    /// A missing or malformed file is logged and loaded as an empty set.
    pub fn load_baselines_from_path(&self, path: impl AsRef<Path>) -> usize {
        let path = path.as_ref();
        let baselines = BaselineSet::from_path(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "cannot load baseline file, using empty baselines");
            BaselineSet::new()
        });
        self.load_baselines(baselines)
    }

    /// Snapshot of the loaded baselines.
    #[must_use]
    pub fn baselines(&self) -> BaselineSet {
        self.baselines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Current aggregate score of an agent.
    ///
    /// Unknown agents get the neutral score and no record is created. An
    /// empty id yields 0.0.
    #[must_use]
    pub fn get_trust_score(&self, agent_id: &str) -> f64 {
        let Some(id) = Self::parse_read_id(agent_id) else {
            return 0.0;
        };
        self.read_record(&id)
            .map_or(self.config.neutral_score, |r| r.aggregate_score)
    }

    /// Snapshot of an agent's record, if one exists.
    #[must_use]
    pub fn agent_record(&self, agent_id: &str) -> Option<AgentTrustRecord> {
        let id = Self::parse_read_id(agent_id)?;
        self.read_record(&id)
    }

    /// All six dimension scores of an agent.
    ///
    /// Unknown agents get the scores a fresh record would start with. An
    /// empty id yields all zeros.
    #[must_use]
    pub fn get_dimensional_trust_scores(&self, agent_id: &str) -> DimensionScores {
        let Some(id) = Self::parse_read_id(agent_id) else {
            return DimensionScores::uniform(0.0);
        };
        match self.read_record(&id) {
            Some(record) => record.dimensions,
            None => self
                .dimensional
                .initial_scores(id.as_str(), self.config.neutral_score),
        }
    }

    /// Score of one dimension.
    #[must_use]
    pub fn get_dimension_score(&self, agent_id: &str, dimension: TrustDimension) -> f64 {
        self.get_dimensional_trust_scores(agent_id).get(dimension)
    }

    /// Point estimate of the agent's Beta distribution.
    #[must_use]
    pub fn bayesian_trust(&self, agent_id: &str) -> f64 {
        let Some(id) = Self::parse_read_id(agent_id) else {
            return 0.0;
        };
        let params = self
            .read_record(&id)
            .map_or_else(|| self.bayesian.prior(), |r| r.bayesian);
        BayesianModel::score(&params)
    }

    /// Qualitative standing of the agent's current score.
    #[must_use]
    pub fn trust_standing(&self, agent_id: &str) -> TrustStanding {
        TrustStanding::from_score(self.get_trust_score(agent_id))
    }

    /// Checks the agent's current score against its boundary.
    ///
    /// Unknown agents are checked at the neutral score against the range of
    /// their baseline tier (medium if none).
    #[must_use]
    pub fn check_trust_boundaries(&self, agent_id: &str) -> BoundaryCheck {
        let Some(id) = Self::parse_read_id(agent_id) else {
            return BoundaryCheck::invalid_agent();
        };
        match self.read_record(&id) {
            Some(record) => BoundaryEnforcer::check(record.aggregate_score, &record.boundary),
            None => {
                let tier = self.baseline_tier(&id).unwrap_or_default();
                BoundaryEnforcer::check(self.config.neutral_score, &tier.boundary())
            }
        }
    }

    /// Audit entries, oldest first, optionally for one agent and limited to
    /// the last `last_n` (0 means no limit).
    #[must_use]
    pub fn get_trust_log(&self, agent_id: Option<&str>, last_n: Option<usize>) -> Vec<TrustEvent> {
        let mut query = AuditQuery::all();
        if let Some(agent) = agent_id {
            query = query.agent(agent.trim());
        }
        if let Some(n) = last_n {
            query = query.last(n);
        }
        self.audit.query(&query).unwrap_or_else(|err| {
            error!(error = %err, "failed to read audit log");
            Vec::new()
        })
    }

    /// Writes audit entries as JSON lines. Returns the number written.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::Export` if writing fails.
    pub fn export_trust_log_jsonl<W: Write>(
        &self,
        mut writer: W,
        agent_id: Option<&str>,
        last_n: Option<usize>,
    ) -> TrustResult<usize> {
        let events = self.get_trust_log(agent_id, last_n);
        for event in &events {
            serde_json::to_writer(&mut writer, event).map_err(std::io::Error::from)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(events.len())
    }

    // ------------------------------------------------------------------
    // Delegation
    // ------------------------------------------------------------------

    /// Whether `delegator_id` may delegate `action` to `delegatee_id`.
    #[must_use]
    pub fn can_delegate_action(&self, delegator_id: &str, delegatee_id: &str, action: &str) -> bool {
        self.assess_delegation(delegator_id, delegatee_id, action)
            .is_allowed()
    }

    /// Like [`TrustEngine::can_delegate_action`], with the reason.
    #[must_use]
    pub fn assess_delegation(
        &self,
        delegator_id: &str,
        delegatee_id: &str,
        action: &str,
    ) -> DelegationDecision {
        let baselines = self.baselines.read().unwrap_or_else(PoisonError::into_inner);
        self.delegation.evaluate(
            &baselines,
            delegator_id.trim(),
            delegatee_id.trim(),
            action,
            || self.get_trust_score(delegatee_id),
        )
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Applies a trust event and returns its audit entry.
    ///
    /// Every call appends exactly one entry. Invalid input (empty agent id,
    /// unknown outcome, non-finite magnitude) leaves all scores untouched and
    /// produces an entry with `success == false`.
    #[instrument(
        skip(self, update),
        fields(agent_id = %update.agent_id, event_type = %update.event_type, mode = ?update.mode)
    )]
    pub fn update_trust_score(&self, update: TrustUpdate) -> TrustEvent {
        let _active = self.lifecycle.read().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();
        let header = EventHeader {
            timestamp: now,
            agent_id: update.agent_id.trim().to_string(),
            event_type: update.event_type.clone(),
            outcome: update.outcome.clone(),
            magnitude: update.magnitude,
            reason: update.reason.clone(),
        };

        let id = match AgentId::parse(&update.agent_id) {
            Ok(id) => id,
            Err(err) => {
                error!(agent_id = %update.agent_id, "trust update for invalid agent id, no action taken");
                return self.append_best_effort(TrustEvent::rejected(header, 0.0, err.to_string()));
            }
        };

        let lock = self.locks.lock_for(&id);
        let _agent = lock.lock().unwrap_or_else(PoisonError::into_inner);

        match self.apply_update(&id, &update, header.clone(), now) {
            Ok(event) => event,
            Err(err) => {
                error!(agent_id = %id, error = %err, "trust update failed");
                let score = self.get_trust_score(id.as_str());
                self.append_best_effort(TrustEvent::rejected(header, score, err.to_string()))
            }
        }
    }

    fn apply_update(
        &self,
        id: &AgentId,
        update: &TrustUpdate,
        mut header: EventHeader,
        now: DateTime<Utc>,
    ) -> TrustResult<TrustEvent> {
        let outcome = match Outcome::parse(&update.outcome) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(agent_id = %id, outcome = %update.outcome, "invalid outcome, no score change applied");
                return self.append_rejected(id, header, &err);
            }
        };
        header.outcome = outcome.as_str().to_string();

        if !update.magnitude.is_finite() {
            let err = ValidationError::NonFiniteMagnitude {
                value: update.magnitude,
            };
            warn!(agent_id = %id, magnitude = update.magnitude, "invalid magnitude, no score change applied");
            return self.append_rejected(id, header, &err);
        }

        let mut record = self.ensure_record(id, now)?;
        let history = self.recent_history(id, &update.event_type)?;
        let original = record.aggregate_score;

        let inputs = UpdateInputs {
            outcome,
            magnitude: update.magnitude,
            event_type: &update.event_type,
            context: &update.context,
            dimensions: &update.dimensions,
            history: &history,
        };
        let details = match update.mode {
            UpdateMode::Simple => SimpleUpdate::new(&self.config.ethics).apply(&mut record, &inputs, now),
            UpdateMode::Full => FullUpdate::new(
                &self.config.combination,
                &self.config.ethics,
                &self.bayesian,
                &self.dimensional,
            )
            .apply(&mut record, &inputs, now),
        };

        let new_score = record.aggregate_score;
        self.records.put(record)?;

        info!(
            agent_id = %id,
            event_type = %update.event_type,
            outcome = %outcome,
            original,
            new_score,
            reason = %update.reason,
            "trust score updated"
        );

        let event = TrustEvent::applied(header, original, new_score, details);
        self.audit.append(event.clone())?;
        Ok(event)
    }

    /// Moves one dimension of an agent and re-aggregates its score.
    ///
    /// Creates the record if needed. Writes no audit entry. Returns `false`
    /// (and changes nothing) on invalid input or a storage failure.
    #[instrument(skip(self))]
    pub fn update_dimensional_trust(
        &self,
        agent_id: &str,
        dimension: TrustDimension,
        outcome: &str,
        magnitude: f64,
    ) -> bool {
        let Ok(id) = AgentId::parse(agent_id) else {
            error!("dimensional update for invalid agent id, no action taken");
            return false;
        };
        let Ok(outcome) = Outcome::parse(outcome) else {
            warn!(agent_id = %id, outcome, "invalid outcome for dimensional update");
            return false;
        };
        if !magnitude.is_finite() {
            warn!(agent_id = %id, magnitude, "invalid magnitude for dimensional update");
            return false;
        }

        let _active = self.lifecycle.read().unwrap_or_else(PoisonError::into_inner);
        let lock = self.locks.lock_for(&id);
        let _agent = lock.lock().unwrap_or_else(PoisonError::into_inner);

        match self.apply_dimension_update(&id, dimension, outcome, magnitude) {
            Ok(()) => true,
            Err(err) => {
                error!(agent_id = %id, error = %err, "dimensional update failed");
                false
            }
        }
    }

    fn apply_dimension_update(
        &self,
        id: &AgentId,
        dimension: TrustDimension,
        outcome: Outcome,
        magnitude: f64,
    ) -> Result<(), StorageError> {
        let now = self.clock.now();
        let mut record = self.ensure_record(id, now)?;
        DimensionalModel::update_dimension(&mut record.dimensions, dimension, outcome, magnitude);
        let aggregate = DimensionalModel::aggregate(&record.dimensions);
        record.set_score(aggregate, now);
        debug!(
            agent_id = %id,
            dimension = %dimension,
            score = record.dimensions.get(dimension),
            aggregate,
            "dimension updated"
        );
        self.records.put(record)
    }

    /// Recomputes every agent's score from its decayed recent history.
    ///
    /// Only entries from the last `days_to_process` days count. Agents
    /// without a record, or without entries in the window, are unchanged.
    #[instrument(skip(self))]
    pub fn apply_time_decay(&self, days_to_process: u32) -> DecaySummary {
        let _active = self.lifecycle.read().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();

        let agents = match self.records.agent_ids() {
            Ok(agents) => agents,
            Err(err) => {
                error!(error = %err, "cannot list agents for time decay");
                return DecaySummary::default();
            }
        };

        let mut summary = DecaySummary::default();
        for id in agents {
            let lock = self.locks.lock_for(&id);
            let _agent = lock.lock().unwrap_or_else(PoisonError::into_inner);
            match self.decay_agent(&id, now, days_to_process) {
                Ok(Some(used)) => {
                    summary.agents_rescored += 1;
                    summary.events_considered += used;
                }
                Ok(None) => {}
                Err(err) => error!(agent_id = %id, error = %err, "time decay failed"),
            }
        }

        info!(
            agents_rescored = summary.agents_rescored,
            events_considered = summary.events_considered,
            days_to_process,
            "time decay applied"
        );
        summary
    }

    /// [`TrustEngine::apply_time_decay`] over the configured default window.
    pub fn apply_default_time_decay(&self) -> DecaySummary {
        self.apply_time_decay(self.config.decay.default_window_days)
    }

    fn decay_agent(
        &self,
        id: &AgentId,
        now: DateTime<Utc>,
        window_days: u32,
    ) -> Result<Option<usize>, StorageError> {
        let Some(mut record) = self.records.get(id)? else {
            return Ok(None);
        };
        let events = self.audit.query(&AuditQuery::all().agent(id.as_str()))?;
        let Some((score, used)) = self.decay.decayed_score(&events, now, window_days) else {
            return Ok(None);
        };

        let old = record.aggregate_score;
        record.set_score(score, now);
        self.records.put(record)?;
        debug!(agent_id = %id, old, new = score, events = used, "decayed trust score");
        Ok(Some(used))
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn parse_read_id(agent_id: &str) -> Option<AgentId> {
        match AgentId::parse(agent_id) {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(agent_id, "trust query for invalid agent id");
                None
            }
        }
    }

    fn read_record(&self, id: &AgentId) -> Option<AgentTrustRecord> {
        self.records.get(id).unwrap_or_else(|err| {
            error!(agent_id = %id, error = %err, "failed to read trust record");
            None
        })
    }

    fn baseline_tier(&self, id: &AgentId) -> Option<TrustTier> {
        self.baselines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.as_str())
            .map(|b| b.tier)
    }

    fn seed_record(&self, id: AgentId, tier: Option<TrustTier>, now: DateTime<Utc>) -> AgentTrustRecord {
        AgentTrustRecord::seeded(
            id,
            tier,
            self.config.neutral_score,
            &self.bayesian,
            &self.dimensional,
            now,
        )
    }

    fn ensure_record(&self, id: &AgentId, now: DateTime<Utc>) -> Result<AgentTrustRecord, StorageError> {
        if let Some(record) = self.records.get(id)? {
            return Ok(record);
        }
        let record = self.seed_record(id.clone(), self.baseline_tier(id), now);
        info!(agent_id = %id, score = record.aggregate_score, "initialized trust record for new agent");
        self.records.insert_if_absent(record)
    }

    fn recent_history(&self, id: &AgentId, event_type: &str) -> Result<RecentHistory, StorageError> {
        let same_type = self.audit.query(
            &AuditQuery::all()
                .agent(id.as_str())
                .event_type(event_type)
                .last(HISTORY_WINDOW),
        )?;
        let recent = self
            .audit
            .query(&AuditQuery::all().agent(id.as_str()).last(HISTORY_WINDOW))?;
        Ok(RecentHistory::from_entries(&same_type, &recent))
    }

    fn append_rejected(
        &self,
        id: &AgentId,
        header: EventHeader,
        err: &ValidationError,
    ) -> TrustResult<TrustEvent> {
        let score = self.records.get(id)?.map_or(self.config.neutral_score, |r| r.aggregate_score);
        let event = TrustEvent::rejected(header, score, err.to_string());
        self.audit.append(event.clone())?;
        Ok(event)
    }

    fn append_best_effort(&self, event: TrustEvent) -> TrustEvent {
        if let Err(err) = self.audit.append(event.clone()) {
            error!(agent_id = %event.agent_id, error = %err, "failed to append audit entry");
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::baseline::{DelegateTargets, DelegationBaseline, DelegationScope};
    use crate::boundary::WarningLevel;
    use crate::event::UpdateDetails;
    use crate::time::ManualClock;

    fn id(s: &str) -> AgentId {
        AgentId::parse(s).unwrap()
    }

    fn baselines() -> BaselineSet {
        [
            DelegationBaseline::new(id("Cascade"), TrustTier::High)
                .with_scope(DelegationScope::Full)
                .with_delegatees(DelegateTargets::Any),
            DelegationBaseline::new(id("UserA"), TrustTier::Medium)
                .with_scope(DelegationScope::Partial)
                .with_delegatees(DelegateTargets::from_ids(["ToolX", "ToolY"])),
            DelegationBaseline::new(id("ToolX"), TrustTier::Medium),
            DelegationBaseline::new(id("UntrustedTool"), TrustTier::Low),
        ]
        .into_iter()
        .collect()
    }

    fn engine() -> TrustEngine {
        let engine = TrustEngine::default();
        engine.load_baselines(baselines());
        engine
    }

    #[test]
    fn baseline_load_seeds_records() {
        let engine = engine();
        assert_eq!(engine.record_store().len().unwrap(), 4);
        assert_eq!(engine.get_trust_score("Cascade"), 0.9);
        assert_eq!(engine.get_trust_score("ToolX"), 0.65);
        assert_eq!(engine.get_trust_score("UntrustedTool"), 0.4);
    }

    #[test]
    fn unknown_agent_reads_create_nothing() {
        let engine = engine();
        assert_eq!(engine.get_trust_score("Ghost"), 0.5);
        assert_eq!(engine.get_dimensional_trust_scores("Ghost"), DimensionScores::uniform(0.5));
        assert_eq!(engine.bayesian_trust("Ghost"), 0.5);
        let check = engine.check_trust_boundaries("Ghost");
        assert!(check.within_bounds);
        assert_eq!((check.min_bound, check.max_bound), (0.4, 0.85));
        assert!(engine.agent_record("Ghost").is_none());
        assert_eq!(engine.record_store().len().unwrap(), 4);
    }

    #[test]
    fn invalid_ids_get_safe_defaults() {
        let engine = engine();
        assert_eq!(engine.get_trust_score("  "), 0.0);
        assert_eq!(engine.get_dimension_score("", TrustDimension::Security), 0.0);
        assert_eq!(engine.bayesian_trust(""), 0.0);
        assert_eq!(engine.trust_standing(""), TrustStanding::MinimalTrust);
        let check = engine.check_trust_boundaries("");
        assert_eq!(check, BoundaryCheck::invalid_agent());
        assert_eq!(check.warning_level, WarningLevel::Critical);
    }

    #[test]
    fn ids_are_trimmed() {
        let engine = engine();
        assert_eq!(engine.get_trust_score("  Cascade "), 0.9);
        let event = engine.update_trust_score(TrustUpdate::new(" Cascade ", "task_completion", "positive"));
        assert_eq!(event.agent_id, "Cascade");
        assert!(event.success);
    }

    #[test]
    fn invalid_agent_update_logs_failure() {
        let engine = engine();
        let event = engine.update_trust_score(TrustUpdate::new("   ", "task_completion", "positive"));
        assert!(!event.success);
        assert_eq!(event.new_score, 0.0);
        assert_eq!(engine.get_trust_log(None, None).len(), 1);
        assert_eq!(engine.record_store().len().unwrap(), 4);
    }

    #[test]
    fn invalid_magnitude_is_rejected() {
        let engine = engine();
        let event = engine.update_trust_score(
            TrustUpdate::new("Cascade", "task_completion", "positive").with_magnitude(f64::NAN),
        );
        assert!(!event.success);
        assert_eq!(engine.get_trust_score("Cascade"), 0.9);
    }

    #[test]
    fn outcome_is_recorded_lowercase() {
        let engine = engine();
        let event = engine.update_trust_score(TrustUpdate::new("Cascade", "task_completion", "POSITIVE"));
        assert_eq!(event.outcome, "positive");
        let bad = engine.update_trust_score(TrustUpdate::new("Cascade", "task_completion", "Bogus"));
        assert_eq!(bad.outcome, "Bogus");
    }

    #[test]
    fn first_event_creates_medium_range_record() {
        let engine = engine();
        let event = engine.update_trust_score(TrustUpdate::new("Newcomer", "help_behavior", "negative"));
        assert_eq!(event.original_score, 0.5);
        assert_eq!(event.new_score, 0.4);
        let record = engine.agent_record("Newcomer").unwrap();
        assert_eq!(record.tier, None);
        assert_eq!(record.boundary, TrustTier::Medium.boundary());
    }

    #[test]
    fn full_update_records_breakdown() {
        let engine = engine();
        let event = engine.update_trust_score(
            TrustUpdate::new("ToolX", "task_completion", "positive").with_mode(UpdateMode::Full),
        );
        assert!(event.success);
        let Some(UpdateDetails::Full(breakdown)) = &event.details else {
            panic!("expected full breakdown");
        };
        assert_eq!(breakdown.traditional.weight, 0.3);
        let record = engine.agent_record("ToolX").unwrap();
        assert!((record.bayesian.alpha - 2.0).abs() < 1e-12);
        assert!((event.new_score - crate::event::round4(record.aggregate_score)).abs() < 1e-12);
    }

    #[test]
    fn dimensional_update_reaggregates() {
        let engine = engine();
        assert!(engine.update_dimensional_trust("ToolX", TrustDimension::Security, "negative", 0.3));
        let scores = engine.get_dimensional_trust_scores("ToolX");
        assert!((scores.security - 0.35).abs() < 1e-12);
        let expected = (5.0 * 0.65 + 0.35) / 6.0;
        assert!((engine.get_trust_score("ToolX") - expected).abs() < 1e-12);
        assert!(engine.get_trust_log(None, None).is_empty());

        assert!(!engine.update_dimensional_trust("", TrustDimension::Security, "negative", 0.3));
        assert!(!engine.update_dimensional_trust("ToolX", TrustDimension::Security, "meh", 0.3));
    }

    #[test]
    fn reload_reinitializes_records_and_keeps_log() {
        let engine = engine();
        engine.update_trust_score(TrustUpdate::new("Cascade", "task_completion", "negative"));
        engine.update_trust_score(TrustUpdate::new("Stranger", "task_completion", "negative"));
        assert!((engine.get_trust_score("Cascade") - 0.8).abs() < 1e-12);

        engine.load_baselines(baselines());
        assert_eq!(engine.get_trust_score("Cascade"), 0.9);
        assert!(engine.agent_record("Stranger").is_none());
        assert_eq!(engine.get_trust_log(None, None).len(), 2);
    }

    #[test]
    fn malformed_baselines_load_empty() {
        let engine = engine();
        assert_eq!(engine.load_baselines_from_json("{ nope"), 0);
        assert!(engine.baselines().is_empty());
        assert_eq!(engine.get_trust_score("Cascade"), 0.5);
        assert!(!engine.can_delegate_action("Cascade", "ToolX", "any"));
    }

    #[test]
    fn decay_uses_clock() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let engine = TrustEngine::default().with_clock(clock.clone());
        engine.load_baselines(baselines());

        engine.update_trust_score(TrustUpdate::new("ToolX", "task_completion", "negative").with_magnitude(0.25));
        clock.advance(Duration::days(30));
        engine.update_trust_score(TrustUpdate::new("ToolX", "task_completion", "positive").with_magnitude(0.25));
        assert!((engine.get_trust_score("ToolX") - 0.65).abs() < 1e-12);

        // entries left 0.4 (30 days old, weight 0.5) and 0.65 (weight 1.0)
        let summary = engine.apply_time_decay(30);
        assert_eq!(summary.agents_rescored, 1);
        assert_eq!(summary.events_considered, 2);
        let expected = (0.5 * 0.4 + 0.65) / 1.5;
        assert!((engine.get_trust_score("ToolX") - expected).abs() < 1e-9);
        assert!((engine.get_trust_score("Cascade") - 0.9).abs() < 1e-12);
    }

    #[test]
    fn export_writes_one_line_per_event() {
        let engine = engine();
        engine.update_trust_score(TrustUpdate::new("Cascade", "task_completion", "positive"));
        engine.update_trust_score(TrustUpdate::new("ToolX", "task_completion", "bogus"));

        let mut buf = Vec::new();
        let written = engine.export_trust_log_jsonl(&mut buf, None, None).unwrap();
        assert_eq!(written, 2);
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: TrustEvent = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.agent_id, "ToolX");
        assert!(!second.success);
    }

    #[test]
    fn delegation_reasons() {
        let engine = engine();
        assert_eq!(
            engine.assess_delegation("UserA", "ToolX", "summarize"),
            DelegationDecision::Allowed { delegatee_score: 0.65 }
        );
        assert_eq!(
            engine.assess_delegation("ToolX", "UserA", "summarize"),
            DelegationDecision::ScopeNone
        );
    }
}
