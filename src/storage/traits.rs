//! Abstract storage traits for trustweave.
//!
//! These traits define the contract that storage backends must implement.
//! By using traits, we enable:
//! - In-memory backends for tests and embedded use
//! - Durable backends supplied by the host application

use thiserror::Error;

use crate::agent::AgentId;
use crate::event::TrustEvent;
use crate::record::AgentTrustRecord;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

/// Storage trait for per-agent trust records.
///
/// The store only guarantees that each individual call is consistent.
/// Serializing the read-modify-write of one agent is the engine's job.
pub trait TrustRecordStore: Send + Sync {
    /// Get a snapshot of an agent's record.
    fn get(&self, agent_id: &AgentId) -> Result<Option<AgentTrustRecord>, StorageError>;

    /// Insert `record` unless one already exists for its agent.
    ///
    /// Returns the stored record (the existing one, or `record`).
    fn insert_if_absent(&self, record: AgentTrustRecord) -> Result<AgentTrustRecord, StorageError>;

    /// Insert or replace a record.
    fn put(&self, record: AgentTrustRecord) -> Result<(), StorageError>;

    /// Ids of all agents with a record, sorted.
    fn agent_ids(&self) -> Result<Vec<AgentId>, StorageError>;

    /// Number of records.
    fn len(&self) -> Result<usize, StorageError>;

    /// Whether the store holds no records.
    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// Remove every record.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Filter for audit log queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditQuery {
    /// Keep only entries for this agent.
    pub agent_id: Option<String>,
    /// Keep only entries of this event type.
    pub event_type: Option<String>,
    /// After filtering, keep only the last `n` entries. Zero means no limit.
    pub last_n: Option<usize>,
}

impl AuditQuery {
    /// Query matching every entry.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to one agent.
    #[must_use]
    pub fn agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Restrict to one event type.
    #[must_use]
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Keep only the most recent `n` matches.
    #[must_use]
    pub fn last(mut self, n: usize) -> Self {
        self.last_n = Some(n);
        self
    }

    /// Whether `event` passes the agent and event-type filters.
    #[must_use]
    pub fn matches(&self, event: &TrustEvent) -> bool {
        self.agent_id.as_deref().map_or(true, |a| event.agent_id == a)
            && self
                .event_type
                .as_deref()
                .map_or(true, |t| event.event_type == t)
    }
}

/// Append-only log of trust events.
///
/// Insertion order is chronological order.
pub trait AuditLog: Send + Sync {
    /// Append an event.
    fn append(&self, event: TrustEvent) -> Result<(), StorageError>;

    /// Matching events, oldest first.
    fn query(&self, query: &AuditQuery) -> Result<Vec<TrustEvent>, StorageError>;

    /// Total number of events.
    fn len(&self) -> Result<usize, StorageError>;

    /// Whether the log is empty.
    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test: ensure traits are object-safe
    fn _assert_record_store_object_safe(_: &dyn TrustRecordStore) {}
    fn _assert_audit_log_object_safe(_: &dyn AuditLog) {}

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::BackendError("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_query_builder() {
        let q = AuditQuery::all().agent("UserA").event_type("task_completion").last(3);
        assert_eq!(q.agent_id.as_deref(), Some("UserA"));
        assert_eq!(q.event_type.as_deref(), Some("task_completion"));
        assert_eq!(q.last_n, Some(3));
    }
}
