//! In-memory storage backend.
//!
//! This module provides thread-safe in-memory implementations of the storage traits.
//! It is intended for embedded usage, tests, and as a reference implementation.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::agent::AgentId;
use crate::event::TrustEvent;
use crate::record::AgentTrustRecord;
use crate::storage::traits::{AuditLog, AuditQuery, StorageError, TrustRecordStore};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

/// Thread-safe in-memory record store.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<BTreeMap<AgentId, AgentTrustRecord>>,
}

impl InMemoryRecordStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrustRecordStore for InMemoryRecordStore {
    fn get(&self, agent_id: &AgentId) -> Result<Option<AgentTrustRecord>, StorageError> {
        let records = self.records.read().map_err(|_| lock_err("record.get"))?;
        Ok(records.get(agent_id).cloned())
    }

    fn insert_if_absent(&self, record: AgentTrustRecord) -> Result<AgentTrustRecord, StorageError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| lock_err("record.insert_if_absent"))?;
        let stored = records
            .entry(record.agent_id.clone())
            .or_insert(record);
        Ok(stored.clone())
    }

    fn put(&self, record: AgentTrustRecord) -> Result<(), StorageError> {
        let mut records = self.records.write().map_err(|_| lock_err("record.put"))?;
        records.insert(record.agent_id.clone(), record);
        Ok(())
    }

    fn agent_ids(&self) -> Result<Vec<AgentId>, StorageError> {
        let records = self.records.read().map_err(|_| lock_err("record.agent_ids"))?;
        Ok(records.keys().cloned().collect())
    }

    fn len(&self) -> Result<usize, StorageError> {
        let records = self.records.read().map_err(|_| lock_err("record.len"))?;
        Ok(records.len())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut records = self.records.write().map_err(|_| lock_err("record.clear"))?;
        records.clear();
        Ok(())
    }
}

/// Thread-safe in-memory audit log.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    events: RwLock<Vec<TrustEvent>>,
}

impl InMemoryAuditLog {
    /// Create a new empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditLog for InMemoryAuditLog {
    fn append(&self, event: TrustEvent) -> Result<(), StorageError> {
        let mut events = self.events.write().map_err(|_| lock_err("audit.append"))?;
        events.push(event);
        Ok(())
    }

    fn query(&self, query: &AuditQuery) -> Result<Vec<TrustEvent>, StorageError> {
        let events = self.events.read().map_err(|_| lock_err("audit.query"))?;
        let mut matched: Vec<TrustEvent> =
            events.iter().filter(|e| query.matches(e)).cloned().collect();

        if let Some(n) = query.last_n.filter(|n| *n > 0) {
            if matched.len() > n {
                matched.drain(..matched.len() - n);
            }
        }
        Ok(matched)
    }

    fn len(&self) -> Result<usize, StorageError> {
        let events = self.events.read().map_err(|_| lock_err("audit.len"))?;
        Ok(events.len())
    }
}
