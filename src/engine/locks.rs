//! Per-agent mutation locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::agent::AgentId;

/// One mutex per agent, created on first use.
///
/// Holding an agent's mutex serializes the read-modify-write of its record
/// together with the audit append. Locks of different agents are independent.
#[derive(Debug, Default)]
pub(crate) struct AgentLocks {
    locks: Mutex<HashMap<AgentId, Arc<Mutex<()>>>>,
}

impl AgentLocks {
    /// The mutex guarding `agent_id`.
    pub(crate) fn lock_for(&self, agent_id: &AgentId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(agent_id.clone()).or_default())
    }
}
