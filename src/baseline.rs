//! Delegation baselines.
//!
//! A baseline document assigns each configured agent a trust tier, a
//! delegation scope, and the agents it may delegate to:
//!
//! ```json
//! {
//!   "trust_rules": [
//!     { "agent": "Cascade", "level": "high", "delegation": "full", "can_delegate_to": ["*"] },
//!     { "agent": "UserA", "level": "medium", "delegation": "partial", "can_delegate_to": ["ToolX"] }
//!   ]
//! }
//! ```
//!
//! Parsing is lenient. Only a document that is not an object, or whose
//! `trust_rules` is missing or not a list, is rejected. Individual bad rules
//! are skipped with a warning and the rest are kept.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::agent::AgentId;
use crate::error::BaselineError;
use crate::tier::TrustTier;

/// How much an agent may delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegationScope {
    /// May not delegate.
    #[default]
    None,
    /// May delegate some actions.
    Partial,
    /// May delegate any action.
    Full,
}

impl DelegationScope {
    /// Parses a scope name, ignoring case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "partial" => Some(Self::Partial),
            "full" => Some(Self::Full),
            _ => None,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Partial => "partial",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for DelegationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Agents a delegator may hand work to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegateTargets {
    /// Any agent (`"*"`).
    Any,
    /// Only the listed agents.
    List(BTreeSet<String>),
}

impl DelegateTargets {
    /// Wildcard marker.
    pub const WILDCARD: &'static str = "*";

    /// Whether `agent_id` is an allowed delegatee.
    #[must_use]
    pub fn allows(&self, agent_id: &str) -> bool {
        match self {
            Self::Any => true,
            Self::List(ids) => ids.contains(agent_id),
        }
    }

    /// Builds targets from a list of ids; a `"*"` entry means any.
    #[must_use]
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for id in ids {
            let id = id.as_ref().trim();
            if id == Self::WILDCARD {
                return Self::Any;
            }
            if !id.is_empty() {
                set.insert(id.to_string());
            }
        }
        Self::List(set)
    }
}

impl Default for DelegateTargets {
    fn default() -> Self {
        Self::List(BTreeSet::new())
    }
}

/// Baseline rule for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationBaseline {
    /// Agent the rule configures.
    pub agent_id: AgentId,
    /// Trust tier.
    pub tier: TrustTier,
    /// Delegation scope.
    pub scope: DelegationScope,
    /// Allowed delegatees.
    pub delegatees: DelegateTargets,
}

impl DelegationBaseline {
    /// Creates a rule with no delegation rights.
    #[must_use]
    pub fn new(agent_id: AgentId, tier: TrustTier) -> Self {
        Self {
            agent_id,
            tier,
            scope: DelegationScope::None,
            delegatees: DelegateTargets::default(),
        }
    }

    /// Sets the delegation scope.
    #[must_use]
    pub const fn with_scope(mut self, scope: DelegationScope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the allowed delegatees.
    #[must_use]
    pub fn with_delegatees(mut self, delegatees: DelegateTargets) -> Self {
        self.delegatees = delegatees;
        self
    }
}

/// Baselines of all configured agents, keyed by agent id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaselineSet {
    rules: BTreeMap<AgentId, DelegationBaseline>,
}

impl BaselineSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule, replacing any earlier rule for the same agent.
    pub fn insert(&mut self, baseline: DelegationBaseline) -> Option<DelegationBaseline> {
        self.rules.insert(baseline.agent_id.clone(), baseline)
    }

    /// Rule for `agent_id`.
    #[must_use]
    pub fn get(&self, agent_id: &str) -> Option<&DelegationBaseline> {
        self.rules.get(agent_id)
    }

    /// Rules ordered by agent id.
    pub fn iter(&self) -> impl Iterator<Item = &DelegationBaseline> {
        self.rules.values()
    }

    /// Number of configured agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no agent is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Parses a baseline document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `BaselineError::Json` if the text is not JSON, or
    /// `BaselineError::InvalidShape` if the document has no rule list.
    pub fn from_json_str(json: &str) -> Result<Self, BaselineError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Reads and parses a baseline file.
    ///
    /// # Errors
    ///
    /// Returns `BaselineError::Io` if the file cannot be read, otherwise as
    /// [`BaselineSet::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BaselineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| BaselineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Builds a set from an already parsed document.
    ///
    /// # Errors
    ///
    /// Returns `BaselineError::InvalidShape` if `document` is not an object or
    /// its `trust_rules` is missing or not a list.
    pub fn from_value(document: &Value) -> Result<Self, BaselineError> {
        let object = document.as_object().ok_or_else(|| BaselineError::InvalidShape {
            reason: "document is not an object".to_string(),
        })?;
        let rules = match object.get("trust_rules") {
            Some(Value::Array(rules)) => rules,
            Some(_) => {
                return Err(BaselineError::InvalidShape {
                    reason: "'trust_rules' is not a list".to_string(),
                })
            }
            None => {
                return Err(BaselineError::InvalidShape {
                    reason: "missing 'trust_rules'".to_string(),
                })
            }
        };

        let mut set = Self::new();
        for (index, rule) in rules.iter().enumerate() {
            if let Some(baseline) = parse_rule(index, rule) {
                if let Some(previous) = set.insert(baseline) {
                    debug!(agent_id = %previous.agent_id, "later baseline rule replaces earlier one");
                }
            }
        }
        Ok(set)
    }
}

impl FromIterator<DelegationBaseline> for BaselineSet {
    fn from_iter<T: IntoIterator<Item = DelegationBaseline>>(iter: T) -> Self {
        let mut set = Self::new();
        for baseline in iter {
            set.insert(baseline);
        }
        set
    }
}

fn parse_rule(index: usize, rule: &Value) -> Option<DelegationBaseline> {
    let Some(rule) = rule.as_object() else {
        warn!(index, "skipping baseline rule that is not an object");
        return None;
    };

    let agent_id = match rule.get("agent").and_then(Value::as_str).map(AgentId::parse) {
        Some(Ok(id)) => id,
        _ => {
            warn!(index, "skipping baseline rule without a valid agent id");
            return None;
        }
    };

    let tier = match rule.get("level") {
        None | Some(Value::Null) => TrustTier::Medium,
        Some(Value::String(level)) => {
            let tier = TrustTier::parse(level);
            if tier == TrustTier::Unrecognized {
                warn!(agent_id = %agent_id, level = %level, "unrecognized trust level");
            }
            tier
        }
        Some(other) => {
            warn!(agent_id = %agent_id, level = %other, "trust level is not a string");
            TrustTier::Unrecognized
        }
    };

    let scope = match rule.get("delegation").and_then(Value::as_str) {
        None => DelegationScope::None,
        Some(name) => DelegationScope::parse(name).unwrap_or_else(|| {
            warn!(agent_id = %agent_id, delegation = %name, "unrecognized delegation scope, using none");
            DelegationScope::None
        }),
    };

    let delegatees = match rule.get("can_delegate_to") {
        None | Some(Value::Null) => DelegateTargets::default(),
        Some(Value::String(s)) if s.trim() == DelegateTargets::WILDCARD => DelegateTargets::Any,
        Some(Value::String(s)) => DelegateTargets::from_ids([s.as_str()]),
        Some(Value::Array(ids)) => DelegateTargets::from_ids(ids.iter().filter_map(Value::as_str)),
        Some(other) => {
            warn!(agent_id = %agent_id, can_delegate_to = %other, "ignoring malformed delegatee list");
            DelegateTargets::default()
        }
    };

    Some(DelegationBaseline {
        agent_id,
        tier,
        scope,
        delegatees,
    })
}
