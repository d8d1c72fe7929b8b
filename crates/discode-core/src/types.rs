//! Shared identifiers and the project routing table.
//!
//! These types cross every crate boundary in the workspace, so they live
//! here rather than in any one component's crate.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Name of a project window, as declared by the external orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectName(pub String);

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProjectName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Name of an agent CLI (`claude`, `codex`, `gemini`, `opencode`, …).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentType(pub String);

impl AgentType {
    /// Resolution falls back to this when a project declares more than one
    /// enabled agent and the event omits `agentType`.
    pub const DEFAULT: &'static str = "claude";
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Default for AgentType {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

/// Opaque identifier for a chat platform channel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ChannelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque identifier for a message within a chat platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Key that serializes work for one conversation: `agentType` alone, or
/// `agentType#instanceId` when a project runs multiple instances of the
/// same agent type side by side.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceKey(pub String);

impl InstanceKey {
    pub fn new(agent_type: &AgentType, instance_id: Option<&str>) -> Self {
        match instance_id {
            Some(id) if !id.is_empty() => Self(format!("{}#{}", agent_type, id)),
            _ => Self(agent_type.0.clone()),
        }
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One declared agent instance inside a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceEntry {
    pub agent_type: AgentType,
    pub channel_id: ChannelId,
    pub instance_id: Option<String>,
}

/// A project's full routing configuration, as maintained by the external
/// orchestrator. The core only ever reads this table; it never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub project_path: String,
    pub agents_enabled: BTreeSet<AgentType>,
    /// Default channel per agent type.
    pub channels: BTreeMap<AgentType, ChannelId>,
    /// Per-instance overrides, keyed by [`InstanceKey`].
    pub instances: BTreeMap<InstanceKey, InstanceEntry>,
}

impl ProjectEntry {
    /// The agent type to use when an event omits `agentType` and more than
    /// one agent is enabled: resolution falls back to this project's sole
    /// enabled agent, if it has exactly one.
    pub fn sole_enabled_agent(&self) -> Option<&AgentType> {
        if self.agents_enabled.len() == 1 {
            self.agents_enabled.iter().next()
        } else {
            None
        }
    }
}

/// The full routing table: `projectName -> ProjectEntry`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectRegistry {
    projects: BTreeMap<ProjectName, ProjectEntry>,
}

impl ProjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion, used by the external orchestrator (and by
    /// tests) to populate the table.
    pub fn insert(&mut self, name: ProjectName, entry: ProjectEntry) {
        self.projects.insert(name, entry);
    }

    pub fn get(&self, name: &ProjectName) -> Option<&ProjectEntry> {
        self.projects.get(name)
    }

    /// Load a routing table from a JSON file on disk, the format the
    /// external orchestrator writes and refreshes as projects/instances
    /// come and go.
    pub fn load_from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let registry = serde_json::from_str(&contents)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_key_without_instance_id_is_bare_agent_type() {
        let key = InstanceKey::new(&AgentType::from("claude"), None);
        assert_eq!(key.0, "claude");
    }

    #[test]
    fn instance_key_with_instance_id_joins_with_hash() {
        let key = InstanceKey::new(&AgentType::from("claude"), Some("2"));
        assert_eq!(key.0, "claude#2");
    }

    #[test]
    fn instance_key_empty_instance_id_falls_back_to_bare() {
        let key = InstanceKey::new(&AgentType::from("codex"), Some(""));
        assert_eq!(key.0, "codex");
    }

    #[test]
    fn sole_enabled_agent_when_exactly_one() {
        let mut entry = ProjectEntry {
            project_path: "/tmp/p".into(),
            agents_enabled: BTreeSet::new(),
            channels: BTreeMap::new(),
            instances: BTreeMap::new(),
        };
        entry.agents_enabled.insert(AgentType::from("claude"));
        assert_eq!(entry.sole_enabled_agent(), Some(&AgentType::from("claude")));

        entry.agents_enabled.insert(AgentType::from("codex"));
        assert_eq!(entry.sole_enabled_agent(), None);
    }
}
