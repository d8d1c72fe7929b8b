//! Routing resolution: turns `(projectName, agentType?, instanceId?)` into
//! a fully resolved [`EventContext`] — or a [`HookError`] naming which
//! lookup failed. Read-only over the project registry; all the state this
//! crate mutates (pending turns, checklists, streaming buffers) lives
//! downstream of here.

use discode_core::types::{AgentType, ChannelId, InstanceKey, ProjectEntry, ProjectName, ProjectRegistry};

use crate::error::{HookError, Result};
use crate::pending::PendingSnapshot;

/// Everything a handler needs to act on one event, resolved once up front.
#[derive(Debug, Clone)]
pub struct EventContext {
    pub project_name: ProjectName,
    pub project_path: String,
    pub channel_id: ChannelId,
    pub agent_type: AgentType,
    pub instance_id: Option<String>,
    pub instance_key: InstanceKey,
    pub text: Option<String>,
    pub pending_snapshot: Option<PendingSnapshot>,
}

/// Resolve routing for one event against the registry. `pending_snapshot`
/// is filled in by the caller after resolution (it needs the pending
/// tracker, which this module doesn't depend on to avoid a cycle).
pub fn resolve(
    registry: &ProjectRegistry,
    project_name: &ProjectName,
    agent_type: Option<&str>,
    instance_id: Option<&str>,
    text: Option<String>,
) -> Result<EventContext> {
    let entry: &ProjectEntry = registry
        .get(project_name)
        .ok_or_else(|| HookError::UnknownProject(project_name.to_string()))?;

    let agent_type = resolve_agent_type(entry, agent_type);
    let instance_key = InstanceKey::new(&agent_type, instance_id);

    let channel_id = entry
        .instances
        .get(&instance_key)
        .map(|instance| instance.channel_id.clone())
        .or_else(|| entry.channels.get(&agent_type).cloned())
        .ok_or_else(|| HookError::UnknownChannel {
            project: project_name.to_string(),
            agent_type: agent_type.to_string(),
        })?;

    Ok(EventContext {
        project_name: project_name.clone(),
        project_path: entry.project_path.clone(),
        channel_id,
        agent_type,
        instance_id: instance_id.map(str::to_string),
        instance_key,
        text,
        pending_snapshot: None,
    })
}

/// `agentType` field wins; otherwise fall back to the project's sole
/// enabled agent; otherwise the global default (`claude`).
fn resolve_agent_type(entry: &ProjectEntry, agent_type: Option<&str>) -> AgentType {
    if let Some(agent_type) = agent_type {
        if !agent_type.is_empty() {
            return AgentType::from(agent_type);
        }
    }
    if let Some(sole) = entry.sole_enabled_agent() {
        return sole.clone();
    }
    AgentType::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use discode_core::types::InstanceEntry;
    use std::collections::{BTreeMap, BTreeSet};

    fn registry_with_one_project() -> ProjectRegistry {
        let mut registry = ProjectRegistry::new();
        let mut channels = BTreeMap::new();
        channels.insert(AgentType::from("claude"), ChannelId::from("ch-claude"));
        let mut agents_enabled = BTreeSet::new();
        agents_enabled.insert(AgentType::from("claude"));
        registry.insert(
            ProjectName::from("demo"),
            ProjectEntry {
                project_path: "/tmp/demo".into(),
                agents_enabled,
                channels,
                instances: BTreeMap::new(),
            },
        );
        registry
    }

    #[test]
    fn unknown_project_errors() {
        let registry = ProjectRegistry::new();
        let result = resolve(&registry, &ProjectName::from("nope"), None, None, None);
        assert!(matches!(result, Err(HookError::UnknownProject(_))));
    }

    #[test]
    fn falls_back_to_sole_enabled_agent_and_default_channel() {
        let registry = registry_with_one_project();
        let ctx = resolve(&registry, &ProjectName::from("demo"), None, None, None).unwrap();
        assert_eq!(ctx.agent_type, AgentType::from("claude"));
        assert_eq!(ctx.channel_id, ChannelId::from("ch-claude"));
    }

    #[test]
    fn instance_override_wins_over_default_channel() {
        let mut registry = registry_with_one_project();
        let entry = {
            let mut e = registry.get(&ProjectName::from("demo")).unwrap().clone();
            e.instances.insert(
                InstanceKey::new(&AgentType::from("claude"), Some("2")),
                InstanceEntry {
                    agent_type: AgentType::from("claude"),
                    channel_id: ChannelId::from("ch-claude-2"),
                    instance_id: Some("2".to_string()),
                },
            );
            e
        };
        registry.insert(ProjectName::from("demo"), entry);

        let ctx = resolve(&registry, &ProjectName::from("demo"), Some("claude"), Some("2"), None).unwrap();
        assert_eq!(ctx.channel_id, ChannelId::from("ch-claude-2"));
    }

    #[test]
    fn unknown_channel_when_agent_has_no_mapping() {
        let registry = registry_with_one_project();
        let result = resolve(&registry, &ProjectName::from("demo"), Some("codex"), None, None);
        assert!(matches!(result, Err(HookError::UnknownChannel { .. })));
    }
}
