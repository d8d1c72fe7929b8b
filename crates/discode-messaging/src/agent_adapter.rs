//! The `AgentAdapter` capability: how one agent CLI (`claude`, `codex`,
//! `gemini`, `opencode`) is installed, launched, and addressed. The hook
//! pipeline never shells out to an agent directly — it asks an adapter.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;

/// Static identity of one agent CLI.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub name: String,
    pub display_name: String,
    pub command: String,
    /// Suffix appended to a channel name so `parseChannelName` can recover
    /// which adapter a channel belongs to (`project-claude`, `project-codex`).
    pub channel_suffix: String,
}

#[async_trait]
pub trait AgentAdapter: Send + Sync {
    fn config(&self) -> &AgentConfig;

    async fn is_installed(&self) -> bool;

    /// The shell command that launches this agent in `path`, honoring
    /// whatever permission-allow policy the orchestrator has configured.
    fn get_start_command(&self, path: &str, permission_allow: bool) -> String;

    /// Install the plugin/hook integration for this agent at `path`. `mode`
    /// is adapter-defined (e.g. `"global"` vs `"project"`).
    async fn install_integration(&self, path: &str, mode: &str) -> Result<()>;

    /// Copy this adapter's plugin bundle into a running container.
    async fn inject_container_plugins(&self, container_id: &str) -> Result<()>;

    /// Wrap a bare agent command with whatever integration flags/env the
    /// adapter needs to route hook events back to this process.
    fn build_launch_command(&self, cmd: &str, integration: &str) -> String;

    fn get_extra_env_vars(&self, permission_allow: bool) -> HashMap<String, String>;
}

/// Lookup by name, and recovery of `(project, adapter)` from a channel name
/// by matching its configured suffix.
pub struct AgentRegistry {
    adapters: Vec<Box<dyn AgentAdapter>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self { adapters: Vec::new() }
    }

    pub fn register(&mut self, adapter: Box<dyn AgentAdapter>) {
        self.adapters.push(adapter);
    }

    pub fn get(&self, name: &str) -> Option<&dyn AgentAdapter> {
        self.adapters
            .iter()
            .find(|a| a.config().name == name)
            .map(|a| a.as_ref())
    }

    /// Split a channel name like `myproject-claude` into `("myproject",
    /// adapter-for-claude)` by matching the longest registered suffix.
    pub fn parse_channel_name<'a>(&'a self, name: &str) -> Option<(String, &'a dyn AgentAdapter)> {
        self.adapters
            .iter()
            .filter_map(|a| {
                let suffix = format!("-{}", a.config().channel_suffix);
                name.strip_suffix(&suffix)
                    .filter(|project| !project.is_empty())
                    .map(|project| (project.to_string(), a.as_ref()))
            })
            .max_by_key(|(project, _)| project.len())
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
