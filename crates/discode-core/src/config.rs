use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 18470;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_APPROVAL_TIMEOUT_MS: u64 = 120_000;
pub const DEFAULT_QUESTION_TIMEOUT_MS: u64 = 300_000;
/// Debounce interval for the streaming updater: edits are coalesced and
/// flushed at most this often while a turn is still producing output.
pub const DEFAULT_STREAM_DEBOUNCE_MS: u64 = 500;
/// Character budget before the streaming updater rolls over to a new
/// message, mirroring the platform message-length ceiling.
pub const DEFAULT_STREAM_ROLLOVER_CHARS: usize = 1950;

/// Language the formatted chat text is produced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ko,
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

/// Top-level config, loaded from an optional TOML file plus env overrides
/// (`DISCODE_*` for the core knobs, `AGENT_DISCORD_*` for the port — the
/// name predates this crate and is kept for compatibility with plugin
/// launch environments, per the external-interfaces contract).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscodeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    #[serde(default)]
    pub streaming: StreamingConfig,
    #[serde(default)]
    pub language: Language,
}

impl Default for DiscodeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            timeouts: TimeoutsConfig::default(),
            streaming: StreamingConfig::default(),
            language: Language::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_approval_timeout_ms")]
    pub approval_timeout_ms: u64,
    #[serde(default = "default_question_timeout_ms")]
    pub question_timeout_ms: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            approval_timeout_ms: DEFAULT_APPROVAL_TIMEOUT_MS,
            question_timeout_ms: DEFAULT_QUESTION_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    #[serde(default = "default_stream_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_stream_rollover_chars")]
    pub rollover_chars: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_STREAM_DEBOUNCE_MS,
            rollover_chars: DEFAULT_STREAM_ROLLOVER_CHARS,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_approval_timeout_ms() -> u64 {
    DEFAULT_APPROVAL_TIMEOUT_MS
}
fn default_question_timeout_ms() -> u64 {
    DEFAULT_QUESTION_TIMEOUT_MS
}
fn default_stream_debounce_ms() -> u64 {
    DEFAULT_STREAM_DEBOUNCE_MS
}
fn default_stream_rollover_chars() -> usize {
    DEFAULT_STREAM_ROLLOVER_CHARS
}

impl DiscodeConfig {
    /// Load config from an optional TOML file, then overlay env vars.
    /// `AGENT_DISCORD_PORT` takes the port (the name plugins also read);
    /// everything else lives under `DISCODE_*`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let mut figment = Figment::from(figment::providers::Serialized::defaults(
            DiscodeConfig::default(),
        ));

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment
            .merge(Env::prefixed("DISCODE_").split("_"))
            .merge(
                Env::prefixed("AGENT_DISCORD_")
                    .only(&["PORT"])
                    .map(|_| "server.port".to_string()),
            );

        figment
            .extract()
            .map_err(|e| crate::error::DiscodeError::Config(e.to_string()))
    }
}
