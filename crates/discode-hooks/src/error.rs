use thiserror::Error;

/// Errors raised by envelope validation and routing resolution. Everything
/// downstream of routing (handler/chat-transient failures) belongs to the
/// pipeline crate, not this one.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("invalid hook envelope: {0:?}")]
    EnvelopeInvalid(Vec<String>),

    #[error("unknown project: {0}")]
    UnknownProject(String),

    #[error("unknown channel for project {project} agent {agent_type}")]
    UnknownChannel { project: String, agent_type: String },
}

pub type Result<T> = std::result::Result<T, HookError>;
