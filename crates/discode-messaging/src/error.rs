use thiserror::Error;

/// Errors a `Messaging`/`AgentAdapter`/`ContainerEngine` implementation can
/// raise. These are always treated as transient by callers in this
/// workspace — a chat-side failure never aborts event handling, it is
/// logged and the pipeline moves on.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// The underlying transport could not be established or dropped.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A message, edit, or reaction could not be delivered.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The adapter rejected the supplied credentials or token.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// An operation exceeded its allowed time budget.
    #[error("operation timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The adapter-specific configuration is invalid or missing.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, MessagingError>;
