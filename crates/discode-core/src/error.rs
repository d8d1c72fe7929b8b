use thiserror::Error;

/// Root error type, mirroring the five failure classes from the hook
/// ingestion contract: invalid envelope, unknown route, transient chat
/// failure, malformed structured payload, and internal handler failure.
/// VT parsing never fails (bad bytes degrade the grid, they never raise),
/// so there is deliberately no `Vt` variant here.
#[derive(Debug, Error)]
pub enum DiscodeError {
    #[error("invalid hook envelope: {0}")]
    EnvelopeInvalid(String),

    #[error("unknown project: {project}")]
    RouteNotFound { project: String },

    #[error("chat delivery failed: {0}")]
    ChatTransient(String),

    #[error("malformed structured payload: {0}")]
    StructuredPayloadInvalid(String),

    #[error("handler error: {0}")]
    HandlerInternal(String),

    #[error("bridge script integrity check failed: {0}")]
    IntegrityMismatch(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiscodeError {
    /// Short, stable code surfaced to callers (log lines, metrics labels,
    /// and — for the envelope/route classes — the HTTP response body).
    pub fn code(&self) -> &'static str {
        match self {
            DiscodeError::EnvelopeInvalid(_) => "ENVELOPE_INVALID",
            DiscodeError::RouteNotFound { .. } => "ROUTE_NOT_FOUND",
            DiscodeError::ChatTransient(_) => "CHAT_TRANSIENT",
            DiscodeError::StructuredPayloadInvalid(_) => "STRUCTURED_PAYLOAD_INVALID",
            DiscodeError::HandlerInternal(_) => "HANDLER_INTERNAL",
            DiscodeError::IntegrityMismatch(_) => "INTEGRITY_MISMATCH",
            DiscodeError::Config(_) => "CONFIG_ERROR",
            DiscodeError::Serialization(_) => "SERIALIZATION_ERROR",
            DiscodeError::Io(_) => "IO_ERROR",
        }
    }

    /// HTTP status the hook server responds with for this error, per the
    /// 200/400/404/500 contract. Errors that never reach the HTTP boundary
    /// (chat transient, structured payload, integrity) are handled and
    /// logged by the pipeline before a response is written, so they fall
    /// back to 500 here only as a defensive default.
    pub fn http_status(&self) -> u16 {
        match self {
            DiscodeError::EnvelopeInvalid(_) => 400,
            DiscodeError::RouteNotFound { .. } => 404,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, DiscodeError>;
