//! Hook envelope validation, routing resolution, the pending-turn tracker,
//! task checklists, and the streaming updater — the stateful machinery
//! that sits between the HTTP ingress and the typed event handlers.

pub mod envelope;
pub mod error;
pub mod pending;
pub mod routing;
pub mod streaming;
pub mod task;

pub use envelope::{validate, EventType, HookEnvelope};
pub use error::{HookError, Result};
pub use pending::{PendingKey, PendingSnapshot, PendingTracker, SharedPendingTracker};
pub use routing::{resolve, EventContext};
pub use streaming::{SharedStreamingUpdater, StreamKey, StreamingUpdater};
pub use task::{SharedTaskChecklists, Task, TaskChecklists, TaskKey, TaskStatus};
