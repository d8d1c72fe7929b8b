//! Capability traits for the three external collaborators the hook
//! pipeline talks to: a chat platform (`Messaging`), an agent CLI
//! (`AgentAdapter`), and a container runtime (`ContainerEngine`). No
//! concrete Slack/Discord/Docker client lives in this workspace — only the
//! seams, plus an in-memory `Messaging` double for tests.

pub mod agent_adapter;
pub mod container;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod mock;
pub mod platform;

pub use agent_adapter::{AgentAdapter, AgentConfig, AgentRegistry};
pub use container::ContainerEngine;
pub use error::{MessagingError, Result};
pub use logging::LoggingMessaging;
pub use messaging::Messaging;
pub use mock::RecordingMessaging;
pub use platform::Platform;
