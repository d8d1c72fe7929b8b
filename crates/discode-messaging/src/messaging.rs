//! The `Messaging` capability: every chat-side effect a handler can cause,
//! expressed as a trait so the hook pipeline never depends on a concrete
//! Slack or Discord client directly.

use async_trait::async_trait;
use discode_core::types::{ChannelId, MessageId};

use crate::error::Result;
use crate::platform::Platform;

/// Outbound operations against a chat platform. Implementations are
/// expected to be cheap to clone (an `Arc`-wrapped client is typical) since
/// handlers call through this on every event.
#[async_trait]
pub trait Messaging: Send + Sync {
    /// Which platform this implementation talks to, so callers can pick
    /// the right chunk-splitting policy.
    fn platform(&self) -> Platform;

    /// Fire-and-forget send; no message id is retained.
    async fn send_to_channel(&self, channel: &ChannelId, text: &str) -> Result<()>;

    /// Send and return the new message's id, for callers that will edit or
    /// react to it later (streaming placeholders, task checklists).
    async fn send_to_channel_with_id(&self, channel: &ChannelId, text: &str) -> Result<MessageId>;

    async fn update_message(&self, channel: &ChannelId, message_id: &MessageId, text: &str) -> Result<()>;

    async fn add_reaction_to_message(&self, channel: &ChannelId, message_id: &MessageId, emoji: &str) -> Result<()>;

    /// Remove `from` (if present) and add `to` in one logical step.
    async fn replace_own_reaction_on_message(
        &self,
        channel: &ChannelId,
        message_id: &MessageId,
        from: &str,
        to: &str,
    ) -> Result<()>;

    async fn reply_in_thread(&self, channel: &ChannelId, parent_message_id: &MessageId, text: &str) -> Result<()>;

    async fn reply_in_thread_with_id(
        &self,
        channel: &ChannelId,
        parent_message_id: &MessageId,
        text: &str,
    ) -> Result<MessageId>;

    async fn send_to_channel_with_files(&self, channel: &ChannelId, text: &str, files: &[(String, Vec<u8>)]) -> Result<()>;
}
