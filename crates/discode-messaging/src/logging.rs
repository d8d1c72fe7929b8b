//! A `Messaging` implementation that logs every chat-side effect instead
//! of calling out to a platform. The hook server binary wires this in by
//! default — a real Slack/Discord adapter is an external collaborator, out
//! of scope for this workspace, and plugs into the same trait.

use async_trait::async_trait;
use discode_core::types::{ChannelId, MessageId};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::messaging::Messaging;
use crate::platform::Platform;

pub struct LoggingMessaging {
    platform: Platform,
    next_id: AtomicU64,
}

impl LoggingMessaging {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            next_id: AtomicU64::new(1),
        }
    }

    fn fresh_message_id(&self) -> MessageId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        MessageId::from(format!("log-msg-{n}"))
    }
}

#[async_trait]
impl Messaging for LoggingMessaging {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn send_to_channel(&self, channel: &ChannelId, text: &str) -> Result<()> {
        tracing::info!(channel = %channel, %text, "send_to_channel");
        Ok(())
    }

    async fn send_to_channel_with_id(&self, channel: &ChannelId, text: &str) -> Result<MessageId> {
        let message_id = self.fresh_message_id();
        tracing::info!(channel = %channel, %text, message_id = %message_id, "send_to_channel_with_id");
        Ok(message_id)
    }

    async fn update_message(&self, channel: &ChannelId, message_id: &MessageId, text: &str) -> Result<()> {
        tracing::info!(channel = %channel, message_id = %message_id, %text, "update_message");
        Ok(())
    }

    async fn add_reaction_to_message(&self, channel: &ChannelId, message_id: &MessageId, emoji: &str) -> Result<()> {
        tracing::info!(channel = %channel, message_id = %message_id, %emoji, "add_reaction_to_message");
        Ok(())
    }

    async fn replace_own_reaction_on_message(
        &self,
        channel: &ChannelId,
        message_id: &MessageId,
        from: &str,
        to: &str,
    ) -> Result<()> {
        tracing::info!(channel = %channel, message_id = %message_id, %from, %to, "replace_own_reaction_on_message");
        Ok(())
    }

    async fn reply_in_thread(&self, channel: &ChannelId, parent_message_id: &MessageId, text: &str) -> Result<()> {
        tracing::info!(channel = %channel, parent = %parent_message_id, %text, "reply_in_thread");
        Ok(())
    }

    async fn reply_in_thread_with_id(
        &self,
        channel: &ChannelId,
        parent_message_id: &MessageId,
        text: &str,
    ) -> Result<MessageId> {
        let message_id = self.fresh_message_id();
        tracing::info!(channel = %channel, parent = %parent_message_id, %text, message_id = %message_id, "reply_in_thread_with_id");
        Ok(message_id)
    }

    async fn send_to_channel_with_files(&self, channel: &ChannelId, text: &str, files: &[(String, Vec<u8>)]) -> Result<()> {
        let file_names: Vec<&str> = files.iter().map(|(name, _)| name.as_str()).collect();
        tracing::info!(channel = %channel, %text, files = ?file_names, "send_to_channel_with_files");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_with_id_returns_distinct_ids() {
        let messaging = LoggingMessaging::new(Platform::Discord);
        let channel = ChannelId::from("ch-1");
        let a = messaging.send_to_channel_with_id(&channel, "a").await.unwrap();
        let b = messaging.send_to_channel_with_id(&channel, "b").await.unwrap();
        assert_ne!(a, b);
    }
}
