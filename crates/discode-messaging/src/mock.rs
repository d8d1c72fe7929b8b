//! An in-memory `Messaging` double used by pipeline and hook-crate tests so
//! handler behavior can be asserted against without a real chat adapter.

use async_trait::async_trait;
use discode_core::types::{ChannelId, MessageId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::Result;
use crate::messaging::Messaging;
use crate::platform::Platform;

/// One recorded call, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Send { channel: ChannelId, text: String },
    SendWithId { channel: ChannelId, text: String, message_id: MessageId },
    Update { channel: ChannelId, message_id: MessageId, text: String },
    AddReaction { channel: ChannelId, message_id: MessageId, emoji: String },
    ReplaceReaction { channel: ChannelId, message_id: MessageId, from: String, to: String },
    ReplyInThread { channel: ChannelId, parent: MessageId, text: String },
}

pub struct RecordingMessaging {
    platform: Platform,
    calls: Mutex<Vec<RecordedCall>>,
    next_id: AtomicU64,
}

impl RecordingMessaging {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn fresh_message_id(&self) -> MessageId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        MessageId::from(format!("mock-msg-{n}"))
    }
}

#[async_trait]
impl Messaging for RecordingMessaging {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn send_to_channel(&self, channel: &ChannelId, text: &str) -> Result<()> {
        self.calls.lock().unwrap().push(RecordedCall::Send {
            channel: channel.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_to_channel_with_id(&self, channel: &ChannelId, text: &str) -> Result<MessageId> {
        let message_id = self.fresh_message_id();
        self.calls.lock().unwrap().push(RecordedCall::SendWithId {
            channel: channel.clone(),
            text: text.to_string(),
            message_id: message_id.clone(),
        });
        Ok(message_id)
    }

    async fn update_message(&self, channel: &ChannelId, message_id: &MessageId, text: &str) -> Result<()> {
        self.calls.lock().unwrap().push(RecordedCall::Update {
            channel: channel.clone(),
            message_id: message_id.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn add_reaction_to_message(&self, channel: &ChannelId, message_id: &MessageId, emoji: &str) -> Result<()> {
        self.calls.lock().unwrap().push(RecordedCall::AddReaction {
            channel: channel.clone(),
            message_id: message_id.clone(),
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn replace_own_reaction_on_message(
        &self,
        channel: &ChannelId,
        message_id: &MessageId,
        from: &str,
        to: &str,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(RecordedCall::ReplaceReaction {
            channel: channel.clone(),
            message_id: message_id.clone(),
            from: from.to_string(),
            to: to.to_string(),
        });
        Ok(())
    }

    async fn reply_in_thread(&self, channel: &ChannelId, parent_message_id: &MessageId, text: &str) -> Result<()> {
        self.calls.lock().unwrap().push(RecordedCall::ReplyInThread {
            channel: channel.clone(),
            parent: parent_message_id.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn reply_in_thread_with_id(
        &self,
        channel: &ChannelId,
        parent_message_id: &MessageId,
        text: &str,
    ) -> Result<MessageId> {
        let message_id = self.fresh_message_id();
        self.calls.lock().unwrap().push(RecordedCall::ReplyInThread {
            channel: channel.clone(),
            parent: parent_message_id.clone(),
            text: text.to_string(),
        });
        Ok(message_id)
    }

    async fn send_to_channel_with_files(&self, channel: &ChannelId, text: &str, _files: &[(String, Vec<u8>)]) -> Result<()> {
        self.calls.lock().unwrap().push(RecordedCall::Send {
            channel: channel.clone(),
            text: text.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_in_order() {
        let messaging = RecordingMessaging::new(Platform::Discord);
        let channel = ChannelId::from("ch-1");
        messaging.send_to_channel(&channel, "hello").await.unwrap();
        let message_id = messaging.send_to_channel_with_id(&channel, "placeholder").await.unwrap();
        messaging.update_message(&channel, &message_id, "updated").await.unwrap();

        let calls = messaging.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(&calls[0], RecordedCall::Send { text, .. } if text == "hello"));
        assert!(matches!(&calls[2], RecordedCall::Update { text, .. } if text == "updated"));
    }
}
