//! Streaming updater (C7): accumulates assistant text for a turn and edits
//! a single chat message in place, subject to a debounce window and a
//! per-message character budget. When the budget would be exceeded, the
//! current message is left as-is and a continuation message takes over —
//! append order is preserved and no buffered text is ever dropped.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use discode_core::types::{ChannelId, InstanceKey, MessageId, ProjectName};
use discode_messaging::Messaging;

pub type StreamKey = (ProjectName, InstanceKey);

struct StreamEntry {
    channel_id: ChannelId,
    message_id: MessageId,
    /// Text already present in `message_id` on the chat side.
    committed: String,
    /// Text appended since the last flush, not yet edited into the message.
    buffered: String,
    last_flush: Instant,
}

/// Per-`(projectName, instanceKey)` streaming state, shared across the
/// handlers that call into it.
pub struct StreamingUpdater {
    entries: DashMap<StreamKey, StreamEntry>,
    debounce: Duration,
    rollover_chars: usize,
}

impl StreamingUpdater {
    pub fn new(debounce_ms: u64, rollover_chars: usize) -> Self {
        Self {
            entries: DashMap::new(),
            debounce: Duration::from_millis(debounce_ms),
            rollover_chars,
        }
    }

    pub fn has(&self, key: &StreamKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Post a placeholder message and begin tracking it under `key`.
    pub async fn start(
        &self,
        key: StreamKey,
        messaging: &dyn Messaging,
        channel_id: ChannelId,
        seed_text: &str,
    ) -> Option<MessageId> {
        let message_id = messaging.send_to_channel_with_id(&channel_id, seed_text).await.ok()?;
        self.entries.insert(
            key,
            StreamEntry {
                channel_id,
                message_id: message_id.clone(),
                committed: seed_text.to_string(),
                buffered: String::new(),
                last_flush: Instant::now(),
            },
        );
        Some(message_id)
    }

    /// Buffer `text`. Flushes immediately if the debounce window has
    /// elapsed, or if appending would exceed the rollover budget (in which
    /// case the overflow becomes the seed of a new continuation message).
    pub async fn append(&self, key: &StreamKey, messaging: &dyn Messaging, text: &str) {
        let should_flush = {
            let Some(mut entry) = self.entries.get_mut(key) else {
                return;
            };
            entry.buffered.push_str(text);
            let over_budget = entry.committed.len() + entry.buffered.len() > self.rollover_chars;
            let debounce_elapsed = entry.last_flush.elapsed() >= self.debounce;
            over_budget || debounce_elapsed
        };

        if should_flush {
            self.flush(key, messaging).await;
        }
    }

    /// Edit the buffered text into the tracked message, rolling into a
    /// continuation message first if the combined text would overflow.
    async fn flush(&self, key: &StreamKey, messaging: &dyn Messaging) {
        let (channel_id, message_id, committed, buffered, over_budget) = {
            let Some(entry) = self.entries.get(key) else {
                return;
            };
            let over_budget = entry.committed.len() + entry.buffered.len() > self.rollover_chars;
            (
                entry.channel_id.clone(),
                entry.message_id.clone(),
                entry.committed.clone(),
                entry.buffered.clone(),
                over_budget,
            )
        };

        if buffered.is_empty() {
            return;
        }

        if over_budget {
            let Ok(new_message_id) = messaging.send_to_channel_with_id(&channel_id, &buffered).await else {
                return;
            };
            if let Some(mut entry) = self.entries.get_mut(key) {
                entry.message_id = new_message_id;
                entry.committed = buffered;
                entry.buffered.clear();
                entry.last_flush = Instant::now();
            }
            return;
        }

        let combined = format!("{committed}{buffered}");
        if messaging.update_message(&channel_id, &message_id, &combined).await.is_ok() {
            if let Some(mut entry) = self.entries.get_mut(key) {
                entry.committed = combined;
                entry.buffered.clear();
                entry.last_flush = Instant::now();
            }
        }
    }

    /// Flush any remaining buffered text, then stop tracking `key`.
    pub async fn finalize(&self, key: &StreamKey, messaging: &dyn Messaging) {
        self.flush(key, messaging).await;
        self.entries.remove(key);
    }

    /// Drop buffered text and stop tracking `key` without editing chat.
    pub fn discard(&self, key: &StreamKey) {
        self.entries.remove(key);
    }
}

pub type SharedStreamingUpdater = Arc<StreamingUpdater>;

#[cfg(test)]
mod tests {
    use super::*;
    use discode_messaging::{Platform, RecordingMessaging};

    fn key() -> StreamKey {
        (ProjectName::from("p"), InstanceKey::new(&Default::default(), None))
    }

    #[tokio::test]
    async fn append_then_finalize_edits_combined_text() {
        let updater = StreamingUpdater::new(0, 1950);
        let messaging = RecordingMessaging::new(Platform::Discord);
        let k = key();
        updater.start(k.clone(), &messaging, ChannelId::from("ch"), "...").await;
        updater.append(&k, &messaging, "hello ").await;
        updater.append(&k, &messaging, "world").await;
        updater.finalize(&k, &messaging).await;

        assert!(!updater.has(&k));
        let calls = messaging.calls();
        let last_update = calls
            .iter()
            .rev()
            .find_map(|c| match c {
                discode_messaging::mock::RecordedCall::Update { text, .. } => Some(text.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_update, "...hello world");
    }

    #[tokio::test]
    async fn discard_drops_buffer_without_editing() {
        let updater = StreamingUpdater::new(60_000, 1950);
        let messaging = RecordingMessaging::new(Platform::Discord);
        let k = key();
        updater.start(k.clone(), &messaging, ChannelId::from("ch"), "...").await;
        updater.append(&k, &messaging, "buffered but never sent").await;
        updater.discard(&k);

        assert!(!updater.has(&k));
        assert!(messaging
            .calls()
            .iter()
            .all(|c| !matches!(c, discode_messaging::mock::RecordedCall::Update { .. })));
    }

    #[tokio::test]
    async fn overflowing_rollover_budget_starts_a_continuation_message() {
        let updater = StreamingUpdater::new(60_000, 10);
        let messaging = RecordingMessaging::new(Platform::Discord);
        let k = key();
        updater.start(k.clone(), &messaging, ChannelId::from("ch"), "seed").await;
        updater.append(&k, &messaging, "this text is much longer than the budget").await;

        let calls = messaging.calls();
        assert!(calls
            .iter()
            .filter(|c| matches!(c, discode_messaging::mock::RecordedCall::SendWithId { .. }))
            .count()
            >= 2);
    }
}
