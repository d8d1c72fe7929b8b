//! Pending-turn tracker (C8): binds each inbound chat message to the agent
//! output it produced, until the turn closes. At most one open turn per
//! `(projectName, instanceKey)` — a new open on an already-open key
//! silently replaces it, matching a user sending a second message before
//! the agent finished the first.

use std::sync::Arc;

use dashmap::DashMap;
use discode_core::types::{ChannelId, InstanceKey, MessageId, ProjectName};
use discode_messaging::Messaging;

/// Key a turn is tracked under.
pub type PendingKey = (ProjectName, InstanceKey);

/// Snapshot of an open turn, handed to handlers that need to react on the
/// originating user message (thinking reactions, error markers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSnapshot {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub start_message_id: Option<MessageId>,
}

#[derive(Debug, Clone)]
struct PendingTurn {
    channel_id: ChannelId,
    message_id: MessageId,
    start_message_id: Option<MessageId>,
}

/// Process-wide table of open turns, one entry per `(projectName,
/// instanceKey)`. Safe to share across handler tasks — the map itself
/// provides the fine-grained locking; callers still serialize same-key work
/// at a higher level (see the streaming updater) to keep ordering sane.
#[derive(Debug, Default)]
pub struct PendingTracker {
    turns: DashMap<PendingKey, PendingTurn>,
}

impl PendingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new turn for `key`, replacing any turn already open there.
    pub fn open_turn(&self, key: PendingKey, channel_id: ChannelId, message_id: MessageId) {
        self.turns.insert(
            key,
            PendingTurn {
                channel_id,
                message_id,
                start_message_id: None,
            },
        );
    }

    pub fn get_pending(&self, key: &PendingKey) -> Option<PendingSnapshot> {
        self.turns.get(key).map(|turn| PendingSnapshot {
            channel_id: turn.channel_id.clone(),
            message_id: turn.message_id.clone(),
            start_message_id: turn.start_message_id.clone(),
        })
    }

    pub fn has_pending(&self, key: &PendingKey) -> bool {
        self.turns.contains_key(key)
    }

    pub fn mark_completed(&self, key: &PendingKey) {
        self.turns.remove(key);
    }

    pub fn mark_error(&self, key: &PendingKey) {
        self.turns.remove(key);
    }

    /// Lazily post an "agent is working" placeholder for `key`'s turn and
    /// remember its id as `startMessageId`, returning it. If a
    /// `startMessageId` already exists, no new message is posted. Returns
    /// `None` if there is no open turn for `key`.
    ///
    /// The turn entry is read, then dropped, before the `await` — a
    /// `DashMap` guard must never be held across a suspension point.
    pub async fn ensure_start_message(
        &self,
        key: &PendingKey,
        messaging: &dyn Messaging,
        seed: &str,
    ) -> Option<MessageId> {
        let (channel_id, existing) = {
            let turn = self.turns.get(key)?;
            (turn.channel_id.clone(), turn.start_message_id.clone())
        };

        if let Some(existing) = existing {
            return Some(existing);
        }

        let message_id = messaging.send_to_channel_with_id(&channel_id, seed).await.ok()?;

        if let Some(mut turn) = self.turns.get_mut(key) {
            turn.start_message_id = Some(message_id.clone());
        }

        Some(message_id)
    }
}

pub type SharedPendingTracker = Arc<PendingTracker>;

#[cfg(test)]
mod tests {
    use super::*;
    use discode_messaging::{Platform, RecordingMessaging};

    fn key() -> PendingKey {
        (ProjectName::from("p"), InstanceKey::new(&Default::default(), None))
    }

    #[test]
    fn open_turn_replaces_previous_open_turn() {
        let tracker = PendingTracker::new();
        let k = key();
        tracker.open_turn(k.clone(), ChannelId::from("ch"), MessageId::from("m1"));
        tracker.open_turn(k.clone(), ChannelId::from("ch"), MessageId::from("m2"));

        let snapshot = tracker.get_pending(&k).unwrap();
        assert_eq!(snapshot.message_id, MessageId::from("m2"));
    }

    #[test]
    fn mark_completed_clears_turn() {
        let tracker = PendingTracker::new();
        let k = key();
        tracker.open_turn(k.clone(), ChannelId::from("ch"), MessageId::from("m1"));
        tracker.mark_completed(&k);
        assert!(!tracker.has_pending(&k));
    }

    #[tokio::test]
    async fn ensure_start_message_is_idempotent() {
        let tracker = PendingTracker::new();
        let messaging = RecordingMessaging::new(Platform::Discord);
        let k = key();
        tracker.open_turn(k.clone(), ChannelId::from("ch"), MessageId::from("m1"));

        let first = tracker.ensure_start_message(&k, &messaging, "working...").await;
        let second = tracker.ensure_start_message(&k, &messaging, "working...").await;
        assert_eq!(first, second);
        assert_eq!(messaging.calls().len(), 1);
    }

    #[tokio::test]
    async fn ensure_start_message_is_none_without_open_turn() {
        let tracker = PendingTracker::new();
        let messaging = RecordingMessaging::new(Platform::Discord);
        let result = tracker.ensure_start_message(&key(), &messaging, "working...").await;
        assert!(result.is_none());
    }
}
