//! Idle/thinking timers: background tasks armed per `(projectName,
//! instanceKey)` and cancelled by a later event on the same key. Used for
//! the "thinking for a while" placeholder and for timing out a turn that
//! never receives a completion event.

use std::sync::Arc;

use dashmap::DashMap;
use discode_core::types::{InstanceKey, ProjectName};
use tokio_util::sync::CancellationToken;

pub type TimerKey = (ProjectName, InstanceKey);

#[derive(Default)]
pub struct TimerRegistry {
    tokens: DashMap<TimerKey, CancellationToken>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a fresh timer for `key`, cancelling whatever was armed before.
    /// Returns the token the caller's spawned task should race against a
    /// sleep with.
    pub fn arm(&self, key: TimerKey) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(old) = self.tokens.insert(key, token.clone()) {
            old.cancel();
        }
        token
    }

    pub fn cancel(&self, key: &TimerKey) {
        if let Some((_, token)) = self.tokens.remove(key) {
            token.cancel();
        }
    }
}

pub type SharedTimerRegistry = Arc<TimerRegistry>;

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> TimerKey {
        (ProjectName::from("p"), InstanceKey::new(&Default::default(), None))
    }

    #[tokio::test]
    async fn arming_twice_cancels_the_first_token() {
        let registry = TimerRegistry::new();
        let first = registry.arm(key());
        let _second = registry.arm(key());
        assert!(first.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_cancels_the_armed_token() {
        let registry = TimerRegistry::new();
        let token = registry.arm(key());
        registry.cancel(&key());
        assert!(token.is_cancelled());
    }
}
