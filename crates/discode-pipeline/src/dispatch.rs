//! Event pipeline (C5): validate → resolve → serialize per key → dispatch
//! to typed handlers. This is the only place that owns the per-key lock —
//! everything downstream (pending tracker, checklists, streaming updater)
//! assumes it is already running under that key's lock.

use std::sync::Arc;

use dashmap::DashMap;
use discode_core::config::TimeoutsConfig;
use discode_core::types::{InstanceKey, ProjectName, ProjectRegistry};
use discode_hooks::{HookError, PendingTracker, StreamingUpdater, TaskChecklists};
use discode_messaging::Messaging;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::handlers;
use crate::metrics::Metrics;
use crate::timers::TimerRegistry;

/// Shared collaborators every handler invocation needs. Bundled together
/// and passed by reference so handlers never have to reach for a
/// process-wide singleton (the metrics counter aside, which is explicitly
/// append-only and safe to share).
pub struct Deps {
    pub registry: Arc<ProjectRegistry>,
    pub messaging: Arc<dyn Messaging>,
    pub pending: Arc<PendingTracker>,
    pub tasks: Arc<TaskChecklists>,
    pub streaming: Arc<StreamingUpdater>,
    pub metrics: Arc<Metrics>,
    pub timers: Arc<TimerRegistry>,
    pub timeouts: TimeoutsConfig,
}

/// One mutex per `(projectName, instanceKey)`, created lazily. Handlers
/// for the same key run strictly in arrival order; different keys proceed
/// concurrently.
#[derive(Default)]
pub struct KeyLocks {
    locks: DashMap<(ProjectName, InstanceKey), Arc<Mutex<()>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, key: &(ProjectName, InstanceKey)) -> Arc<Mutex<()>> {
        self.locks.entry(key.clone()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

/// Result of processing one inbound event, mapped directly onto the HTTP
/// response the hook server returns.
#[derive(Debug)]
pub enum DispatchOutcome {
    Ok,
    EnvelopeInvalid(Vec<String>),
    RouteNotFound,
    HandlerError(String),
}

pub async fn handle_event(deps: &Deps, key_locks: &KeyLocks, payload: &Value) -> DispatchOutcome {
    let envelope = match discode_hooks::validate(payload) {
        Ok(envelope) => envelope,
        Err(errors) => return DispatchOutcome::EnvelopeInvalid(errors),
    };

    deps.metrics.record(envelope.event_type.as_str());

    let project_name = ProjectName::from(envelope.project_name.clone());
    let ctx = match discode_hooks::resolve(
        &deps.registry,
        &project_name,
        envelope.agent_type.as_deref(),
        envelope.instance_id.as_deref(),
        envelope.text.clone(),
    ) {
        Ok(ctx) => ctx,
        Err(HookError::UnknownProject(_)) | Err(HookError::UnknownChannel { .. }) => {
            return DispatchOutcome::RouteNotFound
        }
        Err(HookError::EnvelopeInvalid(errors)) => return DispatchOutcome::EnvelopeInvalid(errors),
    };

    let key = (ctx.project_name.clone(), ctx.instance_key.clone());
    let lock = key_locks.lock_for(&key);
    let _guard = lock.lock().await;

    let pending_snapshot = deps.pending.get_pending(&key);
    let ctx = discode_hooks::EventContext { pending_snapshot, ..ctx };

    match handlers::dispatch(deps, &ctx, &envelope).await {
        Ok(()) => DispatchOutcome::Ok,
        Err(message) => DispatchOutcome::HandlerError(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_key_reuses_the_same_lock() {
        let locks = KeyLocks::new();
        let key = (ProjectName::from("p"), InstanceKey::new(&Default::default(), None));
        let a = locks.lock_for(&key);
        let b = locks.lock_for(&key);
        assert!(Arc::ptr_eq(&a, &b));
    }
}
