//! `POST /opencode-event` — the hook ingress all agent plugins share; the
//! event's own `agentType` field discriminates which adapter it came from.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use discode_pipeline::dispatch::{self, DispatchOutcome};

use crate::app::AppState;

pub async fn hook_handler(State(state): State<Arc<AppState>>, Json(payload): Json<Value>) -> (StatusCode, Json<Value>) {
    match dispatch::handle_event(&state.deps, &state.key_locks, &payload).await {
        DispatchOutcome::Ok => (StatusCode::OK, Json(json!({"ok": true}))),
        DispatchOutcome::EnvelopeInvalid(errors) => {
            (StatusCode::BAD_REQUEST, Json(json!({"ok": false, "errors": errors})))
        }
        DispatchOutcome::RouteNotFound => {
            (StatusCode::NOT_FOUND, Json(json!({"ok": false, "reason": "no channel"})))
        }
        DispatchOutcome::HandlerError(message) => {
            tracing::error!(error = %message, "hook handler raised past its safety net");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"ok": false, "error": message})))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use discode_core::config::DiscodeConfig;
    use discode_core::types::{AgentType, ChannelId, ProjectEntry, ProjectName, ProjectRegistry};
    use discode_messaging::{LoggingMessaging, Platform};
    use std::collections::{BTreeMap, BTreeSet};

    fn state_with_one_project() -> Arc<AppState> {
        let mut registry = ProjectRegistry::new();
        let mut channels = BTreeMap::new();
        channels.insert(AgentType::from("claude"), ChannelId::from("ch-claude"));
        let mut agents_enabled = BTreeSet::new();
        agents_enabled.insert(AgentType::from("claude"));
        registry.insert(
            ProjectName::from("demo"),
            ProjectEntry {
                project_path: "/tmp/demo".into(),
                agents_enabled,
                channels,
                instances: BTreeMap::new(),
            },
        );

        let messaging = Arc::new(LoggingMessaging::new(Platform::Discord));
        Arc::new(AppState::new(Arc::new(registry), messaging, &DiscodeConfig::default()))
    }

    #[tokio::test]
    async fn valid_event_for_known_project_returns_200() {
        let state = state_with_one_project();
        let payload = json!({"type": "session.notification", "projectName": "demo", "text": "hi"});
        let (status, body) = hook_handler(State(state), Json(payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.0, json!({"ok": true}));
    }

    #[tokio::test]
    async fn missing_required_fields_returns_400() {
        let state = state_with_one_project();
        let (status, _) = hook_handler(State(state), Json(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_project_returns_404() {
        let state = state_with_one_project();
        let payload = json!({"type": "session.start", "projectName": "nope"});
        let (status, body) = hook_handler(State(state), Json(payload)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0["reason"], json!("no channel"));
    }

    #[tokio::test]
    async fn unrecognized_type_still_acks_200() {
        let state = state_with_one_project();
        let payload = json!({"type": "mystery.event", "projectName": "demo"});
        let (status, _) = hook_handler(State(state), Json(payload)).await;
        assert_eq!(status, StatusCode::OK);
    }
}
