//! `GET /health` — liveness probe. Exposes per-event-type counters from the
//! process-wide metrics map so an operator can see the pipeline is alive
//! and which event types are flowing without scraping chat.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::app::AppState;

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "events_total": state.deps.metrics.total(),
        "events_by_type": state.deps.metrics.snapshot(),
    }))
}
