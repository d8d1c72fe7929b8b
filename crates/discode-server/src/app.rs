//! Shared application state and router assembly for the hook HTTP server
//! (C9): a thin Axum layer binding the event pipeline (C5) to the network.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::connect_info::ConnectInfo;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Router, extract::Request};

use discode_core::config::DiscodeConfig;
use discode_core::types::ProjectRegistry;
use discode_hooks::{PendingTracker, StreamingUpdater, TaskChecklists};
use discode_messaging::Messaging;
use discode_pipeline::dispatch::{Deps, KeyLocks};
use discode_pipeline::metrics::Metrics;
use discode_pipeline::timers::TimerRegistry;

/// Everything an Axum handler needs: the pipeline's deps bundle plus the
/// per-key lock table dispatch serializes on.
pub struct AppState {
    pub deps: Deps,
    pub key_locks: KeyLocks,
}

impl AppState {
    pub fn new(registry: Arc<ProjectRegistry>, messaging: Arc<dyn Messaging>, config: &DiscodeConfig) -> Self {
        Self {
            deps: Deps {
                registry,
                messaging,
                pending: Arc::new(PendingTracker::new()),
                tasks: Arc::new(TaskChecklists::new()),
                streaming: Arc::new(StreamingUpdater::new(
                    config.streaming.debounce_ms,
                    config.streaming.rollover_chars,
                )),
                metrics: Arc::new(Metrics::new()),
                timers: Arc::new(TimerRegistry::new()),
                timeouts: config.timeouts.clone(),
            },
            key_locks: KeyLocks::new(),
        }
    }
}

/// Assemble the router. Loopback enforcement runs as middleware ahead of
/// every route so a misconfigured reverse proxy can't expose the ingress.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/opencode-event", post(crate::http::hooks::hook_handler))
        .route("/health", get(crate::http::health::health_handler))
        .with_state(state)
        .layer(middleware::from_fn(loopback_only))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Refuse any peer that isn't connecting from loopback. `ConnectInfo` is
/// populated by `into_make_service_with_connect_info` in `main.rs`.
async fn loopback_only(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if is_loopback(addr.ip()) {
        next.run(request).await
    } else {
        (StatusCode::FORBIDDEN, "loopback only").into_response()
    }
}

fn is_loopback(ip: IpAddr) -> bool {
    ip.is_loopback()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_addresses_are_recognized() {
        assert!(is_loopback("127.0.0.1".parse().unwrap()));
        assert!(is_loopback("::1".parse().unwrap()));
        assert!(!is_loopback("10.0.0.5".parse().unwrap()));
    }
}
