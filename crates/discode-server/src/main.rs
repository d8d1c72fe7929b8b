use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use discode_core::config::DiscodeConfig;
use discode_core::types::ProjectRegistry;
use discode_messaging::{LoggingMessaging, Platform};

mod app;
mod http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "discode_server=info,tower_http=debug".into()),
        )
        .init();

    // Config path: explicit env override > DISCODE_CONFIG > defaults.
    let config_path = std::env::var("DISCODE_CONFIG").ok();
    let config = DiscodeConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("config load failed ({}), using defaults", e);
        DiscodeConfig::default()
    });

    // Project routing table: maintained by the external orchestrator and
    // refreshed on disk as projects/instances come and go. The core only
    // ever reads it.
    let registry = match std::env::var("DISCODE_ROUTES_PATH") {
        Ok(path) => ProjectRegistry::load_from_file(std::path::Path::new(&path)).unwrap_or_else(|e| {
            tracing::warn!("failed to load routing table from {} ({}), starting empty", path, e);
            ProjectRegistry::new()
        }),
        Err(_) => {
            tracing::warn!("DISCODE_ROUTES_PATH not set, starting with an empty routing table");
            ProjectRegistry::new()
        }
    };

    // No concrete Slack/Discord client lives in this workspace — chat
    // adapters are external collaborators, consumed only through
    // `Messaging`. Standalone runs log every chat-side effect instead;
    // an embedding orchestrator swaps in a real adapter via `AppState::new`.
    let messaging = Arc::new(LoggingMessaging::new(Platform::Discord));

    let state = Arc::new(app::AppState::new(Arc::new(registry), messaging, &config));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    info!("discode hook server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
