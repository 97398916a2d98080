use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use shared::protocol::EVENTS_ROUTE;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::MAX_IMAGE_BYTES;
use app_state::AppState;
use config::load_settings;

/// Room for the image plus the text parts around it.
const MAX_REQUEST_BYTES: usize = MAX_IMAGE_BYTES + 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    if settings.database_url.is_none() {
        warn!("DATABASE_URL is not set; event requests will fail until it is configured");
    }

    let state = AppState::new(settings.database_url);
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(EVENTS_ROUTE, post(api::create_event))
        .route(&format!("{EVENTS_ROUTE}/:event_id"), get(api::get_event))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .with_state(state)
}

/// Pings the database only when a connection is already cached.
async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    let Some(storage) = state.db.cached().await else {
        return (StatusCode::OK, "ok");
    };
    match storage.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(error) => {
            warn!(error = %error, "database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
