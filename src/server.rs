use axum::{Router, extract::DefaultBodyLimit, routing::get};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use tracing::{debug, info, warn};

use crate::AppState;
use crate::api;
use crate::config::AppConfig;
use crate::ocr::HttpOcrBackend;

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    // Same layer type either way; an empty CorsLayer adds no CORS headers.
    let cors = if state.config.server.cors_enabled {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/", get(api::pages::index_handler))
        .route("/health", get(api::health::health_handler))
        .nest("/api", api::router())
        .nest_service("/static", ServeDir::new(&state.config.server.static_dir))
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically drop idle sessions and unclaimed downloads.
pub fn spawn_sweeper(state: AppState) -> tokio::task::JoinHandle<()> {
    let every = Duration::from_secs(state.config.session.sweep_interval_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let (sessions, downloads) = state.sweep_expired();
            if sessions + downloads > 0 {
                debug!(
                    name: "sessions.swept",
                    sessions,
                    downloads,
                    "Expired state removed"
                );
            }
        }
    })
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let backend = HttpOcrBackend::new(&config.backend)?;
    info!(
        name: "backend.config.loaded",
        base_url = %backend.base_url(),
        extract_path = %config.backend.extract_path,
        document_path = %config.backend.document_path,
        "OCR backend configured"
    );

    let state = AppState::new(Arc::new(backend), Arc::clone(&config));

    // Informational only; the backend may come up after us.
    let health = state.backend.health().await;
    if health.reachable {
        info!(
            name: "backend.reachable",
            message = ?health.message,
            "OCR backend is reachable"
        );
    } else {
        warn!(
            name: "backend.unreachable",
            status = ?health.status,
            message = ?health.message,
            "OCR backend is not reachable yet"
        );
    }

    let sweeper = spawn_sweeper(state.clone());
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!(name: "server.stopped", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
