use axum::{Json, extract::State};
use serde::Serialize;

use crate::AppState;
use crate::ocr::BackendHealth;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: BackendHealth,
    pub sessions: usize,
    pub pending_downloads: usize,
}

/// GET /health - Liveness of this server plus reachability of the OCR backend.
///
/// Always 200 while the server runs; check `backend.reachable` for the backend.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = state.backend.health().await;
    if !backend.reachable {
        tracing::warn!(
            name: "backend.unreachable",
            status = ?backend.status,
            message = ?backend.message,
            "OCR backend health check failed"
        );
    }

    Json(HealthResponse {
        status: "ok",
        backend,
        sessions: state.sessions.len(),
        pending_downloads: state.downloads.len(),
    })
}
