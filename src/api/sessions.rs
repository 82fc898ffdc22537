use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use super::ApiError;
use crate::AppState;
use crate::session::SessionSnapshot;

/// Session DTO for API responses.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: String,
    #[serde(flatten)]
    pub state: SessionSnapshot,
}

/// GET /api/sessions/{id} - Inspect a session's component state.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Session '{id}' not found")))?;

    Ok(Json(SessionView {
        id: session.id().to_string(),
        state: session.snapshot(),
    }))
}
