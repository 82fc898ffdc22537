use axum::{
    extract::State,
    response::{Html, IntoResponse},
};

use crate::AppState;
use crate::ui::render_page;

/// Index page handler. Every load starts a fresh session.
pub async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.sessions.create();
    tracing::debug!(session_id = %session.id(), "Session created");
    Html(render_page(session.id(), &session.snapshot(), None))
}
