//! HTTP handlers.
//!
//! # Routes (nested under `/api`)
//!
//! - `POST /extract`: upload a file, get the panel back with the text
//! - `POST /download`: generate a document from the last extracted file
//! - `GET /downloads/{token}`: fetch a generated document, once
//! - `GET /sessions/{id}`: JSON snapshot of a session
//!
//! [`pages`] and [`health`] are mounted at the root by the server.

mod download;
mod error;
mod extract;
pub mod health;
pub mod pages;
mod sessions;

use axum::{
    Router,
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};

pub use download::{DownloadForm, download_handler, fetch_download};
pub use error::ApiError;
pub use extract::extract_handler;
pub use sessions::{SessionView, get_session};

use crate::AppState;
use crate::session::Session;
use crate::ui::{PendingDownload, render_page, render_panel};

/// Router for everything under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/extract", post(extract_handler))
        .route("/download", post(download_handler))
        .route("/downloads/{token}", get(fetch_download))
        .route("/sessions/{id}", get(get_session))
}

/// Whether the request was issued by HTMX.
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Render a session as the `#uploader` fragment for HTMX, or as a full page
/// for plain form posts.
pub(crate) fn render_session(
    headers: &HeaderMap,
    session: &Session,
    download: Option<PendingDownload<'_>>,
) -> Response {
    let snapshot = session.snapshot();
    let body = if is_htmx(headers) {
        render_panel(session.id(), &snapshot, download)
    } else {
        render_page(session.id(), &snapshot, download)
    };
    Html(body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));

        headers.insert("HX-Request", HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));

        headers.insert("HX-Request", HeaderValue::from_static("false"));
        assert!(!is_htmx(&headers));
    }
}
