//! Download-as-document handlers.
//!
//! `POST /api/download` asks the backend for a document built from the file
//! that produced the current text and parks it in the download store. The
//! returned panel links to `GET /api/downloads/{token}`, which hands the
//! document out exactly once.

use axum::{
    Form,
    extract::{Path, State},
    http::{
        HeaderMap, HeaderValue,
        header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::{ApiError, render_session};
use crate::AppState;
use crate::ocr::UploadedFile;
use crate::session::{Session, UploadSession};
use crate::ui::PendingDownload;

const GENERIC_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub session_id: String,
}

/// Request a document for the remembered file.
///
/// No-op when the session has no extracted file yet.
pub async fn download_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<DownloadForm>,
) -> Response {
    let session = state.sessions.get_or_create(&form.session_id);

    let Some(file) = session.with_state(UploadSession::begin_download) else {
        debug!(
            session_id = %session.id(),
            "Nothing to download; ignoring request"
        );
        return render_session(&headers, &session, None);
    };

    // Detached so a dropped request still records an outcome.
    let task = tokio::spawn(run_download(state.clone(), session.clone(), file));
    match task.await {
        Ok(Some(token)) => {
            let pending = PendingDownload {
                token: &token,
                file_name: &state.config.download.file_name,
            };
            render_session(&headers, &session, Some(pending))
        }
        Ok(None) => render_session(&headers, &session, None),
        Err(e) => {
            error!(
                name: "ocr.document.aborted",
                session_id = %session.id(),
                error = %e,
                "Document task did not finish"
            );
            session.with_state(|s| s.abandon_download("Download was interrupted."));
            render_session(&headers, &session, None)
        }
    }
}

/// One backend attempt, reported back into the session.
///
/// Returns the download token when a document was parked.
async fn run_download(state: AppState, session: Session, file: UploadedFile) -> Option<String> {
    match state.backend.extract_document(&file).await {
        Ok(document) => {
            let size = document.bytes.len();
            let token = state.downloads.insert(document);
            session.with_state(|s| s.complete_download(Ok(())));
            info!(
                name: "ocr.document.completed",
                session_id = %session.id(),
                file = %file.file_name,
                size,
                "Document ready for download"
            );
            Some(token)
        }
        Err(e) => {
            warn!(
                name: "ocr.document.failed",
                session_id = %session.id(),
                file = %file.file_name,
                status = ?e.status(),
                error = %e,
                "Document extraction failed"
            );
            session.with_state(|s| s.complete_download(Err(e)));
            None
        }
    }
}

/// Hand out a parked document and revoke its token.
pub async fn fetch_download(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    let document = state.downloads.take(&token).ok_or_else(|| {
        ApiError::NotFound(format!("Download '{token}' not found or already fetched"))
    })?;

    let settings = &state.config.download;
    let content_type = document
        .content_type
        .as_deref()
        .filter(|ct| !ct.is_empty() && *ct != GENERIC_CONTENT_TYPE)
        .unwrap_or(settings.content_type.as_str());
    let content_type = HeaderValue::from_str(content_type)
        .map_err(|e| ApiError::Internal(format!("Invalid content type: {e}")))?;
    let disposition = HeaderValue::from_str(&content_disposition(&settings.file_name))
        .map_err(|e| ApiError::Internal(format!("Invalid download filename: {e}")))?;

    debug!(token = %token, size = document.bytes.len(), "Download fetched");

    Ok((
        [
            (CONTENT_TYPE, content_type),
            (CONTENT_DISPOSITION, disposition),
            (CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        document.bytes,
    )
        .into_response())
}

/// `attachment; filename="..."` with quotes and backslashes stripped.
fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect();
    format!("attachment; filename=\"{safe}\"")
}
