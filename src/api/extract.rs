//! Upload-and-extract handler.
//!
//! POST /api/extract

use axum::{
    extract::{Multipart, State, multipart::MultipartError},
    http::HeaderMap,
    response::Response,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::render_session;
use crate::AppState;
use crate::ocr::{OcrBackend, UploadedFile};
use crate::session::{BeginError, Session};

/// Fields of the extract form.
#[derive(Debug, Default)]
struct ExtractForm {
    session_id: String,
    file: Option<UploadedFile>,
}

/// Read the multipart body into `form`, keeping whatever arrived before an error.
///
/// A file part with an empty filename is what browsers send when nothing was
/// picked, so it counts as no file.
async fn read_fields(multipart: &mut Multipart, form: &mut ExtractForm) -> Result<(), MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("session_id") => {
                form.session_id = field.text().await?;
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                if !file_name.is_empty() {
                    form.file = Some(UploadedFile::new(file_name, content_type.as_deref(), bytes));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Send the uploaded file to the text-extraction endpoint and render the result.
///
/// Exactly one backend attempt per request. The returned panel carries the
/// outcome in its status line. The attempt finishes and clears the busy flag
/// even if the client goes away first.
pub async fn extract_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut form = ExtractForm::default();
    let read = read_fields(&mut multipart, &mut form).await;
    let session = state.sessions.get_or_create(&form.session_id);

    if let Err(e) = read {
        warn!(
            name: "ocr.extract.rejected",
            session_id = %session.id(),
            error = %e,
            "Could not read upload"
        );
        session.with_state(|s| s.fail(format!("Could not read upload: {}", e.body_text())));
        return render_session(&headers, &session, None);
    }

    let begun = session.with_state(|s| s.begin_extraction_with(form.file));

    let file = match begun {
        Ok(file) => file,
        Err(BeginError::Busy) => {
            warn!(
                name: "ocr.extract.busy",
                session_id = %session.id(),
                "Extraction already in progress; ignoring request"
            );
            return render_session(&headers, &session, None);
        }
        Err(BeginError::NoFileSelected) => {
            return render_session(&headers, &session, None);
        }
    };

    // Detached so a dropped request still records an outcome.
    let task = tokio::spawn(run_extraction(
        Arc::clone(&state.backend),
        session.clone(),
        file,
    ));
    if let Err(e) = task.await {
        error!(
            name: "ocr.extract.aborted",
            session_id = %session.id(),
            error = %e,
            "Extraction task did not finish"
        );
        session.with_state(|s| s.abandon_extraction("Extraction was interrupted."));
    }

    render_session(&headers, &session, None)
}

/// One backend attempt, reported back into the session.
async fn run_extraction(backend: Arc<dyn OcrBackend>, session: Session, file: UploadedFile) {
    info!(
        name: "ocr.extract.started",
        session_id = %session.id(),
        file = %file.file_name,
        content_type = %file.content_type,
        size = file.len(),
        "Sending file for text extraction"
    );

    let outcome = backend.extract_text(&file).await;
    match &outcome {
        Ok(text) => info!(
            name: "ocr.extract.completed",
            session_id = %session.id(),
            file = %file.file_name,
            chars = text.chars().count(),
            "Text extracted"
        ),
        Err(e) => warn!(
            name: "ocr.extract.failed",
            session_id = %session.id(),
            file = %file.file_name,
            status = ?e.status(),
            error = %e,
            "Text extraction failed"
        ),
    }

    session.with_state(|s| s.complete_extraction(file, outcome));
}
