//! The uploader panel.
//!
//! Rendered in full by `GET /` and re-rendered as a fragment after every
//! extract or download request. HTMX swaps the fragment into `#uploader`;
//! without HTMX the forms post normally and get the whole page back.

use super::html::html_escape;
use super::shell::html_shell;
use crate::ocr::ACCEPTED_MIME_TYPES;
use crate::session::SessionSnapshot;

/// A document parked in the download store, ready to be fetched once.
#[derive(Debug, Clone, Copy)]
pub struct PendingDownload<'a> {
    pub token: &'a str,
    pub file_name: &'a str,
}

/// Full page containing the panel.
pub fn render_page(
    session_id: &str,
    snapshot: &SessionSnapshot,
    download: Option<PendingDownload<'_>>,
) -> String {
    html_shell("Extract", &render_panel(session_id, snapshot, download))
}

/// The `#uploader` fragment.
pub fn render_panel(
    session_id: &str,
    snapshot: &SessionSnapshot,
    download: Option<PendingDownload<'_>>,
) -> String {
    let session_id = html_escape(session_id);

    let mut html = format!(
        r#"<section id="uploader" class="uploader" data-session-id="{session_id}">
    <h1>Extract text from a PDF or image</h1>
{}"#,
        extract_form(&session_id, snapshot.extracting)
    );

    if let Some(status) = &snapshot.status {
        let class = if status.is_error() {
            "status status-error"
        } else {
            "status status-info"
        };
        html.push_str(&format!(
            "    <p id=\"status\" class=\"{class}\" role=\"status\">{}</p>\n",
            html_escape(status.as_str())
        ));
    }

    if !snapshot.extracted_text.is_empty() {
        // Browsers drop one newline directly after <textarea>; lead with one
        // so text that itself starts with a newline survives.
        html.push_str(&format!(
            "    <textarea id=\"extracted-text\" class=\"extracted-text\" rows=\"16\" readonly>\n{}</textarea>\n",
            html_escape(&snapshot.extracted_text)
        ));
        if !snapshot.extracting {
            html.push_str(&download_form(&session_id, snapshot.downloading));
        }
    }

    if let Some(download) = download {
        let file_name = html_escape(download.file_name);
        html.push_str(&format!(
            "    <a id=\"pending-download\" class=\"pending-download\" href=\"/api/downloads/{}\" download=\"{file_name}\" data-auto-download>Save {file_name}</a>\n",
            html_escape(download.token)
        ));
    }

    html.push_str("</section>");
    html
}

fn extract_form(session_id: &str, extracting: bool) -> String {
    let disabled = if extracting { " disabled" } else { "" };
    let label = if extracting {
        "Extracting..."
    } else {
        "Upload &amp; Extract"
    };
    let accept = ACCEPTED_MIME_TYPES.join(",");

    format!(
        r##"    <form id="extract-form" action="/api/extract" method="post" enctype="multipart/form-data"
          hx-post="/api/extract" hx-encoding="multipart/form-data"
          hx-target="#uploader" hx-swap="outerHTML"
          hx-disabled-elt="find input[type=file], find button">
        <input type="hidden" name="session_id" value="{session_id}">
        <input type="file" id="file-input" name="file" accept="{accept}"{disabled}>
        <button type="submit" id="extract-button" class="btn btn-primary"{disabled}>{label}</button>
        <span class="htmx-indicator">Extracting...</span>
    </form>
"##
    )
}

fn download_form(session_id: &str, downloading: bool) -> String {
    let disabled = if downloading { " disabled" } else { "" };
    let label = if downloading {
        "Downloading..."
    } else {
        "Download as Word"
    };

    format!(
        r##"    <form id="download-form" action="/api/download" method="post"
          hx-post="/api/download" hx-target="#uploader" hx-swap="outerHTML"
          hx-disabled-elt="find button">
        <input type="hidden" name="session_id" value="{session_id}">
        <button type="submit" id="download-button" class="btn btn-secondary"{disabled}>{label}</button>
    </form>
"##
    )
}
