//! Upload component state.
//!
//! Pure state: no I/O happens here. Handlers call a `begin_*` method, perform
//! the backend request without holding any lock, then report the outcome with
//! the matching `complete_*` method.

use serde::Serialize;

use crate::ocr::{BackendError, UploadedFile};

/// Status shown after a successful extraction.
pub const EXTRACT_SUCCESS: &str = "Success! Text extracted.";
/// Status shown after a successful document download.
pub const DOWNLOAD_SUCCESS: &str = "Success! File downloaded.";
/// Status while an extraction is in flight.
pub const EXTRACT_PENDING: &str = "Uploading and extracting text...";
/// Status while a document is being generated.
pub const DOWNLOAD_PENDING: &str = "Generating document...";

/// Single-slot user feedback message.
///
/// Classified as an error purely by the `"Error:"` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusMessage(String);

impl StatusMessage {
    pub const ERROR_PREFIX: &'static str = "Error:";

    pub fn info(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// `"Error: <detail>"`.
    pub fn error(detail: impl std::fmt::Display) -> Self {
        Self(format!("{} {detail}", Self::ERROR_PREFIX))
    }

    pub fn is_error(&self) -> bool {
        self.0.starts_with(Self::ERROR_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why an extraction could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BeginError {
    #[error("Please select a file first.")]
    NoFileSelected,
    #[error("An extraction is already in progress.")]
    Busy,
}

/// State of one upload component.
#[derive(Debug, Default)]
pub struct UploadSession {
    selected: Option<UploadedFile>,
    remembered: Option<UploadedFile>,
    status: Option<StatusMessage>,
    extracted_text: String,
    extracting: bool,
    downloading: bool,
}

/// Read-only copy of the state, for rendering and inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub status: Option<StatusMessage>,
    pub status_is_error: bool,
    pub extracted_text: String,
    pub remembered_file: Option<String>,
    pub extracting: bool,
    pub downloading: bool,
    pub can_download: bool,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selected file.
    pub fn select_file(&mut self, file: UploadedFile) {
        self.selected = Some(file);
    }

    /// Start an extraction.
    ///
    /// Takes the selected file, clears the previous text and remembered file,
    /// and raises the extracting flag. With no file selected the status
    /// becomes an error and nothing else changes.
    pub fn begin_extraction(&mut self) -> Result<UploadedFile, BeginError> {
        if self.extracting {
            return Err(BeginError::Busy);
        }
        let Some(file) = self.selected.take() else {
            self.status = Some(StatusMessage::error(BeginError::NoFileSelected));
            return Err(BeginError::NoFileSelected);
        };

        self.extracted_text.clear();
        self.remembered = None;
        self.extracting = true;
        self.status = Some(StatusMessage::info(EXTRACT_PENDING));
        Ok(file)
    }

    /// Select `file`, if one was sent, and start an extraction.
    ///
    /// A file sent while an extraction is running is dropped, not queued.
    pub fn begin_extraction_with(
        &mut self,
        file: Option<UploadedFile>,
    ) -> Result<UploadedFile, BeginError> {
        if self.extracting {
            return Err(BeginError::Busy);
        }
        if let Some(file) = file {
            self.select_file(file);
        }
        self.begin_extraction()
    }

    /// Record the outcome of the extraction started by [`Self::begin_extraction`].
    pub fn complete_extraction(
        &mut self,
        file: UploadedFile,
        outcome: Result<String, BackendError>,
    ) {
        self.extracting = false;
        match outcome {
            Ok(text) => {
                self.extracted_text = text;
                self.remembered = Some(file);
                self.status = Some(StatusMessage::info(EXTRACT_SUCCESS));
            }
            Err(e) => {
                self.status = Some(StatusMessage::error(e));
            }
        }
    }

    /// Start a download of the remembered file.
    ///
    /// `None` when there is nothing to download or a download is running.
    pub fn begin_download(&mut self) -> Option<UploadedFile> {
        if self.downloading {
            return None;
        }
        let file = self.remembered.clone()?;
        self.downloading = true;
        self.status = Some(StatusMessage::info(DOWNLOAD_PENDING));
        Some(file)
    }

    /// Record the outcome of the download started by [`Self::begin_download`].
    pub fn complete_download(&mut self, outcome: Result<(), BackendError>) {
        self.downloading = false;
        self.status = Some(match outcome {
            Ok(()) => StatusMessage::info(DOWNLOAD_SUCCESS),
            Err(e) => StatusMessage::error(e),
        });
    }

    /// End an extraction that never reported an outcome.
    pub fn abandon_extraction(&mut self, detail: impl std::fmt::Display) {
        self.extracting = false;
        self.status = Some(StatusMessage::error(detail));
    }

    /// End a download that never reported an outcome.
    pub fn abandon_download(&mut self, detail: impl std::fmt::Display) {
        self.downloading = false;
        self.status = Some(StatusMessage::error(detail));
    }

    /// Report a failure that happened before any backend call was made.
    pub fn fail(&mut self, detail: impl std::fmt::Display) {
        self.status = Some(StatusMessage::error(detail));
    }

    /// Download is offered only for existing text with nothing in flight.
    pub fn can_download(&self) -> bool {
        !self.extracted_text.is_empty() && !self.extracting && !self.downloading
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }

    pub fn remembered_file(&self) -> Option<&UploadedFile> {
        self.remembered.as_ref()
    }

    pub fn is_extracting(&self) -> bool {
        self.extracting
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status.clone(),
            status_is_error: self.status.as_ref().is_some_and(StatusMessage::is_error),
            extracted_text: self.extracted_text.clone(),
            remembered_file: self.remembered.as_ref().map(|f| f.file_name.clone()),
            extracting: self.extracting,
            downloading: self.downloading,
            can_download: self.can_download(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> UploadedFile {
        UploadedFile::new(name, None, name.as_bytes().to_vec())
    }

    fn extracted(text: &str) -> UploadSession {
        let mut session = UploadSession::new();
        session.select_file(file("sample.pdf"));
        let f = session.begin_extraction().unwrap();
        session.complete_extraction(f, Ok(text.to_string()));
        session
    }

    #[test]
    fn test_status_classification() {
        assert!(StatusMessage::error("boom").is_error());
        assert_eq!(StatusMessage::error("boom").as_str(), "Error: boom");
        assert!(!StatusMessage::info(EXTRACT_SUCCESS).is_error());
        // Prefix is literal and case-sensitive.
        assert!(!StatusMessage::info("error: lowercase").is_error());
        assert!(StatusMessage::info("Error:no space").is_error());
    }

    #[test]
    fn test_successful_extraction() {
        let session = extracted("Hello\nWorld");

        assert_eq!(session.extracted_text(), "Hello\nWorld");
        assert_eq!(session.status().unwrap().as_str(), EXTRACT_SUCCESS);
        assert_eq!(session.remembered_file().unwrap().file_name, "sample.pdf");
        assert!(!session.is_extracting());
        assert!(session.can_download());
    }

    #[test]
    fn test_begin_clears_previous_result() {
        let mut session = extracted("old text");

        session.select_file(file("next.png"));
        let f = session.begin_extraction().unwrap();

        assert_eq!(f.file_name, "next.png");
        assert!(session.extracted_text().is_empty());
        assert!(session.remembered_file().is_none());
        assert!(session.is_extracting());
        assert!(!session.can_download());
    }

    #[test]
    fn test_failed_extraction_resets_busy_flag() {
        let mut session = UploadSession::new();
        session.select_file(file("sample.pdf"));
        let f = session.begin_extraction().unwrap();
        session.complete_extraction(f, Err(BackendError::Transport("Failed to fetch".into())));

        assert!(!session.is_extracting());
        assert_eq!(session.status().unwrap().as_str(), "Error: Failed to fetch");
        assert!(session.remembered_file().is_none());
        assert!(!session.can_download());
    }

    #[test]
    fn test_begin_without_file() {
        let mut session = UploadSession::new();
        assert_eq!(session.begin_extraction(), Err(BeginError::NoFileSelected));
        assert_eq!(
            session.status().unwrap().as_str(),
            "Error: Please select a file first."
        );
        assert!(!session.is_extracting());
    }

    #[test]
    fn test_second_extraction_rejected_while_busy() {
        let mut session = UploadSession::new();
        session.select_file(file("a.pdf"));
        session.begin_extraction().unwrap();
        session.select_file(file("b.pdf"));

        assert_eq!(session.begin_extraction(), Err(BeginError::Busy));
        assert_eq!(session.status().unwrap().as_str(), EXTRACT_PENDING);
    }

    #[test]
    fn test_file_sent_while_busy_is_dropped() {
        let mut session = UploadSession::new();
        session.begin_extraction_with(Some(file("a.pdf"))).unwrap();

        assert_eq!(
            session.begin_extraction_with(Some(file("b.pdf"))),
            Err(BeginError::Busy)
        );
        // The rejected file must not linger as the selection.

        session.abandon_extraction("interrupted");
        assert_eq!(
            session.begin_extraction_with(None),
            Err(BeginError::NoFileSelected)
        );
        assert_eq!(
            session.status().unwrap().as_str(),
            "Error: Please select a file first."
        );
    }

    #[test]
    fn test_abandon_clears_only_its_flag() {
        let mut session = extracted("text");
        session.begin_download().unwrap();
        session.abandon_download("interrupted");

        assert!(!session.is_downloading());
        assert!(session.status().unwrap().is_error());
        assert_eq!(session.extracted_text(), "text");
        assert!(session.can_download());

        session.select_file(file("next.pdf"));
        session.begin_extraction().unwrap();
        session.abandon_extraction("interrupted");
        assert!(!session.is_extracting());
        assert!(session.remembered_file().is_none());
    }

    #[test]
    fn test_download_uses_remembered_file() {
        let mut session = extracted("text");
        // A new selection must not change what gets downloaded.
        session.select_file(file("other.png"));

        let f = session.begin_download().unwrap();
        assert_eq!(f.file_name, "sample.pdf");
        assert!(session.is_downloading());
        assert!(!session.can_download());
        assert!(session.begin_download().is_none());

        session.complete_download(Ok(()));
        assert_eq!(session.status().unwrap().as_str(), DOWNLOAD_SUCCESS);
        assert_eq!(session.extracted_text(), "text");
        assert!(session.can_download());
    }

    #[test]
    fn test_download_failure_keeps_text() {
        let mut session = extracted("text");
        session.begin_download().unwrap();
        session.complete_download(Err(BackendError::Status {
            status: 500,
            message: "Server error: 500".into(),
        }));

        assert_eq!(
            session.status().unwrap().as_str(),
            "Error: Server error: 500"
        );
        assert_eq!(session.extracted_text(), "text");
        assert!(!session.is_downloading());
    }

    #[test]
    fn test_download_noop_without_extraction() {
        let mut session = UploadSession::new();
        assert!(session.begin_download().is_none());
        assert!(session.status().is_none());
    }

    #[test]
    fn test_download_noop_during_extraction() {
        let mut session = extracted("text");
        session.select_file(file("next.pdf"));
        session.begin_extraction().unwrap();

        assert!(session.begin_download().is_none());
    }

    #[test]
    fn test_empty_text_hides_download() {
        let session = extracted("");
        assert!(session.remembered_file().is_some());
        assert!(!session.can_download());
        assert!(!session.snapshot().can_download);
    }

    #[test]
    fn test_snapshot() {
        let mut session = extracted("abc");
        session.fail("multipart stream ended");
        let snap = session.snapshot();

        assert_eq!(snap.extracted_text, "abc");
        assert_eq!(snap.remembered_file.as_deref(), Some("sample.pdf"));
        assert!(snap.status_is_error);
        assert!(snap.can_download);
    }
}
