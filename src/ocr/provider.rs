//! Core trait and types for talking to an OCR backend.

use async_trait::async_trait;
use axum::body::Bytes;
use serde::Serialize;

use super::error::BackendError;

/// A file picked by the user, held in memory for one upload/download cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Original filename as reported by the browser.
    pub file_name: String,
    /// MIME type; guessed from the filename when the browser sent none.
    pub content_type: String,
    /// Raw file contents. Cloning shares the buffer.
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Build a file, falling back to a guess from the extension for the MIME type.
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<&str>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let file_name = file_name.into();
        let content_type = content_type
            .filter(|ct| !ct.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(&file_name)
                    .first_or_octet_stream()
                    .to_string()
            });

        Self {
            file_name,
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Binary document returned by the document endpoint.
#[derive(Debug, Clone)]
pub struct DocumentPayload {
    pub bytes: Bytes,
    /// Content type reported by the backend, if any.
    pub content_type: Option<String>,
}

/// Outcome of probing the backend.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BackendHealth {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Trait for OCR backends.
///
/// Every call is a single attempt: implementors must not retry.
#[async_trait]
pub trait OcrBackend: Send + Sync + std::fmt::Debug {
    /// Extract plain text from a PDF or image.
    async fn extract_text(&self, file: &UploadedFile) -> Result<String, BackendError>;

    /// Convert a PDF or image into a downloadable document.
    async fn extract_document(&self, file: &UploadedFile)
    -> Result<DocumentPayload, BackendError>;

    /// Probe the backend. Never fails; unreachable backends report `reachable: false`.
    async fn health(&self) -> BackendHealth;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_browser_wins() {
        let file = UploadedFile::new("scan.bin", Some("image/png"), vec![1u8, 2, 3]);
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.len(), 3);
    }

    #[test]
    fn test_content_type_guessed_from_extension() {
        let file = UploadedFile::new("sample.pdf", None, Vec::<u8>::new());
        assert_eq!(file.content_type, "application/pdf");
        assert!(file.is_empty());

        let file = UploadedFile::new("photo.jpeg", Some("  "), Vec::<u8>::new());
        assert_eq!(file.content_type, "image/jpeg");
    }

    #[test]
    fn test_unknown_extension_is_octet_stream() {
        let file = UploadedFile::new("mystery", None, Vec::<u8>::new());
        assert_eq!(file.content_type, "application/octet-stream");
    }
}
