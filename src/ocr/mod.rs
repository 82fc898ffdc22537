//! Client side of the OCR backend.
//!
//! The backend owns every bit of document intelligence; this module only
//! knows how to hand it a file and interpret what comes back.
//!
//! # Endpoints
//!
//! - text extraction: multipart `file` in, JSON `{"text": ...}` out
//! - document extraction: multipart `file` in, binary document out
//! - health: `GET` returning `{"message": ...}`
//!
//! # Usage
//!
//! ```rust,ignore
//! use axum_htmx_ocr::ocr::{HttpOcrBackend, OcrBackend, UploadedFile};
//!
//! let backend = HttpOcrBackend::new(&config.backend)?;
//! let text = backend.extract_text(&file).await?;
//! ```

mod error;
mod http;
mod provider;

pub use error::BackendError;
pub use http::HttpOcrBackend;
pub use provider::{BackendHealth, DocumentPayload, OcrBackend, UploadedFile};

/// MIME types advertised by the file picker.
///
/// Advisory only: nothing rejects other types before they reach the backend.
pub const ACCEPTED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/bmp",
    "image/webp",
];
