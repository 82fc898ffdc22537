//! Upload session management.
//!
//! Each page load gets its own session holding the component state: the
//! selected file, the status line, the extracted text and the two busy flags.
//! Nothing survives a reload.
//!
//! # Example
//!
//! ```rust
//! use axum_htmx_ocr::ocr::UploadedFile;
//! use axum_htmx_ocr::session::SessionStore;
//!
//! let store = SessionStore::new();
//! let session = store.create();
//! session.with_state(|s| s.select_file(UploadedFile::new("scan.png", None, vec![0u8; 4])));
//!
//! let file = session.with_state(|s| s.begin_extraction()).unwrap();
//! assert_eq!(file.file_name, "scan.png");
//! assert!(session.snapshot().extracting);
//! ```

mod state;
mod store;

pub use state::{
    BeginError, DOWNLOAD_PENDING, DOWNLOAD_SUCCESS, EXTRACT_PENDING, EXTRACT_SUCCESS,
    SessionSnapshot, StatusMessage, UploadSession,
};
pub use store::{Session, SessionStore};
