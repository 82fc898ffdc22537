//! Axum + HTMX OCR Extractor
//!
//! A small HTML-first front end for an OCR service: pick a PDF or image,
//! get its text back, optionally download it as a Word document.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP server rendering HTML fragments for HTMX
//! - **OCR client**: reqwest multipart client for the extraction backend
//! - **Sessions**: per-page component state (status, text, busy flags)
//! - **Downloads**: one-shot slots for generated documents
//!
//! # Modules
//!
//! - [`api`]: request handlers
//! - [`config`]: CLI and layered configuration
//! - [`downloads`]: one-shot download store
//! - [`ocr`]: backend trait and HTTP implementation
//! - [`session`]: upload state machine and session store
//! - [`ui`]: HTML rendering

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod api;
pub mod config;
pub mod downloads;
pub mod ocr;
pub mod server;
pub mod session;
pub mod ui;

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use downloads::DownloadStore;
use ocr::OcrBackend;
use session::SessionStore;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// OCR backend every upload is forwarded to.
    pub backend: Arc<dyn OcrBackend>,
    /// Upload sessions, one per page load.
    pub sessions: SessionStore,
    /// Generated documents waiting to be fetched.
    pub downloads: DownloadStore,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(backend: Arc<dyn OcrBackend>, config: Arc<AppConfig>) -> Self {
        Self {
            backend,
            sessions: SessionStore::new(),
            downloads: DownloadStore::new(),
            config,
        }
    }

    /// Drop idle sessions and unclaimed downloads.
    ///
    /// Returns `(sessions_removed, downloads_removed)`.
    pub fn sweep_expired(&self) -> (usize, usize) {
        let sessions = self
            .sessions
            .cleanup_expired_with_timeout(Duration::from_secs(self.config.session.ttl_secs));
        let downloads = self
            .downloads
            .sweep(Duration::from_secs(self.config.download.ttl_secs));
        (sessions, downloads)
    }
}
