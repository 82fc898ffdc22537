//! Server-rendered HTML.
//!
//! # Structure
//!
//! - [`shell`]: page document around the content
//! - [`panel`]: the uploader panel (form, status, text, download)
//! - [`html`]: escaping

pub mod html;
pub mod panel;
pub mod shell;

pub use html::html_escape;
pub use panel::{PendingDownload, render_page, render_panel};
pub use shell::html_shell;
