//! Application state for the HTTP server.

use crate::service::{ArchiveService, MailService};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub archive: ArchiveService,
    pub mail: MailService,
    /// Largest accepted request body in bytes
    pub upload_limit: usize,
}

impl AppState {
    pub fn new(archive: ArchiveService, mail: MailService, upload_limit: usize) -> Self {
        Self {
            archive,
            mail,
            upload_limit,
        }
    }
}
