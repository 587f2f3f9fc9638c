//! Orchestration: stage uploads, call the archive or mail resource, clean up.
//!
//! Staged files are dropped before a service method returns, which removes
//! them from disk whatever the outcome.

mod archive;
mod mail;

pub use archive::ArchiveService;
pub use mail::{MAIL_BODY, MAIL_SUBJECT, MailService, parse_recipients};
