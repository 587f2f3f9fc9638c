//! # zipmail
//!
//! A small HTTP service for document handling:
//!
//! - `POST /api/archive/information`: list the files inside an uploaded zip
//! - `POST /api/archive/files`: bundle uploaded files into a new zip
//! - `POST /api/mail/file`: email an uploaded pdf/docx to a list of recipients
//!
//! Uploads are written to scoped temp files that are removed as soon as the
//! request is done with them, whatever the outcome. Errors are answered with
//! an XML document carrying the status code, a message and a description.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use zipmail::http::{AppState, create_router};
//! use zipmail::io::TempStorage;
//! use zipmail::mail::Outbox;
//! use zipmail::service::{ArchiveService, MailService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = TempStorage::new(std::env::temp_dir().join("zipmail"));
//!     let mail = MailService::new(
//!         storage.clone(),
//!         Arc::new(Outbox::new()),
//!         "robot@example.com".parse()?,
//!     );
//!     let state = AppState::new(ArchiveService::new(storage), mail, 32 * 1024 * 1024);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, create_router(state)).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod http;
pub mod io;
pub mod mail;
pub mod media;
pub mod models;
pub mod service;
pub mod zip;

pub use cli::Cli;
pub use error::ServiceError;
pub use io::{LocalFileReader, ReadAt, TempStorage};
pub use zip::{ZipFileEntry, ZipParser, ZipWriter};
