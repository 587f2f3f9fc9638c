//! Data carried between the transport and service layers.

use axum::body::Bytes;
use serde::{Deserialize, Serialize};

/// A file part received in a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name as sent by the client
    pub file_name: String,
    /// Declared `Content-Type` of the part, empty when absent
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }
}

/// One file listed in an inspected archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDetails {
    /// Path of the entry inside the archive
    pub file_path: String,
    /// Uncompressed size in bytes
    pub size: u64,
    /// MIME type guessed from the extension, empty when unknown
    #[serde(rename = "mimetype")]
    pub mime_type: String,
}

/// Summary of an inspected archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveInfo {
    pub filename: String,
    /// Size of the uploaded archive itself
    pub archive_size: u64,
    /// Sum of the uncompressed sizes of all listed files
    pub total_size: u64,
    pub total_files: usize,
    pub files: Vec<FileDetails>,
}
