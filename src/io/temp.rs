//! Scoped temp-file storage for uploads.
//!
//! Every file handed out by [`TempStorage`] is backed by a
//! [`tempfile::NamedTempFile`], so it is removed from disk as soon as the
//! owning value is dropped, on success and error paths alike.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::models::UploadedFile;

/// Directory that holds uploads while a request is being processed.
#[derive(Debug, Clone)]
pub struct TempStorage {
    dir: PathBuf,
}

impl TempStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the storage directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create temp folder {}", self.dir.display()))
    }

    /// Write an upload to a fresh temp file named `uploaded-*-<basename>`.
    pub async fn stage(&self, upload: &UploadedFile) -> Result<StagedFile> {
        self.ensure_dir().await?;

        let file_name = sanitize_file_name(&upload.file_name);
        let file = tempfile::Builder::new()
            .prefix("uploaded-")
            .suffix(&format!("-{}", file_name))
            .tempfile_in(&self.dir)
            .context("failed to create temp file")?;

        tokio::fs::write(file.path(), &upload.data)
            .await
            .context("failed to copy file content")?;

        debug!(
            path = %file.path().display(),
            bytes = upload.data.len(),
            "staged upload"
        );

        Ok(StagedFile {
            file,
            file_name,
            content_type: upload.content_type.clone(),
        })
    }

    /// Create an empty scoped temp file, e.g. for a generated archive.
    pub async fn scratch(&self, suffix: &str) -> Result<NamedTempFile> {
        self.ensure_dir().await?;
        tempfile::Builder::new()
            .prefix("output-")
            .suffix(suffix)
            .tempfile_in(&self.dir)
            .context("failed to create temp file")
    }
}

/// An upload written to disk. The file is deleted on drop.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
    file_name: String,
    content_type: String,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Client file name reduced to its last path component.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Size of the staged file in bytes.
    pub fn len(&self) -> Result<u64> {
        Ok(self.file.as_file().metadata()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub async fn read(&self) -> Result<Vec<u8>> {
        tokio::fs::read(self.path())
            .await
            .with_context(|| format!("failed to read {}", self.path().display()))
    }
}

/// Strip any directory components a client put in a file name.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match base {
        "" | "." | ".." => "upload".to_string(),
        base => base.to_string(),
    }
}
