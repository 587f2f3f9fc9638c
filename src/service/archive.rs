use std::io::BufWriter;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info};

use crate::error::ServiceError;
use crate::io::{LocalFileReader, ReadAt, StagedFile, TempStorage};
use crate::media;
use crate::models::{ArchiveInfo, FileDetails, UploadedFile};
use crate::zip::{ZipParser, ZipWriter};

/// Inspects uploaded archives and bundles uploads into new ones.
#[derive(Debug, Clone)]
pub struct ArchiveService {
    storage: TempStorage,
}

impl ArchiveService {
    pub fn new(storage: TempStorage) -> Self {
        Self { storage }
    }

    /// List the files inside an uploaded zip archive.
    ///
    /// Directory entries are listed with size 0 and no MIME type;
    /// `total_size` sums the uncompressed sizes of every entry.
    pub async fn inspect(&self, upload: &UploadedFile) -> Result<ArchiveInfo, ServiceError> {
        let staged = self.storage.stage(upload).await?;

        let reader = Arc::new(LocalFileReader::new(staged.path())?);
        let archive_size = reader.size();

        let entries = ZipParser::new(reader)
            .list_files()
            .await
            .map_err(|e| ServiceError::InvalidArchive(e.to_string()))?;

        let files: Vec<FileDetails> = entries
            .into_iter()
            .map(|entry| {
                if entry.is_directory {
                    FileDetails {
                        file_path: entry.file_name,
                        size: 0,
                        mime_type: String::new(),
                    }
                } else {
                    FileDetails {
                        mime_type: media::guess_from_name(&entry.file_name),
                        file_path: entry.file_name,
                        size: entry.uncompressed_size,
                    }
                }
            })
            .collect();
        let total_size = files.iter().map(|f| f.size).sum();

        info!(
            archive = staged.file_name(),
            archive_size,
            files = files.len(),
            total_size,
            "inspected archive"
        );

        Ok(ArchiveInfo {
            filename: staged.file_name().to_string(),
            archive_size,
            total_size,
            total_files: files.len(),
            files,
        })
    }

    /// Bundle uploads into a new zip archive and return its bytes.
    ///
    /// Entries are named after the client file names; repeated names are
    /// made unique.
    pub async fn create(&self, uploads: &[UploadedFile]) -> Result<Vec<u8>, ServiceError> {
        let mut staged = Vec::with_capacity(uploads.len());
        for upload in uploads {
            staged.push(self.storage.stage(upload).await?);
        }

        let output = self.storage.scratch(".zip").await?;
        let file = output.reopen()?;

        let entries = tokio::task::spawn_blocking(move || write_archive(file, &staged))
            .await
            .map_err(|e| anyhow!("archive task failed: {}", e))??;

        let bytes = tokio::fs::read(output.path()).await?;
        info!(entries, archive_size = bytes.len(), "created archive");

        Ok(bytes)
    }
}

/// Write every staged file into `file` as one archive, returning the entry count.
fn write_archive(file: std::fs::File, staged: &[StagedFile]) -> anyhow::Result<usize> {
    let mut writer = ZipWriter::new(BufWriter::new(file));

    for source in staged {
        let data = std::fs::read(source.path())?;
        let name = writer.add_file(source.file_name(), &data)?;
        debug!(entry = %name, bytes = data.len(), "added archive entry");
    }

    let entries = writer.len();
    writer.finish()?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(dir: &std::path::Path) -> ArchiveService {
        ArchiveService::new(TempStorage::new(dir))
    }

    fn dir_is_empty(dir: &std::path::Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_create_then_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let uploads = vec![
            UploadedFile::new("report.pdf", "application/pdf", vec![b'x'; 300]),
            UploadedFile::new("photo.png", "image/png", &b"\x89PNG data"[..]),
            UploadedFile::new("report.pdf", "application/pdf", &b"second"[..]),
        ];
        let archive = service.create(&uploads).await.unwrap();
        assert!(dir_is_empty(dir.path()));

        let upload = UploadedFile::new("bundle.zip", "application/zip", archive.clone());
        let info = service.inspect(&upload).await.unwrap();
        assert!(dir_is_empty(dir.path()));

        assert_eq!(info.filename, "bundle.zip");
        assert_eq!(info.archive_size, archive.len() as u64);
        assert_eq!(info.total_files, 3);
        assert_eq!(info.total_size, 300 + 9 + 6);

        let names: Vec<_> = info.files.iter().map(|f| f.file_path.as_str()).collect();
        assert_eq!(names, ["report.pdf", "photo.png", "report (1).pdf"]);
        assert_eq!(info.files[0].mime_type, "application/pdf");
        assert_eq!(info.files[1].mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_inspect_lists_directories() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let mut writer = ZipWriter::new(Vec::new());
        writer.add_directory("nested").unwrap();
        writer.add_file("nested/notes.unknownext", b"abc").unwrap();
        let archive = writer.finish().unwrap();

        let info = service
            .inspect(&UploadedFile::new("a.zip", "application/zip", archive))
            .await
            .unwrap();
        assert_eq!(info.total_files, 2);
        assert_eq!(info.files[0].file_path, "nested/");
        assert_eq!(info.files[0].size, 0);
        assert_eq!(info.files[0].mime_type, "");
        assert_eq!(info.files[1].file_path, "nested/notes.unknownext");
        assert_eq!(info.files[1].mime_type, "");
        assert_eq!(info.total_size, 3);
    }

    #[tokio::test]
    async fn test_inspect_invalid_archive_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let upload = UploadedFile::new("fake.zip", "application/zip", &b"definitely not a zip"[..]);
        let err = service.inspect(&upload).await.unwrap_err();

        assert!(matches!(err, ServiceError::InvalidArchive(_)));
        assert!(err.is_client_error());
        assert!(dir_is_empty(dir.path()));
    }
}
