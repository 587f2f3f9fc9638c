mod local;
mod temp;

pub use local::LocalFileReader;
pub use temp::{StagedFile, TempStorage, sanitize_file_name};

use anyhow::Result;
use async_trait::async_trait;

/// Trait for random access reading from a data source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Fill `buf` with data starting at the specified offset
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}
