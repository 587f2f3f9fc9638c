//! Sequential ZIP archive writer.
//!
//! Entries are compressed in memory before their Local File Header is
//! written, so sizes and CRC are known up front and the output only needs
//! [`Write`], never [`Seek`](std::io::Seek). Every entry is DEFLATE unless
//! compression would make it larger, in which case it is STORED.

use std::collections::HashSet;
use std::io::Write;

use anyhow::{Result, bail};
use flate2::{Compression, Crc, write::DeflateEncoder};

use super::structures::*;

/// Most entries a classic (non-ZIP64) archive can hold
const MAX_ENTRIES: usize = 0xFFFF - 1;

pub struct ZipWriter<W: Write> {
    inner: W,
    /// Bytes written so far, i.e. the offset of the next header
    offset: u64,
    entries: Vec<ZipFileEntry>,
    names: HashSet<String>,
    modified: DosDateTime,
}

impl<W: Write> ZipWriter<W> {
    /// Start an archive whose entries are stamped with the current local time.
    pub fn new(inner: W) -> Self {
        let now = chrono::Local::now().naive_local();
        Self {
            inner,
            offset: 0,
            entries: Vec::new(),
            names: HashSet::new(),
            modified: DosDateTime::from_datetime(&now),
        }
    }

    /// Number of entries written so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a file entry and return the name it was stored under.
    ///
    /// A name that is already taken gets a ` (n)` suffix before its extension.
    pub fn add_file(&mut self, name: &str, data: &[u8]) -> Result<String> {
        let name = self.unique_name(name);

        let mut crc = Crc::new();
        crc.update(data);

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;

        let (method, payload): (CompressionMethod, &[u8]) = if compressed.len() < data.len() {
            (CompressionMethod::Deflate, compressed.as_slice())
        } else {
            (CompressionMethod::Stored, data)
        };

        self.write_entry(name.clone(), method, crc.sum(), payload, data.len() as u64)?;
        Ok(name)
    }

    /// Add an empty directory entry. A trailing `/` is appended if missing.
    pub fn add_directory(&mut self, name: &str) -> Result<String> {
        let name = if name.ends_with('/') {
            name.to_string()
        } else {
            format!("{}/", name)
        };
        let name = self.unique_name(&name);

        self.write_entry(name.clone(), CompressionMethod::Stored, 0, &[], 0)?;
        Ok(name)
    }

    /// Write the Central Directory and EOCD, returning the inner writer.
    pub fn finish(mut self) -> Result<W> {
        let cd_offset = self.offset;

        let mut cd_size = 0u64;
        for entry in &self.entries {
            entry.write_central_header(&mut self.inner)?;
            cd_size += entry.central_header_len() as u64;
        }

        if cd_offset >= 0xFFFFFFFF || cd_size >= 0xFFFFFFFF {
            bail!("Archive too large: ZIP64 output is not supported");
        }

        EndOfCentralDirectory::new(self.entries.len() as u16, cd_size as u32, cd_offset as u32)
            .write_to(&mut self.inner)?;
        self.inner.flush()?;

        Ok(self.inner)
    }

    fn write_entry(
        &mut self,
        file_name: String,
        compression_method: CompressionMethod,
        crc32: u32,
        payload: &[u8],
        uncompressed_size: u64,
    ) -> Result<()> {
        if self.entries.len() >= MAX_ENTRIES {
            bail!("Too many entries: at most {} files per archive", MAX_ENTRIES);
        }

        let entry = ZipFileEntry {
            is_directory: file_name.ends_with('/'),
            file_name,
            compression_method,
            compressed_size: payload.len() as u64,
            uncompressed_size,
            crc32,
            lfh_offset: self.offset,
            last_mod_time: self.modified.time,
            last_mod_date: self.modified.date,
        };

        entry.write_local_header(&mut self.inner)?;
        self.inner.write_all(payload)?;

        self.offset += (LFH_SIZE + entry.file_name.len() + payload.len()) as u64;
        self.names.insert(entry.file_name.clone());
        self.entries.push(entry);
        Ok(())
    }

    fn unique_name(&self, name: &str) -> String {
        if !self.names.contains(name) {
            return name.to_string();
        }

        // Directories keep their trailing slash after the suffix
        let (path, slash) = match name.strip_suffix('/') {
            Some(path) => (path, "/"),
            None => (name, ""),
        };

        // Split "dir/report.final.pdf" into "dir/report.final" and ".pdf"
        let base_start = path.rfind('/').map_or(0, |i| i + 1);
        let (stem, ext) = match (slash, path[base_start..].rfind('.')) {
            ("", Some(dot)) if dot > 0 => path.split_at(base_start + dot),
            _ => (path, ""),
        };

        let mut n = 1;
        loop {
            let candidate = format!("{} ({}){}{}", stem, n, ext, slash);
            if !self.names.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}
