//! ZIP archive parsing and creation.
//!
//! ## Architecture
//!
//! - [`structures`]: ZIP format records (EOCD, file headers) and their
//!   binary encoding in both directions
//! - [`parser`]: reads the Central Directory of an existing archive
//! - [`writer`]: builds a new archive from in-memory file contents
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! The parser reads the EOCD first (from the end of the file), then the
//! Central Directory, so listing never decompresses any entry.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions when reading
//! - STORED and DEFLATE when writing
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - Written archives are limited to ZIP32 sizes

mod parser;
mod structures;
mod writer;

pub use parser::ZipParser;
pub use structures::*;
pub use writer::ZipWriter;
