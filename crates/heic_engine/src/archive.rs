use std::io::{Cursor, Write};

use bytes::Bytes;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Packs named blobs into a single archive.
pub trait Archiver: Send + Sync {
    fn pack(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError>;
}

#[derive(Debug, Clone, Copy)]
pub struct ZipArchiver {
    compression: CompressionMethod,
}

impl Default for ZipArchiver {
    fn default() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
        }
    }
}

impl ZipArchiver {
    /// JPEG payloads barely shrink; `Stored` skips the deflate pass.
    pub fn stored() -> Self {
        Self {
            compression: CompressionMethod::Stored,
        }
    }
}

impl Archiver for ZipArchiver {
    fn pack(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(self.compression);
        for entry in entries {
            zip.start_file(entry.name.as_str(), options)?;
            zip.write_all(&entry.bytes)?;
        }
        Ok(zip.finish()?.into_inner())
    }
}

/// Collapses entries sharing a name: the last payload wins, the first position is kept.
pub fn last_write_wins(entries: Vec<ArchiveEntry>) -> Vec<ArchiveEntry> {
    let mut unique: Vec<ArchiveEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match unique.iter_mut().find(|kept| kept.name == entry.name) {
            Some(kept) => kept.bytes = entry.bytes,
            None => unique.push(entry),
        }
    }
    unique
}
