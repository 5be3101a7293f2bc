use std::path::PathBuf;

use queue_logging::queue_info;

use crate::persist::{AtomicFileWriter, PersistError};

/// Where finished downloads end up.
pub trait DownloadSink: Send + Sync {
    fn deliver(&self, name: &str, bytes: &[u8]) -> Result<(), PersistError>;
}

/// Saves every download into one directory.
pub struct DirectorySink {
    writer: AtomicFileWriter,
}

impl DirectorySink {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, name: &str, bytes: &[u8]) -> Result<(), PersistError> {
        let path = self.writer.write(name, bytes)?;
        queue_info!("Saved {} ({} bytes) to {:?}", name, bytes.len(), path);
        Ok(())
    }
}
