use std::sync::Arc;

use bytes::Bytes;
use heic_core::{ArchiveRequestEntry, ResultKey};
use queue_logging::{queue_debug, queue_info};
use thiserror::Error;

use crate::archive::{last_write_wins, ArchiveEntry, ArchiveError, Archiver};
use crate::download::DownloadSink;
use crate::persist::PersistError;
use crate::store::ResultStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub name: String,
    /// Entries after same-name collapsing.
    pub entry_count: usize,
    pub byte_len: u64,
}

#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("need at least 2 results to package, got {0}")]
    TooFewEntries(usize),
    #[error("result for {name} is no longer available")]
    MissingResult { name: String },
    #[error("archive build failed: {0}")]
    Archive(#[from] ArchiveError),
    #[error("archive task aborted: {0}")]
    Aborted(String),
    #[error("delivery failed: {0}")]
    Delivery(#[from] PersistError),
}

/// Everything an archive build needs; cloned out of the engine per request.
#[derive(Clone)]
pub struct Packager {
    pub archiver: Arc<dyn Archiver>,
    pub store: Arc<dyn ResultStore>,
    pub sink: Arc<dyn DownloadSink>,
    pub archive_name: String,
}

impl Packager {
    /// Builds one archive from completed results and hands it to the download sink.
    ///
    /// The archive itself only lives in the store for the duration of the
    /// delivery; its key is released before this returns, on success or not.
    /// Nothing is delivered if any result fails to re-materialize.
    pub async fn build(
        &self,
        entries: Vec<ArchiveRequestEntry>,
    ) -> Result<ArchiveSummary, PackagingError> {
        if entries.len() < 2 {
            return Err(PackagingError::TooFewEntries(entries.len()));
        }

        let mut files = Vec::with_capacity(entries.len());
        for entry in entries {
            let bytes = self
                .store
                .get(entry.key)
                .ok_or_else(|| PackagingError::MissingResult {
                    name: entry.name.clone(),
                })?;
            files.push(ArchiveEntry {
                name: entry.name,
                bytes,
            });
        }
        let files = last_write_wins(files);
        let entry_count = files.len();
        queue_debug!("Packing {} entries into {}", entry_count, self.archive_name);

        // Packing and delivery both block; keep them off the runtime workers.
        let archiver = self.archiver.clone();
        let store = self.store.clone();
        let sink = self.sink.clone();
        let archive_name = self.archive_name.clone();
        let transient = tokio::task::spawn_blocking(move || -> Result<ResultKey, PackagingError> {
            let packed = archiver.pack(&files)?;
            let transient = store.insert(Bytes::from(packed));
            let delivered = match store.get(transient) {
                Some(bytes) => sink
                    .deliver(&archive_name, &bytes)
                    .map_err(PackagingError::from),
                None => Err(PackagingError::MissingResult {
                    name: archive_name.clone(),
                }),
            };
            store.release(transient);
            delivered.map(|()| transient)
        })
        .await
        .map_err(|err| PackagingError::Aborted(err.to_string()))??;

        queue_info!(
            "Delivered {} with {} entries ({} bytes)",
            self.archive_name,
            entry_count,
            transient.byte_len
        );
        Ok(ArchiveSummary {
            name: self.archive_name.clone(),
            entry_count,
            byte_len: transient.byte_len,
        })
    }
}
