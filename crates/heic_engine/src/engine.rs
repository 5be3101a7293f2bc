use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use heic_core::{ArchiveRequestEntry, ItemId, ResultKey, SourceFile};
use queue_logging::{queue_debug, queue_info, queue_warn};

use crate::archive::{Archiver, ZipArchiver};
use crate::codec::{default_codec, Codec};
use crate::download::{DirectorySink, DownloadSink};
use crate::drainer::{run_drainer, ChannelEventSink, ConvertJob, EventSink};
use crate::package::{Packager, PackagingError};
use crate::store::{MemoryResultStore, ResultStore};
use crate::types::{EngineEvent, EngineStopped, QueueSettings};

#[derive(Clone)]
pub struct EngineConfig {
    pub settings: QueueSettings,
    pub codec: Arc<dyn Codec>,
    pub archiver: Arc<dyn Archiver>,
    pub store: Arc<dyn ResultStore>,
    pub sink: Arc<dyn DownloadSink>,
}

impl EngineConfig {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self::with_sink(Arc::new(DirectorySink::new(output_dir)))
    }

    pub fn with_sink(sink: Arc<dyn DownloadSink>) -> Self {
        Self {
            settings: QueueSettings::default(),
            codec: default_codec(),
            archiver: Arc::new(ZipArchiver::default()),
            store: Arc::new(MemoryResultStore::new()),
            sink,
        }
    }
}

enum EngineCommand {
    Convert(ConvertJob),
    BuildArchive { entries: Vec<ArchiveRequestEntry> },
    Shutdown,
}

/// Owns the worker thread, its tokio runtime and the result store.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    store: Arc<dyn ResultStore>,
    sink: Arc<dyn DownloadSink>,
    worker: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .build()?;

        let events: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
        let packager = Packager {
            archiver: config.archiver,
            store: config.store.clone(),
            sink: config.sink.clone(),
            archive_name: config.settings.archive_name.clone(),
        };
        let codec = config.codec;
        let store = config.store.clone();
        let settings = config.settings;

        let worker = thread::Builder::new()
            .name("heic-engine".to_string())
            .spawn(move || {
                let (job_tx, job_rx) = tokio::sync::mpsc::unbounded_channel();
                runtime.spawn(run_drainer(job_rx, codec, store, settings, events.clone()));

                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Convert(job) => {
                            if job_tx.send(job).is_err() {
                                queue_warn!("Drainer is gone; dropping conversion");
                            }
                        }
                        EngineCommand::BuildArchive { entries } => {
                            let packager = packager.clone();
                            let events = events.clone();
                            runtime.spawn(async move {
                                let result = packager.build(entries).await;
                                events.emit(EngineEvent::ArchiveFinished { result });
                            });
                        }
                        EngineCommand::Shutdown => break,
                    }
                }

                drop(job_tx);
                runtime.shutdown_timeout(Duration::from_secs(1));
                queue_debug!("Engine worker stopped");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            store: config.store,
            sink: config.sink,
            worker: Some(worker),
        })
    }

    /// Queues a conversion. Returns `false` if the worker is gone.
    pub fn convert(&self, item_id: ItemId, source: SourceFile) -> bool {
        self.send(EngineCommand::Convert(ConvertJob { item_id, source }))
    }

    /// Starts packaging. Returns `false` if the worker is gone.
    pub fn build_archive(&self, entries: Vec<ArchiveRequestEntry>) -> bool {
        self.send(EngineCommand::BuildArchive { entries })
    }

    fn send(&self, command: EngineCommand) -> bool {
        let sent = self.cmd_tx.send(command).is_ok();
        if !sent {
            queue_warn!("Engine worker is gone; command dropped");
        }
        sent
    }

    /// Frees a result. Returns `false` (and warns) if it was already gone.
    pub fn release(&self, key: ResultKey) -> bool {
        let released = self.store.release(key);
        if !released {
            queue_warn!("Release of result {} that is not live", key.id);
        }
        released
    }

    /// Delivers one result to the download sink; the result stays live.
    pub fn save(&self, key: ResultKey, name: &str) -> Result<(), PackagingError> {
        let bytes = self
            .store
            .get(key)
            .ok_or_else(|| PackagingError::MissingResult {
                name: name.to_string(),
            })?;
        self.sink
            .deliver(name, &bytes)
            .map_err(PackagingError::from)
    }

    pub fn live_results(&self) -> usize {
        self.store.live_count()
    }

    /// Waits up to `timeout` for the next event. `Ok(None)` means nothing
    /// arrived in time.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<Option<EngineEvent>, EngineStopped> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineStopped),
        }
    }

    /// Stops the worker and waits for it. Pending conversions are dropped.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if worker.join().is_err() {
            queue_warn!("Engine worker panicked");
        }
        queue_info!(
            "Engine shut down with {} live results",
            self.store.live_count()
        );
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
