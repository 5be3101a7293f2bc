use std::sync::Arc;

use heic_core::{ItemId, ResultKey, SourceFile};
use queue_logging::{queue_debug, queue_warn};
use tokio::sync::mpsc;

use crate::codec::Codec;
use crate::store::ResultStore;
use crate::types::{ConversionError, EngineEvent, QueueSettings};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone)]
pub struct ConvertJob {
    pub item_id: ItemId,
    pub source: SourceFile,
}

/// Serialized conversion loop: one job per wake, in arrival order.
///
/// Each job emits `ConversionFinished`, then `DrainSettled` once the settle
/// delay has passed. Returns when every sender of `jobs` is gone.
pub async fn run_drainer(
    mut jobs: mpsc::UnboundedReceiver<ConvertJob>,
    codec: Arc<dyn Codec>,
    store: Arc<dyn ResultStore>,
    settings: QueueSettings,
    events: Arc<dyn EventSink>,
) {
    while let Some(job) = jobs.recv().await {
        queue_debug!("Drainer picked item {} ({})", job.item_id, job.source.name);
        let result = convert_one(&codec, store.as_ref(), &job.source, settings.quality).await;
        match &result {
            Ok(key) => queue_debug!("Item {} converted into {} bytes", job.item_id, key.byte_len),
            Err(err) => queue_warn!("Item {} conversion failed: {}", job.item_id, err),
        }
        events.emit(EngineEvent::ConversionFinished {
            item_id: job.item_id,
            result,
        });
        tokio::time::sleep(settings.settle_delay).await;
        events.emit(EngineEvent::DrainSettled);
    }
}

/// Runs the codec on its own task so a panicking codec only fails this item.
pub async fn convert_one(
    codec: &Arc<dyn Codec>,
    store: &dyn ResultStore,
    source: &SourceFile,
    quality: f32,
) -> Result<ResultKey, ConversionError> {
    let codec = Arc::clone(codec);
    let input = source.bytes.clone();
    let outputs = tokio::spawn(async move { codec.convert(input, quality).await })
        .await
        .map_err(|err| ConversionError::Aborted(err.to_string()))??;
    let first = outputs
        .into_iter()
        .next()
        .ok_or(ConversionError::EmptyOutput)?;
    Ok(store.insert(first))
}
