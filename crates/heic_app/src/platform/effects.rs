use heic_core::{Effect, Msg};
use heic_engine::{EngineEvent, EngineHandle};
use queue_logging::{queue_error, queue_info, queue_warn};

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Convert { item_id, source } => {
                    queue_info!(
                        "Convert item_id={} name={} bytes={}",
                        item_id,
                        source.name,
                        source.size
                    );
                    self.engine.convert(item_id, source);
                }
                Effect::ReleaseResult { key } => {
                    self.engine.release(key);
                }
                Effect::SaveResult { key, name } => {
                    if let Err(err) = self.engine.save(key, &name) {
                        queue_error!("Saving {} failed: {}", name, err);
                    }
                }
                Effect::BuildArchive { entries } => {
                    queue_info!("BuildArchive entries={}", entries.len());
                    self.engine.build_archive(entries);
                }
                Effect::Shutdown => self.engine.shutdown(),
            }
        }
    }
}

/// Translates an engine event into the message the core understands.
pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ConversionFinished { item_id, result } => Msg::ConversionFinished {
            item_id,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::DrainSettled => Msg::DrainSettled,
        EngineEvent::ArchiveFinished { result } => Msg::ArchiveFinished {
            result: match result {
                Ok(summary) => {
                    queue_info!(
                        "Archive {} ready: {} entries, {} bytes",
                        summary.name,
                        summary.entry_count,
                        summary.byte_len
                    );
                    Ok(())
                }
                Err(err) => {
                    queue_warn!("Archive failed: {}", err);
                    Err(err.to_string())
                }
            },
        },
    }
}
