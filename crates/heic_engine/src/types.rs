use std::time::Duration;

use heic_core::{ItemId, ResultKey};
use thiserror::Error;

use crate::codec::CodecError;
use crate::package::{ArchiveSummary, PackagingError};

#[derive(Debug, Clone, PartialEq)]
pub struct QueueSettings {
    /// JPEG quality on a 0..=1 scale.
    pub quality: f32,
    /// Pause after each conversion before the next one may start.
    pub settle_delay: Duration,
    pub archive_name: String,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            quality: 0.85,
            settle_delay: Duration::from_millis(300),
            archive_name: "converted_images.zip".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum EngineEvent {
    ConversionFinished {
        item_id: ItemId,
        result: Result<ResultKey, ConversionError>,
    },
    /// The settle delay after a conversion elapsed.
    DrainSettled,
    ArchiveFinished {
        result: Result<ArchiveSummary, PackagingError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("codec returned no output")]
    EmptyOutput,
    #[error("codec task aborted: {0}")]
    Aborted(String),
}

/// The engine worker is gone; no further events will arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("conversion engine stopped")]
pub struct EngineStopped;
