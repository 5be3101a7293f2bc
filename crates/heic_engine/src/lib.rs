//! Conversion engine: serialized drainer, codec and archive plumbing.
mod archive;
mod codec;
mod download;
mod drainer;
mod engine;
#[cfg(feature = "heif")]
mod heif;
mod package;
mod persist;
mod store;
mod types;

pub use archive::{last_write_wins, ArchiveEntry, ArchiveError, Archiver, ZipArchiver};
pub use codec::{
    default_codec, is_heif_container, jpeg_quality, Codec, CodecError, ImageJpegCodec,
    HEIF_SUPPORT,
};
pub use download::{DirectorySink, DownloadSink};
pub use drainer::{convert_one, run_drainer, ChannelEventSink, ConvertJob, EventSink};
pub use engine::{EngineConfig, EngineHandle};
#[cfg(feature = "heif")]
pub use heif::HeifJpegCodec;
pub use package::{ArchiveSummary, Packager, PackagingError};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use store::{MemoryResultStore, ResultStore};
pub use types::{ConversionError, EngineEvent, EngineStopped, QueueSettings};
