use crate::{ItemId, ResultKey, SourceFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand the item to the drainer. At most one is outstanding at a time.
    Convert { item_id: ItemId, source: SourceFile },
    /// Free converted bytes; emitted exactly once per completed result.
    ReleaseResult { key: ResultKey },
    /// Deliver one converted result without releasing it.
    SaveResult { key: ResultKey, name: String },
    BuildArchive { entries: Vec<ArchiveRequestEntry> },
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequestEntry {
    pub name: String,
    pub key: ResultKey,
}
