#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Picker or drop surface supplied files.
    FilesSelected(Vec<crate::SourceFile>),
    /// Drainer finished one item; the error is a short cause string.
    ConversionFinished {
        item_id: crate::ItemId,
        result: Result<crate::ResultKey, String>,
    },
    /// Settle delay after a conversion elapsed; the next item may start.
    DrainSettled,
    /// User removed a single item.
    RemoveItem(crate::ItemId),
    /// User clicked Clear All.
    ClearAll,
    /// User clicked the per-item download.
    DownloadClicked(crate::ItemId),
    /// User clicked Download ZIP.
    DownloadAllClicked,
    /// Archive build finished.
    ArchiveFinished { result: Result<(), String> },
    NoticeDismissed,
    /// Session teardown: release everything and stop the engine.
    Shutdown,
    /// Fallback for placeholder wiring.
    NoOp,
}
