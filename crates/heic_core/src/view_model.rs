use crate::{ItemId, Notice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Pending,
    Converting,
    Completed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntakeStats {
    pub accepted: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub items: Vec<ItemRowView>,
    pub item_count: usize,
    pub completed_count: usize,
    pub any_in_flight: bool,
    pub archive_offered: bool,
    pub packaging: bool,
    pub notice: Option<Notice>,
    pub last_intake: Option<IntakeStats>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRowView {
    pub item_id: ItemId,
    pub name: String,
    pub size: u64,
    pub size_label: String,
    pub status: StatusKind,
    pub progress: u8,
    /// Present once the item completed.
    pub download_name: Option<String>,
    pub error: Option<String>,
}
