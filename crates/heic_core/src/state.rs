use bytes::Bytes;

use crate::view_model::{AppViewModel, IntakeStats, ItemRowView, StatusKind};
use crate::naming::{download_name, human_size};

pub type ItemId = u64;

/// One file handed over by the picker or drop surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub size: u64,
    /// Declared media type, if the surface supplied one.
    pub media_type: Option<String>,
    pub bytes: Bytes,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            media_type: None,
            bytes,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }
}

/// Handle to converted bytes held by the engine's result store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultKey {
    pub id: u64,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    Pending,
    Converting,
    Completed { result: ResultKey },
    Error { reason: String },
}

impl ItemStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            ItemStatus::Pending => StatusKind::Pending,
            ItemStatus::Converting => StatusKind::Converting,
            ItemStatus::Completed { .. } => StatusKind::Completed,
            ItemStatus::Error { .. } => StatusKind::Error,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, ItemStatus::Pending | ItemStatus::Converting)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub id: ItemId,
    pub source: SourceFile,
    pub status: ItemStatus,
    pub progress: u8,
}

impl QueueItem {
    pub fn result(&self) -> Option<ResultKey> {
        match self.status {
            ItemStatus::Completed { result } => Some(result),
            _ => None,
        }
    }
}

/// User-facing one-shot notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Files were offered but none matched the accepted source format.
    NoValidFiles,
    PackagingFailed(String),
}

/// Which files intake accepts. Comparisons are ASCII case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeRules {
    /// Extensions without the leading dot.
    pub extensions: Vec<String>,
    pub media_types: Vec<String>,
}

impl Default for IntakeRules {
    fn default() -> Self {
        Self {
            extensions: vec!["heic".to_string()],
            media_types: vec!["image/heic".to_string()],
        }
    }
}

impl IntakeRules {
    pub fn accepts(&self, file: &SourceFile) -> bool {
        let by_extension = file
            .name
            .rsplit_once('.')
            .map(|(_, ext)| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false);
        let by_type = file
            .media_type
            .as_deref()
            .map(|mt| self.media_types.iter().any(|t| t.eq_ignore_ascii_case(mt.trim())))
            .unwrap_or(false);
        by_extension || by_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    rules: IntakeRules,
    items: Vec<QueueItem>,
    next_id: ItemId,
    drain_active: bool,
    packaging: bool,
    notice: Option<Notice>,
    last_intake: Option<IntakeStats>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: IntakeRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&QueueItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn rules(&self) -> &IntakeRules {
        &self.rules
    }

    pub fn is_drain_active(&self) -> bool {
        self.drain_active
    }

    pub fn is_packaging(&self) -> bool {
        self.packaging
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.result().is_some()).count()
    }

    pub fn converting_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.status == ItemStatus::Converting)
            .count()
    }

    pub fn any_in_flight(&self) -> bool {
        self.items.iter().any(|item| item.status.is_in_flight())
    }

    /// Bulk download is offered once the batch settled with two or more results.
    pub fn archive_offered(&self) -> bool {
        self.completed_count() >= 2 && !self.any_in_flight()
    }

    /// True when nothing is queued, converting or waiting on the settle delay.
    pub fn is_idle(&self) -> bool {
        !self.drain_active && !self.any_in_flight()
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> AppViewModel {
        let rows = self
            .items
            .iter()
            .map(|item| ItemRowView {
                item_id: item.id,
                name: item.source.name.clone(),
                size: item.source.size,
                size_label: human_size(item.source.size),
                status: item.status.kind(),
                progress: item.progress,
                download_name: item
                    .result()
                    .map(|_| download_name(&item.source.name)),
                error: match &item.status {
                    ItemStatus::Error { reason } => Some(reason.clone()),
                    _ => None,
                },
            })
            .collect();

        AppViewModel {
            items: rows,
            item_count: self.items.len(),
            completed_count: self.completed_count(),
            any_in_flight: self.any_in_flight(),
            archive_offered: self.archive_offered(),
            packaging: self.packaging,
            notice: self.notice.clone(),
            last_intake: self.last_intake.clone(),
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_notice(&mut self, notice: Option<Notice>) {
        if self.notice != notice {
            self.notice = notice;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_last_intake(&mut self, accepted: usize, rejected: usize) {
        self.last_intake = Some(IntakeStats { accepted, rejected });
        self.mark_dirty();
    }

    /// Appends accepted files as `Pending` items, preserving input order.
    pub(crate) fn enqueue(&mut self, files: Vec<SourceFile>) -> Vec<ItemId> {
        let mut ids = Vec::with_capacity(files.len());
        for source in files {
            self.next_id += 1;
            let id = self.next_id;
            self.items.push(QueueItem {
                id,
                source,
                status: ItemStatus::Pending,
                progress: 0,
            });
            ids.push(id);
        }
        if !ids.is_empty() {
            self.mark_dirty();
        }
        ids
    }

    /// Starts the first pending item unless a drain cycle is already active.
    pub(crate) fn start_next(&mut self) -> Option<(ItemId, SourceFile)> {
        if self.drain_active {
            return None;
        }
        let item = self
            .items
            .iter_mut()
            .find(|item| item.status == ItemStatus::Pending)?;
        item.status = ItemStatus::Converting;
        self.drain_active = true;
        self.dirty = true;
        Some((item.id, item.source.clone()))
    }

    /// Applies a conversion outcome. Returns the key back when the item is gone
    /// or no longer converting, so the caller can discard the orphaned output.
    pub(crate) fn finish(
        &mut self,
        id: ItemId,
        result: Result<ResultKey, String>,
    ) -> Option<ResultKey> {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.id == id && item.status == ItemStatus::Converting)
        else {
            return result.ok();
        };
        match result {
            Ok(key) => {
                item.status = ItemStatus::Completed { result: key };
                item.progress = 100;
            }
            Err(reason) => {
                item.status = ItemStatus::Error { reason };
            }
        }
        self.dirty = true;
        None
    }

    pub(crate) fn settle(&mut self) {
        self.drain_active = false;
    }

    /// Removes an item, returning its result key if it held one.
    pub(crate) fn remove(&mut self, id: ItemId) -> Option<Option<ResultKey>> {
        let index = self.items.iter().position(|item| item.id == id)?;
        let removed = self.items.remove(index);
        self.mark_dirty();
        Some(removed.result())
    }

    /// Drops every item, returning the result keys they held in queue order.
    pub(crate) fn clear(&mut self) -> Vec<ResultKey> {
        if self.items.is_empty() {
            return Vec::new();
        }
        let keys = self.items.iter().filter_map(QueueItem::result).collect();
        self.items.clear();
        self.mark_dirty();
        keys
    }

    pub(crate) fn set_packaging(&mut self, packaging: bool) {
        if self.packaging != packaging {
            self.packaging = packaging;
            self.mark_dirty();
        }
    }
}
