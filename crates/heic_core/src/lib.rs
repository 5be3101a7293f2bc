//! Conversion queue core: pure state machine and view-model helpers.
mod effect;
mod msg;
mod naming;
mod state;
mod update;
mod view_model;

pub use effect::{ArchiveRequestEntry, Effect};
pub use msg::Msg;
pub use naming::{download_name, human_size, TARGET_EXTENSION};
pub use state::{
    AppState, IntakeRules, ItemId, ItemStatus, Notice, QueueItem, ResultKey, SourceFile,
};
pub use update::update;
pub use view_model::{AppViewModel, IntakeStats, ItemRowView, StatusKind};
