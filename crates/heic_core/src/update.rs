use queue_logging::{queue_debug, queue_info, queue_warn};

use crate::{download_name, AppState, ArchiveRequestEntry, Effect, Msg, Notice, SourceFile};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSelected(files) => {
            if files.is_empty() {
                return (state, Vec::new());
            }
            let offered = files.len();
            let accepted: Vec<SourceFile> = files
                .into_iter()
                .filter(|file| state.rules().accepts(file))
                .collect();
            let rejected = offered - accepted.len();
            if accepted.is_empty() {
                queue_warn!("Intake rejected all {} offered files", offered);
                state.set_notice(Some(Notice::NoValidFiles));
                return (state, Vec::new());
            }

            if state.notice() == Some(&Notice::NoValidFiles) {
                state.set_notice(None);
            }
            let ids = state.enqueue(accepted);
            state.set_last_intake(ids.len(), rejected);
            queue_info!(
                "Intake accepted={} rejected={} ids={:?}",
                ids.len(),
                rejected,
                ids
            );
            start_next(&mut state)
        }
        Msg::ConversionFinished { item_id, result } => {
            if let Err(reason) = &result {
                queue_warn!("Item {} failed: {}", item_id, reason);
            }
            match state.finish(item_id, result) {
                Some(orphan) => {
                    // Item was removed while converting; its output has no owner.
                    queue_info!("Discarding result of removed item {}", item_id);
                    vec![Effect::ReleaseResult { key: orphan }]
                }
                None => Vec::new(),
            }
        }
        Msg::DrainSettled => {
            state.settle();
            start_next(&mut state)
        }
        Msg::RemoveItem(item_id) => match state.remove(item_id) {
            Some(Some(key)) => vec![Effect::ReleaseResult { key }],
            Some(None) => Vec::new(),
            None => {
                queue_debug!("Remove ignored for unknown item {}", item_id);
                Vec::new()
            }
        },
        Msg::ClearAll => release_all(&mut state),
        Msg::DownloadClicked(item_id) => match state.item(item_id) {
            Some(item) => match item.result() {
                Some(key) => vec![Effect::SaveResult {
                    key,
                    name: download_name(&item.source.name),
                }],
                None => Vec::new(),
            },
            None => Vec::new(),
        },
        Msg::DownloadAllClicked => {
            if state.is_packaging() || !state.archive_offered() {
                return (state, Vec::new());
            }
            let entries: Vec<ArchiveRequestEntry> = state
                .items()
                .iter()
                .filter_map(|item| {
                    item.result().map(|key| ArchiveRequestEntry {
                        name: download_name(&item.source.name),
                        key,
                    })
                })
                .collect();
            state.set_packaging(true);
            vec![Effect::BuildArchive { entries }]
        }
        Msg::ArchiveFinished { result } => {
            state.set_packaging(false);
            if let Err(reason) = result {
                state.set_notice(Some(Notice::PackagingFailed(reason)));
            }
            Vec::new()
        }
        Msg::NoticeDismissed => {
            state.set_notice(None);
            Vec::new()
        }
        Msg::Shutdown => {
            let mut effects = release_all(&mut state);
            effects.push(Effect::Shutdown);
            effects
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start_next(state: &mut AppState) -> Vec<Effect> {
    match state.start_next() {
        Some((item_id, source)) => {
            queue_debug!("Converting item {} ({})", item_id, source.name);
            vec![Effect::Convert { item_id, source }]
        }
        None => Vec::new(),
    }
}

fn release_all(state: &mut AppState) -> Vec<Effect> {
    state
        .clear()
        .into_iter()
        .map(|key| Effect::ReleaseResult { key })
        .collect()
}
