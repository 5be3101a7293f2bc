use heic_core::{
    update, AppState, ArchiveRequestEntry, Effect, ItemId, Msg, Notice, ResultKey, SourceFile,
};
use pretty_assertions::assert_eq;

fn heic(name: &str) -> SourceFile {
    SourceFile::new(name, vec![3u8; 4])
}

fn key(id: u64) -> ResultKey {
    ResultKey { id, byte_len: 4 }
}

fn settle_with(state: AppState, item_id: ItemId, ok: bool) -> AppState {
    let result = if ok {
        Ok(key(item_id))
    } else {
        Err("Conversion failed".to_string())
    };
    let (state, _) = update(state, Msg::ConversionFinished { item_id, result });
    let (state, _) = update(state, Msg::DrainSettled);
    state
}

fn scenario_abc() -> AppState {
    let files = vec![heic("a.heic"), heic("b.heic"), heic("c.heic")];
    let (state, _) = update(AppState::new(), Msg::FilesSelected(files));
    let state = settle_with(state, 1, true);
    let state = settle_with(state, 2, false);
    settle_with(state, 3, true)
}

#[test]
fn archive_request_lists_completed_items_with_swapped_extension() {
    let state = scenario_abc();
    assert!(state.view().archive_offered);

    let (state, effects) = update(state, Msg::DownloadAllClicked);
    assert_eq!(
        effects,
        vec![Effect::BuildArchive {
            entries: vec![
                ArchiveRequestEntry {
                    name: "a.jpg".to_string(),
                    key: key(1),
                },
                ArchiveRequestEntry {
                    name: "c.jpg".to_string(),
                    key: key(3),
                },
            ]
        }]
    );
    assert!(state.view().packaging);
}

#[test]
fn not_offered_with_fewer_than_two_results() {
    let files = vec![heic("a.heic"), heic("b.heic")];
    let (state, _) = update(AppState::new(), Msg::FilesSelected(files));
    let state = settle_with(state, 1, true);
    let state = settle_with(state, 2, false);

    assert!(!state.archive_offered());
    let (state, effects) = update(state, Msg::DownloadAllClicked);
    assert!(effects.is_empty());
    assert!(!state.is_packaging());
}

#[test]
fn not_offered_while_the_batch_is_still_running() {
    let files = vec![heic("a.heic"), heic("b.heic"), heic("c.heic")];
    let (state, _) = update(AppState::new(), Msg::FilesSelected(files));
    let state = settle_with(state, 1, true);
    let state = settle_with(state, 2, true);

    // c is converting.
    assert_eq!(state.completed_count(), 2);
    assert!(!state.archive_offered());
    let (_, effects) = update(state, Msg::DownloadAllClicked);
    assert!(effects.is_empty());
}

#[test]
fn second_click_while_packaging_is_ignored() {
    let (state, first) = update(scenario_abc(), Msg::DownloadAllClicked);
    let (state, second) = update(state, Msg::DownloadAllClicked);

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());

    let (state, _) = update(state, Msg::ArchiveFinished { result: Ok(()) });
    assert!(!state.is_packaging());
    let (_, third) = update(state, Msg::DownloadAllClicked);
    assert_eq!(third.len(), 1);
}

#[test]
fn packaging_failure_leaves_items_untouched() {
    let before = scenario_abc();
    let (state, _) = update(before.clone(), Msg::DownloadAllClicked);
    let (state, effects) = update(
        state,
        Msg::ArchiveFinished {
            result: Err("result 3 is gone".to_string()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.items(), before.items());
    assert_eq!(
        state.notice(),
        Some(&Notice::PackagingFailed("result 3 is gone".to_string()))
    );
    assert!(!state.is_packaging());
}

#[test]
fn same_stem_names_are_passed_through_for_the_archiver() {
    let files = vec![heic("x.heic"), SourceFile::new("x.HEIC", vec![1])];
    let (state, _) = update(AppState::new(), Msg::FilesSelected(files));
    let state = settle_with(state, 1, true);
    let state = settle_with(state, 2, true);

    let (_, effects) = update(state, Msg::DownloadAllClicked);
    let names: Vec<_> = match effects.as_slice() {
        [Effect::BuildArchive { entries }] => entries.iter().map(|e| e.name.clone()).collect(),
        other => panic!("unexpected effects {other:?}"),
    };
    assert_eq!(names, vec!["x.jpg", "x.jpg"]);
}

#[test]
fn single_download_uses_the_item_result() {
    let state = scenario_abc();

    let (state, effects) = update(state, Msg::DownloadClicked(3));
    assert_eq!(
        effects,
        vec![Effect::SaveResult {
            key: key(3),
            name: "c.jpg".to_string()
        }]
    );

    let (state, effects) = update(state, Msg::DownloadClicked(2));
    assert!(effects.is_empty());
    let (_, effects) = update(state, Msg::DownloadClicked(99));
    assert!(effects.is_empty());
}
