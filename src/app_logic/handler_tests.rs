use super::handler::*;
use super::view_state::ProcessingStatus;
use crate::core::preferences::{PreferenceKey, Result as PreferenceResult};
use crate::core::{
    FileRecord, FileSystemError, InMemoryPreferenceStore, NO_FILES_SELECTED, PreferenceError,
    PreferenceStoreOperations, Preferences, SortDirection, SortKey, SortSpec,
};
use std::io;
use std::sync::Arc;

/*
 * Unit tests for `PasteAppLogic`. Scans are simulated by answering the
 * `RequestScan` commands the logic emits with hand-built records, and the
 * preference store is an in-memory one that can be shared between two logic
 * instances to simulate a restart.
 */

struct SharedStore(Arc<InMemoryPreferenceStore>);

impl PreferenceStoreOperations for SharedStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key)
    }
    fn set(&self, key: &str, value: &str) -> PreferenceResult<()> {
        self.0.set(key, value)
    }
    fn remove(&self, key: &str) -> PreferenceResult<()> {
        self.0.remove(key)
    }
}

struct FailingStore;

impl PreferenceStoreOperations for FailingStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }
    fn set(&self, _key: &str, _value: &str) -> PreferenceResult<()> {
        Err(PreferenceError::Io(io::Error::other("disk full")))
    }
    fn remove(&self, _key: &str) -> PreferenceResult<()> {
        Err(PreferenceError::NoConfigDirectory)
    }
}

fn new_logic(store: &Arc<InMemoryPreferenceStore>) -> PasteAppLogic {
    PasteAppLogic::new(Preferences::new(Box::new(SharedStore(Arc::clone(store)))))
}

fn record(path: &str, content: &str, tokens: usize) -> FileRecord {
    let name = path.rsplit('/').next().unwrap_or(path);
    FileRecord::new(path, name, content.to_string(), tokens)
}

fn project_records() -> Vec<FileRecord> {
    let mut logo = record("/proj/assets/logo.png", "", 0);
    logo.is_binary = true;
    let mut lock = record("/proj/package-lock.json", "{}", 500);
    lock.excluded_by_default = true;
    vec![
        record("/proj/src/main.rs", "fn main() {}", 40),
        record("/proj/src/lib.rs", "pub mod x;", 20),
        record("/proj/src2/extra.rs", "// extra", 5),
        record("/proj/README.md", "# Proj", 3),
        logo,
        lock,
    ]
}

fn scan_request(commands: &[UiCommand]) -> (u64, String) {
    commands
        .iter()
        .find_map(|c| match c {
            UiCommand::RequestScan { request_id, folder } => Some((*request_id, folder.clone())),
            _ => None,
        })
        .expect("expected a RequestScan command")
}

/* Selects `/proj` and answers its scan with `project_records()`. */
fn open_project(logic: &mut PasteAppLogic) -> Vec<UiCommand> {
    let commands = logic.handle_event(AppEvent::FolderSelected {
        folder_path: Some("/proj".to_string()),
    });
    let (request_id, folder) = scan_request(&commands);
    assert_eq!(folder, "/proj");
    logic.handle_event(AppEvent::ScanCompleted {
        request_id,
        result: Ok(project_records()),
    })
}

fn selected(logic: &PasteAppLogic) -> Vec<String> {
    logic.selection().to_sorted_vec()
}

#[test]
fn test_startup_without_saved_state_is_idle() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut logic = new_logic(&store);

    let commands = logic.handle_event(AppEvent::Startup);

    assert!(commands.is_empty());
    assert_eq!(logic.selected_folder(), None);
    assert_eq!(logic.view_state().sort, SortSpec::default());
    assert_eq!(*logic.view_state().status(), ProcessingStatus::Idle);
    assert_eq!(logic.aggregate().text, NO_FILES_SELECTED);
}

#[test]
fn test_opening_folder_selects_default_files() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut logic = new_logic(&store);

    let commands = open_project(&mut logic);

    assert!(commands.contains(&UiCommand::DisplayedListChanged));
    assert!(commands.contains(&UiCommand::SelectionChanged {
        selected_count: 4,
        total_tokens: 68,
    }));
    assert_eq!(
        *logic.view_state().status(),
        ProcessingStatus::Complete("Loaded 6 files".to_string())
    );
    assert_eq!(
        selected(&logic),
        vec![
            "/proj/README.md".to_string(),
            "/proj/src/lib.rs".to_string(),
            "/proj/src/main.rs".to_string(),
            "/proj/src2/extra.rs".to_string(),
        ]
    );
    assert_eq!(
        store.get(PreferenceKey::SelectedFolder.storage_key()).as_deref(),
        Some("/proj")
    );
    let persisted: Vec<String> =
        serde_json::from_str(&store.get(PreferenceKey::SelectedFiles.storage_key()).unwrap()).unwrap();
    assert_eq!(persisted, selected(&logic));
}

#[test]
fn test_stale_scan_response_is_discarded() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut logic = new_logic(&store);

    let first = logic.handle_event(AppEvent::FolderSelected {
        folder_path: Some("/old".to_string()),
    });
    let (old_id, _) = scan_request(&first);
    let second = logic.handle_event(AppEvent::FolderSelected {
        folder_path: Some("/proj".to_string()),
    });
    let (new_id, _) = scan_request(&second);
    assert!(new_id > old_id);

    let late = logic.handle_event(AppEvent::ScanCompleted {
        request_id: old_id,
        result: Ok(vec![record("/old/a.rs", "a", 1)]),
    });
    assert!(late.is_empty());
    assert!(logic.catalog().is_empty());

    logic.handle_event(AppEvent::ScanCompleted {
        request_id: new_id,
        result: Ok(project_records()),
    });
    assert_eq!(logic.catalog().len(), 6);
    assert!(logic.catalog().get("/old/a.rs").is_none());

    let repeated = logic.handle_event(AppEvent::ScanCompleted {
        request_id: new_id,
        result: Ok(Vec::new()),
    });
    assert!(repeated.is_empty());
    assert_eq!(logic.catalog().len(), 6);
}

#[test]
fn test_scan_failure_keeps_previous_catalog() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut logic = new_logic(&store);
    open_project(&mut logic);
    let before = selected(&logic);

    let commands = logic.handle_event(AppEvent::RescanRequested);
    let (request_id, _) = scan_request(&commands);
    let commands = logic.handle_event(AppEvent::ScanCompleted {
        request_id,
        result: Err(FileSystemError::InvalidPath("/proj".into())),
    });

    assert_eq!(logic.catalog().len(), 6);
    assert_eq!(selected(&logic), before);
    assert!(matches!(
        commands.as_slice(),
        [UiCommand::StatusChanged(ProcessingStatus::Error(_))]
    ));
}

#[test]
fn test_rescan_keeps_user_selection() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut logic = new_logic(&store);
    open_project(&mut logic);
    logic.handle_event(AppEvent::FileToggled {
        path: "/proj/README.md".to_string(),
    });

    let commands = logic.handle_event(AppEvent::RescanRequested);
    let (request_id, _) = scan_request(&commands);
    logic.handle_event(AppEvent::ScanCompleted {
        request_id,
        result: Ok(project_records()),
    });

    assert!(!logic.selection().contains("/proj/README.md"));
}

#[test]
fn test_missing_folder_path_reports_error_without_scanning() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut logic = new_logic(&store);
    open_project(&mut logic);

    let commands = logic.handle_event(AppEvent::FolderSelected { folder_path: None });

    assert_eq!(
        commands,
        vec![UiCommand::StatusChanged(ProcessingStatus::Error(
            "Invalid folder path received".to_string()
        ))]
    );
    assert_eq!(logic.selected_folder(), Some("/proj"));
    assert_eq!(logic.catalog().len(), 6);
}

#[test]
fn test_restart_restores_folder_selection_sort_search_and_expansion() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    {
        let mut logic = new_logic(&store);
        open_project(&mut logic);
        logic.handle_event(AppEvent::FileToggled {
            path: "/proj/src/main.rs".to_string(),
        });
        logic.handle_event(AppEvent::FileToggled {
            path: "/proj/package-lock.json".to_string(),
        });
        logic.handle_event(AppEvent::SortChanged(SortSpec::new(
            SortKey::Name,
            SortDirection::Ascending,
        )));
        logic.handle_event(AppEvent::SearchChanged("src".to_string()));
        logic.handle_event(AppEvent::NodeExpansionToggled {
            node_id: "/proj/src/".to_string(),
        });
    }

    let mut restarted = new_logic(&store);
    let commands = restarted.handle_event(AppEvent::Startup);
    let (request_id, folder) = scan_request(&commands);
    assert_eq!(folder, "/proj");
    assert!(restarted.view_state().is_processing());

    restarted.handle_event(AppEvent::ScanCompleted {
        request_id,
        result: Ok(project_records()),
    });

    assert_eq!(
        selected(&restarted),
        vec![
            "/proj/README.md".to_string(),
            "/proj/package-lock.json".to_string(),
            "/proj/src/lib.rs".to_string(),
            "/proj/src2/extra.rs".to_string(),
        ]
    );
    let view = restarted.view_state();
    assert_eq!(view.sort, SortSpec::new(SortKey::Name, SortDirection::Ascending));
    assert_eq!(view.filter_text, "src");
    assert!(!view.is_expanded("/proj/src/"));
}

#[test]
fn test_corrupt_preferences_fall_back_to_defaults() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    store.set(PreferenceKey::SelectedFiles.storage_key(), "not json").unwrap();
    store.set(PreferenceKey::SortOrder.storage_key(), "bogus").unwrap();
    store.set(PreferenceKey::ExpandedNodes.storage_key(), "{").unwrap();
    store.set(PreferenceKey::SelectedFolder.storage_key(), "/proj").unwrap();
    let mut logic = new_logic(&store);

    let commands = logic.handle_event(AppEvent::Startup);
    let (request_id, _) = scan_request(&commands);
    logic.handle_event(AppEvent::ScanCompleted {
        request_id,
        result: Ok(project_records()),
    });

    assert_eq!(logic.view_state().sort, SortSpec::default());
    assert_eq!(logic.selection().len(), 4);
}

#[test]
fn test_folder_bulk_selection_respects_prefix() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut logic = new_logic(&store);
    open_project(&mut logic);

    logic.handle_event(AppEvent::FolderSelectionChanged {
        prefix: "/proj/src/".to_string(),
        selected: false,
    });
    assert!(!logic.selection().contains("/proj/src/main.rs"));
    assert!(!logic.selection().contains("/proj/src/lib.rs"));
    assert!(logic.selection().contains("/proj/src2/extra.rs"));

    let commands = logic.handle_event(AppEvent::FolderSelectionChanged {
        prefix: "/proj/src/".to_string(),
        selected: true,
    });
    assert_eq!(logic.selection().len(), 4);
    assert!(matches!(commands.as_slice(), [UiCommand::SelectionChanged { .. }]));

    let unchanged = logic.handle_event(AppEvent::FolderSelectionChanged {
        prefix: "/proj/src/".to_string(),
        selected: true,
    });
    assert!(unchanged.is_empty());
}

#[test]
fn test_select_and_deselect_all_act_on_displayed_files_only() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut logic = new_logic(&store);
    open_project(&mut logic);

    logic.handle_event(AppEvent::SearchChanged("src".to_string()));
    logic.handle_event(AppEvent::DeselectAllDisplayed);
    assert_eq!(selected(&logic), vec!["/proj/README.md".to_string()]);

    logic.handle_event(AppEvent::SearchChanged(String::new()));
    logic.handle_event(AppEvent::SelectAllDisplayed);
    assert_eq!(logic.selection().len(), 5);
    assert!(logic.selection().contains("/proj/package-lock.json"));
    assert!(!logic.selection().contains("/proj/assets/logo.png"));
}

#[test]
fn test_token_total_ignores_search_filter() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut logic = new_logic(&store);
    open_project(&mut logic);

    logic.handle_event(AppEvent::SearchChanged("readme".to_string()));

    assert_eq!(logic.displayed_files().len(), 1);
    assert_eq!(logic.total_selected_tokens(), 68);
    assert_eq!(logic.aggregate().total_tokens, 68);
}

#[test]
fn test_aggregate_follows_current_sort() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut logic = new_logic(&store);
    open_project(&mut logic);

    let text = logic.aggregate().text;
    assert!(text.find("main.rs").unwrap() < text.find("lib.rs").unwrap());

    logic.handle_event(AppEvent::SortChanged(SortSpec::new(
        SortKey::TokenCount,
        SortDirection::Ascending,
    )));
    let text = logic.aggregate().text;
    assert!(text.find("README.md").unwrap() < text.find("main.rs").unwrap());
    assert!(text.starts_with("\n\n// ---- File: README.md ----\n\n# Proj"));
}

#[test]
fn test_view_and_edit_file() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut logic = new_logic(&store);
    open_project(&mut logic);

    let missing = logic.handle_event(AppEvent::FileViewOpened {
        path: "/nowhere.rs".to_string(),
    });
    assert!(missing.is_empty());
    assert!(logic.viewed_file().is_none());

    logic.handle_event(AppEvent::FileViewOpened {
        path: "/proj/src/lib.rs".to_string(),
    });
    assert_eq!(logic.viewed_file().unwrap().content, "pub mod x;");

    let commands = logic.handle_event(AppEvent::FileContentEdited {
        path: "/proj/src/lib.rs".to_string(),
        content: "pub mod y;".to_string(),
    });
    assert_eq!(
        commands,
        vec![UiCommand::SaveFile {
            path: "/proj/src/lib.rs".to_string(),
            content: "pub mod y;".to_string(),
        }]
    );
    assert!(logic.aggregate().text.contains("pub mod y;"));
    assert_eq!(logic.catalog().get("/proj/src/lib.rs").unwrap().token_count, 20);

    let closed = logic.handle_event(AppEvent::FileViewClosed);
    assert_eq!(closed, vec![UiCommand::ViewChanged { viewed_path: None }]);
    assert!(logic.handle_event(AppEvent::FileViewClosed).is_empty());
}

#[test]
fn test_tree_uses_folder_prefix_ids() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut logic = new_logic(&store);
    open_project(&mut logic);

    let tree = logic.tree();
    let folder_ids: Vec<&str> = tree
        .iter()
        .filter(|n| n.is_folder)
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(folder_ids, vec!["/proj/assets/", "/proj/src/", "/proj/src2/"]);
}

#[test]
fn test_persistence_failures_are_not_fatal() {
    let mut logic = PasteAppLogic::new(Preferences::new(Box::new(FailingStore)));
    open_project(&mut logic);
    logic.handle_event(AppEvent::FileToggled {
        path: "/proj/README.md".to_string(),
    });
    logic.handle_event(AppEvent::NodeExpansionToggled {
        node_id: "/proj/src/".to_string(),
    });
    assert_eq!(logic.selection().len(), 3);
    assert!(!logic.view_state().is_expanded("/proj/src/"));
}

#[test]
fn test_rescan_before_first_scan_completes_still_applies_default_selection() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut logic = new_logic(&store);

    let opened = logic.handle_event(AppEvent::FolderSelected {
        folder_path: Some("/proj".to_string()),
    });
    let (open_id, _) = scan_request(&opened);
    let rescanned = logic.handle_event(AppEvent::RescanRequested);
    let (rescan_id, _) = scan_request(&rescanned);

    assert!(logic
        .handle_event(AppEvent::ScanCompleted {
            request_id: open_id,
            result: Ok(project_records()),
        })
        .is_empty());
    logic.handle_event(AppEvent::ScanCompleted {
        request_id: rescan_id,
        result: Ok(project_records()),
    });

    assert_eq!(logic.selection().len(), 4);
    assert!(logic.selection().contains("/proj/src/main.rs"));
}

#[test]
fn test_opening_folder_drops_saved_selection_until_scan_succeeds() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    {
        let mut logic = new_logic(&store);
        open_project(&mut logic);
        logic.handle_event(AppEvent::FileToggled {
            path: "/proj/README.md".to_string(),
        });
        let commands = logic.handle_event(AppEvent::FolderSelected {
            folder_path: Some("/proj".to_string()),
        });
        assert!(commands.contains(&UiCommand::SelectionChanged {
            selected_count: 0,
            total_tokens: 0,
        }));
        // The process ends before the scan answers.
    }
    assert_eq!(store.get(PreferenceKey::SelectedFiles.storage_key()), None);

    let mut restarted = new_logic(&store);
    let commands = restarted.handle_event(AppEvent::Startup);
    let (request_id, _) = scan_request(&commands);
    restarted.handle_event(AppEvent::ScanCompleted {
        request_id,
        result: Ok(project_records()),
    });

    assert_eq!(restarted.selection().len(), 4);
    assert!(restarted.selection().contains("/proj/README.md"));
}

#[test]
fn test_failed_first_scan_leaves_default_selection_for_next_start() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    {
        let mut logic = new_logic(&store);
        let commands = logic.handle_event(AppEvent::FolderSelected {
            folder_path: Some("/proj".to_string()),
        });
        let (request_id, _) = scan_request(&commands);
        logic.handle_event(AppEvent::ScanCompleted {
            request_id,
            result: Err(FileSystemError::InvalidPath("/proj".into())),
        });
    }

    let mut restarted = new_logic(&store);
    let commands = restarted.handle_event(AppEvent::Startup);
    let (request_id, _) = scan_request(&commands);
    restarted.handle_event(AppEvent::ScanCompleted {
        request_id,
        result: Ok(project_records()),
    });

    assert_eq!(restarted.selection().len(), 4);
}
