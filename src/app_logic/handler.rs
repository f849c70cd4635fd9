/*
 * `PasteAppLogic` is the single owner of the catalog, the selection and the
 * view state. The front end feeds it `AppEvent`s one at a time; each event is
 * a complete synchronous state transition that persists whatever it changed
 * and returns `UiCommand`s: notifications about what changed, plus requests
 * for work that happens outside (scanning, writing files).
 *
 * Scans are tagged with a monotonically increasing request id. Only the
 * response to the most recently issued request is applied; anything older is
 * dropped, so a slow scan of a previous folder can never overwrite a newer one.
 */
use super::tree_view::{self, TreeNode};
use super::view_state::{ProcessingStatus, ViewState};
use crate::core::{
    self, Aggregate, Catalog, FileRecord, FileSystemError, Preferences, SelectionSet, SortSpec,
    bulk_selection, path_utils, projector,
};

#[derive(Debug)]
pub enum AppEvent {
    /* Restore persisted state; issued once when the front end starts. */
    Startup,
    /* Result of the folder picker. `None` means no usable path came back. */
    FolderSelected { folder_path: Option<String> },
    RescanRequested,
    ScanCompleted {
        request_id: u64,
        result: Result<Vec<FileRecord>, FileSystemError>,
    },
    FileToggled { path: String },
    /* `prefix` must be separator-terminated, e.g. a folder node id from the tree. */
    FolderSelectionChanged { prefix: String, selected: bool },
    SelectAllDisplayed,
    DeselectAllDisplayed,
    SortChanged(SortSpec),
    SearchChanged(String),
    NodeExpansionToggled { node_id: String },
    FileViewOpened { path: String },
    FileViewClosed,
    FileContentEdited { path: String, content: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    RequestScan { request_id: u64, folder: String },
    DisplayedListChanged,
    SelectionChanged { selected_count: usize, total_tokens: usize },
    ExpansionChanged { node_id: String, expanded: bool },
    ViewChanged { viewed_path: Option<String> },
    StatusChanged(ProcessingStatus),
    SaveFile { path: String, content: String },
}

#[derive(Debug, Clone, Copy)]
struct PendingScan {
    request_id: u64,
    /* Restoring at startup keeps the persisted selection; opening a folder resets it. */
    keep_selection: bool,
}

pub struct PasteAppLogic {
    catalog: Catalog,
    selection: SelectionSet,
    view: ViewState,
    selected_folder: Option<String>,
    last_scan_request_id: u64,
    pending_scan: Option<PendingScan>,
    preferences: Preferences,
}

impl PasteAppLogic {
    pub fn new(preferences: Preferences) -> Self {
        PasteAppLogic {
            catalog: Catalog::new(),
            selection: SelectionSet::new(),
            view: ViewState::default(),
            selected_folder: None,
            last_scan_request_id: 0,
            pending_scan: None,
            preferences,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn selected_folder(&self) -> Option<&str> {
        self.selected_folder.as_deref()
    }

    pub fn displayed_files(&self) -> Vec<&FileRecord> {
        projector::filter_and_sort(self.catalog.records(), &self.view.filter_text, self.view.sort)
    }

    pub fn aggregate(&self) -> Aggregate {
        core::assemble(&self.catalog, &self.selection, self.view.sort)
    }

    pub fn total_selected_tokens(&self) -> usize {
        core::total_selected_tokens(&self.catalog, &self.selection)
    }

    pub fn viewed_file(&self) -> Option<&FileRecord> {
        self.view.viewed_path().and_then(|p| self.catalog.get(p))
    }

    pub fn tree(&self) -> Vec<TreeNode> {
        let root_prefix = self
            .selected_folder
            .as_deref()
            .map(path_utils::folder_prefix)
            .unwrap_or_default();
        tree_view::build_tree(&self.displayed_files(), &root_prefix, &self.selection, &self.view)
    }

    fn selection_changed(&self) -> UiCommand {
        self.preferences.save_selected_files(&self.selection);
        UiCommand::SelectionChanged {
            selected_count: self.selection.len(),
            total_tokens: self.total_selected_tokens(),
        }
    }

    fn set_status(&mut self, status: ProcessingStatus) -> UiCommand {
        self.view.set_status(status.clone());
        UiCommand::StatusChanged(status)
    }

    /*
     * A newer request supersedes any pending one, but a pending request that
     * still owes the folder its default selection passes that on: otherwise
     * a rescan issued before a newly opened folder finished loading would
     * leave the folder with an empty selection.
     */
    fn request_scan(&mut self, folder: String, keep_selection: bool) -> UiCommand {
        let keep_selection = keep_selection && self.pending_scan.is_none_or(|p| p.keep_selection);
        self.last_scan_request_id += 1;
        let request_id = self.last_scan_request_id;
        self.pending_scan = Some(PendingScan {
            request_id,
            keep_selection,
        });
        log::debug!("PasteAppLogic: Requesting scan #{request_id} of '{folder}'.");
        UiCommand::RequestScan { request_id, folder }
    }

    fn on_startup(&mut self) -> Vec<UiCommand> {
        let sort = self.preferences.load_sort_order();
        let filter_text = self.preferences.load_search_term();
        let expanded = self.preferences.load_expanded_nodes();
        self.view = ViewState::new(filter_text, sort, expanded);

        let restored_selection = self.preferences.load_selected_files();
        let keep_selection = restored_selection.is_some();
        if let Some(paths) = restored_selection {
            self.selection.replace(paths);
        }

        self.selected_folder = self.preferences.load_selected_folder();
        let Some(folder) = self.selected_folder.clone() else {
            log::info!("PasteAppLogic: No previously selected folder to restore.");
            return Vec::new();
        };
        log::info!("PasteAppLogic: Restoring previously selected folder '{folder}'.");
        vec![
            self.set_status(ProcessingStatus::Processing(
                "Loading files from previously selected folder...".to_string(),
            )),
            self.request_scan(folder, keep_selection),
        ]
    }

    fn on_folder_selected(&mut self, folder_path: Option<String>) -> Vec<UiCommand> {
        let Some(folder) = folder_path.filter(|f| !f.trim().is_empty()) else {
            log::error!("PasteAppLogic: Folder selection returned no usable path.");
            return vec![self.set_status(ProcessingStatus::Error(
                "Invalid folder path received".to_string(),
            ))];
        };
        log::info!("PasteAppLogic: Folder selected: '{folder}'.");
        self.preferences.save_selected_folder(Some(&folder));
        self.selected_folder = Some(folder.clone());
        // The saved selection is dropped rather than saved empty; until the
        // first scan succeeds, a restart still applies the default selection.
        self.preferences.clear_selected_files();
        self.selection.replace(Vec::<String>::new());
        vec![
            UiCommand::SelectionChanged {
                selected_count: 0,
                total_tokens: 0,
            },
            self.set_status(ProcessingStatus::Processing("Requesting file list...".to_string())),
            self.request_scan(folder, false),
        ]
    }

    fn on_rescan_requested(&mut self) -> Vec<UiCommand> {
        match self.selected_folder.clone() {
            Some(folder) => vec![
                self.set_status(ProcessingStatus::Processing("Rescanning folder...".to_string())),
                self.request_scan(folder, true),
            ],
            None => {
                log::warn!("PasteAppLogic: Rescan requested with no folder selected.");
                Vec::new()
            }
        }
    }

    fn on_scan_completed(
        &mut self,
        request_id: u64,
        result: Result<Vec<FileRecord>, FileSystemError>,
    ) -> Vec<UiCommand> {
        let pending = match self.pending_scan {
            Some(pending) if pending.request_id == request_id => pending,
            _ => {
                log::debug!(
                    "PasteAppLogic: Discarding stale scan response #{request_id} (latest is #{}).",
                    self.last_scan_request_id
                );
                return Vec::new();
            }
        };
        self.pending_scan = None;

        match result {
            Ok(records) => {
                self.catalog.load(records);
                if !pending.keep_selection {
                    self.selection.replace(self.catalog.default_selection());
                }
                if let Some(viewed) = self.view.viewed_path() {
                    if !self.catalog.contains(viewed) {
                        self.view.close_view();
                    }
                }
                let loaded = format!("Loaded {} files", self.catalog.len());
                vec![
                    UiCommand::DisplayedListChanged,
                    self.selection_changed(),
                    self.set_status(ProcessingStatus::Complete(loaded)),
                ]
            }
            Err(e) => {
                log::error!("PasteAppLogic: Scan #{request_id} failed: {e}");
                vec![self.set_status(ProcessingStatus::Error(format!("Failed to load folder: {e}")))]
            }
        }
    }

    fn on_file_toggled(&mut self, path: &str) -> Vec<UiCommand> {
        let now_selected = self.selection.toggle(path);
        if !self.catalog.contains(path) {
            log::debug!("PasteAppLogic: Toggled '{path}', which is not in the current catalog.");
        }
        log::debug!("PasteAppLogic: '{path}' selected = {now_selected}.");
        vec![self.selection_changed()]
    }

    fn on_folder_selection_changed(&mut self, prefix: &str, selected: bool) -> Vec<UiCommand> {
        let changed =
            bulk_selection::apply_folder_selection(&self.catalog, &mut self.selection, prefix, selected);
        if changed == 0 {
            return Vec::new();
        }
        vec![self.selection_changed()]
    }

    fn on_displayed_bulk(&mut self, selected: bool) -> Vec<UiCommand> {
        let displayed =
            projector::filter_and_sort(self.catalog.records(), &self.view.filter_text, self.view.sort);
        let changed = if selected {
            bulk_selection::select_displayed(&displayed, &mut self.selection)
        } else {
            bulk_selection::deselect_displayed(&displayed, &mut self.selection)
        };
        if changed == 0 {
            return Vec::new();
        }
        vec![self.selection_changed()]
    }

    fn on_sort_changed(&mut self, sort: SortSpec) -> Vec<UiCommand> {
        self.view.sort = sort;
        self.preferences.save_sort_order(sort);
        vec![UiCommand::DisplayedListChanged]
    }

    fn on_search_changed(&mut self, term: String) -> Vec<UiCommand> {
        self.preferences.save_search_term(&term);
        self.view.filter_text = term;
        vec![UiCommand::DisplayedListChanged]
    }

    fn on_node_expansion_toggled(&mut self, node_id: String) -> Vec<UiCommand> {
        let expanded = self.view.toggle_expanded(&node_id);
        self.preferences.save_expanded_nodes(self.view.expanded_nodes());
        vec![UiCommand::ExpansionChanged { node_id, expanded }]
    }

    fn on_file_view_opened(&mut self, path: &str) -> Vec<UiCommand> {
        if !self.catalog.contains(path) {
            log::warn!("PasteAppLogic: Cannot view '{path}': not in the current catalog.");
            return Vec::new();
        }
        self.view.open_view(path);
        vec![UiCommand::ViewChanged {
            viewed_path: Some(path.to_string()),
        }]
    }

    fn on_file_view_closed(&mut self) -> Vec<UiCommand> {
        if self.view.viewed_path().is_none() {
            return Vec::new();
        }
        self.view.close_view();
        vec![UiCommand::ViewChanged { viewed_path: None }]
    }

    fn on_file_content_edited(&mut self, path: String, content: String) -> Vec<UiCommand> {
        if !self.catalog.update_content(&path, content.clone()) {
            return vec![self.set_status(ProcessingStatus::Error(format!(
                "Cannot save '{path}': file is not part of the opened folder"
            )))];
        }
        vec![UiCommand::SaveFile { path, content }]
    }

    /* Applies one event and reports what changed. */
    pub fn handle_event(&mut self, event: AppEvent) -> Vec<UiCommand> {
        log::trace!("PasteAppLogic: Handling {event:?}");
        match event {
            AppEvent::Startup => self.on_startup(),
            AppEvent::FolderSelected { folder_path } => self.on_folder_selected(folder_path),
            AppEvent::RescanRequested => self.on_rescan_requested(),
            AppEvent::ScanCompleted { request_id, result } => {
                self.on_scan_completed(request_id, result)
            }
            AppEvent::FileToggled { path } => self.on_file_toggled(&path),
            AppEvent::FolderSelectionChanged { prefix, selected } => {
                self.on_folder_selection_changed(&prefix, selected)
            }
            AppEvent::SelectAllDisplayed => self.on_displayed_bulk(true),
            AppEvent::DeselectAllDisplayed => self.on_displayed_bulk(false),
            AppEvent::SortChanged(sort) => self.on_sort_changed(sort),
            AppEvent::SearchChanged(term) => self.on_search_changed(term),
            AppEvent::NodeExpansionToggled { node_id } => self.on_node_expansion_toggled(node_id),
            AppEvent::FileViewOpened { path } => self.on_file_view_opened(&path),
            AppEvent::FileViewClosed => self.on_file_view_closed(),
            AppEvent::FileContentEdited { path, content } => {
                self.on_file_content_edited(path, content)
            }
        }
    }
}
