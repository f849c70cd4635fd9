/*
 * State that only concerns presentation: the search box text, the sort order,
 * which tree nodes are collapsed, which file is open for viewing and the
 * processing status shown to the user. The filter text, sort order and
 * expansion map are persisted by `PasteAppLogic`; the viewed file and status
 * live only as long as the process.
 */
use crate::core::SortSpec;
use std::collections::BTreeMap;
use std::fmt;

pub const APP_TITLE: &str = "PastePacker";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProcessingStatus {
    #[default]
    Idle,
    Processing(String),
    Complete(String),
    Error(String),
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingStatus::Idle => write!(f, "Idle"),
            ProcessingStatus::Processing(msg) => write!(f, "Processing: {msg}"),
            ProcessingStatus::Complete(msg) => write!(f, "{msg}"),
            ProcessingStatus::Error(msg) => write!(f, "Error: {msg}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ViewState {
    pub filter_text: String,
    pub sort: SortSpec,
    /* Node id -> expanded. Nodes without an entry are expanded. */
    expanded_nodes: BTreeMap<String, bool>,
    viewed_path: Option<String>,
    status: ProcessingStatus,
}

impl ViewState {
    pub fn new(filter_text: String, sort: SortSpec, expanded_nodes: BTreeMap<String, bool>) -> Self {
        log::debug!("ViewState::new with filter '{filter_text}', sort {sort}.");
        ViewState {
            filter_text,
            sort,
            expanded_nodes,
            viewed_path: None,
            status: ProcessingStatus::Idle,
        }
    }

    pub fn is_expanded(&self, node_id: &str) -> bool {
        self.expanded_nodes.get(node_id).copied().unwrap_or(true)
    }

    /*
     * Flips the expanded state of `node_id`. A node never toggled before is
     * expanded, so its first toggle collapses it. Returns the new state.
     */
    pub fn toggle_expanded(&mut self, node_id: &str) -> bool {
        let expanded = !self.is_expanded(node_id);
        self.expanded_nodes.insert(node_id.to_string(), expanded);
        expanded
    }

    pub fn expanded_nodes(&self) -> &BTreeMap<String, bool> {
        &self.expanded_nodes
    }

    pub fn open_view(&mut self, path: &str) {
        self.viewed_path = Some(path.to_string());
    }

    pub fn close_view(&mut self) {
        self.viewed_path = None;
    }

    pub fn viewed_path(&self) -> Option<&str> {
        self.viewed_path.as_deref()
    }

    pub fn status(&self) -> &ProcessingStatus {
        &self.status
    }

    pub fn set_status(&mut self, status: ProcessingStatus) {
        log::info!("ViewState: Status -> {status}");
        self.status = status;
    }

    #[cfg(test)]
    pub fn is_processing(&self) -> bool {
        matches!(self.status, ProcessingStatus::Processing(_))
    }

    /* Title line: application name plus the opened folder, if any. */
    pub fn compose_title(selected_folder: Option<&str>) -> String {
        match selected_folder {
            Some(folder) => format!("{APP_TITLE} - [{folder}]"),
            None => format!("{APP_TITLE} - [No folder selected]"),
        }
    }
}
