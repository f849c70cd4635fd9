/*
 * Drives `PasteAppLogic` for the command-line front end. Every command is
 * turned into one `AppEvent`; the `UiCommand`s that come back are executed
 * synchronously: scan requests run the scanner and feed `ScanCompleted` back
 * in, save requests go to the exporter, and error statuses become the
 * command's error. Output for the user goes to the supplied writer.
 */
use crate::app_logic::{AppEvent, CheckState, PasteAppLogic, ProcessingStatus, UiCommand, ViewState};
use crate::app_logic::tree_view::visible_nodes;
use crate::cli::Command;
use crate::core::{
    ExportError, ExporterOperations, FileRecord, FileSystemScannerOperations, Preferences,
    assembler, path_utils,
};
use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

#[derive(Debug)]
pub enum SessionError {
    /* The application logic reported an error status. */
    Status(String),
    UnknownFile(String),
    Io(io::Error),
    Export(ExportError),
}

impl From<io::Error> for SessionError {
    fn from(err: io::Error) -> Self {
        SessionError::Io(err)
    }
}

impl From<ExportError> for SessionError {
    fn from(err: ExportError) -> Self {
        SessionError::Export(err)
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Status(msg) => write!(f, "{msg}"),
            SessionError::UnknownFile(path) => {
                write!(f, "'{path}' is not a file in the opened folder")
            }
            SessionError::Io(e) => write!(f, "I/O error: {e}"),
            SessionError::Export(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Io(e) => Some(e),
            SessionError::Export(e) => Some(e),
            SessionError::Status(_) | SessionError::UnknownFile(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

pub struct Session {
    logic: PasteAppLogic,
    scanner: Box<dyn FileSystemScannerOperations>,
    exporter: Box<dyn ExporterOperations>,
}

impl Session {
    pub fn new(
        preferences: Preferences,
        scanner: Box<dyn FileSystemScannerOperations>,
        exporter: Box<dyn ExporterOperations>,
    ) -> Self {
        Session {
            logic: PasteAppLogic::new(preferences),
            scanner,
            exporter,
        }
    }

    #[cfg(test)]
    pub fn logic(&self) -> &PasteAppLogic {
        &self.logic
    }

    /*
     * Restores the persisted state and rescans the persisted folder. A folder
     * that can no longer be scanned is reported but does not stop the command
     * that follows.
     */
    pub fn restore(&mut self) {
        if let Err(e) = self.dispatch(AppEvent::Startup) {
            log::warn!("Session: Could not restore previous folder: {e}");
        }
    }

    /* Feeds `event` to the logic and executes the resulting commands until none are left. */
    pub fn dispatch(&mut self, event: AppEvent) -> Result<()> {
        let mut pending = VecDeque::from([event]);
        let mut failure = None;
        while let Some(event) = pending.pop_front() {
            for command in self.logic.handle_event(event) {
                match command {
                    UiCommand::RequestScan { request_id, folder } => {
                        let result = self.scanner.scan(Path::new(&folder));
                        pending.push_back(AppEvent::ScanCompleted { request_id, result });
                    }
                    UiCommand::SaveFile { path, content } => {
                        self.exporter.write_text(Path::new(&path), &content)?;
                    }
                    UiCommand::StatusChanged(ProcessingStatus::Error(msg)) => failure = Some(msg),
                    other => log::trace!("Session: {other:?}"),
                }
            }
        }
        match failure {
            Some(msg) => Err(SessionError::Status(msg)),
            None => Ok(()),
        }
    }

    /*
     * Maps a path given on the command line to a catalog path. Paths already
     * in the catalog and absolute paths are used as given; relative ones are
     * taken relative to the opened folder.
     */
    fn resolve_path(&self, arg: &str) -> String {
        if self.logic.catalog().contains(arg) || Path::new(arg).is_absolute() {
            return arg.to_string();
        }
        match self.logic.selected_folder() {
            Some(folder) => Path::new(folder).join(arg).to_string_lossy().into_owned(),
            None => arg.to_string(),
        }
    }

    fn resolve_folder(&self, arg: &str) -> String {
        path_utils::folder_prefix(&self.resolve_path(arg))
    }

    fn resolve_file(&self, arg: &str) -> Result<String> {
        let path = self.resolve_path(arg);
        if self.logic.catalog().contains(&path) {
            Ok(path)
        } else {
            Err(SessionError::UnknownFile(arg.to_string()))
        }
    }

    fn display_path<'a>(&self, path: &'a str) -> &'a str {
        self.logic
            .selected_folder()
            .map(path_utils::folder_prefix)
            .and_then(|prefix| path.strip_prefix(prefix.as_str()))
            .unwrap_or(path)
    }

    pub fn run(&mut self, command: Command, out: &mut dyn Write) -> Result<()> {
        log::debug!("Session: Running {command:?}");
        match command {
            Command::Open { folder } => {
                let folder = fs::canonicalize(&folder)?;
                self.dispatch(AppEvent::FolderSelected {
                    folder_path: Some(folder.to_string_lossy().into_owned()),
                })?;
                self.write_status(out)
            }
            Command::Rescan => {
                if self.logic.selected_folder().is_none() {
                    return Err(SessionError::Status("No folder selected".to_string()));
                }
                self.dispatch(AppEvent::RescanRequested)?;
                self.write_status(out)
            }
            Command::Status => self.write_status(out),
            Command::List => self.write_list(out),
            Command::Tree => self.write_tree(out),
            Command::Search { term } => {
                self.dispatch(AppEvent::SearchChanged(term))?;
                self.write_list(out)
            }
            Command::Sort { order } => {
                self.dispatch(AppEvent::SortChanged(order))?;
                self.write_list(out)
            }
            Command::Toggle { path } => {
                let path = self.resolve_file(&path)?;
                self.dispatch(AppEvent::FileToggled { path: path.clone() })?;
                let state = if self.logic.selection().contains(&path) { "selected" } else { "deselected" };
                writeln!(out, "{} {state}", self.display_path(&path))?;
                self.write_totals(out)
            }
            Command::SelectFolder { folder } => self.change_folder_selection(&folder, true, out),
            Command::DeselectFolder { folder } => self.change_folder_selection(&folder, false, out),
            Command::SelectAll => {
                self.dispatch(AppEvent::SelectAllDisplayed)?;
                self.write_totals(out)
            }
            Command::DeselectAll => {
                self.dispatch(AppEvent::DeselectAllDisplayed)?;
                self.write_totals(out)
            }
            Command::Expand { folder } => {
                let node_id = self.resolve_folder(&folder);
                self.dispatch(AppEvent::NodeExpansionToggled { node_id })?;
                self.write_tree(out)
            }
            Command::View { path } => {
                let path = self.resolve_file(&path)?;
                self.dispatch(AppEvent::FileViewOpened { path })?;
                if let Some(record) = self.logic.viewed_file() {
                    write_viewed(record, out)?;
                }
                self.dispatch(AppEvent::FileViewClosed)
            }
            Command::Edit { path, from } => {
                let path = self.resolve_file(&path)?;
                let content = fs::read_to_string(&from)?;
                self.dispatch(AppEvent::FileContentEdited {
                    path: path.clone(),
                    content,
                })?;
                writeln!(out, "Saved {}", self.display_path(&path))?;
                Ok(())
            }
            Command::Copy { output } => {
                let aggregate = self.logic.aggregate();
                match output {
                    Some(target) => {
                        self.exporter.write_text(&target, &aggregate.text)?;
                        writeln!(
                            out,
                            "Wrote {} files ({} tokens) to {}",
                            aggregate.file_count,
                            aggregate.total_tokens,
                            target.display()
                        )?;
                    }
                    None => out.write_all(aggregate.text.as_bytes())?,
                }
                Ok(())
            }
        }
    }

    fn change_folder_selection(&mut self, folder: &str, selected: bool, out: &mut dyn Write) -> Result<()> {
        let prefix = self.resolve_folder(folder);
        self.dispatch(AppEvent::FolderSelectionChanged { prefix, selected })?;
        self.write_totals(out)
    }

    fn write_status(&self, out: &mut dyn Write) -> Result<()> {
        let view = self.logic.view_state();
        writeln!(out, "{}", ViewState::compose_title(self.logic.selected_folder()))?;
        writeln!(out, "Status: {}", view.status())?;
        writeln!(out, "Sort: {}", view.sort)?;
        if !view.filter_text.is_empty() {
            writeln!(out, "Search: {}", view.filter_text)?;
        }
        self.write_totals(out)
    }

    fn write_totals(&self, out: &mut dyn Write) -> Result<()> {
        let selected = assembler::selected_records(self.logic.catalog(), self.logic.selection());
        let tokens: usize = selected.iter().map(|r| r.token_count).sum();
        writeln!(out, "Selected: {} files, {tokens} tokens", selected.len())?;
        Ok(())
    }

    fn write_list(&self, out: &mut dyn Write) -> Result<()> {
        let selection = self.logic.selection();
        for record in self.logic.displayed_files() {
            let marker = if !record.is_selectable() {
                "[-]"
            } else if selection.contains(&record.path) {
                "[x]"
            } else {
                "[ ]"
            };
            writeln!(
                out,
                "{marker} {:>8}  {}{}",
                record.token_count,
                self.display_path(&record.path),
                record_note(record)
            )?;
        }
        Ok(())
    }

    fn write_tree(&self, out: &mut dyn Write) -> Result<()> {
        let tree = self.logic.tree();
        for (depth, node) in visible_nodes(&tree) {
            let check = match node.state {
                _ if !node.selectable => "[-]",
                CheckState::Checked => "[x]",
                CheckState::Unchecked => "[ ]",
                CheckState::Mixed => "[~]",
            };
            let indent = "  ".repeat(depth);
            if node.is_folder {
                let arrow = if node.expanded { "-" } else { "+" };
                writeln!(out, "{indent}{check} {arrow} {}/ ({})", node.name, node.token_count)?;
            } else {
                writeln!(out, "{indent}{check}   {} ({})", node.name, node.token_count)?;
            }
        }
        Ok(())
    }
}

fn record_note(record: &FileRecord) -> String {
    if record.is_binary {
        " (binary)".to_string()
    } else if record.is_skipped {
        match &record.error {
            Some(reason) => format!(" (skipped: {reason})"),
            None => " (skipped)".to_string(),
        }
    } else if record.excluded_by_default {
        " (excluded by default)".to_string()
    } else {
        String::new()
    }
}

fn write_viewed(record: &FileRecord, out: &mut dyn Write) -> io::Result<()> {
    if record.is_binary {
        writeln!(out, "{} is a binary file.", record.name)
    } else {
        out.write_all(record.content.as_bytes())
    }
}
