/*
 * Durable key-value storage for everything that must survive a restart: the
 * opened folder, the selection, sort order, search text and tree expansion.
 *
 * Two layers live here. `PreferenceStoreOperations` is the raw string store
 * (`get`/`set`/`remove`), with a JSON-file implementation for the application
 * and an in-memory one for tests. `Preferences` wraps a store with typed
 * accessors per logical key; the rest of the application only talks to
 * `Preferences`. Values that fail to parse are logged and treated as absent,
 * and write failures are logged and otherwise ignored.
 */
use super::file_record::SortSpec;
use super::path_utils;
use super::selection::SelectionSet;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const PREFERENCES_FILENAME: &str = "preferences.json";

/* The logical keys this application persists, and the storage key each maps to. */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceKey {
    SelectedFolder,
    SelectedFiles,
    SortOrder,
    SearchTerm,
    ExpandedNodes,
}

impl PreferenceKey {
    pub fn storage_key(self) -> &'static str {
        match self {
            PreferenceKey::SelectedFolder => "pastemax-selected-folder",
            PreferenceKey::SelectedFiles => "pastemax-selected-files",
            PreferenceKey::SortOrder => "pastemax-sort-order",
            PreferenceKey::SearchTerm => "pastemax-search-term",
            PreferenceKey::ExpandedNodes => "pastemax-expanded-nodes",
        }
    }
}

#[derive(Debug)]
pub enum PreferenceError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoConfigDirectory,
}

impl From<io::Error> for PreferenceError {
    fn from(err: io::Error) -> Self {
        PreferenceError::Io(err)
    }
}

impl From<serde_json::Error> for PreferenceError {
    fn from(err: serde_json::Error) -> Self {
        PreferenceError::Serde(err)
    }
}

impl std::fmt::Display for PreferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreferenceError::Io(e) => write!(f, "Preference store I/O error: {e}"),
            PreferenceError::Serde(e) => write!(f, "Preference store format error: {e}"),
            PreferenceError::NoConfigDirectory => {
                write!(f, "Could not determine configuration directory for preferences")
            }
        }
    }
}

impl std::error::Error for PreferenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PreferenceError::Io(e) => Some(e),
            PreferenceError::Serde(e) => Some(e),
            PreferenceError::NoConfigDirectory => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PreferenceError>;

pub trait PreferenceStoreOperations: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/*
 * Keeps every key in one pretty-printed JSON object on disk. The whole map is
 * read once when the store is opened and rewritten on each change.
 */
pub struct JsonFilePreferenceStore {
    file_path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFilePreferenceStore {
    /*
     * Opens (or prepares to create) `preferences.json` inside `dir`. A missing
     * file is an empty store. A file that cannot be parsed is also treated as
     * empty, and gets overwritten on the next write.
     */
    pub fn open_in_dir(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let file_path = dir.join(PREFERENCES_FILENAME);
        let values = if file_path.exists() {
            let reader = BufReader::new(File::open(&file_path)?);
            match serde_json::from_reader(reader) {
                Ok(values) => values,
                Err(e) => {
                    log::warn!(
                        "JsonFilePreferenceStore: Ignoring unreadable preference file {file_path:?}: {e}"
                    );
                    BTreeMap::new()
                }
            }
        } else {
            log::debug!("JsonFilePreferenceStore: No preference file at {file_path:?} yet.");
            BTreeMap::new()
        };
        Ok(JsonFilePreferenceStore {
            file_path,
            values: Mutex::new(values),
        })
    }

    /* Opens the store in the platform's local configuration directory for `app_name`. */
    pub fn open_default(app_name: &str) -> Result<Self> {
        let dir = path_utils::get_base_app_config_local_dir(app_name)
            .ok_or(PreferenceError::NoConfigDirectory)?;
        Self::open_in_dir(&dir)
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let writer = BufWriter::new(File::create(&self.file_path)?);
        serde_json::to_writer_pretty(writer, values)?;
        log::trace!("JsonFilePreferenceStore: Wrote {} keys to {:?}.", values.len(), self.file_path);
        Ok(())
    }

    fn lock_values(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PreferenceStoreOperations for JsonFilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock_values().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.lock_values();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.lock_values();
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct InMemoryPreferenceStore {
    values: Mutex<BTreeMap<String, String>>,
}

#[cfg(test)]
impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        InMemoryPreferenceStore::default()
    }
}

#[cfg(test)]
impl PreferenceStoreOperations for InMemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(key);
        Ok(())
    }
}

/*
 * Typed access to the persisted keys. Loads return `None` or the default for
 * absent or corrupt values. Saves never fail from the caller's point of view.
 */
pub struct Preferences {
    store: Box<dyn PreferenceStoreOperations>,
}

impl Preferences {
    pub fn new(store: Box<dyn PreferenceStoreOperations>) -> Self {
        Preferences { store }
    }

    fn get(&self, key: PreferenceKey) -> Option<String> {
        self.store.get(key.storage_key())
    }

    fn set(&self, key: PreferenceKey, value: &str) {
        if let Err(e) = self.store.set(key.storage_key(), value) {
            log::error!("Preferences: Failed to save {key:?}: {e}");
        }
    }

    fn remove(&self, key: PreferenceKey) {
        if let Err(e) = self.store.remove(key.storage_key()) {
            log::error!("Preferences: Failed to remove {key:?}: {e}");
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, key: PreferenceKey) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Preferences: Stored value for {key:?} is corrupt, using default: {e}");
                None
            }
        }
    }

    fn set_json<T: serde::Serialize>(&self, key: PreferenceKey, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.set(key, &json),
            Err(e) => log::error!("Preferences: Failed to serialize {key:?}: {e}"),
        }
    }

    pub fn load_selected_folder(&self) -> Option<String> {
        self.get(PreferenceKey::SelectedFolder)
            .filter(|folder| !folder.trim().is_empty())
    }

    pub fn save_selected_folder(&self, folder: Option<&str>) {
        match folder {
            Some(folder) => self.set(PreferenceKey::SelectedFolder, folder),
            None => self.remove(PreferenceKey::SelectedFolder),
        }
    }

    pub fn load_selected_files(&self) -> Option<Vec<String>> {
        self.get_json(PreferenceKey::SelectedFiles)
    }

    pub fn save_selected_files(&self, selection: &SelectionSet) {
        self.set_json(PreferenceKey::SelectedFiles, &selection.to_sorted_vec());
    }

    pub fn clear_selected_files(&self) {
        self.remove(PreferenceKey::SelectedFiles);
    }

    pub fn load_sort_order(&self) -> SortSpec {
        let Some(raw) = self.get(PreferenceKey::SortOrder) else {
            return SortSpec::default();
        };
        raw.parse().unwrap_or_else(|e| {
            log::warn!("Preferences: {e}; using default sort order.");
            SortSpec::default()
        })
    }

    pub fn save_sort_order(&self, sort: SortSpec) {
        self.set(PreferenceKey::SortOrder, &sort.to_string());
    }

    pub fn load_search_term(&self) -> String {
        self.get(PreferenceKey::SearchTerm).unwrap_or_default()
    }

    pub fn save_search_term(&self, term: &str) {
        self.set(PreferenceKey::SearchTerm, term);
    }

    pub fn load_expanded_nodes(&self) -> BTreeMap<String, bool> {
        self.get_json(PreferenceKey::ExpandedNodes).unwrap_or_default()
    }

    pub fn save_expanded_nodes(&self, nodes: &BTreeMap<String, bool>) {
        self.set_json(PreferenceKey::ExpandedNodes, nodes);
    }
}
