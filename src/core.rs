/*
 * The platform-agnostic engine: the catalog of scanned files, the selection
 * set, the filter/sort projection, folder bulk selection and the assembler
 * that produces the final text block. It also holds the replaceable adapters
 * behind traits (`FileSystemScannerOperations`, `TokenCounterOperations`,
 * `PreferenceStoreOperations`, `ExporterOperations`) that the application
 * logic receives by injection.
 */
pub mod assembler;
pub mod bulk_selection;
pub mod catalog;
pub mod export;
pub mod file_record;
pub mod file_system;
pub mod path_utils;
pub mod preferences;
pub mod projector;
pub mod selection;
pub mod tokenizer_utils;

pub use assembler::{Aggregate, assemble, total_selected_tokens};
#[cfg(test)]
pub use assembler::NO_FILES_SELECTED;

pub use catalog::Catalog;
pub use export::{CoreExporter, ExportError, ExporterOperations};

pub use file_record::{FileRecord, SortSpec};
#[cfg(test)]
pub use file_record::{SortDirection, SortKey};

pub use file_system::{
    CoreFileSystemScanner, FileSystemError, FileSystemScannerOperations, ScannerConfig,
};

pub use preferences::{JsonFilePreferenceStore, Preferences};
#[cfg(test)]
pub use preferences::{InMemoryPreferenceStore, PreferenceError, PreferenceStoreOperations};

pub use selection::SelectionSet;

pub use tokenizer_utils::TikTokenCounter;
#[cfg(test)]
pub use tokenizer_utils::{TokenCounterOperations, WhitespaceTokenCounter};
