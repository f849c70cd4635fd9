/*
 * The filesystem scanner: walks a folder and produces one `FileRecord` per
 * file. Ignore files (.gitignore, .ignore, git excludes) and hidden entries are
 * honored by the `ignore` crate walker, so ignored files never appear in the
 * catalog at all. For the files that remain, the scanner decides the flags the
 * selection logic relies on:
 *
 * - `is_skipped` for files above the size limit or that cannot be read,
 * - `is_binary` for known binary extensions or content that is not UTF-8 text,
 * - `excluded_by_default` for files matching a default-exclude glob (lock files,
 *   minified bundles), which stay visible but start unselected.
 */
use super::file_record::FileRecord;
use super::tokenizer_utils::TokenCounterOperations;
use glob::{MatchOptions, Pattern};
use ignore::WalkBuilder;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/* Bytes inspected for a NUL byte when sniffing binary content. */
const BINARY_SNIFF_LEN: usize = 8000;

const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "**/package-lock.json",
    "**/yarn.lock",
    "**/pnpm-lock.yaml",
    "**/Cargo.lock",
    "**/poetry.lock",
    "**/composer.lock",
    "**/*.min.js",
    "**/*.min.css",
    "**/*.map",
    "**/*.log",
    "**/.DS_Store",
];

const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tiff", "psd", "mp3", "mp4", "wav", "ogg",
    "avi", "mov", "webm", "flac", "pdf", "zip", "tar", "gz", "tgz", "7z", "rar", "jar", "exe",
    "dll", "so", "dylib", "o", "a", "lib", "bin", "dat", "class", "pyc", "wasm", "ttf", "otf",
    "woff", "woff2", "eot", "sqlite", "db",
];

#[derive(Debug)]
pub enum FileSystemError {
    Io(io::Error),
    IgnoreError(ignore::Error),
    InvalidPath(PathBuf),
}

impl From<io::Error> for FileSystemError {
    fn from(err: io::Error) -> Self {
        FileSystemError::Io(err)
    }
}

impl From<ignore::Error> for FileSystemError {
    fn from(err: ignore::Error) -> Self {
        FileSystemError::IgnoreError(err)
    }
}

impl std::fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSystemError::Io(e) => write!(f, "I/O error: {e}"),
            FileSystemError::IgnoreError(e) => write!(f, "Ignore rule error: {e}"),
            FileSystemError::InvalidPath(p) => write!(f, "Not a folder: {}", p.display()),
        }
    }
}

impl std::error::Error for FileSystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileSystemError::Io(e) => Some(e),
            FileSystemError::IgnoreError(e) => Some(e),
            FileSystemError::InvalidPath(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileSystemError>;

pub trait FileSystemScannerOperations: Send + Sync {
    /* Scans `root` recursively and returns its files in path order. */
    fn scan(&self, root: &Path) -> Result<Vec<FileRecord>>;
}

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub max_file_size: u64,
    pub default_exclude_patterns: Vec<String>,
    pub binary_extensions: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            default_exclude_patterns: DEFAULT_EXCLUDE_PATTERNS.iter().map(|s| s.to_string()).collect(),
            binary_extensions: BINARY_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub struct CoreFileSystemScanner {
    config: ScannerConfig,
    exclude_patterns: Vec<Pattern>,
    token_counter: Box<dyn TokenCounterOperations>,
}

impl CoreFileSystemScanner {
    /* Invalid default-exclude patterns are logged and dropped. */
    pub fn new(config: ScannerConfig, token_counter: Box<dyn TokenCounterOperations>) -> Self {
        let exclude_patterns = config
            .default_exclude_patterns
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    log::warn!("FileSystemScanner: Invalid default exclude pattern '{p}': {e}");
                    None
                }
            })
            .collect();
        CoreFileSystemScanner {
            config,
            exclude_patterns,
            token_counter,
        }
    }

    fn has_binary_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.config.binary_extensions.iter().any(|b| *b == ext)
            })
            .unwrap_or(false)
    }

    fn is_excluded_by_default(&self, relative: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        self.exclude_patterns
            .iter()
            .any(|p| p.matches_with(relative, options))
    }

    fn build_record(&self, root: &Path, path: &Path) -> FileRecord {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let mut record = FileRecord::new(path.to_string_lossy(), name, String::new(), 0);
        record.excluded_by_default = self.is_excluded_by_default(&relative);

        let size = match fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                log::warn!("FileSystemScanner: Cannot stat {path:?}: {e}");
                record.is_skipped = true;
                record.error = Some(format!("Could not read file: {e}"));
                return record;
            }
        };
        record.size = size;

        if size > self.config.max_file_size {
            record.is_skipped = true;
            record.error = Some(format!(
                "File too large ({:.2} MB, limit {:.2} MB)",
                size as f64 / (1024.0 * 1024.0),
                self.config.max_file_size as f64 / (1024.0 * 1024.0)
            ));
            return record;
        }

        if self.has_binary_extension(path) {
            record.is_binary = true;
            return record;
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("FileSystemScanner: Cannot read {path:?}: {e}");
                record.is_skipped = true;
                record.error = Some(format!("Could not read file: {e}"));
                return record;
            }
        };
        let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
        if sniff.contains(&0) {
            record.is_binary = true;
            return record;
        }
        match String::from_utf8(bytes) {
            Ok(content) => {
                record.token_count = self.token_counter.count_tokens(&content);
                record.content = content;
            }
            Err(_) => record.is_binary = true,
        }
        record
    }
}

impl Default for CoreFileSystemScanner {
    fn default() -> Self {
        Self::new(
            ScannerConfig::default(),
            Box::new(super::tokenizer_utils::TikTokenCounter::new()),
        )
    }
}

impl FileSystemScannerOperations for CoreFileSystemScanner {
    fn scan(&self, root: &Path) -> Result<Vec<FileRecord>> {
        if !root.is_dir() {
            return Err(FileSystemError::InvalidPath(root.to_path_buf()));
        }
        log::debug!("FileSystemScanner: Scanning {root:?}.");

        let walker = WalkBuilder::new(root)
            .standard_filters(true)
            .git_global(false)
            .require_git(false)
            .sort_by_file_path(|a, b| a.cmp(b))
            .build();

        let mut records = Vec::new();
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            records.push(self.build_record(root, entry.path()));
        }

        log::info!(
            "FileSystemScanner: Found {} files under {root:?} ({} binary, {} skipped).",
            records.len(),
            records.iter().filter(|r| r.is_binary).count(),
            records.iter().filter(|r| r.is_skipped).count()
        );
        Ok(records)
    }
}
