/*
 * Defines the data carried for every scanned file (`FileRecord`) and the sort
 * specification (`SortSpec`) that governs both the displayed order and the
 * order in which selected files are concatenated.
 *
 * `FileRecord` is serialized with camelCase field names so a scanner payload
 * produced by another process can be consumed as-is.
 */
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/*
 * One entry per file discovered by the scanner. Everything except `content` is
 * fixed once produced; `content` may be replaced by an explicit in-session edit.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub token_count: usize,
    #[serde(default)]
    pub is_binary: bool,
    #[serde(default)]
    pub is_skipped: bool,
    #[serde(default)]
    pub excluded_by_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileRecord {
    /*
     * Creates a plain text record. Size is derived from the content length;
     * the token count must be supplied by whoever estimated it.
     */
    pub fn new(path: impl Into<String>, name: impl Into<String>, content: String, token_count: usize) -> Self {
        FileRecord {
            path: path.into(),
            name: name.into(),
            size: content.len() as u64,
            content,
            token_count,
            is_binary: false,
            is_skipped: false,
            excluded_by_default: false,
            error: None,
        }
    }

    /* True when neither exclusion flag set by the scanner is raised. */
    pub fn is_selectable(&self) -> bool {
        !self.is_binary && !self.is_skipped
    }

    /* True when the file belongs in the selection a freshly opened folder starts with. */
    pub fn is_selected_by_default(&self) -> bool {
        self.is_selectable() && !self.excluded_by_default
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Name,
    TokenCount,
    Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/*
 * Sort key plus direction. The textual form is `<key>-<dir>`, where key is one
 * of `name`, `tokens`, `size` and dir is `asc` or `desc`. This is also the
 * form stored in the preference store.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        SortSpec { key, direction }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec::new(SortKey::TokenCount, SortDirection::Descending)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self.key {
            SortKey::Name => "name",
            SortKey::TokenCount => "tokens",
            SortKey::Size => "size",
        };
        let direction = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        write!(f, "{key}-{direction}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSortSpecError(pub String);

impl fmt::Display for ParseSortSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid sort order '{}'. Expected <name|tokens|size>-<asc|desc>",
            self.0
        )
    }
}

impl std::error::Error for ParseSortSpecError {}

impl FromStr for SortSpec {
    type Err = ParseSortSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSortSpecError(s.to_string());
        let (key_text, direction_text) = s.trim().split_once('-').ok_or_else(err)?;
        let key = match key_text {
            "name" => SortKey::Name,
            "tokens" => SortKey::TokenCount,
            "size" => SortKey::Size,
            _ => return Err(err()),
        };
        let direction = match direction_text {
            "asc" => SortDirection::Ascending,
            "desc" => SortDirection::Descending,
            _ => return Err(err()),
        };
        Ok(SortSpec { key, direction })
    }
}
