/*
 * Builds the text block that gets copied or saved: the content of every
 * selected file, in current sort order, each preceded by a header naming the
 * file. Content is emitted untouched. Selection entries for paths the catalog
 * no longer has are ignored, and binary or skipped records never reach the
 * output even if a selection somehow contains them.
 */
use super::catalog::Catalog;
use super::file_record::{FileRecord, SortSpec};
use super::projector;
use super::selection::SelectionSet;

pub const NO_FILES_SELECTED: &str = "No files selected.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub text: String,
    pub total_tokens: usize,
    pub file_count: usize,
}

fn file_header(record: &FileRecord) -> String {
    format!("\n\n// ---- File: {} ----\n\n", record.name)
}

/* Selected records present in the catalog, excluding binary/skipped ones, in catalog order. */
pub fn selected_records<'a>(catalog: &'a Catalog, selection: &SelectionSet) -> Vec<&'a FileRecord> {
    catalog
        .records()
        .iter()
        .filter(|r| selection.contains(&r.path))
        .filter(|r| {
            if !r.is_selectable() {
                log::warn!(
                    "Assembler: Ignoring selected path '{}' flagged binary or skipped.",
                    r.path
                );
            }
            r.is_selectable()
        })
        .collect()
}

/*
 * Sum of token counts over the selection, counting only records the catalog
 * knows. The display filter plays no part.
 */
pub fn total_selected_tokens(catalog: &Catalog, selection: &SelectionSet) -> usize {
    selected_records(catalog, selection)
        .iter()
        .map(|r| r.token_count)
        .sum()
}

/*
 * Produces the aggregate for the current selection. Calling it twice with the
 * same inputs yields identical output.
 */
pub fn assemble(catalog: &Catalog, selection: &SelectionSet, sort: SortSpec) -> Aggregate {
    let mut records = selected_records(catalog, selection);
    projector::sort_records(&mut records, sort);

    if records.is_empty() {
        log::debug!("Assembler: Nothing selected.");
        return Aggregate {
            text: NO_FILES_SELECTED.to_string(),
            total_tokens: 0,
            file_count: 0,
        };
    }

    let capacity = records
        .iter()
        .map(|r| r.content.len() + r.name.len() + 24)
        .sum();
    let mut text = String::with_capacity(capacity);
    let mut total_tokens = 0;
    for record in &records {
        text.push_str(&file_header(record));
        text.push_str(&record.content);
        total_tokens += record.token_count;
    }

    log::debug!(
        "Assembler: Assembled {} files, {} tokens, {} bytes.",
        records.len(),
        total_tokens,
        text.len()
    );
    Aggregate {
        text,
        total_tokens,
        file_count: records.len(),
    }
}
