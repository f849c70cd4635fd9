/*
 * Derives the displayed list from the catalog: a case-insensitive filter over
 * name and path, followed by a stable sort driven by a `SortSpec`. The same
 * comparator orders the aggregated output, so display order and copy order
 * never disagree.
 */
use super::file_record::{FileRecord, SortDirection, SortKey, SortSpec};
use std::cmp::Ordering;

/*
 * Compares two names the way a human-facing list expects: letters compare
 * without regard to case first, and only equal-ignoring-case names fall back
 * to a case-sensitive comparison so the order stays total.
 */
fn compare_names(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

/* Ascending comparator for the key of `sort`, reversed for descending. */
pub fn compare_records(a: &FileRecord, b: &FileRecord, sort: SortSpec) -> Ordering {
    let ordering = match sort.key {
        SortKey::Name => compare_names(&a.name, &b.name),
        SortKey::TokenCount => a.token_count.cmp(&b.token_count),
        SortKey::Size => a.size.cmp(&b.size),
    };
    match sort.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/* True if `record` passes the filter. `filter_lower` must already be lowercase. */
fn matches_filter(record: &FileRecord, filter_lower: &str) -> bool {
    filter_lower.is_empty()
        || record.name.to_lowercase().contains(filter_lower)
        || record.path.to_lowercase().contains(filter_lower)
}

/*
 * Sorts in place with `slice::sort_by`, which is stable: records with equal
 * keys keep their relative order.
 */
pub fn sort_records(records: &mut [&FileRecord], sort: SortSpec) {
    records.sort_by(|a, b| compare_records(a, b, sort));
}

/*
 * Produces the displayed list. Pure: neither the catalog nor any selection is
 * touched, and every returned reference points into `records`.
 */
pub fn filter_and_sort<'a>(
    records: &'a [FileRecord],
    filter_text: &str,
    sort: SortSpec,
) -> Vec<&'a FileRecord> {
    let filter_lower = filter_text.to_lowercase();
    let mut displayed: Vec<&FileRecord> = records
        .iter()
        .filter(|r| matches_filter(r, &filter_lower))
        .collect();
    sort_records(&mut displayed, sort);
    log::trace!(
        "Projector: {} of {} records displayed for filter '{}' sorted {}.",
        displayed.len(),
        records.len(),
        filter_text,
        sort
    );
    displayed
}
