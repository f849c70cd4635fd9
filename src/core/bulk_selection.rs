/*
 * Resolves one "select/deselect this folder" gesture into set operations on
 * the selection. Folder membership is a plain string-prefix test on the
 * record path. Callers must pass a separator-terminated prefix (`"/p/src/"`,
 * not `"/p/src"`) or sibling folders sharing a name prefix will match too.
 *
 * Also hosts the "select/deselect everything displayed" gestures, which
 * act on the filtered list instead of a folder.
 */
use super::catalog::Catalog;
use super::file_record::FileRecord;
use super::selection::SelectionSet;

/* Paths under `prefix` that bulk selection may touch: not binary, not skipped. */
pub fn eligible_paths_under<'a>(catalog: &'a Catalog, prefix: &str) -> Vec<&'a str> {
    catalog
        .records()
        .iter()
        .filter(|r| r.path.starts_with(prefix) && r.is_selectable())
        .map(|r| r.path.as_str())
        .collect()
}

/*
 * Unions (or removes) every eligible path under `prefix`. Files that were only
 * excluded by default are eligible. Paths outside the prefix are untouched.
 * Returns the number of paths whose membership changed.
 */
pub fn apply_folder_selection(
    catalog: &Catalog,
    selection: &mut SelectionSet,
    prefix: &str,
    want_selected: bool,
) -> usize {
    let eligible = eligible_paths_under(catalog, prefix);
    let changed = if want_selected {
        selection.select_all(eligible.iter().copied())
    } else {
        selection.deselect_all(eligible.iter().copied())
    };
    log::debug!(
        "BulkSelection: {} folder '{}': {} eligible, {} changed.",
        if want_selected { "Selected" } else { "Deselected" },
        prefix,
        eligible.len(),
        changed
    );
    changed
}

/* Adds every selectable record of the displayed list. */
pub fn select_displayed(displayed: &[&FileRecord], selection: &mut SelectionSet) -> usize {
    selection.select_all(
        displayed
            .iter()
            .filter(|r| r.is_selectable())
            .map(|r| r.path.as_str()),
    )
}

/* Removes every displayed path, whatever its flags. */
pub fn deselect_displayed(displayed: &[&FileRecord], selection: &mut SelectionSet) -> usize {
    selection.deselect_all(displayed.iter().map(|r| r.path.as_str()))
}
