/*
 * Groups the displayed (filtered and sorted) list into a folder tree. Folder
 * node ids are the separator-terminated path prefixes of the records under
 * them, so a folder id can be handed straight to folder bulk selection.
 * Folders come first at each level in name order; files keep the displayed
 * order.
 */
use super::view_state::ViewState;
use crate::core::{FileRecord, SelectionSet};
use std::collections::BTreeMap;
use std::path::is_separator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Checked,
    Unchecked,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    pub is_folder: bool,
    /* False for binary or skipped files, and for folders holding only such files. */
    pub selectable: bool,
    pub expanded: bool,
    pub state: CheckState,
    pub token_count: usize,
    pub children: Vec<TreeNode>,
}

#[derive(Default)]
struct FolderBuilder<'a> {
    id: String,
    name: String,
    folders: BTreeMap<String, FolderBuilder<'a>>,
    files: Vec<&'a FileRecord>,
}

impl<'a> FolderBuilder<'a> {
    fn insert(&mut self, record: &'a FileRecord, relative_start: usize) {
        let rel = &record.path[relative_start..];
        match rel.char_indices().find(|&(_, c)| is_separator(c)) {
            Some((i, sep)) => {
                let end = relative_start + i + sep.len_utf8();
                let name = &rel[..i];
                let child = self.folders.entry(name.to_string()).or_insert_with(|| FolderBuilder {
                    id: record.path[..end].to_string(),
                    name: name.to_string(),
                    ..FolderBuilder::default()
                });
                child.insert(record, end);
            }
            None => self.files.push(record),
        }
    }

    fn build(self, selection: &SelectionSet, view: &ViewState) -> Vec<TreeNode> {
        let mut nodes: Vec<TreeNode> = self
            .folders
            .into_values()
            .map(|folder| {
                let id = folder.id.clone();
                let name = folder.name.clone();
                let children = folder.build(selection, view);
                TreeNode {
                    expanded: view.is_expanded(&id),
                    selectable: children.iter().any(|c| c.selectable),
                    state: folder_state(&children),
                    token_count: children.iter().map(|c| c.token_count).sum(),
                    id,
                    name,
                    is_folder: true,
                    children,
                }
            })
            .collect();
        nodes.extend(self.files.into_iter().map(|record| TreeNode {
            id: record.path.clone(),
            name: record.name.clone(),
            is_folder: false,
            selectable: record.is_selectable(),
            expanded: false,
            state: if selection.contains(&record.path) && record.is_selectable() {
                CheckState::Checked
            } else {
                CheckState::Unchecked
            },
            token_count: record.token_count,
            children: Vec::new(),
        }));
        nodes
    }
}

/*
 * Only selectable children count, since bulk selection never checks the
 * others. Checked when every counted child is checked, unchecked when none is
 * checked or partially checked, mixed otherwise. A folder with nothing to
 * count is unchecked.
 */
fn folder_state(children: &[TreeNode]) -> CheckState {
    let counted: Vec<&TreeNode> = children.iter().filter(|c| c.selectable).collect();
    if counted.is_empty() {
        return CheckState::Unchecked;
    }
    if counted.iter().all(|c| c.state == CheckState::Checked) {
        CheckState::Checked
    } else if counted.iter().all(|c| c.state == CheckState::Unchecked) {
        CheckState::Unchecked
    } else {
        CheckState::Mixed
    }
}

/*
 * Builds the tree for `displayed`. `root_prefix` (separator-terminated) is
 * stripped from each path before grouping; records outside it are grouped by
 * their full path.
 */
pub fn build_tree(
    displayed: &[&FileRecord],
    root_prefix: &str,
    selection: &SelectionSet,
    view: &ViewState,
) -> Vec<TreeNode> {
    let mut root = FolderBuilder::default();
    for record in displayed {
        let start = if !root_prefix.is_empty() && record.path.starts_with(root_prefix) {
            root_prefix.len()
        } else {
            0
        };
        root.insert(record, start);
    }
    root.build(selection, view)
}

/* Depth-first list of the nodes a tree widget would show: children of collapsed folders are hidden. */
pub fn visible_nodes(nodes: &[TreeNode]) -> Vec<(usize, &TreeNode)> {
    fn walk<'a>(nodes: &'a [TreeNode], depth: usize, out: &mut Vec<(usize, &'a TreeNode)>) {
        for node in nodes {
            out.push((depth, node));
            if node.is_folder && node.expanded {
                walk(&node.children, depth + 1, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(nodes, 0, &mut out);
    out
}
