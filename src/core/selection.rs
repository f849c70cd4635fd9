/*
 * The set of file paths the user has chosen for aggregation. It is independent
 * of what is currently displayed and may hold paths that are not (or no longer)
 * in the catalog; consumers resolve membership against the catalog themselves.
 * All batch operations are plain set union/difference.
 */
use std::collections::HashSet;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    paths: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        SelectionSet::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /* Flips membership of `path`. Returns the new membership. */
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.paths.remove(path) {
            false
        } else {
            self.paths.insert(path.to_string());
            true
        }
    }

    /* Union. Returns how many paths were newly added. */
    pub fn select_all<I, S>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        paths
            .into_iter()
            .map(Into::into)
            .fold(0, |added, p| added + usize::from(self.paths.insert(p)))
    }

    /* Difference. Returns how many paths were actually removed. */
    pub fn deselect_all<I, S>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths
            .into_iter()
            .fold(0, |removed, p| removed + usize::from(self.paths.remove(p.as_ref())))
    }

    pub fn replace<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths = paths.into_iter().map(Into::into).collect();
    }

    /* Deterministic read order, used when the set is persisted. */
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut sorted: Vec<String> = self.paths.iter().cloned().collect();
        sorted.sort();
        sorted
    }
}
