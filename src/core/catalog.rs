/*
 * Holds the flat list of `FileRecord`s for the currently opened folder, in the
 * order the scanner delivered them. The catalog is only ever replaced as a
 * whole; the single exception is an in-session content edit.
 */
use super::file_record::FileRecord;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct Catalog {
    records: Vec<FileRecord>,
    index_by_path: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    /*
     * Replaces the catalog with a freshly scanned set of records. Paths must be
     * unique within a snapshot; if the payload repeats a path, the first
     * occurrence is kept and the rest are dropped.
     */
    pub fn load(&mut self, records: Vec<FileRecord>) {
        let mut kept = Vec::with_capacity(records.len());
        let mut index_by_path = HashMap::with_capacity(records.len());
        for record in records {
            if index_by_path.contains_key(&record.path) {
                log::warn!(
                    "Catalog: Dropping duplicate record for path '{}'.",
                    record.path
                );
                continue;
            }
            index_by_path.insert(record.path.clone(), kept.len());
            kept.push(record);
        }
        log::debug!("Catalog: Loaded {} records.", kept.len());
        self.records = kept;
        self.index_by_path = index_by_path;
    }

    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.index_by_path.get(path).map(|&i| &self.records[i])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index_by_path.contains_key(path)
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /*
     * Overwrites the content of one record after an explicit edit.
     * `size` and `token_count` are left as the scanner reported them; nothing
     * in the catalog caches values derived from content, so there is nothing
     * else to invalidate. Returns false if the path is unknown.
     */
    pub fn update_content(&mut self, path: &str, new_content: String) -> bool {
        match self.index_by_path.get(path) {
            Some(&i) => {
                self.records[i].content = new_content;
                log::debug!("Catalog: Updated content of '{path}' (size/tokens not recalculated).");
                true
            }
            None => {
                log::warn!("Catalog: Cannot update content of unknown path '{path}'.");
                false
            }
        }
    }

    /* Paths a newly opened folder starts with: everything not binary, skipped or excluded by default. */
    pub fn default_selection(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.is_selected_by_default())
            .map(|r| r.path.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, tokens: usize) -> FileRecord {
        let name = path.rsplit('/').next().unwrap_or(path);
        FileRecord::new(path, name, format!("content of {path}"), tokens)
    }

    #[test]
    fn test_load_replaces_previous_snapshot() {
        let mut catalog = Catalog::new();
        catalog.load(vec![record("/a/one.rs", 1), record("/a/two.rs", 2)]);
        assert_eq!(catalog.len(), 2);

        catalog.load(vec![record("/b/three.rs", 3)]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("/a/one.rs").is_none());
        assert_eq!(catalog.get("/b/three.rs").unwrap().token_count, 3);
    }

    #[test]
    fn test_load_keeps_first_of_duplicate_paths() {
        let mut catalog = Catalog::new();
        catalog.load(vec![record("/a/x.rs", 1), record("/a/y.rs", 2), record("/a/x.rs", 9)]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("/a/x.rs").unwrap().token_count, 1);
        let order: Vec<&str> = catalog.records().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(order, vec!["/a/x.rs", "/a/y.rs"]);
    }

    #[test]
    fn test_default_selection_skips_binary_skipped_and_excluded() {
        let mut binary = record("/a/img.png", 0);
        binary.is_binary = true;
        let mut skipped = record("/a/huge.log", 0);
        skipped.is_skipped = true;
        let mut excluded = record("/a/package-lock.json", 50);
        excluded.excluded_by_default = true;

        let mut catalog = Catalog::new();
        catalog.load(vec![record("/a/main.rs", 10), binary, skipped, excluded]);
        assert_eq!(catalog.default_selection(), vec!["/a/main.rs".to_string()]);
    }

    #[test]
    fn test_update_content_leaves_token_count_stale() {
        let mut catalog = Catalog::new();
        catalog.load(vec![record("/a/main.rs", 10)]);

        assert!(catalog.update_content("/a/main.rs", "fn main() {}".to_string()));
        let updated = catalog.get("/a/main.rs").unwrap();
        assert_eq!(updated.content, "fn main() {}");
        assert_eq!(updated.token_count, 10);

        assert!(!catalog.update_content("/a/missing.rs", "x".to_string()));
    }
}
