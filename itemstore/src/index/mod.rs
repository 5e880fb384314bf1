// In-memory structural index over stored items. Building and persisting it
// is the job of an index formatter; this type never touches the disk.

mod entry;

pub use entry::IndexEntry;

use std::collections::HashMap;
use uuid::Uuid;

/// Lookup tables over a set of index entries.
///
/// Paths compare case-insensitively and ignore trailing separators. Several
/// siblings may share a name, so path lookups can return more than one entry.
#[derive(Debug, Clone, Default)]
pub struct Index {
    entries: HashMap<Uuid, IndexEntry>,
    by_path: HashMap<String, Vec<Uuid>>,
    by_parent_path: HashMap<String, Vec<Uuid>>,
}

impl Index {
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        let mut index = Index::default();
        for entry in entries {
            if index.entries.contains_key(&entry.id()) {
                log::warn!("Duplicate index entry for {}; keeping the last one", entry.id());
            }
            index.upsert(entry);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries sorted by path.
    pub fn entries(&self) -> Vec<&IndexEntry> {
        sorted_by_path(self.entries.values().collect())
    }

    pub fn get_by_id(&self, id: Uuid) -> Option<&IndexEntry> {
        self.entries.get(&id)
    }

    pub fn get_by_path(&self, path: &str) -> Vec<&IndexEntry> {
        self.lookup(&self.by_path, path)
    }

    /// Direct children of the item with the given id.
    pub fn children(&self, id: Uuid) -> Vec<&IndexEntry> {
        match self.get_by_id(id).and_then(|e| e.path()) {
            Some(path) => self.children_of_path(path),
            None => Vec::new(),
        }
    }

    pub fn children_of_path(&self, path: &str) -> Vec<&IndexEntry> {
        self.lookup(&self.by_parent_path, path)
    }

    /// Every entry below the item with the given id, at any depth.
    pub fn descendants(&self, id: Uuid) -> Vec<&IndexEntry> {
        match self.get_by_id(id).and_then(|e| e.path()) {
            Some(path) => self.descendants_of_path(path),
            None => Vec::new(),
        }
    }

    pub fn descendants_of_path(&self, path: &str) -> Vec<&IndexEntry> {
        let prefix = format!("{}/", path_key(path));
        let found = self
            .entries
            .values()
            .filter(|e| e.path().is_some_and(|p| path_key(p).starts_with(&prefix)))
            .collect();
        sorted_by_path(found)
    }

    /// Insert or replace the entry with the same id.
    pub fn upsert(&mut self, entry: IndexEntry) {
        let id = entry.id();
        self.remove(id);
        if let Some(path) = entry.path() {
            self.by_path.entry(path_key(path)).or_default().push(id);
        }
        if let Some(parent_path) = entry.parent_path() {
            self.by_parent_path
                .entry(path_key(parent_path))
                .or_default()
                .push(id);
        }
        self.entries.insert(id, entry);
    }

    pub fn remove(&mut self, id: Uuid) -> Option<IndexEntry> {
        let removed = self.entries.remove(&id)?;
        if let Some(path) = removed.path() {
            detach(&mut self.by_path, &path_key(path), id);
        }
        if let Some(parent_path) = removed.parent_path() {
            detach(&mut self.by_parent_path, &path_key(parent_path), id);
        }
        Some(removed)
    }

    pub fn into_entries(self) -> Vec<IndexEntry> {
        let mut entries: Vec<IndexEntry> = self.entries.into_values().collect();
        entries.sort_by(|a, b| a.path().cmp(&b.path()));
        entries
    }

    fn lookup(&self, table: &HashMap<String, Vec<Uuid>>, path: &str) -> Vec<&IndexEntry> {
        let found = table
            .get(&path_key(path))
            .map(|ids| ids.iter().filter_map(|id| self.entries.get(id)).collect())
            .unwrap_or_default();
        sorted_by_path(found)
    }
}

fn path_key(path: &str) -> String {
    path.trim_end_matches('/').to_lowercase()
}

fn detach(table: &mut HashMap<String, Vec<Uuid>>, key: &str, id: Uuid) {
    if let Some(ids) = table.get_mut(key) {
        ids.retain(|existing| *existing != id);
        if ids.is_empty() {
            table.remove(key);
        }
    }
}

fn sorted_by_path(mut entries: Vec<&IndexEntry>) -> Vec<&IndexEntry> {
    entries.sort_by(|a, b| a.path().cmp(&b.path()).then(a.id().cmp(&b.id())));
    entries
}
