// Maps item ids to sharded file locations:
//   <root>/<database>/<first hex digit of id>/<{ID}><extension>

use crate::config::{FileExtension, StoreConfig};
use crate::error::{ItemStoreError, Result};
use crate::index::{Index, IndexEntry};
use crate::record::{braced_upper, hyphenated_upper};
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PathProvider {
    extension: FileExtension,
    index_file_name: String,
}

impl PathProvider {
    pub fn new(extension: FileExtension, index_file_name: impl Into<String>) -> Self {
        PathProvider {
            extension,
            index_file_name: index_file_name.into(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        PathProvider::new(config.extension.clone(), config.index_file_name.clone())
    }

    pub fn extension(&self) -> &FileExtension {
        &self.extension
    }

    pub fn get_storage_path(&self, entry: &IndexEntry, database: &str, root: &Path) -> PathBuf {
        self.get_storage_path_for_id(entry.id(), database, root)
    }

    pub fn get_storage_path_for_id(&self, id: Uuid, database: &str, root: &Path) -> PathBuf {
        let shard = &hyphenated_upper(&id)[..1];
        root.join(database)
            .join(shard)
            .join(format!("{}{}", braced_upper(&id), self.extension))
    }

    pub fn get_index_storage_path(&self, database: &str, root: &Path) -> PathBuf {
        root.join(database).join(&self.index_file_name)
    }

    /// Every stored item file for a database. A database directory that does
    /// not exist yet simply has no files.
    pub fn get_all_stored_paths(&self, root: &Path, database: &str) -> Result<Vec<PathBuf>> {
        let base_dir = root.join(database);
        if !base_dir.is_dir() {
            return Ok(Vec::new());
        }

        let pattern = format!(
            "{}/**/*{}",
            glob::Pattern::escape(&base_dir.to_string_lossy()),
            self.extension
        );
        let index_path = self.get_index_storage_path(database, root);
        let mut files: Vec<PathBuf> = glob::glob(&pattern)?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file() && *p != index_path)
            .collect();
        files.sort();
        Ok(files)
    }

    /// Directories under the database directory that contain nothing at all.
    /// Non-empty directories are searched further, so an empty subdirectory
    /// of a populated shard is reported on its own.
    pub fn get_orphans(&self, root: &Path, database: &str) -> Result<Vec<PathBuf>> {
        let base_dir = root.join(database);
        let mut orphans = Vec::new();
        if base_dir.is_dir() {
            collect_empty_dirs(&base_dir, &mut orphans)?;
        }
        orphans.sort();
        Ok(orphans)
    }

    pub fn get_database_name_from_path(&self, physical_path: &Path, root: &Path) -> Result<String> {
        let relative =
            physical_path
                .strip_prefix(root)
                .map_err(|_| ItemStoreError::PathOutsideRoot {
                    path: physical_path.to_path_buf(),
                    root: root.to_path_buf(),
                })?;

        match relative.components().next() {
            Some(Component::Normal(name)) => Ok(name.to_string_lossy().into_owned()),
            _ => Err(ItemStoreError::Other(format!(
                "No database segment in {}",
                physical_path.display()
            ))),
        }
    }

    pub fn get_all_stored_database_names(&self, root: &Path) -> Result<Vec<String>> {
        if !root.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Resolve a stored file back to its index entry via the id in its file name.
    pub fn find_item_by_physical_path(
        &self,
        physical_path: &Path,
        root: &Path,
        index: &Index,
    ) -> Option<IndexEntry> {
        if !physical_path.starts_with(root) {
            log::debug!("{} is outside {}", physical_path.display(), root.display());
            return None;
        }
        let stem = physical_path.file_stem()?.to_str()?;
        let id = Uuid::parse_str(stem).ok()?;
        index.get_by_id(id).cloned()
    }
}

fn collect_empty_dirs(dir: &Path, orphans: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let path = entry.path();
        if std::fs::read_dir(&path)?.next().is_none() {
            orphans.push(path);
        } else {
            collect_empty_dirs(&path, orphans)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ID: &str = "{0DE95AE4-41AB-4D01-9EB0-67441B7C2450}";

    fn provider() -> PathProvider {
        PathProvider::new(FileExtension::new(".json").unwrap(), "index.txt")
    }

    #[test]
    fn test_storage_path() {
        let id = Uuid::parse_str(ID).unwrap();
        let entry = IndexEntry::new(id, Uuid::nil(), Uuid::nil(), "/sitecore");
        let path = provider().get_storage_path(&entry, "master", Path::new("/r"));

        assert_eq!(
            path,
            Path::new("/r").join("master").join("0").join(format!("{ID}.json"))
        );
    }

    #[test]
    fn test_shard_is_uppercase() {
        let id = Uuid::parse_str("fa3b0f9c-0000-0000-0000-000000000000").unwrap();
        let path = provider().get_storage_path_for_id(id, "web", Path::new("/r"));
        assert_eq!(path.parent().unwrap().file_name().unwrap(), "F");
        assert_eq!(
            path.file_name().unwrap(),
            "{FA3B0F9C-0000-0000-0000-000000000000}.json"
        );
    }

    #[test]
    fn test_index_storage_path() {
        let path = provider().get_index_storage_path("master", Path::new("/r"));
        assert_eq!(path, Path::new("/r/master/index.txt"));
    }

    #[test]
    fn test_all_stored_paths() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("master");
        std::fs::create_dir_all(base.join("0")).unwrap();
        std::fs::create_dir_all(base.join("A/nested")).unwrap();
        std::fs::write(base.join("0").join(format!("{ID}.json")), "x").unwrap();
        std::fs::write(base.join("A/nested/other.json"), "x").unwrap();
        std::fs::write(base.join("A/skip.yml"), "x").unwrap();
        std::fs::write(base.join("index.txt"), "x").unwrap();

        let paths = provider().get_all_stored_paths(tmp.path(), "master").unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.extension().unwrap() == "json"));
    }

    #[test]
    fn test_all_stored_paths_missing_database() {
        let tmp = TempDir::new().unwrap();
        let paths = provider().get_all_stored_paths(tmp.path(), "nothing").unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_orphans() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("master");
        // Shard with nothing in it
        std::fs::create_dir_all(base.join("1")).unwrap();
        // Populated shard holding one empty subdirectory
        std::fs::create_dir_all(base.join("2/empty")).unwrap();
        std::fs::write(base.join("2/item.json"), "x").unwrap();
        // Populated shard
        std::fs::create_dir_all(base.join("3")).unwrap();
        std::fs::write(base.join("3/item.json"), "x").unwrap();

        let orphans = provider().get_orphans(tmp.path(), "master").unwrap();
        assert_eq!(orphans, vec![base.join("1"), base.join("2").join("empty")]);
    }

    #[test]
    fn test_orphans_missing_database() {
        let tmp = TempDir::new().unwrap();
        assert!(provider().get_orphans(tmp.path(), "master").unwrap().is_empty());
    }

    #[test]
    fn test_database_name_from_path() {
        let root = Path::new("/r");
        let name = provider()
            .get_database_name_from_path(Path::new("/r/master/0/x.json"), root)
            .unwrap();
        assert_eq!(name, "master");

        let err = provider()
            .get_database_name_from_path(Path::new("/elsewhere/master/x.json"), root)
            .unwrap_err();
        assert!(matches!(err, ItemStoreError::PathOutsideRoot { .. }));
    }

    #[test]
    fn test_all_stored_database_names() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("web")).unwrap();
        std::fs::create_dir_all(tmp.path().join("master")).unwrap();
        std::fs::write(tmp.path().join("readme.txt"), "x").unwrap();

        let names = provider().get_all_stored_database_names(tmp.path()).unwrap();
        assert_eq!(names, vec!["master".to_string(), "web".to_string()]);
    }

    #[test]
    fn test_find_item_by_physical_path() {
        let id = Uuid::parse_str(ID).unwrap();
        let index = Index::new(vec![IndexEntry::new(id, Uuid::nil(), Uuid::nil(), "/sitecore")]);
        let root = Path::new("/r");
        let p = provider();

        let found = p.find_item_by_physical_path(
            &Path::new("/r/master/0").join(format!("{ID}.json")),
            root,
            &index,
        );
        assert_eq!(found.unwrap().id(), id);

        let not_guid = p.find_item_by_physical_path(Path::new("/r/master/0/home.json"), root, &index);
        assert!(not_guid.is_none());
    }
}
