use super::IndexFormatter;
use crate::document::read_file_header;
use crate::error::{ItemStoreError, Result};
use crate::index::{Index, IndexEntry};
use crate::path_provider::PathProvider;
use rayon::prelude::*;
use std::path::Path;

/// Builds the index by reading the front matter of every stored item file.
/// There is no index file, so writing one is refused.
pub struct FrontMatterIndexFormatter {
    paths: PathProvider,
}

impl FrontMatterIndexFormatter {
    pub fn new(paths: PathProvider) -> Self {
        FrontMatterIndexFormatter { paths }
    }
}

impl IndexFormatter for FrontMatterIndexFormatter {
    fn read_index(&self, root: &Path, database: &str) -> Result<Index> {
        let files = self.paths.get_all_stored_paths(root, database)?;

        let entries: Vec<IndexEntry> = files
            .par_iter()
            .filter_map(|path| match read_file_header(path) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping {}: {e}", path.display());
                    None
                }
            })
            .collect();

        log::debug!(
            "Scanned {} of {} item files in {}",
            entries.len(),
            files.len(),
            database
        );
        Ok(Index::new(entries))
    }

    fn write_index(&self, _root: &Path, database: &str, _index: &Index) -> Result<()> {
        Err(ItemStoreError::Unsupported(format!(
            "the front matter index for '{database}' is stored in the item files and cannot be written separately"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileExtension;
    use crate::document::write_header;
    use uuid::Uuid;
    use tempfile::TempDir;

    fn formatter() -> FrontMatterIndexFormatter {
        FrontMatterIndexFormatter::new(PathProvider::new(FileExtension::default(), "index.txt"))
    }

    fn store_header(root: &Path, entry: &IndexEntry) {
        let path = PathProvider::new(FileExtension::default(), "index.txt")
            .get_storage_path(entry, "master", root);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut out = Vec::new();
        write_header(&mut out, entry).unwrap();
        out.extend_from_slice(b"ID: body is not read\n");
        std::fs::write(path, out).unwrap();
    }

    #[test]
    fn test_scan_builds_index() {
        let tmp = TempDir::new().unwrap();
        let entries: Vec<IndexEntry> = (1..=40u128)
            .map(|n| {
                IndexEntry::new(
                    Uuid::from_u128(n << 124 | n),
                    Uuid::nil(),
                    Uuid::from_u128(7),
                    format!("/sitecore/item{n}"),
                )
            })
            .collect();
        for entry in &entries {
            store_header(tmp.path(), entry);
        }

        let index = formatter().read_index(tmp.path(), "master").unwrap();
        assert_eq!(index.len(), entries.len());
        for entry in &entries {
            assert_eq!(index.get_by_id(entry.id()), Some(entry));
        }
    }

    #[test]
    fn test_scan_skips_broken_files() {
        let tmp = TempDir::new().unwrap();
        let good = IndexEntry::new(Uuid::from_u128(1), Uuid::nil(), Uuid::nil(), "/good");
        store_header(tmp.path(), &good);

        let broken = tmp.path().join("master/0/{00000000-0000-0000-0000-000000000002}.yml");
        std::fs::write(&broken, "---\nid: 00000000-0000-0000-0000-0000000").unwrap();

        let index = formatter().read_index(tmp.path(), "master").unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.get_by_id(Uuid::from_u128(1)).is_some());
    }

    #[test]
    fn test_missing_database_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(formatter().read_index(tmp.path(), "master").unwrap().is_empty());
    }

    #[test]
    fn test_write_is_refused() {
        let tmp = TempDir::new().unwrap();
        let err = formatter()
            .write_index(tmp.path(), "master", &Index::default())
            .unwrap_err();
        assert!(matches!(err, ItemStoreError::Unsupported(_)));
    }
}
