use crate::config::{IndexStrategy, StoreConfig};
use crate::document;
use crate::error::{ItemStoreError, Result};
use crate::index::{Index, IndexEntry};
use crate::index_formatter::{self, IndexFormatter};
use crate::path_provider::PathProvider;
use crate::record::{braced_upper, ItemRecord, Record};
use crate::serialization::SerializationFormatter;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// The main entry point: one database under a serialization root.
/// Opening the store builds the structural index; writes keep it current.
pub struct ItemStore {
    config: StoreConfig,
    database: String,
    paths: PathProvider,
    serializer: SerializationFormatter,
    index_formatter: Box<dyn IndexFormatter>,
    index: Index,
}

impl ItemStore {
    /// Open the store for `database`. A database that has never been written
    /// to opens with an empty index.
    pub fn open(config: StoreConfig, database: &str) -> Result<Self> {
        config.validate()?;
        if database.is_empty() || database.contains(['/', '\\']) {
            return Err(ItemStoreError::Config(format!(
                "Invalid database name '{database}'"
            )));
        }

        let paths = PathProvider::from_config(&config);
        let serializer = SerializationFormatter::from_config(&config);
        let index_formatter = index_formatter::from_config(&config);
        let index = index_formatter.read_index(&config.root, database)?;
        log::debug!("Opened {} with {} indexed items", database, index.len());

        Ok(ItemStore {
            config,
            database: database.to_string(),
            paths,
            serializer,
            index_formatter,
            index,
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn storage_path(&self, id: Uuid) -> PathBuf {
        self.paths
            .get_storage_path_for_id(id, &self.database, &self.config.root)
    }

    /// Serialize a record to its file and update the index. Returns the file path.
    pub fn save(&mut self, record: &dyn Record) -> Result<PathBuf> {
        if record.database_name() != self.database {
            return Err(ItemStoreError::Other(format!(
                "Item {} belongs to '{}', not '{}'",
                braced_upper(&record.id()),
                record.database_name(),
                self.database
            )));
        }

        let entry = IndexEntry::load_from(record);
        entry.validate_path()?;
        let path = self
            .paths
            .get_storage_path(&entry, &self.database, &self.config.root);
        let dir = path
            .parent()
            .ok_or_else(|| ItemStoreError::Other(format!("No parent for {}", path.display())))?;
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(&mut tmp);
            document::write_header(&mut writer, &entry)?;
            self.serializer.write_serialized_item(record, &mut writer)?;
            writer.flush()?;
        }
        tmp.persist(&path)?;
        log::debug!("Wrote {}", path.display());

        let previous = self.index.get_by_id(entry.id()).cloned();
        let id = entry.id();
        self.index.upsert(entry);
        if let Err(e) = self.after_index_change() {
            match previous {
                Some(previous) => self.index.upsert(previous),
                None => {
                    self.index.remove(id);
                }
            }
            return Err(e);
        }
        Ok(path)
    }

    /// Load a full record. Structural data comes from the index.
    pub fn load(&self, id: Uuid) -> Result<ItemRecord> {
        let entry = self.index.get_by_id(id).ok_or_else(|| self.not_found(id))?;
        self.load_entry(entry)
    }

    /// Load every item stored at `path` (same-named siblings share a path).
    pub fn load_by_path(&self, path: &str) -> Result<Vec<ItemRecord>> {
        self.index
            .get_by_path(path)
            .into_iter()
            .map(|entry| self.load_entry(entry))
            .collect()
    }

    pub fn children(&self, id: Uuid) -> Vec<&IndexEntry> {
        self.index.children(id)
    }

    pub fn descendants(&self, id: Uuid) -> Vec<&IndexEntry> {
        self.index.descendants(id)
    }

    /// Resolve a file on disk back to its index entry.
    pub fn find_by_physical_path(&self, physical_path: &Path) -> Option<IndexEntry> {
        self.paths
            .find_item_by_physical_path(physical_path, &self.config.root, &self.index)
    }

    /// Delete one item's file and index entry, then prune directories left empty.
    /// Descendants are not touched.
    pub fn remove(&mut self, id: Uuid) -> Result<()> {
        if self.index.get_by_id(id).is_none() {
            return Err(self.not_found(id));
        }

        let path = self.storage_path(id);
        match std::fs::remove_file(&path) {
            Ok(()) => log::debug!("Deleted {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("{} was already gone", path.display());
            }
            Err(e) => return Err(e.into()),
        }

        self.index.remove(id);
        self.after_index_change()?;
        self.prune_orphans()?;
        Ok(())
    }

    /// Throw the in-memory index away and build it again from disk.
    pub fn rebuild_index(&mut self) -> Result<()> {
        self.index = self
            .index_formatter
            .read_index(&self.config.root, &self.database)?;
        log::debug!("Rebuilt index for {}: {} items", self.database, self.index.len());
        Ok(())
    }

    /// Remove empty shard directories. Returns what was removed.
    pub fn prune_orphans(&self) -> Result<Vec<PathBuf>> {
        let mut pruned = Vec::new();
        loop {
            let orphans = self.paths.get_orphans(&self.config.root, &self.database)?;
            if orphans.is_empty() {
                break;
            }
            for orphan in orphans {
                std::fs::remove_dir(&orphan)?;
                log::debug!("Pruned empty directory {}", orphan.display());
                pruned.push(orphan);
            }
        }
        Ok(pruned)
    }

    fn load_entry(&self, entry: &IndexEntry) -> Result<ItemRecord> {
        let path = self.storage_path(entry.id());
        let source = path.to_string_lossy().into_owned();
        let mut reader = BufReader::new(File::open(&path)?);
        document::read_header(&mut reader, &source)?;

        let mut record = self.serializer.read_serialized_item(reader, &source)?;
        record.add_index_data(entry)?;
        Ok(record)
    }

    fn after_index_change(&self) -> Result<()> {
        if self.config.index_strategy == IndexStrategy::Line {
            self.index_formatter
                .write_index(&self.config.root, &self.database, &self.index)?;
        }
        Ok(())
    }

    fn not_found(&self, id: Uuid) -> ItemStoreError {
        ItemStoreError::NotFound {
            database: self.database.clone(),
            id: braced_upper(&id),
        }
    }
}
