// Line-oriented index file. One block per item, sorted by path:
//
//   -- Item --
//   0DE95AE4-41AB-4D01-9EB0-67441B7C2450
//   /sitecore/content/Home
//   TPL {76036F5E-CBCE-46D1-AF0A-4143F9B557AA}
//   PID {0DE95AE4-41AB-4D01-9EB0-67441B7C2450}

use super::IndexFormatter;
use crate::error::{ItemStoreError, Result};
use crate::index::{Index, IndexEntry};
use crate::path_provider::PathProvider;
use crate::record::{braced_upper, hyphenated_upper};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

const ITEM_DELIMITER: &str = "-- Item --";
const TAG_LENGTH: usize = 3;
const ID_LENGTH: usize = 36;

pub struct LineIndexFormatter {
    paths: PathProvider,
}

impl LineIndexFormatter {
    pub fn new(paths: PathProvider) -> Self {
        LineIndexFormatter { paths }
    }

    /// Parse index blocks. Tags, not positions, decide what a line means; a
    /// block starts at a delimiter or at the first line of the stream.
    pub fn read_entries<R: BufRead>(reader: R) -> Result<Vec<IndexEntry>> {
        let mut entries = Vec::new();
        let mut current: Option<PartialEntry> = None;

        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line?;
            // Only leading whitespace is insignificant; a path keeps its tail.
            let line = line.trim_start();
            if line.is_empty() {
                continue;
            }

            if line.trim_end() == ITEM_DELIMITER {
                if let Some(done) = current.take() {
                    entries.push(done.finish()?);
                }
                current = Some(PartialEntry::starting_at(line_no));
                continue;
            }

            let entry = current.get_or_insert_with(|| PartialEntry::starting_at(line_no));
            if line.starts_with('/') {
                entry.path = Some(line.to_string());
                continue;
            }

            let line = line.trim_end();
            if line.starts_with('T') {
                entry.template_id = Some(parse_tagged_id(line, line_no)?);
            } else if line.starts_with('P') {
                entry.parent_id = Some(parse_tagged_id(line, line_no)?);
            } else if line.len() == ID_LENGTH {
                entry.id = Some(parse_id(line, line_no)?);
            } else {
                return Err(ItemStoreError::IndexParse {
                    line: line_no,
                    reason: format!("unrecognized line '{line}'"),
                });
            }
        }

        if let Some(done) = current {
            entries.push(done.finish()?);
        }
        Ok(entries)
    }

    pub fn write_entries<W: Write>(mut writer: W, entries: &[&IndexEntry]) -> Result<()> {
        let mut sorted = entries.to_vec();
        sorted.sort_by(|a, b| a.path().cmp(&b.path()));

        for entry in sorted {
            entry.validate_path()?;
            writeln!(writer, "{ITEM_DELIMITER}")?;
            writeln!(writer, "{}", hyphenated_upper(&entry.id()))?;
            if let Some(path) = entry.path() {
                writeln!(writer, "{path}")?;
            }
            writeln!(writer, "TPL {}", braced_upper(&entry.template_id()))?;
            writeln!(writer, "PID {}", braced_upper(&entry.parent_id()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl IndexFormatter for LineIndexFormatter {
    fn read_index(&self, root: &Path, database: &str) -> Result<Index> {
        let path = self.paths.get_index_storage_path(database, root);
        if !path.is_file() {
            log::debug!("No index file at {}; starting empty", path.display());
            return Ok(Index::default());
        }
        let entries = Self::read_entries(BufReader::new(File::open(&path)?))?;
        log::debug!("Read {} index entries from {}", entries.len(), path.display());
        Ok(Index::new(entries))
    }

    fn write_index(&self, root: &Path, database: &str, index: &Index) -> Result<()> {
        let path = self.paths.get_index_storage_path(database, root);
        let dir = root.join(database);
        std::fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        Self::write_entries(BufWriter::new(&mut tmp), &index.entries())?;
        tmp.persist(&path)?;
        log::debug!("Wrote {} index entries to {}", index.len(), path.display());
        Ok(())
    }
}

struct PartialEntry {
    started_at: usize,
    id: Option<Uuid>,
    parent_id: Option<Uuid>,
    template_id: Option<Uuid>,
    path: Option<String>,
}

impl PartialEntry {
    fn starting_at(line: usize) -> Self {
        PartialEntry {
            started_at: line,
            id: None,
            parent_id: None,
            template_id: None,
            path: None,
        }
    }

    fn finish(self) -> Result<IndexEntry> {
        let id = self.id.ok_or_else(|| ItemStoreError::IndexParse {
            line: self.started_at,
            reason: "entry has no id".into(),
        })?;
        Ok(IndexEntry::from_parts(
            id,
            self.parent_id.unwrap_or_else(Uuid::nil),
            self.template_id.unwrap_or_else(Uuid::nil),
            self.path,
        ))
    }
}

fn parse_tagged_id(line: &str, line_no: usize) -> Result<Uuid> {
    let value = line.get(TAG_LENGTH..).unwrap_or_default();
    parse_id(value.trim(), line_no)
}

fn parse_id(value: &str, line_no: usize) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| ItemStoreError::IndexParse {
        line: line_no,
        reason: format!("invalid id '{value}': {e}"),
    })
}
