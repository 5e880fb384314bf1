// Document I/O - the YAML front matter that opens every stored item file.
//
//   ---
//   id: ...
//   parent: ...
//   template: ...
//   path: /sitecore/content
//   ---
//   <serialized item body>

use crate::error::{ItemStoreError, Result};
use crate::index::IndexEntry;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use uuid::Uuid;

const DELIMITER: &str = "---";

/// Upper bound on header text read before giving up on a file.
pub const MAX_HEADER_BYTES: usize = 64 * 1024;

// Header text plus both delimiter lines, CRLF included.
const MAX_READ_BYTES: u64 = (MAX_HEADER_BYTES + 2 * (DELIMITER.len() + 2)) as u64;

/// Key order here is the on-disk key order.
#[derive(Debug, Serialize, Deserialize)]
struct FrontMatter {
    id: Uuid,
    parent: Uuid,
    template: Uuid,
    #[serde(default)]
    path: Option<String>,
}

/// Write the front matter block for an item.
pub fn write_header<W: Write>(writer: &mut W, entry: &IndexEntry) -> Result<()> {
    let header = FrontMatter {
        id: entry.id(),
        parent: entry.parent_id(),
        template: entry.template_id(),
        path: entry.path().map(str::to_string),
    };
    let yaml = serde_yaml::to_string(&header)?;
    writeln!(writer, "{DELIMITER}")?;
    writer.write_all(yaml.as_bytes())?;
    writeln!(writer, "{DELIMITER}")?;
    Ok(())
}

/// Read the front matter block, leaving `reader` positioned at the first byte
/// of the body. `source` names the stream in error messages.
pub fn read_header<R: BufRead>(reader: &mut R, source: &str) -> Result<IndexEntry> {
    let error = |reason: &str| ItemStoreError::FrontMatter {
        path: source.to_string(),
        reason: reason.to_string(),
    };

    let mut limited = (&mut *reader).take(MAX_READ_BYTES);
    let mut line = String::new();
    if limited.read_line(&mut line)? == 0 {
        return Err(error("file is empty"));
    }
    if line.trim_end() != DELIMITER {
        return Err(error("missing opening '---'"));
    }

    let mut yaml = String::new();
    loop {
        line.clear();
        let read = limited.read_line(&mut line)?;
        if limited.limit() == 0 && !line.ends_with('\n') {
            return Err(error("header is too large"));
        }
        if read == 0 {
            return Err(error("missing closing '---'"));
        }
        if line.trim_end() == DELIMITER {
            break;
        }
        if yaml.len() + line.len() > MAX_HEADER_BYTES {
            return Err(error("header is too large"));
        }
        yaml.push_str(&line);
    }

    let header: FrontMatter = serde_yaml::from_str(&yaml).map_err(|e| error(&e.to_string()))?;
    Ok(IndexEntry::from_parts(
        header.id,
        header.parent,
        header.template,
        header.path,
    ))
}

/// Open a stored item file and read only its front matter.
pub fn read_file_header(path: &Path) -> Result<IndexEntry> {
    let mut reader = BufReader::new(File::open(path)?);
    read_header(&mut reader, &path.to_string_lossy())
}
