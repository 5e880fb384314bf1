use crate::error::{ItemStoreError, Result};
use crate::record::Record;
use uuid::Uuid;

const SEPARATOR: char = '/';

/// Structural metadata for one item: enough to place it in the tree without
/// reading its serialized body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    id: Uuid,
    parent_id: Uuid,
    template_id: Uuid,
    path: Option<String>,
}

impl IndexEntry {
    pub fn new(id: Uuid, parent_id: Uuid, template_id: Uuid, path: impl Into<String>) -> Self {
        IndexEntry {
            id,
            parent_id,
            template_id,
            path: Some(path.into()),
        }
    }

    pub(crate) fn from_parts(
        id: Uuid,
        parent_id: Uuid,
        template_id: Uuid,
        path: Option<String>,
    ) -> Self {
        IndexEntry {
            id,
            parent_id,
            template_id,
            path,
        }
    }

    /// Snapshot the structural fields of a record.
    pub fn load_from(record: &dyn Record) -> Self {
        IndexEntry::new(
            record.id(),
            record.parent_id(),
            record.template_id(),
            record.path(),
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn parent_id(&self) -> Uuid {
        self.parent_id
    }

    pub fn template_id(&self) -> Uuid {
        self.template_id
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Last segment of the path, ignoring trailing separators.
    pub fn name(&self) -> Option<&str> {
        let trimmed = self.path.as_deref()?.trim_end_matches(SEPARATOR);
        match trimmed.rfind(SEPARATOR) {
            Some(pos) => Some(&trimmed[pos + 1..]),
            None => Some(trimmed),
        }
    }

    /// The path with the trailing `/name` removed.
    pub fn parent_path(&self) -> Option<&str> {
        let name = self.name()?;
        let trimmed = self.path.as_deref()?.trim_end_matches(SEPARATOR);
        let without_name = &trimmed[..trimmed.len() - name.len()];
        Some(without_name.strip_suffix(SEPARATOR).unwrap_or(without_name))
    }

    /// A stored path is rooted at `/` and fits on one line.
    pub fn validate_path(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let reason = if !path.starts_with(SEPARATOR) {
            "must start with '/'"
        } else if path.contains(['\r', '\n']) {
            "must not contain line breaks"
        } else {
            return Ok(());
        };
        Err(ItemStoreError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        })
    }

    pub fn with_path(&self, path: impl Into<String>) -> Self {
        IndexEntry {
            path: Some(path.into()),
            ..self.clone()
        }
    }

    pub fn with_parent_id(&self, parent_id: Uuid) -> Self {
        IndexEntry {
            parent_id,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> IndexEntry {
        IndexEntry::new(Uuid::from_u128(1), Uuid::nil(), Uuid::nil(), path)
    }

    #[test]
    fn test_name_with_spaces() {
        let e = entry("/sitecore/content folder");
        assert_eq!(e.name(), Some("content folder"));
        assert_eq!(e.parent_path(), Some("/sitecore"));
    }

    #[test]
    fn test_trailing_separator_ignored() {
        let plain = entry("/a/b");
        let trailing = entry("/a/b/");
        assert_eq!(plain.name(), Some("b"));
        assert_eq!(trailing.name(), plain.name());
        assert_eq!(trailing.parent_path(), plain.parent_path());
        assert_eq!(plain.parent_path(), Some("/a"));
    }

    #[test]
    fn test_root_level_item() {
        let e = entry("/sitecore");
        assert_eq!(e.name(), Some("sitecore"));
        assert_eq!(e.parent_path(), Some(""));
    }

    #[test]
    fn test_path_without_separator() {
        let e = entry("orphan");
        assert_eq!(e.name(), Some("orphan"));
        assert_eq!(e.parent_path(), Some(""));
    }

    #[test]
    fn test_missing_path() {
        let e = IndexEntry::from_parts(Uuid::from_u128(1), Uuid::nil(), Uuid::nil(), None);
        assert_eq!(e.name(), None);
        assert_eq!(e.parent_path(), None);
    }

    #[test]
    fn test_validate_path() {
        assert!(entry("/sitecore/content ").validate_path().is_ok());
        assert!(IndexEntry::from_parts(Uuid::from_u128(1), Uuid::nil(), Uuid::nil(), None)
            .validate_path()
            .is_ok());
        for bad in ["sitecore/content", "", "/a\nb"] {
            let err = entry(bad).validate_path().unwrap_err();
            assert!(matches!(err, ItemStoreError::InvalidPath { .. }), "{bad:?}");
        }
    }

    #[test]
    fn test_copy_then_modify() {
        let original = entry("/a/b");
        let moved = original.with_path("/c/b").with_parent_id(Uuid::from_u128(7));
        assert_eq!(original.path(), Some("/a/b"));
        assert_eq!(moved.path(), Some("/c/b"));
        assert_eq!(moved.parent_id(), Uuid::from_u128(7));
        assert_eq!(moved.id(), original.id());
    }
}
