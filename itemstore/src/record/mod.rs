// Record model - the capability interface over content items, plus the owned
// representation produced when a serialized item is read back.

pub mod view;

use crate::error::{ItemStoreError, Result};
use crate::index::IndexEntry;
use uuid::Uuid;

pub use view::{FilteredRecord, FilteredVersion, RebasedRecord};

/// Render an id the way it appears in file names and the index: `{UPPER-HYPHENATED}`.
pub fn braced_upper(id: &Uuid) -> String {
    format!("{:X}", id.braced())
}

/// Render an id as 36 uppercase hyphenated hex characters, without braces.
pub fn hyphenated_upper(id: &Uuid) -> String {
    format!("{:X}", id.hyphenated())
}

/// A single field value on an item or version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub id: Uuid,
    pub value: String,
    /// Field type name, e.g. `Multilist` or `Checkbox`. Unset means untyped.
    pub field_type: Option<String>,
    /// Human-readable field name, only used for diagnostics.
    pub name_hint: String,
}

impl Field {
    pub fn new(id: Uuid, value: impl Into<String>) -> Self {
        Field {
            id,
            value: value.into(),
            field_type: None,
            name_hint: String::new(),
        }
    }

    pub fn with_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    pub fn with_hint(mut self, name_hint: impl Into<String>) -> Self {
        self.name_hint = name_hint.into();
        self
    }
}

/// One numbered version of an item in one language.
pub trait VersionData {
    fn language(&self) -> &str;
    fn version_number(&self) -> u32;
    fn fields(&self) -> Box<dyn Iterator<Item = &Field> + '_>;
}

/// Read-only view of a content item as exposed by a record provider.
pub trait Record {
    fn id(&self) -> Uuid;
    fn database_name(&self) -> &str;
    fn parent_id(&self) -> Uuid;
    fn path(&self) -> &str;
    fn name(&self) -> &str;
    fn branch_id(&self) -> Option<Uuid>;
    fn template_id(&self) -> Uuid;
    fn shared_fields(&self) -> Box<dyn Iterator<Item = &Field> + '_>;
    fn versions(&self) -> Box<dyn Iterator<Item = Box<dyn VersionData + '_>> + '_>;
    /// Opaque token identifying where this record was loaded from.
    fn serialized_item_id(&self) -> &str;
}

impl<T: VersionData + ?Sized> VersionData for &T {
    fn language(&self) -> &str {
        (**self).language()
    }

    fn version_number(&self) -> u32 {
        (**self).version_number()
    }

    fn fields(&self) -> Box<dyn Iterator<Item = &Field> + '_> {
        (**self).fields()
    }
}

/// An owned version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub language: String,
    pub number: u32,
    pub fields: Vec<Field>,
}

impl Version {
    pub fn new(language: impl Into<String>, number: u32) -> Self {
        Version {
            language: language.into(),
            number,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

impl VersionData for Version {
    fn language(&self) -> &str {
        &self.language
    }

    fn version_number(&self) -> u32 {
        self.number
    }

    fn fields(&self) -> Box<dyn Iterator<Item = &Field> + '_> {
        Box::new(self.fields.iter())
    }
}

/// An owned item. Built by record providers or by reading a serialized item;
/// in the latter case parent id, path and template id stay empty until
/// [`ItemRecord::add_index_data`] merges them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub id: Uuid,
    pub database_name: String,
    pub parent_id: Uuid,
    pub path: String,
    pub name: String,
    pub branch_id: Option<Uuid>,
    pub template_id: Uuid,
    pub shared_fields: Vec<Field>,
    pub versions: Vec<Version>,
    pub serialized_item_id: String,
}

impl ItemRecord {
    pub fn new(id: Uuid, database_name: impl Into<String>, name: impl Into<String>) -> Self {
        ItemRecord {
            id,
            database_name: database_name.into(),
            parent_id: Uuid::nil(),
            path: String::new(),
            name: name.into(),
            branch_id: None,
            template_id: Uuid::nil(),
            shared_fields: Vec::new(),
            versions: Vec::new(),
            serialized_item_id: String::new(),
        }
    }

    /// Merge structural metadata from the index into this record.
    pub fn add_index_data(&mut self, entry: &IndexEntry) -> Result<()> {
        if entry.id() != self.id {
            return Err(ItemStoreError::Other(format!(
                "Index entry {} does not belong to item {}",
                braced_upper(&entry.id()),
                braced_upper(&self.id)
            )));
        }
        self.parent_id = entry.parent_id();
        self.template_id = entry.template_id();
        if let Some(path) = entry.path() {
            self.path = path.to_string();
        }
        Ok(())
    }
}

impl Record for ItemRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn database_name(&self) -> &str {
        &self.database_name
    }

    fn parent_id(&self) -> Uuid {
        self.parent_id
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn branch_id(&self) -> Option<Uuid> {
        self.branch_id
    }

    fn template_id(&self) -> Uuid {
        self.template_id
    }

    fn shared_fields(&self) -> Box<dyn Iterator<Item = &Field> + '_> {
        Box::new(self.shared_fields.iter())
    }

    fn versions(&self) -> Box<dyn Iterator<Item = Box<dyn VersionData + '_>> + '_> {
        Box::new(
            self.versions
                .iter()
                .map(|v| Box::new(v) as Box<dyn VersionData + '_>),
        )
    }

    fn serialized_item_id(&self) -> &str {
        &self.serialized_item_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_rendering() {
        let id = Uuid::parse_str("0de95ae4-41ab-4d01-9eb0-67441b7c2450").unwrap();
        assert_eq!(braced_upper(&id), "{0DE95AE4-41AB-4D01-9EB0-67441B7C2450}");
        assert_eq!(hyphenated_upper(&id), "0DE95AE4-41AB-4D01-9EB0-67441B7C2450");
    }

    #[test]
    fn test_add_index_data() {
        let id = Uuid::from_u128(1);
        let mut record = ItemRecord::new(id, "master", "home");
        let entry = IndexEntry::new(id, Uuid::from_u128(2), Uuid::from_u128(3), "/sitecore/home");

        record.add_index_data(&entry).unwrap();
        assert_eq!(record.parent_id, Uuid::from_u128(2));
        assert_eq!(record.template_id, Uuid::from_u128(3));
        assert_eq!(record.path, "/sitecore/home");
    }

    #[test]
    fn test_add_index_data_rejects_other_item() {
        let mut record = ItemRecord::new(Uuid::from_u128(1), "master", "home");
        let entry = IndexEntry::new(Uuid::from_u128(9), Uuid::nil(), Uuid::nil(), "/x");
        assert!(record.add_index_data(&entry).is_err());
    }
}
