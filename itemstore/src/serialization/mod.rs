// Serialization formatter - the canonical YAML body of an item.
//
// Shared fields are sorted by id, languages by tag and versions by number, so
// the same logical item always produces the same bytes. Parent id, path and
// template id are not written here; they live in the index and are merged
// back with `ItemRecord::add_index_data`.

use crate::config::StoreConfig;
use crate::error::Result;
use crate::filter::{FieldFilter, IncludeAll};
use crate::formatting::FormatterChain;
use crate::record::{Field, FilteredRecord, ItemRecord, Record, Version, VersionData};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SerializedItem {
    #[serde(rename = "ID")]
    id: Uuid,
    database: String,
    name: String,
    #[serde(rename = "BranchID", default, skip_serializing_if = "Option::is_none")]
    branch_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    shared_fields: Vec<SerializedField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    languages: Vec<SerializedLanguage>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SerializedField {
    #[serde(rename = "ID")]
    id: Uuid,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    hint: String,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    field_type: Option<String>,
    value: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SerializedLanguage {
    language: String,
    versions: Vec<SerializedVersion>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SerializedVersion {
    version: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    fields: Vec<SerializedField>,
}

/// Reads and writes item bodies, running every field through the formatter
/// chain and dropping fields the filter excludes.
pub struct SerializationFormatter {
    formatters: FormatterChain,
    filter: Box<dyn FieldFilter>,
}

impl SerializationFormatter {
    pub fn new(formatters: FormatterChain, filter: Box<dyn FieldFilter>) -> Self {
        SerializationFormatter { formatters, filter }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        SerializationFormatter::new(FormatterChain::default(), Box::new(config.field_filter()))
    }

    pub fn filter(&self) -> &dyn FieldFilter {
        self.filter.as_ref()
    }

    pub fn write_serialized_item<W: Write>(&self, record: &dyn Record, mut writer: W) -> Result<()> {
        let filtered = FilteredRecord::new(record, self.filter.as_ref());
        let item = self.to_serialized(&filtered);
        let yaml = serde_yaml::to_string(&item)?;
        writer.write_all(yaml.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Parse an item body. `serialized_item_id` records where it came from.
    pub fn read_serialized_item<R: Read>(
        &self,
        reader: R,
        serialized_item_id: &str,
    ) -> Result<ItemRecord> {
        let item: SerializedItem = serde_yaml::from_reader(reader)?;

        let mut record = ItemRecord::new(item.id, item.database, item.name);
        record.branch_id = item.branch_id;
        record.serialized_item_id = serialized_item_id.to_string();
        record.shared_fields = self.unformat_fields(item.shared_fields);
        for language in item.languages {
            for version in language.versions {
                record.versions.push(Version {
                    language: language.language.clone(),
                    number: version.version,
                    fields: self.unformat_fields(version.fields),
                });
            }
        }
        Ok(record)
    }

    fn to_serialized(&self, record: &dyn Record) -> SerializedItem {
        let mut shared_fields: Vec<SerializedField> =
            record.shared_fields().map(|f| self.format_field(f)).collect();
        shared_fields.sort_by_key(|f| f.id);

        let mut languages: BTreeMap<String, BTreeMap<u32, Vec<SerializedField>>> = BTreeMap::new();
        for version in record.versions() {
            let mut fields: Vec<SerializedField> =
                version.fields().map(|f| self.format_field(f)).collect();
            fields.sort_by_key(|f| f.id);
            languages
                .entry(version.language().to_string())
                .or_default()
                .insert(version.version_number(), fields);
        }

        SerializedItem {
            id: record.id(),
            database: record.database_name().to_string(),
            name: record.name().to_string(),
            branch_id: record.branch_id(),
            shared_fields,
            languages: languages
                .into_iter()
                .map(|(language, versions)| SerializedLanguage {
                    language,
                    versions: versions
                        .into_iter()
                        .map(|(version, fields)| SerializedVersion { version, fields })
                        .collect(),
                })
                .collect(),
        }
    }

    fn format_field(&self, field: &Field) -> SerializedField {
        let (field_type, value) = match self.formatters.find(field) {
            Some(formatter) => (field.field_type.clone(), formatter.format(field)),
            None => (None, field.value.clone()),
        };
        SerializedField {
            id: field.id,
            hint: field.name_hint.clone(),
            field_type,
            value,
        }
    }

    fn unformat_fields(&self, fields: Vec<SerializedField>) -> Vec<Field> {
        fields
            .into_iter()
            .filter_map(|f| {
                let mut field = Field {
                    id: f.id,
                    value: f.value,
                    field_type: f.field_type,
                    name_hint: f.hint,
                };
                if let Some(formatter) = self.formatters.find(&field) {
                    match formatter.unformat(&field.value) {
                        Some(value) => field.value = value,
                        None => {
                            log::debug!("Field {} ({}) has no value", field.id, field.name_hint);
                            return None;
                        }
                    }
                }
                Some(field)
            })
            .collect()
    }
}

impl Default for SerializationFormatter {
    fn default() -> Self {
        SerializationFormatter::new(FormatterChain::default(), Box::new(IncludeAll))
    }
}
