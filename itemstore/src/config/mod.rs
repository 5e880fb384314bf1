use crate::error::{ItemStoreError, Result};
use crate::filter::ConfigurationFieldFilter;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const EXTENSION_PATTERN: &str = r"^\.[A-Za-z0-9]+$";

/// Settings shared by the path provider, the serialization formatter and the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory that holds one subdirectory per database.
    pub root: PathBuf,
    #[serde(default)]
    pub extension: FileExtension,
    #[serde(default = "default_index_file_name")]
    pub index_file_name: String,
    #[serde(default)]
    pub index_strategy: IndexStrategy,
    /// Fields that never reach storage.
    #[serde(default)]
    pub excluded_fields: Vec<Uuid>,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StoreConfig {
            root: root.into(),
            extension: FileExtension::default(),
            index_file_name: default_index_file_name(),
            index_strategy: IndexStrategy::default(),
            excluded_fields: Vec::new(),
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Result<Self> {
        self.extension = FileExtension::new(extension)?;
        Ok(self)
    }

    pub fn with_index_strategy(mut self, strategy: IndexStrategy) -> Self {
        self.index_strategy = strategy;
        self
    }

    pub fn with_excluded_fields<I: IntoIterator<Item = Uuid>>(mut self, fields: I) -> Self {
        self.excluded_fields = fields.into_iter().collect();
        self
    }

    pub fn field_filter(&self) -> ConfigurationFieldFilter {
        ConfigurationFieldFilter::new(self.excluded_fields.iter().copied())
    }

    /// Check settings that serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        let name = self.index_file_name.trim();
        if name.is_empty() {
            return Err(ItemStoreError::Config("index_file_name must not be empty".into()));
        }
        if name.contains(['/', '\\']) {
            return Err(ItemStoreError::Config(format!(
                "index_file_name '{name}' must be a bare file name"
            )));
        }
        Ok(())
    }
}

fn default_index_file_name() -> String {
    "index.txt".to_string()
}

/// How the structural index of a database is persisted and rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStrategy {
    /// A dedicated line-oriented index file per database.
    Line,
    /// No index file; the index is rebuilt from each item file's front matter.
    #[default]
    FrontMatter,
}

/// A validated file extension such as `.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileExtension(String);

impl FileExtension {
    pub fn new(extension: &str) -> Result<Self> {
        let pattern = Regex::new(EXTENSION_PATTERN)
            .map_err(|e| ItemStoreError::Other(format!("Regex error: {e}")))?;
        if !pattern.is_match(extension) {
            return Err(ItemStoreError::InvalidExtension {
                extension: extension.to_string(),
            });
        }
        Ok(FileExtension(extension.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The extension without its leading dot.
    pub fn bare(&self) -> &str {
        &self.0[1..]
    }
}

impl Default for FileExtension {
    fn default() -> Self {
        FileExtension(".yml".to_string())
    }
}

impl TryFrom<String> for FileExtension {
    type Error = ItemStoreError;

    fn try_from(value: String) -> Result<Self> {
        FileExtension::new(&value)
    }
}

impl From<FileExtension> for String {
    fn from(value: FileExtension) -> Self {
        value.0
    }
}

impl fmt::Display for FileExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Load a configuration file; `.json` files are read as JSON, anything else as YAML.
pub fn parse_config(path: &Path) -> Result<StoreConfig> {
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_config_json_str(&content),
        _ => parse_config_str(&content),
    }
}

/// Parse a YAML configuration string.
pub fn parse_config_str(content: &str) -> Result<StoreConfig> {
    let config: StoreConfig = serde_yaml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Parse a JSON configuration string.
pub fn parse_config_json_str(content: &str) -> Result<StoreConfig> {
    let config: StoreConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}
