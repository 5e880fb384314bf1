use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ItemStoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid file extension '{extension}': expected '.' followed by one or more letters or digits")]
    InvalidExtension { extension: String },

    #[error("Path {path} is not under root {root}")]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Invalid item path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Index parse error on line {line}: {reason}")]
    IndexParse { line: usize, reason: String },

    #[error("Front matter error in {path}: {reason}")]
    FrontMatter { path: String, reason: String },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Item not found: {database}/{id}")]
    NotFound { database: String, id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob error: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Failed to replace file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ItemStoreError>;
