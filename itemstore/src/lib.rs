pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod formatting;
pub mod index;
pub mod index_formatter;
pub mod path_provider;
pub mod record;
pub mod serialization;
pub mod store;

pub use config::{FileExtension, IndexStrategy, StoreConfig};
pub use error::{ItemStoreError, Result};
pub use index::{Index, IndexEntry};
pub use record::{Field, ItemRecord, Record, Version, VersionData};
pub use store::ItemStore;
