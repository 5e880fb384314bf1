// Index formatters - strategies for persisting and rebuilding the structural
// index of one database.

mod front_matter;
mod line;

pub use front_matter::FrontMatterIndexFormatter;
pub use line::LineIndexFormatter;

use crate::config::{IndexStrategy, StoreConfig};
use crate::error::Result;
use crate::index::Index;
use crate::path_provider::PathProvider;
use std::path::Path;

pub trait IndexFormatter: Send + Sync {
    /// Build the index for `database` under `root`.
    fn read_index(&self, root: &Path, database: &str) -> Result<Index>;

    /// Persist the whole index, replacing whatever was there.
    fn write_index(&self, root: &Path, database: &str, index: &Index) -> Result<()>;
}

/// The formatter matching the configured strategy.
pub fn from_config(config: &StoreConfig) -> Box<dyn IndexFormatter> {
    let paths = PathProvider::from_config(config);
    match config.index_strategy {
        IndexStrategy::Line => Box::new(LineIndexFormatter::new(paths)),
        IndexStrategy::FrontMatter => Box::new(FrontMatterIndexFormatter::new(paths)),
    }
}
