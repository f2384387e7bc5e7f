//! Readers and writers for datasets, artifacts and metrics documents.
pub mod table;
pub mod json;

pub use json::{read_json, write_json};
pub use table::{load_table, load_table_with_config, TableReaderConfig};
