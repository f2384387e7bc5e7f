//! CSV / TSV dataset reader.
use std::path::Path;

use csv::StringRecord;

use crate::data_handling::Table;
use crate::error::{PipelineError, Result};

/// Configuration for reading delimited dataset files.
#[derive(Debug, Clone)]
pub struct TableReaderConfig {
    /// Field delimiter. When `None`, `.tsv` files use a tab and everything
    /// else a comma.
    pub delimiter: Option<u8>,
    /// Trim surrounding whitespace from headers and cells.
    pub trim: bool,
}

impl Default for TableReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            trim: true,
        }
    }
}

/// Read a CSV/TSV dataset with trimmed headers and cells.
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    load_table_with_config(path, &TableReaderConfig::default())
}

/// Read a CSV/TSV dataset using a custom configuration.
pub fn load_table_with_config<P: AsRef<Path>>(path: P, config: &TableReaderConfig) -> Result<Table> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PipelineError::DatasetNotFound(path.to_path_buf()));
    }

    let delimiter = config.delimiter.unwrap_or_else(|| delimiter_for(path));
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)?;

    let headers = clean(reader.headers()?, config.trim);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(clean(&record, config.trim));
    }

    log::info!(
        "Loaded dataset {} with {} rows and {} columns",
        path.display(),
        rows.len(),
        headers.len()
    );

    Ok(Table::new(headers, rows))
}

fn delimiter_for(path: &Path) -> u8 {
    let is_tsv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tsv"))
        .unwrap_or(false);
    if is_tsv {
        b'\t'
    } else {
        b','
    }
}

fn clean(record: &StringRecord, trim: bool) -> Vec<String> {
    record
        .iter()
        .map(|cell| if trim { cell.trim().to_string() } else { cell.to_string() })
        .collect()
}
