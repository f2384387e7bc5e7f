use anyhow::{Context, Result};
use obesity_classifiers::data_handling::{FieldValue, Record};
use obesity_classifiers::io::load_table;
use obesity_classifiers::patient::PatientRecord;
use std::fs;
use std::path::Path;

/// A single request read from a JSON file.
#[derive(Debug, Clone)]
pub enum RecordInput {
    /// Every field parsed into its typed form, eligible for the risk read-out.
    Patient(PatientRecord),
    /// Free-form field map, passed to the pipeline as is.
    Raw(Record),
}

impl RecordInput {
    pub fn record(&self) -> Record {
        match self {
            RecordInput::Patient(p) => p.to_record(),
            RecordInput::Raw(r) => r.clone(),
        }
    }
}

pub fn load_record<P: AsRef<Path>>(path: P) -> Result<RecordInput> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read record file: {:?}", path.as_ref()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse record: {}", path.as_ref().display()))?;

    if let Ok(patient) = serde_json::from_value::<PatientRecord>(value.clone()) {
        return Ok(RecordInput::Patient(patient));
    }
    let record: Record = serde_json::from_value(value)
        .with_context(|| format!("Record must be a JSON object: {}", path.as_ref().display()))?;
    Ok(RecordInput::Raw(record))
}

/// Rows of a CSV/TSV file as raw records, keyed by header.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<(Vec<String>, Vec<Record>)> {
    let table = load_table(path.as_ref())?;
    let records = table
        .rows
        .iter()
        .map(|row| {
            table
                .headers
                .iter()
                .cloned()
                .zip(row.iter().map(|cell| FieldValue::Text(cell.clone())))
                .collect::<Record>()
        })
        .collect();
    Ok((table.headers, records))
}
