pub mod input;
pub mod output;

use anyhow::Result;
use obesity_classifiers::inference::{assess_patient, shared_pipeline};
use obesity_classifiers::ModelPipeline;
use serde_json::json;
use std::path::Path;

use input::{load_record, load_records, RecordInput};

/// Predict one JSON record. Fully typed patient records also get the BMI and
/// risk read-out.
pub fn predict_record<P: AsRef<Path>>(pipeline: &ModelPipeline, record_path: P) -> Result<serde_json::Value> {
    let value = match load_record(record_path)? {
        RecordInput::Patient(patient) => serde_json::to_value(assess_patient(pipeline, &patient)?)?,
        raw @ RecordInput::Raw(_) => json!({ "prediction": pipeline.predict(&raw.record())? }),
    };
    Ok(value)
}

/// Predict every row of a CSV/TSV file and write the labelled rows.
pub fn predict_file<P: AsRef<Path>, Q: AsRef<Path>>(
    pipeline: &ModelPipeline,
    data_path: P,
    output_path: Q,
) -> Result<usize> {
    let (headers, records) = load_records(data_path)?;
    let predictions = records
        .iter()
        .map(|r| pipeline.predict(r))
        .collect::<obesity_classifiers::Result<Vec<_>>>()?;
    output::write_predictions(&headers, &records, &predictions, &output_path)?;
    log::info!(
        "Wrote {} predictions to {}",
        predictions.len(),
        output_path.as_ref().display()
    );
    Ok(predictions.len())
}

pub fn load_pipeline<P: AsRef<Path>>(artifact: P) -> Result<&'static ModelPipeline> {
    Ok(shared_pipeline(artifact)?)
}
