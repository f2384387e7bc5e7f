use anyhow::{Context, Result};
use obesity_classifiers::data_handling::Record;
use obesity_classifiers::Prediction;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write the input columns plus the predicted label and its probability,
/// as CSV or TSV depending on the file extension.
pub fn write_predictions<P: AsRef<Path>>(
    headers: &[String],
    records: &[Record],
    predictions: &[Prediction],
    output_path: P,
) -> Result<()> {
    let path = output_path.as_ref();
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("csv");
    let delimiter = match extension {
        "tsv" => '\t',
        _ => ',',
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .from_writer(BufWriter::new(file));

    let mut header_row: Vec<&str> = headers.iter().map(String::as_str).collect();
    header_row.push("predicted_label");
    header_row.push("probability");
    writer.write_record(&header_row)?;

    for (record, prediction) in records.iter().zip(predictions) {
        let mut row: Vec<String> = headers
            .iter()
            .map(|h| record.get(h).map(|v| v.as_category()).unwrap_or_default())
            .collect();
        let probability = prediction
            .probabilities
            .as_ref()
            .and_then(|p| p.get(&prediction.label))
            .map_or(String::new(), |p| format!("{:.4}", p));
        row.push(prediction.label.clone());
        row.push(probability);
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}
