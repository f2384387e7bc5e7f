//! Online inference: one process-wide pipeline, loaded on first use.
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::data_handling::Record;
use crate::error::Result;
use crate::patient::{BmiBand, ObesityLevel, PatientRecord, RiskLevel};
use crate::pipeline::{ModelPipeline, Prediction};

static PIPELINE: OnceCell<ModelPipeline> = OnceCell::new();

/// Pipeline shared by every caller of this process.
///
/// The artifact at `path` is read on the first call only; later calls return
/// the cached pipeline whatever path they pass. Concurrent first calls block
/// on a single load. A failed load is not cached, so the next call retries.
pub fn shared_pipeline<P: AsRef<Path>>(path: P) -> Result<&'static ModelPipeline> {
    PIPELINE.get_or_try_init(|| {
        let loaded = ModelPipeline::load(path.as_ref())?;
        log::info!(
            "Model loaded: {} ({} classes)",
            loaded.model_name,
            loaded.classes.len()
        );
        Ok(loaded)
    })
}

/// Predict the label of a raw record with the shared pipeline.
pub fn predict<P: AsRef<Path>>(artifact: P, record: &Record) -> Result<Prediction> {
    shared_pipeline(artifact)?.predict(record)
}

/// Prediction plus the clinical read-out for one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientAssessment {
    pub prediction: Prediction,
    pub bmi: f64,
    pub bmi_band: BmiBand,
    pub risk: RiskLevel,
    pub recommendations: Vec<String>,
}

/// Risk tier of a predicted label; labels outside the known set fall back to
/// a substring match on "Obesity" / "Overweight".
pub fn risk_for_label(label: &str) -> RiskLevel {
    match label.parse::<ObesityLevel>() {
        Ok(level) => level.risk(),
        Err(_) if label.contains("Obesity") => RiskLevel::High,
        Err(_) if label.contains("Overweight") => RiskLevel::Moderate,
        Err(_) => RiskLevel::Low,
    }
}

pub fn assess_patient(pipeline: &ModelPipeline, patient: &PatientRecord) -> Result<PatientAssessment> {
    let prediction = pipeline.predict(&patient.to_record())?;
    let bmi = patient.bmi();
    let risk = risk_for_label(&prediction.label);
    log::debug!(
        "Patient BMI {:.1} predicted as {} ({} risk)",
        bmi,
        prediction.label,
        risk
    );
    Ok(PatientAssessment {
        bmi,
        bmi_band: BmiBand::from_bmi(bmi),
        risk,
        recommendations: risk.recommendations().iter().map(|s| s.to_string()).collect(),
        prediction,
    })
}
