//! The persisted (preprocessing + classifier) unit.
use std::collections::BTreeMap;
use std::path::Path;

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::data_handling::{FeatureSchema, Record};
use crate::error::{PipelineError, Result};
use crate::io::{read_json, write_json};
use crate::models::{Classifier, ClassifierModel};
use crate::preprocessing::Preprocessor;

/// Bumped whenever the serialized layout changes.
pub const ARTIFACT_VERSION: u32 = 1;

/// Outcome of a single-record prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    /// Probability of every known label, present when the classifier
    /// supports probability estimates.
    pub probabilities: Option<BTreeMap<String, f64>>,
}

/// Fitted preprocessing and classifier, saved and loaded as one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPipeline {
    pub version: u32,
    pub model_name: String,
    pub schema: FeatureSchema,
    pub classes: Vec<String>,
    pub preprocessor: Preprocessor,
    pub classifier: Classifier,
}

impl ModelPipeline {
    pub fn new(
        model_name: &str,
        schema: FeatureSchema,
        classes: Vec<String>,
        preprocessor: Preprocessor,
        classifier: Classifier,
    ) -> Self {
        ModelPipeline {
            version: ARTIFACT_VERSION,
            model_name: model_name.to_string(),
            schema,
            classes,
            preprocessor,
            classifier,
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_json(&path, self)?;
        log::info!("Model saved to: {}", path.as_ref().display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::ArtifactNotFound(path.to_path_buf()));
        }
        let pipeline: ModelPipeline = read_json(path)?;
        if pipeline.version != ARTIFACT_VERSION {
            return Err(PipelineError::Model(format!(
                "unsupported artifact version {} (expected {})",
                pipeline.version, ARTIFACT_VERSION
            )));
        }
        log::debug!(
            "Loaded {} pipeline with {} classes from {}",
            pipeline.model_name,
            pipeline.classes.len(),
            path.display()
        );
        Ok(pipeline)
    }

    /// Fail with `FieldMismatch` on the first schema field absent from `record`.
    pub fn check_fields(&self, record: &Record) -> Result<()> {
        match self.schema.feature_columns().find(|name| !record.contains_key(*name)) {
            Some(name) => Err(PipelineError::FieldMismatch(format!("missing field '{}'", name))),
            None => Ok(()),
        }
    }

    /// Feature vector produced by the fitted preprocessing.
    pub fn transform(&self, record: &Record) -> Result<Vec<f64>> {
        self.check_fields(record)?;
        self.preprocessor.transform_record(record)
    }

    pub fn predict(&self, record: &Record) -> Result<Prediction> {
        let row = self.transform(record)?;
        let x = Array2::from_shape_vec((1, row.len()), row)
            .map_err(|e| PipelineError::Model(e.to_string()))?;
        let proba = self.classifier.predict_proba(&x)?;
        let row = proba.index_axis(Axis(0), 0);

        let best = crate::models::classifier_trait::argmax(row.iter().copied());
        let label = self
            .classes
            .get(best)
            .cloned()
            .ok_or_else(|| PipelineError::Model(format!("class index {} out of range", best)))?;

        let probabilities = if self.classifier.supports_proba() {
            Some(
                self.classes
                    .iter()
                    .cloned()
                    .zip(row.iter().copied())
                    .collect::<BTreeMap<_, _>>(),
            )
        } else {
            None
        };

        Ok(Prediction {
            label,
            probabilities,
        })
    }
}
