use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::data_handling::{FeatureSchema, Table};
use crate::error::{PipelineError, Result};

/// Number of feature columns each forest tree is grown on.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least one.
    #[default]
    Sqrt,
    /// `round(n_features * fraction)`, clamped to `1..=n_features`.
    Fraction(f64),
    All,
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        if n_features == 0 {
            return 0;
        }
        match self {
            MaxFeatures::Sqrt => ((n_features as f64).sqrt().floor() as usize).max(1),
            MaxFeatures::Fraction(fraction) => {
                ((n_features as f64 * fraction).round() as usize).clamp(1, n_features)
            }
            MaxFeatures::All => n_features,
        }
    }
}

/// Supported candidate models and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    LogisticRegression {
        max_iterations: u64,
        alpha: f64,
    },
    RandomForest {
        n_estimators: usize,
        max_depth: Option<usize>,
        min_samples_leaf: usize,
        min_samples_split: usize,
        max_features: MaxFeatures,
        seed: u64,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::LogisticRegression {
            max_iterations: 5000,
            alpha: 1.0,
        }
    }
}

impl ModelType {
    /// Display name recorded in the metrics document.
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelType::LogisticRegression { .. } => "LogisticRegression (baseline)",
            ModelType::RandomForest { .. } => "RandomForest (tuned)",
        }
    }

    /// Tuned hyper-parameters, empty for the linear baseline.
    pub fn tuned_params(&self) -> BTreeMap<String, serde_json::Value> {
        let mut params = BTreeMap::new();
        if let ModelType::RandomForest {
            max_depth,
            min_samples_leaf,
            min_samples_split,
            ..
        } = self
        {
            params.insert("max_depth".to_string(), serde_json::json!(max_depth));
            params.insert("min_samples_leaf".to_string(), serde_json::json!(min_samples_leaf));
            params.insert("min_samples_split".to_string(), serde_json::json!(min_samples_split));
        }
        params
    }
}

/// Linear baseline settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LogisticConfig {
    pub max_iterations: u64,
    pub alpha: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            alpha: 1.0,
        }
    }
}

/// Random forest settings shared by every grid point.
///
/// `n_estimators` defaults to 100 rather than 700 so that the 36-point grid
/// with 5 folds stays tractable; raise it in the config for the final run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_features: MaxFeatures,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_features: MaxFeatures::Sqrt,
        }
    }
}

/// Hyper-parameter grid searched for the random forest.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ForestGrid {
    pub max_depth: Vec<Option<usize>>,
    pub min_samples_leaf: Vec<usize>,
    pub min_samples_split: Vec<usize>,
}

impl Default for ForestGrid {
    fn default() -> Self {
        Self {
            max_depth: vec![None, Some(10), Some(20), Some(30)],
            min_samples_leaf: vec![1, 2, 4],
            min_samples_split: vec![2, 5, 10],
        }
    }
}

impl ForestGrid {
    /// Expand the grid into concrete models, depth varying slowest.
    pub fn candidates(&self, forest: &ForestConfig, seed: u64) -> Vec<ModelType> {
        let mut out = Vec::with_capacity(
            self.max_depth.len() * self.min_samples_leaf.len() * self.min_samples_split.len(),
        );
        for &max_depth in &self.max_depth {
            for &min_samples_leaf in &self.min_samples_leaf {
                for &min_samples_split in &self.min_samples_split {
                    out.push(ModelType::RandomForest {
                        n_estimators: forest.n_estimators,
                        max_depth,
                        min_samples_leaf,
                        min_samples_split,
                        max_features: forest.max_features,
                        seed,
                    });
                }
            }
        }
        out
    }
}

/// Numeric and categorical feature column names.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FeatureColumns {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl Default for FeatureColumns {
    fn default() -> Self {
        let schema = FeatureSchema::default();
        Self {
            numeric: schema.numeric,
            categorical: schema.categorical,
        }
    }
}

/// Parameters of a training run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrainConfig {
    pub train_data: PathBuf,
    pub model_output: PathBuf,
    pub metrics_output: PathBuf,
    pub target: String,
    /// Declared feature columns. When `None` the columns are partitioned by
    /// inspecting the loaded table.
    pub features: Option<FeatureColumns>,
    pub test_size: f64,
    pub random_state: u64,
    pub cv_folds: usize,
    pub accuracy_threshold: f64,
    pub logistic: LogisticConfig,
    pub forest: ForestConfig,
    pub grid: ForestGrid,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            train_data: PathBuf::from("data/Obesity.csv"),
            model_output: PathBuf::from("models/obesity_model.json"),
            metrics_output: PathBuf::from("models/metrics.json"),
            target: "Obesity".to_string(),
            features: Some(FeatureColumns::default()),
            test_size: 0.2,
            random_state: 42,
            cv_folds: 5,
            accuracy_threshold: 0.75,
            logistic: LogisticConfig::default(),
            forest: ForestConfig::default(),
            grid: ForestGrid::default(),
        }
    }
}

impl TrainConfig {
    /// Reject settings the trainer cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.cv_folds < 2 {
            return Err(PipelineError::InvalidConfig(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "test_size must lie strictly between 0 and 1, got {}",
                self.test_size
            )));
        }
        if self.forest.n_estimators == 0 {
            return Err(PipelineError::InvalidConfig(
                "forest.n_estimators must be at least 1".to_string(),
            ));
        }
        if let MaxFeatures::Fraction(f) = self.forest.max_features {
            if !(f > 0.0 && f <= 1.0) {
                return Err(PipelineError::InvalidConfig(format!(
                    "forest.max_features fraction must lie in (0, 1], got {}",
                    f
                )));
            }
        }
        Ok(())
    }

    /// Resolve the feature schema against a loaded table.
    pub fn resolve_schema(&self, table: &Table) -> Result<FeatureSchema> {
        let schema = match &self.features {
            Some(cols) => FeatureSchema {
                target: self.target.clone(),
                numeric: cols.numeric.clone(),
                categorical: cols.categorical.clone(),
            },
            None => FeatureSchema::infer(table, &self.target)?,
        };
        schema.validate(table)?;
        Ok(schema)
    }

    pub fn logistic_model(&self) -> ModelType {
        ModelType::LogisticRegression {
            max_iterations: self.logistic.max_iterations,
            alpha: self.logistic.alpha,
        }
    }

    pub fn forest_candidates(&self) -> Vec<ModelType> {
        self.grid.candidates(&self.forest, self.random_state)
    }
}
