use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::config::ModelType;
use crate::error::Result;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::logistic::LogisticClassifier;
use crate::models::random_forest::{ForestParams, RandomForestClassifier};

/// Concrete classifier stored in a persisted pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    LogisticRegression(LogisticClassifier),
    RandomForest(RandomForestClassifier),
}

/// Build an unfitted classifier from a `ModelType`.
pub fn build_model(model_type: &ModelType) -> Classifier {
    match model_type {
        ModelType::LogisticRegression {
            max_iterations,
            alpha,
        } => Classifier::LogisticRegression(LogisticClassifier::new(*max_iterations, *alpha)),

        ModelType::RandomForest {
            n_estimators,
            max_depth,
            min_samples_leaf,
            min_samples_split,
            max_features,
            seed,
        } => Classifier::RandomForest(RandomForestClassifier::new(ForestParams {
            n_estimators: *n_estimators,
            max_depth: *max_depth,
            min_samples_leaf: *min_samples_leaf,
            min_samples_split: *min_samples_split,
            max_features: *max_features,
            seed: *seed,
        })),
    }
}

impl Classifier {
    fn inner(&self) -> &dyn ClassifierModel {
        match self {
            Classifier::LogisticRegression(m) => m,
            Classifier::RandomForest(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ClassifierModel {
        match self {
            Classifier::LogisticRegression(m) => m,
            Classifier::RandomForest(m) => m,
        }
    }
}

impl ClassifierModel for Classifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<()> {
        self.inner_mut().fit(x, y, n_classes)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.inner().predict_proba(x)
    }

    fn supports_proba(&self) -> bool {
        self.inner().supports_proba()
    }

    fn name(&self) -> &str {
        self.inner().name()
    }
}
