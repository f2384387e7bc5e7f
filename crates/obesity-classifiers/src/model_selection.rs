//! Exhaustive hyper-parameter search scored by stratified k-fold accuracy.
use ndarray::Array2;
use rayon::prelude::*;

use crate::config::ModelType;
use crate::data_handling::{stratified_folds, Cohort, FeatureSchema};
use crate::error::{PipelineError, Result};
use crate::models::{build_model, ClassifierModel};
use crate::preprocessing::Preprocessor;
use crate::stats::accuracy;

/// One fold with its own fitted preprocessing.
struct PreparedFold {
    x_train: Array2<f64>,
    y_train: ndarray::Array1<usize>,
    x_valid: Array2<f64>,
    y_valid: ndarray::Array1<usize>,
}

/// Mean cross-validated accuracy of one candidate.
#[derive(Debug, Clone)]
pub struct CandidateScore {
    pub model: ModelType,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
}

#[derive(Debug, Clone)]
pub struct GridSearchResult {
    pub best_model: ModelType,
    pub best_score: f64,
    pub scores: Vec<CandidateScore>,
}

/// Cross-validated grid search.
///
/// The preprocessing is refitted on the training part of every fold, so the
/// validation part never leaks into the scaler statistics or the one-hot
/// vocabularies.
pub struct GridSearchCv<'a> {
    schema: &'a FeatureSchema,
    n_folds: usize,
}

impl<'a> GridSearchCv<'a> {
    pub fn new(schema: &'a FeatureSchema, n_folds: usize) -> Self {
        GridSearchCv { schema, n_folds }
    }

    fn prepare_folds(&self, cohort: &Cohort) -> Result<Vec<PreparedFold>> {
        stratified_folds(&cohort.labels, cohort.n_classes(), self.n_folds)?
            .into_iter()
            .enumerate()
            .map(|(fold, (train_idx, valid_idx))| {
                let train = cohort.select(&train_idx);
                let valid = cohort.select(&valid_idx);
                let pre = Preprocessor::fit(self.schema, &train.records)?;
                log::trace!(
                    "Prepared fold {} with {} training and {} validation samples",
                    fold,
                    train.len(),
                    valid.len()
                );
                Ok(PreparedFold {
                    x_train: pre.transform(&train.records)?,
                    y_train: train.labels,
                    x_valid: pre.transform(&valid.records)?,
                    y_valid: valid.labels,
                })
            })
            .collect()
    }

    fn score(folds: &[PreparedFold], model: &ModelType, n_classes: usize) -> Result<CandidateScore> {
        let mut fold_scores = Vec::with_capacity(folds.len());
        for fold in folds {
            let mut classifier = build_model(model);
            classifier.fit(&fold.x_train, &fold.y_train, n_classes)?;
            let pred = classifier.predict(&fold.x_valid)?;
            fold_scores.push(accuracy(&fold.y_valid, &pred));
        }
        let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
        Ok(CandidateScore {
            model: model.clone(),
            fold_scores,
            mean_score,
        })
    }

    /// Score every candidate and return the best one. Ties keep the
    /// candidate that comes first in `candidates`.
    pub fn fit(&self, cohort: &Cohort, candidates: &[ModelType]) -> Result<GridSearchResult> {
        if candidates.is_empty() {
            return Err(PipelineError::Model("grid search needs at least one candidate".to_string()));
        }

        let folds = self.prepare_folds(cohort)?;
        let n_classes = cohort.n_classes();

        log::info!(
            "Grid search: {} candidates x {} folds",
            candidates.len(),
            self.n_folds
        );

        let scores = candidates
            .par_iter()
            .map(|model| Self::score(&folds, model, n_classes))
            .collect::<Result<Vec<_>>>()?;

        let mut best = 0;
        for (i, s) in scores.iter().enumerate() {
            log::debug!("{:?}: mean accuracy {:.4}", s.model.tuned_params(), s.mean_score);
            if s.mean_score > scores[best].mean_score {
                best = i;
            }
        }

        Ok(GridSearchResult {
            best_model: scores[best].model.clone(),
            best_score: scores[best].mean_score,
            scores,
        })
    }
}
