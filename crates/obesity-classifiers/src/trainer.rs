//! Offline training run: split, fit both candidates, select, persist.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{ModelType, TrainConfig};
use crate::data_handling::{stratified_split, Cohort};
use crate::error::Result;
use crate::io::{load_table, write_json};
use crate::model_selection::GridSearchCv;
use crate::models::{build_model, Classifier, ClassifierModel};
use crate::pipeline::ModelPipeline;
use crate::preprocessing::Preprocessor;
use crate::stats::{ClassMetrics, ClassificationReport};

/// Held-out performance of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub name: String,
    pub accuracy: f64,
    pub params: BTreeMap<String, serde_json::Value>,
    /// Mean cross-validated accuracy of the selected grid point.
    pub cv_score: Option<f64>,
}

/// Structured record of a training run, written next to the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub final_model: String,
    pub accuracy: f64,
    pub best_params: BTreeMap<String, serde_json::Value>,
    pub random_state: u64,
    pub target: String,
    pub num_features: Vec<String>,
    pub cat_features: Vec<String>,
    pub dataset_shape: [usize; 2],
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub classes: Vec<String>,
    pub per_class: Vec<ClassMetrics>,
    pub confusion_matrix: Vec<Vec<usize>>,
    pub candidates: Vec<CandidateSummary>,
    pub trained_at: String,
}

/// Everything a training run produced.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub pipeline: ModelPipeline,
    pub metrics: TrainingMetrics,
    pub below_threshold: bool,
}

struct Evaluated {
    model: ModelType,
    classifier: Classifier,
    report: ClassificationReport,
    cv_score: Option<f64>,
}

/// Keep the candidate with the higher held-out accuracy; ties go to the
/// tuned forest.
fn select_candidate(baseline: Evaluated, tuned: Evaluated) -> Evaluated {
    if tuned.report.accuracy >= baseline.report.accuracy {
        tuned
    } else {
        baseline
    }
}

fn fit_and_evaluate(
    model: ModelType,
    train: (&ndarray::Array2<f64>, &ndarray::Array1<usize>),
    test: (&ndarray::Array2<f64>, &ndarray::Array1<usize>),
    classes: &[String],
) -> Result<(Classifier, ClassificationReport)> {
    let mut classifier = build_model(&model);
    classifier.fit(train.0, train.1, classes.len())?;
    let pred = classifier.predict(test.0)?;
    let report = ClassificationReport::new(test.1, &pred, classes);

    log::info!("=== {} ===", model.display_name());
    log::info!("Accuracy: {:.4}", report.accuracy);
    log::info!("Classification report:\n{}", report);

    Ok((classifier, report))
}

/// Run the full training pipeline described by `config`.
///
/// The artifact and the metrics document are only written once both
/// candidates have been fitted and evaluated; any earlier failure leaves the
/// output paths untouched.
pub fn run_training(config: &TrainConfig) -> Result<TrainingOutcome> {
    config.validate()?;
    let table = load_table(&config.train_data)?;
    let schema = config.resolve_schema(&table)?;
    let cohort = Cohort::from_table(&table, &schema)?;

    log::info!("Dataset loaded: {:?}", table.shape());
    log::info!("Target column: {}", schema.target);
    log::info!("Numeric: {:?}", schema.numeric);
    log::info!("Categorical: {:?}", schema.categorical);
    cohort.log_input_data_summary();

    let (train_idx, test_idx) = stratified_split(
        &cohort.labels,
        cohort.n_classes(),
        config.test_size,
        config.random_state,
    );
    let train = cohort.select(&train_idx);
    let test = cohort.select(&test_idx);

    let preprocessor = Preprocessor::fit(&schema, &train.records)?;
    let x_train = preprocessor.transform(&train.records)?;
    let x_test = preprocessor.transform(&test.records)?;

    // 1) Linear baseline
    let logistic = config.logistic_model();
    let (lr_classifier, lr_report) = fit_and_evaluate(
        logistic.clone(),
        (&x_train, &train.labels),
        (&x_test, &test.labels),
        &cohort.classes,
    )?;
    let baseline = Evaluated {
        model: logistic,
        classifier: lr_classifier,
        report: lr_report,
        cv_score: None,
    };

    // 2) Tuned forest
    let search = GridSearchCv::new(&schema, config.cv_folds).fit(&train, &config.forest_candidates())?;
    log::info!(
        "Best params (RandomForest): {:?} (cv accuracy {:.4})",
        search.best_model.tuned_params(),
        search.best_score
    );
    let (rf_classifier, rf_report) = fit_and_evaluate(
        search.best_model.clone(),
        (&x_train, &train.labels),
        (&x_test, &test.labels),
        &cohort.classes,
    )?;
    let tuned = Evaluated {
        model: search.best_model,
        classifier: rf_classifier,
        report: rf_report,
        cv_score: Some(search.best_score),
    };

    let candidates: Vec<CandidateSummary> = [&baseline, &tuned]
        .iter()
        .map(|e| CandidateSummary {
            name: e.model.display_name().to_string(),
            accuracy: e.report.accuracy,
            params: e.model.tuned_params(),
            cv_score: e.cv_score,
        })
        .collect();

    let chosen = select_candidate(baseline, tuned);

    let final_name = chosen.model.display_name();
    let metrics = TrainingMetrics {
        final_model: final_name.to_string(),
        accuracy: chosen.report.accuracy,
        best_params: chosen.model.tuned_params(),
        random_state: config.random_state,
        target: schema.target.clone(),
        num_features: schema.numeric.clone(),
        cat_features: schema.categorical.clone(),
        dataset_shape: [table.nrows(), table.ncols()],
        precision: chosen.report.macro_avg.precision,
        recall: chosen.report.macro_avg.recall,
        f1_score: chosen.report.macro_avg.f1_score,
        classes: cohort.classes.clone(),
        per_class: chosen.report.classes.clone(),
        confusion_matrix: chosen.report.confusion_matrix.clone(),
        candidates,
        trained_at: chrono::Utc::now().to_rfc3339(),
    };

    let pipeline = ModelPipeline::new(
        final_name,
        schema,
        cohort.classes.clone(),
        preprocessor,
        chosen.classifier,
    );

    pipeline.save(&config.model_output)?;
    write_json(&config.metrics_output, &metrics)?;

    log::info!("Final model: {}", metrics.final_model);
    log::info!("Final accuracy: {:.4}", metrics.accuracy);
    log::info!("Metrics saved to: {}", config.metrics_output.display());

    let below_threshold = metrics.accuracy < config.accuracy_threshold;
    if below_threshold {
        log::warn!(
            "Accuracy {:.4} is below the target threshold of {:.2}",
            metrics.accuracy,
            config.accuracy_threshold
        );
    }

    Ok(TrainingOutcome {
        pipeline,
        metrics,
        below_threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MaxFeatures, TrainConfig};
    use ndarray::Array1;

    fn evaluated(model: ModelType, hits: usize) -> Evaluated {
        let y_true = Array1::from_vec(vec![0, 1, 0, 1]);
        let y_pred: Array1<usize> = y_true
            .iter()
            .enumerate()
            .map(|(i, &t)| if i < hits { t } else { 1 - t })
            .collect();
        let labels = vec!["a".to_string(), "b".to_string()];
        Evaluated {
            classifier: build_model(&model),
            report: ClassificationReport::new(&y_true, &y_pred, &labels),
            cv_score: None,
            model,
        }
    }

    fn forest() -> ModelType {
        ModelType::RandomForest {
            n_estimators: 3,
            max_depth: None,
            min_samples_leaf: 1,
            min_samples_split: 2,
            max_features: MaxFeatures::Sqrt,
            seed: 0,
        }
    }

    #[test]
    fn equal_accuracy_selects_the_forest() {
        let baseline = evaluated(TrainConfig::default().logistic_model(), 3);
        let tuned = evaluated(forest(), 3);
        assert_eq!(baseline.report.accuracy, tuned.report.accuracy);

        let chosen = select_candidate(baseline, tuned);
        assert_eq!(chosen.model.display_name(), "RandomForest (tuned)");
    }

    #[test]
    fn higher_accuracy_wins() {
        let baseline = evaluated(TrainConfig::default().logistic_model(), 4);
        let tuned = evaluated(forest(), 2);
        let chosen = select_candidate(baseline, tuned);
        assert_eq!(chosen.model.display_name(), "LogisticRegression (baseline)");

        let baseline = evaluated(TrainConfig::default().logistic_model(), 1);
        let tuned = evaluated(forest(), 2);
        let chosen = select_candidate(baseline, tuned);
        assert_eq!(chosen.model.display_name(), "RandomForest (tuned)");
    }
}
