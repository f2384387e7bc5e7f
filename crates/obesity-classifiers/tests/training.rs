mod common;

use obesity_classifiers::config::{MaxFeatures, TrainConfig};
use obesity_classifiers::data_handling::{stratified_split, Cohort, FeatureSchema};
use obesity_classifiers::io::{load_table, read_json};
use obesity_classifiers::models::{build_model, ClassifierModel};
use obesity_classifiers::preprocessing::Preprocessor;
use obesity_classifiers::{run_training, ModelPipeline, PipelineError, TrainingMetrics};
use tempfile::tempdir;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ---------------------------------------------------------------------------
// End-to-end training
// ---------------------------------------------------------------------------

#[test]
fn training_writes_artifact_and_metrics() {
    init_logger();
    let dir = tempdir().unwrap();
    let data = dir.path().join("Obesity.csv");
    common::write_synthetic_dataset(&data, 700, 11);
    let config = common::small_config(dir.path(), data);

    let outcome = run_training(&config).expect("training failed");

    assert!(config.model_output.exists());
    assert!(config.metrics_output.exists());

    let metrics: TrainingMetrics = read_json(&config.metrics_output).unwrap();
    assert!((0.0..=1.0).contains(&metrics.accuracy));
    assert!(metrics
        .candidates
        .iter()
        .any(|c| c.name == metrics.final_model));
    assert_eq!(metrics.candidates.len(), 2);
    assert_eq!(metrics.dataset_shape, [700, 17]);
    assert_eq!(metrics.target, "Obesity");
    assert_eq!(metrics.num_features.len(), 8);
    assert_eq!(metrics.cat_features.len(), 8);
    assert_eq!(metrics.classes.len(), 7);
    assert_eq!(metrics.confusion_matrix.len(), 7);
    assert_eq!(metrics.final_model, outcome.metrics.final_model);
    assert_eq!(outcome.below_threshold, metrics.accuracy < config.accuracy_threshold);

    let best = metrics
        .candidates
        .iter()
        .map(|c| c.accuracy)
        .fold(f64::MIN, f64::max);
    assert_eq!(metrics.accuracy, best);

    if metrics.final_model.starts_with("RandomForest") {
        assert!(metrics.best_params.contains_key("max_depth"));
    } else {
        assert!(metrics.best_params.is_empty());
    }
}

#[test]
fn training_with_inferred_schema_on_textual_meal_counts() {
    init_logger();
    let dir = tempdir().unwrap();
    let data = dir.path().join("Obesity.csv");
    common::write_textual_meals_dataset(&data, 2000, 17);
    let mut config = TrainConfig {
        features: None,
        ..common::small_config(dir.path(), data)
    };
    config.forest.max_features = MaxFeatures::Sqrt;

    let outcome = run_training(&config).unwrap();
    let metrics = outcome.metrics;

    assert!(config.model_output.exists());
    assert_eq!(metrics.dataset_shape, [2000, 17]);
    assert_eq!(metrics.num_features.len(), 7);
    assert_eq!(metrics.cat_features.len(), 9);
    assert!(metrics.cat_features.contains(&"NCP".to_string()));
    assert_eq!(metrics.classes.len(), 7);
    assert!((0.0..=1.0).contains(&metrics.accuracy));
    assert!(metrics
        .candidates
        .iter()
        .any(|c| c.name == metrics.final_model));
}

#[test]
fn training_is_deterministic_for_a_fixed_seed() {
    init_logger();
    let dir = tempdir().unwrap();
    let data = dir.path().join("Obesity.csv");
    common::write_synthetic_dataset(&data, 400, 5);

    let first = common::small_config(&dir.path().join("a"), data.clone());
    let second = common::small_config(&dir.path().join("b"), data);

    let a = run_training(&first).unwrap().metrics;
    let b = run_training(&second).unwrap().metrics;

    assert_eq!(a.final_model, b.final_model);
    assert_eq!(a.accuracy, b.accuracy);
    assert_eq!(a.best_params, b.best_params);
    assert_eq!(a.confusion_matrix, b.confusion_matrix);
}

#[test]
fn saved_pipeline_predicts_obesity_for_high_bmi() {
    init_logger();
    let dir = tempdir().unwrap();
    let data = dir.path().join("Obesity.csv");
    common::write_synthetic_dataset(&data, 700, 3);
    let config = common::small_config(dir.path(), data);
    run_training(&config).unwrap();

    let pipeline = ModelPipeline::load(&config.model_output).unwrap();
    let prediction = pipeline.predict(&common::reference_record()).unwrap();

    assert!(
        prediction.label.starts_with("Obesity_Type_"),
        "unexpected label {}",
        prediction.label
    );
    let probabilities = prediction.probabilities.expect("probabilities");
    assert_eq!(probabilities.len(), 7);
    assert!((probabilities.values().sum::<f64>() - 1.0).abs() < 1e-6);
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

#[test]
fn missing_dataset_fails_without_writing() {
    let dir = tempdir().unwrap();
    let config = common::small_config(dir.path(), dir.path().join("absent.csv"));

    let err = run_training(&config).unwrap_err();

    assert!(matches!(err, PipelineError::DatasetNotFound(_)));
    assert!(!config.model_output.exists());
    assert!(!config.metrics_output.exists());
}

#[test]
fn missing_target_column_is_schema_error() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("Obesity.csv");
    common::write_synthetic_dataset(&data, 50, 1);
    let config = TrainConfig {
        target: "NObeyesdad".to_string(),
        ..common::small_config(dir.path(), data)
    };

    let err = run_training(&config).unwrap_err();

    assert!(matches!(err, PipelineError::SchemaError(_)));
    assert!(!config.model_output.exists());
}

#[test]
fn single_fold_cross_validation_is_invalid_config() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("Obesity.csv");
    common::write_synthetic_dataset(&data, 50, 4);

    for cv_folds in [0, 1] {
        let config = TrainConfig {
            cv_folds,
            ..common::small_config(dir.path(), data.clone())
        };
        let err = run_training(&config).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
        assert!(!config.model_output.exists());
        assert!(!config.metrics_output.exists());
    }
}

#[test]
fn inferred_schema_matches_declared_columns() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("Obesity.csv");
    common::write_synthetic_dataset(&data, 50, 2);
    let table = load_table(&data).unwrap();

    let inferred = FeatureSchema::infer(&table, "Obesity").unwrap();
    let mut numeric = inferred.numeric.clone();
    let mut declared = FeatureSchema::default().numeric;
    numeric.sort();
    declared.sort();

    assert_eq!(numeric, declared);
    assert_eq!(inferred.categorical.len(), 8);
}

// ---------------------------------------------------------------------------
// Split and preprocessing on the real column layout
// ---------------------------------------------------------------------------

#[test]
fn stratified_split_keeps_class_proportions() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("Obesity.csv");
    common::write_synthetic_dataset(&data, 500, 9);
    let table = load_table(&data).unwrap();
    let schema = FeatureSchema::default();
    let cohort = Cohort::from_table(&table, &schema).unwrap();

    let (train, test) = stratified_split(&cohort.labels, cohort.n_classes(), 0.2, 42);
    assert_eq!(train.len() + test.len(), cohort.len());

    let test_cohort = cohort.select(&test);
    for (total, in_test) in cohort.class_counts().iter().zip(test_cohort.class_counts()) {
        let expected = (*total as f64 * 0.2).round() as usize;
        assert!(
            (in_test as i64 - expected as i64).abs() <= 1,
            "class with {} members has {} test members",
            total,
            in_test
        );
    }
}

#[test]
fn logistic_baseline_learns_bmi_bands() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("Obesity.csv");
    common::write_synthetic_dataset(&data, 400, 21);
    let table = load_table(&data).unwrap();
    let schema = FeatureSchema::default();
    let cohort = Cohort::from_table(&table, &schema).unwrap();

    let pre = Preprocessor::fit(&schema, &cohort.records).unwrap();
    let x = pre.transform(&cohort.records).unwrap();
    let mut model = build_model(&TrainConfig::default().logistic_model());
    model.fit(&x, &cohort.labels, cohort.n_classes()).unwrap();

    let proba = model.predict_proba(&x).unwrap();
    assert_eq!(proba.shape(), &[400, 7]);
    let pred = model.predict(&x).unwrap();
    let hits = pred
        .iter()
        .zip(cohort.labels.iter())
        .filter(|(p, t)| p == t)
        .count();
    assert!(hits as f64 / 400.0 > 0.5);
}
