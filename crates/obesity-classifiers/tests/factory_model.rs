use ndarray::{Array1, Array2};
use obesity_classifiers::config::{MaxFeatures, ModelType};
use obesity_classifiers::models::{build_model, Classifier, ClassifierModel};

fn tiny_dataset() -> (Array2<f64>, Array1<usize>) {
    let x = Array2::from_shape_vec(
        (9, 2),
        vec![
            1.0, 0.0, // class 0
            0.0, 1.0, // class 1
            1.0, 0.1, // class 0
            0.0, 0.9, // class 1
            1.1, 0.0, // class 0
            0.0, 1.2, // class 1
            -1.0, -1.0, // class 2
            -1.2, -0.9, // class 2
            -0.9, -1.1, // class 2
        ],
    )
    .expect("failed to create feature matrix");
    let y = Array1::from_vec(vec![0, 1, 0, 1, 0, 1, 2, 2, 2]);
    (x, y)
}

fn assert_fits_and_predicts(model_type: ModelType) {
    let (x, y) = tiny_dataset();
    let mut model = build_model(&model_type);
    model.fit(&x, &y, 3).unwrap();

    let probs = model.predict_proba(&x).unwrap();
    assert_eq!(probs.dim(), (x.nrows(), 3));
    for row in probs.rows() {
        assert!((row.sum() - 1.0).abs() < 1e-9);
    }
    assert_eq!(model.predict(&x).unwrap(), y);
}

#[test]
fn test_factory_builds_logistic_regression() {
    assert_fits_and_predicts(ModelType::LogisticRegression {
        max_iterations: 1000,
        alpha: 0.01,
    });
}

#[test]
fn test_factory_builds_random_forest() {
    assert_fits_and_predicts(ModelType::RandomForest {
        n_estimators: 10,
        max_depth: None,
        min_samples_leaf: 1,
        min_samples_split: 2,
        max_features: MaxFeatures::All,
        seed: 42,
    });
}

#[test]
fn test_fitted_classifier_survives_json() {
    let (x, y) = tiny_dataset();
    let mut model = build_model(&ModelType::RandomForest {
        n_estimators: 5,
        max_depth: Some(3),
        min_samples_leaf: 1,
        min_samples_split: 2,
        max_features: MaxFeatures::All,
        seed: 7,
    });
    model.fit(&x, &y, 3).unwrap();

    let json = serde_json::to_string(&model).unwrap();
    assert!(json.contains("\"kind\":\"random_forest\""));
    let restored: Classifier = serde_json::from_str(&json).unwrap();
    assert_eq!(
        restored.predict_proba(&x).unwrap(),
        model.predict_proba(&x).unwrap()
    );
}
