//! CLI binary smoke tests using assert_cmd.
//!
//! These tests exercise the compiled `obesity` binary: argument parsing,
//! help text, error handling, and a small train-then-predict round.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("obesity").unwrap()
}

fn label_for_bmi(bmi: f64) -> &'static str {
    match bmi {
        b if b < 18.5 => "Insufficient_Weight",
        b if b < 25.0 => "Normal_Weight",
        b if b < 27.5 => "Overweight_Level_I",
        b if b < 30.0 => "Overweight_Level_II",
        b if b < 35.0 => "Obesity_Type_I",
        b if b < 40.0 => "Obesity_Type_II",
        _ => "Obesity_Type_III",
    }
}

/// Deterministic survey table; the label follows BMI.
fn write_dataset(path: &Path, n_rows: usize) {
    let transport = ["Public_Transportation", "Walking", "Automobile", "Motorbike", "Bike"];
    let freq = ["no", "Sometimes", "Frequently", "Always"];
    let mut out = String::from(
        "Gender,Age,Height,Weight,family_history,FAVC,FCVC,NCP,CAEC,SMOKE,CH2O,SCC,FAF,TUE,CALC,MTRANS,Obesity\n",
    );
    for i in 0..n_rows {
        let height = 1.50 + (i % 10) as f64 * 0.045;
        let bmi = 16.0 + ((i * 7) % 29) as f64 + 0.5;
        let weight = bmi * height * height;
        let yn = if i % 2 == 0 { "yes" } else { "no" };
        out.push_str(&format!(
            "{},{},{:.3},{:.2},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            if i % 3 == 0 { "Male" } else { "Female" },
            18 + i % 40,
            height,
            weight,
            yn,
            yn,
            1 + i % 3,
            1 + i % 4,
            freq[i % 4],
            "no",
            1 + i % 3,
            "no",
            i % 4,
            i % 3,
            freq[(i + 1) % 4],
            transport[i % 5],
            label_for_bmi(weight / (height * height)),
        ));
    }
    std::fs::write(path, out).unwrap();
}

const RECORD: &str = r#"{
  "Gender": "Female", "Age": 45, "Height": 1.70, "Weight": 95,
  "family_history": "yes", "FAVC": "yes", "FCVC": 2, "NCP": 3,
  "CAEC": "Sometimes", "SMOKE": "no", "CH2O": 2, "SCC": "no",
  "FAF": 0, "TUE": 1, "CALC": "Sometimes", "MTRANS": "Automobile"
}"#;

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("train"))
        .stdout(predicate::str::contains("predict"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("obesity"));
}

#[test]
fn config_prints_defaults() {
    cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"train_data\""))
        .stdout(predicate::str::contains("\"random_state\": 42"));
}

// ---------------------------------------------------------------------------
// Train subcommand
// ---------------------------------------------------------------------------

#[test]
fn train_missing_dataset_errors_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.json");
    cmd()
        .args(["train", "-d"])
        .arg(dir.path().join("absent.csv"))
        .arg("-o")
        .arg(&model)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dataset not found"));
    assert!(!model.exists());
}

#[test]
fn train_nonexistent_config_errors() {
    cmd()
        .args(["train", "/nonexistent/config.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

// ---------------------------------------------------------------------------
// Predict subcommand
// ---------------------------------------------------------------------------

#[test]
fn predict_requires_model() {
    cmd().args(["predict", "-r", "record.json"]).assert().failure();
}

#[test]
fn predict_missing_artifact_errors() {
    let dir = tempfile::tempdir().unwrap();
    let record = dir.path().join("record.json");
    std::fs::write(&record, RECORD).unwrap();
    cmd()
        .args(["predict", "-m"])
        .arg(dir.path().join("missing.json"))
        .arg("-r")
        .arg(&record)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Model artifact not found"));
}

#[test]
fn train_then_predict() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("Obesity.csv");
    write_dataset(&data, 350);

    let config = dir.path().join("config.json");
    let model = dir.path().join("out").join("model.json");
    let metrics = dir.path().join("out").join("metrics.json");
    std::fs::write(
        &config,
        r#"{
            "cv_folds": 3,
            "logistic": { "max_iterations": 200 },
            "forest": { "n_estimators": 8 },
            "grid": { "max_depth": [null, 6], "min_samples_leaf": [1], "min_samples_split": [2] }
        }"#,
    )
    .unwrap();

    cmd()
        .arg("train")
        .arg(&config)
        .arg("-d")
        .arg(&data)
        .arg("-o")
        .arg(&model)
        .arg("--metrics")
        .arg(&metrics)
        .assert()
        .success()
        .stdout(predicate::str::contains("Final model:"));
    assert!(model.exists());
    assert!(metrics.exists());

    let record = dir.path().join("record.json");
    std::fs::write(&record, RECORD).unwrap();
    cmd()
        .args(["predict", "-m"])
        .arg(&model)
        .arg("-r")
        .arg(&record)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"label\""))
        .stdout(predicate::str::contains("\"risk\""));

    let output = dir.path().join("predictions.tsv");
    cmd()
        .args(["predict", "-m"])
        .arg(&model)
        .arg("-d")
        .arg(&data)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();
    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.lines().next().unwrap().ends_with("predicted_label\tprobability"));
    assert_eq!(written.lines().count(), 351);
}
