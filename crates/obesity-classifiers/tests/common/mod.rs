#![allow(dead_code)]

use std::path::{Path, PathBuf};

use obesity_classifiers::config::{ForestConfig, ForestGrid, LogisticConfig, MaxFeatures, TrainConfig};
use obesity_classifiers::data_handling::{FieldValue, Record};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub const HEADERS: [&str; 17] = [
    "Gender",
    "Age",
    "Height",
    "Weight",
    "family_history",
    "FAVC",
    "FCVC",
    "NCP",
    "CAEC",
    "SMOKE",
    "CH2O",
    "SCC",
    "FAF",
    "TUE",
    "CALC",
    "MTRANS",
    "Obesity",
];

/// Label from BMI, using the cut-offs the survey labels follow.
pub fn label_for_bmi(bmi: f64) -> &'static str {
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

/// Seeded synthetic survey with the real column layout.
pub fn write_synthetic_dataset(path: &Path, n_rows: usize, seed: u64) {
    write_dataset(path, n_rows, seed, false)
}

/// Same layout, but the meal count is recorded as text, so an inferred
/// schema sees 9 categorical and 7 numeric columns.
pub fn write_textual_meals_dataset(path: &Path, n_rows: usize, seed: u64) {
    write_dataset(path, n_rows, seed, true)
}

fn meal_count_text(meals: f64) -> &'static str {
    match meals {
        m if m < 2.0 => "Between_1_and_2",
        m if m < 3.0 => "Three",
        _ => "More_than_three",
    }
}

fn write_dataset(path: &Path, n_rows: usize, seed: u64, textual_meals: bool) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut writer = csv::Writer::from_path(path).expect("failed to create dataset");
    writer.write_record(HEADERS).expect("failed to write header");

    let yes_no = ["yes", "no"];
    let freq = ["no", "Sometimes", "Frequently", "Always"];
    let transport = ["Public_Transportation", "Walking", "Automobile", "Motorbike", "Bike"];

    for _ in 0..n_rows {
        let height: f64 = rng.gen_range(1.50..1.95);
        let bmi: f64 = rng.gen_range(16.0..45.0);
        let weight = bmi * height * height;
        let row = vec![
            ["Female", "Male"].choose(&mut rng).unwrap().to_string(),
            format!("{:.0}", rng.gen_range(16.0..61.0)),
            format!("{:.3}", height),
            format!("{:.2}", weight),
            yes_no.choose(&mut rng).unwrap().to_string(),
            yes_no.choose(&mut rng).unwrap().to_string(),
            format!("{:.2}", rng.gen_range(1.0..3.0)),
            {
                let meals: f64 = rng.gen_range(1.0..4.0);
                if textual_meals {
                    meal_count_text(meals).to_string()
                } else {
                    format!("{:.2}", meals)
                }
            },
            freq.choose(&mut rng).unwrap().to_string(),
            yes_no.choose(&mut rng).unwrap().to_string(),
            format!("{:.2}", rng.gen_range(1.0..3.0)),
            yes_no.choose(&mut rng).unwrap().to_string(),
            format!("{:.2}", rng.gen_range(0.0..3.0)),
            format!("{:.2}", rng.gen_range(0.0..2.0)),
            freq.choose(&mut rng).unwrap().to_string(),
            transport.choose(&mut rng).unwrap().to_string(),
            label_for_bmi(weight / (height * height)).to_string(),
        ];
        writer.write_record(&row).expect("failed to write row");
    }
    writer.flush().expect("failed to flush dataset");
}

/// Training config with a small forest and grid so tests stay fast. Trees
/// see every column so the few of them still find height and weight.
pub fn small_config(dir: &Path, data: PathBuf) -> TrainConfig {
    TrainConfig {
        train_data: data,
        model_output: dir.join("models").join("obesity_model.json"),
        metrics_output: dir.join("models").join("metrics.json"),
        cv_folds: 3,
        logistic: LogisticConfig {
            max_iterations: 300,
            alpha: 1.0,
        },
        forest: ForestConfig {
            n_estimators: 15,
            max_features: MaxFeatures::All,
        },
        grid: ForestGrid {
            max_depth: vec![None, Some(8)],
            min_samples_leaf: vec![1],
            min_samples_split: vec![2, 5],
        },
        ..TrainConfig::default()
    }
}

/// Female, 45 years, 1.70 m, 95 kg: BMI 32.9.
pub fn reference_record() -> Record {
    let mut r = Record::new();
    let num = [
        ("Age", 45.0),
        ("Height", 1.70),
        ("Weight", 95.0),
        ("FCVC", 2.0),
        ("NCP", 3.0),
        ("CH2O", 2.0),
        ("FAF", 0.0),
        ("TUE", 1.0),
    ];
    for (k, v) in num {
        r.insert(k.to_string(), FieldValue::Number(v));
    }
    let cat = [
        ("Gender", "Female"),
        ("family_history", "yes"),
        ("FAVC", "yes"),
        ("CAEC", "Sometimes"),
        ("SMOKE", "no"),
        ("SCC", "no"),
        ("CALC", "Sometimes"),
        ("MTRANS", "Automobile"),
    ];
    for (k, v) in cat {
        r.insert(k.to_string(), FieldValue::from(v));
    }
    r
}
