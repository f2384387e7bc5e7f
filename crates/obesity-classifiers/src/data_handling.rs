//! Data structures and helpers for loading and partitioning labeled cohorts.
//!
//! This module defines `Record`, `Table`, `FeatureSchema` and `Cohort` and
//! contains the stratified train/test split and the stratified k-fold
//! assignment used by the trainer and the grid search.
use std::collections::BTreeMap;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// A single cell of a patient record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value. Text is parsed leniently so that a record
    /// read from a form or a CSV cell can still feed a numeric column.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Categorical view of the value. Numbers use `f64`'s `Display`, so
    /// `1.0` becomes `"1"`; the one-hot encoder matches numbers against its
    /// vocabulary by parsed value instead of by this text.
    pub fn as_category(&self) -> String {
        match self {
            FieldValue::Number(v) => v.to_string(),
            FieldValue::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// One patient's attributes keyed by column name.
pub type Record = BTreeMap<String, FieldValue>;

/// Raw tabular data as read from disk: trimmed headers and trimmed cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Table { headers, rows }
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.headers.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// All cells of a column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }

    /// True when every non-empty cell of the column parses as a float.
    pub fn is_numeric_column(&self, name: &str) -> bool {
        match self.column(name) {
            Some(cells) => {
                let mut seen = false;
                for cell in cells {
                    if cell.is_empty() {
                        continue;
                    }
                    if cell.parse::<f64>().is_err() {
                        return false;
                    }
                    seen = true;
                }
                seen
            }
            None => false,
        }
    }
}

/// Explicit partition of the dataset columns.
///
/// The same schema is stored inside the persisted pipeline, so training and
/// inference agree on field names and on which fields are scaled versus
/// one-hot encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub target: String,
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        let names = |cols: &[&str]| cols.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        FeatureSchema {
            target: "Obesity".to_string(),
            numeric: names(&["Age", "Height", "Weight", "FCVC", "NCP", "CH2O", "FAF", "TUE"]),
            categorical: names(&[
                "Gender",
                "family_history",
                "FAVC",
                "CAEC",
                "SMOKE",
                "SCC",
                "CALC",
                "MTRANS",
            ]),
        }
    }
}

impl FeatureSchema {
    /// Partition every non-target column of `table` by inspecting its cells.
    pub fn infer(table: &Table, target: &str) -> Result<Self> {
        if table.column_index(target).is_none() {
            return Err(missing_target(table, target));
        }

        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        for name in table.headers.iter().filter(|h| h.as_str() != target) {
            if table.is_numeric_column(name) {
                numeric.push(name.clone());
            } else {
                categorical.push(name.clone());
            }
        }

        log::debug!(
            "Inferred schema: {} numeric and {} categorical columns",
            numeric.len(),
            categorical.len()
        );

        Ok(FeatureSchema {
            target: target.to_string(),
            numeric,
            categorical,
        })
    }

    /// Feature columns in transform order (numeric first).
    pub fn feature_columns(&self) -> impl Iterator<Item = &String> {
        self.numeric.iter().chain(self.categorical.iter())
    }

    pub fn n_features(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    /// Check that `table` carries the target and every schema column.
    pub fn validate(&self, table: &Table) -> Result<()> {
        if table.column_index(&self.target).is_none() {
            return Err(missing_target(table, &self.target));
        }
        for name in self.feature_columns() {
            if table.column_index(name).is_none() {
                return Err(PipelineError::SchemaError(format!(
                    "Feature column '{}' not found. Available columns: {:?}",
                    name, table.headers
                )));
            }
        }
        Ok(())
    }
}

fn missing_target(table: &Table, target: &str) -> PipelineError {
    PipelineError::SchemaError(format!(
        "Target column '{}' not found. Available columns: {:?}",
        target, table.headers
    ))
}

/// Typed, labeled rows ready for preprocessing.
#[derive(Debug, Clone)]
pub struct Cohort {
    pub records: Vec<Record>,
    /// Index into `classes` for every record.
    pub labels: Array1<usize>,
    /// Sorted distinct label names.
    pub classes: Vec<String>,
}

impl Cohort {
    /// Build a cohort from a loaded table. Columns outside the schema are
    /// dropped; numeric cells must parse.
    pub fn from_table(table: &Table, schema: &FeatureSchema) -> Result<Self> {
        schema.validate(table)?;
        let target_idx = table
            .column_index(&schema.target)
            .ok_or_else(|| missing_target(table, &schema.target))?;

        let numeric_idx: Vec<(usize, &String)> = schema
            .numeric
            .iter()
            .filter_map(|name| table.column_index(name).map(|i| (i, name)))
            .collect();
        let categorical_idx: Vec<(usize, &String)> = schema
            .categorical
            .iter()
            .filter_map(|name| table.column_index(name).map(|i| (i, name)))
            .collect();

        let mut classes: Vec<String> = table
            .rows
            .iter()
            .map(|row| row[target_idx].clone())
            .collect();
        classes.sort();
        classes.dedup();

        let mut records = Vec::with_capacity(table.nrows());
        let mut labels = Vec::with_capacity(table.nrows());

        for (row_idx, row) in table.rows.iter().enumerate() {
            let mut record = Record::new();
            for &(col, name) in &numeric_idx {
                let cell = &row[col];
                let value = cell.parse::<f64>().map_err(|_| {
                    PipelineError::SchemaError(format!(
                        "Invalid numeric value '{}' in column '{}' at row {}",
                        cell,
                        name,
                        row_idx + 1
                    ))
                })?;
                record.insert(name.clone(), FieldValue::Number(value));
            }
            for &(col, name) in &categorical_idx {
                record.insert(name.clone(), FieldValue::Text(row[col].clone()));
            }
            records.push(record);

            // `classes` was built from this column, the lookup cannot miss.
            let label = classes
                .binary_search(&row[target_idx])
                .unwrap_or_default();
            labels.push(label);
        }

        Ok(Cohort {
            records,
            labels: Array1::from_vec(labels),
            classes,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Number of records per class, indexed like `classes`.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes()];
        for &label in self.labels.iter() {
            counts[label] += 1;
        }
        counts
    }

    /// Subset of the cohort keeping the class list intact.
    pub fn select(&self, indices: &[usize]) -> Cohort {
        Cohort {
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            classes: self.classes.clone(),
        }
    }

    pub fn log_input_data_summary(&self) {
        log::info!("----- Input Data Summary -----");
        log::info!("{} records, {} classes", self.len(), self.n_classes());
        for (class, count) in self.classes.iter().zip(self.class_counts()) {
            log::info!("  {:<24} {}", class, count);
        }
        log::info!("-------------------------------");
    }
}

fn indices_by_class(labels: &Array1<usize>, n_classes: usize) -> Vec<Vec<usize>> {
    let mut groups = vec![Vec::new(); n_classes];
    for (i, &label) in labels.iter().enumerate() {
        groups[label].push(i);
    }
    groups
}

/// Stratified train/test split.
///
/// Within every class the indices are shuffled with a generator seeded from
/// `seed` and `round(n_class * test_fraction)` of them go to the test side.
/// A class with a single member stays entirely in the training split.
///
/// # Returns
///
/// `(train_indices, test_indices)`, each sorted ascending.
pub fn stratified_split(
    labels: &Array1<usize>,
    n_classes: usize,
    test_fraction: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for mut members in indices_by_class(labels, n_classes) {
        if members.is_empty() {
            continue;
        }
        members.shuffle(&mut rng);
        let n = members.len();
        let n_test = if n < 2 {
            0
        } else {
            ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1)
        };
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();

    log::trace!(
        "Stratified split: {} training and {} test samples (seed {})",
        train.len(),
        test.len(),
        seed
    );

    (train, test)
}

/// Stratified k-fold assignment without shuffling.
///
/// Members of each class are dealt round-robin across the folds in index
/// order; the dealing position carries over between classes so fold sizes
/// differ by at most one. The assignment is a pure function of `labels`.
///
/// # Returns
///
/// One `(train_indices, validation_indices)` pair per fold, or
/// `InvalidConfig` when `n_folds` is below two.
pub fn stratified_folds(
    labels: &Array1<usize>,
    n_classes: usize,
    n_folds: usize,
) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
    if n_folds < 2 {
        return Err(PipelineError::InvalidConfig(format!(
            "cross-validation needs at least 2 folds, got {}",
            n_folds
        )));
    }

    let mut fold_of = vec![0usize; labels.len()];
    let mut position = 0usize;
    for members in indices_by_class(labels, n_classes) {
        for idx in members {
            fold_of[idx] = position % n_folds;
            position += 1;
        }
    }

    Ok((0..n_folds)
        .map(|fold| {
            let (valid, train): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|&i| fold_of[i] == fold);
            (train, valid)
        })
        .collect())
}
