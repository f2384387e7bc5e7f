//! Column-wise preprocessing shared by training and inference.
//!
//! Provides a `StandardScaler` for per-column mean/std standardization of the
//! numeric fields and a `OneHotEncoder` for the categorical fields. The two
//! are combined by `Preprocessor`, which maps records to the dense feature
//! matrix the classifiers consume. Everything here is fitted once on the
//! training split and then only applied.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::data_handling::{FeatureSchema, FieldValue, Record};
use crate::error::{PipelineError, Result};

/// Standard scaler (per-column mean/std, population variance).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub columns: Vec<String>,
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl StandardScaler {
    /// Columns whose stddev falls below this are left unscaled (divided by 1).
    const MIN_STD: f64 = 1e-12;

    /// Fit per-column statistics from `records`.
    pub fn fit(columns: &[String], records: &[Record]) -> Result<Self> {
        let ncols = columns.len();
        let nrows = records.len();
        if nrows == 0 {
            return Err(PipelineError::Model(
                "StandardScaler requires at least one record".to_string(),
            ));
        }

        let mut values = vec![Vec::with_capacity(nrows); ncols];
        for record in records {
            for (c, name) in columns.iter().enumerate() {
                values[c].push(numeric_field(record, name)?);
            }
        }

        let nrows_f = nrows as f64;
        let mut mean = vec![0.0f64; ncols];
        let mut std = vec![0.0f64; ncols];
        for c in 0..ncols {
            mean[c] = values[c].iter().sum::<f64>() / nrows_f;
            let var = values[c].iter().map(|v| (v - mean[c]).powi(2)).sum::<f64>() / nrows_f;
            let sd = var.sqrt();
            std[c] = if sd < Self::MIN_STD { 1.0 } else { sd };
        }

        Ok(StandardScaler {
            columns: columns.to_vec(),
            mean,
            std,
        })
    }

    /// Write the scaled values of `record` into `out` (length = number of columns).
    pub fn transform_into(&self, record: &Record, out: &mut [f64]) -> Result<()> {
        for (c, name) in self.columns.iter().enumerate() {
            let v = numeric_field(record, name)?;
            out[c] = (v - self.mean[c]) / self.std[c];
        }
        Ok(())
    }

    pub fn n_outputs(&self) -> usize {
        self.columns.len()
    }
}

/// One-hot encoder with a fitted, sorted vocabulary per column.
///
/// A category outside the vocabulary encodes to all zeros. A numeric value
/// matches the vocabulary entry that parses to the same number, so `1.0`
/// finds a category fitted from the cell `"1.0"` or `"1"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub columns: Vec<String>,
    pub categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn fit(columns: &[String], records: &[Record]) -> Result<Self> {
        let mut categories = Vec::with_capacity(columns.len());
        for name in columns {
            let mut vocab = Vec::new();
            for record in records {
                vocab.push(field(record, name)?.as_category());
            }
            vocab.sort();
            vocab.dedup();
            categories.push(vocab);
        }

        Ok(OneHotEncoder {
            columns: columns.to_vec(),
            categories,
        })
    }

    pub fn transform_into(&self, record: &Record, out: &mut [f64]) -> Result<()> {
        let mut offset = 0;
        for (name, vocab) in self.columns.iter().zip(&self.categories) {
            let value = field(record, name)?;
            let block = &mut out[offset..offset + vocab.len()];
            block.iter_mut().for_each(|v| *v = 0.0);
            match category_position(vocab, value) {
                Some(pos) => block[pos] = 1.0,
                None => log::debug!(
                    "Unknown category '{}' for column '{}'",
                    value.as_category(),
                    name
                ),
            }
            offset += vocab.len();
        }
        Ok(())
    }

    pub fn n_outputs(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }
}

/// Fitted column transformer: scaled numeric block followed by the one-hot block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    pub scaler: StandardScaler,
    pub encoder: OneHotEncoder,
}

impl Preprocessor {
    /// Fit both sub-transforms on `records` following `schema`.
    pub fn fit(schema: &FeatureSchema, records: &[Record]) -> Result<Self> {
        let scaler = StandardScaler::fit(&schema.numeric, records)?;
        let encoder = OneHotEncoder::fit(&schema.categorical, records)?;
        log::debug!(
            "Fitted preprocessor: {} scaled + {} one-hot features",
            scaler.n_outputs(),
            encoder.n_outputs()
        );
        Ok(Preprocessor { scaler, encoder })
    }

    pub fn n_features(&self) -> usize {
        self.scaler.n_outputs() + self.encoder.n_outputs()
    }

    /// Feature vector for a single record.
    pub fn transform_record(&self, record: &Record) -> Result<Vec<f64>> {
        let mut out = vec![0.0; self.n_features()];
        let split = self.scaler.n_outputs();
        let (num, cat) = out.split_at_mut(split);
        self.scaler.transform_into(record, num)?;
        self.encoder.transform_into(record, cat)?;
        Ok(out)
    }

    /// Transform all records into an `(n_records, n_features)` matrix.
    pub fn transform(&self, records: &[Record]) -> Result<Array2<f64>> {
        let nfeat = self.n_features();
        let mut x = Array2::<f64>::zeros((records.len(), nfeat));
        for (r, record) in records.iter().enumerate() {
            let row = self.transform_record(record)?;
            for (c, v) in row.into_iter().enumerate() {
                x[(r, c)] = v;
            }
        }
        Ok(x)
    }

    /// Output feature names, `num__<col>` then `cat__<col>_<category>`.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .scaler
            .columns
            .iter()
            .map(|c| format!("num__{}", c))
            .collect();
        for (col, vocab) in self.encoder.columns.iter().zip(&self.encoder.categories) {
            names.extend(vocab.iter().map(|v| format!("cat__{}_{}", col, v)));
        }
        names
    }
}

fn category_position(vocab: &[String], value: &FieldValue) -> Option<usize> {
    match value {
        FieldValue::Number(n) => vocab
            .iter()
            .position(|c| c.trim().parse::<f64>().map_or(false, |v| v == *n)),
        FieldValue::Text(_) => vocab.binary_search(&value.as_category()).ok(),
    }
}

fn field<'a>(record: &'a Record, name: &str) -> Result<&'a FieldValue> {
    record
        .get(name)
        .ok_or_else(|| PipelineError::FieldMismatch(format!("missing field '{}'", name)))
}

fn numeric_field(record: &Record, name: &str) -> Result<f64> {
    field(record, name)?.as_number().ok_or_else(|| {
        PipelineError::FieldMismatch(format!("field '{}' expects a numeric value", name))
    })
}
