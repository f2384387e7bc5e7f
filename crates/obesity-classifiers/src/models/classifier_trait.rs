use ndarray::{Array1, Array2, Axis};

use crate::error::Result;

/// Contract shared by the candidate classifiers.
///
/// Labels are class indices in `0..n_classes`; probability matrices have one
/// column per class in that order.
pub trait ClassifierModel {
    /// Fit the model on preprocessed features.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<()>;

    /// Per-class probabilities, shape `(n_samples, n_classes)`; rows sum to 1.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Most probable class per row. Ties resolve to the lowest class index.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .axis_iter(Axis(0))
            .map(|row| argmax(row.iter().copied()))
            .collect())
    }

    /// Whether `predict_proba` yields calibrated class probabilities.
    fn supports_proba(&self) -> bool {
        true
    }

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

pub(crate) fn argmax<I: Iterator<Item = f64>>(values: I) -> usize {
    let mut best = 0;
    let mut best_val = f64::NEG_INFINITY;
    for (i, v) in values.enumerate() {
        if v > best_val {
            best_val = v;
            best = i;
        }
    }
    best
}
