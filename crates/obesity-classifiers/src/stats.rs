//! Classification metrics: accuracy, per-class precision/recall/F1 and the
//! confusion matrix, in the conventions of a scikit-learn classification
//! report (zero division yields 0).
use std::fmt;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Fraction of matching labels.
///
/// # Panics
///
/// Panics if the arrays differ in length.
pub fn accuracy(y_true: &Array1<usize>, y_pred: &Array1<usize>) -> f64 {
    assert_eq!(
        y_true.len(),
        y_pred.len(),
        "accuracy requires labels of equal lengths"
    );
    if y_true.is_empty() {
        return 0.0;
    }
    let hits = y_true.iter().zip(y_pred.iter()).filter(|(t, p)| t == p).count();
    hits as f64 / y_true.len() as f64
}

/// Confusion matrix with true classes as rows and predicted classes as columns.
pub fn confusion_matrix(
    y_true: &Array1<usize>,
    y_pred: &Array1<usize>,
    n_classes: usize,
) -> Vec<Vec<usize>> {
    assert_eq!(
        y_true.len(),
        y_pred.len(),
        "confusion_matrix requires labels of equal lengths"
    );
    let mut cm = vec![vec![0usize; n_classes]; n_classes];
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        cm[t][p] += 1;
    }
    cm
}

/// Precision, recall, F1 and support of one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Unweighted or support-weighted average over classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub classes: Vec<ClassMetrics>,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub confusion_matrix: Vec<Vec<usize>>,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl ClassificationReport {
    pub fn new(y_true: &Array1<usize>, y_pred: &Array1<usize>, labels: &[String]) -> Self {
        let n_classes = labels.len();
        let cm = confusion_matrix(y_true, y_pred, n_classes);

        let classes: Vec<ClassMetrics> = (0..n_classes)
            .map(|k| {
                let tp = cm[k][k];
                let support: usize = cm[k].iter().sum();
                let predicted: usize = cm.iter().map(|row| row[k]).sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1_score = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label: labels[k].clone(),
                    precision,
                    recall,
                    f1_score,
                    support,
                }
            })
            .collect();

        let n = n_classes.max(1) as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
            f1_score: classes.iter().map(|c| c.f1_score).sum::<f64>() / n,
        };

        let total: usize = classes.iter().map(|c| c.support).sum();
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                classes.iter().map(|c| f(c) * c.support as f64).sum::<f64>() / total as f64
            }
        };
        let weighted_avg = AverageMetrics {
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1_score: weighted(|c| c.f1_score),
        };

        ClassificationReport {
            accuracy: accuracy(y_true, y_pred),
            classes,
            macro_avg,
            weighted_avg,
            confusion_matrix: cm,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.len())
            .max()
            .unwrap_or(0)
            .max(12);
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.label, c.precision, c.recall, c.f1_score, c.support
            )?;
        }
        let total: usize = self.classes.iter().map(|c| c.support).sum();
        writeln!(f)?;
        writeln!(f, "{:>width$} {:>29.2} {:>9}", "accuracy", self.accuracy, total)?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1_score, total
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Confusion matrix:")?;
        for row in &self.confusion_matrix {
            let cells: Vec<String> = row.iter().map(|v| format!("{:>5}", v)).collect();
            writeln!(f, "[{}]", cells.join(""))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    #[test]
    fn perfect_predictions() {
        let y = Array1::from_vec(vec![0, 1, 2, 1]);
        let report = ClassificationReport::new(&y, &y, &labels());
        assert_eq!(report.accuracy, 1.0);
        assert!(report.classes.iter().all(|c| c.f1_score == 1.0));
    }

    #[test]
    fn confusion_counts_rows_as_truth() {
        let t = Array1::from_vec(vec![0, 0, 1, 2]);
        let p = Array1::from_vec(vec![0, 1, 1, 1]);
        let cm = confusion_matrix(&t, &p, 3);
        assert_eq!(cm, vec![vec![1, 1, 0], vec![0, 1, 0], vec![0, 1, 0]]);
    }

    #[test]
    fn never_predicted_class_has_zero_precision() {
        let t = Array1::from_vec(vec![0, 0, 1, 2]);
        let p = Array1::from_vec(vec![0, 1, 1, 1]);
        let report = ClassificationReport::new(&t, &p, &labels());
        assert_eq!(report.classes[2].precision, 0.0);
        assert_eq!(report.classes[2].recall, 0.0);
        assert!((report.classes[1].precision - 1.0 / 3.0).abs() < 1e-12);
        assert!((report.accuracy - 0.5).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "equal lengths")]
    fn mismatched_lengths_panics() {
        let _ = accuracy(&Array1::from_vec(vec![0, 1]), &Array1::from_vec(vec![0]));
    }
}
