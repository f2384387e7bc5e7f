use linfa::traits::Fit;
use linfa::Dataset;
use linfa_logistic::MultiLogisticRegression;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::ClassifierModel;

/// Fitted softmax parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxWeights {
    /// Shape `(n_features, n_fitted_classes)`.
    pub coef: Array2<f64>,
    pub intercept: Array1<f64>,
    /// Class index of every coefficient column.
    pub classes: Vec<usize>,
    pub n_classes: usize,
}

/// Multinomial logistic regression fitted with `linfa-logistic`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    pub max_iterations: u64,
    pub alpha: f64,
    pub weights: Option<SoftmaxWeights>,
}

impl LogisticClassifier {
    pub fn new(max_iterations: u64, alpha: f64) -> Self {
        LogisticClassifier {
            max_iterations,
            alpha,
            weights: None,
        }
    }

    fn weights(&self) -> Result<&SoftmaxWeights> {
        self.weights
            .as_ref()
            .ok_or_else(|| PipelineError::Model("logistic regression is not fitted".to_string()))
    }
}

impl ClassifierModel for LogisticClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<()> {
        let dataset = Dataset::new(x.to_owned(), y.to_owned());

        let fitted = MultiLogisticRegression::<f64>::default()
            .max_iterations(self.max_iterations)
            .alpha(self.alpha)
            .fit(&dataset)
            .map_err(|e| PipelineError::Model(format!("logistic regression failed: {}", e)))?;

        let coef: Array2<f64> = fitted.params().to_owned();
        let intercept: Array1<f64> = fitted.intercept().to_owned();
        let classes: Vec<usize> = fitted.classes().to_vec();

        log::debug!(
            "Fitted logistic regression: {} features x {} classes",
            coef.nrows(),
            classes.len()
        );

        self.weights = Some(SoftmaxWeights {
            coef,
            intercept,
            classes,
            n_classes,
        });
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let w = self.weights()?;
        if x.ncols() != w.coef.nrows() {
            return Err(PipelineError::Model(format!(
                "expected {} features, got {}",
                w.coef.nrows(),
                x.ncols()
            )));
        }

        let logits = x.dot(&w.coef) + &w.intercept;
        let mut proba = Array2::<f64>::zeros((x.nrows(), w.n_classes));
        for (r, row) in logits.axis_iter(Axis(0)).enumerate() {
            let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let exp: Vec<f64> = row.iter().map(|&z| (z - max).exp()).collect();
            let total: f64 = exp.iter().sum();
            for (k, &class) in w.classes.iter().enumerate() {
                proba[(r, class)] = exp[k] / total;
            }
        }
        Ok(proba)
    }

    fn name(&self) -> &str {
        "LogisticRegression"
    }
}
