use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::MaxFeatures;
use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::ClassifierModel;

/// Hyper-parameters of the bagged tree ensemble.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    pub min_samples_split: usize,
    pub max_features: MaxFeatures,
    pub seed: u64,
}

/// One bootstrap tree together with the feature columns it was grown on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForestTree {
    /// `None` when the tree sees every feature column.
    pub features: Option<Vec<usize>>,
    pub tree: DecisionTree<f64, usize>,
}

/// Random forest of Gini decision trees.
///
/// Every tree is grown on a bootstrap sample drawn from its own generator,
/// seeded from `params.seed` and the tree index, so fitting in parallel gives
/// the same ensemble as fitting sequentially.
///
/// The `max_features` column subset is drawn once per tree, not per split;
/// `linfa-trees` always considers every column it is given.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    pub params: ForestParams,
    pub n_classes: usize,
    pub trees: Vec<ForestTree>,
}

impl RandomForestClassifier {
    pub fn new(params: ForestParams) -> Self {
        RandomForestClassifier {
            params,
            n_classes: 0,
            trees: Vec::new(),
        }
    }

    fn tree_seed(&self, index: usize) -> u64 {
        self.params
            .seed
            .wrapping_mul(0x9E37_79B9_7F4A_7C15)
            .wrapping_add(index as u64)
    }

    fn fit_tree(&self, x: &Array2<f64>, y: &Array1<usize>, index: usize) -> Result<ForestTree> {
        let mut rng = StdRng::seed_from_u64(self.tree_seed(index));
        let n = x.nrows();
        let rows: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

        let ncols = x.ncols();
        let k = self.params.max_features.resolve(ncols);
        let features = if k < ncols {
            let mut cols = sample(&mut rng, ncols, k).into_vec();
            cols.sort_unstable();
            Some(cols)
        } else {
            None
        };

        let xs = x.select(Axis(0), &rows);
        let xs = match &features {
            Some(cols) => xs.select(Axis(1), cols),
            None => xs,
        };
        let ys = y.select(Axis(0), &rows);

        let tree = DecisionTree::<f64, usize>::params()
            .split_quality(SplitQuality::Gini)
            .max_depth(self.params.max_depth)
            .min_weight_split(self.params.min_samples_split as f32)
            .min_weight_leaf(self.params.min_samples_leaf as f32)
            .fit(&Dataset::new(xs, ys))
            .map_err(|e| PipelineError::Model(format!("decision tree {} failed: {}", index, e)))?;

        Ok(ForestTree { features, tree })
    }
}

impl ClassifierModel for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<()> {
        if x.nrows() == 0 {
            return Err(PipelineError::Model("cannot fit a forest on zero rows".to_string()));
        }

        let trees = (0..self.params.n_estimators)
            .into_par_iter()
            .map(|i| self.fit_tree(x, y, i))
            .collect::<Result<Vec<_>>>()?;

        log::trace!(
            "Grew {} trees (max_depth={:?}, min_samples_leaf={}, min_samples_split={})",
            trees.len(),
            self.params.max_depth,
            self.params.min_samples_leaf,
            self.params.min_samples_split
        );

        self.trees = trees;
        self.n_classes = n_classes;
        Ok(())
    }

    /// Fraction of trees voting for each class.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(PipelineError::Model("random forest is not fitted".to_string()));
        }

        let mut votes = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for member in &self.trees {
            let predictions: Array1<usize> = match &member.features {
                Some(cols) => member.tree.predict(&x.select(Axis(1), cols)),
                None => member.tree.predict(x),
            };
            for (r, &class) in predictions.iter().enumerate() {
                votes[(r, class)] += 1.0;
            }
        }

        votes /= self.trees.len() as f64;
        Ok(votes)
    }

    fn name(&self) -> &str {
        "RandomForest"
    }
}
