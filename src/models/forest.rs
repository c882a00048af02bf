//! Random forest regressor

use super::tree::RegressionTree;
use super::Regressor;
use crate::error::{RegtuneError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bagged ensemble of regression trees, averaged predictions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; sqrt(n_features) when `None`
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    seed: u64,
    is_fitted: bool,
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize) -> Result<Self> {
        if n_estimators == 0 {
            return Err(RegtuneError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
            is_fitted: false,
        })
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn bootstrap_indices(rng: &mut ChaCha8Rng, n_samples: usize) -> Vec<usize> {
        (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
    }
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(RegtuneError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(RegtuneError::DataError(
                "cannot fit forest on empty data".to_string(),
            ));
        }

        let max_features = self
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize)
            .clamp(1, n_features);

        let base_seed = self.seed;
        let max_depth = self.max_depth;
        let min_samples_split = self.min_samples_split;
        let min_samples_leaf = self.min_samples_leaf;
        let bootstrap = self.bootstrap;

        let trees: Vec<Result<RegressionTree>> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));

                let (x_boot, y_boot) = if bootstrap {
                    let indices = Self::bootstrap_indices(&mut rng, n_samples);
                    let x_sel = x.select(Axis(0), &indices);
                    let y_sel = Array1::from_vec(indices.iter().map(|&i| y[i]).collect());
                    (x_sel, y_sel)
                } else {
                    (x.clone(), y.clone())
                };

                let mut tree = RegressionTree::new()
                    .with_min_samples_split(min_samples_split)
                    .with_min_samples_leaf(min_samples_leaf)
                    .with_max_features(max_features);
                if let Some(depth) = max_depth {
                    tree = tree.with_max_depth(depth);
                }

                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect();

        self.trees = trees.into_iter().collect::<Result<Vec<_>>>()?;
        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(RegtuneError::ModelNotFitted);
        }

        let per_tree: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let mut summed = Array1::<f64>::zeros(x.nrows());
        for preds in &per_tree {
            summed += preds;
        }
        summed /= self.trees.len() as f64;

        Ok(summed)
    }
}
