//! Regression tree

use crate::error::{RegtuneError, Result};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Node of a fitted regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf with the mean target of its samples
    Leaf { value: f64, n_samples: usize },
    /// Internal split on one feature
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

/// CART-style regression tree using variance reduction for splits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of leading features scanned per split (all when `None`)
    pub max_features: Option<usize>,
    n_features: usize,
}

impl Default for RegressionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RegressionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            n_features: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(RegtuneError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(RegtuneError::DataError(
                "cannot fit tree on empty data".to_string(),
            ));
        }

        self.n_features = x.ncols();
        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_node(x, y, &indices, 0));

        Ok(self)
    }

    fn build_node(&self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize], depth: usize) -> TreeNode {
        let n_samples = indices.len();
        let y_subset: Vec<f64> = indices.iter().map(|&i| y[i]).collect();

        let should_stop = n_samples < self.min_samples_split
            || n_samples <= self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || is_pure(&y_subset);

        if should_stop {
            return TreeNode::Leaf {
                value: mean(&y_subset),
                n_samples,
            };
        }

        if let Some((feature_idx, threshold)) = self.find_best_split(x, y, indices) {
            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| x[[i, feature_idx]] <= threshold);

            if left_indices.len() < self.min_samples_leaf
                || right_indices.len() < self.min_samples_leaf
            {
                return TreeNode::Leaf {
                    value: mean(&y_subset),
                    n_samples,
                };
            }

            let left = Box::new(self.build_node(x, y, &left_indices, depth + 1));
            let right = Box::new(self.build_node(x, y, &right_indices, depth + 1));

            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
                n_samples,
            }
        } else {
            TreeNode::Leaf {
                value: mean(&y_subset),
                n_samples,
            }
        }
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
    ) -> Option<(usize, f64)> {
        let n_features = x.ncols();
        let n_features_to_try = self.max_features.unwrap_or(n_features).min(n_features);

        let y_subset: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
        let parent_impurity = variance(&y_subset);

        // Each feature independently finds its best threshold
        let feature_results: Vec<Option<(usize, f64, f64)>> = (0..n_features_to_try)
            .into_par_iter()
            .map(|feature_idx| {
                let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
                values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                values.dedup();

                let mut best_gain = 0.0f64;
                let mut best_threshold = 0.0f64;

                for window in values.windows(2) {
                    let threshold = (window[0] + window[1]) / 2.0;

                    // Variance from running sums: var = sq_sum/n - (sum/n)^2
                    let mut left_count = 0usize;
                    let mut right_count = 0usize;
                    let mut left_sum = 0.0f64;
                    let mut right_sum = 0.0f64;
                    let mut left_sq_sum = 0.0f64;
                    let mut right_sq_sum = 0.0f64;

                    for &idx in indices {
                        let yi = y[idx];
                        if x[[idx, feature_idx]] <= threshold {
                            left_count += 1;
                            left_sum += yi;
                            left_sq_sum += yi * yi;
                        } else {
                            right_count += 1;
                            right_sum += yi;
                            right_sq_sum += yi * yi;
                        }
                    }

                    if left_count < self.min_samples_leaf || right_count < self.min_samples_leaf {
                        continue;
                    }

                    let left_var = left_sq_sum / left_count as f64
                        - (left_sum / left_count as f64).powi(2);
                    let right_var = right_sq_sum / right_count as f64
                        - (right_sum / right_count as f64).powi(2);

                    let n = indices.len() as f64;
                    let weighted =
                        (left_count as f64 * left_var + right_count as f64 * right_var) / n;

                    let gain = parent_impurity - weighted;
                    if gain > best_gain {
                        best_gain = gain;
                        best_threshold = threshold;
                    }
                }

                if best_gain > 0.0 {
                    Some((feature_idx, best_threshold, best_gain))
                } else {
                    None
                }
            })
            .collect();

        feature_results
            .into_iter()
            .flatten()
            .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(feature_idx, threshold, _)| (feature_idx, threshold))
    }

    /// Predict target values
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(RegtuneError::ModelNotFitted)?;

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| predict_sample(root, &x.row(i).to_vec()))
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Depth of the fitted tree
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, node_depth)
    }
}

fn predict_sample(node: &TreeNode, sample: &[f64]) -> f64 {
    match node {
        TreeNode::Leaf { value, .. } => *value,
        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            ..
        } => {
            if sample[*feature_idx] <= *threshold {
                predict_sample(left, sample)
            } else {
                predict_sample(right, sample)
            }
        }
    }
}

fn node_depth(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 1,
        TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
    }
}

fn mean(y: &[f64]) -> f64 {
    if y.is_empty() {
        0.0
    } else {
        y.iter().sum::<f64>() / y.len() as f64
    }
}

fn variance(y: &[f64]) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    let m = mean(y);
    y.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / y.len() as f64
}

fn is_pure(y: &[f64]) -> bool {
    if y.is_empty() {
        return true;
    }
    let first = y[0];
    y.iter().all(|&v| (v - first).abs() < 1e-10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fits_linear_data() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];

        let mut tree = RegressionTree::new();
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        let mse: f64 = predictions
            .iter()
            .zip(y.iter())
            .map(|(p, a)| (p - a).powi(2))
            .sum::<f64>()
            / y.len() as f64;

        assert!(mse < 1.0, "MSE too high: {}", mse);
    }

    #[test]
    fn test_max_depth_respected() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];

        let mut tree = RegressionTree::new().with_max_depth(2);
        tree.fit(&x, &y).unwrap();

        assert!(tree.depth() <= 3); // root split + one level + leaves
    }

    #[test]
    fn test_constant_target_yields_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![5.0, 5.0, 5.0];

        let mut tree = RegressionTree::new();
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        assert!(predictions.iter().all(|&p| (p - 5.0).abs() < 1e-10));
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_unfitted_predict_errors() {
        let tree = RegressionTree::new();
        assert!(tree.predict(&array![[1.0]]).is_err());
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0, 3.0];
        let mut tree = RegressionTree::new();
        assert!(tree.fit(&x, &y).is_err());
    }
}
