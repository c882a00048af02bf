//! L1-regularized linear regression

use super::Regressor;
use crate::error::{RegtuneError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Lasso regression fit by coordinate descent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LassoRegressor {
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub fit_intercept: bool,
    weights: Array1<f64>,
    intercept: f64,
    is_fitted: bool,
}

impl LassoRegressor {
    pub fn new(alpha: f64) -> Result<Self> {
        if alpha < 0.0 || !alpha.is_finite() {
            return Err(RegtuneError::InvalidParameter {
                name: "alpha".to_string(),
                value: alpha.to_string(),
                reason: "must be finite and non-negative".to_string(),
            });
        }

        Ok(Self {
            alpha,
            max_iter: 1000,
            tol: 1e-4,
            fit_intercept: true,
            weights: Array1::zeros(0),
            intercept: 0.0,
            is_fitted: false,
        })
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Count of non-zero coefficients
    pub fn n_active(&self) -> usize {
        self.weights.iter().filter(|w| w.abs() > 1e-12).count()
    }
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

impl Regressor for LassoRegressor {
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
                "cannot fit lasso on empty data".to_string(),
            ));
        }

        let (x_centered, x_mean, y_centered, y_mean) = if self.fit_intercept {
            let x_mean = x.mean_axis(Axis(0)).ok_or_else(|| {
                RegtuneError::ComputationError("failed to compute feature means".to_string())
            })?;
            let y_mean = y.mean().unwrap_or(0.0);
            (x - &x_mean, x_mean, y - y_mean, y_mean)
        } else {
            (x.clone(), Array1::zeros(n_features), y.clone(), 0.0)
        };

        let col_norms: Vec<f64> = (0..n_features)
            .map(|j| x_centered.column(j).mapv(|v| v * v).sum())
            .collect();

        let lambda = self.alpha * n_samples as f64;
        let mut weights = Array1::<f64>::zeros(n_features);
        let mut residual = y_centered.clone();

        for _ in 0..self.max_iter {
            let mut max_change = 0.0f64;

            for j in 0..n_features {
                if col_norms[j] < 1e-12 {
                    continue;
                }

                let old_weight = weights[j];
                let col = x_centered.column(j);

                // rho = x_j . (residual + w_j * x_j)
                let rho = col.dot(&residual) + old_weight * col_norms[j];
                let new_weight = soft_threshold(rho, lambda) / col_norms[j];

                if new_weight != old_weight {
                    let delta = new_weight - old_weight;
                    residual.zip_mut_with(&col, |r, &xv| *r -= delta * xv);
                    weights[j] = new_weight;
                    max_change = max_change.max(delta.abs());
                }
            }

            if max_change < self.tol {
                break;
            }
        }

        self.intercept = if self.fit_intercept {
            y_mean - weights.dot(&x_mean)
        } else {
            0.0
        };
        self.weights = weights;
        self.is_fitted = true;

        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(RegtuneError::ModelNotFitted);
        }
        if x.ncols() != self.weights.len() {
            return Err(RegtuneError::ShapeError {
                expected: format!("{} features", self.weights.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok(x.dot(&self.weights) + self.intercept)
    }
}
