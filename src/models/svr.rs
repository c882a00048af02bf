//! Support vector regression

use super::Regressor;
use crate::error::{RegtuneError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Kernel matrix is materialized eagerly; cap the training set size
const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Kernel functions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Kernel {
    Linear,
    Rbf { gamma: f64 },
    Polynomial { degree: u32, coef0: f64 },
}

impl Kernel {
    fn compute(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match self {
            Kernel::Linear => a.dot(&b),
            Kernel::Rbf { gamma } => {
                let mut sq_dist = 0.0;
                for (va, vb) in a.iter().zip(b.iter()) {
                    let d = va - vb;
                    sq_dist += d * d;
                }
                (-gamma * sq_dist).exp()
            }
            Kernel::Polynomial { degree, coef0 } => (a.dot(&b) + coef0).powi(*degree as i32),
        }
    }
}

/// SVR training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvrConfig {
    /// Regularization strength
    pub c: f64,
    /// Width of the epsilon-insensitive tube
    pub epsilon: f64,
    pub kernel: Kernel,
    pub learning_rate: f64,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for SvrConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epsilon: 0.1,
            kernel: Kernel::Rbf { gamma: 1.0 },
            learning_rate: 0.01,
            max_iter: 200,
            tol: 1e-4,
        }
    }
}

impl SvrConfig {
    fn validate(&self) -> Result<()> {
        if self.c <= 0.0 {
            return Err(RegtuneError::InvalidParameter {
                name: "c".to_string(),
                value: self.c.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.epsilon < 0.0 {
            return Err(RegtuneError::InvalidParameter {
                name: "epsilon".to_string(),
                value: self.epsilon.to_string(),
                reason: "must be non-negative".to_string(),
            });
        }
        if let Kernel::Rbf { gamma } = self.kernel {
            if gamma <= 0.0 {
                return Err(RegtuneError::InvalidParameter {
                    name: "gamma".to_string(),
                    value: gamma.to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Epsilon-insensitive support vector regressor trained by gradient updates
/// on the dual coefficients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvrRegressor {
    config: SvrConfig,
    support_vectors: Array2<f64>,
    dual_coefs: Array1<f64>,
    bias: f64,
    is_fitted: bool,
}

impl SvrRegressor {
    pub fn new(config: SvrConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            support_vectors: Array2::zeros((0, 0)),
            dual_coefs: Array1::zeros(0),
            bias: 0.0,
            is_fitted: false,
        })
    }

    pub fn config(&self) -> &SvrConfig {
        &self.config
    }

    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.nrows()
    }

    fn kernel_matrix(&self, x: &Array2<f64>) -> Array2<f64> {
        let n = x.nrows();
        let mut k = Array2::zeros((n, n));
        for i in 0..n {
            for j in i..n {
                let val = self.config.kernel.compute(x.row(i), x.row(j));
                k[[i, j]] = val;
                k[[j, i]] = val;
            }
        }
        k
    }
}

impl Regressor for SvrRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(RegtuneError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(RegtuneError::DataError(
                "cannot fit SVR on empty data".to_string(),
            ));
        }
        if n_samples > MAX_KERNEL_MATRIX_SAMPLES {
            return Err(RegtuneError::TrainingError(format!(
                "training set of {} samples exceeds kernel matrix limit of {}",
                n_samples, MAX_KERNEL_MATRIX_SAMPLES
            )));
        }

        let k = self.kernel_matrix(x);

        let mut alphas = Array1::<f64>::zeros(n_samples);
        let mut alphas_star = Array1::<f64>::zeros(n_samples);
        let mut bias = 0.0f64;
        let lr = self.config.learning_rate;

        for _ in 0..self.config.max_iter {
            let mut max_change = 0.0f64;

            for i in 0..n_samples {
                let mut prediction = bias;
                for j in 0..n_samples {
                    prediction += (alphas[j] - alphas_star[j]) * k[[i, j]];
                }

                let error = prediction - y[i];

                let (new_alpha, new_alpha_star) = if error > self.config.epsilon {
                    (
                        alphas[i],
                        (alphas_star[i] + lr * (error - self.config.epsilon))
                            .clamp(0.0, self.config.c),
                    )
                } else if error < -self.config.epsilon {
                    (
                        (alphas[i] + lr * (-error - self.config.epsilon))
                            .clamp(0.0, self.config.c),
                        alphas_star[i],
                    )
                } else {
                    (alphas[i], alphas_star[i])
                };

                max_change = max_change
                    .max((new_alpha - alphas[i]).abs())
                    .max((new_alpha_star - alphas_star[i]).abs());

                alphas[i] = new_alpha;
                alphas_star[i] = new_alpha_star;
                bias -= lr * 0.1 * error;
            }

            if max_change < self.config.tol {
                break;
            }
        }

        // Keep only the points with non-negligible dual weight
        let coefs: Vec<f64> = (0..n_samples).map(|i| alphas[i] - alphas_star[i]).collect();
        let sv_indices: Vec<usize> = coefs
            .iter()
            .enumerate()
            .filter(|(_, &c)| c.abs() > 1e-8)
            .map(|(i, _)| i)
            .collect();

        if sv_indices.is_empty() {
            // Flat target within the tube; keep every point so predict works
            self.support_vectors = x.clone();
            self.dual_coefs = Array1::from_vec(coefs);
        } else {
            self.support_vectors = x.select(ndarray::Axis(0), &sv_indices);
            self.dual_coefs = Array1::from_vec(sv_indices.iter().map(|&i| coefs[i]).collect());
        }
        self.bias = bias;
        self.is_fitted = true;

        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(RegtuneError::ModelNotFitted);
        }

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let mut value = self.bias;
                for j in 0..self.support_vectors.nrows() {
                    value += self.dual_coefs[j]
                        * self.config.kernel.compute(x.row(i), self.support_vectors.row(j));
                }
                value
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_rejects_bad_config() {
        let bad_c = SvrConfig {
            c: 0.0,
            ..Default::default()
        };
        assert!(SvrRegressor::new(bad_c).is_err());

        let bad_gamma = SvrConfig {
            kernel: Kernel::Rbf { gamma: -1.0 },
            ..Default::default()
        };
        assert!(SvrRegressor::new(bad_gamma).is_err());
    }

    #[test]
    fn test_fits_simple_function() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];

        let config = SvrConfig {
            c: 10.0,
            epsilon: 0.01,
            kernel: Kernel::Rbf { gamma: 0.5 },
            max_iter: 500,
            ..Default::default()
        };
        let mut model = SvrRegressor::new(config).unwrap();
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();
        let mae: f64 = predictions
            .iter()
            .zip(y.iter())
            .map(|(p, a)| (p - a).abs())
            .sum::<f64>()
            / y.len() as f64;
        assert!(mae < 1.5, "MAE too high: {}", mae);
    }

    #[test]
    fn test_linear_kernel() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let config = SvrConfig {
            c: 5.0,
            epsilon: 0.1,
            kernel: Kernel::Linear,
            max_iter: 300,
            ..Default::default()
        };
        let mut model = SvrRegressor::new(config).unwrap();
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();
        assert_eq!(predictions.len(), 4);
        assert!(predictions.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_unfitted_predict_errors() {
        let model = SvrRegressor::new(SvrConfig::default()).unwrap();
        assert!(model.predict(&array![[1.0]]).is_err());
    }
}
