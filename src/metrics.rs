//! Regression evaluation metrics
//!
//! One `EvalMetrics` record is computed per trial from the raw error vector
//! (prediction - truth), including a Kolmogorov-Smirnov check of residual
//! normality.

use crate::error::{RegtuneError, Result};
use ndarray::Array1;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Floor applied to |truth| when computing relative errors, so that zero
/// targets never divide by zero.
pub const EPS: f64 = 1e-8;

/// Seed for the reference normal sample of the KS normality check. Fixed so
/// that identical inputs always produce identical metrics.
const KS_SEED: u64 = 0x5eed_cafe;

/// Error statistics for one evaluated configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalMetrics {
    /// Mean of (pred - truth)
    pub mean_error: f64,
    /// Population standard deviation of the errors
    pub std_error: f64,
    /// Largest absolute error
    pub max_error: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Mean absolute percentage error (relative to floored |truth|)
    pub mape: f64,
    /// Largest absolute percentage error
    pub max_ape: f64,
    /// Mean squared error
    pub mse: f64,
    /// Sum of squared errors
    pub sse: f64,
    /// Pearson correlation between truth and predictions
    pub pearson_r: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Two-sample KS p-value of the errors against Normal(mean, std)
    pub ks_p_value: f64,
    /// Number of evaluated samples
    pub n_samples: usize,
}

impl EvalMetrics {
    /// Metric column names, in report order
    pub const NAMES: [&'static str; 11] = [
        "mean_error",
        "std_error",
        "max_error",
        "mae",
        "mape",
        "max_ape",
        "mse",
        "sse",
        "pearson_r",
        "r2",
        "ks_p_value",
    ];

    /// Metric values in the same order as [`Self::NAMES`]
    pub fn values(&self) -> [f64; 11] {
        [
            self.mean_error,
            self.std_error,
            self.max_error,
            self.mae,
            self.mape,
            self.max_ape,
            self.mse,
            self.sse,
            self.pearson_r,
            self.r2,
            self.ks_p_value,
        ]
    }

    /// Name -> value map for table assembly
    pub fn as_map(&self) -> HashMap<String, f64> {
        Self::NAMES
            .iter()
            .zip(self.values())
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    /// Compute all metrics from aligned truth/prediction vectors
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        let n = y_true.len();
        if n == 0 {
            return Err(RegtuneError::ValidationError(
                "cannot compute metrics on empty vectors".to_string(),
            ));
        }
        if n != y_pred.len() {
            return Err(RegtuneError::ShapeError {
                expected: format!("predictions length = {}", n),
                actual: format!("predictions length = {}", y_pred.len()),
            });
        }

        let errors: Vec<f64> = y_pred
            .iter()
            .zip(y_true.iter())
            .map(|(p, t)| p - t)
            .collect();
        let relative: Vec<f64> = errors
            .iter()
            .zip(y_true.iter())
            .map(|(e, t)| e / t.abs().max(EPS))
            .collect();

        let nf = n as f64;
        let mean_error = errors.iter().sum::<f64>() / nf;
        let std_error =
            (errors.iter().map(|e| (e - mean_error).powi(2)).sum::<f64>() / nf).sqrt();
        let max_error = errors.iter().fold(0.0f64, |acc, e| acc.max(e.abs()));

        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / nf;
        let mape = relative.iter().map(|r| r.abs()).sum::<f64>() / nf;
        let max_ape = relative.iter().fold(0.0f64, |acc, r| acc.max(r.abs()));

        let sse = errors.iter().map(|e| e * e).sum::<f64>();
        let mse = sse / nf;

        let y_mean = y_true.sum() / nf;
        let ss_tot = y_true.iter().map(|y| (y - y_mean).powi(2)).sum::<f64>();
        let r2 = if sse == 0.0 {
            1.0
        } else if ss_tot == 0.0 {
            0.0
        } else {
            1.0 - sse / ss_tot
        };

        let pearson_r = pearson_correlation(y_true, y_pred);
        let ks_p_value = ks_normality_p_value(&errors, mean_error, std_error);

        Ok(Self {
            mean_error,
            std_error,
            max_error,
            mae,
            mape,
            max_ape,
            mse,
            sse,
            pearson_r,
            r2,
            ks_p_value,
            n_samples: n,
        })
    }
}

fn pearson_correlation(x: &Array1<f64>, y: &Array1<f64>) -> f64 {
    let n = x.len() as f64;
    if n < 2.0 {
        return 0.0;
    }

    let x_mean = x.mean().unwrap_or(0.0);
    let y_mean = y.mean().unwrap_or(0.0);

    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;

    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sum_xy += dx * dy;
        sum_x2 += dx * dx;
        sum_y2 += dy * dy;
    }

    let denom = (sum_x2 * sum_y2).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        sum_xy / denom
    }
}

/// Two-sample KS p-value of the error vector against a same-length sample
/// drawn from Normal(mean, std).
///
/// A zero-variance error vector is a point mass at its mean, which coincides
/// with its degenerate matching normal: p = 1.0.
fn ks_normality_p_value(errors: &[f64], mean: f64, std: f64) -> f64 {
    if errors.len() < 2 || std <= 0.0 {
        return 1.0;
    }

    // Normal::new only fails for non-finite or non-positive std, both excluded above
    let normal = match Normal::new(mean, std) {
        Ok(d) => d,
        Err(_) => return 1.0,
    };
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(KS_SEED);
    let reference: Vec<f64> = (0..errors.len()).map(|_| normal.sample(&mut rng)).collect();

    let statistic = ks_statistic(errors, &reference);

    let n1 = errors.len() as f64;
    let n2 = reference.len() as f64;
    let ne = n1 * n2 / (n1 + n2);
    let lambda = (ne.sqrt() + 0.12 + 0.11 / ne.sqrt()) * statistic;

    kolmogorov_survival(lambda)
}

/// Maximum absolute difference between the two empirical CDFs
fn ks_statistic(a: &[f64], b: &[f64]) -> f64 {
    let mut a_sorted = a.to_vec();
    let mut b_sorted = b.to_vec();
    a_sorted.sort_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));
    b_sorted.sort_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));

    let mut combined: Vec<f64> = a_sorted.iter().chain(b_sorted.iter()).copied().collect();
    combined.sort_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));
    combined.dedup();

    combined
        .iter()
        .map(|&x| (ecdf(&a_sorted, x) - ecdf(&b_sorted, x)).abs())
        .fold(0.0, f64::max)
}

fn ecdf(sorted_data: &[f64], x: f64) -> f64 {
    let count = sorted_data.iter().filter(|&&v| v <= x).count();
    count as f64 / sorted_data.len() as f64
}

/// Asymptotic Kolmogorov survival function Q(lambda) = 2 * sum (-1)^(k-1) exp(-2 k^2 lambda^2)
fn kolmogorov_survival(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }

    let mut sum = 0.0;
    let mut sign = 1.0;
    for k in 1..=100 {
        let term = (-2.0 * (k as f64).powi(2) * lambda * lambda).exp();
        sum += sign * term;
        sign = -sign;
        if term < 1e-12 {
            break;
        }
    }

    (2.0 * sum).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_perfect_predictions() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        let metrics = EvalMetrics::compute(&y, &y).unwrap();

        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.mse, 0.0);
        assert_eq!(metrics.max_error, 0.0);
        assert_eq!(metrics.r2, 1.0);
    }

    #[test]
    fn test_mse_equals_sse_over_n() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = array![1.2, 1.8, 3.3, 3.9, 5.4];
        let metrics = EvalMetrics::compute(&y_true, &y_pred).unwrap();

        assert!((metrics.mse - metrics.sse / 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_truth_does_not_divide_by_zero() {
        let y_true = array![0.0, 0.0, 1.0];
        let y_pred = array![1.0, -1.0, 1.5];
        let metrics = EvalMetrics::compute(&y_true, &y_pred).unwrap();

        assert!(metrics.mape.is_finite());
        assert!(metrics.max_ape.is_finite());
    }

    #[test]
    fn test_ks_p_value_in_unit_interval() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let y_pred = array![1.3, 1.8, 3.4, 3.7, 5.5, 5.8, 7.2, 8.4];
        let metrics = EvalMetrics::compute(&y_true, &y_pred).unwrap();

        assert!((0.0..=1.0).contains(&metrics.ks_p_value));
    }

    #[test]
    fn test_ks_p_value_constant_errors() {
        // Every error equals 2.0: zero variance, degenerate comparison
        let y_true = array![1.0, 2.0, 3.0];
        let y_pred = array![3.0, 4.0, 5.0];
        let metrics = EvalMetrics::compute(&y_true, &y_pred).unwrap();

        assert_eq!(metrics.ks_p_value, 1.0);
    }

    #[test]
    fn test_pearson_on_linear_relation() {
        let y_true = array![1.0, 2.0, 3.0, 4.0];
        let y_pred = array![2.0, 4.0, 6.0, 8.0];
        let metrics = EvalMetrics::compute(&y_true, &y_pred).unwrap();

        assert!((metrics.pearson_r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_constant_vector_is_zero() {
        let y_true = array![1.0, 2.0, 3.0];
        let y_pred = array![5.0, 5.0, 5.0];
        let metrics = EvalMetrics::compute(&y_true, &y_pred).unwrap();

        assert_eq!(metrics.pearson_r, 0.0);
    }

    #[test]
    fn test_metrics_deterministic() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = array![1.1, 2.3, 2.8, 4.2, 4.7];
        let a = EvalMetrics::compute(&y_true, &y_pred).unwrap();
        let b = EvalMetrics::compute(&y_true, &y_pred).unwrap();

        assert_eq!(a.values(), b.values());
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let y_true = array![1.0, 2.0];
        let y_pred = array![1.0];
        assert!(EvalMetrics::compute(&y_true, &y_pred).is_err());
    }

    #[test]
    fn test_as_map_has_all_metrics() {
        let y = array![1.0, 2.0, 3.0];
        let map = EvalMetrics::compute(&y, &y).unwrap().as_map();

        assert_eq!(map.len(), 11);
        for name in EvalMetrics::NAMES {
            assert!(map.contains_key(name), "missing metric {}", name);
        }
    }

    #[test]
    fn test_kolmogorov_survival_bounds() {
        assert_eq!(kolmogorov_survival(0.0), 1.0);
        assert!(kolmogorov_survival(0.3) > 0.99);
        assert!(kolmogorov_survival(3.0) < 1e-6);
    }
}
