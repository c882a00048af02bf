//! Metric record properties over realistic prediction vectors

use ndarray::{array, Array1};
use regtune::metrics::{EvalMetrics, EPS};

fn linear_case() -> (Array1<f64>, Array1<f64>) {
    let truth = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    let pred = array![1.1, 1.9, 3.2, 3.8, 5.3, 5.9, 7.1, 8.2];
    (truth, pred)
}

#[test]
fn perfect_predictions_hit_the_boundary_values() {
    let y = array![2.0, -1.0, 4.5, 0.0, 3.3, 7.0];
    let metrics = EvalMetrics::compute(&y, &y).unwrap();

    assert_eq!(metrics.mae, 0.0);
    assert_eq!(metrics.mse, 0.0);
    assert_eq!(metrics.sse, 0.0);
    assert_eq!(metrics.max_error, 0.0);
    assert_eq!(metrics.r2, 1.0);
    assert_eq!(metrics.ks_p_value, 1.0);
}

#[test]
fn mse_is_sse_over_n() {
    let (truth, pred) = linear_case();
    let metrics = EvalMetrics::compute(&truth, &pred).unwrap();

    let n = truth.len() as f64;
    assert!((metrics.mse - metrics.sse / n).abs() < 1e-12);
}

#[test]
fn std_error_is_population_std() {
    let (truth, pred) = linear_case();
    let metrics = EvalMetrics::compute(&truth, &pred).unwrap();

    let errors: Vec<f64> = pred.iter().zip(truth.iter()).map(|(p, t)| p - t).collect();
    let mean = errors.iter().sum::<f64>() / errors.len() as f64;
    let var = errors.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / errors.len() as f64;

    assert!((metrics.mean_error - mean).abs() < 1e-12);
    assert!((metrics.std_error - var.sqrt()).abs() < 1e-12);
}

#[test]
fn zero_targets_keep_percentage_errors_finite() {
    let truth = array![0.0, 0.0, 1.0, 2.0];
    let pred = array![0.5, -0.5, 1.1, 1.9];
    let metrics = EvalMetrics::compute(&truth, &pred).unwrap();

    assert!(metrics.mape.is_finite());
    assert!(metrics.max_ape.is_finite());
    // The floored denominator makes errors on zero targets enormous but finite
    assert!(metrics.max_ape >= 0.5 / EPS * 0.99);
}

#[test]
fn ks_p_value_stays_in_unit_interval() {
    let truth = Array1::from_shape_fn(200, |i| i as f64 * 0.1);
    let pred = Array1::from_shape_fn(200, |i| i as f64 * 0.1 + ((i * 7 % 13) as f64 - 6.0) * 0.05);
    let metrics = EvalMetrics::compute(&truth, &pred).unwrap();

    assert!((0.0..=1.0).contains(&metrics.ks_p_value));
}

#[test]
fn constant_errors_give_p_value_one() {
    let truth = array![1.0, 2.0, 3.0, 4.0];
    let pred = array![2.0, 3.0, 4.0, 5.0]; // every error is exactly 1.0
    let metrics = EvalMetrics::compute(&truth, &pred).unwrap();

    assert_eq!(metrics.std_error, 0.0);
    assert_eq!(metrics.ks_p_value, 1.0);
}

#[test]
fn identical_inputs_give_identical_records() {
    let (truth, pred) = linear_case();

    let a = EvalMetrics::compute(&truth, &pred).unwrap();
    let b = EvalMetrics::compute(&truth, &pred).unwrap();

    assert_eq!(a.values(), b.values());
}

#[test]
fn anticorrelated_predictions_have_negative_pearson() {
    let truth = array![1.0, 2.0, 3.0, 4.0, 5.0];
    let pred = array![5.0, 4.0, 3.0, 2.0, 1.0];
    let metrics = EvalMetrics::compute(&truth, &pred).unwrap();

    assert!((metrics.pearson_r + 1.0).abs() < 1e-10);
    assert!(metrics.r2 < 0.0);
}

#[test]
fn mismatched_lengths_are_rejected() {
    let truth = array![1.0, 2.0];
    let pred = array![1.0, 2.0, 3.0];
    assert!(EvalMetrics::compute(&truth, &pred).is_err());
}

#[test]
fn empty_vectors_are_rejected() {
    let empty = Array1::<f64>::zeros(0);
    assert!(EvalMetrics::compute(&empty, &empty).is_err());
}

#[test]
fn metric_map_covers_all_names() {
    let (truth, pred) = linear_case();
    let metrics = EvalMetrics::compute(&truth, &pred).unwrap();
    let map = metrics.as_map();

    assert_eq!(map.len(), EvalMetrics::NAMES.len());
    for name in EvalMetrics::NAMES {
        assert!(map.contains_key(name), "missing metric {}", name);
    }
}
