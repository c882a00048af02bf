//! Trial objective: build a model from sampled parameters, fit, predict and
//! score it on a validation split.

use crate::error::Result;
use crate::metrics::EvalMetrics;
use crate::models::ModelFamily;
use crate::scaler::TargetScaler;
use crate::search::TrialParams;
use ndarray::{Array1, Array2};
use tracing::debug;

/// Fits candidate configurations on one split and scores them on another.
///
/// When a target scaler is attached, the stored targets are assumed to be in
/// scaled space; metrics are always computed in original units by inverting
/// the transform on both truth and predictions.
pub struct Evaluator {
    x_fit: Array2<f64>,
    y_fit: Array1<f64>,
    x_val: Array2<f64>,
    y_val: Array1<f64>,
    scaler: Option<TargetScaler>,
    seed: Option<u64>,
}

impl Evaluator {
    pub fn new(
        x_fit: Array2<f64>,
        y_fit: Array1<f64>,
        x_val: Array2<f64>,
        y_val: Array1<f64>,
    ) -> Self {
        Self {
            x_fit,
            y_fit,
            x_val,
            y_val,
            scaler: None,
            seed: Some(42),
        }
    }

    /// Attach a fitted target scaler used to map predictions back to
    /// original units before scoring
    pub fn with_scaler(mut self, scaler: TargetScaler) -> Self {
        self.scaler = Some(scaler);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn n_fit(&self) -> usize {
        self.x_fit.nrows()
    }

    pub fn n_val(&self) -> usize {
        self.x_val.nrows()
    }

    /// Fit one configuration and compute the full metric record on the
    /// validation split
    pub fn evaluate(&self, family: ModelFamily, params: &TrialParams) -> Result<EvalMetrics> {
        let mut model = family.build(params, self.seed)?;
        model.fit(&self.x_fit, &self.y_fit)?;
        let predictions = model.predict(&self.x_val)?;

        let (truth, predictions) = match &self.scaler {
            Some(scaler) => (
                scaler.inverse_transform(&self.y_val)?,
                scaler.inverse_transform(&predictions)?,
            ),
            None => (self.y_val.clone(), predictions),
        };

        let metrics = EvalMetrics::compute(&truth, &predictions)?;
        debug!(family = family.name(), mae = metrics.mae, "configuration evaluated");
        Ok(metrics)
    }

    /// Objective closure for the tuner: mean absolute error, minimized
    pub fn objective(&self, family: ModelFamily) -> impl Fn(&TrialParams) -> Result<f64> + '_ {
        move |params| Ok(self.evaluate(family, params)?.mae)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaler::{ScalerKind, TargetScaler};
    use ndarray::{Array1, Array2};
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn synthetic(n: usize) -> (Array2<f64>, Array1<f64>) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let x = Array2::from_shape_fn((n, 2), |_| rng.gen::<f64>() * 10.0);
        let y = Array1::from_shape_fn(n, |i| 2.0 * x[[i, 0]] + 0.5 * x[[i, 1]] + 1.0);
        (x, y)
    }

    fn evaluator() -> Evaluator {
        let (x, y) = synthetic(60);
        let x_fit = x.slice(ndarray::s![..48, ..]).to_owned();
        let y_fit = y.slice(ndarray::s![..48]).to_owned();
        let x_val = x.slice(ndarray::s![48.., ..]).to_owned();
        let y_val = y.slice(ndarray::s![48..]).to_owned();
        Evaluator::new(x_fit, y_fit, x_val, y_val)
    }

    #[test]
    fn test_evaluate_lasso_defaults() {
        let eval = evaluator();
        let metrics = eval
            .evaluate(ModelFamily::Lasso, &TrialParams::new())
            .unwrap();

        assert_eq!(metrics.n_samples, 12);
        assert!(metrics.mae.is_finite());
        assert!(metrics.r2 <= 1.0);
    }

    #[test]
    fn test_objective_returns_mae() {
        let eval = evaluator();
        let params = TrialParams::new();

        let metrics = eval.evaluate(ModelFamily::Lasso, &params).unwrap();
        let objective = eval.objective(ModelFamily::Lasso);
        assert_eq!(objective(&params).unwrap(), metrics.mae);
    }

    #[test]
    fn test_identity_scaler_matches_unscaled() {
        let (x, y) = synthetic(60);
        let x_fit = x.slice(ndarray::s![..48, ..]).to_owned();
        let y_fit = y.slice(ndarray::s![..48]).to_owned();
        let x_val = x.slice(ndarray::s![48.., ..]).to_owned();
        let y_val = y.slice(ndarray::s![48..]).to_owned();

        let mut identity = TargetScaler::new(ScalerKind::None);
        identity.fit(&y_fit).unwrap();

        let plain = Evaluator::new(x_fit.clone(), y_fit.clone(), x_val.clone(), y_val.clone());
        let scaled = Evaluator::new(x_fit, y_fit, x_val, y_val).with_scaler(identity);

        let params = TrialParams::new();
        let a = plain.evaluate(ModelFamily::Lasso, &params).unwrap();
        let b = scaled.evaluate(ModelFamily::Lasso, &params).unwrap();

        assert_eq!(a.mae, b.mae);
        assert_eq!(a.r2, b.r2);
        assert_eq!(a.ks_p_value, b.ks_p_value);
    }

    #[test]
    fn test_invalid_params_propagate() {
        let eval = evaluator();
        let mut params = TrialParams::new();
        params.insert(
            "alpha".to_string(),
            crate::search::ParameterValue::Float(-5.0),
        );

        assert!(eval.evaluate(ModelFamily::Lasso, &params).is_err());
    }
}
