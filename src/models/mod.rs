//! Regression model implementations
//!
//! Each tunable family lives behind the [`Regressor`] trait and is built from
//! sampled trial parameters by [`ModelFamily::build`].

pub mod forest;
pub mod linear;
pub mod svr;
pub mod tree;

pub use forest::RandomForestRegressor;
pub use linear::LassoRegressor;
pub use svr::{Kernel, SvrConfig, SvrRegressor};
pub use tree::RegressionTree;

use crate::error::Result;
use crate::search::{SearchSpace, TrialParams};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Trait for regression models
pub trait Regressor: Send {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict target values
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

/// Tunable model families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelFamily {
    RandomForest,
    Svr,
    Lasso,
}

impl ModelFamily {
    /// All benchmarked families
    pub fn all() -> [ModelFamily; 3] {
        [ModelFamily::RandomForest, ModelFamily::Svr, ModelFamily::Lasso]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelFamily::RandomForest => "RandomForest",
            ModelFamily::Svr => "SVR",
            ModelFamily::Lasso => "Lasso",
        }
    }

    /// Default hyperparameter bounds for this family
    pub fn default_space(&self) -> SearchSpace {
        match self {
            ModelFamily::RandomForest => SearchSpace::new()
                .int("n_estimators", 10, 200)
                .int("max_depth", 2, 20)
                .int("min_samples_split", 2, 10),
            ModelFamily::Svr => SearchSpace::new()
                .log_float("c", 1e-2, 1e2)
                .log_float("epsilon", 1e-3, 1.0)
                .log_float("gamma", 1e-3, 10.0),
            ModelFamily::Lasso => SearchSpace::new()
                .log_float("alpha", 1e-4, 10.0)
                .int("max_iter", 200, 2000),
        }
    }

    /// Build an unfitted model from sampled trial parameters.
    ///
    /// Missing parameters fall back to family defaults; invalid values surface
    /// as `InvalidParameter` from the constructors.
    pub fn build(&self, params: &TrialParams, seed: Option<u64>) -> Result<Box<dyn Regressor>> {
        match self {
            ModelFamily::RandomForest => {
                let n_estimators = params
                    .get("n_estimators")
                    .and_then(|v| v.as_usize())
                    .unwrap_or(100);
                let max_depth = params.get("max_depth").and_then(|v| v.as_usize());
                let min_samples_split = params
                    .get("min_samples_split")
                    .and_then(|v| v.as_usize())
                    .unwrap_or(2);

                let mut model = RandomForestRegressor::new(n_estimators)?
                    .with_min_samples_split(min_samples_split);
                if let Some(depth) = max_depth {
                    model = model.with_max_depth(depth);
                }
                if let Some(s) = seed {
                    model = model.with_seed(s);
                }
                Ok(Box::new(model))
            }
            ModelFamily::Svr => {
                let c = params.get("c").and_then(|v| v.as_float()).unwrap_or(1.0);
                let epsilon = params
                    .get("epsilon")
                    .and_then(|v| v.as_float())
                    .unwrap_or(0.1);
                let gamma = params
                    .get("gamma")
                    .and_then(|v| v.as_float())
                    .unwrap_or(1.0);

                let config = SvrConfig {
                    c,
                    epsilon,
                    kernel: Kernel::Rbf { gamma },
                    ..Default::default()
                };
                Ok(Box::new(SvrRegressor::new(config)?))
            }
            ModelFamily::Lasso => {
                let alpha = params
                    .get("alpha")
                    .and_then(|v| v.as_float())
                    .unwrap_or(1.0);
                let max_iter = params
                    .get("max_iter")
                    .and_then(|v| v.as_usize())
                    .unwrap_or(1000);

                Ok(Box::new(LassoRegressor::new(alpha)?.with_max_iter(max_iter)))
            }
        }
    }
}
