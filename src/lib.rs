//! regtune - regression model tuning benchmark
//!
//! Fits a fixed set of regression model families (random forest, epsilon-SVR,
//! Lasso), tunes each family's hyperparameters with sequential model-based
//! search, and reports a full error profile per family on a held-out test split.
//!
//! # Modules
//!
//! - [`data`] - train/test splitting over ndarray matrices
//! - [`scaler`] - optional invertible target transform
//! - [`models`] - regression model implementations behind the `Regressor` trait
//! - [`metrics`] - the eleven-statistic evaluation record
//! - [`search`] - search space, samplers and the trial loop
//! - [`evaluate`] - the trial objective: params -> fit -> predict -> metrics
//! - [`benchmark`] - the driver producing the per-family results table

pub mod error;

pub mod data;
pub mod scaler;
pub mod metrics;
pub mod models;
pub mod search;
pub mod evaluate;
pub mod benchmark;

pub use error::{RegtuneError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{RegtuneError, Result};

    pub use crate::data::{train_test_split, DatasetSplit};
    pub use crate::scaler::{ScalerKind, TargetScaler};
    pub use crate::metrics::EvalMetrics;
    pub use crate::models::{ModelFamily, Regressor};
    pub use crate::search::{
        Direction, Parameter, ParameterValue, SamplerKind, SearchSpace, Study, TrialParams, Tuner,
        TunerConfig,
    };
    pub use crate::evaluate::Evaluator;
    pub use crate::benchmark::{run_benchmark, BenchmarkConfig, BenchmarkReport};
}
