//! Benchmark driver
//!
//! Tunes each model family on a train/validation split, refits the best
//! configuration on the full training partition and reports the held-out
//! error profile as one table row per family.

use crate::data::train_test_split;
use crate::error::Result;
use crate::evaluate::Evaluator;
use crate::metrics::EvalMetrics;
use crate::models::ModelFamily;
use crate::scaler::TargetScaler;
use crate::search::{Direction, SamplerKind, Tuner, TunerConfig};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Configuration of a full benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Model families to tune and compare
    pub families: Vec<ModelFamily>,
    /// Trials per family
    pub n_trials: usize,
    /// Fraction held out for the final test evaluation
    pub test_fraction: f64,
    /// Fraction of the training partition held out for trial validation
    pub validation_fraction: f64,
    pub sampler: SamplerKind,
    pub seed: Option<u64>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            families: ModelFamily::all().to_vec(),
            n_trials: 50,
            test_fraction: 0.2,
            validation_fraction: 0.2,
            sampler: SamplerKind::Tpe,
            seed: Some(42),
        }
    }
}

impl BenchmarkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_families(mut self, families: Vec<ModelFamily>) -> Self {
        self.families = families;
        self
    }

    pub fn with_n_trials(mut self, n: usize) -> Self {
        self.n_trials = n;
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerKind) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Outcome of tuning and testing one family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyResult {
    pub family: ModelFamily,
    /// Row label in the report table
    pub label: String,
    /// Parameters of the best validation trial
    pub best_params: crate::search::TrialParams,
    /// Validation objective of the best trial
    pub best_validation_mae: f64,
    /// Held-out test metrics of the refit best configuration
    pub metrics: EvalMetrics,
    pub n_trials_run: usize,
    pub tuning_duration_secs: f64,
}

/// All per-family results of one benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub results: Vec<FamilyResult>,
}

impl BenchmarkReport {
    /// Look up one family's result by its enum value
    pub fn result_for(&self, family: ModelFamily) -> Option<&FamilyResult> {
        self.results.iter().find(|r| r.family == family)
    }

    /// Family with the lowest held-out MAE
    pub fn best_family(&self) -> Option<&FamilyResult> {
        self.results
            .iter()
            .min_by(|a, b| {
                a.metrics
                    .mae
                    .partial_cmp(&b.metrics.mae)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Assemble the results table: one row per family, one column per metric
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let labels: Vec<String> = self.results.iter().map(|r| r.label.clone()).collect();

        let mut columns: Vec<Column> = Vec::with_capacity(1 + EvalMetrics::NAMES.len());
        columns.push(Series::new("model".into(), labels).into());

        for (col_idx, name) in EvalMetrics::NAMES.iter().enumerate() {
            let values: Vec<f64> = self
                .results
                .iter()
                .map(|r| r.metrics.values()[col_idx])
                .collect();
            columns.push(Series::new((*name).into(), values).into());
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// Run the full benchmark over a dataset.
///
/// When a fitted scaler is given, targets are transformed before any model
/// sees them; all reported metrics are still in original units.
pub fn run_benchmark(
    x: &Array2<f64>,
    y: &Array1<f64>,
    scaler: Option<&TargetScaler>,
    config: &BenchmarkConfig,
) -> Result<BenchmarkReport> {
    let y_work = match scaler {
        Some(s) => s.transform(y)?,
        None => y.clone(),
    };

    let outer = train_test_split(x, &y_work, config.test_fraction, config.seed)?;
    let inner = train_test_split(
        &outer.x_train,
        &outer.y_train,
        config.validation_fraction,
        config.seed.map(|s| s.wrapping_add(1)),
    )?;

    info!(
        n_train = outer.n_train(),
        n_test = outer.n_test(),
        n_families = config.families.len(),
        "benchmark started"
    );

    let mut results = Vec::with_capacity(config.families.len());

    for (family_idx, &family) in config.families.iter().enumerate() {
        let family_seed = config.seed.map(|s| s.wrapping_add(family_idx as u64 * 1000));

        let mut evaluator = Evaluator::new(
            inner.x_train.clone(),
            inner.y_train.clone(),
            inner.x_test.clone(),
            inner.y_test.clone(),
        );
        if let Some(s) = scaler {
            evaluator = evaluator.with_scaler(s.clone());
        }
        if let Some(s) = family_seed {
            evaluator = evaluator.with_seed(s);
        }

        let tuner_config = TunerConfig::new()
            .with_n_trials(config.n_trials)
            .with_direction(Direction::Minimize)
            .with_sampler(config.sampler);
        let tuner_config = match family_seed {
            Some(s) => tuner_config.with_seed(s),
            None => tuner_config,
        };

        let mut tuner = Tuner::new(tuner_config, family.default_space());
        let study = tuner.optimize(evaluator.objective(family))?;

        let best_params = study
            .best_params()
            .cloned()
            .unwrap_or_default();
        let best_validation_mae = study.best_value().unwrap_or(f64::INFINITY);

        info!(
            family = family.name(),
            best_validation_mae,
            n_trials = study.trials.len(),
            "tuning finished, refitting on full training partition"
        );

        // Refit the winner on all training rows, score once on the test split
        let mut model = family.build(&best_params, family_seed)?;
        model.fit(&outer.x_train, &outer.y_train)?;
        let predictions = model.predict(&outer.x_test)?;

        let (truth, predictions) = match scaler {
            Some(s) => (
                s.inverse_transform(&outer.y_test)?,
                s.inverse_transform(&predictions)?,
            ),
            None => (outer.y_test.clone(), predictions),
        };
        let metrics = EvalMetrics::compute(&truth, &predictions)?;

        info!(family = family.name(), test_mae = metrics.mae, "family evaluated");

        results.push(FamilyResult {
            family,
            label: format!("{} Optimized", family.name()),
            best_params,
            best_validation_mae,
            metrics,
            n_trials_run: study.trials.len(),
            tuning_duration_secs: study.total_duration_secs,
        });
    }

    Ok(BenchmarkReport { results })
}
