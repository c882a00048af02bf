//! Trial loop and study bookkeeping

use super::samplers::{create_sampler, Sampler, SamplerKind};
use super::space::{SearchSpace, TrialParams};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    Minimize,
    Maximize,
}

impl Direction {
    fn worst(&self) -> f64 {
        match self {
            Direction::Minimize => f64::INFINITY,
            Direction::Maximize => f64::NEG_INFINITY,
        }
    }

    fn is_better(&self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Direction::Minimize => candidate < incumbent,
            Direction::Maximize => candidate > incumbent,
        }
    }
}

/// Configuration for a tuning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TunerConfig {
    /// Number of trials to run
    pub n_trials: usize,
    /// Optimization direction
    pub direction: Direction,
    /// Sampler type
    pub sampler: SamplerKind,
    /// Random startup trials before the sampler models the history
    pub n_startup_trials: usize,
    /// Random seed
    pub seed: Option<u64>,
    /// Optional wall-clock budget in seconds
    pub timeout_secs: Option<f64>,
    /// Optional early stopping after this many trials without improvement
    pub patience: Option<usize>,
    /// Minimum change counted as an improvement
    pub min_improvement: f64,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            n_trials: 50,
            direction: Direction::Minimize,
            sampler: SamplerKind::Tpe,
            n_startup_trials: 10,
            seed: Some(42),
            timeout_secs: None,
            patience: None,
            min_improvement: 1e-9,
        }
    }
}

impl TunerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_trials(mut self, n: usize) -> Self {
        self.n_trials = n;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
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

    pub fn with_timeout(mut self, secs: f64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_patience(mut self, patience: usize) -> Self {
        self.patience = Some(patience);
        self
    }
}

/// Result of a single trial
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialOutcome {
    /// Trial number
    pub trial_id: usize,
    /// Parameters evaluated
    pub params: TrialParams,
    /// Objective value (worst value of the direction when failed)
    pub value: f64,
    /// Trial duration in seconds
    pub duration_secs: f64,
    /// Whether the objective returned an error for this trial
    pub failed: bool,
}

/// All trials of one tuning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Study {
    pub trials: Vec<TrialOutcome>,
    pub best_trial_idx: Option<usize>,
    pub total_duration_secs: f64,
    pub direction: Direction,
}

impl Study {
    pub fn new(direction: Direction) -> Self {
        Self {
            trials: Vec::new(),
            best_trial_idx: None,
            total_duration_secs: 0.0,
            direction,
        }
    }

    pub fn best_trial(&self) -> Option<&TrialOutcome> {
        self.best_trial_idx.map(|idx| &self.trials[idx])
    }

    pub fn best_value(&self) -> Option<f64> {
        self.best_trial().map(|t| t.value)
    }

    pub fn best_params(&self) -> Option<&TrialParams> {
        self.best_trial().map(|t| &t.params)
    }

    /// Record a trial; failed trials never become the best
    pub fn add_trial(&mut self, outcome: TrialOutcome) {
        let idx = self.trials.len();

        let is_better = match self.best_trial_idx {
            None => true,
            Some(best_idx) => self
                .direction
                .is_better(outcome.value, self.trials[best_idx].value),
        };

        if is_better && !outcome.failed {
            self.best_trial_idx = Some(idx);
        }

        self.trials.push(outcome);
    }
}

/// Sequential hyperparameter tuner.
///
/// Every trial's parameters come from the sampler's suggestion API against the
/// declared search space; a failing objective is penalized with the direction's
/// worst value and the run continues.
pub struct Tuner {
    config: TunerConfig,
    space: SearchSpace,
    sampler: Box<dyn Sampler>,
    study: Study,
}

impl Tuner {
    pub fn new(config: TunerConfig, space: SearchSpace) -> Self {
        let sampler = create_sampler(config.sampler, config.n_startup_trials, config.seed);
        let study = Study::new(config.direction);

        Self {
            config,
            space,
            sampler,
            study,
        }
    }

    /// Run the trial loop against an objective function
    pub fn optimize<F>(&mut self, objective: F) -> Result<&Study>
    where
        F: Fn(&TrialParams) -> Result<f64>,
    {
        let start = Instant::now();
        let mut trials_without_improvement = 0usize;
        // History for the sampler, kept in minimize orientation
        let mut history: Vec<(TrialParams, f64)> = Vec::new();

        for trial_id in 0..self.config.n_trials {
            if let Some(t) = self.config.timeout_secs {
                if start.elapsed().as_secs_f64() > t {
                    info!(trial_id, "tuning timeout reached");
                    break;
                }
            }
            if let Some(p) = self.config.patience {
                if trials_without_improvement >= p {
                    info!(patience = p, "early stopping: no improvement");
                    break;
                }
            }

            let trial_start = Instant::now();
            let params = self.sampler.sample(&self.space, &history);

            let outcome = match objective(&params) {
                Ok(value) => {
                    let oriented = match self.config.direction {
                        Direction::Minimize => value,
                        Direction::Maximize => -value,
                    };
                    history.push((params.clone(), oriented));

                    let improved = match self.study.best_value() {
                        None => true,
                        Some(best) => self
                            .config
                            .direction
                            .is_better(value, best)
                            && (value - best).abs() > self.config.min_improvement,
                    };
                    if improved {
                        trials_without_improvement = 0;
                        info!(trial_id, value, "new best trial");
                    } else {
                        trials_without_improvement += 1;
                        debug!(trial_id, value, "trial complete");
                    }

                    TrialOutcome {
                        trial_id,
                        params,
                        value,
                        duration_secs: trial_start.elapsed().as_secs_f64(),
                        failed: false,
                    }
                }
                Err(e) => {
                    debug!(trial_id, error = %e, "trial failed, penalizing");
                    trials_without_improvement += 1;
                    TrialOutcome {
                        trial_id,
                        params,
                        value: self.config.direction.worst(),
                        duration_secs: trial_start.elapsed().as_secs_f64(),
                        failed: true,
                    }
                }
            };

            self.study.add_trial(outcome);
        }

        self.study.total_duration_secs = start.elapsed().as_secs_f64();
        Ok(&self.study)
    }

    pub fn study(&self) -> &Study {
        &self.study
    }

    /// Save the study to a JSON file
    pub fn save_study(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.study)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a study from a JSON file
    pub fn load_study(path: &str) -> Result<Study> {
        let json = std::fs::read_to_string(path)?;
        let study: Study = serde_json::from_str(&json)?;
        Ok(study)
    }
}
