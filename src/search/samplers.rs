//! Sampling strategies for hyperparameter search

use super::space::{ParameterValue, SearchSpace, TrialParams};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Type of sampler to use
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SamplerKind {
    /// Independent random sampling
    Random,
    /// Tree-structured Parzen Estimator style sequential model-based sampling
    Tpe,
}

/// Trait for hyperparameter samplers.
///
/// `history` holds (params, objective) pairs of completed trials; samplers are
/// free to ignore it.
pub trait Sampler: Send {
    /// Suggest the next configuration to evaluate
    fn sample(&mut self, space: &SearchSpace, history: &[(TrialParams, f64)]) -> TrialParams;
}

/// Random sampler
#[derive(Debug)]
pub struct RandomSampler {
    rng: Xoshiro256PlusPlus,
}

impl RandomSampler {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => Xoshiro256PlusPlus::seed_from_u64(s),
            None => Xoshiro256PlusPlus::from_entropy(),
        };
        Self { rng }
    }
}

impl Sampler for RandomSampler {
    fn sample(&mut self, space: &SearchSpace, _history: &[(TrialParams, f64)]) -> TrialParams {
        space.sample(&mut self.rng)
    }
}

/// TPE-style sampler: random during startup, then scores random candidates by
/// similarity to the best-quantile configurations seen so far.
#[derive(Debug)]
pub struct TpeSampler {
    rng: Xoshiro256PlusPlus,
    n_startup_trials: usize,
    gamma: f64,
    n_candidates: usize,
}

impl TpeSampler {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => Xoshiro256PlusPlus::seed_from_u64(s),
            None => Xoshiro256PlusPlus::from_entropy(),
        };
        Self {
            rng,
            n_startup_trials: 10,
            gamma: 0.25,
            n_candidates: 24,
        }
    }

    /// Set the number of purely random startup trials
    pub fn with_n_startup(mut self, n: usize) -> Self {
        self.n_startup_trials = n;
        self
    }

    /// Set gamma (quantile separating good trials from the rest)
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    fn similarity(candidate: &TrialParams, good_trials: &[&TrialParams]) -> f64 {
        if good_trials.is_empty() {
            return 0.0;
        }

        let mut total = 0.0;
        for good in good_trials {
            let mut dist = 0.0;
            let mut count = 0;

            for (key, val) in candidate {
                if let Some(good_val) = good.get(key) {
                    let d = Self::param_distance(val, good_val);
                    dist += d * d;
                    count += 1;
                }
            }

            if count > 0 {
                dist = (dist / count as f64).sqrt();
                total += 1.0 / (1.0 + dist);
            }
        }

        total / good_trials.len() as f64
    }

    fn param_distance(a: &ParameterValue, b: &ParameterValue) -> f64 {
        match (a, b) {
            (ParameterValue::Float(va), ParameterValue::Float(vb)) => (va - vb).abs(),
            (ParameterValue::Int(va), ParameterValue::Int(vb)) => (va - vb).abs() as f64,
            _ => 1.0,
        }
    }
}

impl Sampler for TpeSampler {
    fn sample(&mut self, space: &SearchSpace, history: &[(TrialParams, f64)]) -> TrialParams {
        if history.len() < self.n_startup_trials {
            return space.sample(&mut self.rng);
        }

        // Sort completed trials by objective value, ascending: history is kept
        // in minimize orientation by the tuner.
        let mut sorted: Vec<_> = history.iter().collect();
        sorted.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let n_good = ((sorted.len() as f64 * self.gamma).ceil() as usize).max(1);
        let good_trials: Vec<_> = sorted[..n_good].iter().map(|(p, _)| p).collect();

        let mut best_params = space.sample(&mut self.rng);
        let mut best_score = Self::similarity(&best_params, &good_trials);

        for _ in 1..self.n_candidates {
            let candidate = space.sample(&mut self.rng);
            let score = Self::similarity(&candidate, &good_trials);
            if score > best_score {
                best_score = score;
                best_params = candidate;
            }
        }

        best_params
    }
}

/// Create a sampler from its kind
pub fn create_sampler(kind: SamplerKind, n_startup: usize, seed: Option<u64>) -> Box<dyn Sampler> {
    match kind {
        SamplerKind::Random => Box::new(RandomSampler::new(seed)),
        SamplerKind::Tpe => Box::new(TpeSampler::new(seed).with_n_startup(n_startup)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn space() -> SearchSpace {
        SearchSpace::new().log_float("lr", 0.001, 0.1).int("n", 10, 100)
    }

    #[test]
    fn test_random_sampler_covers_space() {
        let mut sampler = RandomSampler::new(Some(42));
        let params = sampler.sample(&space(), &[]);

        assert!(params.contains_key("lr"));
        assert!(params.contains_key("n"));
    }

    #[test]
    fn test_tpe_sampler_startup_phase() {
        let mut sampler = TpeSampler::new(Some(42));

        for _ in 0..5 {
            let params = sampler.sample(&space(), &[]);
            assert!(params.contains_key("lr"));
        }
    }

    #[test]
    fn test_tpe_sampler_with_history() {
        let mut sampler = TpeSampler::new(Some(42)).with_n_startup(5);

        let history: Vec<(TrialParams, f64)> = (0..20)
            .map(|i| {
                let mut params = HashMap::new();
                params.insert(
                    "lr".to_string(),
                    ParameterValue::Float(0.001 + i as f64 * 0.005),
                );
                params.insert("n".to_string(), ParameterValue::Int(10 + i));
                (params, i as f64 * 0.1)
            })
            .collect();

        let params = sampler.sample(&space(), &history);
        assert!(params.contains_key("lr"));
        assert!(params.contains_key("n"));
    }

    #[test]
    fn test_tpe_favors_good_region() {
        // Good trials clustered near lr = 0.001; candidate picks should lean low
        let mut sampler = TpeSampler::new(Some(7)).with_n_startup(0);
        let lr_space = SearchSpace::new().float("lr", 0.0, 1.0);

        let history: Vec<(TrialParams, f64)> = (0..30)
            .map(|i| {
                let lr = i as f64 / 30.0;
                let mut params = HashMap::new();
                params.insert("lr".to_string(), ParameterValue::Float(lr));
                (params, lr) // objective equals lr, so low lr is good
            })
            .collect();

        let picks: Vec<f64> = (0..20)
            .map(|_| {
                sampler
                    .sample(&lr_space, &history)
                    .get("lr")
                    .and_then(|v| v.as_float())
                    .unwrap()
            })
            .collect();

        let mean = picks.iter().sum::<f64>() / picks.len() as f64;
        assert!(mean < 0.5, "expected picks biased low, mean = {}", mean);
    }
}
