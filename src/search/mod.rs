//! Hyperparameter search
//!
//! Search space definition, sampling strategies (random and a TPE-style
//! sequential model-based sampler) and the trial loop with study bookkeeping.

mod samplers;
mod space;
mod study;

pub use samplers::{create_sampler, RandomSampler, Sampler, SamplerKind, TpeSampler};
pub use space::{Parameter, ParameterKind, ParameterValue, SearchSpace, TrialParams};
pub use study::{Direction, Study, TrialOutcome, Tuner, TunerConfig};
