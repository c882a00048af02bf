//! Search space definition for hyperparameters

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bound and distribution of a single hyperparameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterKind {
    /// Continuous parameter, uniform or log-uniform over [low, high]
    Float { low: f64, high: f64, log_scale: bool },
    /// Integer parameter, uniform over [low, high] inclusive
    Int { low: i64, high: i64 },
}

/// A named hyperparameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
}

impl Parameter {
    /// Create a float parameter
    pub fn float(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Float {
                low,
                high,
                log_scale: false,
            },
        }
    }

    /// Create a log-scale float parameter
    pub fn log_float(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Float {
                low,
                high,
                log_scale: true,
            },
        }
    }

    /// Create an integer parameter
    pub fn int(name: impl Into<String>, low: i64, high: i64) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Int { low, high },
        }
    }

    /// Sample a value from this parameter's distribution
    pub fn sample(&self, rng: &mut impl Rng) -> ParameterValue {
        match self.kind {
            ParameterKind::Float {
                low,
                high,
                log_scale,
            } => {
                let val = if log_scale {
                    let log_low = low.ln();
                    let log_high = high.ln();
                    (rng.gen::<f64>() * (log_high - log_low) + log_low).exp()
                } else {
                    rng.gen::<f64>() * (high - low) + low
                };
                ParameterValue::Float(val)
            }
            ParameterKind::Int { low, high } => ParameterValue::Int(rng.gen_range(low..=high)),
        }
    }
}

/// Sampled parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Float(f64),
    Int(i64),
}

impl ParameterValue {
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(v) => Some(*v),
            ParameterValue::Int(v) => Some(*v as f64),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(v) => Some(*v),
            ParameterValue::Float(v) => Some(*v as i64),
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        self.as_int().and_then(|v| usize::try_from(v).ok())
    }
}

/// Alias for one sampled configuration
pub type TrialParams = HashMap<String, ParameterValue>;

/// Set of hyperparameter bounds to search over
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSpace {
    parameters: Vec<Parameter>,
}

impl SearchSpace {
    /// Create a new empty search space
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    pub fn add(mut self, param: Parameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Add a float parameter
    pub fn float(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.add(Parameter::float(name, low, high))
    }

    /// Add a log-scale float parameter
    pub fn log_float(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.add(Parameter::log_float(name, low, high))
    }

    /// Add an integer parameter
    pub fn int(self, name: impl Into<String>, low: i64, high: i64) -> Self {
        self.add(Parameter::int(name, low, high))
    }

    /// Get all parameters
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Sample a full configuration
    pub fn sample(&self, rng: &mut impl Rng) -> TrialParams {
        self.parameters
            .iter()
            .map(|p| (p.name.clone(), p.sample(rng)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}
