//! Target scaling

use crate::error::{RegtuneError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Type of target scaling to apply
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScalerKind {
    /// Standard scaling (z-score normalization): (y - mean) / std
    Standard,
    /// Min-Max scaling: (y - min) / (max - min)
    MinMax,
    /// No scaling (identity transform)
    None,
}

/// Invertible transform over a target vector.
///
/// Fitted once on training targets, then shared read-only: `transform` maps to
/// the normalized scale, `inverse_transform` maps back to original units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetScaler {
    kind: ScalerKind,
    center: f64,
    scale: f64,
    is_fitted: bool,
}

impl TargetScaler {
    /// Create a new unfitted scaler
    pub fn new(kind: ScalerKind) -> Self {
        Self {
            kind,
            center: 0.0,
            scale: 1.0,
            is_fitted: false,
        }
    }

    /// Fit the scaler to a target vector
    pub fn fit(&mut self, y: &Array1<f64>) -> Result<&mut Self> {
        if y.is_empty() {
            return Err(RegtuneError::DataError(
                "cannot fit scaler on empty target".to_string(),
            ));
        }

        let (center, scale) = match self.kind {
            ScalerKind::Standard => {
                let mean = y.mean().unwrap_or(0.0);
                let var = y.mapv(|v| (v - mean).powi(2)).sum() / y.len() as f64;
                let std = var.sqrt();
                (mean, if std == 0.0 { 1.0 } else { std })
            }
            ScalerKind::MinMax => {
                let min = y.iter().copied().fold(f64::INFINITY, f64::min);
                let max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let range = max - min;
                (min, if range == 0.0 { 1.0 } else { range })
            }
            ScalerKind::None => (0.0, 1.0),
        };

        self.center = center;
        self.scale = scale;
        self.is_fitted = true;
        Ok(self)
    }

    /// Map a target vector to the normalized scale
    pub fn transform(&self, y: &Array1<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(RegtuneError::ModelNotFitted);
        }
        Ok(y.mapv(|v| (v - self.center) / self.scale))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, y: &Array1<f64>) -> Result<Array1<f64>> {
        self.fit(y)?;
        self.transform(y)
    }

    /// Map normalized values back to original units
    pub fn inverse_transform(&self, y: &Array1<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(RegtuneError::ModelNotFitted);
        }
        Ok(y.mapv(|v| v * self.scale + self.center))
    }

    pub fn kind(&self) -> ScalerKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_scaler() {
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let mut scaler = TargetScaler::new(ScalerKind::Standard);
        let scaled = scaler.fit_transform(&y).unwrap();

        let mean = scaled.mean().unwrap();
        assert!(mean.abs() < 1e-10);
    }

    #[test]
    fn test_minmax_scaler() {
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let mut scaler = TargetScaler::new(ScalerKind::MinMax);
        let scaled = scaler.fit_transform(&y).unwrap();

        assert!((scaled[0] - 0.0).abs() < 1e-10);
        assert!((scaled[4] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_inverse_transform_round_trip() {
        let y = array![3.0, -1.0, 7.5, 0.0, 12.0];
        let mut scaler = TargetScaler::new(ScalerKind::Standard);
        let scaled = scaler.fit_transform(&y).unwrap();
        let restored = scaler.inverse_transform(&scaled).unwrap();

        for (orig, rest) in y.iter().zip(restored.iter()) {
            assert!((orig - rest).abs() < 1e-10);
        }
    }

    #[test]
    fn test_identity_scaler_is_noop() {
        let y = array![1.0, 2.0, 3.0];
        let mut scaler = TargetScaler::new(ScalerKind::None);
        let scaled = scaler.fit_transform(&y).unwrap();

        assert_eq!(scaled, y);
        assert_eq!(scaler.inverse_transform(&y).unwrap(), y);
    }

    #[test]
    fn test_constant_target_does_not_divide_by_zero() {
        let y = array![4.0, 4.0, 4.0];
        let mut scaler = TargetScaler::new(ScalerKind::Standard);
        let scaled = scaler.fit_transform(&y).unwrap();

        assert!(scaled.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_unfitted_scaler_errors() {
        let scaler = TargetScaler::new(ScalerKind::Standard);
        assert!(scaler.transform(&array![1.0]).is_err());
    }
}
