//! Dataset splitting

use crate::error::{RegtuneError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Training and held-out partitions of a dataset.
/// Rows stay aligned between inputs and targets; the split is immutable once made.
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub x_train: Array2<f64>,
    pub y_train: Array1<f64>,
    pub x_test: Array2<f64>,
    pub y_test: Array1<f64>,
}

impl DatasetSplit {
    pub fn n_train(&self) -> usize {
        self.x_train.nrows()
    }

    pub fn n_test(&self) -> usize {
        self.x_test.nrows()
    }
}

/// Split a dataset into shuffled train/test partitions.
///
/// `test_fraction` must lie in (0, 1) and both partitions must end up non-empty.
/// A seed makes the shuffle deterministic.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_fraction: f64,
    seed: Option<u64>,
) -> Result<DatasetSplit> {
    let n = x.nrows();

    if n != y.len() {
        return Err(RegtuneError::ShapeError {
            expected: format!("y length = {}", n),
            actual: format!("y length = {}", y.len()),
        });
    }
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(RegtuneError::ValidationError(format!(
            "test_fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let test_size = ((n as f64 * test_fraction).round() as usize).max(1);
    if test_size >= n {
        return Err(RegtuneError::DataError(format!(
            "cannot split {} samples with test_fraction {}",
            n, test_fraction
        )));
    }
    let train_size = n - test_size;

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = match seed {
        Some(s) => Xoshiro256PlusPlus::seed_from_u64(s),
        None => Xoshiro256PlusPlus::from_entropy(),
    };
    indices.shuffle(&mut rng);

    let (train_idx, test_idx) = indices.split_at(train_size);

    let x_train = x.select(Axis(0), train_idx);
    let x_test = x.select(Axis(0), test_idx);
    let y_train = Array1::from_iter(train_idx.iter().map(|&i| y[i]));
    let y_test = Array1::from_iter(test_idx.iter().map(|&i| y[i]));

    Ok(DatasetSplit {
        x_train,
        y_train,
        x_test,
        y_test,
    })
}
