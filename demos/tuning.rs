//! End-to-end tuning demo on a synthetic regression dataset.
//!
//! Run with: cargo run --example tuning

use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use regtune::prelude::*;

/// Noisy nonlinear target over five features
fn make_dataset(n: usize, seed: u64) -> (Array2<f64>, Array1<f64>) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    let x = Array2::from_shape_fn((n, 5), |_| rng.gen::<f64>() * 6.0 - 3.0);
    let y = Array1::from_shape_fn(n, |i| {
        let row = x.row(i);
        2.0 * row[0] + row[1] * row[1] - 1.5 * row[2] + (row[3] * 0.8).sin() * 3.0
            + rng.gen::<f64>() * 0.5
    });

    (x, y)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let (x, y) = make_dataset(400, 42);
    println!("dataset: {} samples, {} features\n", x.nrows(), x.ncols());

    let mut scaler = TargetScaler::new(ScalerKind::Standard);
    scaler.fit(&y)?;

    // Trials reduced from the default so the demo finishes quickly
    let config = BenchmarkConfig::new()
        .with_n_trials(20)
        .with_seed(42);

    let report = run_benchmark(&x, &y, Some(&scaler), &config)?;

    let df = report.to_dataframe()?;
    println!("{}", df);

    if let Some(best) = report.best_family() {
        println!(
            "\nbest family: {} (test MAE {:.4}, tuned in {:.1}s over {} trials)",
            best.label, best.metrics.mae, best.tuning_duration_secs, best.n_trials_run
        );
        println!("best parameters: {:?}", best.best_params);
    }

    Ok(())
}
