//! Train the precipitation model on a prepared weather series
//!
//! Usage:
//! ```bash
//! cargo run --release --bin train
//! ```
//!
//! Expects the series from an external pre-processing step; this binary
//! generates a synthetic one so the pipeline can be exercised end to end.

use anyhow::Result;
use burn::backend::Autodiff;
use burn_ndarray::{NdArray, NdArrayDevice};
use chrono::{Duration, TimeZone, Utc};
use cnn_weather_forecast::{
    FileCheckpoint, ForecastPipeline, NetConfig, PipelineConfig, TimeSeries, TrainingConfig,
};
use ndarray::Array2;
use rand::Rng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

type Backend = Autodiff<NdArray<f32>>;

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let series = synthetic_weather_series(1000)?;
    info!(
        "Loaded series: {} rows, {} features",
        series.len(),
        series.num_features()
    );

    let config = PipelineConfig {
        window_size: 6,
        target_column: "precipitation".to_string(),
        training: TrainingConfig {
            num_epochs: 60,
            learning_rate: 1e-4,
            ..TrainingConfig::default()
        },
        ..PipelineConfig::default()
    };

    let mut checkpoint = FileCheckpoint::new("checkpoint");
    let net_config = NetConfig {
        in_channels: series.num_features(),
        window_size: config.window_size,
        ..config.net.clone()
    };
    checkpoint.write_config_snapshot(&net_config, &config.training)?;

    let pipeline = ForecastPipeline::new(config)?;
    let device = NdArrayDevice::default();
    let report = pipeline.run::<Backend>(&series, &mut checkpoint, &device)?;

    println!("\n=== Training report ===");
    println!("Average test loss before training: {:.6}", report.pre_training_loss);
    println!("Average test loss after training:  {:.6}", report.post_training_loss);
    println!(
        "Epochs run: {} (best epoch {}{})",
        report.training.epochs_run(),
        report.training.best_epoch + 1,
        if report.training.stopped_early {
            ", stopped early"
        } else {
            ""
        }
    );
    println!(
        "Mean absolute error (raw units):   {:.6}",
        report.mean_absolute_error
    );
    println!(
        "Predictions: {} values starting at test row {}",
        report.predictions.len(),
        report.prediction_offset
    );
    println!("Checkpoint written to {}.mpk", checkpoint.path().display());

    Ok(())
}

/// Synthetic hourly weather series: seasonal cycles plus noise, with a
/// precipitation channel loosely coupled to humidity
fn synthetic_weather_series(n: usize) -> Result<TimeSeries> {
    let mut rng = rand::thread_rng();
    let columns = vec![
        "precipitation".to_string(),
        "temperature".to_string(),
        "humidity".to_string(),
        "pressure".to_string(),
        "wind_speed".to_string(),
    ];

    let mut values = Array2::zeros((n, columns.len()));
    for t in 0..n {
        let daily = (t as f64 * std::f64::consts::TAU / 24.0).sin();
        let humidity = 60.0 + 25.0 * daily + rng.gen_range(-5.0..5.0);
        let rain_base = ((humidity - 70.0) / 10.0).max(0.0);

        values[[t, 0]] = rain_base * rng.gen_range(0.0..3.0);
        values[[t, 1]] = 22.0 + 6.0 * daily + rng.gen_range(-1.0..1.0);
        values[[t, 2]] = humidity;
        values[[t, 3]] = 1013.0 + 4.0 * (t as f64 * 0.01).cos() + rng.gen_range(-1.0..1.0);
        values[[t, 4]] = 8.0 + 4.0 * (t as f64 * 0.05).sin().abs() + rng.gen_range(0.0..2.0);
    }

    let start = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
    let timestamps = (0..n).map(|t| start + Duration::hours(t as i64)).collect();

    Ok(TimeSeries::new(columns, values, timestamps)?)
}
