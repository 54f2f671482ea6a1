//! End-to-end forecasting pipeline
//!
//! Wires the data preparation stages to the model: fit-once normalization,
//! time-ordered partitioning, windowing, batched datasets, training with
//! early stopping, and denormalized evaluation against the raw series.

use crate::data::{apply_windowing, Dataset, MinMaxParams, Partitions, SplitFractions, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::evaluate::{average_loss, collect_predictions, mean_absolute_error};
use crate::model::{train_model, CheckpointSink, Net, NetConfig, TrainingConfig, TrainingResult};
use burn::module::AutodiffModule;
use burn::tensor::backend::AutodiffBackend;
use chrono::{DateTime, Utc};
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything the pipeline needs, passed in at construction.
///
/// `net.in_channels` and `net.window_size` are derived from the input
/// series and `window_size` at run time; the remaining architecture fields
/// are taken as given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of past time steps fed to the model per prediction
    pub window_size: usize,
    /// Name of the column being predicted
    pub target_column: String,
    /// Train/validation/test fractions
    pub split: SplitFractions,
    /// Network architecture
    pub net: NetConfig,
    /// Training hyperparameters
    pub training: TrainingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_size: 6,
            target_column: "precipitation".to_string(),
            split: SplitFractions::default(),
            net: NetConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(ForecastError::InvalidArgument(
                "window_size must be > 0".to_string(),
            ));
        }
        self.split.validate()?;
        self.training.validate()?;
        Ok(())
    }
}

/// Result of a full pipeline run, ready for reporting and plotting
#[derive(Debug, Clone)]
pub struct ForecastReport {
    /// Average test loss before any training (normalized units)
    pub pre_training_loss: f64,
    /// Average test loss after training (normalized units)
    pub post_training_loss: f64,
    /// Loss traces and stopping summary
    pub training: TrainingResult,
    /// Denormalized predictions over the test partition
    pub predictions: Vec<f64>,
    /// Row offset of the first prediction within the test partition.
    ///
    /// The k-th prediction targets test row `prediction_offset + k`; the
    /// first `window_size` test rows only ever serve as model input.
    pub prediction_offset: usize,
    /// Timestamps aligned with `predictions`
    pub prediction_timestamps: Vec<DateTime<Utc>>,
    /// Raw (non-normalized) observed target values aligned with `predictions`
    pub test_targets: Vec<f64>,
    /// Mean absolute error of `predictions` against `test_targets`
    pub mean_absolute_error: f64,
    /// Partition boundary row indices (train end, validation end)
    pub boundaries: (usize, usize),
}

/// Orchestrates the full prepare/train/evaluate sequence
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    config: PipelineConfig,
}

impl ForecastPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the pipeline on a prepared series.
    ///
    /// Normalization parameters are fitted once on the full raw series and
    /// applied to every partition; the same boundary indices later re-slice
    /// the raw series so reported errors are in raw units.
    pub fn run<B: AutodiffBackend>(
        &self,
        series: &TimeSeries,
        sink: &mut dyn CheckpointSink<B>,
        device: &B::Device,
    ) -> Result<ForecastReport> {
        let idx_target = series
            .column_index(&self.config.target_column)
            .ok_or_else(|| {
                ForecastError::InvalidArgument(format!(
                    "target column '{}' not found in series",
                    self.config.target_column
                ))
            })?;

        info!(
            "Preparing {} rows x {} features, target '{}'",
            series.len(),
            series.num_features(),
            self.config.target_column
        );

        let params = MinMaxParams::fit(series.values())?;
        let normalized = params.apply(series.values())?;
        let partitions = Partitions::split(&normalized, &self.config.split)?;

        let mut train_ds = self.windowed_dataset(&partitions.train, idx_target, "train")?;
        let mut val_ds = self.windowed_dataset(&partitions.validation, idx_target, "validation")?;
        let mut test_ds = self.windowed_dataset(&partitions.test, idx_target, "test")?;

        info!(
            "Windowed examples: {} train, {} validation, {} test",
            train_ds.len(),
            val_ds.len(),
            test_ds.len()
        );

        let net_config = NetConfig {
            in_channels: series.num_features(),
            window_size: self.config.window_size,
            ..self.config.net.clone()
        };
        let model = Net::<B>::new(device, &net_config)?;

        let pre_training_loss = average_loss(&model.valid(), &mut test_ds, device)?;
        info!("Average test loss before training: {:.6}", pre_training_loss);

        let (model, training) = train_model(
            model,
            &mut train_ds,
            &mut val_ds,
            &self.config.training,
            sink,
            device,
        )?;

        let eval_model = model.valid();
        let post_training_loss = average_loss(&eval_model, &mut test_ds, device)?;
        info!("Average test loss after training: {:.6}", post_training_loss);

        // Predictions back in raw units, aligned against the raw test rows.
        let normalized_predictions = collect_predictions(&eval_model, &mut test_ds, device);
        let predictions = params.invert(&normalized_predictions, idx_target)?;

        let window_size = self.config.window_size;
        let boundaries = self.config.split.boundaries(series.len());
        let raw_test_targets: Vec<f64> = series
            .values()
            .slice(s![boundaries.1.., idx_target])
            .to_vec();
        let test_targets = raw_test_targets[window_size..].to_vec();
        let prediction_timestamps = series.timestamps()[boundaries.1 + window_size..].to_vec();

        let mae = mean_absolute_error(&predictions, &test_targets)?;
        info!("Mean absolute error on raw test targets: {:.6}", mae);

        Ok(ForecastReport {
            pre_training_loss,
            post_training_loss,
            training,
            predictions,
            prediction_offset: window_size,
            prediction_timestamps,
            test_targets,
            mean_absolute_error: mae,
            boundaries,
        })
    }

    /// Windows one partition over its full admissible range
    fn windowed_dataset(
        &self,
        partition: &Array2<f64>,
        idx_target: usize,
        name: &str,
    ) -> Result<Dataset> {
        let len = partition.nrows();
        let window_size = self.config.window_size;

        if len <= window_size {
            return Err(ForecastError::InvalidState(format!(
                "{name} partition of {len} rows cannot fit a window of {window_size}"
            )));
        }

        let (windows, targets) =
            apply_windowing(partition, 0, len - window_size - 1, window_size, idx_target)?;
        Dataset::new(windows, targets, self.config.training.batch_size)
    }
}
