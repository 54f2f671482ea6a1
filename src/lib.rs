//! # CNN Weather Forecast Library
//!
//! Precipitation forecasting from windowed weather station time series
//! with a 1D convolutional regression network.
//!
//! ## Modules
//!
//! - `data` - Input series, normalization, partitioning, windowing, batching
//! - `model` - Network architecture, training loop, checkpointing
//! - `evaluate` - Forward-only evaluation and error metrics
//! - `pipeline` - End-to-end orchestration
//! - `error` - Error types

pub mod data;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod pipeline;

// Re-export commonly used types
pub use data::{apply_windowing, Batch, Dataset, MinMaxParams, Partitions, SplitFractions, TimeSeries};
pub use error::{ForecastError, Result};
pub use evaluate::{average_loss, collect_predictions, mean_absolute_error};
pub use model::{
    train_model, CheckpointSink, EarlyStopping, FileCheckpoint, MemoryCheckpoint, Net, NetConfig,
    OptimizerKind, TrainingConfig, TrainingResult,
};
pub use pipeline::{ForecastPipeline, ForecastReport, PipelineConfig};
