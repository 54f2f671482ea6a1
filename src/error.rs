//! Error types for the forecasting pipeline

use thiserror::Error;

/// Errors surfaced by the data preparation and training pipeline
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Malformed parameters, rejected before any computation begins
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Inconsistent runtime state (empty partitions, degenerate feature ranges)
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Non-finite loss during training
    #[error("training diverged at epoch {epoch}: loss = {loss}")]
    Diverged { epoch: usize, loss: f64 },

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] burn::record::RecorderError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ForecastError>;
