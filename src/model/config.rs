//! Model and training configuration

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Architecture configuration for the regression network.
///
/// The topology is fixed; only the input dimensions vary with the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetConfig {
    /// Number of input channels (features per time step)
    pub in_channels: usize,
    /// Number of time steps per window
    pub window_size: usize,
    /// Convolution output channels
    pub conv_filters: usize,
    /// Convolution kernel size
    pub kernel_size: usize,
    /// Hidden fully connected layer width
    pub fc_size: usize,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            in_channels: 28,
            window_size: 6,
            conv_filters: 64,
            kernel_size: 2,
            fc_size: 50,
        }
    }
}

impl NetConfig {
    /// Width of the flattened convolution output feeding the first fully
    /// connected layer: `conv_filters * (window_size - kernel_size + 1)`
    /// with valid padding. Derived here so a changed window size can never
    /// silently disagree with a hardcoded layer width.
    pub fn flatten_size(&self) -> usize {
        self.conv_filters * (self.window_size - self.kernel_size + 1)
    }

    /// Rejects dimension combinations the fixed topology cannot express
    pub fn validate(&self) -> Result<()> {
        if self.in_channels == 0 {
            return Err(ForecastError::InvalidArgument(
                "in_channels must be > 0".to_string(),
            ));
        }
        if self.kernel_size == 0 {
            return Err(ForecastError::InvalidArgument(
                "kernel_size must be > 0".to_string(),
            ));
        }
        if self.window_size < self.kernel_size {
            return Err(ForecastError::InvalidArgument(format!(
                "window_size {} is smaller than kernel_size {}",
                self.window_size, self.kernel_size
            )));
        }
        if self.conv_filters == 0 || self.fc_size == 0 {
            return Err(ForecastError::InvalidArgument(
                "layer widths must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Optimizer selection for the training loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizerKind {
    /// Plain momentum-free stochastic gradient descent
    Sgd,
    /// Adam with default moment coefficients
    Adam,
}

/// Training hyperparameters. All explicit, nothing inferred.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Upper bound on epochs; early stopping usually ends sooner
    pub num_epochs: usize,
    /// Optimizer step size
    pub learning_rate: f64,
    /// Examples per gradient update
    pub batch_size: usize,
    /// Epochs without improvement tolerated before stopping
    pub patience: usize,
    /// Minimum validation-loss decrease that counts as an improvement
    pub min_delta: f64,
    /// Which optimizer updates the parameters
    pub optimizer: OptimizerKind,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_epochs: 500,
            learning_rate: 1e-5,
            batch_size: 32,
            patience: 10,
            min_delta: 0.0,
            optimizer: OptimizerKind::Adam,
        }
    }
}

impl TrainingConfig {
    /// Short schedule for smoke tests
    pub fn quick() -> Self {
        Self {
            num_epochs: 5,
            learning_rate: 1e-3,
            patience: 3,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_epochs == 0 {
            return Err(ForecastError::InvalidArgument(
                "num_epochs must be > 0".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ForecastError::InvalidArgument(
                "batch_size must be > 0".to_string(),
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ForecastError::InvalidArgument(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.patience == 0 {
            return Err(ForecastError::InvalidArgument(
                "patience must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(NetConfig::default().validate().is_ok());
        assert!(TrainingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_flatten_size() {
        // 6-step window, kernel 2, 64 filters: 64 * 5 = 320.
        let config = NetConfig::default();
        assert_eq!(config.flatten_size(), 320);

        let wide = NetConfig {
            window_size: 12,
            ..NetConfig::default()
        };
        assert_eq!(wide.flatten_size(), 64 * 11);
    }

    #[test]
    fn test_window_smaller_than_kernel_rejected() {
        let config = NetConfig {
            window_size: 1,
            kernel_size: 2,
            ..NetConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_training_config_rejected() {
        let mut config = TrainingConfig::default();
        config.learning_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = TrainingConfig::default();
        config.batch_size = 0;
        assert!(config.validate().is_err());
    }
}
