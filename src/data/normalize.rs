//! Min-max normalization with stored statistics for the inverse transform

use crate::error::{ForecastError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Per-feature (min, max) pairs fitted once on the full raw series.
///
/// The same parameters are applied to every partition afterwards, so no
/// per-partition statistics can leak into training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxParams {
    mins: Vec<f64>,
    maxs: Vec<f64>,
}

impl MinMaxParams {
    /// Computes per-feature minima and maxima.
    ///
    /// A feature with `max == min` has no usable range and is rejected as
    /// `InvalidState` rather than letting `apply` divide by zero.
    pub fn fit(values: &Array2<f64>) -> Result<Self> {
        if values.nrows() == 0 || values.ncols() == 0 {
            return Err(ForecastError::InvalidState(
                "cannot fit normalization on an empty series".to_string(),
            ));
        }

        let mut mins = Vec::with_capacity(values.ncols());
        let mut maxs = Vec::with_capacity(values.ncols());

        for (idx, column) in values.columns().into_iter().enumerate() {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for &v in column.iter() {
                min = min.min(v);
                max = max.max(v);
            }
            if max <= min {
                return Err(ForecastError::InvalidState(format!(
                    "feature {idx} is constant (min == max == {min}), cannot min-max scale"
                )));
            }
            mins.push(min);
            maxs.push(max);
        }

        Ok(Self { mins, maxs })
    }

    /// Number of features these parameters were fitted on
    pub fn num_features(&self) -> usize {
        self.mins.len()
    }

    /// Fitted (min, max) of one feature
    pub fn range(&self, feature: usize) -> Result<(f64, f64)> {
        if feature >= self.num_features() {
            return Err(ForecastError::InvalidArgument(format!(
                "feature index {} out of range ({} features)",
                feature,
                self.num_features()
            )));
        }
        Ok((self.mins[feature], self.maxs[feature]))
    }

    /// Scales every feature to [0, 1]: `(x - min) / (max - min)`
    pub fn apply(&self, values: &Array2<f64>) -> Result<Array2<f64>> {
        if values.ncols() != self.num_features() {
            return Err(ForecastError::InvalidArgument(format!(
                "series has {} features, parameters were fitted on {}",
                values.ncols(),
                self.num_features()
            )));
        }

        let mut normalized = values.clone();
        for (idx, mut column) in normalized.columns_mut().into_iter().enumerate() {
            let min = self.mins[idx];
            let range = self.maxs[idx] - min;
            column.mapv_inplace(|v| (v - min) / range);
        }
        Ok(normalized)
    }

    /// Inverse transform for one feature: `x * (max - min) + min`.
    ///
    /// Used to bring predictions of the target feature back to raw units.
    pub fn invert(&self, values: &[f64], feature: usize) -> Result<Vec<f64>> {
        let (min, max) = self.range(feature)?;
        let range = max - min;
        Ok(values.iter().map(|&v| v * range + min).collect())
    }
}
