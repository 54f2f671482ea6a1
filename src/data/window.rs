//! Sliding-window construction of supervised (window, target) pairs

use crate::error::{ForecastError, Result};
use ndarray::{Array1, Array2, Array3};

/// Turns a (time x feature) matrix into overlapping fixed-length windows and
/// aligned targets.
///
/// For each `t` in `[initial_time_step, max_time_step]` the window covers
/// rows `[t, t + window_size)` across all features, and the target is the
/// value of feature `idx_target` at row `t + window_size`, the observation
/// immediately following the window. Output order follows increasing `t`;
/// no shuffling happens here.
///
/// Returns windows shaped `[num_pairs, window_size, num_features]` and
/// targets shaped `[num_pairs]`, where
/// `num_pairs = max_time_step - initial_time_step + 1`.
pub fn apply_windowing(
    values: &Array2<f64>,
    initial_time_step: usize,
    max_time_step: usize,
    window_size: usize,
    idx_target: usize,
) -> Result<(Array3<f64>, Array1<f64>)> {
    let (num_rows, num_features) = values.dim();

    if idx_target >= num_features {
        return Err(ForecastError::InvalidArgument(format!(
            "target index {idx_target} out of range ({num_features} features)"
        )));
    }
    if window_size == 0 {
        return Err(ForecastError::InvalidArgument(
            "window size must be at least 1".to_string(),
        ));
    }
    if max_time_step < initial_time_step {
        return Err(ForecastError::InvalidArgument(format!(
            "max_time_step {max_time_step} precedes initial_time_step {initial_time_step}"
        )));
    }
    // The last target lives at row max_time_step + window_size.
    if max_time_step + window_size >= num_rows {
        return Err(ForecastError::InvalidArgument(format!(
            "windowing over [{initial_time_step}, {max_time_step}] with window {window_size} \
             needs {} rows, series has {num_rows}",
            max_time_step + window_size + 1
        )));
    }

    let num_pairs = max_time_step - initial_time_step + 1;
    let mut windows = Array3::zeros((num_pairs, window_size, num_features));
    let mut targets = Array1::zeros(num_pairs);

    for (i, t) in (initial_time_step..=max_time_step).enumerate() {
        for w in 0..window_size {
            for f in 0..num_features {
                windows[[i, w, f]] = values[[t + w, f]];
            }
        }
        targets[i] = values[[t + window_size, idx_target]];
    }

    Ok((windows, targets))
}
