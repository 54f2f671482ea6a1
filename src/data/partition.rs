//! Time-ordered train/validation/test partitioning

use crate::error::{ForecastError, Result};
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

/// Fractions of the series assigned to train and validation.
///
/// The test partition is the remainder. Defaults to the 70/20/10 split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SplitFractions {
    pub train: f64,
    pub validation: f64,
}

impl Default for SplitFractions {
    fn default() -> Self {
        Self {
            train: 0.7,
            validation: 0.2,
        }
    }
}

impl SplitFractions {
    pub fn validate(&self) -> Result<()> {
        if self.train <= 0.0 || self.validation <= 0.0 {
            return Err(ForecastError::InvalidArgument(
                "split fractions must be positive".to_string(),
            ));
        }
        if self.train + self.validation >= 1.0 {
            return Err(ForecastError::InvalidArgument(format!(
                "train + validation fractions must leave room for test (got {})",
                self.train + self.validation
            )));
        }
        Ok(())
    }

    /// Boundary row indices for a series of `n` rows.
    ///
    /// Train covers `[0, i0)`, validation `[i0, i1)`, test `[i1, n)`. The
    /// same indices slice both the normalized series (training) and the raw
    /// series (reporting).
    pub fn boundaries(&self, n: usize) -> (usize, usize) {
        let i0 = (n as f64 * self.train) as usize;
        let i1 = (n as f64 * (self.train + self.validation)) as usize;
        (i0, i1)
    }
}

/// Contiguous, non-overlapping slices of a series in time order
#[derive(Debug, Clone)]
pub struct Partitions {
    pub train: Array2<f64>,
    pub validation: Array2<f64>,
    pub test: Array2<f64>,
}

impl Partitions {
    /// Splits `values` at the boundary indices derived from `fractions`
    pub fn split(values: &Array2<f64>, fractions: &SplitFractions) -> Result<Self> {
        fractions.validate()?;

        let n = values.nrows();
        let (i0, i1) = fractions.boundaries(n);
        if i0 == 0 || i1 == i0 || i1 == n {
            return Err(ForecastError::InvalidState(format!(
                "series of {n} rows yields an empty partition at boundaries ({i0}, {i1})"
            )));
        }

        Ok(Self {
            train: values.slice(s![..i0, ..]).to_owned(),
            validation: values.slice(s![i0..i1, ..]).to_owned(),
            test: values.slice(s![i1.., ..]).to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_default_boundaries() {
        let fractions = SplitFractions::default();
        assert_eq!(fractions.boundaries(100), (70, 90));
        assert_eq!(fractions.boundaries(10), (7, 9));
    }

    #[test]
    fn test_partition_lengths_sum_to_series_length() {
        for n in [50, 100, 137, 999] {
            let values = Array2::from_shape_fn((n, 3), |(i, j)| (i * 3 + j) as f64);
            let parts = Partitions::split(&values, &SplitFractions::default()).unwrap();
            assert_eq!(
                parts.train.nrows() + parts.validation.nrows() + parts.test.nrows(),
                n
            );
        }
    }

    #[test]
    fn test_hundred_rows_split_70_20_10() {
        let values = Array2::from_shape_fn((100, 2), |(i, j)| (i * 2 + j) as f64);
        let parts = Partitions::split(&values, &SplitFractions::default()).unwrap();

        assert_eq!(parts.train.nrows(), 70);
        assert_eq!(parts.validation.nrows(), 20);
        assert_eq!(parts.test.nrows(), 10);

        // Contiguity in time order: test starts where validation ends.
        assert_eq!(parts.train[[69, 0]], 138.0);
        assert_eq!(parts.validation[[0, 0]], 140.0);
        assert_eq!(parts.test[[0, 0]], 180.0);
    }

    #[test]
    fn test_degenerate_split_rejected() {
        let values = Array2::from_shape_fn((3, 2), |(i, j)| (i + j) as f64);
        let result = Partitions::split(&values, &SplitFractions::default());
        assert!(matches!(result, Err(ForecastError::InvalidState(_))));
    }

    #[test]
    fn test_invalid_fractions_rejected() {
        let values = Array2::from_shape_fn((100, 2), |(i, j)| (i + j) as f64);
        let bad = SplitFractions {
            train: 0.8,
            validation: 0.3,
        };
        assert!(matches!(
            Partitions::split(&values, &bad),
            Err(ForecastError::InvalidArgument(_))
        ));
    }
}
