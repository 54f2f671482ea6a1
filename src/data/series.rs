//! Tabular time series input

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use ndarray::Array2;

/// Multivariate time series produced by an external pre-processing step.
///
/// Rows are time steps in chronological order, columns are named numeric
/// features. The feature set is fixed for the lifetime of the series.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    /// Feature names, one per column
    columns: Vec<String>,
    /// Observations: [time_steps, num_features]
    values: Array2<f64>,
    /// Timestamp of each row
    timestamps: Vec<DateTime<Utc>>,
}

impl TimeSeries {
    /// Builds a series, validating that names, values and timestamps agree in shape
    pub fn new(
        columns: Vec<String>,
        values: Array2<f64>,
        timestamps: Vec<DateTime<Utc>>,
    ) -> Result<Self> {
        if values.nrows() == 0 {
            return Err(ForecastError::InvalidArgument(
                "time series must contain at least one row".to_string(),
            ));
        }
        if columns.len() != values.ncols() {
            return Err(ForecastError::InvalidArgument(format!(
                "{} column names for {} columns",
                columns.len(),
                values.ncols()
            )));
        }
        if timestamps.len() != values.nrows() {
            return Err(ForecastError::InvalidArgument(format!(
                "{} timestamps for {} rows",
                timestamps.len(),
                values.nrows()
            )));
        }

        Ok(Self {
            columns,
            values,
            timestamps,
        })
    }

    /// Number of time steps
    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    /// True when the series has no rows
    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    /// Number of features
    pub fn num_features(&self) -> usize {
        self.values.ncols()
    }

    /// Column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw observation matrix
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Row timestamps
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Index of a named column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// One column as a plain vector
    pub fn column(&self, index: usize) -> Result<Vec<f64>> {
        if index >= self.num_features() {
            return Err(ForecastError::InvalidArgument(format!(
                "column index {} out of range ({} features)",
                index,
                self.num_features()
            )));
        }
        Ok(self.values.column(index).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ndarray::array;

    fn timestamps(n: usize) -> Vec<DateTime<Utc>> {
        (0..n)
            .map(|i| Utc.timestamp_opt(1_600_000_000 + i as i64 * 3600, 0).unwrap())
            .collect()
    }

    #[test]
    fn test_series_creation() {
        let series = TimeSeries::new(
            vec!["precipitation".to_string(), "temperature".to_string()],
            array![[0.0, 21.5], [1.2, 20.1], [0.4, 19.8]],
            timestamps(3),
        )
        .unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.num_features(), 2);
        assert_eq!(series.column_index("temperature"), Some(1));
        assert_eq!(series.column_index("wind"), None);
        assert_eq!(series.column(0).unwrap(), vec![0.0, 1.2, 0.4]);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let result = TimeSeries::new(
            vec!["precipitation".to_string()],
            array![[0.0, 21.5]],
            timestamps(1),
        );
        assert!(matches!(result, Err(ForecastError::InvalidArgument(_))));

        let result = TimeSeries::new(
            vec!["precipitation".to_string(), "temperature".to_string()],
            array![[0.0, 21.5]],
            timestamps(2),
        );
        assert!(matches!(result, Err(ForecastError::InvalidArgument(_))));
    }
}
