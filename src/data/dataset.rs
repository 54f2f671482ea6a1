//! Batched access to (window, target) pairs

use crate::error::{ForecastError, Result};
use burn::tensor::{backend::Backend, Tensor, TensorData};
use ndarray::{Array1, Array2, Array3};
use rand::seq::SliceRandom;
use rand::thread_rng;

/// Dataset over windowed training examples.
///
/// Batches are emitted in time order by default. Shuffling exists as an
/// opt-in for experiments but the forecasting pipeline never enables it:
/// the examples come from a time series and their order is meaningful.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Windows in time-major layout: [num_pairs, window_size, num_features]
    windows: Array3<f32>,
    /// Targets: [num_pairs]
    targets: Vec<f32>,
    batch_size: usize,
    shuffle: bool,
    current_index: usize,
    indices: Vec<usize>,
}

/// One batch of examples in the layout the model expects
#[derive(Debug, Clone)]
pub struct Batch {
    /// Input windows: [batch_size, num_features, window_size]
    pub features: Array3<f32>,
    /// Regression targets: [batch_size, 1]
    pub targets: Array2<f32>,
}

impl Dataset {
    /// Builds a dataset from windowing output
    pub fn new(windows: Array3<f64>, targets: Array1<f64>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(ForecastError::InvalidArgument(
                "batch size must be at least 1".to_string(),
            ));
        }
        if windows.dim().0 != targets.len() {
            return Err(ForecastError::InvalidArgument(format!(
                "{} windows but {} targets",
                windows.dim().0,
                targets.len()
            )));
        }

        let indices: Vec<usize> = (0..targets.len()).collect();
        Ok(Self {
            windows: windows.mapv(|v| v as f32),
            targets: targets.iter().map(|&v| v as f32).collect(),
            batch_size,
            shuffle: false,
            current_index: 0,
            indices,
        })
    }

    /// Enables index shuffling on every reset
    pub fn with_shuffle(mut self) -> Self {
        self.shuffle = true;
        self
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// True when there are no examples
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of batches per pass
    pub fn num_batches(&self) -> usize {
        (self.len() + self.batch_size - 1) / self.batch_size
    }

    /// Window size of the stored examples
    pub fn window_size(&self) -> usize {
        self.windows.dim().1
    }

    /// Number of feature channels
    pub fn num_features(&self) -> usize {
        self.windows.dim().2
    }

    /// Rewinds the iterator to the first batch
    pub fn reset(&mut self) {
        self.current_index = 0;
        if self.shuffle {
            let mut rng = thread_rng();
            self.indices.shuffle(&mut rng);
        }
    }

    /// Produces the next batch, or `None` at the end of a pass.
    ///
    /// Windows are stored time-major and transposed here into the
    /// [batch, channels, window] layout the convolution consumes.
    pub fn next_batch(&mut self) -> Option<Batch> {
        if self.current_index >= self.len() {
            return None;
        }

        let end_idx = (self.current_index + self.batch_size).min(self.len());
        let batch_indices = &self.indices[self.current_index..end_idx];
        let actual_batch_size = batch_indices.len();

        let (_, window_size, num_features) = self.windows.dim();
        let mut features = Array3::zeros((actual_batch_size, num_features, window_size));
        let mut targets = Array2::zeros((actual_batch_size, 1));

        for (batch_idx, &example_idx) in batch_indices.iter().enumerate() {
            for w in 0..window_size {
                for f in 0..num_features {
                    features[[batch_idx, f, w]] = self.windows[[example_idx, w, f]];
                }
            }
            targets[[batch_idx, 0]] = self.targets[example_idx];
        }

        self.current_index = end_idx;

        Some(Batch { features, targets })
    }
}

impl Iterator for Dataset {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch()
    }
}

impl Batch {
    /// Batch features as a rank-3 tensor on the given device
    pub fn features_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 3> {
        let shape = self.features.dim();
        let data: Vec<f32> = self.features.iter().cloned().collect();
        Tensor::from_data(TensorData::new(data, [shape.0, shape.1, shape.2]), device)
    }

    /// Batch targets as a rank-2 tensor on the given device
    pub fn targets_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        let shape = self.targets.dim();
        let data: Vec<f32> = self.targets.iter().cloned().collect();
        Tensor::from_data(TensorData::new(data, [shape.0, shape.1]), device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array3};

    fn indexed_dataset(n: usize, batch_size: usize) -> Dataset {
        // Every window is filled with its example index so order is observable.
        let windows = Array3::from_shape_fn((n, 4, 2), |(i, _, _)| i as f64);
        let targets = Array1::from_shape_fn(n, |i| i as f64);
        Dataset::new(windows, targets, batch_size).unwrap()
    }

    #[test]
    fn test_iteration_covers_every_example_once() {
        let mut dataset = indexed_dataset(100, 32);

        let mut total = 0;
        while let Some(batch) = dataset.next_batch() {
            total += batch.targets.nrows();
        }
        assert_eq!(total, 100);
        assert_eq!(dataset.num_batches(), 4);
    }

    #[test]
    fn test_order_preserved_without_shuffle() {
        let mut dataset = indexed_dataset(10, 3);

        let mut seen = Vec::new();
        while let Some(batch) = dataset.next_batch() {
            for row in 0..batch.targets.nrows() {
                seen.push(batch.targets[[row, 0]] as usize);
            }
        }
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_batch_layout_is_channels_first() {
        let windows = Array3::from_shape_fn((2, 3, 4), |(i, w, f)| (i * 100 + w * 10 + f) as f64);
        let targets = Array1::from_shape_fn(2, |i| i as f64);
        let mut dataset = Dataset::new(windows, targets, 2).unwrap();

        let batch = dataset.next_batch().unwrap();
        assert_eq!(batch.features.dim(), (2, 4, 3));
        // Transpose: [example, feature, step] holds windows[[example, step, feature]].
        assert_eq!(batch.features[[1, 2, 1]], 112.0);
    }

    #[test]
    fn test_reset_restarts_iteration() {
        let mut dataset = indexed_dataset(7, 4);
        while dataset.next_batch().is_some() {}
        assert!(dataset.next_batch().is_none());

        dataset.reset();
        let batch = dataset.next_batch().unwrap();
        assert_eq!(batch.targets[[0, 0]], 0.0);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let windows = Array3::zeros((5, 4, 2));
        let targets = Array1::zeros(4);
        assert!(Dataset::new(windows, targets, 2).is_err());
    }
}
