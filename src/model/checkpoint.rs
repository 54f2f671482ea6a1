//! Checkpoint sinks for the training loop
//!
//! The loop itself has no filesystem dependency: it writes improved
//! parameters into whatever sink it was handed. The file sink keeps a
//! single slot on disk, overwritten on every improvement; the memory sink
//! exists for tests and for callers that restore the best model in-process.

use super::config::{NetConfig, TrainingConfig};
use super::net::{Net, NetRecord};
use crate::error::Result;
use burn::module::Module;
use burn::record::CompactRecorder;
use burn::tensor::backend::Backend;
use std::path::{Path, PathBuf};

/// Destination for the best-so-far parameter snapshot
pub trait CheckpointSink<B: Backend> {
    /// Overwrites the single checkpoint slot with the model's parameters
    fn save(&mut self, model: &Net<B>) -> Result<()>;
}

/// Single-slot checkpoint file using the backend's native recorder.
///
/// The recorder appends its own extension to `path`; passing `"checkpoint"`
/// produces `checkpoint.mpk`.
#[derive(Debug, Clone)]
pub struct FileCheckpoint {
    path: PathBuf,
}

impl FileCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restores a model from the checkpoint slot
    pub fn load<B: Backend>(&self, model: Net<B>, device: &B::Device) -> Result<Net<B>> {
        let model = model.load_file(self.path.clone(), &CompactRecorder::new(), device)?;
        Ok(model)
    }

    /// Writes the configuration next to the checkpoint as JSON, so the
    /// model can be rebuilt with matching dimensions before loading
    pub fn write_config_snapshot(&self, net: &NetConfig, training: &TrainingConfig) -> Result<()> {
        let snapshot = serde_json::json!({ "net": net, "training": training });
        let path = self.path.with_extension("json");
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        Ok(())
    }
}

impl<B: Backend> CheckpointSink<B> for FileCheckpoint {
    fn save(&mut self, model: &Net<B>) -> Result<()> {
        model
            .clone()
            .save_file(self.path.clone(), &CompactRecorder::new())?;
        Ok(())
    }
}

/// In-memory checkpoint slot holding the latest saved parameter record
pub struct MemoryCheckpoint<B: Backend> {
    record: Option<NetRecord<B>>,
    saves: usize,
}

impl<B: Backend> MemoryCheckpoint<B> {
    pub fn new() -> Self {
        Self {
            record: None,
            saves: 0,
        }
    }

    /// How many times the slot was overwritten
    pub fn saves(&self) -> usize {
        self.saves
    }

    /// True when nothing was ever saved
    pub fn is_empty(&self) -> bool {
        self.record.is_none()
    }

    /// Loads the stored record into `model`, consuming the slot
    pub fn restore(&mut self, model: Net<B>) -> Option<Net<B>> {
        self.record.take().map(|record| model.load_record(record))
    }
}

impl<B: Backend> Default for MemoryCheckpoint<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> CheckpointSink<B> for MemoryCheckpoint<B> {
    fn save(&mut self, model: &Net<B>) -> Result<()> {
        self.record = Some(model.clone().into_record());
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_memory_checkpoint_round_trip() {
        let device = Default::default();
        let config = NetConfig {
            in_channels: 3,
            window_size: 6,
            ..NetConfig::default()
        };
        let model: Net<TestBackend> = Net::new(&device, &config).unwrap();

        let mut sink = MemoryCheckpoint::<TestBackend>::new();
        assert!(sink.is_empty());

        CheckpointSink::save(&mut sink, &model).unwrap();
        assert_eq!(sink.saves(), 1);

        let input = burn::tensor::Tensor::<TestBackend, 3>::ones([1, 3, 6], &device);
        let before: Vec<f32> = model.forward(input.clone()).into_data().to_vec().unwrap();

        // A freshly initialized model restored from the slot must reproduce
        // the saved model's outputs exactly.
        let fresh: Net<TestBackend> = Net::new(&device, &config).unwrap();
        let restored = sink.restore(fresh).unwrap();
        let after: Vec<f32> = restored.forward(input).into_data().to_vec().unwrap();

        assert_eq!(before, after);
        assert!(sink.is_empty());
    }
}
