//! Model architecture, training loop and checkpointing

pub mod checkpoint;
pub mod config;
pub mod early_stopping;
pub mod net;
pub mod training;

pub use checkpoint::{CheckpointSink, FileCheckpoint, MemoryCheckpoint};
pub use config::{NetConfig, OptimizerKind, TrainingConfig};
pub use early_stopping::{EarlyStopping, StopDecision};
pub use net::Net;
pub use training::{train_model, TrainingResult};
