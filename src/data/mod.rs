//! Data preparation: input series, normalization, partitioning, windowing,
//! batched datasets

pub mod dataset;
pub mod normalize;
pub mod partition;
pub mod series;
pub mod window;

pub use dataset::{Batch, Dataset};
pub use normalize::MinMaxParams;
pub use partition::{Partitions, SplitFractions};
pub use series::TimeSeries;
pub use window::apply_windowing;
