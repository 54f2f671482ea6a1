//! 1D convolutional regression network

use super::config::NetConfig;
use crate::error::Result;
use burn::{
    module::Module,
    nn::{
        conv::{Conv1d, Conv1dConfig},
        Linear, LinearConfig, PaddingConfig1d, Relu,
    },
    tensor::{backend::Backend, Tensor},
};

/// Fixed-topology regressor mapping a window of multivariate observations
/// to a scalar prediction: Conv1d -> ReLU -> flatten -> Linear -> ReLU ->
/// Linear(1).
#[derive(Module, Debug)]
pub struct Net<B: Backend> {
    conv1d: Conv1d<B>,
    fc1: Linear<B>,
    fc2: Linear<B>,
    activation: Relu,
}

impl<B: Backend> Net<B> {
    /// Initializes the network, validating the configuration first.
    ///
    /// The first fully connected layer's input width is derived from the
    /// window size and filter count, so an incompatible window size fails
    /// here instead of at the first forward pass.
    pub fn new(device: &B::Device, config: &NetConfig) -> Result<Self> {
        config.validate()?;

        let conv1d = Conv1dConfig::new(config.in_channels, config.conv_filters, config.kernel_size)
            .with_padding(PaddingConfig1d::Valid)
            .init(device);

        let fc1 = LinearConfig::new(config.flatten_size(), config.fc_size).init(device);
        let fc2 = LinearConfig::new(config.fc_size, 1).init(device);

        Ok(Self {
            conv1d,
            fc1,
            fc2,
            activation: Relu::new(),
        })
    }

    /// Forward pass.
    ///
    /// Input: [batch_size, in_channels, window_size].
    /// Output: [batch_size, 1].
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let x = self.conv1d.forward(x);
        let x = self.activation.forward(x);

        let x = x.flatten(1, 2);

        let x = self.fc1.forward(x);
        let x = self.activation.forward(x);

        self.fc2.forward(x)
    }
}
