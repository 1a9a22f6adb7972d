//! Neuromodulation network mapping an auxiliary signal to decay modifiers
//!
//! The network drives the effective time constant of a
//! [`CfcMode::Neuromodulated`](crate::cells::CfcMode) cell while the primary
//! input keeps driving the state magnitude.

use burn::config::Config;
use burn::module::{Ignored, Module};
use burn::nn::Linear;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::activation::Activation;
use crate::cells::init_linear;
use crate::error::{CfcError, Result};

/// Settings for a [`NeuromodNetwork`].
#[derive(Config, Debug)]
pub struct NeuromodConfig {
    /// Layer widths, input width first. The final entry must equal the hidden
    /// size of the cell the network feeds.
    pub dims: Vec<usize>,
    /// Activation applied after every layer, including the last.
    #[config(default = "Activation::Tanh")]
    pub activation: Activation,
}

impl NeuromodConfig {
    /// Builds the network on the given device.
    ///
    /// A single-entry `dims` yields an identity network; an empty `dims` is
    /// rejected with [`CfcError::InvalidConfiguration`].
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<NeuromodNetwork<B>> {
        if self.dims.is_empty() {
            return Err(CfcError::InvalidConfiguration(
                "neuromod network dims must not be empty".into(),
            ));
        }

        let layers = self
            .dims
            .windows(2)
            .map(|pair| init_linear(pair[0], pair[1], device))
            .collect();

        Ok(NeuromodNetwork {
            layers,
            activation: Ignored(self.activation),
            input_size: self.dims[0],
            output_size: self.dims[self.dims.len() - 1],
        })
    }
}

/// Stack of affine layers with an activation after every layer.
///
/// The activation also follows the final layer, so with the default `tanh`
/// the signal handed to the decay computation is already squashed into
/// `(-1, 1)`.
#[derive(Module, Debug)]
pub struct NeuromodNetwork<B: Backend> {
    pub(crate) layers: Vec<Linear<B>>,
    pub(crate) activation: Ignored<Activation>,
    pub(crate) input_size: usize,
    pub(crate) output_size: usize,
}

impl<B: Backend> NeuromodNetwork<B> {
    /// Width of the auxiliary signal the network consumes.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Width of the produced modulation signal.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Maps an auxiliary signal `[batch, input_size]` to a modulation signal
    /// `[batch, output_size]`.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = input;
        for layer in &self.layers {
            x = self.activation.apply(layer.forward(x));
        }
        x
    }
}
