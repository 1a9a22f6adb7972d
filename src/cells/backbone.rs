//! Feed-forward backbone shared by the cell heads

use burn::module::{Ignored, Module};
use burn::nn::{Dropout, DropoutConfig, Linear};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::activation::Activation;
use crate::cells::init_linear;

/// Feed-forward stack projecting the concatenated input and hidden state into
/// the feature vector consumed by the cell heads.
///
/// The first layer maps `input_size + hidden_size` to `units`; every further
/// layer maps `units` to `units`. The activation runs after each layer, and
/// when a non-zero rate is configured a dropout step follows every block
/// beyond the first.
#[derive(Module, Debug)]
pub struct Backbone<B: Backend> {
    layers: Vec<Linear<B>>,
    dropout: Option<Dropout>,
    activation: Ignored<Activation>,
}

impl<B: Backend> Backbone<B> {
    pub(crate) fn new(
        in_features: usize,
        units: usize,
        layers: usize,
        dropout: f64,
        activation: Activation,
        device: &B::Device,
    ) -> Self {
        let mut stack = Vec::with_capacity(layers);
        stack.push(init_linear(in_features, units, device));
        for _ in 1..layers {
            stack.push(init_linear(units, units, device));
        }
        let dropout = (dropout > 0.0).then(|| DropoutConfig::new(dropout).init());

        Self {
            layers: stack,
            dropout,
            activation: Ignored(activation),
        }
    }

    /// Runs the stack. Dropout is skipped after the first block, matching the
    /// layout `linear, act, [linear, act, drop]*`.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = input;
        for (i, layer) in self.layers.iter().enumerate() {
            x = self.activation.apply(layer.forward(x));
            if i > 0 {
                if let Some(dropout) = &self.dropout {
                    x = dropout.forward(x);
                }
            }
        }
        x
    }
}
