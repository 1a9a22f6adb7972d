//! # CfC Cell Implementation
//!
//! This module provides the single-timestep CfC cell and its sub-modules.
//! The cell processes one timestep at a time and is wrapped by the
//! higher-level [`Cfc`](crate::rnn::Cfc) layer in [`crate::rnn`] for sequence
//! processing.
//!
//! ## Building Blocks
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CfcCell`] | Closed-form Continuous-time cell, four operating modes |
//! | [`Backbone`] | Optional feed-forward stack in front of the heads |
//! | [`NeuromodNetwork`] | Auxiliary-signal network driving the decay rate |
//!
//! ## When to Use the Cell Directly
//!
//! Most users should use the higher-level [`Cfc`](crate::rnn::Cfc) layer which
//! handles sequence processing automatically. Use the cell directly when you
//! need:
//!
//! - Custom sequence processing logic
//! - Integration with other frameworks
//! - Fine-grained control over state management
//!
//! ## Operating Modes
//!
//! The [`CfcCell`] supports four operating modes via [`CfcMode`]:
//!
//! ### Default Mode (Recommended)
//! ```text
//! h' = tanh(ff1) × (1 - σ(t)) + tanh(ff2) × σ(t)
//! ```
//! Gated interpolation between two feedforward paths. Best balance of
//! expressiveness and stability.
//!
//! ### Pure Mode
//! ```text
//! h' = -A × exp(-t × (|w_τ| + |ff1|)) × ff1 + A
//! ```
//! Direct closed-form solution without gating. More biologically plausible
//! but can be less stable for some tasks.
//!
//! ### NoGate Mode
//! ```text
//! h' = tanh(ff1) + tanh(ff2) × σ(t)
//! ```
//! Simplified mode using addition instead of interpolation. Useful for
//! tasks where gating adds unnecessary complexity.
//!
//! ### Neuromodulated Mode
//! ```text
//! h' = -A × exp(-t × (|w_τ| + |neuromod(aux)|)) × ff1 + A
//! ```
//! Pure-mode dynamics whose decay rate follows an auxiliary signal instead of
//! `ff1`. The cell takes a `(policy, neuromod)` input pair, and the
//! modulation network can be swapped at run time via
//! [`CfcCell::replace_neuromod_network`].
//!
//! ## Tensor Shapes
//!
//! The cell expects 2D tensors for single-timestep processing:
//!
//! | Tensor | Shape | Description |
//! |--------|-------|-------------|
//! | `input` | `[batch, input_size]` | Input features |
//! | `hidden_state` | `[batch, hidden_size]` | Previous hidden state |
//! | `output` | `[batch, hidden_size]` | Cell output |
//! | `new_state` | `[batch, hidden_size]` | Updated hidden state |
//!
//! ## Example: Using CfcCell Directly
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use liquid_cfc::cells::{CfcCellConfig, CfcMode};
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! let cell = CfcCellConfig::new(16, 32)
//!     .with_mode(CfcMode::Default)
//!     .init::<Backend>(&device)
//!     .unwrap();
//!
//! // Process a single timestep
//! let batch = 4;
//! let input = Tensor::<Backend, 2>::zeros([batch, 16], &device);
//! let hidden = Tensor::<Backend, 2>::zeros([batch, 32], &device);
//!
//! let (output, new_hidden) = cell.forward(input, hidden, 1.0).unwrap();
//! // output: [batch, 32]
//! // new_hidden: [batch, 32]
//! ```

use burn::nn::{Initializer, Linear};
use burn::tensor::backend::Backend;

pub mod backbone;
pub mod cfc_cell;
pub mod neuromod;

pub use backbone::Backbone;
pub use cfc_cell::{
    CfcCell, CfcCellConfig, CfcDiagnostics, CfcHead, CfcInput, CfcMode, CfcStep, DecayHead,
    ElapsedTime, GateHead, NeuromodHead,
};
pub use neuromod::{NeuromodConfig, NeuromodNetwork};

/// Affine layer with Xavier-uniform weights and a zero bias.
pub(crate) fn init_linear<B: Backend>(
    d_input: usize,
    d_output: usize,
    device: &B::Device,
) -> Linear<B> {
    let weight = Initializer::XavierUniform { gain: 1.0 }.init_with(
        [d_input, d_output],
        Some(d_input),
        Some(d_output),
        device,
    );
    let bias = Initializer::Zeros.init([d_output], device);
    Linear {
        weight,
        bias: Some(bias),
    }
}
