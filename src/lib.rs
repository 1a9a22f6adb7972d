//! # liquid-cfc - Closed-form Continuous-time Cells
//!
//! Closed-form Continuous-time (CfC) recurrent cells for the Burn framework:
//! liquid networks that treat elapsed time as a first-class input instead of
//! assuming a fixed step.
//!
//! ## Features
//!
//! - **Four update rules**: `default`, `pure`, `no_gate`, and `neuromodulated`,
//!   selected per cell and carried by a typed parameter head
//! - **Backbone**: optional stack of affine layers shared by all projections
//! - **Sparsity Masks**: fixed connectivity patterns enforced at the weight level
//! - **Neuromodulation**: an auxiliary network that steers the decay rate,
//!   hot-swappable at runtime
//! - **Diagnostics**: per-unit time constants reported by the decay-based modes
//! - **Sequence Runner**: batching, state management, and per-step elapsed
//!   times over whole sequences
//!
//! ## Quick Start
//!
//! ```rust
//! use liquid_cfc::prelude::*;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//!
//! let device = Default::default();
//! let cell = CfcCellConfig::new(16, 32)
//!     .with_backbone_layers(0)
//!     .init::<Backend>(&device)
//!     .unwrap();
//!
//! // One step: [batch=4, features=16] advances a [batch=4, hidden=32] state.
//! let input = Tensor::<Backend, 2>::zeros([4, 16], &device);
//! let hidden = Tensor::<Backend, 2>::zeros([4, 32], &device);
//! let (output, new_hidden) = cell.forward(input, hidden, 1.0).unwrap();
//!
//! assert_eq!(output.dims(), [4, 32]);
//! assert_eq!(new_hidden.dims(), [4, 32]);
//! ```
//!
//! ## Sequence-level Usage
//!
//! For whole sequences, wrap the cell in a [`rnn::Cfc`] runner:
//!
//! ```ignore
//! use liquid_cfc::prelude::*;
//!
//! let cfc = CfcConfig::new(CfcCellConfig::new(16, 32))
//!     .with_return_sequences(false)
//!     .init::<Backend>(&device)?;
//!
//! let (output, state) = cfc.forward(input, None, None)?;
//! ```

pub mod activation;
pub mod cells;
pub mod error;
pub mod rnn;

pub mod prelude {
    pub use crate::activation::{Activation, LeCun};
    pub use crate::cells::{
        CfcCell, CfcCellConfig, CfcDiagnostics, CfcInput, CfcMode, CfcStep, ElapsedTime,
        NeuromodConfig, NeuromodNetwork,
    };
    pub use crate::error::CfcError;
    pub use crate::rnn::{Cfc, CfcConfig, CfcSequence};
}
