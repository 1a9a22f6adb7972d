//! # RNN Layers for Sequence Processing
//!
//! This module provides the complete RNN layer that handles sequence processing,
//! batching, and hidden state management. **This is the primary API most users should use.**
//!
//! ## Quick Start
//!
//! ```ignore
//! use liquid_cfc::prelude::*;
//! use burn::tensor::Tensor;
//!
//! // Create a CfC layer: 16 input features, 32 hidden units
//! let cfc = CfcConfig::new(CfcCellConfig::new(16, 32)).init::<Backend>(&device)?;
//!
//! // Process sequence: [batch=4, seq_len=10, features=16]
//! let input: Tensor<Backend, 3> = Tensor::zeros([4, 10, 16], &device);
//! let (output, final_state) = cfc.forward(input, None, None)?;
//!
//! // output: [4, 10, 32] - sequence of outputs
//! // final_state: [4, 32] - final hidden state
//! ```
//!
//! ## Tensor Shapes
//!
//! ### Input Tensor (3D)
//!
//! | Format | Shape | Default |
//! |--------|-------|---------|
//! | Batch-first | `[batch, seq_len, features]` | ✓ Yes |
//! | Sequence-first | `[seq_len, batch, features]` | No |
//!
//! Use `.with_batch_first(false)` on the config to switch to sequence-first
//! format. Outputs are always returned batch-first.
//!
//! ### Output Tensor
//!
//! | Setting | Shape | Description |
//! |---------|-------|-------------|
//! | `return_sequences=true` (default) | `[batch, seq_len, output_size]` | All timesteps |
//! | `return_sequences=false` | `[batch, 1, output_size]` | Last timestep only |
//!
//! ### Hidden State Tensor (2D)
//!
//! Shape: `[batch, hidden_size]`
//!
//! - Can be passed back in to preserve state across batches
//! - Unaffected by the output projection
//!
//! ## Common Patterns
//!
//! ### Sequence Classification (return last output only)
//!
//! ```ignore
//! let cfc = CfcConfig::new(CfcCellConfig::new(input_size, hidden_size))
//!     .with_return_sequences(false)
//!     .init::<Backend>(&device)?;
//!
//! let (output, _) = cfc.forward(input, None, None)?;
//! // output: [batch, 1, hidden_size] - just the final output
//! ```
//!
//! ### Stateful Processing (preserve hidden state)
//!
//! ```ignore
//! let (output1, state) = cfc.forward(batch1, None, None)?;
//! let (output2, state) = cfc.forward(batch2, Some(state), None)?;
//! let (output3, state) = cfc.forward(batch3, Some(state), None)?;
//! // State persists across batches
//! ```
//!
//! ### Irregularly-Sampled Sequences (per-step elapsed times)
//!
//! ```ignore
//! // timespans: [batch, seq_len], the time elapsed before each step
//! let (output, _) = cfc.forward(input, None, Some(timespans))?;
//! ```
//!
//! ### Neuromodulated Cells (input pairs)
//!
//! ```ignore
//! let cell = CfcCellConfig::new(input_size, hidden_size)
//!     .with_mode(CfcMode::Neuromodulated)
//!     .with_neuromod(Some(NeuromodConfig::new(vec![aux_size, hidden_size])));
//! let cfc = CfcConfig::new(cell).init::<Backend>(&device)?;
//!
//! // Both sequences are sliced along the same time axis
//! let (output, _) = cfc.forward((policy, neuromod), None, None)?;
//! ```

pub mod cfc;

pub use cfc::{Cfc, CfcConfig, CfcSequence};
