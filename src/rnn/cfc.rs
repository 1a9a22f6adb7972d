//! Closed-form Continuous-time (CfC) RNN Implementation
//!
//! Wraps a [`CfcCell`] so whole sequences can be processed in one call,
//! with optional per-step elapsed times, an optional output projection,
//! and both batch-first and sequence-first layouts.

use burn::config::Config;
use burn::module::Module;
use burn::nn::Linear;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::cells::{init_linear, CfcCell, CfcCellConfig, ElapsedTime};
use crate::error::Result;

/// Settings for a [`Cfc`] sequence runner.
///
/// ```rust
/// use liquid_cfc::cells::CfcCellConfig;
/// use liquid_cfc::rnn::CfcConfig;
///
/// let config = CfcConfig::new(CfcCellConfig::new(20, 50))
///     .with_return_sequences(false)
///     .with_proj_size(Some(10));
/// ```
#[derive(Config, Debug)]
pub struct CfcConfig {
    /// Settings for the wrapped cell
    pub cell: CfcCellConfig,
    /// Whether inputs are `[batch, seq, feature]` (true) or `[seq, batch, feature]`
    #[config(default = true)]
    pub batch_first: bool,
    /// Whether to return every step or only the final one
    #[config(default = true)]
    pub return_sequences: bool,
    /// Optional linear projection applied to each returned step
    pub proj_size: Option<usize>,
}

impl CfcConfig {
    /// Builds the runner (and its cell) on the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<Cfc<B>> {
        let cell = self.cell.init(device)?;
        let proj = self
            .proj_size
            .map(|size| init_linear(cell.hidden_size(), size, device));

        Ok(Cfc {
            cell,
            proj,
            batch_first: self.batch_first,
            return_sequences: self.return_sequences,
            output_size: self.proj_size.unwrap_or(self.cell.hidden_size),
        })
    }
}

/// A sequence of step inputs.
///
/// Plain tensors and `(policy, neuromod)` pairs convert via `From`, mirroring
/// [`CfcInput`](crate::cells::CfcInput) at the sequence level.
#[derive(Debug, Clone)]
pub enum CfcSequence<B: Backend> {
    /// Sequence for the default, pure and no-gate modes
    Single(Tensor<B, 3>),
    /// Sequence pair for the neuromodulated mode, sliced along the same
    /// time axis
    WithNeuromod {
        /// Primary input sequence
        policy: Tensor<B, 3>,
        /// Auxiliary signal sequence
        neuromod: Tensor<B, 3>,
    },
}

impl<B: Backend> From<Tensor<B, 3>> for CfcSequence<B> {
    fn from(input: Tensor<B, 3>) -> Self {
        CfcSequence::Single(input)
    }
}

impl<B: Backend> From<(Tensor<B, 3>, Tensor<B, 3>)> for CfcSequence<B> {
    fn from((policy, neuromod): (Tensor<B, 3>, Tensor<B, 3>)) -> Self {
        CfcSequence::WithNeuromod { policy, neuromod }
    }
}

/// A Closed-form Continuous-time RNN
///
/// Runs a [`CfcCell`] across the time axis of a sequence. Outputs are always
/// batch-first, `[batch, seq, output_size]`, independent of the input layout;
/// with `return_sequences` disabled the sequence axis has length one.
///
/// # Type Parameters
/// * `B` - The backend type
#[derive(Module, Debug)]
pub struct Cfc<B: Backend> {
    cell: CfcCell<B>,
    proj: Option<Linear<B>>,
    batch_first: bool,
    return_sequences: bool,
    output_size: usize,
}

impl<B: Backend> Cfc<B> {
    /// Get input size
    pub fn input_size(&self) -> usize {
        self.cell.input_size()
    }

    /// Get hidden size
    pub fn hidden_size(&self) -> usize {
        self.cell.hidden_size()
    }

    /// Width of each returned step: the projection width if one is
    /// configured, the hidden size otherwise.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// The wrapped cell
    pub fn cell(&self) -> &CfcCell<B> {
        &self.cell
    }

    /// Mutable access to the wrapped cell, e.g. for
    /// [`replace_neuromod_network`](CfcCell::replace_neuromod_network)
    pub fn cell_mut(&mut self) -> &mut CfcCell<B> {
        &mut self.cell
    }

    /// Perform a forward pass over a full sequence.
    ///
    /// # Arguments
    /// * `input` - Step sequence, or a `(policy, neuromod)` pair of sequences
    ///   for neuromodulated cells
    /// * `state` - Initial hidden state `[batch, hidden_size]`; zeros when `None`
    /// * `timespans` - Per-step elapsed times `[batch, seq]`; every step uses
    ///   `ts = 1.0` when `None`
    ///
    /// # Returns
    /// `(outputs, state)` where `outputs` is `[batch, seq, output_size]`
    /// (sequence axis of length one with `return_sequences` disabled) and
    /// `state` is the final hidden state `[batch, hidden_size]`.
    pub fn forward(
        &self,
        input: impl Into<CfcSequence<B>>,
        state: Option<Tensor<B, 2>>,
        timespans: Option<Tensor<B, 2>>,
    ) -> Result<(Tensor<B, 3>, Tensor<B, 2>)> {
        let (policy, neuromod) = match input.into() {
            CfcSequence::Single(policy) => (policy, None),
            CfcSequence::WithNeuromod { policy, neuromod } => (policy, Some(neuromod)),
        };

        let [d0, d1, _features] = policy.dims();
        let (batch_size, seq_len) = if self.batch_first { (d0, d1) } else { (d1, d0) };

        let device = policy.device();
        let mut hidden = match state {
            Some(state) => state,
            None => Tensor::zeros([batch_size, self.cell.hidden_size()], &device),
        };

        let mut outputs = Vec::with_capacity(if self.return_sequences { seq_len } else { 1 });

        for t in 0..seq_len {
            let x = step_slice(&policy, t, self.batch_first);
            let ts = match &timespans {
                Some(timespans) => ElapsedTime::Tensor(timespans.clone().narrow(1, t, 1)),
                None => ElapsedTime::Uniform(1.0),
            };

            let step = match &neuromod {
                Some(neuromod) => self.cell.step(
                    (x, step_slice(neuromod, t, self.batch_first)),
                    hidden.clone(),
                    ts,
                )?,
                None => self.cell.step(x, hidden.clone(), ts)?,
            };
            hidden = step.hidden;

            if self.return_sequences || t == seq_len - 1 {
                let out = match &self.proj {
                    Some(proj) => proj.forward(hidden.clone()),
                    None => hidden.clone(),
                };
                outputs.push(out);
            }
        }

        Ok((Tensor::stack(outputs, 1), hidden))
    }
}

/// One time-step as `[batch, feature]`, whichever axis holds time.
fn step_slice<B: Backend>(input: &Tensor<B, 3>, t: usize, batch_first: bool) -> Tensor<B, 2> {
    if batch_first {
        input.clone().narrow(1, t, 1).squeeze(1)
    } else {
        input.clone().narrow(0, t, 1).squeeze(0)
    }
}
