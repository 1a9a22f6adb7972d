//! Closed-form Continuous-time (CfC) Cell Implementation
//!
//! The CfC cell is a fast approximation of the LTC (Liquid Time-Constant)
//! cell. It provides closed-form solutions to continuous-time neural dynamics
//! without requiring iterative ODE solvers.
//!
//! Four modes are supported:
//! - **Default**: Gated interpolation between two feedforward paths
//! - **Pure**: Direct closed-form solution without gating
//! - **NoGate**: Simplified gating with addition instead of interpolation
//! - **Neuromodulated**: Closed-form solution whose decay rate follows an
//!   auxiliary signal produced by a [`NeuromodNetwork`]
//!
//! Each mode owns exactly the parameters it needs through the [`CfcHead`]
//! sum type, so a cell can never carry a parameter set that disagrees with
//! its update rule.

use std::fmt;
use std::str::FromStr;

use burn::config::Config;
use burn::module::{Module, Param};
use burn::nn::{Initializer, Linear};
use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::{Distribution, Tensor};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::cells::backbone::Backbone;
use crate::cells::init_linear;
use crate::cells::neuromod::{NeuromodConfig, NeuromodNetwork};
use crate::error::{CfcError, Result};

/// CfC cell operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CfcMode {
    /// Gated interpolation: `h' = tanh(ff1) * (1 - σ) + tanh(ff2) * σ`
    Default,
    /// Closed-form decay driven by `ff1` itself
    Pure,
    /// Additive gating: `h' = tanh(ff1) + tanh(ff2) * σ`
    NoGate,
    /// Closed-form decay driven by an auxiliary modulation signal
    Neuromodulated,
}

impl CfcMode {
    /// Lower-case keyword form, matching what [`FromStr`] accepts.
    pub fn as_str(&self) -> &'static str {
        match self {
            CfcMode::Default => "default",
            CfcMode::Pure => "pure",
            CfcMode::NoGate => "no_gate",
            CfcMode::Neuromodulated => "neuromodulated",
        }
    }
}

impl fmt::Display for CfcMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CfcMode {
    type Err = CfcError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(CfcMode::Default),
            "pure" => Ok(CfcMode::Pure),
            "no_gate" => Ok(CfcMode::NoGate),
            "neuromodulated" => Ok(CfcMode::Neuromodulated),
            other => Err(CfcError::InvalidConfiguration(format!(
                "Unknown mode: {other}. Valid options are default, pure, no_gate, neuromodulated"
            ))),
        }
    }
}

/// Settings for a [`CfcCell`].
///
/// ```rust
/// use liquid_cfc::cells::{CfcCellConfig, CfcMode};
///
/// let config = CfcCellConfig::new(20, 50)
///     .with_mode(CfcMode::Pure)
///     .with_backbone_units(64)
///     .with_backbone_layers(2);
/// ```
#[derive(Config, Debug)]
pub struct CfcCellConfig {
    /// Number of input features
    pub input_size: usize,
    /// Number of hidden units
    pub hidden_size: usize,
    /// Update rule variant
    #[config(default = "CfcMode::Default")]
    pub mode: CfcMode,
    /// Activation between backbone layers
    #[config(default = "Activation::LecunTanh")]
    pub backbone_activation: Activation,
    /// Width of each backbone layer
    #[config(default = 128)]
    pub backbone_units: usize,
    /// Number of backbone layers; zero disables the backbone
    #[config(default = 1)]
    pub backbone_layers: usize,
    /// Dropout rate applied after each backbone block beyond the first
    #[config(default = 0.0)]
    pub backbone_dropout: f64,
    /// Neuromodulation network settings, required for
    /// [`CfcMode::Neuromodulated`] and ignored otherwise
    pub neuromod: Option<NeuromodConfig>,
}

impl CfcCellConfig {
    /// Builds the cell on the given device.
    ///
    /// Fails with [`CfcError::InvalidConfiguration`] when the neuromodulation
    /// settings are missing or inconsistent for the selected mode.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<CfcCell<B>> {
        let cat_shape = if self.backbone_layers > 0 {
            self.backbone_units
        } else {
            self.input_size + self.hidden_size
        };

        if self.neuromod.is_some() && self.mode != CfcMode::Neuromodulated {
            log::warn!(
                "neuromod network configured but mode is {}; the network is not built",
                self.mode
            );
        }

        let head = match self.mode {
            CfcMode::Default => {
                CfcHead::Default(GateHead::new(cat_shape, self.hidden_size, device))
            }
            CfcMode::NoGate => CfcHead::NoGate(GateHead::new(cat_shape, self.hidden_size, device)),
            CfcMode::Pure => CfcHead::Pure(DecayHead::new(self.hidden_size, device)),
            CfcMode::Neuromodulated => {
                let config = self.neuromod.as_ref().ok_or_else(|| {
                    CfcError::InvalidConfiguration(
                        "neuromodulated mode requires neuromod network dims".into(),
                    )
                })?;
                let network = config.init(device)?;
                if network.output_size() != self.hidden_size {
                    return Err(CfcError::InvalidConfiguration(format!(
                        "neuromod network must end at hidden_size ({}), got {}",
                        self.hidden_size,
                        network.output_size()
                    )));
                }
                CfcHead::Neuromodulated(NeuromodHead {
                    decay: DecayHead::new(self.hidden_size, device),
                    network,
                })
            }
        };

        let backbone = (self.backbone_layers > 0).then(|| {
            Backbone::new(
                self.input_size + self.hidden_size,
                self.backbone_units,
                self.backbone_layers,
                self.backbone_dropout,
                self.backbone_activation,
                device,
            )
        });

        log::debug!(
            "built {} mode CfC cell: input={}, hidden={}, cat_shape={}",
            self.mode,
            self.input_size,
            self.hidden_size,
            cat_shape
        );

        Ok(CfcCell {
            input_size: self.input_size,
            hidden_size: self.hidden_size,
            cat_shape,
            backbone,
            ff1: init_linear(cat_shape, self.hidden_size, device),
            head,
            sparsity_mask: None,
        })
    }
}

/// Mode-specific parameters.
///
/// Exactly one variant exists per cell, so a parameter set that disagrees
/// with the active update rule is unrepresentable.
#[derive(Module, Debug)]
pub enum CfcHead<B: Backend> {
    /// Gated interpolation parameters
    Default(GateHead<B>),
    /// Additive gating parameters
    NoGate(GateHead<B>),
    /// Closed-form decay parameters
    Pure(DecayHead<B>),
    /// Closed-form decay parameters plus the modulation network
    Neuromodulated(NeuromodHead<B>),
}

/// Second feedforward path and the two gate projections of the gated modes.
#[derive(Module, Debug)]
pub struct GateHead<B: Backend> {
    ff2: Linear<B>,
    time_a: Linear<B>,
    time_b: Linear<B>,
}

impl<B: Backend> GateHead<B> {
    fn new(cat_shape: usize, hidden_size: usize, device: &B::Device) -> Self {
        Self {
            ff2: init_linear(cat_shape, hidden_size, device),
            time_a: init_linear(cat_shape, hidden_size, device),
            time_b: init_linear(cat_shape, hidden_size, device),
        }
    }

    /// Computes `tanh(ff2)` and the interpolation weight
    /// `sigmoid(time_a(x) * ts + time_b(x))`.
    ///
    /// Only `ff2` honors the sparsity mask; the gate projections always run
    /// with raw weights.
    fn terms(
        &self,
        x: Tensor<B, 2>,
        mask: Option<&Tensor<B, 2>>,
        ts: &ElapsedTime<B>,
    ) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let ff2 = masked_forward(&self.ff2, x.clone(), mask).tanh();
        let t_a = self.time_a.forward(x.clone());
        let t_b = self.time_b.forward(x);
        let t_interp = activation::sigmoid(ts.scale(t_a) + t_b);
        (ff2, t_interp)
    }
}

/// `w_tau`/`A` parameters of the closed-form decay solution.
///
/// `w_tau` starts at zero and `A` at one, so an untrained cell already
/// produces bounded dynamics.
#[derive(Module, Debug)]
pub struct DecayHead<B: Backend> {
    w_tau: Param<Tensor<B, 2>>,
    a: Param<Tensor<B, 2>>,
}

impl<B: Backend> DecayHead<B> {
    fn new(hidden_size: usize, device: &B::Device) -> Self {
        Self {
            w_tau: Initializer::Zeros.init([1, hidden_size], device),
            a: Initializer::Ones.init([1, hidden_size], device),
        }
    }

    /// Closed-form solution `-A * exp(-ts * decay) * ff1 + A` with
    /// `decay = |w_tau| + |modulation|`.
    ///
    /// In pure mode the modulation tensor is `ff1` itself; in neuromodulated
    /// mode the auxiliary signal sets the decay rate while the state
    /// magnitude stays driven by `ff1`. The asymmetry is intentional.
    fn solve(
        &self,
        ff1: Tensor<B, 2>,
        modulation: Tensor<B, 2>,
        ts: &ElapsedTime<B>,
    ) -> CfcStep<B> {
        let decay = self.w_tau.val().abs() + modulation.abs();
        let exponent = ts.scale(decay.clone()).neg().exp();
        let hidden = -self.a.val() * exponent * ff1 + self.a.val();

        CfcStep {
            hidden,
            diagnostics: Some(CfcDiagnostics {
                tau_system: decay.recip(),
            }),
        }
    }
}

/// Decay parameters of the neuromodulated mode plus the network that
/// produces the modulation signal.
#[derive(Module, Debug)]
pub struct NeuromodHead<B: Backend> {
    decay: DecayHead<B>,
    network: NeuromodNetwork<B>,
}

/// Input to a single step.
///
/// Most modes take one tensor; neuromodulated cells take the policy input
/// together with the auxiliary signal. Plain tensors and `(policy, neuromod)`
/// pairs convert via `From`, so call sites can pass either directly.
#[derive(Debug, Clone)]
pub enum CfcInput<B: Backend> {
    /// Input for the default, pure and no-gate modes
    Single(Tensor<B, 2>),
    /// Input pair for the neuromodulated mode
    WithNeuromod {
        /// Primary input, concatenated with the hidden state
        policy: Tensor<B, 2>,
        /// Auxiliary signal fed to the neuromodulation network
        neuromod: Tensor<B, 2>,
    },
}

impl<B: Backend> From<Tensor<B, 2>> for CfcInput<B> {
    fn from(input: Tensor<B, 2>) -> Self {
        CfcInput::Single(input)
    }
}

impl<B: Backend> From<(Tensor<B, 2>, Tensor<B, 2>)> for CfcInput<B> {
    fn from((policy, neuromod): (Tensor<B, 2>, Tensor<B, 2>)) -> Self {
        CfcInput::WithNeuromod { policy, neuromod }
    }
}

/// Elapsed continuous time since the previous step.
///
/// Either one scalar shared by the whole batch, or a tensor broadcastable
/// against `[batch, hidden_size]` (usually `[batch, 1]`).
#[derive(Debug, Clone)]
pub enum ElapsedTime<B: Backend> {
    /// Same elapsed time for every sequence in the batch
    Uniform(f32),
    /// Per-batch (or per-unit) elapsed time
    Tensor(Tensor<B, 2>),
}

impl<B: Backend> ElapsedTime<B> {
    /// Multiplies `x` by the elapsed time.
    fn scale(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        match self {
            ElapsedTime::Uniform(ts) => x.mul_scalar(*ts),
            ElapsedTime::Tensor(ts) => x * ts.clone(),
        }
    }
}

impl<B: Backend> From<f32> for ElapsedTime<B> {
    fn from(ts: f32) -> Self {
        ElapsedTime::Uniform(ts)
    }
}

impl<B: Backend> From<Tensor<B, 2>> for ElapsedTime<B> {
    fn from(ts: Tensor<B, 2>) -> Self {
        ElapsedTime::Tensor(ts)
    }
}

/// Diagnostic values recorded by the decay-based modes.
#[derive(Debug, Clone)]
pub struct CfcDiagnostics<B: Backend> {
    /// Instantaneous per-unit time constant `1 / decay`, shape `[batch, hidden_size]`
    pub tau_system: Tensor<B, 2>,
}

/// Result of a single [`CfcCell::step`] call.
#[derive(Debug, Clone)]
pub struct CfcStep<B: Backend> {
    /// New hidden state, shape `[batch, hidden_size]`
    pub hidden: Tensor<B, 2>,
    /// Populated by the pure and neuromodulated modes, `None` otherwise
    pub diagnostics: Option<CfcDiagnostics<B>>,
}

/// A Closed-form Continuous-time cell
///
/// This is an RNNCell that processes single time-steps. To get a full RNN
/// that can process sequences, see [`Cfc`](crate::rnn::Cfc).
///
/// # Type Parameters
/// * `B` - The backend type
#[derive(Module, Debug)]
pub struct CfcCell<B: Backend> {
    input_size: usize,
    hidden_size: usize,
    cat_shape: usize,
    backbone: Option<Backbone<B>>,
    ff1: Linear<B>,
    head: CfcHead<B>,
    /// Stored transposed and absolute-valued, shaped like the weights it masks
    sparsity_mask: Option<Tensor<B, 2>>,
}

impl<B: Backend> CfcCell<B> {
    /// Set a sparsity mask enforcing a fixed connectivity pattern on the
    /// `ff1` (and, in gated modes, `ff2`) projections.
    ///
    /// Rows index hidden units and columns index the projection input, so the
    /// expected shape is `[hidden_size, cat_shape]`. The mask is stored
    /// transposed and absolute-valued, lined up element-wise with the
    /// `[cat_shape, hidden_size]` weight matrices it multiplies. The gate
    /// projections `time_a`/`time_b` stay unmasked.
    pub fn with_sparsity_mask(mut self, mask: Array2<f32>, device: &B::Device) -> Result<Self> {
        let (rows, cols) = mask.dim();
        if rows != self.hidden_size || cols != self.cat_shape {
            return Err(CfcError::InvalidConfiguration(format!(
                "sparsity mask must be [{}, {}], got [{rows}, {cols}]",
                self.hidden_size, self.cat_shape
            )));
        }

        let data: Vec<f32> = mask.t().iter().map(|w| w.abs()).collect();
        let mask = Tensor::<B, 1>::from_floats(data.as_slice(), device).reshape([cols, rows]);
        self.sparsity_mask = Some(mask);
        Ok(self)
    }

    /// Get input size
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Get hidden size
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Width of the feature vector entering the head projections: the
    /// backbone width, or `input_size + hidden_size` without a backbone.
    /// Sparsity masks are shaped `[hidden_size, cat_shape]`.
    pub fn cat_shape(&self) -> usize {
        self.cat_shape
    }

    /// Get the active mode
    pub fn mode(&self) -> CfcMode {
        match self.head {
            CfcHead::Default(_) => CfcMode::Default,
            CfcHead::Pure(_) => CfcMode::Pure,
            CfcHead::NoGate(_) => CfcMode::NoGate,
            CfcHead::Neuromodulated(_) => CfcMode::Neuromodulated,
        }
    }

    /// Check if this cell has a sparsity mask
    pub fn has_sparsity_mask(&self) -> bool {
        self.sparsity_mask.is_some()
    }

    /// Perform a forward pass through the CfC cell
    ///
    /// Returns the new hidden state twice, as `(output, next_state)`, per the
    /// usual recurrent-cell convention. See [`Self::step`] for the variant
    /// that also reports diagnostics and accepts tensor-valued elapsed time.
    pub fn forward(
        &self,
        input: impl Into<CfcInput<B>>,
        hx: Tensor<B, 2>,
        ts: f32,
    ) -> Result<(Tensor<B, 2>, Tensor<B, 2>)> {
        let step = self.step(input, hx, ts)?;
        Ok((step.hidden.clone(), step.hidden))
    }

    /// Advance the hidden state by `ts` elapsed time.
    ///
    /// Fails with [`CfcError::InvalidInput`] when the input arity does not
    /// match the mode: neuromodulated cells take a `(policy, neuromod)` pair,
    /// every other mode takes a single tensor.
    pub fn step(
        &self,
        input: impl Into<CfcInput<B>>,
        hx: Tensor<B, 2>,
        ts: impl Into<ElapsedTime<B>>,
    ) -> Result<CfcStep<B>> {
        let ts = ts.into();

        match (input.into(), &self.head) {
            (CfcInput::Single(input), CfcHead::Default(gate)) => {
                let (x, ff1) = self.trunk(input, hx);
                let ff1 = ff1.tanh();
                let (ff2, t_interp) = gate.terms(x, self.sparsity_mask.as_ref(), &ts);
                let hidden = ff1 * (t_interp.ones_like() - t_interp.clone()) + t_interp * ff2;
                Ok(CfcStep {
                    hidden,
                    diagnostics: None,
                })
            }
            (CfcInput::Single(input), CfcHead::NoGate(gate)) => {
                let (x, ff1) = self.trunk(input, hx);
                let ff1 = ff1.tanh();
                let (ff2, t_interp) = gate.terms(x, self.sparsity_mask.as_ref(), &ts);
                let hidden = ff1 + t_interp * ff2;
                Ok(CfcStep {
                    hidden,
                    diagnostics: None,
                })
            }
            (CfcInput::Single(input), CfcHead::Pure(head)) => {
                let (_, ff1) = self.trunk(input, hx);
                Ok(head.solve(ff1.clone(), ff1, &ts))
            }
            (CfcInput::WithNeuromod { policy, neuromod }, CfcHead::Neuromodulated(head)) => {
                let (_, ff1) = self.trunk(policy, hx);
                let signal = head.network.forward(neuromod);
                Ok(head.decay.solve(ff1, signal, &ts))
            }
            (CfcInput::Single(_), CfcHead::Neuromodulated(_)) => Err(CfcError::InvalidInput(
                "neuromodulated cells must be given a (policy, neuromod) input pair".into(),
            )),
            (CfcInput::WithNeuromod { .. }, _) => Err(CfcError::InvalidInput(format!(
                "cell in {} mode takes a single input tensor",
                self.mode()
            ))),
        }
    }

    /// Swap in a different neuromodulation network.
    ///
    /// The replacement is validated first: its declared input width must
    /// match the current network's, and a probe evaluation must produce a
    /// `hidden_size`-wide signal. On any failure the cell keeps its original
    /// network untouched.
    pub fn replace_neuromod_network(&mut self, network: NeuromodNetwork<B>) -> Result<()> {
        let mode = self.mode();
        let hidden_size = self.hidden_size;
        let head = match &mut self.head {
            CfcHead::Neuromodulated(head) => head,
            _ => {
                return Err(CfcError::InvalidOperation(format!(
                    "cell in {mode} mode has no neuromodulation network to replace"
                )))
            }
        };

        let expected = head.network.input_size();
        if network.input_size() != expected {
            return Err(CfcError::InvalidConfiguration(format!(
                "replacement network has incorrect input size: expected {expected}, got {}",
                network.input_size()
            )));
        }

        // The layer stack is the only authority on the produced width, so run
        // the candidate once on a synthetic probe before accepting it.
        let device = network.devices().first().cloned().unwrap_or_default();
        let probe = Tensor::<B, 2>::random([1, expected], Distribution::Uniform(0.0, 1.0), &device);
        let produced = network.forward(probe).dims()[1];
        if produced != hidden_size {
            return Err(CfcError::InvalidConfiguration(format!(
                "replacement network has incorrect output size: expected {hidden_size}, got {produced}"
            )));
        }

        head.network = network;
        log::debug!("neuromodulation network replaced: {expected} -> {produced}");
        Ok(())
    }

    /// Concatenates input and hidden state, runs the backbone, and computes
    /// the (masked) `ff1` projection shared by every mode.
    fn trunk(&self, input: Tensor<B, 2>, hx: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let x = Tensor::cat(vec![input, hx], 1);
        let x = match &self.backbone {
            Some(backbone) => backbone.forward(x),
            None => x,
        };
        let ff1 = masked_forward(&self.ff1, x.clone(), self.sparsity_mask.as_ref());
        (x, ff1)
    }
}

/// Affine projection with the weight optionally masked element-wise.
fn masked_forward<B: Backend>(
    linear: &Linear<B>,
    x: Tensor<B, 2>,
    mask: Option<&Tensor<B, 2>>,
) -> Tensor<B, 2> {
    match mask {
        Some(mask) => {
            let out = x.matmul(linear.weight.val() * mask.clone());
            match &linear.bias {
                Some(bias) => out + bias.val().unsqueeze(),
                None => out,
            }
        }
        None => linear.forward(x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::module::Ignored;
    use burn::tensor::backend::Backend as BurnBackend;

    type TestBackend = NdArray<f32>;
    type TestDevice = <TestBackend as BurnBackend>::Device;

    fn get_test_device() -> TestDevice {
        Default::default()
    }

    /// Affine layer with an all-zero weight, so its output is the bias alone.
    fn bias_only(d_input: usize, bias: &[f32], device: &TestDevice) -> Linear<TestBackend> {
        Linear {
            weight: Param::from_tensor(Tensor::zeros([d_input, bias.len()], device)),
            bias: Some(Param::from_tensor(Tensor::from_floats(bias, device))),
        }
    }

    #[test]
    fn test_head_matches_mode() {
        let device = get_test_device();

        let default = CfcCellConfig::new(4, 8).init::<TestBackend>(&device).unwrap();
        assert!(matches!(default.head, CfcHead::Default(_)));
        assert_eq!(default.mode(), CfcMode::Default);

        let pure = CfcCellConfig::new(4, 8)
            .with_mode(CfcMode::Pure)
            .init::<TestBackend>(&device)
            .unwrap();
        assert!(matches!(pure.head, CfcHead::Pure(_)));
        assert_eq!(pure.mode(), CfcMode::Pure);

        let no_gate = CfcCellConfig::new(4, 8)
            .with_mode(CfcMode::NoGate)
            .init::<TestBackend>(&device)
            .unwrap();
        assert!(matches!(no_gate.head, CfcHead::NoGate(_)));

        let neuromodulated = CfcCellConfig::new(4, 8)
            .with_mode(CfcMode::Neuromodulated)
            .with_neuromod(Some(NeuromodConfig::new(vec![3, 8])))
            .init::<TestBackend>(&device)
            .unwrap();
        assert!(matches!(neuromodulated.head, CfcHead::Neuromodulated(_)));
    }

    #[test]
    fn test_decay_parameters_initialized_to_constants() {
        let device = get_test_device();
        let cell = CfcCellConfig::new(4, 8)
            .with_mode(CfcMode::Pure)
            .init::<TestBackend>(&device)
            .unwrap();

        let CfcHead::Pure(head) = &cell.head else {
            panic!("expected a pure head");
        };

        assert_eq!(head.w_tau.val().dims(), [1, 8]);
        assert_eq!(head.a.val().dims(), [1, 8]);

        let w_tau_mag = head.w_tau.val().abs().sum().into_scalar();
        assert!(w_tau_mag < 1e-9, "w_tau should start at zero");

        let a: Vec<f32> = head.a.val().into_data().to_vec().unwrap();
        assert!(a.iter().all(|&v| v == 1.0), "A should start at one");
    }

    #[test]
    fn test_ff1_initialization() {
        let device = get_test_device();
        let cell = CfcCellConfig::new(20, 50)
            .with_backbone_layers(0)
            .init::<TestBackend>(&device)
            .unwrap();

        assert_eq!(cell.cat_shape(), 70);
        assert_eq!(cell.ff1.weight.val().dims(), [70, 50]);

        // Xavier uniform keeps every weight inside ±sqrt(6 / (fan_in + fan_out)).
        let bound = (6.0f32 / (70.0 + 50.0)).sqrt();
        let max_abs = cell.ff1.weight.val().abs().max().into_scalar();
        assert!(max_abs <= bound + 1e-6);
        assert!(max_abs > 0.0);

        let bias_mag = cell
            .ff1
            .bias
            .as_ref()
            .unwrap()
            .val()
            .abs()
            .sum()
            .into_scalar();
        assert!(bias_mag < 1e-9, "biases should start at zero");
    }

    #[test]
    fn test_backbone_changes_cat_shape() {
        let device = get_test_device();

        let with_backbone = CfcCellConfig::new(20, 50).init::<TestBackend>(&device).unwrap();
        assert!(with_backbone.backbone.is_some());
        assert_eq!(with_backbone.cat_shape(), 128);

        let without = CfcCellConfig::new(20, 50)
            .with_backbone_layers(0)
            .init::<TestBackend>(&device)
            .unwrap();
        assert!(without.backbone.is_none());
        assert_eq!(without.cat_shape(), 70);
    }

    #[test]
    fn test_no_gate_formula_at_ts_zero() {
        let device = get_test_device();

        let gate_cell = |time_a_bias: &[f32]| CfcCell::<TestBackend> {
            input_size: 1,
            hidden_size: 2,
            cat_shape: 3,
            backbone: None,
            ff1: bias_only(3, &[0.25, -0.5], &device),
            head: CfcHead::NoGate(GateHead {
                ff2: bias_only(3, &[1.0, 1.0], &device),
                time_a: bias_only(3, time_a_bias, &device),
                time_b: bias_only(3, &[0.0, 0.0], &device),
            }),
            sparsity_mask: None,
        };

        let input = Tensor::<TestBackend, 2>::from_floats([[0.7]], &device);
        let hx = Tensor::<TestBackend, 2>::zeros([1, 2], &device);

        let cell = gate_cell(&[0.0, 0.0]);
        let (out, _) = cell.forward(input.clone(), hx.clone(), 0.0).unwrap();

        // ts = 0 gives t_interp = sigmoid(t_b) = 0.5, so h' = tanh(ff1) + 0.5 * tanh(ff2).
        let got: Vec<f32> = out.clone().into_data().to_vec().unwrap();
        let expected = [
            0.25f32.tanh() + 0.5 * 1.0f32.tanh(),
            (-0.5f32).tanh() + 0.5 * 1.0f32.tanh(),
        ];
        for (g, e) in got.iter().zip(expected) {
            assert!((g - e).abs() < 1e-6, "got {g}, expected {e}");
        }

        // At ts = 0 the gate ignores time_a entirely.
        let steep = gate_cell(&[50.0, -50.0]);
        let (out_steep, _) = steep.forward(input, hx, 0.0).unwrap();
        assert_eq!(out.into_data(), out_steep.into_data());
    }

    #[test]
    fn test_pure_formula_and_tau_at_ts_zero() {
        let device = get_test_device();

        let cell = CfcCell::<TestBackend> {
            input_size: 1,
            hidden_size: 2,
            cat_shape: 3,
            backbone: None,
            ff1: bias_only(3, &[0.25, -0.5], &device),
            head: CfcHead::Pure(DecayHead::new(2, &device)),
            sparsity_mask: None,
        };

        let input = Tensor::<TestBackend, 2>::from_floats([[0.7]], &device);
        let hx = Tensor::<TestBackend, 2>::zeros([1, 2], &device);
        let step = cell.step(input, hx, 0.0).unwrap();

        // exp(0) = 1 regardless of the decay, so h' = -A * ff1 + A = 1 - ff1.
        let got: Vec<f32> = step.hidden.into_data().to_vec().unwrap();
        assert!((got[0] - 0.75).abs() < 1e-6);
        assert!((got[1] - 1.5).abs() < 1e-6);

        // decay = |w_tau| + |ff1| = [0.25, 0.5] even at ts = 0.
        let tau: Vec<f32> = step
            .diagnostics
            .unwrap()
            .tau_system
            .into_data()
            .to_vec()
            .unwrap();
        assert!((tau[0] - 4.0).abs() < 1e-5);
        assert!((tau[1] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_per_unit_tensor_timespans() {
        let device = get_test_device();

        let cell = CfcCell::<TestBackend> {
            input_size: 1,
            hidden_size: 2,
            cat_shape: 3,
            backbone: None,
            ff1: bias_only(3, &[1.0, 1.0], &device),
            head: CfcHead::Pure(DecayHead::new(2, &device)),
            sparsity_mask: None,
        };

        let input = Tensor::<TestBackend, 2>::from_floats([[0.7], [0.7]], &device);
        let hx = Tensor::<TestBackend, 2>::zeros([2, 2], &device);

        // ff1 = 1 everywhere, so decay = 1 and h' = 1 - exp(-ts) per entry. A
        // [batch, hidden] ts advances every unit by its own elapsed time.
        let ts = Tensor::<TestBackend, 2>::from_floats([[0.0, 2.0], [1.0, 1.0]], &device);
        let step = cell.step(input, hx, ts).unwrap();

        let got: Vec<f32> = step.hidden.into_data().to_vec().unwrap();
        let expected = [
            0.0,
            1.0 - (-2.0f32).exp(),
            1.0 - (-1.0f32).exp(),
            1.0 - (-1.0f32).exp(),
        ];
        for (g, e) in got.iter().zip(expected) {
            assert!((g - e).abs() < 1e-6, "got {g}, expected {e}");
        }

        // The time constant depends on the decay alone, not on ts.
        let tau: Vec<f32> = step
            .diagnostics
            .unwrap()
            .tau_system
            .into_data()
            .to_vec()
            .unwrap();
        assert!(tau.iter().all(|&t| (t - 1.0).abs() < 1e-5));
    }

    #[test]
    fn test_neuromod_decay_follows_signal() {
        let device = get_test_device();

        // Zero-weight network: the signal is tanh(2.0) for any auxiliary input.
        let network = NeuromodNetwork::<TestBackend> {
            layers: vec![bias_only(1, &[2.0], &device)],
            activation: Ignored(Activation::Tanh),
            input_size: 1,
            output_size: 1,
        };

        let cell = CfcCell::<TestBackend> {
            input_size: 1,
            hidden_size: 1,
            cat_shape: 2,
            backbone: None,
            ff1: bias_only(2, &[0.5], &device),
            head: CfcHead::Neuromodulated(NeuromodHead {
                decay: DecayHead::new(1, &device),
                network,
            }),
            sparsity_mask: None,
        };

        let policy = Tensor::<TestBackend, 2>::from_floats([[0.1]], &device);
        let aux = Tensor::<TestBackend, 2>::from_floats([[3.0]], &device);
        let hx = Tensor::<TestBackend, 2>::zeros([1, 1], &device);
        let step = cell.step((policy, aux), hx, 1.0).unwrap();

        // The signal drives the decay, ff1 keeps driving the magnitude.
        let signal = 2.0f32.tanh();
        let expected = 1.0 - 0.5 * (-signal).exp();
        let got = step.hidden.into_scalar();
        assert!((got - expected).abs() < 1e-6, "got {got}, expected {expected}");

        let tau = step.diagnostics.unwrap().tau_system.into_scalar();
        assert!((tau - 1.0 / signal).abs() < 1e-5);
    }

    #[test]
    fn test_mask_stored_transposed_and_absolute() {
        let device = get_test_device();
        let cell = CfcCellConfig::new(1, 2)
            .with_backbone_layers(0)
            .init::<TestBackend>(&device)
            .unwrap();

        let mask = Array2::from_shape_vec((2, 3), vec![-1.0, 2.0, -3.0, 4.0, -5.0, 6.0]).unwrap();
        let cell = cell.with_sparsity_mask(mask, &device).unwrap();

        let stored = cell.sparsity_mask.clone().unwrap();
        assert_eq!(stored.dims(), [3, 2]);

        let data: Vec<f32> = stored.into_data().to_vec().unwrap();
        assert_eq!(data, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_mask_zeroes_selected_weights() {
        let device = get_test_device();

        // Neuron 1 loses all incoming ff1 weight, keeping only its bias.
        let mask = Array2::from_shape_vec((2, 3), vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0]).unwrap();
        let cell = CfcCell::<TestBackend> {
            input_size: 1,
            hidden_size: 2,
            cat_shape: 3,
            backbone: None,
            ff1: Linear {
                weight: Param::from_tensor(Tensor::from_floats(
                    [[1.0, 1.0], [0.0, 0.0], [0.0, 0.0]],
                    &device,
                )),
                bias: Some(Param::from_tensor(Tensor::from_floats([0.0, 0.25], &device))),
            },
            head: CfcHead::Pure(DecayHead::new(2, &device)),
            sparsity_mask: None,
        }
        .with_sparsity_mask(mask, &device)
        .unwrap();

        let hx = Tensor::<TestBackend, 2>::zeros([1, 2], &device);
        let (a, _) = cell
            .forward(
                Tensor::<TestBackend, 2>::from_floats([[0.3]], &device),
                hx.clone(),
                1.0,
            )
            .unwrap();
        let (b, _) = cell
            .forward(
                Tensor::<TestBackend, 2>::from_floats([[-1.2]], &device),
                hx,
                1.0,
            )
            .unwrap();

        let a: Vec<f32> = a.into_data().to_vec().unwrap();
        let b: Vec<f32> = b.into_data().to_vec().unwrap();

        // Masked neuron: ff1 = bias = 0.25 whatever the input.
        let expected = 1.0 - 0.25 * (-0.25f32).exp();
        assert!((a[1] - expected).abs() < 1e-6);
        assert!((b[1] - expected).abs() < 1e-6);

        // Unmasked neuron still follows the input.
        assert!((a[0] - b[0]).abs() > 1e-4);
    }
}
