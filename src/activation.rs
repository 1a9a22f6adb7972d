//! Activation functions for CfC cells
//!
//! This module provides the closed set of backbone/neuromodulation activations
//! plus LeCun's scaled tanh, which is not available in Burn's standard library.

use std::fmt;
use std::str::FromStr;

use burn::tensor::activation;
use burn::tensor::{backend::Backend, Tensor};
use serde::{Deserialize, Serialize};

use crate::error::CfcError;

/// LeCun's tanh activation function.
///
/// This activation function is defined as:
/// `f(x) = 1.7159 * tanh(0.666 * x)`
///
/// It provides a smoother alternative to standard tanh with better gradient flow
/// properties. The scaling factors (1.7159 and 0.666) are chosen such that:
/// - The function approximates the identity near the origin
/// - The output range is approximately [-1.7159, 1.7159]
///
/// # Example
///
/// ```rust
/// use burn::backend::NdArray;
/// use burn::tensor::Tensor;
/// use liquid_cfc::activation::LeCun;
///
/// type Backend = NdArray<f32>;
/// let device = Default::default();
///
/// let x = Tensor::<Backend, 1>::from_floats([0.0, 1.0, -1.0], &device);
/// let y = LeCun::forward(x);
/// ```
pub struct LeCun;

impl LeCun {
    /// Applies the LeCun tanh activation function.
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor of any dimension
    ///
    /// # Returns
    ///
    /// Tensor with LeCun activation applied element-wise
    pub fn forward<B: Backend, const D: usize>(x: Tensor<B, D>) -> Tensor<B, D> {
        // LeCun tanh: 1.7159 * tanh(0.666 * x)
        let scaled = x * 0.666f32;
        scaled.tanh() * 1.7159f32
    }
}

/// Applies LeCun activation to a tensor.
///
/// This is a convenience trait extension for applying LeCun activation directly on tensors.
pub trait LeCunActivation {
    /// Applies LeCun activation
    fn lecun(self) -> Self;
}

impl<B: Backend, const D: usize> LeCunActivation for Tensor<B, D> {
    fn lecun(self) -> Self {
        LeCun::forward(self)
    }
}

/// Nonlinearity used by the backbone and neuromodulation stacks.
///
/// The serialized form and the [`FromStr`] keywords are the lower-case names
/// `silu`, `relu`, `tanh`, `gelu` and `lecun_tanh`; anything else is rejected
/// at the parse boundary so an unknown name can never reach a built cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Sigmoid-weighted linear unit
    Silu,
    /// Rectified linear unit
    Relu,
    /// Hyperbolic tangent
    Tanh,
    /// Gaussian error linear unit
    Gelu,
    /// LeCun's scaled tanh, see [`LeCun`]
    LecunTanh,
}

impl Activation {
    /// Applies the activation element-wise.
    pub fn apply<B: Backend, const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Activation::Silu => activation::silu(x),
            Activation::Relu => activation::relu(x),
            Activation::Tanh => x.tanh(),
            Activation::Gelu => activation::gelu(x),
            Activation::LecunTanh => x.lecun(),
        }
    }

    /// Lower-case keyword form, matching what [`FromStr`] accepts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Activation::Silu => "silu",
            Activation::Relu => "relu",
            Activation::Tanh => "tanh",
            Activation::Gelu => "gelu",
            Activation::LecunTanh => "lecun_tanh",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Activation {
    type Err = CfcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "silu" => Ok(Activation::Silu),
            "relu" => Ok(Activation::Relu),
            "tanh" => Ok(Activation::Tanh),
            "gelu" => Ok(Activation::Gelu),
            "lecun_tanh" => Ok(Activation::LecunTanh),
            other => Err(CfcError::InvalidConfiguration(format!(
                "Unknown activation: {other}. Valid options are silu, relu, tanh, gelu, lecun_tanh"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Tensor;

    type Backend = NdArray<f32>;

    #[test]
    fn test_lecun_tanh_zero() {
        let device = Default::default();
        let x = Tensor::<Backend, 1>::zeros([5], &device);
        let y = LeCun::forward(x);

        // tanh(0) = 0, so LeCun(0) = 0
        let sum = y.sum().into_scalar();
        assert!((sum - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_lecun_tanh_range() {
        let device = Default::default();

        // Test various inputs
        let test_values = [-10.0f32, -5.0, -1.0, 0.0, 1.0, 5.0, 10.0];

        for &val in &test_values {
            let x = Tensor::<Backend, 1>::full([1], val, &device);
            let y = LeCun::forward(x);

            let result = y.into_scalar();
            let expected = 1.7159f32 * (0.666f32 * val).tanh();

            assert!(
                (result - expected).abs() < 1e-5,
                "LeCun activation incorrect at x={}",
                val
            );
        }
    }

    #[test]
    fn test_lecun_tanh_saturation() {
        let device = Default::default();

        // Very large positive input should saturate near max
        let x_large_pos = Tensor::<Backend, 1>::full([1], 100.0f32, &device);
        let y_pos = LeCun::forward(x_large_pos);
        assert!(y_pos.into_scalar() > 1.7);

        // Very large negative input should saturate near min
        let x_large_neg = Tensor::<Backend, 1>::full([1], -100.0f32, &device);
        let y_neg = LeCun::forward(x_large_neg);
        assert!(y_neg.into_scalar() < -1.7);
    }

    #[test]
    fn test_lecun_trait() {
        let device = Default::default();
        let x = Tensor::<Backend, 1>::from_floats([0.0f32, 1.0, -1.0], &device);

        // Test using the trait extension
        let y_trait = x.clone().lecun();
        let y_direct = LeCun::forward(x);

        // Compare element by element
        for i in 0..3 {
            let t_val = y_trait.clone().slice([i..i + 1]).into_scalar();
            let d_val = y_direct.clone().slice([i..i + 1]).into_scalar();
            assert!((t_val - d_val).abs() < 1e-6);
        }
    }

    #[test]
    fn test_activation_apply_matches_direct_functions() {
        let device = Default::default();
        let x = Tensor::<Backend, 1>::from_floats([-2.0f32, -0.5, 0.0, 0.5, 2.0], &device);

        let cases: [(Activation, Tensor<Backend, 1>); 5] = [
            (Activation::Silu, burn::tensor::activation::silu(x.clone())),
            (Activation::Relu, burn::tensor::activation::relu(x.clone())),
            (Activation::Tanh, x.clone().tanh()),
            (Activation::Gelu, burn::tensor::activation::gelu(x.clone())),
            (Activation::LecunTanh, LeCun::forward(x.clone())),
        ];

        for (activation, expected) in cases {
            let got = activation.apply(x.clone());
            let diff = (got - expected).abs().max().into_scalar();
            assert!(diff < 1e-6, "{activation} diverged from direct call");
        }
    }

    #[test]
    fn test_activation_from_str() {
        for name in ["silu", "relu", "tanh", "gelu", "lecun_tanh"] {
            let activation: Activation = name.parse().unwrap();
            assert_eq!(activation.as_str(), name);
        }
    }

    #[test]
    fn test_activation_from_str_rejects_unknown() {
        let err = "swish".parse::<Activation>().unwrap_err();
        assert!(matches!(err, CfcError::InvalidConfiguration(_)));
    }
}
