//! Tensor initializers
#![allow(clippy::use_self)] // false positive with serde derives
use serde::{Deserialize, Serialize};
use tch::{nn::Path, Device, Kind, Tensor};

/// Tensor initializers.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum Initializer {
    /// Initialize to all zeros
    Zeros,
    /// Initialize all elements to the given constant value.
    Constant(f64),
    /// Standard normal samples with each row rescaled to the given L2 norm.
    ///
    /// For a `[out_dim, in_dim]` kernel, every output unit's incoming weight vector has norm
    /// equal to the given value. Also known as "normalized columns" initialization
    /// (the columns of the equivalent `[in_dim, out_dim]` matrix).
    Normc(f64),
}

impl Default for Initializer {
    fn default() -> Self {
        Self::Normc(1.0)
    }
}

impl Initializer {
    /// Create a new tensor with the given shape.
    ///
    /// The tensor is a plain value; it does not track gradients.
    pub fn build(&self, shape: &[i64], device: Device) -> Tensor {
        let options = (Kind::Float, device);
        match self {
            Self::Zeros => Tensor::zeros(shape, options),
            Self::Constant(v) => Tensor::full(shape, *v, options),
            Self::Normc(norm) => {
                // A 1D tensor is a single row
                let samples = Tensor::randn(shape, options);
                let row_norms = (&samples * &samples)
                    .sum_dim_intlist(&[-1], true, Kind::Float)
                    .sqrt();
                samples * *norm / row_norms
            }
        }
    }

    /// Initialize a new variable in a variable store.
    pub fn add_var(&self, vs: &Path, name: &str, shape: &[i64]) -> Tensor {
        vs.var_copy(name, &self.build(shape, vs.device()))
    }
}
