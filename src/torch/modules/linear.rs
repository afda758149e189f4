//! Linear layer
use super::{BuildModule, FeedForwardModule, Module};
use crate::torch::initializers::Initializer;
use serde::{Deserialize, Serialize};
use tch::{nn::Path, Tensor};

/// Configuration for the [`Linear`] module.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConfig {
    /// Initializer for the kernel (weight) matrix.
    pub kernel_init: Initializer,
    /// Initializer for the bias vector.
    pub bias_init: Initializer,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            kernel_init: Initializer::Normc(1.0),
            bias_init: Initializer::Zeros,
        }
    }
}

impl BuildModule for LinearConfig {
    type Module = Linear;

    fn build_module(&self, vs: &Path, in_dim: usize, out_dim: usize) -> Self::Module {
        Linear::new(vs, in_dim, out_dim, self)
    }
}

/// Linear fully-connected layer module.
#[derive(Debug)]
pub struct Linear {
    /// `[out_dim, in_dim]`
    kernel: Tensor,
    /// `[out_dim]`
    bias: Tensor,
}

impl Linear {
    pub fn new(vs: &Path, in_dim: usize, out_dim: usize, config: &LinearConfig) -> Self {
        Self {
            kernel: config
                .kernel_init
                .add_var(vs, "kernel", &[out_dim as i64, in_dim as i64]),
            bias: config.bias_init.add_var(vs, "bias", &[out_dim as i64]),
        }
    }
}

impl Module for Linear {
    fn trainable_variables(&self) -> Box<dyn Iterator<Item = &Tensor> + '_> {
        Box::new([&self.kernel, &self.bias].into_iter())
    }
}

impl FeedForwardModule for Linear {
    fn forward(&self, input: &Tensor) -> Tensor {
        input.matmul(&self.kernel.tr()) + &self.bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{nn::VarStore, Device, Kind};

    #[test]
    fn forward_shape() {
        let vs = VarStore::new(Device::Cpu);
        let linear = LinearConfig::default().build_module(&vs.root(), 3, 2);
        let output = linear.forward(&Tensor::ones(&[4, 3], (Kind::Float, Device::Cpu)));
        assert_eq!(output.size(), vec![4, 2]);
    }

    #[test]
    fn parameters_kernel_then_bias() {
        let vs = VarStore::new(Device::Cpu);
        let linear = LinearConfig::default().build_module(&vs.root(), 3, 2);
        let shapes: Vec<_> = linear.trainable_variables().map(Tensor::size).collect();
        assert_eq!(shapes, vec![vec![2, 3], vec![2]]);
        assert_eq!(linear.num_parameters(), 8);
    }

    #[test]
    fn zero_input_gives_bias() {
        let vs = VarStore::new(Device::Cpu);
        let config = LinearConfig {
            kernel_init: Initializer::Normc(1.0),
            bias_init: Initializer::Constant(0.5),
        };
        let linear = config.build_module(&vs.root(), 3, 2);
        let output = linear.forward(&Tensor::zeros(&[1, 3], (Kind::Float, Device::Cpu)));
        assert_eq!(output, Tensor::full(&[1, 2], 0.5, (Kind::Float, Device::Cpu)));
    }
}
