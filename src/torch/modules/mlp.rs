//! Multi-layer perceptron
use super::{Activation, BuildModule, FeedForwardModule, Linear, LinearConfig, Module};
use crate::torch::initializers::Initializer;
use serde::{Deserialize, Serialize};
use std::iter;
use tch::{nn::Path, Tensor};

/// Configuration for the [`Mlp`] module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpConfig {
    /// Sizes of the hidden layers
    pub hidden_sizes: Vec<usize>,
    /// Activation function between hidden layers.
    pub activation: Activation,
    /// Activation function on the output.
    pub output_activation: Activation,
    /// Configuration for the hidden linear layers
    pub hidden_layer: LinearConfig,
    /// Configuration for the output linear layer
    pub output_layer: LinearConfig,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_sizes: vec![256, 256],
            activation: Activation::Tanh,
            output_activation: Activation::Identity,
            hidden_layer: LinearConfig::default(),
            output_layer: LinearConfig {
                kernel_init: Initializer::Normc(0.01),
                bias_init: Initializer::Zeros,
            },
        }
    }
}

impl BuildModule for MlpConfig {
    type Module = Mlp;

    fn build_module(&self, vs: &Path, in_dim: usize, out_dim: usize) -> Self::Module {
        Mlp::new(vs, in_dim, out_dim, self)
    }
}

/// Multi-layer perceptron
#[derive(Debug)]
pub struct Mlp {
    layers: Vec<Linear>,
    activation: Activation,
    output_activation: Activation,
}

impl Mlp {
    pub fn new(vs: &Path, in_dim: usize, out_dim: usize, config: &MlpConfig) -> Self {
        let in_dims = iter::once(&in_dim).chain(&config.hidden_sizes);
        let out_dims = config.hidden_sizes.iter().chain(iter::once(&out_dim));
        let num_layers = config.hidden_sizes.len() + 1;

        let layers = in_dims
            .zip(out_dims)
            .enumerate()
            .map(|(i, (in_, out_))| {
                let layer_config = if i + 1 == num_layers {
                    &config.output_layer
                } else {
                    &config.hidden_layer
                };
                Linear::new(&(vs / format!("layer_{}", i)), *in_, *out_, layer_config)
            })
            .collect();

        Self {
            layers,
            activation: config.activation,
            output_activation: config.output_activation,
        }
    }

    /// Number of linear layers, including the output layer.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }
}

impl Module for Mlp {
    fn trainable_variables(&self) -> Box<dyn Iterator<Item = &Tensor> + '_> {
        Box::new(self.layers.iter().flat_map(Module::trainable_variables))
    }
}

impl FeedForwardModule for Mlp {
    fn forward(&self, input: &Tensor) -> Tensor {
        let (output_layer, hidden_layers) = self
            .layers
            .split_last()
            .expect("must have >= 1 layers by construction");
        let mut hidden = input.shallow_clone();
        for layer in hidden_layers {
            hidden = self.activation.forward_owned(layer.forward(&hidden));
        }
        self.output_activation
            .forward_owned(output_layer.forward(&hidden))
    }
}

/// Architecture of the function approximator mapping features to action model outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ApproximatorConfig {
    /// A single linear map with bias and no hidden layers.
    Linear,
    /// Fully-connected network with the given hidden layer widths.
    MultiLayer {
        hidden_sizes: Vec<usize>,
        #[serde(default)]
        activation: Activation,
    },
}

impl Default for ApproximatorConfig {
    fn default() -> Self {
        Self::Linear
    }
}

impl ApproximatorConfig {
    /// Multi-layer configuration with the default activation.
    pub fn multi_layer(hidden_sizes: Vec<usize>) -> Self {
        Self::MultiLayer {
            hidden_sizes,
            activation: Activation::default(),
        }
    }

    /// The equivalent [`MlpConfig`].
    pub fn mlp_config(&self) -> MlpConfig {
        match self {
            Self::Linear => MlpConfig {
                hidden_sizes: Vec::new(),
                activation: Activation::Identity,
                ..MlpConfig::default()
            },
            Self::MultiLayer {
                hidden_sizes,
                activation,
            } => MlpConfig {
                hidden_sizes: hidden_sizes.clone(),
                activation: *activation,
                ..MlpConfig::default()
            },
        }
    }
}

impl BuildModule for ApproximatorConfig {
    type Module = Mlp;

    fn build_module(&self, vs: &Path, in_dim: usize, out_dim: usize) -> Self::Module {
        self.mlp_config().build_module(vs, in_dim, out_dim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tch::{nn::VarStore, Device, Kind};

    #[fixture]
    fn default_module() -> (Mlp, usize, usize) {
        let in_dim = 3;
        let out_dim = 2;
        let vs = VarStore::new(Device::Cpu);
        let module = MlpConfig::default().build_module(&vs.root(), in_dim, out_dim);
        (module, in_dim, out_dim)
    }

    #[rstest]
    fn default_module_forward_batch(default_module: (Mlp, usize, usize)) {
        let (mlp, in_dim, out_dim) = default_module;
        let input = Tensor::ones(&[4, in_dim as i64], (Kind::Float, Device::Cpu));
        assert_eq!(mlp.forward(&input).size(), vec![4, out_dim as i64]);
    }

    #[rstest]
    fn default_module_num_parameters(default_module: (Mlp, usize, usize)) {
        let (mlp, _, _) = default_module;
        assert_eq!(mlp.num_layers(), 3);
        assert_eq!(
            mlp.num_parameters(),
            (3 * 256 + 256) + (256 * 256 + 256) + (256 * 2 + 2)
        );
    }

    #[rstest]
    #[case(ApproximatorConfig::Linear, 1, 4 * 2 + 2)]
    #[case(ApproximatorConfig::multi_layer(vec![]), 1, 4 * 2 + 2)]
    #[case(ApproximatorConfig::multi_layer(vec![8]), 2, (4 * 8 + 8) + (8 * 2 + 2))]
    #[case(ApproximatorConfig::multi_layer(vec![8, 5]), 3, (4 * 8 + 8) + (8 * 5 + 5) + (5 * 2 + 2))]
    fn approximator_structure(
        #[case] config: ApproximatorConfig,
        #[case] num_layers: usize,
        #[case] num_parameters: usize,
    ) {
        let vs = VarStore::new(Device::Cpu);
        let mlp = config.build_module(&vs.root(), 4, 2);
        assert_eq!(mlp.num_layers(), num_layers);
        assert_eq!(mlp.num_parameters(), num_parameters);
        assert_eq!(vs.trainable_variables().len(), 2 * num_layers);
    }

    #[test]
    fn parameter_order_is_layer_order() {
        let vs = VarStore::new(Device::Cpu);
        let mlp = ApproximatorConfig::multi_layer(vec![8]).build_module(&vs.root(), 4, 2);
        let shapes: Vec<_> = mlp.trainable_variables().map(Tensor::size).collect();
        assert_eq!(shapes, vec![vec![8, 4], vec![8], vec![2, 8], vec![2]]);
    }

    #[test]
    fn approximator_config_serde() {
        let config: ApproximatorConfig =
            serde_json::from_str(r#"{"MultiLayer": {"hidden_sizes": [32, 32]}}"#).unwrap();
        assert_eq!(config, ApproximatorConfig::multi_layer(vec![32, 32]));

        let config: ApproximatorConfig = serde_json::from_str(r#""Linear""#).unwrap();
        assert_eq!(config, ApproximatorConfig::Linear);
    }
}
