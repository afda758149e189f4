//! Torch modules
mod activations;
mod linear;
mod mlp;

pub use activations::Activation;
pub use linear::{Linear, LinearConfig};
pub use mlp::{ApproximatorConfig, Mlp, MlpConfig};

use tch::{nn::Path, Tensor};

/// A torch module with trainable parameters.
pub trait Module {
    /// The trainable variables of the module.
    ///
    /// The order is fixed by the module structure and is the same on every call.
    fn trainable_variables(&self) -> Box<dyn Iterator<Item = &Tensor> + '_>;

    /// Total number of scalar trainable parameters.
    fn num_parameters(&self) -> usize {
        self.trainable_variables()
            .map(|t| t.size().iter().product::<i64>() as usize)
            .sum()
    }
}

/// A module that maps a batch of feature vectors to a batch of output vectors.
pub trait FeedForwardModule: Module {
    /// Apply to a tensor of shape `[BATCH_SIZE, in_dim]`.
    fn forward(&self, input: &Tensor) -> Tensor;
}

/// Build a [`Module`] instance.
pub trait BuildModule {
    type Module: FeedForwardModule;

    /// Build a new module instance.
    ///
    /// # Args
    /// * `vs`      - Variable store and namespace.
    /// * `in_dim`  - Number of input feature dimensions.
    /// * `out_dim` - Number of output feature dimensions.
    fn build_module(&self, vs: &Path, in_dim: usize, out_dim: usize) -> Self::Module;
}
