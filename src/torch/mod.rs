//! Torch components
pub mod distributions;
pub mod flat;
pub mod initializers;
pub mod modules;
pub mod utils;

pub use distributions::Deterministic;
pub use flat::{FlatParams, FlatParamsError};
pub use initializers::Initializer;
pub use modules::{
    Activation, ApproximatorConfig, BuildModule, FeedForwardModule, Linear, LinearConfig, Mlp,
    MlpConfig, Module,
};
