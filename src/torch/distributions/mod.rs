//! Torch action distributions
mod deterministic;

pub use deterministic::Deterministic;
