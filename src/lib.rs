//! Policy evaluation for random-search reinforcement learning.
//!
//! Flat-parameter policies that map environment observations to actions,
//! together with running observation normalization and single-episode rollouts.
#![warn(clippy::cast_lossless)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::missing_const_for_fn)] // has some false positives
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::use_self)]
pub mod envs;
pub mod filters;
pub mod logging;
pub mod policy;
pub mod preprocessors;
pub mod rollout;
pub mod spaces;
pub mod torch;
pub mod utils;

pub use envs::{Environment, Step};
pub use filters::{
    Filter, FilterKind, FilterShapeError, MeanStdFilter, NoFilter, ObservationFilter,
};
pub use policy::{BuildPolicyError, GenericPolicy, Policy, PolicyConfig, PolicyError};
pub use preprocessors::{NoPreprocessor, OneHotPreprocessor, PreprocessError, Preprocessor};
pub use rollout::{effective_step_limit, rollout, rollout_with_logger, Rollout, RolloutError};
pub use spaces::{Action, ActionSpace};
