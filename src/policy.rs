//! Flat-parameter policies
//!
//! A [`GenericPolicy`] maps raw observations to actions through a preprocessor, an observation
//! filter and a deterministic function approximator. All approximator parameters can be read and
//! overwritten as a single flat vector, which is what perturbation-based optimizers operate on.
use crate::filters::{Filter, FilterKind, ObservationFilter};
use crate::preprocessors::{PreprocessError, Preprocessor};
use crate::spaces::{Action, ActionSpace};
use crate::torch::{
    ApproximatorConfig, BuildModule, Deterministic, FeedForwardModule, FlatParams,
    FlatParamsError, Mlp, Module,
};
use ndarray::{Array1, ArrayView1, Axis, Ix1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tch::{nn::VarStore, Device, TchError, Tensor};
use thiserror::Error;

/// Computes actions from observations.
pub trait Policy {
    type Observation: ?Sized;

    /// Compute an action for an observation.
    ///
    /// # Args
    /// * `observation` - Raw environment observation.
    /// * `add_noise`   - Add exploration noise to continuous actions.
    /// * `update`      - Fold the observation into the observation filter statistics.
    fn compute(
        &mut self,
        observation: &Self::Observation,
        add_noise: bool,
        update: bool,
    ) -> Result<Action, PolicyError>;
}

impl<T: Policy + ?Sized> Policy for &mut T {
    type Observation = T::Observation;

    fn compute(
        &mut self,
        observation: &Self::Observation,
        add_noise: bool,
        update: bool,
    ) -> Result<Action, PolicyError> {
        T::compute(self, observation, add_noise, update)
    }
}

/// Configuration for a [`GenericPolicy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Function approximator architecture.
    pub approximator: ApproximatorConfig,
    /// Kind of observation filter.
    pub observation_filter: FilterKind,
    /// Standard deviation of the Gaussian noise added to continuous actions on request.
    pub action_noise_std: f64,
    /// Seed for the action noise. Seeded from system entropy if `None`.
    pub seed: Option<u64>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            approximator: ApproximatorConfig::Linear,
            observation_filter: FilterKind::MeanStdFilter,
            action_noise_std: 0.0,
            seed: None,
        }
    }
}

impl PolicyConfig {
    /// Configuration of a policy with a linear approximator.
    pub fn linear(observation_filter: FilterKind, action_noise_std: f64) -> Self {
        Self {
            approximator: ApproximatorConfig::Linear,
            observation_filter,
            action_noise_std,
            seed: None,
        }
    }

    /// Configuration of a policy with a multi-layer approximator.
    pub fn mlp(
        observation_filter: FilterKind,
        hidden_sizes: Vec<usize>,
        action_noise_std: f64,
    ) -> Self {
        Self {
            approximator: ApproximatorConfig::multi_layer(hidden_sizes),
            observation_filter,
            action_noise_std,
            seed: None,
        }
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Error building a policy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildPolicyError {
    #[error("observation shape {shape:?} is not supported; expected a flat feature vector")]
    UnsupportedSpace { shape: Vec<usize> },
    #[error("action noise standard deviation must be finite and non-negative, got {0}")]
    InvalidActionNoise(f64),
    #[error("action space {0} is empty")]
    EmptyActionSpace(ActionSpace),
}

/// Error computing actions or accessing policy weights.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("preprocessor produced features with shape {actual:?}, expected {expected:?}")]
    ObservationShape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
    #[error(transparent)]
    Weights(#[from] FlatParamsError),
    #[error(transparent)]
    Torch(#[from] TchError),
}

/// Policy with a deterministic function approximator over filtered observation features.
///
/// Owns its variable store, so separate instances share no mutable state.
pub struct GenericPolicy<P> {
    vs: VarStore,
    action_space: ActionSpace,
    preprocessor: P,
    observation_filter: Filter,
    model: Mlp,
    action_dist: Deterministic,
    flat_params: FlatParams,
    action_noise_std: f64,
    rng: StdRng,
}

impl<P: Preprocessor> GenericPolicy<P> {
    /// Build a new policy.
    ///
    /// # Args
    /// * `device`       - Device on which the approximator parameters are stored and evaluated.
    /// * `action_space` - Space of actions to produce.
    /// * `preprocessor` - Converts observations to features. Its output must be 1-dimensional.
    /// * `config`       - Approximator, filter and noise configuration.
    pub fn new(
        device: Device,
        action_space: ActionSpace,
        preprocessor: P,
        config: &PolicyConfig,
    ) -> Result<Self, BuildPolicyError> {
        let shape = preprocessor.shape().to_vec();
        if shape.len() != 1 {
            return Err(BuildPolicyError::UnsupportedSpace { shape });
        }
        if !(config.action_noise_std.is_finite() && config.action_noise_std >= 0.0) {
            return Err(BuildPolicyError::InvalidActionNoise(
                config.action_noise_std,
            ));
        }
        let action_dist = Deterministic::new(action_space);
        if action_dist.num_params() == 0 {
            return Err(BuildPolicyError::EmptyActionSpace(action_space));
        }

        let observation_filter = config.observation_filter.build(&shape);
        let vs = VarStore::new(device);
        let model = config
            .approximator
            .build_module(&vs.root(), shape[0], action_dist.num_params());
        let flat_params = FlatParams::new(model.trainable_variables());
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Ok(Self {
            vs,
            action_space,
            preprocessor,
            observation_filter,
            model,
            action_dist,
            flat_params,
            action_noise_std: config.action_noise_std,
            rng,
        })
    }

    /// Build a policy with a linear approximator.
    pub fn new_linear(
        device: Device,
        action_space: ActionSpace,
        preprocessor: P,
        observation_filter: FilterKind,
        action_noise_std: f64,
    ) -> Result<Self, BuildPolicyError> {
        Self::new(
            device,
            action_space,
            preprocessor,
            &PolicyConfig::linear(observation_filter, action_noise_std),
        )
    }

    /// Build a policy with a multi-layer approximator.
    pub fn new_mlp(
        device: Device,
        action_space: ActionSpace,
        preprocessor: P,
        observation_filter: FilterKind,
        hidden_sizes: Vec<usize>,
        action_noise_std: f64,
    ) -> Result<Self, BuildPolicyError> {
        Self::new(
            device,
            action_space,
            preprocessor,
            &PolicyConfig::mlp(observation_filter, hidden_sizes, action_noise_std),
        )
    }
}

impl<P> GenericPolicy<P> {
    /// Total number of scalar approximator parameters.
    pub const fn num_params(&self) -> usize {
        self.flat_params.num_params()
    }

    /// All approximator parameters as a flat vector.
    pub fn get_weights(&self) -> Result<Array1<f32>, PolicyError> {
        Ok(self.flat_params.get_flat()?)
    }

    /// Replace all approximator parameters from a flat vector.
    ///
    /// Fails without modifying the parameters if `weights` does not have exactly
    /// [`num_params`](Self::num_params) elements.
    pub fn set_weights(&mut self, weights: ArrayView1<f32>) -> Result<(), PolicyError> {
        Ok(self.flat_params.set_flat(weights)?)
    }

    pub const fn action_space(&self) -> ActionSpace {
        self.action_space
    }

    pub const fn action_noise_std(&self) -> f64 {
        self.action_noise_std
    }

    pub fn device(&self) -> Device {
        self.vs.device()
    }

    pub const fn preprocessor(&self) -> &P {
        &self.preprocessor
    }

    pub const fn observation_filter(&self) -> &Filter {
        &self.observation_filter
    }

    /// Mutable access to the observation filter, e.g. for merging statistics across workers.
    pub fn observation_filter_mut(&mut self) -> &mut Filter {
        &mut self.observation_filter
    }
}

impl<P: Preprocessor> Policy for GenericPolicy<P> {
    type Observation = P::Observation;

    fn compute(
        &mut self,
        observation: &Self::Observation,
        add_noise: bool,
        update: bool,
    ) -> Result<Action, PolicyError> {
        let features = self.preprocessor.transform(observation)?;
        if features.shape() != self.preprocessor.shape() {
            return Err(PolicyError::ObservationShape {
                expected: self.preprocessor.shape().to_vec(),
                actual: features.shape().to_vec(),
            });
        }
        let num_features = features.len();
        let batch = features
            .into_dimensionality::<Ix1>()
            .map_err(|_| PolicyError::ObservationShape {
                expected: self.preprocessor.shape().to_vec(),
                actual: vec![num_features],
            })?
            .insert_axis(Axis(0));

        let normalized = if update {
            self.observation_filter.normalize_and_update(batch.view())
        } else {
            self.observation_filter.normalize_only(batch.view())
        };

        let input = Tensor::of_slice(&normalized.iter().copied().collect::<Vec<f32>>())
            .f_reshape(&[1, num_features as i64])?
            .to_device(self.vs.device());
        let outputs = tch::no_grad(|| self.model.forward(&input));
        // One input row gives exactly one action
        let mut action = self.action_dist.sample(&outputs).swap_remove(0);

        if add_noise && self.action_space.is_continuous() {
            if let Action::Continuous(values) = &mut action {
                for value in values.iter_mut() {
                    let noise: f64 = self.rng.sample(StandardNormal);
                    *value += (noise * self.action_noise_std) as f32;
                }
            }
        }
        Ok(action)
    }
}
