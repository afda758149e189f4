use super::{Environment, Step, StepError};
use crate::spaces::{Action, ActionSpace};
use ndarray::{arr1, Array1};
use rand::distributions::{Distribution, Uniform};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for the [`CartPole`] environment.
///
/// Defaults are those of the OpenAI Gym `CartPole-v1` environment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartPoleConfig {
    /// Downward acceleration of gravity (m/s^2)
    pub gravity: f64,
    /// Mass of the cart (kg)
    pub mass_cart: f64,
    /// Mass of the pole (kg)
    pub mass_pole: f64,
    /// Half the length of the pole (m)
    pub length_half_pole: f64,
    /// Magnitude of the force (N) applied by actions.
    pub action_force: f64,
    /// Simulation time step (s)
    pub time_step: f64,
    /// Maximum absolute position (m) before the episode is ended.
    pub max_pos: f64,
    /// Maximum absolute pole angle from vertical (radians) before the episode is ended.
    pub max_angle: f64,
    /// Declared maximum episode length.
    pub max_episode_steps: u64,
    /// Seed for sampling initial states.
    pub seed: u64,
}

impl Default for CartPoleConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            mass_cart: 1.0,
            mass_pole: 0.1,
            length_half_pole: 0.5,
            action_force: 10.0,
            time_step: 0.02,
            max_pos: 2.4,
            max_angle: 12.0f64.to_radians(),
            max_episode_steps: 500,
            seed: 0,
        }
    }
}

/// Cart-Pole environment
///
/// A pole is attached by an unactuated hinge to a cart moving along a frictionless track.
/// Actions push the cart left (`0`) or right (`1`). Every step yields a reward of 1 and the
/// episode ends once the pole falls past `max_angle` or the cart leaves the track.
///
/// Observations are `[cart_position, cart_velocity, pole_angle, pole_angular_velocity]`.
#[derive(Debug, Clone)]
pub struct CartPole {
    config: CartPoleConfig,
    state: Option<[f64; 4]>,
    rng: StdRng,
}

impl CartPole {
    pub fn new(config: CartPoleConfig) -> Self {
        Self {
            config,
            state: None,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    fn next_state(&self, state: [f64; 4], force: f64) -> [f64; 4] {
        let c = &self.config;
        let [x, x_dot, theta, theta_dot] = state;
        let total_mass = c.mass_cart + c.mass_pole;
        let pole_mass_length = c.mass_pole * c.length_half_pole;
        let (sin_theta, cos_theta) = theta.sin_cos();

        let temp = (force + pole_mass_length * theta_dot * theta_dot * sin_theta) / total_mass;
        let theta_acc = (c.gravity * sin_theta - cos_theta * temp)
            / (c.length_half_pole
                * (4.0 / 3.0 - c.mass_pole * cos_theta * cos_theta / total_mass));
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;

        // Euler integration
        [
            x + c.time_step * x_dot,
            x_dot + c.time_step * x_acc,
            theta + c.time_step * theta_dot,
            theta_dot + c.time_step * theta_acc,
        ]
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new(CartPoleConfig::default())
    }
}

impl Environment for CartPole {
    type Observation = Array1<f64>;
    type Error = StepError;

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Discrete(2)
    }

    fn max_episode_steps(&self) -> Option<u64> {
        Some(self.config.max_episode_steps)
    }

    fn reset(&mut self) -> Result<Self::Observation, Self::Error> {
        let dist = Uniform::new_inclusive(-0.05, 0.05);
        let state = [
            dist.sample(&mut self.rng),
            dist.sample(&mut self.rng),
            dist.sample(&mut self.rng),
            dist.sample(&mut self.rng),
        ];
        self.state = Some(state);
        Ok(arr1(&state))
    }

    fn step(&mut self, action: &Action) -> Result<Step<Self::Observation>, Self::Error> {
        let force = match action.as_discrete() {
            Some(0) => -self.config.action_force,
            Some(1) => self.config.action_force,
            _ => {
                return Err(StepError::InvalidAction {
                    action: action.clone(),
                    space: self.action_space(),
                })
            }
        };
        let state = self.next_state(self.state.ok_or(StepError::NotReset)?, force);
        self.state = Some(state);
        let done =
            state[0].abs() > self.config.max_pos || state[2].abs() > self.config.max_angle;
        Ok(Step {
            observation: arr1(&state),
            reward: 1.0,
            done,
        })
    }
}
