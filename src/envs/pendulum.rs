use super::{Environment, Step, StepError};
use crate::spaces::{Action, ActionSpace};
use ndarray::{arr1, Array1};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Configuration for the [`Pendulum`] environment.
///
/// Defaults are those of the OpenAI Gym `Pendulum-v0` environment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendulumConfig {
    pub gravity: f64,
    pub mass: f64,
    pub length: f64,
    pub time_step: f64,
    pub max_speed: f64,
    pub max_torque: f64,
    /// Declared maximum episode length.
    pub max_episode_steps: u64,
    /// Seed for sampling initial states.
    pub seed: u64,
}

impl Default for PendulumConfig {
    fn default() -> Self {
        Self {
            gravity: 10.0,
            mass: 1.0,
            length: 1.0,
            time_step: 0.05,
            max_speed: 8.0,
            max_torque: 2.0,
            max_episode_steps: 200,
            seed: 0,
        }
    }
}

/// Inverted pendulum swing-up.
///
/// The action is a single torque in `[-max_torque, max_torque]` (out-of-range torques are
/// clipped). Rewards are negative costs penalizing angle, speed and torque.
/// Episodes never end on their own; only the step limit ends them.
///
/// Observations are `[cos(angle), sin(angle), angular_velocity]`.
#[derive(Debug, Clone)]
pub struct Pendulum {
    config: PendulumConfig,
    /// `(angle, angular_velocity)`
    state: Option<(f64, f64)>,
    rng: StdRng,
}

impl Pendulum {
    pub fn new(config: PendulumConfig) -> Self {
        Self {
            config,
            state: None,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    fn observe(angle: f64, velocity: f64) -> Array1<f64> {
        let (sin, cos) = angle.sin_cos();
        arr1(&[cos, sin, velocity])
    }
}

impl Default for Pendulum {
    fn default() -> Self {
        Self::new(PendulumConfig::default())
    }
}

/// Wrap an angle into `[-pi, pi)`.
fn normalize_angle(x: f64) -> f64 {
    (x + PI).rem_euclid(2.0 * PI) - PI
}

impl Environment for Pendulum {
    type Observation = Array1<f64>;
    type Error = StepError;

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Box {
            dim: 1,
            low: -self.config.max_torque,
            high: self.config.max_torque,
        }
    }

    fn max_episode_steps(&self) -> Option<u64> {
        Some(self.config.max_episode_steps)
    }

    fn reset(&mut self) -> Result<Self::Observation, Self::Error> {
        let angle = self.rng.gen_range(-PI..=PI);
        let velocity = self.rng.gen_range(-1.0..=1.0);
        self.state = Some((angle, velocity));
        Ok(Self::observe(angle, velocity))
    }

    fn step(&mut self, action: &Action) -> Result<Step<Self::Observation>, Self::Error> {
        let torque = match action.as_continuous() {
            Some(values) if values.len() == 1 => f64::from(values[0])
                .clamp(-self.config.max_torque, self.config.max_torque),
            _ => {
                return Err(StepError::InvalidAction {
                    action: action.clone(),
                    space: self.action_space(),
                })
            }
        };
        let (angle, velocity) = self.state.ok_or(StepError::NotReset)?;
        let c = &self.config;

        let cost = normalize_angle(angle).powi(2)
            + 0.1 * velocity.powi(2)
            + 0.001 * torque.powi(2);

        let new_velocity = (velocity
            + (-3.0 * c.gravity / (2.0 * c.length) * (angle + PI).sin()
                + 3.0 / (c.mass * c.length.powi(2)) * torque)
                * c.time_step)
            .clamp(-c.max_speed, c.max_speed);
        let new_angle = angle + new_velocity * c.time_step;
        self.state = Some((new_angle, new_velocity));

        Ok(Step {
            observation: Self::observe(new_angle, new_velocity),
            reward: -cost,
            done: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::testing;

    #[test]
    fn run_random() {
        testing::run_random(&mut Pendulum::default(), 1000, 0);
    }

    #[test]
    fn never_done() {
        let mut env = Pendulum::default();
        env.reset().unwrap();
        for _ in 0..500 {
            let step = env.step(&Action::Continuous(arr1(&[2.0]))).unwrap();
            assert!(!step.done);
            assert!(step.reward <= 0.0);
        }
    }

    #[test]
    fn speed_is_bounded() {
        let mut env = Pendulum::default();
        env.reset().unwrap();
        for _ in 0..500 {
            let step = env.step(&Action::Continuous(arr1(&[100.0]))).unwrap();
            assert!(step.observation[2].abs() <= 8.0);
        }
    }

    #[test]
    fn discrete_action_fails() {
        let mut env = Pendulum::default();
        env.reset().unwrap();
        assert!(matches!(
            env.step(&Action::Discrete(0)),
            Err(StepError::InvalidAction { .. })
        ));
    }

    #[test]
    fn normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!((normalize_angle(0.25) - 0.25).abs() < 1e-12);
    }
}
