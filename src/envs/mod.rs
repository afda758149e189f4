//! Reinforcement learning environments
mod cartpole;
mod pendulum;
#[cfg(test)]
pub mod testing;

pub use cartpole::{CartPole, CartPoleConfig};
pub use pendulum::{Pendulum, PendulumConfig};

use crate::spaces::{Action, ActionSpace};
use thiserror::Error;

/// The result of taking one step in an environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<O> {
    /// Observation of the resulting state.
    pub observation: O,
    /// Reward for this transition.
    pub reward: f64,
    /// Whether this step ends the episode.
    pub done: bool,
}

/// A reinforcement learning environment with internal state.
pub trait Environment {
    type Observation;
    /// Error raised by [`reset`](Self::reset) or [`step`](Self::step).
    type Error;

    /// The space of all valid actions.
    fn action_space(&self) -> ActionSpace;

    /// The maximum number of steps in an episode, if the environment declares one.
    fn max_episode_steps(&self) -> Option<u64>;

    /// Reset the environment to an initial state.
    ///
    /// Must be called before each new episode.
    fn reset(&mut self) -> Result<Self::Observation, Self::Error>;

    /// Take a step in the environment.
    fn step(&mut self, action: &Action) -> Result<Step<Self::Observation>, Self::Error>;
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    type Observation = E::Observation;
    type Error = E::Error;

    fn action_space(&self) -> ActionSpace {
        E::action_space(self)
    }

    fn max_episode_steps(&self) -> Option<u64> {
        E::max_episode_steps(self)
    }

    fn reset(&mut self) -> Result<Self::Observation, Self::Error> {
        E::reset(self)
    }

    fn step(&mut self, action: &Action) -> Result<Step<Self::Observation>, Self::Error> {
        E::step(self, action)
    }
}

/// Error from stepping an environment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    #[error("action {action:?} is not in the action space {space}")]
    InvalidAction { action: Action, space: ActionSpace },
    #[error("step called before reset")]
    NotReset,
}
