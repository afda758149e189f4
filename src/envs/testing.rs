//! Environment testing utilities
use super::{Environment, Step};
use crate::spaces::{Action, ActionSpace};
use ndarray::{arr1, Array1};
use rand::{distributions::Distribution, rngs::StdRng, SeedableRng};
use std::convert::Infallible;
use thiserror::Error;

/// Run an environment with uniform random actions and check basic invariants.
pub fn run_random<E>(env: &mut E, num_steps: u64, seed: u64)
where
    E: Environment<Observation = Array1<f64>>,
    E::Error: std::fmt::Debug,
{
    let action_space = env.action_space();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut observation = env.reset().unwrap();
    let obs_len = observation.len();
    for _ in 0..num_steps {
        let action: Action = action_space.sample(&mut rng);
        assert!(action_space.contains(&action));
        let step = env.step(&action).unwrap();
        assert!(step.reward.is_finite());
        assert_eq!(step.observation.len(), obs_len);
        observation = if step.done {
            env.reset().unwrap()
        } else {
            step.observation
        };
        assert!(observation.iter().all(|x| x.is_finite()));
    }
}

/// Environment with a scripted reward sequence.
///
/// Step `t` (starting from 0) yields reward `rewards[t % rewards.len()]` and the observation
/// `[t + 1]`. The episode is done after `done_after` steps, if set.
#[derive(Debug, Clone)]
pub struct ScriptedEnv {
    pub rewards: Vec<f64>,
    pub done_after: Option<u64>,
    pub max_episode_steps: Option<u64>,
    pub action_space: ActionSpace,
    /// Number of steps taken since the last reset.
    pub steps: u64,
    pub num_resets: u64,
    /// Every action received.
    pub actions: Vec<Action>,
}

impl ScriptedEnv {
    pub fn new(rewards: Vec<f64>, done_after: Option<u64>, max_episode_steps: Option<u64>) -> Self {
        Self {
            rewards,
            done_after,
            max_episode_steps,
            action_space: ActionSpace::Discrete(2),
            steps: 0,
            num_resets: 0,
            actions: Vec::new(),
        }
    }

    /// Constant reward of 1, never done on its own.
    pub fn endless(max_episode_steps: Option<u64>) -> Self {
        Self::new(vec![1.0], None, max_episode_steps)
    }
}

impl Environment for ScriptedEnv {
    type Observation = Array1<f64>;
    type Error = Infallible;

    fn action_space(&self) -> ActionSpace {
        self.action_space
    }

    fn max_episode_steps(&self) -> Option<u64> {
        self.max_episode_steps
    }

    fn reset(&mut self) -> Result<Self::Observation, Self::Error> {
        self.steps = 0;
        self.num_resets += 1;
        Ok(arr1(&[0.0]))
    }

    fn step(&mut self, action: &Action) -> Result<Step<Self::Observation>, Self::Error> {
        let reward = self.rewards[(self.steps as usize) % self.rewards.len()];
        self.steps += 1;
        self.actions.push(action.clone());
        Ok(Step {
            observation: arr1(&[self.steps as f64]),
            reward,
            done: self.done_after.map_or(false, |n| self.steps >= n),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("simulated failure at step {0}")]
pub struct SimulatedFailure(pub u64);

/// Environment whose `step` fails once `fail_at` steps have been taken.
#[derive(Debug, Clone)]
pub struct FailingEnv {
    pub fail_at: u64,
    pub steps: u64,
}

impl FailingEnv {
    pub const fn new(fail_at: u64) -> Self {
        Self { fail_at, steps: 0 }
    }
}

impl Environment for FailingEnv {
    type Observation = Array1<f64>;
    type Error = SimulatedFailure;

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Discrete(2)
    }

    fn max_episode_steps(&self) -> Option<u64> {
        None
    }

    fn reset(&mut self) -> Result<Self::Observation, Self::Error> {
        self.steps = 0;
        Ok(arr1(&[0.0]))
    }

    fn step(&mut self, _action: &Action) -> Result<Step<Self::Observation>, Self::Error> {
        if self.steps >= self.fail_at {
            return Err(SimulatedFailure(self.steps));
        }
        self.steps += 1;
        Ok(Step {
            observation: arr1(&[self.steps as f64]),
            reward: 1.0,
            done: false,
        })
    }
}
