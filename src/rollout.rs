//! Episode rollouts
use crate::envs::Environment;
use crate::logging::{Event, LogError, Loggable, Logger};
use crate::policy::{Policy, PolicyError};
use crate::spaces::{Action, ActionSpace};
use ndarray::Array1;
use thiserror::Error;

/// Step budget used when neither the caller nor the environment sets a positive limit.
pub const DEFAULT_STEP_LIMIT: u64 = 999_999;

/// Result of a single-episode rollout.
#[derive(Debug, Clone, PartialEq)]
pub struct Rollout {
    /// Shaped reward of each step taken.
    pub rewards: Array1<f32>,
    /// Number of steps taken. Equal to `rewards.len()`.
    pub steps: u64,
}

impl Rollout {
    /// Total shaped reward.
    pub fn total_reward(&self) -> f32 {
        self.rewards.sum()
    }
}

/// Error during a rollout.
#[derive(Debug, Error)]
pub enum RolloutError<E> {
    #[error("environment error")]
    Env(#[source] E),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Log(#[from] LogError),
}

/// The number of steps a rollout may take.
///
/// The smaller of the caller limit and the environment limit where both are set.
/// A missing or zero result falls back to [`DEFAULT_STEP_LIMIT`].
pub fn effective_step_limit(timestep_limit: Option<u64>, env_max_steps: Option<u64>) -> u64 {
    let limit = match (timestep_limit, env_max_steps) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    match limit {
        Some(0) | None => DEFAULT_STEP_LIMIT,
        Some(n) => n,
    }
}

/// Run one episode of `policy` in `env`.
///
/// # Args
/// * `policy` - Computes actions. Observation filter statistics are always updated.
/// * `env` - Environment. Reset once at the start.
/// * `timestep_limit` - Optional cap on the number of steps.
/// * `add_noise` - Add exploration noise to continuous actions.
/// * `offset` - Each step reward is shaped as `reward - |offset|`.
///
/// The episode ends when the environment reports done or the step budget is exhausted.
/// Reaching the budget is not reported separately from termination.
pub fn rollout<A, E>(
    policy: A,
    env: &mut E,
    timestep_limit: Option<u64>,
    add_noise: bool,
    offset: f64,
) -> Result<Rollout, RolloutError<E::Error>>
where
    A: Policy<Observation = E::Observation>,
    E: Environment + ?Sized,
{
    rollout_with_logger(policy, env, timestep_limit, add_noise, offset, &mut ())
}

/// Run one episode while logging step and episode statistics.
///
/// Logs `reward` (and `action` for discrete action spaces) on each [`Event::Step`],
/// then `episode_reward` and `episode_length` on [`Event::Episode`].
/// A value that clashes with earlier values logged under the same name is an error.
pub fn rollout_with_logger<A, E, L>(
    mut policy: A,
    env: &mut E,
    timestep_limit: Option<u64>,
    add_noise: bool,
    offset: f64,
    logger: &mut L,
) -> Result<Rollout, RolloutError<E::Error>>
where
    A: Policy<Observation = E::Observation>,
    E: Environment + ?Sized,
    L: Logger + ?Sized,
{
    let limit = effective_step_limit(timestep_limit, env.max_episode_steps());
    let penalty = offset.abs();
    let action_space = env.action_space();

    let mut rewards = Vec::new();
    let mut observation = env.reset().map_err(RolloutError::Env)?;
    for _ in 0..limit {
        let action = policy.compute(&observation, add_noise, true)?;
        let step = env.step(&action).map_err(RolloutError::Env)?;
        let reward = (step.reward - penalty) as f32;
        rewards.push(reward);

        logger.log(Event::Step, "reward", reward.into())?;
        if let (Action::Discrete(value), ActionSpace::Discrete(size)) = (&action, action_space) {
            logger.log(
                Event::Step,
                "action",
                Loggable::IndexSample {
                    value: *value,
                    size,
                },
            )?;
        }
        logger.done(Event::Step);

        if step.done {
            break;
        }
        observation = step.observation;
    }

    let rewards = Array1::from(rewards);
    let steps = rewards.len() as u64;
    logger.log(Event::Episode, "episode_reward", rewards.sum().into())?;
    logger.log(Event::Episode, "episode_length", (steps as f64).into())?;
    logger.done(Event::Episode);

    Ok(Rollout { rewards, steps })
}
