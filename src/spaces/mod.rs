//! Action spaces and action values.
use ndarray::Array1;
use rand::distributions::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Descriptor of the space of valid actions for an environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActionSpace {
    /// Integers `0 .. n`.
    Discrete(usize),
    /// Real vectors of length `dim` with every element in `[low, high]`.
    Box { dim: usize, low: f64, high: f64 },
}

impl ActionSpace {
    /// Whether the space is continuous (a box space).
    #[inline]
    pub const fn is_continuous(&self) -> bool {
        matches!(self, Self::Box { .. })
    }

    /// Number of outputs a deterministic action model needs for this space.
    ///
    /// For discrete spaces this is one score per action, for box spaces one value per dimension.
    #[inline]
    pub const fn num_outputs(&self) -> usize {
        match self {
            Self::Discrete(n) => *n,
            Self::Box { dim, .. } => *dim,
        }
    }

    /// Check if the space contains a particular action.
    pub fn contains(&self, action: &Action) -> bool {
        match (self, action) {
            (Self::Discrete(n), Action::Discrete(index)) => index < n,
            (Self::Box { dim, low, high }, Action::Continuous(values)) => {
                values.len() == *dim
                    && values
                        .iter()
                        .all(|&v| f64::from(v) >= *low && f64::from(v) <= *high)
            }
            _ => false,
        }
    }
}

impl fmt::Display for ActionSpace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Discrete(n) => write!(f, "Discrete({})", n),
            Self::Box { dim, low, high } => write!(f, "Box({}, [{}, {}])", dim, low, high),
        }
    }
}

/// Uniform random actions; useful for exercising environments.
impl Distribution<Action> for ActionSpace {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Action {
        match self {
            Self::Discrete(n) => Action::Discrete(rng.gen_range(0..*n)),
            Self::Box { dim, low, high } => Action::Continuous(Array1::from_shape_simple_fn(
                *dim,
                || rng.gen_range(*low..=*high) as f32,
            )),
        }
    }
}

/// An action taken in an environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Index of a discrete action.
    Discrete(usize),
    /// Real-valued action vector.
    Continuous(Array1<f32>),
}

impl Action {
    /// The discrete action index, if this is a discrete action.
    #[inline]
    pub const fn as_discrete(&self) -> Option<usize> {
        match self {
            Self::Discrete(index) => Some(*index),
            Self::Continuous(_) => None,
        }
    }

    /// The action vector, if this is a continuous action.
    #[inline]
    pub const fn as_continuous(&self) -> Option<&Array1<f32>> {
        match self {
            Self::Discrete(_) => None,
            Self::Continuous(values) => Some(values),
        }
    }
}
