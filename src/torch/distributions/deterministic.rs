//! Deterministic action distribution
use crate::spaces::{Action, ActionSpace};
use ndarray::Array1;
use tch::{Device, Kind, Tensor};

/// A deterministic action distribution parameterized by model outputs.
///
/// "Sampling" returns the point estimate:
/// the outputs themselves for box spaces and the highest-scoring index for discrete spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deterministic {
    action_space: ActionSpace,
}

impl Deterministic {
    pub const fn new(action_space: ActionSpace) -> Self {
        Self { action_space }
    }

    /// Number of distribution parameters (model outputs) per action.
    pub const fn num_params(&self) -> usize {
        self.action_space.num_outputs()
    }

    /// Action for each row of a `[BATCH_SIZE, num_params]` tensor of distribution parameters.
    pub fn sample(&self, params: &Tensor) -> Vec<Action> {
        let params = params.to_device(Device::Cpu).to_kind(Kind::Float);
        match self.action_space {
            ActionSpace::Discrete(_) => Vec::<i64>::from(&params.argmax(-1, false))
                .into_iter()
                .map(|index| Action::Discrete(index as usize))
                .collect(),
            ActionSpace::Box { dim, .. } => Vec::<f32>::from(&params.flatten(0, -1))
                .chunks(dim.max(1))
                .map(|row| Action::Continuous(Array1::from(row.to_vec())))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn num_params() {
        assert_eq!(Deterministic::new(ActionSpace::Discrete(3)).num_params(), 3);
        let box_space = ActionSpace::Box {
            dim: 2,
            low: -1.0,
            high: 1.0,
        };
        assert_eq!(Deterministic::new(box_space).num_params(), 2);
    }

    #[test]
    fn discrete_argmax() {
        let d = Deterministic::new(ActionSpace::Discrete(3));
        let params = Tensor::of_slice(&[0.1f32, 0.7, 0.2, 3.0, -1.0, 0.0]).reshape(&[2, 3]);
        assert_eq!(
            d.sample(&params),
            vec![Action::Discrete(1), Action::Discrete(0)]
        );
    }

    #[test]
    fn box_passthrough() {
        let d = Deterministic::new(ActionSpace::Box {
            dim: 2,
            low: -1.0,
            high: 1.0,
        });
        let params = Tensor::of_slice(&[0.25f32, -3.0]).reshape(&[1, 2]);
        assert_eq!(
            d.sample(&params),
            vec![Action::Continuous(arr1(&[0.25, -3.0]))]
        );
    }

    #[test]
    fn sample_is_repeatable() {
        let d = Deterministic::new(ActionSpace::Discrete(4));
        let params = Tensor::of_slice(&[0.3f32, 0.1, 0.9, 0.2]).reshape(&[1, 4]);
        assert_eq!(d.sample(&params), d.sample(&params));
    }
}
