//! Flat parameter vectors
//!
//! Perturbation-based optimizers treat all of a model's parameters as one vector.
//! [`FlatParams`] maps between that vector and the model's parameter tensors.
use super::utils;
use ndarray::{Array1, ArrayView1};
use tch::{Device, TchError, Tensor};
use thiserror::Error;

/// Error setting a flat parameter vector.
#[derive(Debug, Error)]
pub enum FlatParamsError {
    #[error("expected {expected} parameters, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error(transparent)]
    Torch(#[from] TchError),
}

/// Reads and writes a set of parameter tensors as a single flat vector.
///
/// Holds shallow clones of the parameters: writes go directly to the storage used by the
/// model that owns them. Parameters are enumerated in the order given at construction.
#[derive(Debug)]
pub struct FlatParams {
    params: Vec<Tensor>,
    shapes: Vec<Vec<i64>>,
    num_params: usize,
}

impl FlatParams {
    pub fn new<'a, I>(params: I) -> Self
    where
        I: IntoIterator<Item = &'a Tensor>,
    {
        let params: Vec<_> = params.into_iter().map(Tensor::shallow_clone).collect();
        let shapes: Vec<_> = params.iter().map(Tensor::size).collect();
        let num_params = shapes
            .iter()
            .map(|shape| shape.iter().product::<i64>() as usize)
            .sum();
        Self {
            params,
            shapes,
            num_params,
        }
    }

    /// Total number of scalar parameters.
    pub const fn num_params(&self) -> usize {
        self.num_params
    }

    /// Shape of each parameter tensor, in enumeration order.
    pub fn shapes(&self) -> &[Vec<i64>] {
        &self.shapes
    }

    /// Copy the parameters into a flat vector.
    pub fn get_flat(&self) -> Result<Array1<f32>, FlatParamsError> {
        if self.params.is_empty() {
            return Ok(Array1::zeros(0));
        }
        let flat = tch::no_grad(|| utils::f_flatten_tensors(&self.params))?;
        Ok(Array1::from(Vec::<f32>::from(&flat.to_device(Device::Cpu))))
    }

    /// Overwrite every parameter from a flat vector.
    ///
    /// The vector must have exactly [`num_params`](Self::num_params) elements.
    pub fn set_flat(&mut self, values: ArrayView1<f32>) -> Result<(), FlatParamsError> {
        if values.len() != self.num_params {
            return Err(FlatParamsError::LengthMismatch {
                expected: self.num_params,
                actual: values.len(),
            });
        }
        let device = match self.params.first() {
            Some(param) => param.device(),
            None => return Ok(()),
        };
        let flat = Tensor::of_slice(&values.to_vec()).to_device(device);
        let new_values = utils::f_unflatten_tensors(&flat, &self.shapes)?;
        tch::no_grad(|| -> Result<(), FlatParamsError> {
            for (param, value) in self.params.iter_mut().zip(&new_values) {
                param.f_copy_(value)?;
            }
            Ok(())
        })
    }
}
