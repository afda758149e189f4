//! Observation preprocessors
//!
//! A preprocessor turns a raw environment observation into a real-valued feature array with a
//! fixed, declared shape.
use ndarray::{Array, Array1, ArrayD, Dimension, IntoDimension, Ix1};
use thiserror::Error;

/// Converts raw observations into feature arrays.
pub trait Preprocessor {
    type Observation: ?Sized;

    /// Shape of every feature array produced by [`transform`](Self::transform).
    fn shape(&self) -> &[usize];

    /// Convert an observation into a feature array.
    fn transform(&self, observation: &Self::Observation) -> Result<ArrayD<f32>, PreprocessError>;
}

/// An observation that a preprocessor cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PreprocessError {
    #[error("index {index} is out of range for {size} categories")]
    IndexOutOfRange { index: usize, size: usize },
}

/// Passes real-valued array observations through as features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoPreprocessor<D> {
    dim: D,
}

impl<D: Dimension> NoPreprocessor<D> {
    pub fn new<E: IntoDimension<Dim = D>>(shape: E) -> Self {
        Self {
            dim: shape.into_dimension(),
        }
    }
}

impl<D: Dimension> Preprocessor for NoPreprocessor<D> {
    type Observation = Array<f64, D>;

    fn shape(&self) -> &[usize] {
        self.dim.slice()
    }

    fn transform(&self, observation: &Self::Observation) -> Result<ArrayD<f32>, PreprocessError> {
        Ok(observation.mapv(|x| x as f32).into_dyn())
    }
}

/// One-hot encodes index observations from `0 .. size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHotPreprocessor {
    dim: Ix1,
}

impl OneHotPreprocessor {
    pub fn new(size: usize) -> Self {
        Self {
            dim: size.into_dimension(),
        }
    }

    pub fn size(&self) -> usize {
        self.dim[0]
    }
}

impl Preprocessor for OneHotPreprocessor {
    type Observation = usize;

    fn shape(&self) -> &[usize] {
        self.dim.slice()
    }

    fn transform(&self, observation: &usize) -> Result<ArrayD<f32>, PreprocessError> {
        let mut features = Array1::zeros(self.size());
        let x = features
            .get_mut(*observation)
            .ok_or(PreprocessError::IndexOutOfRange {
                index: *observation,
                size: self.size(),
            })?;
        *x = 1.0;
        Ok(features.into_dyn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Ix2};

    #[test]
    fn no_preprocessor_1d() {
        let p = NoPreprocessor::<Ix1>::new(3);
        assert_eq!(p.shape(), &[3]);
        assert_eq!(
            p.transform(&arr1(&[1.0, -2.5, 0.0])).unwrap(),
            arr1(&[1.0f32, -2.5, 0.0]).into_dyn()
        );
    }

    #[test]
    fn no_preprocessor_2d_shape() {
        let p = NoPreprocessor::<Ix2>::new((2, 3));
        assert_eq!(p.shape(), &[2, 3]);
        assert_eq!(p.transform(&Array::zeros((2, 3))).unwrap().shape(), &[2, 3]);
    }

    #[test]
    fn one_hot() {
        let p = OneHotPreprocessor::new(4);
        assert_eq!(p.shape(), &[4]);
        assert_eq!(p.transform(&2).unwrap(), arr1(&[0.0f32, 0.0, 1.0, 0.0]).into_dyn());
    }

    #[test]
    fn one_hot_out_of_range() {
        let p = OneHotPreprocessor::new(2);
        assert_eq!(
            p.transform(&5),
            Err(PreprocessError::IndexOutOfRange { index: 5, size: 2 })
        );
    }
}
