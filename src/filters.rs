//! Observation filters
//!
//! A filter keeps running statistics of the feature vectors it sees and uses them to rescale new
//! feature vectors. Whether a call folds its input into the statistics is chosen by calling
//! either [`ObservationFilter::normalize_and_update`] or [`ObservationFilter::normalize_only`].
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Online per-feature mean and variance of a stream of vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningStat {
    count: u64,
    mean: Array1<f64>,
    squared_residual_sum: Array1<f64>,
}

impl RunningStat {
    pub fn new(num_features: usize) -> Self {
        Self {
            count: 0,
            mean: Array1::zeros(num_features),
            squared_residual_sum: Array1::zeros(num_features),
        }
    }

    /// Number of vectors accumulated.
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Number of features per vector.
    pub fn num_features(&self) -> usize {
        self.mean.len()
    }

    /// Per-feature mean.
    pub const fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Per-feature sample variance.
    ///
    /// With fewer than two samples the variance is taken to be the squared mean.
    pub fn variance(&self) -> Array1<f64> {
        if self.count > 1 {
            &self.squared_residual_sum / (self.count - 1) as f64
        } else {
            self.mean.mapv(|m| m * m)
        }
    }

    /// Per-feature standard deviation.
    pub fn std(&self) -> Array1<f64> {
        self.variance().mapv(f64::sqrt)
    }

    /// Add a vector to the statistics.
    ///
    /// # Panics
    /// If `value` does not have [`num_features`](Self::num_features) elements.
    pub fn push(&mut self, value: ArrayView1<f32>) {
        self.count += 1;
        let count = self.count as f64;
        Zip::from(&mut self.mean)
            .and(&mut self.squared_residual_sum)
            .and(&value)
            .for_each(|mean, ssr, &x| {
                let x = f64::from(x);
                let residual_pre = x - *mean;
                *mean += residual_pre / count;
                *ssr += residual_pre * (x - *mean);
            });
    }

    /// Merge the statistics of another stream into these.
    ///
    /// The result is the same as if every vector pushed into `other` had been pushed here.
    /// Fails without modification if the two streams have different numbers of features.
    pub fn merge(&mut self, other: &Self) -> Result<(), FilterShapeError> {
        self.check_shape(other)?;
        if other.count == 0 {
            return Ok(());
        }
        let n1 = self.count as f64;
        let n2 = other.count as f64;
        let total = n1 + n2;
        let delta = &other.mean - &self.mean;
        self.mean = &self.mean + &(&delta * (n2 / total));
        self.squared_residual_sum = &self.squared_residual_sum
            + &other.squared_residual_sum
            + &(delta.mapv(|d| d * d) * (n1 * n2 / total));
        self.count += other.count;
        Ok(())
    }

    fn check_shape(&self, other: &Self) -> Result<(), FilterShapeError> {
        if self.num_features() == other.num_features() {
            Ok(())
        } else {
            Err(FilterShapeError {
                expected: self.num_features(),
                actual: other.num_features(),
            })
        }
    }
}

/// Statistics with mismatched numbers of features were combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected statistics over {expected} features, got {actual}")]
pub struct FilterShapeError {
    pub expected: usize,
    pub actual: usize,
}

/// Normalizes batches of feature vectors using running statistics.
///
/// Batches are 2D arrays with one feature vector per row.
pub trait ObservationFilter {
    /// Normalize a batch using the existing statistics, leaving them unchanged.
    fn normalize_only(&self, batch: ArrayView2<f32>) -> Array2<f32>;

    /// Fold every row of the batch into the statistics then normalize the batch.
    fn normalize_and_update(&mut self, batch: ArrayView2<f32>) -> Array2<f32>;
}

/// A filter that passes feature vectors through unchanged.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoFilter;

impl ObservationFilter for NoFilter {
    fn normalize_only(&self, batch: ArrayView2<f32>) -> Array2<f32> {
        batch.to_owned()
    }

    fn normalize_and_update(&mut self, batch: ArrayView2<f32>) -> Array2<f32> {
        batch.to_owned()
    }
}

/// Standardizes each feature to zero mean and unit variance then clips the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanStdFilter {
    /// Statistics over all samples seen.
    stats: RunningStat,
    /// Statistics over samples seen since the buffer was last cleared.
    buffer: RunningStat,
    /// Subtract the mean.
    pub demean: bool,
    /// Divide by the standard deviation.
    pub destd: bool,
    /// Clip normalized values to `[-clip, clip]`.
    pub clip: Option<f32>,
}

impl MeanStdFilter {
    pub fn new(num_features: usize) -> Self {
        Self {
            stats: RunningStat::new(num_features),
            buffer: RunningStat::new(num_features),
            demean: true,
            destd: true,
            clip: Some(10.0),
        }
    }

    /// Statistics over every sample seen by this filter.
    pub const fn stats(&self) -> &RunningStat {
        &self.stats
    }

    /// Statistics over the samples seen since the last [`clear_buffer`](Self::clear_buffer).
    pub const fn buffer(&self) -> &RunningStat {
        &self.buffer
    }

    /// Forget the buffered samples. The full statistics are unaffected.
    pub fn clear_buffer(&mut self) {
        self.buffer = RunningStat::new(self.buffer.num_features());
    }

    /// Fold the buffered samples of another filter into this one.
    ///
    /// If `with_buffer` is set the samples are also added to this filter's own buffer.
    pub fn apply_changes(
        &mut self,
        other: &Self,
        with_buffer: bool,
    ) -> Result<(), FilterShapeError> {
        self.stats.merge(&other.buffer)?;
        if with_buffer {
            self.buffer.merge(&other.buffer)?;
        }
        Ok(())
    }

    /// Replace the statistics of this filter with those of another.
    ///
    /// Fails without modification if the filters have different numbers of features.
    pub fn sync(&mut self, other: &Self) -> Result<(), FilterShapeError> {
        self.stats.check_shape(&other.stats)?;
        self.stats = other.stats.clone();
        self.buffer = other.buffer.clone();
        Ok(())
    }

    fn normalize(&self, batch: ArrayView2<f32>) -> Array2<f32> {
        let mut out = batch.mapv(f64::from);
        if self.demean {
            out -= self.stats.mean();
        }
        if self.destd {
            out /= &self.stats.std().mapv(|s| s + 1e-8);
        }
        let mut out = out.mapv(|v| v as f32);
        if let Some(clip) = self.clip {
            out.mapv_inplace(|v| v.clamp(-clip, clip));
        }
        out
    }
}

impl ObservationFilter for MeanStdFilter {
    fn normalize_only(&self, batch: ArrayView2<f32>) -> Array2<f32> {
        self.normalize(batch)
    }

    fn normalize_and_update(&mut self, batch: ArrayView2<f32>) -> Array2<f32> {
        for row in batch.axis_iter(Axis(0)) {
            self.stats.push(row);
            self.buffer.push(row);
        }
        self.normalize(batch)
    }
}

/// Identifies a kind of observation filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    NoFilter,
    MeanStdFilter,
}

impl Default for FilterKind {
    fn default() -> Self {
        Self::MeanStdFilter
    }
}

impl FilterKind {
    /// Build a filter of this kind for feature vectors with the given shape.
    pub fn build(self, shape: &[usize]) -> Filter {
        match self {
            Self::NoFilter => Filter::NoFilter(NoFilter),
            Self::MeanStdFilter => Filter::MeanStd(MeanStdFilter::new(shape.iter().product())),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown observation filter \"{0}\"; expected \"NoFilter\" or \"MeanStdFilter\"")]
pub struct UnknownFilterError(pub String);

impl FromStr for FilterKind {
    type Err = UnknownFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NoFilter" => Ok(Self::NoFilter),
            "MeanStdFilter" => Ok(Self::MeanStdFilter),
            _ => Err(UnknownFilterError(s.into())),
        }
    }
}

/// An observation filter of any supported kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    NoFilter(NoFilter),
    MeanStd(MeanStdFilter),
}

impl Filter {
    pub const fn kind(&self) -> FilterKind {
        match self {
            Self::NoFilter(_) => FilterKind::NoFilter,
            Self::MeanStd(_) => FilterKind::MeanStdFilter,
        }
    }

    /// Number of samples folded into the filter statistics.
    ///
    /// Always zero for filters that keep no statistics.
    pub const fn num_samples(&self) -> u64 {
        match self {
            Self::NoFilter(_) => 0,
            Self::MeanStd(filter) => filter.stats.count(),
        }
    }
}

impl ObservationFilter for Filter {
    fn normalize_only(&self, batch: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Self::NoFilter(filter) => filter.normalize_only(batch),
            Self::MeanStd(filter) => filter.normalize_only(batch),
        }
    }

    fn normalize_and_update(&mut self, batch: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Self::NoFilter(filter) => filter.normalize_and_update(batch),
            Self::MeanStd(filter) => filter.normalize_and_update(batch),
        }
    }
}



#[cfg(test)]
mod mismatched_filters {
    use super::*;
    use ndarray::arr2;
    use rstest::{fixture, rstest};

    #[fixture]
    fn local() -> MeanStdFilter {
        let mut filter = MeanStdFilter::new(2);
        let _ = filter.normalize_and_update(arr2(&[[1.0, 2.0]]).view());
        filter
    }

    #[fixture]
    fn remote() -> MeanStdFilter {
        let mut filter = MeanStdFilter::new(3);
        let _ = filter.normalize_and_update(arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).view());
        filter
    }

    #[rstest]
    #[case::without_buffer(false)]
    #[case::with_buffer(true)]
    fn apply_changes_fails_unchanged(
        mut local: MeanStdFilter,
        remote: MeanStdFilter,
        #[case] with_buffer: bool,
    ) {
        let before = local.clone();
        let err = local.apply_changes(&remote, with_buffer).unwrap_err();
        assert_eq!(err.expected, 2);
        assert_eq!(err.actual, 3);
        assert_eq!(local, before);
    }

    #[rstest]
    fn sync_fails_unchanged(mut local: MeanStdFilter, remote: MeanStdFilter) {
        let before = local.clone();
        assert!(local.sync(&remote).is_err());
        assert_eq!(local, before);
        // Still usable with its own width
        let out = local.normalize_only(arr2(&[[1.0, 2.0]]).view());
        assert_eq!(out.shape(), &[1, 2]);
    }
}
