//! Synthetic benchmark data.
//!
//! Uniform random vectors in the unit hypercube under the Euclidean metric,
//! plus query points drawn from the same distribution.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use ramoso_core::{MetricSpace, ObjectId, SpaceError};

/// Errors that may occur while generating synthetic data.
#[derive(Debug, thiserror::Error)]
pub enum SyntheticError {
    /// The requested point count was zero.
    #[error("point count must be greater than zero")]
    ZeroPoints,
    /// The requested dimension count was zero.
    #[error("dimension count must be greater than zero")]
    ZeroDimensions,
    /// The requested `point_count * dimensions` overflowed `usize`.
    #[error("point_count * dimensions overflows usize")]
    Overflow,
}

/// Uniform random vector configuration.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Dimensionality of each vector.
    pub dimensions: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// Row-major point set implementing [`MetricSpace`].
#[derive(Clone, Debug)]
pub struct SyntheticSpace {
    data: Vec<f64>,
    dimensions: usize,
}

impl SyntheticSpace {
    /// Generates uniform random vectors in `[0.0, 1.0)`.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when the configuration is invalid.
    pub fn generate(config: &SyntheticConfig) -> Result<Self, SyntheticError> {
        if config.point_count == 0 {
            return Err(SyntheticError::ZeroPoints);
        }
        if config.dimensions == 0 {
            return Err(SyntheticError::ZeroDimensions);
        }
        let total = config
            .point_count
            .checked_mul(config.dimensions)
            .ok_or(SyntheticError::Overflow)?;

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let data = (0..total).map(|_| rng.gen_range(0.0..1.0)).collect();
        Ok(Self {
            data,
            dimensions: config.dimensions,
        })
    }

    /// Draws `count` query points from the generating distribution.
    #[must_use]
    pub fn queries(&self, count: usize, seed: u64) -> Vec<Vec<f64>> {
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                (0..self.dimensions)
                    .map(|_| rng.gen_range(0.0..1.0))
                    .collect()
            })
            .collect()
    }

    /// Returns the number of stored points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len().checked_div(self.dimensions).unwrap_or(0)
    }

    /// Returns `true` when no points are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the dimensionality of every point.
    #[must_use]
    pub const fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Returns the identifiers of all stored points, in storage order.
    #[must_use]
    pub fn ids(&self) -> Vec<ObjectId> {
        (0..self.len())
            .filter_map(|index| u64::try_from(index).ok())
            .map(ObjectId::new)
            .collect()
    }

    /// Returns one coordinate of a stored point.
    ///
    /// # Errors
    /// Returns [`SpaceError::UnknownObject`] when `id` is not stored or
    /// `axis` is out of range.
    pub fn coordinate(&self, id: ObjectId, axis: usize) -> Result<f64, SpaceError> {
        self.point(id)?
            .get(axis)
            .copied()
            .ok_or(SpaceError::UnknownObject { id })
    }

    fn point(&self, id: ObjectId) -> Result<&[f64], SpaceError> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| index.checked_mul(self.dimensions))
            .and_then(|start| self.data.get(start..start.checked_add(self.dimensions)?))
            .ok_or(SpaceError::UnknownObject { id })
    }
}

impl MetricSpace for SyntheticSpace {
    type Object = Vec<f64>;
    type Distance = f64;

    fn distance(&self, left: ObjectId, right: ObjectId) -> Result<f64, SpaceError> {
        euclidean(self.point(left)?, self.point(right)?)
    }

    fn distance_to(&self, query: &Vec<f64>, id: ObjectId) -> Result<f64, SpaceError> {
        euclidean(query, self.point(id)?)
    }

    fn resolve(&self, id: ObjectId) -> Result<Vec<f64>, SpaceError> {
        self.point(id).map(<[f64]>::to_vec)
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "Euclidean distance is defined over floating-point coordinates"
)]
fn euclidean(left: &[f64], right: &[f64]) -> Result<f64, SpaceError> {
    if left.len() != right.len() {
        return Err(SpaceError::DimensionMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(left
        .iter()
        .zip(right)
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f64>()
        .sqrt())
}
