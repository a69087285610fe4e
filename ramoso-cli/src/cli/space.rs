//! Euclidean vector space backing trees loaded by the CLI.

use std::collections::BTreeMap;

use ramoso_core::{MetricSpace, ObjectId, SpaceError};

/// Dense `f64` coordinates keyed by object identifier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EuclideanSpace {
    objects: BTreeMap<ObjectId, Vec<f64>>,
}

impl EuclideanSpace {
    /// Wraps an identifier-to-coordinates map.
    #[must_use]
    pub fn new(objects: BTreeMap<ObjectId, Vec<f64>>) -> Self {
        Self { objects }
    }

    /// Returns the number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` when no objects are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Reports whether `id` is stored.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    fn coordinates(&self, id: ObjectId) -> Result<&[f64], SpaceError> {
        self.objects
            .get(&id)
            .map(Vec::as_slice)
            .ok_or(SpaceError::UnknownObject { id })
    }
}

impl MetricSpace for EuclideanSpace {
    type Object = Vec<f64>;
    type Distance = f64;

    fn distance(&self, left: ObjectId, right: ObjectId) -> Result<f64, SpaceError> {
        euclidean(self.coordinates(left)?, self.coordinates(right)?)
    }

    fn distance_to(&self, query: &Vec<f64>, id: ObjectId) -> Result<f64, SpaceError> {
        euclidean(query, self.coordinates(id)?)
    }

    fn resolve(&self, id: ObjectId) -> Result<Vec<f64>, SpaceError> {
        self.coordinates(id).map(<[f64]>::to_vec)
    }
}

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
