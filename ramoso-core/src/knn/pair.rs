//! Distance/identifier pairs and their orderings.

use core::cmp::Ordering;

use crate::{distance::DistanceValue, index::ObjectId};

/// A result entry: an object and its distance from the query.
///
/// Pairs order ascending by distance, then by identifier, which is the
/// tie-break rule applied to every [`crate::KnnList`].
///
/// # Examples
/// ```
/// use ramoso_core::{DistancePair, ObjectId};
///
/// let near = DistancePair::new(0.5_f64, ObjectId::new(9));
/// let tied = DistancePair::new(0.5_f64, ObjectId::new(2));
/// assert!(tied < near);
/// assert_eq!(near.id(), ObjectId::new(9));
/// ```
#[derive(Clone, Debug)]
pub struct DistancePair<D> {
    distance: D,
    id: ObjectId,
}

impl<D> DistancePair<D> {
    /// Creates a pair.
    #[must_use]
    pub const fn new(distance: D, id: ObjectId) -> Self {
        Self { distance, id }
    }

    /// Returns the distance from the query.
    #[rustfmt::skip]
    #[must_use]
    pub const fn distance(&self) -> &D { &self.distance }

    /// Returns the object identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn id(&self) -> ObjectId { self.id }

    /// Splits the pair into its parts.
    #[must_use]
    pub fn into_parts(self) -> (D, ObjectId) {
        (self.distance, self.id)
    }
}

impl<D: DistanceValue> DistancePair<D> {
    /// Compares distances only, ignoring identifiers.
    pub fn compare_by_distance(&self, other: &Self) -> Ordering {
        self.distance.compare(&other.distance)
    }
}

impl<D: DistanceValue> PartialEq for DistancePair<D> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<D: DistanceValue> Eq for DistancePair<D> {}

impl<D: DistanceValue> Ord for DistancePair<D> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_by_distance(other)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl<D: DistanceValue> PartialOrd for DistancePair<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
