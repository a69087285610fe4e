//! Frozen query results.

use std::slice;

use crate::{distance::DistanceValue, index::ObjectId};

use super::{DistancePair, DistanceView, IdView, KnnSubList};

/// Read access shared by [`KnnList`] and the views derived from it.
///
/// Entries are always sorted ascending by distance, ties by identifier.
pub trait KnnResult<D: DistanceValue> {
    /// Returns the `k` the result was computed (or cut) for.
    fn k(&self) -> usize;

    /// Returns the entries in ascending order.
    fn as_slice(&self) -> &[DistancePair<D>];

    /// Returns the number of entries, which exceeds `k` when the boundary
    /// distance is shared.
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns `true` when the result holds no entries.
    fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Returns the entry at `index`.
    fn get(&self, index: usize) -> Option<&DistancePair<D>> {
        self.as_slice().get(index)
    }

    /// Returns the distance of the `k`-th entry, or of the last entry when
    /// fewer than `k` exist.
    fn knn_distance(&self) -> Option<&D> {
        let position = self.k().min(self.len()).checked_sub(1)?;
        self.as_slice().get(position).map(DistancePair::distance)
    }

    /// Returns `true` when `id` appears in the result.
    fn contains(&self, id: ObjectId) -> bool {
        self.as_slice().iter().any(|pair| pair.id() == id)
    }

    /// Iterates over the entries in ascending order.
    fn iter(&self) -> slice::Iter<'_, DistancePair<D>> {
        self.as_slice().iter()
    }

    /// Projects the result onto its distances without copying.
    fn distances(&self) -> DistanceView<'_, D> {
        DistanceView::new(self.as_slice())
    }

    /// Projects the result onto its identifiers without copying.
    fn ids(&self) -> IdView<'_, D> {
        IdView::new(self.as_slice())
    }

    /// Cuts the result at `k`, extended so no tie group is split.
    ///
    /// When `k >= self.len()` the view covers the whole result and keeps its
    /// original `k`.
    fn sub_list(&self, k: usize) -> KnnSubList<'_, D> {
        KnnSubList::new(self.as_slice(), self.k(), k)
    }
}

/// Immutable, ascending result of a kNN query.
///
/// # Examples
/// ```
/// use ramoso_core::{DistancePair, KnnList, KnnResult, ObjectId};
///
/// let list = KnnList::from_pairs(
///     2,
///     vec![
///         DistancePair::new(2.0_f64, ObjectId::new(1)),
///         DistancePair::new(0.5_f64, ObjectId::new(0)),
///     ],
/// );
/// assert_eq!(list.len(), 2);
/// assert_eq!(list.get(0).map(|pair| pair.id()), Some(ObjectId::new(0)));
/// assert_eq!(list.knn_distance(), Some(&2.0));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnnList<D: DistanceValue> {
    k: usize,
    entries: Vec<DistancePair<D>>,
}

impl<D: DistanceValue> KnnList<D> {
    /// Builds a list from unsorted pairs, applying the result ordering.
    #[must_use]
    pub fn from_pairs(k: usize, mut entries: Vec<DistancePair<D>>) -> Self {
        entries.sort_unstable();
        Self { k, entries }
    }

    /// Consumes the list and returns its entries.
    #[must_use]
    pub fn into_inner(self) -> Vec<DistancePair<D>> {
        self.entries
    }
}

impl<D: DistanceValue> KnnResult<D> for KnnList<D> {
    #[rustfmt::skip]
    fn k(&self) -> usize { self.k }

    #[rustfmt::skip]
    fn as_slice(&self) -> &[DistancePair<D>] { &self.entries }
}

impl<D: DistanceValue> IntoIterator for KnnList<D> {
    type Item = DistancePair<D>;
    type IntoIter = std::vec::IntoIter<DistancePair<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, D: DistanceValue> IntoIterator for &'a KnnList<D> {
    type Item = &'a DistancePair<D>;
    type IntoIter = slice::Iter<'a, DistancePair<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
