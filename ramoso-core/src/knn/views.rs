//! Read-only projections over a frozen result.
//!
//! Views borrow the entries of a [`crate::KnnList`]; none of them copies or
//! owns result data.

use std::iter::FusedIterator;
use std::slice;

use crate::{distance::DistanceValue, index::ObjectId};

use super::{DistancePair, KnnResult};

/// Index-addressable projection of a result onto its distances.
///
/// Every call to [`DistanceView::iter`] returns a fresh forward-only cursor
/// starting at position zero; any number of cursors may coexist.
///
/// # Examples
/// ```
/// use ramoso_core::{DistancePair, KnnList, KnnResult, ObjectId};
///
/// let list = KnnList::from_pairs(2, vec![
///     DistancePair::new(4_u32, ObjectId::new(0)),
///     DistancePair::new(1_u32, ObjectId::new(1)),
/// ]);
/// let view = list.distances();
/// assert_eq!(view.get(1), Some(&4));
/// assert_eq!(view.iter().copied().collect::<Vec<_>>(), vec![1, 4]);
/// assert_eq!(view.iter().count(), 2);
/// ```
#[derive(Debug)]
pub struct DistanceView<'a, D> {
    entries: &'a [DistancePair<D>],
}

impl<D> Clone for DistanceView<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for DistanceView<'_, D> {}

impl<'a, D: DistanceValue> DistanceView<'a, D> {
    pub(crate) const fn new(entries: &'a [DistancePair<D>]) -> Self {
        Self { entries }
    }

    /// Returns the distance of the `index`-th entry.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a D> {
        self.entries.get(index).map(DistancePair::distance)
    }

    /// Returns the number of distances.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the underlying result is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a new cursor positioned at the first distance.
    #[must_use]
    pub fn iter(&self) -> DistanceIter<'a, D> {
        DistanceIter {
            inner: self.entries.iter(),
        }
    }
}

impl<'a, D: DistanceValue> IntoIterator for DistanceView<'a, D> {
    type Item = &'a D;
    type IntoIter = DistanceIter<'a, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, D: DistanceValue> IntoIterator for &DistanceView<'a, D> {
    type Item = &'a D;
    type IntoIter = DistanceIter<'a, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward-only cursor over the distances of a result.
#[derive(Debug)]
pub struct DistanceIter<'a, D> {
    inner: slice::Iter<'a, DistancePair<D>>,
}

impl<'a, D> Iterator for DistanceIter<'a, D> {
    type Item = &'a D;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(DistancePair::distance)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<D> ExactSizeIterator for DistanceIter<'_, D> {}

impl<D> FusedIterator for DistanceIter<'_, D> {}

/// Index-addressable projection of a result onto its identifiers.
///
/// Shares the cursor semantics of [`DistanceView`].
#[derive(Debug)]
pub struct IdView<'a, D> {
    entries: &'a [DistancePair<D>],
}

impl<D> Clone for IdView<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for IdView<'_, D> {}

impl<'a, D: DistanceValue> IdView<'a, D> {
    pub(crate) const fn new(entries: &'a [DistancePair<D>]) -> Self {
        Self { entries }
    }

    /// Returns the identifier of the `index`-th entry.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<ObjectId> {
        self.entries.get(index).map(DistancePair::id)
    }

    /// Returns the number of identifiers.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the underlying result is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a new cursor positioned at the first identifier.
    #[must_use]
    pub fn iter(&self) -> IdIter<'a, D> {
        IdIter {
            inner: self.entries.iter(),
        }
    }
}

impl<'a, D: DistanceValue> IntoIterator for IdView<'a, D> {
    type Item = ObjectId;
    type IntoIter = IdIter<'a, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward-only cursor over the identifiers of a result.
#[derive(Debug)]
pub struct IdIter<'a, D> {
    inner: slice::Iter<'a, DistancePair<D>>,
}

impl<D> Iterator for IdIter<'_, D> {
    type Item = ObjectId;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(DistancePair::id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<D> ExactSizeIterator for IdIter<'_, D> {}

impl<D> FusedIterator for IdIter<'_, D> {}

/// Prefix of a result cut at `k` and extended over the boundary tie group.
///
/// The view covers the minimal `size >= k` such that entries `k..size` all
/// share the distance of entry `k - 1`. Reading at or past `size` is a
/// contract violation: debug builds panic, release builds return `None`.
///
/// # Examples
/// ```
/// use ramoso_core::{DistancePair, KnnList, KnnResult, ObjectId};
///
/// let pairs = [1_u32, 2, 2, 2, 5]
///     .iter()
///     .zip(0_u64..)
///     .map(|(&distance, id)| DistancePair::new(distance, ObjectId::new(id)))
///     .collect();
/// let list = KnnList::from_pairs(5, pairs);
///
/// let prefix = list.sub_list(2);
/// assert_eq!(prefix.len(), 4);
/// assert_eq!(prefix.k(), 2);
/// assert_eq!(prefix.knn_distance(), Some(&2));
/// ```
#[derive(Debug)]
pub struct KnnSubList<'a, D> {
    entries: &'a [DistancePair<D>],
    k: usize,
    size: usize,
}

impl<D> Clone for KnnSubList<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for KnnSubList<'_, D> {}

impl<'a, D: DistanceValue> KnnSubList<'a, D> {
    pub(crate) fn new(entries: &'a [DistancePair<D>], inner_k: usize, k: usize) -> Self {
        if k >= entries.len() {
            return Self {
                entries,
                k: inner_k,
                size: entries.len(),
            };
        }
        Self {
            entries,
            k,
            size: tie_extended_size(entries, k),
        }
    }
}

fn tie_extended_size<D: DistanceValue>(entries: &[DistancePair<D>], k: usize) -> usize {
    let Some(boundary) = k.checked_sub(1).and_then(|last| entries.get(last)) else {
        return 0;
    };
    let tied = entries
        .iter()
        .skip(k)
        .take_while(|pair| pair.compare_by_distance(boundary).is_eq())
        .count();
    k + tied
}

impl<D: DistanceValue> KnnResult<D> for KnnSubList<'_, D> {
    #[rustfmt::skip]
    fn k(&self) -> usize { self.k }

    fn as_slice(&self) -> &[DistancePair<D>] {
        self.entries.get(..self.size).unwrap_or_default()
    }

    fn get(&self, index: usize) -> Option<&DistancePair<D>> {
        debug_assert!(index < self.size, "access beyond design size of list");
        self.as_slice().get(index)
    }
}
