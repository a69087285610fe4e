//! Bounded top-k accumulator that keeps ties at the boundary.

use std::collections::BinaryHeap;
use std::num::NonZeroUsize;

use crate::{
    distance::{DistanceValue, Threshold},
    index::ObjectId,
};

use super::{DistancePair, KnnList};

/// Best-`k` accumulator used while a query is running.
///
/// Up to `k` pairs are "settled" in a max-heap whose top is the current
/// threshold. Pairs tied with the threshold are parked next to the heap
/// instead of being dropped, so the frozen [`KnnList`] may hold more than `k`
/// entries when the boundary distance is shared.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use ramoso_core::{KnnHeap, KnnResult, ObjectId, Threshold};
///
/// let mut heap = KnnHeap::new(NonZeroUsize::new(2).expect("k is non-zero"));
/// heap.insert(3_u32, ObjectId::new(0));
/// assert_eq!(heap.threshold(), Threshold::Unbounded);
///
/// heap.insert(1, ObjectId::new(1));
/// assert_eq!(heap.threshold(), Threshold::Bounded(3));
///
/// heap.insert(2, ObjectId::new(2));
/// heap.insert(2, ObjectId::new(3));
/// assert_eq!(heap.threshold(), Threshold::Bounded(2));
///
/// let list = heap.finalise();
/// let ids: Vec<u64> = list.ids().iter().map(|id| id.get()).collect();
/// assert_eq!(ids, vec![1, 2, 3]);
/// ```
#[derive(Clone, Debug)]
pub struct KnnHeap<D: DistanceValue> {
    k: NonZeroUsize,
    settled: BinaryHeap<DistancePair<D>>,
    ties: Vec<DistancePair<D>>,
}

impl<D: DistanceValue> KnnHeap<D> {
    /// Creates an empty accumulator for `k` neighbours.
    #[must_use]
    pub fn new(k: NonZeroUsize) -> Self {
        Self {
            k,
            settled: BinaryHeap::with_capacity(k.get()),
            ties: Vec::new(),
        }
    }

    /// Returns the requested neighbour count.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k.get()
    }

    /// Returns the number of pairs currently held, ties included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.settled.len() + self.ties.len()
    }

    /// Returns `true` before the first insertion succeeds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settled.is_empty()
    }

    /// Returns `true` once `k` pairs have been settled.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.settled.len() >= self.k.get()
    }

    /// Returns the worst distance still accepted.
    ///
    /// Reports [`Threshold::Unbounded`] until `k` pairs have been admitted.
    /// Once full the bound never increases.
    #[must_use]
    pub fn threshold(&self) -> Threshold<D> {
        match self.settled.peek() {
            Some(worst) if self.is_full() => Threshold::Bounded(worst.distance().clone()),
            _ => Threshold::Unbounded,
        }
    }

    /// Offers a pair to the accumulator and reports whether it was kept.
    ///
    /// The pair is kept while fewer than `k` pairs are settled, or when its
    /// distance does not exceed the threshold. Admitting a strictly better
    /// pair evicts the current worst one; evicted pairs survive as ties only
    /// while they still share the new threshold.
    pub fn insert(&mut self, distance: D, id: ObjectId) -> bool {
        let pair = DistancePair::new(distance, id);
        if !self.is_full() {
            self.settled.push(pair);
            return true;
        }

        let Some(worst) = self.settled.peek() else {
            return false;
        };
        match pair.compare_by_distance(worst) {
            core::cmp::Ordering::Greater => false,
            core::cmp::Ordering::Equal => {
                self.ties.push(pair);
                true
            }
            core::cmp::Ordering::Less => {
                self.settled.push(pair);
                if let Some(evicted) = self.settled.pop() {
                    self.retain_tie(evicted);
                }
                true
            }
        }
    }

    fn retain_tie(&mut self, evicted: DistancePair<D>) {
        let still_tied = self
            .settled
            .peek()
            .is_some_and(|worst| worst.compare_by_distance(&evicted).is_eq());
        if still_tied {
            self.ties.push(evicted);
        } else {
            // Every parked tie shared the evicted distance, which is now
            // strictly worse than the threshold.
            self.ties.clear();
        }
    }

    /// Freezes the accumulator into an ascending [`KnnList`].
    #[must_use]
    pub fn finalise(self) -> KnnList<D> {
        let mut entries = self.settled.into_vec();
        entries.extend(self.ties);
        KnnList::from_pairs(self.k.get(), entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rstest::rstest;

    use crate::knn::KnnResult;

    fn heap(k: usize) -> KnnHeap<u32> {
        KnnHeap::new(NonZeroUsize::new(k).expect("k must be non-zero"))
    }

    fn distances(list: &KnnList<u32>) -> Vec<u32> {
        list.distances().iter().copied().collect()
    }

    #[test]
    fn threshold_is_unbounded_until_full() {
        let mut acc = heap(3);
        acc.insert(10, ObjectId::new(0));
        acc.insert(20, ObjectId::new(1));
        assert!(acc.threshold().is_unbounded());
        acc.insert(5, ObjectId::new(2));
        assert_eq!(acc.threshold(), Threshold::Bounded(20));
    }

    #[test]
    fn strictly_worse_pairs_are_rejected_once_full() {
        let mut acc = heap(1);
        assert!(acc.insert(4, ObjectId::new(0)));
        assert!(!acc.insert(5, ObjectId::new(1)));
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn ties_with_the_boundary_are_kept() {
        let mut acc = heap(2);
        acc.insert(1, ObjectId::new(0));
        acc.insert(2, ObjectId::new(1));
        assert!(acc.insert(2, ObjectId::new(2)));
        assert!(acc.insert(2, ObjectId::new(3)));
        assert_eq!(acc.len(), 4);
        assert_eq!(distances(&acc.finalise()), vec![1, 2, 2, 2]);
    }

    #[test]
    fn ties_are_trimmed_when_the_boundary_tightens() {
        let mut acc = heap(2);
        acc.insert(1, ObjectId::new(0));
        acc.insert(3, ObjectId::new(1));
        acc.insert(3, ObjectId::new(2));
        acc.insert(3, ObjectId::new(3));
        assert_eq!(acc.len(), 4);

        acc.insert(2, ObjectId::new(4));
        assert_eq!(acc.threshold(), Threshold::Bounded(2));
        assert_eq!(distances(&acc.finalise()), vec![1, 2]);
    }

    #[test]
    fn evicted_pair_survives_while_still_tied() {
        let mut acc = heap(2);
        acc.insert(5, ObjectId::new(0));
        acc.insert(5, ObjectId::new(1));
        acc.insert(1, ObjectId::new(2));
        assert_eq!(acc.threshold(), Threshold::Bounded(5));
        let list = acc.finalise();
        assert_eq!(distances(&list), vec![1, 5, 5]);

        let mut acc = heap(3);
        acc.insert(5, ObjectId::new(0));
        acc.insert(5, ObjectId::new(1));
        acc.insert(5, ObjectId::new(2));
        acc.insert(1, ObjectId::new(3));
        assert_eq!(distances(&acc.finalise()), vec![1, 5, 5, 5]);
    }

    #[rstest]
    #[case(1)]
    #[case(4)]
    fn finalised_list_is_sorted_with_ids_breaking_ties(#[case] k: usize) {
        let mut acc = heap(k);
        for (distance, id) in [(3, 9), (1, 4), (3, 2), (1, 1), (2, 7)] {
            acc.insert(distance, ObjectId::new(id));
        }
        let list = acc.finalise();
        let pairs: Vec<(u32, u64)> = list
            .iter()
            .map(|pair| (*pair.distance(), pair.id().get()))
            .collect();
        let mut sorted = pairs.clone();
        sorted.sort_unstable();
        assert_eq!(pairs, sorted);
        assert_eq!(list.k(), k);
    }

    proptest! {
        #[test]
        fn threshold_never_increases_once_full(
            k in 1_usize..8,
            distances in prop::collection::vec(0_u32..50, 1..64),
        ) {
            let mut acc = heap(k);
            let mut previous: Option<u32> = None;
            for (id, distance) in distances.iter().enumerate() {
                acc.insert(*distance, ObjectId::new(id as u64));
                if let Threshold::Bounded(current) = acc.threshold() {
                    if let Some(before) = previous {
                        prop_assert!(current <= before);
                    }
                    previous = Some(current);
                }
            }
        }

        #[test]
        fn accumulator_matches_sorted_prefix_with_ties(
            k in 1_usize..8,
            distances in prop::collection::vec(0_u32..20, 1..64),
        ) {
            let mut acc = heap(k);
            for (id, distance) in distances.iter().enumerate() {
                acc.insert(*distance, ObjectId::new(id as u64));
            }
            let list = acc.finalise();

            let mut expected = distances.clone();
            expected.sort_unstable();
            let cut = k.min(expected.len());
            let boundary = expected[cut - 1];
            let expected: Vec<u32> = expected
                .iter()
                .copied()
                .enumerate()
                .take_while(|(index, distance)| *index < cut || *distance == boundary)
                .map(|(_, distance)| distance)
                .collect();
            prop_assert_eq!(list.distances().iter().copied().collect::<Vec<_>>(), expected);
        }
    }
}
