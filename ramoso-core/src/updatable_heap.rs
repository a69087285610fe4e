//! Binary min-heap with decrease-key.
//!
//! Every key appears at most once. A position map tracks where each key sits
//! in the backing vector so its priority can be tightened in place instead of
//! pushing a duplicate.

use std::collections::HashMap;
use std::hash::Hash;

use crate::distance::DistanceValue;

#[derive(Clone, Debug)]
struct Slot<K, V, D> {
    key: K,
    priority: D,
    value: V,
}

/// Index-addressable min-heap keyed by `K`, ordered by a [`DistanceValue`].
///
/// # Examples
/// ```
/// use ramoso_core::UpdatableHeap;
///
/// let mut heap = UpdatableHeap::new();
/// heap.push_or_decrease("a", 5_u32, ());
/// heap.push_or_decrease("b", 3_u32, ());
/// assert!(heap.push_or_decrease("a", 1_u32, ()));
/// assert!(!heap.push_or_decrease("b", 9_u32, ()));
///
/// assert_eq!(heap.len(), 2);
/// assert_eq!(heap.pop().map(|(key, priority, _)| (key, priority)), Some(("a", 1)));
/// assert_eq!(heap.pop().map(|(key, priority, _)| (key, priority)), Some(("b", 3)));
/// assert!(heap.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct UpdatableHeap<K, V, D> {
    slots: Vec<Slot<K, V, D>>,
    positions: HashMap<K, usize>,
}

impl<K, V, D> Default for UpdatableHeap<K, V, D> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<K, V, D> UpdatableHeap<K, V, D>
where
    K: Clone + Eq + Hash,
    D: DistanceValue,
{
    /// Creates an empty heap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of queued keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns `true` when `key` is queued.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    /// Queues `key`, or tightens its priority when it is already queued.
    ///
    /// Returns `false` and leaves the heap untouched when `key` is queued with
    /// a priority that is already at least as tight. When the priority is
    /// tightened, `value` replaces the stored value.
    pub fn push_or_decrease(&mut self, key: K, priority: D, value: V) -> bool {
        if let Some(&position) = self.positions.get(&key) {
            let Some(slot) = self.slots.get_mut(position) else {
                return false;
            };
            if !slot.priority.exceeds(&priority) {
                return false;
            }
            slot.priority = priority;
            slot.value = value;
            self.sift_up(position);
            return true;
        }

        let position = self.slots.len();
        self.positions.insert(key.clone(), position);
        self.slots.push(Slot {
            key,
            priority,
            value,
        });
        self.sift_up(position);
        true
    }

    /// Returns the minimum entry without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<(&K, &D, &V)> {
        self.slots
            .first()
            .map(|slot| (&slot.key, &slot.priority, &slot.value))
    }

    /// Removes and returns the minimum entry.
    pub fn pop(&mut self) -> Option<(K, D, V)> {
        if self.slots.is_empty() {
            return None;
        }
        let last = self.slots.len() - 1;
        self.swap(0, last);
        let slot = self.slots.pop()?;
        self.positions.remove(&slot.key);
        if !self.slots.is_empty() {
            self.sift_down(0);
        }
        Some((slot.key, slot.priority, slot.value))
    }

    fn less(&self, left: usize, right: usize) -> bool {
        match (self.slots.get(left), self.slots.get(right)) {
            (Some(a), Some(b)) => b.priority.exceeds(&a.priority),
            _ => false,
        }
    }

    fn swap(&mut self, left: usize, right: usize) {
        if left == right {
            return;
        }
        self.slots.swap(left, right);
        for position in [left, right] {
            if let Some(slot) = self.slots.get(position) {
                self.positions.insert(slot.key.clone(), position);
            }
        }
    }

    fn sift_up(&mut self, mut position: usize) {
        while position > 0 {
            let parent = (position - 1) / 2;
            if !self.less(position, parent) {
                break;
            }
            self.swap(position, parent);
            position = parent;
        }
    }

    fn sift_down(&mut self, mut position: usize) {
        loop {
            let left = 2 * position + 1;
            let right = left + 1;
            let mut smallest = position;
            if left < self.slots.len() && self.less(left, smallest) {
                smallest = left;
            }
            if right < self.slots.len() && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == position {
                break;
            }
            self.swap(position, smallest);
            position = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn pops_in_ascending_priority_order() {
        let mut heap = UpdatableHeap::new();
        for (key, priority) in [(1_u32, 7_u32), (2, 3), (3, 9), (4, 1), (5, 4)] {
            heap.push_or_decrease(key, priority, ());
        }
        let order: Vec<u32> = std::iter::from_fn(|| heap.pop().map(|(key, _, _)| key)).collect();
        assert_eq!(order, vec![4, 2, 5, 1, 3]);
    }

    #[rstest]
    #[case::tighter(2, true, 2)]
    #[case::equal(6, false, 6)]
    #[case::looser(8, false, 6)]
    fn decrease_only_tightens(#[case] update: u32, #[case] changed: bool, #[case] expected: u32) {
        let mut heap = UpdatableHeap::new();
        heap.push_or_decrease('x', 6_u32, "first");
        assert_eq!(heap.push_or_decrease('x', update, "second"), changed);
        assert_eq!(heap.len(), 1);
        let (_, priority, value) = heap.pop().expect("key must be queued");
        assert_eq!(priority, expected);
        assert_eq!(value, if changed { "second" } else { "first" });
    }

    #[test]
    fn decrease_reorders_behind_the_scenes() {
        let mut heap = UpdatableHeap::new();
        heap.push_or_decrease("far", 10.0_f64, ());
        heap.push_or_decrease("mid", 5.0_f64, ());
        heap.push_or_decrease("near", 1.0_f64, ());
        assert!(heap.push_or_decrease("far", 0.5, ()));

        assert_eq!(heap.peek().map(|(key, _, _)| *key), Some("far"));
        assert!(heap.contains(&"mid"));
        heap.pop();
        assert!(!heap.contains(&"far"));
        assert_eq!(heap.pop().map(|(key, _, _)| key), Some("near"));
    }

    #[test]
    fn pop_on_empty_returns_none() {
        let mut heap = UpdatableHeap::<u8, (), u8>::new();
        assert!(heap.pop().is_none());
        assert!(heap.peek().is_none());
    }

    proptest! {
        #[test]
        fn heap_matches_minimum_priority_per_key(
            ops in prop::collection::vec((0_u8..16, 0_u32..1000), 1..128),
        ) {
            let mut heap = UpdatableHeap::new();
            let mut best: HashMap<u8, u32> = HashMap::new();
            for (key, priority) in ops {
                heap.push_or_decrease(key, priority, ());
                best.entry(key)
                    .and_modify(|current| *current = (*current).min(priority))
                    .or_insert(priority);
            }

            let mut expected: Vec<u32> = best.values().copied().collect();
            expected.sort_unstable();
            let drained: Vec<u32> =
                std::iter::from_fn(|| heap.pop().map(|(_, priority, _)| priority)).collect();
            prop_assert_eq!(drained, expected);
        }
    }
}
