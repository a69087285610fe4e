//! Search candidates and the queues that order them.

use core::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::{
    distance::DistanceValue,
    index::{NodeRef, ObjectId},
    updatable_heap::UpdatableHeap,
};

/// Routing object of the directory entry a candidate was created from,
/// together with its already evaluated distance to the query.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct ParentRouting<D> {
    pub(super) object: ObjectId,
    pub(super) distance: D,
}

/// A subtree waiting to be expanded.
#[derive(Clone, Debug)]
pub(super) struct SearchCandidate<D> {
    pub(super) lower_bound: D,
    pub(super) node: NodeRef,
    pub(super) parent: Option<ParentRouting<D>>,
}

impl<D: DistanceValue> SearchCandidate<D> {
    pub(super) fn root(node: NodeRef) -> Self {
        Self {
            lower_bound: D::identity(),
            node,
            parent: None,
        }
    }
}

/// Minimum-first queue of [`SearchCandidate`]s.
pub(super) trait CandidateQueue<D> {
    fn push(&mut self, candidate: SearchCandidate<D>);

    fn pop(&mut self) -> Option<SearchCandidate<D>>;

    fn len(&self) -> usize;
}

/// Reverses the candidate order so [`BinaryHeap`] pops the smallest bound.
#[derive(Debug)]
struct ReverseCandidate<D>(SearchCandidate<D>);

impl<D: DistanceValue> PartialEq for ReverseCandidate<D> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<D: DistanceValue> Eq for ReverseCandidate<D> {}

impl<D: DistanceValue> PartialOrd for ReverseCandidate<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<D: DistanceValue> Ord for ReverseCandidate<D> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .lower_bound
            .compare(&self.0.lower_bound)
            .then_with(|| other.0.node.cmp(&self.0.node))
    }
}

/// Candidate queue backed by [`BinaryHeap`].
#[derive(Debug)]
pub(super) struct BinaryCandidateQueue<D> {
    heap: BinaryHeap<ReverseCandidate<D>>,
}

impl<D: DistanceValue> Default for BinaryCandidateQueue<D> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }
}

impl<D: DistanceValue> CandidateQueue<D> for BinaryCandidateQueue<D> {
    fn push(&mut self, candidate: SearchCandidate<D>) {
        self.heap.push(ReverseCandidate(candidate));
    }

    fn pop(&mut self) -> Option<SearchCandidate<D>> {
        self.heap.pop().map(|ReverseCandidate(candidate)| candidate)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

/// Candidate queue backed by [`UpdatableHeap`], keyed by node handle.
pub(super) type UpdatableCandidateQueue<D> = UpdatableHeap<NodeRef, Option<ParentRouting<D>>, D>;

impl<D: DistanceValue> CandidateQueue<D> for UpdatableCandidateQueue<D> {
    fn push(&mut self, candidate: SearchCandidate<D>) {
        self.push_or_decrease(candidate.node, candidate.lower_bound, candidate.parent);
    }

    fn pop(&mut self) -> Option<SearchCandidate<D>> {
        UpdatableHeap::pop(self).map(|(node, lower_bound, parent)| SearchCandidate {
            lower_bound,
            node,
            parent,
        })
    }

    fn len(&self) -> usize {
        UpdatableHeap::len(self)
    }
}
