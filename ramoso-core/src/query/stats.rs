//! Per-query traversal counters.

/// Work performed by a single traversal.
///
/// Counters only describe cost; two traversals with different counters may
/// still return the same result.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TraversalStats {
    pub(super) distance_computations: usize,
    pub(super) nodes_expanded: usize,
    pub(super) candidates_queued: usize,
    pub(super) peak_queue_len: usize,
    pub(super) pruned_by_parent: usize,
    pub(super) pruned_by_radius: usize,
}

impl TraversalStats {
    /// Returns the number of distance evaluations against the query.
    #[rustfmt::skip]
    #[must_use]
    pub const fn distance_computations(&self) -> usize { self.distance_computations }

    /// Returns the number of nodes resolved and scanned.
    #[rustfmt::skip]
    #[must_use]
    pub const fn nodes_expanded(&self) -> usize { self.nodes_expanded }

    /// Returns the number of subtree candidates pushed onto the queue.
    #[rustfmt::skip]
    #[must_use]
    pub const fn candidates_queued(&self) -> usize { self.candidates_queued }

    /// Returns the largest number of candidates waiting at any one time,
    /// counting the root.
    #[rustfmt::skip]
    #[must_use]
    pub const fn peak_queue_len(&self) -> usize { self.peak_queue_len }

    /// Returns the number of entries discarded by the parent-distance bound
    /// without evaluating their distance.
    #[rustfmt::skip]
    #[must_use]
    pub const fn pruned_by_parent(&self) -> usize { self.pruned_by_parent }

    /// Returns the number of directory entries discarded after evaluating
    /// their distance, because their covering ball lies beyond the threshold.
    #[rustfmt::skip]
    #[must_use]
    pub const fn pruned_by_radius(&self) -> usize { self.pruned_by_radius }
}
