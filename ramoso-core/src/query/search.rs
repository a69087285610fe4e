//! Branch-and-bound traversal over a metric tree.
//!
//! Candidates are expanded in ascending lower-bound order. Every entry of an
//! expanded node passes two filters before it can reach the accumulator:
//!
//! 1. the parent-distance bound `|d(q, p) - d(e, p)| > threshold + r(e)`,
//!    which costs nothing because both distances are already known, and
//! 2. the covering-ball bound `max(d(q, e) - r(e), 0) > threshold`, which
//!    needs one distance evaluation.
//!
//! Both bounds follow from the triangle inequality, so pruning never changes
//! the answer.

use tracing::trace;

use crate::{
    distance::{DistanceValue, Threshold},
    error::{KnnError, Result},
    index::{LeafEntry, MetricIndex, MetricSpace, Node, ObjectId, RoutingEntry},
    knn::KnnHeap,
};

use super::{
    candidate::{CandidateQueue, ParentRouting, SearchCandidate},
    params::KnnQueryParams,
    stats::TraversalStats,
};

/// One traversal of `index` for one live query object.
pub(super) struct Traversal<'q, I, S: MetricSpace> {
    index: &'q I,
    space: &'q S,
    query: &'q S::Object,
    params: KnnQueryParams,
    stats: TraversalStats,
}

impl<'q, I, S, D> Traversal<'q, I, S>
where
    I: MetricIndex<Distance = D>,
    S: MetricSpace<Distance = D>,
    D: DistanceValue,
{
    pub(super) fn new(
        index: &'q I,
        space: &'q S,
        query: &'q S::Object,
        params: KnnQueryParams,
    ) -> Self {
        Self {
            index,
            space,
            query,
            params,
            stats: TraversalStats::default(),
        }
    }

    /// Drives `queue` until it is exhausted or cannot improve `heap`.
    pub(super) fn run<Q: CandidateQueue<D>>(
        mut self,
        mut queue: Q,
        heap: &mut KnnHeap<D>,
    ) -> Result<TraversalStats> {
        let index = self.index;
        queue.push(SearchCandidate::root(index.root()));
        self.stats.peak_queue_len = queue.len();

        while let Some(candidate) = queue.pop() {
            // Candidates leave the queue in bound order, so once one is out of
            // reach every remaining one is too.
            if !heap.threshold().admits(&candidate.lower_bound) {
                break;
            }

            let node = index
                .node(candidate.node)
                .ok_or_else(|| KnnError::MissingNode {
                    index: index.name().to_owned(),
                    node: candidate.node,
                })?;
            self.stats.nodes_expanded += 1;

            let parent = candidate.parent.as_ref();
            match node {
                Node::Directory(entries) => {
                    for entry in entries {
                        self.expand_routing(entry, parent, heap, &mut queue)?;
                    }
                }
                Node::Leaf(entries) => {
                    for entry in entries {
                        self.scan_leaf(entry, parent, heap)?;
                    }
                }
            }
        }
        Ok(self.stats)
    }

    fn expand_routing<Q: CandidateQueue<D>>(
        &mut self,
        entry: &RoutingEntry<D>,
        parent: Option<&ParentRouting<D>>,
        heap: &KnnHeap<D>,
        queue: &mut Q,
    ) -> Result<()> {
        let threshold = heap.threshold();
        let radius = entry.covering_radius();
        if self.pruned_by_parent(&threshold, parent, entry.parent_distance(), radius) {
            return Ok(());
        }

        let object = entry.routing_object();
        let distance = self.distance(object)?;
        let lower_bound = distance.saturating_minus(radius);
        if !threshold.admits(&lower_bound) {
            self.stats.pruned_by_radius += 1;
            return Ok(());
        }

        queue.push(SearchCandidate {
            lower_bound,
            node: entry.child(),
            parent: Some(ParentRouting { object, distance }),
        });
        self.stats.candidates_queued += 1;
        self.stats.peak_queue_len = self.stats.peak_queue_len.max(queue.len());
        Ok(())
    }

    fn scan_leaf(
        &mut self,
        entry: &LeafEntry<D>,
        parent: Option<&ParentRouting<D>>,
        heap: &mut KnnHeap<D>,
    ) -> Result<()> {
        let threshold = heap.threshold();
        if self.pruned_by_parent(&threshold, parent, entry.parent_distance(), &D::identity()) {
            return Ok(());
        }

        let object = entry.object();
        let distance = self.distance(object)?;
        heap.insert(distance, object);
        Ok(())
    }

    /// Applies the parent-distance bound when both distances are known.
    fn pruned_by_parent(
        &mut self,
        threshold: &Threshold<D>,
        parent: Option<&ParentRouting<D>>,
        to_parent: Option<&D>,
        radius: &D,
    ) -> bool {
        if !self.params.parent_pruning() {
            return false;
        }
        let (Some(parent), Some(to_parent)) = (parent, to_parent) else {
            return false;
        };
        let diff = parent.distance.magnitude_diff(to_parent);
        let pruned = !threshold.admits_within(&diff, radius);
        if pruned {
            trace!(parent = %parent.object, "entry pruned by parent distance");
            self.stats.pruned_by_parent += 1;
        }
        pruned
    }

    fn distance(&mut self, object: ObjectId) -> Result<D> {
        let distance = self.space.distance_to(self.query, object)?;
        self.stats.distance_computations += 1;
        if !distance.is_valid() {
            return Err(KnnError::InvalidDistance { object });
        }
        Ok(distance)
    }
}
