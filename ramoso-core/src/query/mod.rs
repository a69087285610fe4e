//! kNN queries over a read-only metric tree.
//!
//! [`KnnQuery`] pairs a [`MetricIndex`] with the [`MetricSpace`] its objects
//! live in and answers k-nearest-neighbour requests by branch-and-bound
//! traversal. Each call allocates its own candidate queue and accumulator, so
//! one `KnnQuery` can serve concurrent callers as long as the tree is not
//! mutated underneath it.

mod candidate;
mod params;
mod search;
mod stats;

#[cfg(test)]
mod tests;

use std::num::NonZeroUsize;

use tracing::{debug, instrument, warn};

use crate::{
    distance::DistanceValue,
    error::{KnnError, Result},
    index::{MetricIndex, MetricSpace, ObjectId},
    knn::{KnnHeap, KnnList, KnnResult},
};

pub use self::{
    params::{CandidateQueueKind, KnnQueryParams},
    stats::TraversalStats,
};

use self::{
    candidate::{BinaryCandidateQueue, UpdatableCandidateQueue},
    search::Traversal,
};

/// Entry point for kNN queries against one index.
///
/// # Examples
/// ```
/// use ramoso_core::{
///     ArenaTreeBuilder, KnnQuery, KnnResult, LeafEntry, MetricSpace, ObjectId,
///     RoutingEntry, SpaceError,
/// };
///
/// struct Line(Vec<i64>);
///
/// impl MetricSpace for Line {
///     type Object = i64;
///     type Distance = u64;
///
///     fn distance(&self, left: ObjectId, right: ObjectId) -> Result<u64, SpaceError> {
///         let left = self.resolve(left)?;
///         self.distance_to(&left, right)
///     }
///
///     fn distance_to(&self, query: &i64, id: ObjectId) -> Result<u64, SpaceError> {
///         Ok(query.abs_diff(self.resolve(id)?))
///     }
///
///     fn resolve(&self, id: ObjectId) -> Result<i64, SpaceError> {
///         usize::try_from(id.get())
///             .ok()
///             .and_then(|index| self.0.get(index).copied())
///             .ok_or(SpaceError::UnknownObject { id })
///     }
/// }
///
/// let line = Line(vec![0, 2, 20, 23]);
/// let mut builder = ArenaTreeBuilder::new("line");
/// let near = builder.push_leaf(vec![
///     LeafEntry::new(ObjectId::new(0)),
///     LeafEntry::new(ObjectId::new(1)),
/// ]);
/// let far = builder.push_leaf(vec![
///     LeafEntry::new(ObjectId::new(2)),
///     LeafEntry::new(ObjectId::new(3)),
/// ]);
/// let root = builder.push_directory(vec![
///     RoutingEntry::new(ObjectId::new(0), 2, near),
///     RoutingEntry::new(ObjectId::new(2), 3, far),
/// ]);
/// let tree = builder.build(root)?;
///
/// let query = KnnQuery::new(&tree, &line);
/// let result = query.knn(&1, 2)?;
/// assert_eq!(result.distances().iter().copied().collect::<Vec<_>>(), vec![1, 1]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct KnnQuery<'a, I, S> {
    index: &'a I,
    space: &'a S,
    params: KnnQueryParams,
}

impl<I, S> Clone for KnnQuery<'_, I, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I, S> Copy for KnnQuery<'_, I, S> {}

impl<'a, I, S, D> KnnQuery<'a, I, S>
where
    I: MetricIndex<Distance = D>,
    S: MetricSpace<Distance = D>,
    D: DistanceValue,
{
    /// Creates a query handle with [`KnnQueryParams::default`].
    #[must_use]
    pub fn new(index: &'a I, space: &'a S) -> Self {
        Self {
            index,
            space,
            params: KnnQueryParams::default(),
        }
    }

    /// Replaces the tuning parameters.
    #[must_use]
    pub fn with_params(mut self, params: KnnQueryParams) -> Self {
        self.params = params;
        self
    }

    /// Returns the tuning parameters.
    #[rustfmt::skip]
    #[must_use]
    pub fn params(&self) -> KnnQueryParams { self.params }

    /// Finds the `k` objects nearest to a live query object.
    ///
    /// The result is sorted ascending by distance, ties by identifier. It
    /// holds fewer than `k` entries only when the index does, and more than
    /// `k` when several objects share the `k`-th distance.
    ///
    /// # Errors
    /// - [`KnnError::InvalidK`] when `k == 0`; nothing is traversed.
    /// - [`KnnError::MissingNode`] when a reachable handle does not resolve.
    /// - [`KnnError::InvalidDistance`] when the space yields an unorderable
    ///   distance.
    /// - [`KnnError::Space`] when the space fails to evaluate a distance.
    #[instrument(
        name = "knn.for_object",
        err,
        skip(self, query),
        fields(
            index = %self.index.name(),
            parent_pruning = self.params.parent_pruning(),
            queue = self.params.queue().as_str(),
        ),
    )]
    pub fn knn(&self, query: &S::Object, k: usize) -> Result<KnnList<D>> {
        self.knn_with_stats(query, k).map(|(list, _)| list)
    }

    /// Finds the `k` objects nearest to a stored object.
    ///
    /// The object itself is part of the index and therefore part of the
    /// answer, at the identity distance.
    ///
    /// # Errors
    /// As [`KnnQuery::knn`], plus [`KnnError::Space`] when `id` cannot be
    /// resolved.
    #[instrument(
        name = "knn.for_id",
        err,
        skip(self, id),
        fields(index = %self.index.name(), id = %id),
    )]
    pub fn knn_for_id(&self, id: ObjectId, k: usize) -> Result<KnnList<D>> {
        self.knn_for_id_with_stats(id, k).map(|(list, _)| list)
    }

    /// As [`KnnQuery::knn_for_id`], also reporting how much work the
    /// traversal did.
    ///
    /// `k` is validated before `id` is resolved.
    ///
    /// # Errors
    /// As [`KnnQuery::knn_for_id`].
    pub fn knn_for_id_with_stats(
        &self,
        id: ObjectId,
        k: usize,
    ) -> Result<(KnnList<D>, TraversalStats)> {
        let k = checked_k(k)?;
        let object = self.space.resolve(id)?;
        self.collect(&object, k)
    }

    /// Declared bulk variant of [`KnnQuery::knn_for_id`].
    ///
    /// # Errors
    /// Always returns [`KnnError::Unsupported`]; looping over
    /// [`KnnQuery::knn_for_id`] is the caller's decision to make.
    pub fn knn_bulk(&self, ids: &[ObjectId], k: usize) -> Result<Vec<KnnList<D>>> {
        warn!(
            index = self.index.name(),
            ids = ids.len(),
            k,
            "bulk kNN requested"
        );
        Err(KnnError::Unsupported {
            operation: "bulk kNN",
        })
    }

    /// Runs the traversal into a caller-owned accumulator.
    ///
    /// The accumulator may already hold results, in which case its threshold
    /// prunes from the start. This is the building block for queries that
    /// merge several traversals into one answer.
    ///
    /// # Errors
    /// As [`KnnQuery::knn`] except for [`KnnError::InvalidK`], which the
    /// accumulator rules out by construction. On error `heap` is left as it
    /// was before the call.
    #[instrument(
        name = "knn.into_heap",
        err,
        skip(self, query, heap),
        fields(index = %self.index.name(), k = heap.k()),
    )]
    pub fn knn_into(&self, query: &S::Object, heap: &mut KnnHeap<D>) -> Result<TraversalStats> {
        let mut staged = heap.clone();
        let stats = self.traverse(query, &mut staged)?;
        *heap = staged;
        Ok(stats)
    }

    /// As [`KnnQuery::knn`], also reporting how much work the traversal did.
    ///
    /// # Errors
    /// As [`KnnQuery::knn`].
    pub fn knn_with_stats(
        &self,
        query: &S::Object,
        k: usize,
    ) -> Result<(KnnList<D>, TraversalStats)> {
        let k = checked_k(k)?;
        self.collect(query, k)
    }

    fn collect(&self, query: &S::Object, k: NonZeroUsize) -> Result<(KnnList<D>, TraversalStats)> {
        let mut heap = KnnHeap::new(k);
        let stats = self.traverse(query, &mut heap)?;
        let list = heap.finalise();
        debug!(
            results = list.as_slice().len(),
            distance_computations = stats.distance_computations(),
            nodes_expanded = stats.nodes_expanded(),
            pruned_by_parent = stats.pruned_by_parent(),
            pruned_by_radius = stats.pruned_by_radius(),
            "knn query completed"
        );
        Ok((list, stats))
    }

    fn traverse(&self, query: &S::Object, heap: &mut KnnHeap<D>) -> Result<TraversalStats> {
        let traversal = Traversal::new(self.index, self.space, query, self.params);
        let stats = match self.params.queue() {
            CandidateQueueKind::BinaryHeap => {
                traversal.run(BinaryCandidateQueue::default(), heap)?
            }
            CandidateQueueKind::Updatable => {
                traversal.run(UpdatableCandidateQueue::new(), heap)?
            }
        };
        record_query(&stats);
        Ok(stats)
    }
}

fn checked_k(k: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(k).ok_or_else(|| {
        warn!(k, "rejecting kNN request for zero neighbours");
        KnnError::InvalidK { got: k }
    })
}

#[cfg(feature = "metrics")]
fn record_query(stats: &TraversalStats) {
    metrics::counter!("knn_queries").increment(1);
    metrics::counter!("knn_distance_computations")
        .increment(stats.distance_computations() as u64);
    metrics::counter!("knn_entries_pruned_parent").increment(stats.pruned_by_parent() as u64);
    metrics::counter!("knn_entries_pruned_radius").increment(stats.pruned_by_radius() as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_query(_stats: &TraversalStats) {}
