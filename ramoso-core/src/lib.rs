//! Ramoso core library.
//!
//! k-nearest-neighbour search over pre-built metric trees. The crate provides
//! the branch-and-bound query engine ([`KnnQuery`]), the bounded top-k
//! accumulator it feeds ([`KnnHeap`]), the frozen result ([`KnnList`]) with
//! its borrowed views, and the collaborator traits a tree and its metric must
//! implement ([`MetricIndex`], [`MetricSpace`]). Distances are generic over
//! [`DistanceValue`].
#![cfg_attr(docsrs, feature(doc_cfg))]

mod distance;
mod error;
mod index;
mod knn;
mod query;
mod updatable_heap;

#[cfg(test)]
mod test_utils;

pub use crate::{
    distance::{DistanceValue, Threshold},
    error::{
        KnnError, KnnErrorCode, Result, SpaceError, SpaceErrorCode, TreeError, TreeErrorCode,
    },
    index::{
        ArenaTree, ArenaTreeBuilder, LeafEntry, MetricIndex, MetricSpace, Node, NodeRef,
        ObjectId, RoutingEntry,
    },
    knn::{
        DistanceIter, DistancePair, DistanceView, IdIter, IdView, KnnHeap, KnnList, KnnResult,
        KnnSubList,
    },
    query::{CandidateQueueKind, KnnQuery, KnnQueryParams, TraversalStats},
    updatable_heap::UpdatableHeap,
};
