//! Result accumulation and result views for kNN queries.
//!
//! A query feeds candidate pairs into a [`KnnHeap`], which is frozen into an
//! immutable [`KnnList`] once the traversal ends. Views over a list
//! ([`DistanceView`], [`IdView`], [`KnnSubList`]) borrow its entries.

mod heap;
mod list;
mod pair;
mod views;

pub use self::{
    heap::KnnHeap,
    list::{KnnList, KnnResult},
    pair::DistancePair,
    views::{DistanceIter, DistanceView, IdIter, IdView, KnnSubList},
};
