//! Read-only view of a pre-built metric tree and of the metric space its
//! objects live in.
//!
//! The query engine owns neither. Nodes are addressed through opaque
//! [`NodeRef`] handles and resolved on demand, so the storage layer behind a
//! [`MetricIndex`] may be an arena, a page cache or anything else that can
//! hand out a borrowed [`Node`].

mod arena;
mod node;

pub use self::{
    arena::{ArenaTree, ArenaTreeBuilder},
    node::{LeafEntry, Node, NodeRef, ObjectId, RoutingEntry},
};

use crate::{distance::DistanceValue, error::SpaceError};

/// Hierarchical index whose entries carry routing objects and covering radii.
///
/// # Examples
/// ```
/// use ramoso_core::{ArenaTreeBuilder, LeafEntry, MetricIndex, Node, ObjectId};
///
/// let mut builder = ArenaTreeBuilder::<u32>::new("tiny");
/// let leaf = builder.push_leaf(vec![LeafEntry::new(ObjectId::new(0))]);
/// let tree = builder.build(leaf)?;
///
/// assert_eq!(tree.name(), "tiny");
/// assert!(matches!(tree.node(tree.root()), Some(Node::Leaf(_))));
/// # Ok::<(), ramoso_core::TreeError>(())
/// ```
pub trait MetricIndex {
    /// Distance type stored in covering radii and parent distances.
    type Distance: DistanceValue;

    /// Returns a human-readable name.
    fn name(&self) -> &str;

    /// Returns the handle of the root node.
    fn root(&self) -> NodeRef;

    /// Resolves a handle to its node, or `None` when the handle is unknown.
    fn node(&self, node: NodeRef) -> Option<&Node<Self::Distance>>;
}

/// Distance oracle for the objects referenced by a [`MetricIndex`].
///
/// Implementations must be metrics (symmetric, satisfying the triangle
/// inequality); pruning soundness depends on it.
///
/// # Examples
/// ```
/// use ramoso_core::{MetricSpace, ObjectId, SpaceError};
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
/// let line = Line(vec![0, 4, 9]);
/// assert_eq!(line.distance(ObjectId::new(0), ObjectId::new(2))?, 9);
/// assert_eq!(line.distance_to(&5, ObjectId::new(1))?, 1);
/// # Ok::<(), SpaceError>(())
/// ```
pub trait MetricSpace {
    /// Representation of a query object.
    type Object;

    /// Distance type produced by the oracle.
    type Distance: DistanceValue;

    /// Computes the distance between two stored objects.
    ///
    /// # Errors
    /// Returns [`SpaceError`] when either identifier cannot be evaluated.
    fn distance(&self, left: ObjectId, right: ObjectId) -> Result<Self::Distance, SpaceError>;

    /// Computes the distance between a live query object and a stored one.
    ///
    /// # Errors
    /// Returns [`SpaceError`] when `id` cannot be evaluated against `query`.
    fn distance_to(&self, query: &Self::Object, id: ObjectId)
    -> Result<Self::Distance, SpaceError>;

    /// Maps a stored identifier to a query object.
    ///
    /// # Errors
    /// Returns [`SpaceError::UnknownObject`] when `id` is not stored.
    fn resolve(&self, id: ObjectId) -> Result<Self::Object, SpaceError>;
}
