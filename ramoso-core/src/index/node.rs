//! Node and entry representation of a metric tree.

use core::fmt;

/// Opaque identifier of an indexed object.
///
/// Identifiers are ordered only so that results can break distance ties
/// deterministically; the engine attaches no other meaning to the order.
///
/// # Examples
/// ```
/// use ramoso_core::ObjectId;
///
/// let id = ObjectId::new(42);
/// assert_eq!(id.get(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Creates a new object identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Handle of a node held by an external store.
///
/// The engine copies handles around freely; it never owns or frees the node
/// behind one.
///
/// # Examples
/// ```
/// use ramoso_core::NodeRef;
///
/// let node = NodeRef::new(3);
/// assert_eq!(node.index(), 3);
/// assert_eq!(node.to_string(), "#3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(usize);

impl NodeRef {
    /// Creates a handle from a store index.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(index: usize) -> Self { Self(index) }

    /// Returns the store index behind the handle.
    #[rustfmt::skip]
    #[must_use]
    pub const fn index(self) -> usize { self.0 }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Directory entry: a routing object, the radius covering its subtree, and
/// the subtree itself.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutingEntry<D> {
    routing_object: ObjectId,
    covering_radius: D,
    parent_distance: Option<D>,
    child: NodeRef,
}

impl<D> RoutingEntry<D> {
    /// Creates a directory entry without a cached parent distance.
    #[must_use]
    pub const fn new(routing_object: ObjectId, covering_radius: D, child: NodeRef) -> Self {
        Self {
            routing_object,
            covering_radius,
            parent_distance: None,
            child,
        }
    }

    /// Records the distance between this routing object and the routing
    /// object of the enclosing directory entry.
    #[must_use]
    pub fn with_parent_distance(mut self, distance: D) -> Self {
        self.parent_distance = Some(distance);
        self
    }

    /// Returns the routing object.
    #[rustfmt::skip]
    #[must_use]
    pub const fn routing_object(&self) -> ObjectId { self.routing_object }

    /// Returns the covering radius.
    #[rustfmt::skip]
    #[must_use]
    pub const fn covering_radius(&self) -> &D { &self.covering_radius }

    /// Returns the cached distance to the parent routing object, if any.
    #[rustfmt::skip]
    #[must_use]
    pub const fn parent_distance(&self) -> Option<&D> { self.parent_distance.as_ref() }

    /// Returns the subtree handle.
    #[rustfmt::skip]
    #[must_use]
    pub const fn child(&self) -> NodeRef { self.child }
}

/// Leaf entry: an indexed object. Its covering radius is the identity
/// distance.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafEntry<D> {
    object: ObjectId,
    parent_distance: Option<D>,
}

impl<D> LeafEntry<D> {
    /// Creates a leaf entry without a cached parent distance.
    #[must_use]
    pub const fn new(object: ObjectId) -> Self {
        Self {
            object,
            parent_distance: None,
        }
    }

    /// Records the distance between this object and the routing object of the
    /// enclosing directory entry.
    #[must_use]
    pub fn with_parent_distance(mut self, distance: D) -> Self {
        self.parent_distance = Some(distance);
        self
    }

    /// Returns the indexed object.
    #[rustfmt::skip]
    #[must_use]
    pub const fn object(&self) -> ObjectId { self.object }

    /// Returns the cached distance to the parent routing object, if any.
    #[rustfmt::skip]
    #[must_use]
    pub const fn parent_distance(&self) -> Option<&D> { self.parent_distance.as_ref() }
}

/// A metric-tree node.
///
/// # Examples
/// ```
/// use ramoso_core::{LeafEntry, Node, ObjectId};
///
/// let node = Node::<f64>::Leaf(vec![LeafEntry::new(ObjectId::new(1))]);
/// assert!(node.is_leaf());
/// assert_eq!(node.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Node<D> {
    /// Node holding indexed objects.
    Leaf(Vec<LeafEntry<D>>),
    /// Node holding routing entries to subtrees.
    Directory(Vec<RoutingEntry<D>>),
}

impl<D> Node<D> {
    /// Returns `true` for leaf nodes.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Leaf(entries) => entries.len(),
            Self::Directory(entries) => entries.len(),
        }
    }

    /// Returns `true` when the node holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
