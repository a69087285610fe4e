//! In-memory, read-only metric tree addressed by arena indices.
//!
//! The builder only assembles nodes that were already laid out by some
//! construction procedure; it performs no insertion or splitting. `build`
//! checks the structural invariants the query engine relies on.

use tracing::debug;

use crate::{distance::DistanceValue, error::TreeError};

use super::{LeafEntry, MetricIndex, Node, NodeRef, RoutingEntry};

/// Arena-backed metric tree.
#[derive(Clone, Debug)]
pub struct ArenaTree<D> {
    name: String,
    nodes: Vec<Node<D>>,
    root: NodeRef,
    objects: usize,
}

impl<D> ArenaTree<D> {
    /// Returns the number of nodes stored in the arena.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of leaf entries stored in the arena.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects
    }
}

impl<D: DistanceValue> MetricIndex for ArenaTree<D> {
    type Distance = D;

    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> NodeRef {
        self.root
    }

    fn node(&self, node: NodeRef) -> Option<&Node<D>> {
        self.nodes.get(node.index())
    }
}

/// Assembles an [`ArenaTree`] bottom-up.
///
/// # Examples
/// ```
/// use ramoso_core::{ArenaTreeBuilder, LeafEntry, ObjectId, RoutingEntry};
///
/// let mut builder = ArenaTreeBuilder::new("pair");
/// let left = builder.push_leaf(vec![LeafEntry::new(ObjectId::new(0))]);
/// let right = builder.push_leaf(vec![LeafEntry::new(ObjectId::new(1))]);
/// let root = builder.push_directory(vec![
///     RoutingEntry::new(ObjectId::new(0), 0_u32, left),
///     RoutingEntry::new(ObjectId::new(1), 0_u32, right),
/// ]);
/// let tree = builder.build(root)?;
/// assert_eq!(tree.node_count(), 3);
/// assert_eq!(tree.object_count(), 2);
/// # Ok::<(), ramoso_core::TreeError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ArenaTreeBuilder<D> {
    name: String,
    nodes: Vec<Node<D>>,
}

impl<D> ArenaTreeBuilder<D> {
    /// Creates an empty builder for a tree called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    /// Stores a leaf node and returns its handle.
    pub fn push_leaf(&mut self, entries: Vec<LeafEntry<D>>) -> NodeRef {
        self.push(Node::Leaf(entries))
    }

    /// Stores a directory node and returns its handle.
    pub fn push_directory(&mut self, entries: Vec<RoutingEntry<D>>) -> NodeRef {
        self.push(Node::Directory(entries))
    }

    fn push(&mut self, node: Node<D>) -> NodeRef {
        let handle = NodeRef::new(self.nodes.len());
        self.nodes.push(node);
        handle
    }

    /// Validates the assembled nodes and freezes them into a tree.
    ///
    /// Nodes unreachable from `root` are kept in the arena but never visited.
    ///
    /// # Errors
    /// - [`TreeError::UnknownRoot`] when `root` was never pushed.
    /// - [`TreeError::EmptyNode`] when a node has no entries.
    /// - [`TreeError::DanglingChild`] when a directory entry references a
    ///   handle that was never pushed.
    /// - [`TreeError::SharedChild`] when a node has more than one parent,
    ///   which would also admit cycles.
    pub fn build(self, root: NodeRef) -> Result<ArenaTree<D>, TreeError> {
        if root.index() >= self.nodes.len() {
            return Err(TreeError::UnknownRoot { root });
        }

        let mut referenced = vec![false; self.nodes.len()];
        if let Some(slot) = referenced.get_mut(root.index()) {
            *slot = true;
        }
        let mut objects = 0;
        for (index, node) in self.nodes.iter().enumerate() {
            let handle = NodeRef::new(index);
            match node {
                Node::Leaf(entries) if entries.is_empty() => {
                    return Err(TreeError::EmptyNode { node: handle });
                }
                Node::Directory(entries) if entries.is_empty() => {
                    return Err(TreeError::EmptyNode { node: handle });
                }
                Node::Leaf(entries) => objects += entries.len(),
                Node::Directory(entries) => {
                    for entry in entries {
                        let child = entry.child();
                        let Some(seen) = referenced.get_mut(child.index()) else {
                            return Err(TreeError::DanglingChild {
                                parent: handle,
                                child,
                            });
                        };
                        if *seen {
                            return Err(TreeError::SharedChild { child });
                        }
                        *seen = true;
                    }
                }
            }
        }

        debug!(
            tree = self.name.as_str(),
            nodes = self.nodes.len(),
            objects,
            "arena tree assembled"
        );
        Ok(ArenaTree {
            name: self.name,
            nodes: self.nodes,
            root,
            objects,
        })
    }
}
