//! JSON documents describing a pre-built metric tree.
//!
//! ```json
//! {
//!   "name": "demo",
//!   "objects": { "0": [0.0, 0.0], "1": [3.0, 4.0] },
//!   "nodes": [
//!     { "kind": "leaf", "entries": [{ "object": 0 }, { "object": 1 }] }
//!   ],
//!   "root": 0
//! }
//! ```
//!
//! Nodes are addressed by their position in `nodes`. Directory entries carry
//! `object`, `radius` and `child`; any entry may carry `parent_distance`, the
//! precomputed distance to the routing object of its enclosing entry.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ramoso_core::{
    ArenaTree, ArenaTreeBuilder, DistanceValue, LeafEntry, NodeRef, ObjectId, RoutingEntry,
    TreeError,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{Span, debug, field, instrument};

use super::space::EuclideanSpace;

/// Errors raised while turning a tree document into a searchable tree.
#[derive(Debug, Error)]
pub enum TreeFileError {
    /// The document is not valid JSON or does not match the schema.
    #[error("malformed tree document: {0}")]
    Malformed(#[from] serde_json::Error),
    /// An entry refers to an object missing from `objects`.
    #[error("node {node} references unknown object {object}")]
    UnknownObject {
        /// Node holding the entry.
        node: NodeRef,
        /// The identifier that is not in `objects`.
        object: ObjectId,
    },
    /// A stored radius or parent distance is negative or NaN.
    #[error("node {node} stores an invalid distance for object {object}")]
    InvalidDistance {
        /// Node holding the entry.
        node: NodeRef,
        /// Object of the offending entry.
        object: ObjectId,
    },
    /// The nodes do not form a valid tree.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TreeDocument {
    #[serde(default)]
    name: Option<String>,
    objects: BTreeMap<u64, Vec<f64>>,
    nodes: Vec<NodeDocument>,
    root: usize,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", content = "entries", rename_all = "lowercase")]
enum NodeDocument {
    Leaf(Vec<LeafDocument>),
    Directory(Vec<RoutingDocument>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LeafDocument {
    object: u64,
    #[serde(default)]
    parent_distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RoutingDocument {
    object: u64,
    radius: f64,
    child: usize,
    #[serde(default)]
    parent_distance: Option<f64>,
}

/// A tree together with the space its objects live in.
#[derive(Clone, Debug)]
pub struct LoadedTree {
    /// The searchable tree.
    pub tree: ArenaTree<f64>,
    /// Coordinates of every object the tree references.
    pub space: EuclideanSpace,
}

/// Parses a tree document from `reader`.
///
/// `fallback_name` names the tree when the document does not.
///
/// # Errors
/// Returns [`TreeFileError`] when the document is malformed, references
/// unknown objects, stores invalid distances, or does not form a tree.
#[instrument(
    name = "cli.load_tree",
    err,
    skip(reader),
    fields(nodes = field::Empty, objects = field::Empty),
)]
pub fn load_tree(reader: impl Read, fallback_name: &str) -> Result<LoadedTree, TreeFileError> {
    let document: TreeDocument = serde_json::from_reader(reader)?;
    let span = Span::current();
    span.record("nodes", document.nodes.len());
    span.record("objects", document.objects.len());

    let space = EuclideanSpace::new(
        document
            .objects
            .into_iter()
            .map(|(id, coordinates)| (ObjectId::new(id), coordinates))
            .collect(),
    );
    let mut builder = ArenaTreeBuilder::new(document.name.as_deref().unwrap_or(fallback_name));
    for (index, node) in document.nodes.into_iter().enumerate() {
        let handle = NodeRef::new(index);
        match node {
            NodeDocument::Leaf(entries) => {
                let entries = entries
                    .into_iter()
                    .map(|entry| leaf_entry(&space, handle, entry))
                    .collect::<Result<_, _>>()?;
                builder.push_leaf(entries);
            }
            NodeDocument::Directory(entries) => {
                let entries = entries
                    .into_iter()
                    .map(|entry| routing_entry(&space, handle, entry))
                    .collect::<Result<_, _>>()?;
                builder.push_directory(entries);
            }
        }
    }

    let tree = builder.build(NodeRef::new(document.root))?;
    debug!(
        nodes = tree.node_count(),
        objects = tree.object_count(),
        "tree loaded"
    );
    Ok(LoadedTree { tree, space })
}

pub(crate) fn open_tree_file(path: &Path) -> std::io::Result<BufReader<File>> {
    File::open(path).map(BufReader::new)
}

fn leaf_entry(
    space: &EuclideanSpace,
    node: NodeRef,
    entry: LeafDocument,
) -> Result<LeafEntry<f64>, TreeFileError> {
    let object = known_object(space, node, entry.object)?;
    let leaf = LeafEntry::new(object);
    let parent_distance = entry
        .parent_distance
        .map(|distance| checked(node, object, distance))
        .transpose()?;
    Ok(match parent_distance {
        Some(distance) => leaf.with_parent_distance(distance),
        None => leaf,
    })
}

fn routing_entry(
    space: &EuclideanSpace,
    node: NodeRef,
    entry: RoutingDocument,
) -> Result<RoutingEntry<f64>, TreeFileError> {
    let object = known_object(space, node, entry.object)?;
    let radius = checked(node, object, entry.radius)?;
    let routing = RoutingEntry::new(object, radius, NodeRef::new(entry.child));
    let parent_distance = entry
        .parent_distance
        .map(|distance| checked(node, object, distance))
        .transpose()?;
    Ok(match parent_distance {
        Some(distance) => routing.with_parent_distance(distance),
        None => routing,
    })
}

fn known_object(
    space: &EuclideanSpace,
    node: NodeRef,
    raw: u64,
) -> Result<ObjectId, TreeFileError> {
    let object = ObjectId::new(raw);
    if space.contains(object) {
        Ok(object)
    } else {
        Err(TreeFileError::UnknownObject { node, object })
    }
}

fn checked(node: NodeRef, object: ObjectId, distance: f64) -> Result<f64, TreeFileError> {
    if distance.is_valid() {
        Ok(distance)
    } else {
        Err(TreeFileError::InvalidDistance { node, object })
    }
}
