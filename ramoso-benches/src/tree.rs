//! Lays a synthetic space out as a metric tree for the query benchmarks.
//!
//! Points are split recursively into `fanout` slabs along one axis per level,
//! cycling through the axes. The middle point of each slab routes it, its
//! covering radius is exact, and every entry caches the distance to its
//! routing object so both pruning stages have something to work with.

use ramoso_core::{
    ArenaTree, ArenaTreeBuilder, DistanceValue, LeafEntry, MetricSpace, NodeRef, ObjectId,
    RoutingEntry,
};

use crate::{error::BenchSetupError, source::SyntheticSpace};

/// Packs every point of `space` into a tree with at most `fanout` entries
/// per node.
///
/// # Errors
/// Returns [`BenchSetupError::InvalidFanout`] when `fanout < 2`, and
/// propagates distance or assembly failures.
pub fn pack_tree(
    name: &str,
    space: &SyntheticSpace,
    fanout: usize,
) -> Result<ArenaTree<f64>, BenchSetupError> {
    if fanout < 2 {
        return Err(BenchSetupError::InvalidFanout { fanout });
    }
    let mut builder = ArenaTreeBuilder::new(name);
    let packer = Packer { space, fanout };
    let root = packer.pack(&mut builder, &space.ids(), None, 0)?;
    Ok(builder.build(root)?)
}

struct Packer<'a> {
    space: &'a SyntheticSpace,
    fanout: usize,
}

impl Packer<'_> {
    fn pack(
        &self,
        builder: &mut ArenaTreeBuilder<f64>,
        ids: &[ObjectId],
        parent: Option<ObjectId>,
        depth: usize,
    ) -> Result<NodeRef, BenchSetupError> {
        if ids.len() <= self.fanout {
            let entries = ids
                .iter()
                .map(|&id| {
                    let entry = LeafEntry::new(id);
                    Ok(match parent {
                        Some(routing) => entry.with_parent_distance(self.space.distance(id, routing)?),
                        None => entry,
                    })
                })
                .collect::<Result<_, BenchSetupError>>()?;
            return Ok(builder.push_leaf(entries));
        }

        let sorted = self.sorted_along(ids, depth)?;
        let slab = sorted.len().div_ceil(self.fanout);
        let mut entries = Vec::with_capacity(self.fanout);
        for chunk in sorted.chunks(slab) {
            let Some(&routing) = chunk.get(chunk.len().checked_div(2).unwrap_or(0)) else {
                continue;
            };
            let mut radius = f64::identity();
            for &member in chunk {
                radius = radius.max_with(&self.space.distance(routing, member)?);
            }
            let child = self.pack(builder, chunk, Some(routing), depth.saturating_add(1))?;
            let entry = RoutingEntry::new(routing, radius, child);
            entries.push(match parent {
                Some(above) => entry.with_parent_distance(self.space.distance(routing, above)?),
                None => entry,
            });
        }
        Ok(builder.push_directory(entries))
    }

    fn sorted_along(&self, ids: &[ObjectId], depth: usize) -> Result<Vec<ObjectId>, BenchSetupError> {
        let axis = depth.checked_rem(self.space.dimensions()).unwrap_or(0);
        let mut keyed = ids
            .iter()
            .map(|&id| Ok((self.space.coordinate(id, axis)?, id)))
            .collect::<Result<Vec<_>, BenchSetupError>>()?;
        keyed.sort_by(|left, right| left.0.total_cmp(&right.0).then(left.1.cmp(&right.1)));
        Ok(keyed.into_iter().map(|(_, id)| id).collect())
    }
}
