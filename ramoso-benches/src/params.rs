//! Benchmark parameter types.
//!
//! Groups related benchmark parameters into structs so that benchmark
//! helper functions stay under the Clippy `too-many-arguments` threshold.

use std::fmt;

use ramoso_core::KnnQueryParams;

/// Parameters for a kNN query benchmark run.
#[derive(Clone, Copy, Debug)]
pub struct KnnBenchParams {
    /// Number of points in the indexed dataset.
    pub point_count: usize,
    /// Requested neighbour count.
    pub k: usize,
    /// Maximum entries per tree node.
    pub fanout: usize,
}

impl fmt::Display for KnnBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},k={},fanout={}", self.point_count, self.k, self.fanout)
    }
}

/// Benchmark label for a traversal configuration.
#[derive(Clone, Copy, Debug)]
pub struct TraversalLabel(pub KnnQueryParams);

impl fmt::Display for TraversalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pruning = if self.0.parent_pruning() {
            "parent"
        } else {
            "radius"
        };
        write!(f, "{pruning}/{}", self.0.queue().as_str())
    }
}
