//! Benchmark setup error type.
//!
//! Aggregates the errors that may arise while preparing benchmark inputs so
//! that setup functions can propagate failures with `?` instead of using
//! `.expect()`.

use ramoso_core::{KnnError, SpaceError, TreeError};

use crate::source::SyntheticError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic data generation failed.
    #[error("synthetic source generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// A distance evaluation failed while packing the tree.
    #[error("metric space error: {0}")]
    Space(#[from] SpaceError),
    /// The packed nodes did not form a valid tree.
    #[error("tree assembly failed: {0}")]
    Tree(#[from] TreeError),
    /// A kNN query failed outside the measured section.
    #[error("kNN query failed: {0}")]
    Knn(#[from] KnnError),
    /// Nodes must hold at least two entries for the tree to branch.
    #[error("fanout must be at least 2 (got {fanout})")]
    InvalidFanout {
        /// The rejected fanout.
        fanout: usize,
    },
}
