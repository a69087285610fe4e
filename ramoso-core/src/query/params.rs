//! Query configuration.

/// Candidate-queue strategy used by the traversal.
///
/// Both strategies visit candidates in ascending lower-bound order and return
/// identical results; they differ only in how a node reached more than once
/// is queued.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CandidateQueueKind {
    /// Plain binary heap; duplicate pushes are kept as separate candidates.
    #[default]
    BinaryHeap,
    /// Decrease-key heap keyed by node handle; only the tightest bound per
    /// node is kept.
    Updatable,
}

impl CandidateQueueKind {
    /// Returns the lowercase name used in logs and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BinaryHeap => "binary",
            Self::Updatable => "updatable",
        }
    }
}

/// Tuning knobs for a [`crate::KnnQuery`].
///
/// None of them changes the answer; they only trade distance evaluations
/// against bookkeeping.
///
/// # Examples
/// ```
/// use ramoso_core::{CandidateQueueKind, KnnQueryParams};
///
/// let params = KnnQueryParams::new()
///     .with_parent_pruning(false)
///     .with_queue(CandidateQueueKind::Updatable);
/// assert!(!params.parent_pruning());
/// assert_eq!(params.queue(), CandidateQueueKind::Updatable);
/// assert!(KnnQueryParams::default().parent_pruning());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KnnQueryParams {
    parent_pruning: bool,
    queue: CandidateQueueKind,
}

impl KnnQueryParams {
    /// Creates the default configuration: parent pruning on, binary heap.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            parent_pruning: true,
            queue: CandidateQueueKind::BinaryHeap,
        }
    }

    /// Enables or disables the parent-distance shortcut.
    ///
    /// When enabled, entries whose cached distance to the enclosing routing
    /// object proves them out of reach are skipped without a distance
    /// evaluation.
    #[must_use]
    pub const fn with_parent_pruning(mut self, enabled: bool) -> Self {
        self.parent_pruning = enabled;
        self
    }

    /// Selects the candidate-queue strategy.
    #[must_use]
    pub const fn with_queue(mut self, queue: CandidateQueueKind) -> Self {
        self.queue = queue;
        self
    }

    /// Returns whether the parent-distance shortcut is applied.
    #[rustfmt::skip]
    #[must_use]
    pub const fn parent_pruning(&self) -> bool { self.parent_pruning }

    /// Returns the candidate-queue strategy.
    #[rustfmt::skip]
    #[must_use]
    pub const fn queue(&self) -> CandidateQueueKind { self.queue }
}

impl Default for KnnQueryParams {
    fn default() -> Self {
        Self::new()
    }
}
