//! Error types for the ramoso core library.
//!
//! Defines the error enums exposed by the query engine, the collaborator
//! traits and the arena tree, each paired with a stable machine-readable code.

use std::fmt;

use thiserror::Error;

use crate::index::{NodeRef, ObjectId};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? $( ( $($tuple:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced by a [`crate::MetricSpace`] while evaluating distances
/// or resolving identifiers.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SpaceError {
    /// The identifier is not known to the space.
    #[error("object {id} is not known to the metric space")]
    UnknownObject {
        /// The identifier that failed to resolve.
        id: ObjectId,
    },
    /// Compared objects had different dimensions.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch {
        /// Dimensionality of the left-hand object.
        left: usize,
        /// Dimensionality of the right-hand object.
        right: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`SpaceError`] variants.
    enum SpaceErrorCode for SpaceError {
        /// The identifier is not known to the space.
        UnknownObject => UnknownObject { .. } => "SPACE_UNKNOWN_OBJECT",
        /// Compared objects had different dimensions.
        DimensionMismatch => DimensionMismatch { .. } => "SPACE_DIMENSION_MISMATCH",
    }
}

/// Error type produced by the kNN query engine.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum KnnError {
    /// At least one neighbour must be requested.
    #[error("at least one object has to be requested (got k={got})")]
    InvalidK {
        /// The invalid neighbour count supplied by the caller.
        got: usize,
    },
    /// The requested operation is declared but not provided.
    #[error("{operation} is not supported")]
    Unsupported {
        /// Human-readable name of the rejected operation.
        operation: &'static str,
    },
    /// A node handle reachable from the root did not resolve.
    #[error("node {node} is missing from index `{index}`")]
    MissingNode {
        /// Name of the index that failed to resolve the handle.
        index: String,
        /// The unresolved handle.
        node: NodeRef,
    },
    /// The metric space produced a distance the engine cannot order.
    #[error("metric space returned an invalid distance for object {object}")]
    InvalidDistance {
        /// Object whose distance evaluation misbehaved.
        object: ObjectId,
    },
    /// A [`crate::MetricSpace`] operation failed during the traversal.
    #[error("metric space failure: {0}")]
    Space(#[from] SpaceError),
}

define_error_codes! {
    /// Stable codes describing [`KnnError`] variants.
    enum KnnErrorCode for KnnError {
        /// At least one neighbour must be requested.
        InvalidK => InvalidK { .. } => "KNN_INVALID_K",
        /// The requested operation is declared but not provided.
        Unsupported => Unsupported { .. } => "KNN_UNSUPPORTED",
        /// A node handle reachable from the root did not resolve.
        MissingNode => MissingNode { .. } => "KNN_MISSING_NODE",
        /// The metric space produced a distance the engine cannot order.
        InvalidDistance => InvalidDistance { .. } => "KNN_INVALID_DISTANCE",
        /// A metric space operation failed during the traversal.
        SpaceFailure => Space(..) => "KNN_SPACE_FAILURE",
    }
}

impl KnnError {
    /// Retrieve the inner [`SpaceErrorCode`] when the error originated in a
    /// [`crate::MetricSpace`].
    #[must_use]
    pub const fn space_code(&self) -> Option<SpaceErrorCode> {
        match self {
            Self::Space(error) => Some(error.code()),
            _ => None,
        }
    }
}

/// Errors raised while assembling an [`crate::ArenaTree`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TreeError {
    /// A node was pushed without any entries.
    #[error("node {node} has no entries")]
    EmptyNode {
        /// Handle of the empty node.
        node: NodeRef,
    },
    /// A directory entry referenced a node that does not exist.
    #[error("node {parent} references missing child {child}")]
    DanglingChild {
        /// Directory node holding the dangling entry.
        parent: NodeRef,
        /// The unresolved child handle.
        child: NodeRef,
    },
    /// The same node was referenced by more than one directory entry, or by
    /// the root and a directory entry.
    #[error("node {child} is referenced more than once")]
    SharedChild {
        /// Handle referenced more than once.
        child: NodeRef,
    },
    /// The requested root does not exist.
    #[error("root {root} does not exist")]
    UnknownRoot {
        /// The unresolved root handle.
        root: NodeRef,
    },
}

define_error_codes! {
    /// Stable codes describing [`TreeError`] variants.
    enum TreeErrorCode for TreeError {
        /// A node was pushed without any entries.
        EmptyNode => EmptyNode { .. } => "TREE_EMPTY_NODE",
        /// A directory entry referenced a node that does not exist.
        DanglingChild => DanglingChild { .. } => "TREE_DANGLING_CHILD",
        /// A node was referenced more than once.
        SharedChild => SharedChild { .. } => "TREE_SHARED_CHILD",
        /// The requested root does not exist.
        UnknownRoot => UnknownRoot { .. } => "TREE_UNKNOWN_ROOT",
    }
}

/// Convenient alias for results returned by the query engine.
pub type Result<T> = core::result::Result<T, KnnError>;

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(KnnError::InvalidK { got: 0 }, "KNN_INVALID_K")]
    #[case(KnnError::Unsupported { operation: "bulk kNN" }, "KNN_UNSUPPORTED")]
    #[case(
        KnnError::MissingNode { index: "arena".into(), node: NodeRef::new(3) },
        "KNN_MISSING_NODE"
    )]
    #[case(KnnError::InvalidDistance { object: ObjectId::new(1) }, "KNN_INVALID_DISTANCE")]
    #[case(
        KnnError::Space(SpaceError::UnknownObject { id: ObjectId::new(9) }),
        "KNN_SPACE_FAILURE"
    )]
    fn knn_error_codes_are_stable(#[case] error: KnnError, #[case] expected: &str) {
        assert_eq!(error.code().as_str(), expected);
        assert_eq!(error.code().to_string(), expected);
    }

    #[test]
    fn space_code_is_exposed_only_for_space_failures() {
        let wrapped = KnnError::from(SpaceError::DimensionMismatch { left: 2, right: 3 });
        assert_eq!(
            wrapped.space_code(),
            Some(SpaceErrorCode::DimensionMismatch)
        );
        assert_eq!(KnnError::InvalidK { got: 0 }.space_code(), None);
    }

    #[test]
    fn messages_name_the_offending_values() {
        let error = KnnError::InvalidK { got: 0 };
        assert_eq!(
            error.to_string(),
            "at least one object has to be requested (got k=0)"
        );
        let error = TreeError::DanglingChild {
            parent: NodeRef::new(0),
            child: NodeRef::new(7),
        };
        assert_eq!(error.to_string(), "node #0 references missing child #7");
        assert_eq!(error.code(), TreeErrorCode::DanglingChild);
    }
}
