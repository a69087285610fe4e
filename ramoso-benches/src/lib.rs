//! Benchmark support crate for ramoso.
//!
//! Provides a synthetic Euclidean space, a packer that lays its points out as
//! a metric tree, and parameter types used by the Criterion kNN benchmarks.

pub mod error;
pub mod params;
pub mod source;
pub mod tree;
