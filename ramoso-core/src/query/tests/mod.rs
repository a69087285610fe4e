//! Tests for the kNN traversal engine.
