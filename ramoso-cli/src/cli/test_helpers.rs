//! Small helpers shared across CLI tests.
//!
//! The CLI unit tests write tree documents to temporary files and assert
//! error handling behaviour. These helpers keep the test cases concise.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::TempDir;

use super::{Cli, CliError, Command, Coordinates, KnnCommand, QueryTarget, QueueArg, run_cli};

/// Objects at `{0, 1, 2, 3, 10}` on a line, routed by object 1 (radius 2)
/// and object 4 (radius 0).
pub(super) const LINE_TREE: &str = r#"{
    "name": "line",
    "objects": { "0": [0.0], "1": [1.0], "2": [2.0], "3": [3.0], "4": [10.0] },
    "nodes": [
        { "kind": "leaf", "entries": [
            { "object": 0, "parent_distance": 1.0 },
            { "object": 1, "parent_distance": 0.0 },
            { "object": 2, "parent_distance": 1.0 },
            { "object": 3, "parent_distance": 2.0 }
        ] },
        { "kind": "leaf", "entries": [{ "object": 4, "parent_distance": 0.0 }] },
        { "kind": "directory", "entries": [
            { "object": 1, "radius": 2.0, "child": 0 },
            { "object": 4, "radius": 0.0, "child": 1 }
        ] }
    ],
    "root": 2
}"#;

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn create_tree_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

pub(super) fn knn_command(tree: PathBuf, target: QueryTarget, k: i64) -> KnnCommand {
    KnnCommand {
        tree,
        target,
        k,
        no_parent_pruning: false,
        queue: QueueArg::Binary,
    }
}

pub(super) fn point(coordinates: &[f64]) -> QueryTarget {
    QueryTarget {
        query: Some(Coordinates(coordinates.to_vec())),
        id: None,
    }
}

pub(super) fn stored(id: u64) -> QueryTarget {
    QueryTarget {
        query: None,
        id: Some(id),
    }
}

pub(super) fn run_knn_expecting_error(command: KnnCommand, panic_msg: &str) -> CliError {
    match run_cli(Cli {
        command: Command::Knn(command),
    }) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
