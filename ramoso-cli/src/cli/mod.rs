//! Command-line interface orchestration for ramoso.
//!
//! The CLI offers a `knn` command that loads a pre-built tree from a JSON
//! document and answers one k-nearest-neighbour query against it, either for
//! a point given on the command line or for an object stored in the tree.

mod commands;
mod space;
mod tree_file;

pub use commands::{
    Cli, CliError, Command, Coordinates, ExecutionSummary, KnnCommand, QueryTarget, QueueArg,
    render_summary, run_cli,
};
pub use space::EuclideanSpace;
pub use tree_file::{LoadedTree, TreeFileError, load_tree};

#[cfg(test)]
mod test_helpers;
