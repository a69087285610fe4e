//! Command implementations and argument parsing for the ramoso CLI.

use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ramoso_core::{
    CandidateQueueKind, KnnError, KnnList, KnnQuery, KnnQueryParams, KnnResult, MetricIndex,
    ObjectId, TraversalStats,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use super::tree_file::{LoadedTree, TreeFileError, load_tree, open_tree_file};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "ramoso", about = "Answer k-nearest-neighbour queries over a metric tree.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Find the nearest neighbours of a point or of a stored object.
    Knn(KnnCommand),
}

/// Options accepted by the `knn` command.
#[derive(Debug, Args, Clone)]
pub struct KnnCommand {
    /// Path to the JSON tree document.
    #[arg(long)]
    pub tree: PathBuf,

    /// What to search around.
    #[command(flatten)]
    pub target: QueryTarget,

    /// Number of neighbours to return; ties at the last distance are kept.
    #[arg(long, allow_negative_numbers = true)]
    pub k: i64,

    /// Skip the cached parent-distance check.
    #[arg(long = "no-parent-pruning")]
    pub no_parent_pruning: bool,

    /// Candidate queue used by the traversal.
    #[arg(long, value_enum, default_value_t = QueueArg::Binary)]
    pub queue: QueueArg,
}

/// Query point or stored object; exactly one must be given.
#[derive(Debug, Args, Clone)]
#[group(required = true, multiple = false)]
pub struct QueryTarget {
    /// Comma-separated query coordinates, e.g. `1.5,-2`.
    #[arg(long, allow_negative_numbers = true)]
    pub query: Option<Coordinates>,

    /// Identifier of a stored object to search around.
    #[arg(long)]
    pub id: Option<u64>,
}

/// Query coordinates parsed from a comma-separated list.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates(pub Vec<f64>);

impl FromStr for Coordinates {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.split(',')
            .map(|part| {
                part.trim()
                    .parse::<f64>()
                    .map_err(|err| format!("invalid coordinate `{}`: {err}", part.trim()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// Candidate queue selection on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum QueueArg {
    /// Plain binary heap; a node may be queued more than once.
    #[default]
    Binary,
    /// Decrease-key heap keeping one entry per node.
    Updatable,
}

impl From<QueueArg> for CandidateQueueKind {
    fn from(value: QueueArg) -> Self {
        match value {
            QueueArg::Binary => Self::BinaryHeap,
            QueueArg::Updatable => Self::Updatable,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while opening the tree document.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The neighbour count was negative.
    #[error("at least one object has to be requested (got k={got})")]
    NegativeK {
        /// The rejected count.
        got: i64,
    },
    /// Neither or both of a query point and a stored object were given.
    #[error("exactly one of `--query` or `--id` must be given")]
    Target,
    /// The tree document could not be loaded.
    #[error(transparent)]
    TreeFile(#[from] TreeFileError),
    /// The query engine rejected or failed the query.
    #[error(transparent)]
    Query(#[from] KnnError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name of the searched tree.
    pub tree: String,
    /// Neighbours in ascending distance order.
    pub result: KnnList<f64>,
    /// Work performed by the traversal.
    pub stats: TraversalStats,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading the tree or running the query fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use ramoso_cli::cli::{Cli, Command, Coordinates, KnnCommand, QueryTarget, QueueArg, run_cli};
/// # use ramoso_core::KnnResult;
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(
///     file.path(),
///     r#"{ "objects": { "0": [0.0], "1": [4.0] },
///          "nodes": [{ "kind": "leaf", "entries": [{ "object": 0 }, { "object": 1 }] }],
///          "root": 0 }"#,
/// )?;
/// let cli = Cli {
///     command: Command::Knn(KnnCommand {
///         tree: file.path().to_path_buf(),
///         target: QueryTarget { query: Some(Coordinates(vec![3.0])), id: None },
///         k: 1,
///         no_parent_pruning: false,
///         queue: QueueArg::Binary,
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.result.ids().get(0).map(|id| id.get()), Some(1));
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Knn(knn) => {
            Span::current().record("command", field::display("knn"));
            run_knn(knn)
        }
    }
}

#[instrument(
    name = "cli.knn",
    err,
    skip(command),
    fields(tree = field::Empty, k = command.k, target = field::Empty),
)]
pub(super) fn run_knn(command: KnnCommand) -> Result<ExecutionSummary, CliError> {
    let KnnCommand {
        tree: path,
        target,
        k,
        no_parent_pruning,
        queue,
    } = command;
    let k = usize::try_from(k).map_err(|_| CliError::NegativeK { got: k })?;
    let k = NonZeroUsize::new(k).ok_or(KnnError::InvalidK { got: k })?.get();

    let span = Span::current();
    span.record("tree", field::display(path.display()));
    let LoadedTree { tree, space } = read_tree(&path)?;

    let params = KnnQueryParams::new()
        .with_parent_pruning(!no_parent_pruning)
        .with_queue(queue.into());
    let query = KnnQuery::new(&tree, &space).with_params(params);
    let (result, stats) = match (target.query, target.id) {
        (None, Some(id)) => {
            span.record("target", field::display(format_args!("id {id}")));
            query.knn_for_id_with_stats(ObjectId::new(id), k)?
        }
        (Some(Coordinates(point)), None) => {
            span.record("target", field::display("point"));
            query.knn_with_stats(&point, k)?
        }
        _ => return Err(CliError::Target),
    };

    info!(
        tree = tree.name(),
        neighbours = result.len(),
        distance_computations = stats.distance_computations(),
        "command completed"
    );
    Ok(ExecutionSummary {
        tree: tree.name().to_owned(),
        result,
        stats,
    })
}

#[instrument(name = "cli.read_tree", err, fields(path = field::Empty))]
pub(super) fn read_tree(path: &Path) -> Result<LoadedTree, CliError> {
    Span::current().record("path", field::display(path.display()));
    let reader = open_tree_file(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(load_tree(reader, &derive_tree_name(path))?)
}

pub(super) fn derive_tree_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|value| value.to_str())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "tree".to_owned())
}

/// Renders `summary` to `writer` as `rank<TAB>id<TAB>distance` lines.
///
/// Ranks start at one; tied neighbours receive consecutive ranks in
/// identifier order.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use ramoso_cli::cli::{ExecutionSummary, render_summary};
/// # use ramoso_core::{DistancePair, KnnList, ObjectId, TraversalStats};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary {
///     tree: "demo".into(),
///     result: KnnList::from_pairs(2, vec![
///         DistancePair::new(0.5, ObjectId::new(7)),
///         DistancePair::new(1.25, ObjectId::new(2)),
///     ]),
///     stats: TraversalStats::default(),
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(String::from_utf8(buffer)?, "1\t7\t0.5\n2\t2\t1.25\n");
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    for (rank, pair) in summary.result.iter().enumerate() {
        writeln!(writer, "{}\t{}\t{}", rank + 1, pair.id(), pair.distance())?;
    }
    Ok(())
}
