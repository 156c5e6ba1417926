//! File-level dependency graphs for Python, JavaScript and TypeScript repositories.
//!
//! Builds a directed graph whose nodes are source files and whose edges are resolved
//! intra-repository imports, then answers impact questions over it.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let graph = depgraph::build_graph(Path::new("."));
//! let report = depgraph::analyze_impact("src/utils.py", &graph)?;
//! println!("{} ({})", report.impact_summary, report.risk_level.as_str());
//! # Ok::<(), depgraph::Error>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod language;
pub mod parser;
pub mod query;
pub mod resolver;
pub mod walker;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::info;

pub use cache::GraphSnapshot;
pub use config::DepGraphConfig;
pub use error::{Error, FileError, FileErrorKind, Result};
pub use graph::DependencyGraph;
pub use graph::builder::GraphBuilder;
pub use graph::edge::{EdgeKind, ResolvedEdge};
pub use graph::node::SourceFile;
pub use language::{Language, detect_language};
pub use parser::imports::{ImportKind, RawImport};
pub use query::impact::{ImpactReport, RiskLevel, RiskThresholds};
pub use query::metrics::{FileDegree, GraphMetrics};
pub use resolver::Resolver;

/// Discover every supported source file under `repo_root` and build its dependency graph.
///
/// Reads `depgraph.toml` from the root if present. Per-file failures never abort the
/// build; they are available from [`DependencyGraph::failures`].
pub fn build_graph(repo_root: &Path) -> DependencyGraph {
    let config = DepGraphConfig::load(repo_root);
    build_graph_with(repo_root, &config, None)
}

/// [`build_graph`] with an explicit configuration and optional language filter.
pub fn build_graph_with(
    repo_root: &Path,
    config: &DepGraphConfig,
    languages: Option<&HashSet<Language>>,
) -> DependencyGraph {
    let files: Vec<PathBuf> = walker::discover_files(repo_root, config, languages)
        .into_iter()
        .map(PathBuf::from)
        .collect();
    info!(root = %repo_root.display(), files = files.len(), "building dependency graph");
    GraphBuilder::from_config(config).build(repo_root, &files)
}

/// Impact report for `target_path` (repo-relative) using the default risk thresholds.
///
/// # Errors
/// Returns [`Error::NotFound`] if `target_path` is not a node of `graph`.
pub fn analyze_impact(target_path: &str, graph: &DependencyGraph) -> Result<ImpactReport> {
    query::impact::analyze(&normalize_target(target_path), graph)
}

/// Metrics computed when `graph` was built.
pub fn metrics(graph: &DependencyGraph) -> &GraphMetrics {
    graph.metrics()
}

/// Accept `./a/b.py` and `a\b.py` spellings of a node path.
fn normalize_target(target: &str) -> String {
    let target = target.replace('\\', "/");
    target.trim_start_matches("./").to_owned()
}
