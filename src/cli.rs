use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// File-level dependency graphs and change-impact analysis for Python, JavaScript and
/// TypeScript repositories.
#[derive(Parser, Debug)]
#[command(
    name = "depgraph",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for query results.
#[derive(Clone, Debug, ValueEnum, Default)]
pub enum OutputFormat {
    /// Compact one-line-per-fact format (default).
    #[default]
    Compact,
    /// Human-readable sections with optional ANSI color when stdout is a terminal.
    Table,
    /// Pretty-printed JSON suitable for programmatic consumption.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the dependency graph of a repository and print a summary.
    ///
    /// Writes a snapshot to `.depgraph/graph.bin` that later commands can reuse with `--cached`.
    Index {
        /// Path to the repository root.
        path: PathBuf,

        /// Output the summary as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,

        /// Only index these languages (comma-separated: python,javascript,typescript,tsx).
        #[arg(long, value_delimiter = ',')]
        languages: Vec<String>,

        /// Do not write the snapshot.
        #[arg(long)]
        no_cache: bool,
    },

    /// Show what depends on a file, directly and transitively, and how risky a change is.
    Impact {
        /// Repo-relative path of the file (e.g. src/utils.py).
        file: String,

        /// Path to the repository root.
        path: PathBuf,

        /// Reuse the snapshot written by `index` instead of re-parsing.
        #[arg(long)]
        cached: bool,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },

    /// Graph metrics: most depended-upon files, most dependent files, averages.
    Stats {
        /// Path to the repository root.
        path: PathBuf,

        /// Reuse the snapshot written by `index` instead of re-parsing.
        #[arg(long)]
        cached: bool,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },

    /// Print the graph snapshot (files, raw imports, edges) as JSON.
    Export {
        /// Path to the repository root.
        path: PathBuf,

        /// Reuse the snapshot written by `index` instead of re-parsing.
        #[arg(long)]
        cached: bool,
    },
}
