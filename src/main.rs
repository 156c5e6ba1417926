mod cli;
mod output;

use std::collections::HashSet;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use depgraph::cache::{load_snapshot, save_snapshot};
use depgraph::query::insights::{file_dependency_records, repository_insights};
use depgraph::query::impact::analyze_with;
use depgraph::{DepGraphConfig, DependencyGraph, Error, GraphBuilder, Language};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Index {
            path,
            json,
            languages,
            no_cache,
        } => {
            let root = canonical_root(&path)?;
            let config = DepGraphConfig::load(&root);
            let languages = parse_languages(&languages)?;

            let start = Instant::now();
            let graph = depgraph::build_graph_with(&root, &config, languages.as_ref());
            let elapsed = start.elapsed().as_secs_f64();

            if !no_cache {
                save_snapshot(&root, &graph.to_snapshot())
                    .with_context(|| format!("failed to write snapshot under {}", root.display()))?;
            }

            output::print_summary(&output::IndexStats::from_graph(&graph, elapsed), json);
        }

        Commands::Impact {
            file,
            path,
            cached,
            format,
        } => {
            let root = canonical_root(&path)?;
            let config = DepGraphConfig::load(&root);
            let graph = load_graph(&root, &config, cached);
            let target = file.replace('\\', "/");
            let target = target.trim_start_matches("./");

            match analyze_with(target, &graph, &config.risk) {
                Ok(report) => output::format_impact(&report, &format),
                Err(Error::NotFound { path }) => {
                    bail!("{path} is not a source file in the dependency graph of {}", root.display())
                }
                Err(err) => return Err(err.into()),
            }
        }

        Commands::Stats {
            path,
            cached,
            format,
        } => {
            let root = canonical_root(&path)?;
            let config = DepGraphConfig::load(&root);
            let graph = load_graph(&root, &config, cached);
            let insights = repository_insights(&graph);
            let records = file_dependency_records(&graph);
            output::format_stats(&insights, &records, &graph, &format);
        }

        Commands::Export { path, cached } => {
            let root = canonical_root(&path)?;
            let config = DepGraphConfig::load(&root);
            let graph = load_graph(&root, &config, cached);
            println!("{}", graph.to_snapshot().to_json()?);
        }
    }

    Ok(())
}

fn canonical_root(path: &Path) -> Result<std::path::PathBuf> {
    if !path.is_dir() {
        bail!("{} is not a directory", path.display());
    }
    path.canonicalize()
        .with_context(|| format!("failed to resolve {}", path.display()))
}

/// Rehydrate from the snapshot when asked and one is usable, otherwise build from source.
fn load_graph(root: &Path, config: &DepGraphConfig, cached: bool) -> DependencyGraph {
    if cached {
        match load_snapshot(root) {
            Some(snapshot) => {
                info!(files = snapshot.files.len(), "rehydrating from snapshot");
                return GraphBuilder::from_config(config).rehydrate(snapshot);
            }
            None => warn!("no usable snapshot, rebuilding from source"),
        }
    }
    depgraph::build_graph_with(root, config, None)
}

fn parse_languages(names: &[String]) -> Result<Option<HashSet<Language>>> {
    if names.is_empty() {
        return Ok(None);
    }
    names
        .iter()
        .map(|name| {
            Language::from_str_loose(name).ok_or_else(|| anyhow!("unknown language: {name}"))
        })
        .collect::<Result<HashSet<_>>>()
        .map(Some)
}
