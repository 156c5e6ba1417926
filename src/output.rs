use std::collections::BTreeMap;
use std::io::IsTerminal;

use serde::Serialize;

use depgraph::query::insights::{FileDependencyRecord, RepositoryInsights};
use depgraph::{DependencyGraph, FileDegree, ImpactReport};

use crate::cli::OutputFormat;

/// Cap on distinct external packages listed in summaries.
const EXTERNAL_LIMIT: usize = 50;

/// Aggregate statistics produced by an indexing run.
#[derive(Debug, Serialize)]
pub struct IndexStats {
    pub file_count: usize,
    pub edge_count: usize,
    pub languages: BTreeMap<String, usize>,
    pub parsed: usize,
    /// Files skipped due to read or parse errors.
    pub skipped: usize,
    pub unsupported: usize,
    pub raw_imports: usize,
    /// Imports resolved to a file in the repository.
    pub resolved_imports: usize,
    /// Imports that did not resolve (third-party, stdlib or missing).
    pub external_imports: usize,
    pub external_packages: Vec<String>,
    /// Wall-clock time for the indexing run in seconds.
    pub elapsed_secs: f64,
}

impl IndexStats {
    pub fn from_graph(graph: &DependencyGraph, elapsed_secs: f64) -> Self {
        let stats = graph.stats();
        Self {
            file_count: graph.file_count(),
            edge_count: graph.edge_count(),
            languages: graph
                .files_by_language()
                .into_iter()
                .map(|(lang, n)| (lang.display_name().to_owned(), n))
                .collect(),
            parsed: stats.parsed,
            skipped: stats.failed,
            unsupported: stats.unsupported,
            raw_imports: stats.raw_imports,
            resolved_imports: stats.resolved_imports,
            external_imports: stats.external_imports,
            external_packages: graph
                .external_packages(EXTERNAL_LIMIT)
                .into_iter()
                .map(str::to_owned)
                .collect(),
            elapsed_secs,
        }
    }
}

fn header(s: &str) -> String {
    if std::io::stdout().is_terminal() {
        format!("\x1b[1m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

/// Print a summary of the indexing run.
///
/// - `json = true`: emit a pretty-printed JSON object to stdout.
/// - `json = false`: emit a cargo-style human-readable summary to stdout.
///
/// If `stats.skipped > 0`, a warning line is written to **stderr** so that
/// the stdout stream remains clean for downstream JSON consumers.
pub fn print_summary(stats: &IndexStats, json: bool) {
    if json {
        match serde_json::to_string_pretty(stats) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("error serialising stats: {}", e),
        }
        return;
    }

    println!(
        "Indexed {} files in {:.2}s",
        stats.file_count, stats.elapsed_secs
    );
    let langs: Vec<String> = stats
        .languages
        .iter()
        .map(|(lang, n)| format!("{n} {lang}"))
        .collect();
    if !langs.is_empty() {
        println!("  {}", langs.join(", "));
    }
    println!(
        "  {} imports: {} resolved, {} external",
        stats.raw_imports, stats.resolved_imports, stats.external_imports,
    );
    println!("  {} dependency edges", stats.edge_count);
    if !stats.external_packages.is_empty() {
        println!("  external: {}", stats.external_packages.join(", "));
    }

    if stats.skipped > 0 {
        eprintln!("  {} files skipped (read or parse errors)", stats.skipped);
    }
}

/// Format and print an impact report to stdout according to the selected output format.
pub fn format_impact(report: &ImpactReport, format: &OutputFormat) {
    match format {
        OutputFormat::Compact => {
            println!("file {}", report.file);
            println!(
                "risk {} dependents {} dependencies {}",
                report.risk_level.as_str(),
                report.dependent_count,
                report.dependency_count,
            );
            for f in &report.direct_dependents {
                println!("direct {f}");
            }
            for f in &report.all_dependents {
                if !report.direct_dependents.contains(f) {
                    println!("transitive {f}");
                }
            }
            for f in &report.direct_dependencies {
                println!("imports {f}");
            }
            for f in &report.test_files {
                println!("test {f}");
            }
            println!("{}", report.impact_summary);
        }

        OutputFormat::Table => {
            println!("{}", header(&format!("=== Impact: {} ===", report.file)));
            println!("Risk:          {}", report.risk_level.as_str());
            println!("Summary:       {}", report.impact_summary);
            print_section("Direct dependents", &report.direct_dependents);
            print_section("All dependents", &report.all_dependents);
            print_section("Dependencies", &report.direct_dependencies);
            print_section("Test files", &report.test_files);
        }

        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(report).unwrap_or_default()
            );
        }
    }
}

fn print_section(title: &str, files: &[String]) {
    println!();
    println!("{}", header(&format!("--- {title} ({}) ---", files.len())));
    for f in files {
        println!("  {f}");
    }
}

/// Format and print graph metrics and repository insights.
pub fn format_stats(
    insights: &RepositoryInsights,
    records: &[FileDependencyRecord],
    graph: &DependencyGraph,
    format: &OutputFormat,
) {
    let metrics = graph.metrics();
    match format {
        OutputFormat::Compact => {
            println!("files {}", insights.total_files);
            println!(
                "edges {} imports {} avg {:.2} max {}",
                metrics.total_edges,
                insights.total_dependencies,
                metrics.avg_dependencies,
                insights.max_dependencies,
            );
            for d in &metrics.most_critical_files {
                println!("critical {} {}", d.file, d.count);
            }
            for d in &metrics.most_complex_files {
                println!("complex {} {}", d.file, d.count);
            }
            for r in records {
                println!(
                    "file {} in {} out {} imports {}",
                    r.file_path,
                    r.dependent_count,
                    r.depends_on.len(),
                    r.import_count,
                );
            }
        }

        OutputFormat::Table => {
            println!("{}", header("=== Repository Overview ==="));
            println!("Files:            {}", insights.total_files);
            println!("Edges:            {}", metrics.total_edges);
            println!("Raw imports:      {}", insights.total_dependencies);
            println!("Avg dependencies: {:.2}", metrics.avg_dependencies);
            println!("Max imports:      {}", insights.max_dependencies);
            print_ranking("Most depended upon", &metrics.most_critical_files);
            print_ranking("Most dependencies", &metrics.most_complex_files);
            print_records(records);
        }

        OutputFormat::Json => {
            let json = serde_json::json!({
                "metrics": metrics,
                "insights": insights,
                "build": graph.stats(),
                "files": records,
                "external_dependencies": graph.external_imports_limited(EXTERNAL_LIMIT),
            });
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
    }
}

fn print_ranking(title: &str, ranking: &[FileDegree]) {
    println!();
    println!("{}", header(&format!("--- {title} ---")));
    let file_w = ranking.iter().map(|d| d.file.len()).max().unwrap_or(4).max(4);
    for d in ranking {
        println!("  {:<file_w$}  {:>4}", d.file, d.count, file_w = file_w);
    }
}

fn print_records(records: &[FileDependencyRecord]) {
    println!();
    println!("{}", header(&format!("--- Files ({}) ---", records.len())));
    let file_w = records
        .iter()
        .map(|r| r.file_path.len())
        .max()
        .unwrap_or(4)
        .max(4);
    println!(
        "  {:<file_w$}  {:>4}  {:>4}  {:>7}",
        "FILE",
        "IN",
        "OUT",
        "IMPORTS",
        file_w = file_w
    );
    for r in records {
        println!(
            "  {:<file_w$}  {:>4}  {:>4}  {:>7}",
            r.file_path,
            r.dependent_count,
            r.depends_on.len(),
            r.import_count,
            file_w = file_w
        );
    }
}
