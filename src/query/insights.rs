use serde::Serialize;

use crate::graph::DependencyGraph;
use crate::language::{Language, detect_language};
use crate::query::metrics::FileDegree;

/// Repository-level summary, the shape stored alongside a cached graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryInsights {
    pub total_files: usize,
    /// Raw import references across all files (resolved or not).
    pub total_dependencies: usize,
    pub avg_dependencies_per_file: f64,
    /// Largest raw import count of a single file.
    pub max_dependencies: usize,
    pub critical_files: Vec<String>,
    pub most_complex: Vec<FileDegree>,
}

/// Per-file resolved dependencies in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDependencyRecord {
    pub file_path: String,
    /// Final path component, used as the node label.
    pub label: String,
    pub language: Language,
    pub depends_on: Vec<String>,
    pub depended_by: Vec<String>,
    /// Raw import references written in the file.
    pub import_count: usize,
    pub dependent_count: usize,
}

pub fn repository_insights(graph: &DependencyGraph) -> RepositoryInsights {
    let metrics = graph.metrics();
    let imports = graph.raw_imports();

    RepositoryInsights {
        total_files: graph.file_count(),
        total_dependencies: imports.values().map(Vec::len).sum(),
        avg_dependencies_per_file: metrics.avg_dependencies,
        max_dependencies: imports.values().map(Vec::len).max().unwrap_or(0),
        critical_files: metrics
            .most_critical_files
            .iter()
            .map(|d| d.file.clone())
            .collect(),
        most_complex: metrics.most_complex_files.clone(),
    }
}

/// One record per node, sorted by path.
pub fn file_dependency_records(graph: &DependencyGraph) -> Vec<FileDependencyRecord> {
    graph
        .paths()
        .into_iter()
        .map(|path| {
            let depended_by: Vec<String> =
                graph.dependents_of(path).into_iter().map(str::to_owned).collect();
            let (label, language) = match graph.file(path) {
                Some(node) => (node.file_name().to_owned(), node.language),
                None => (path.to_owned(), detect_language(path)),
            };
            FileDependencyRecord {
                file_path: path.to_owned(),
                label,
                language,
                depends_on: graph
                    .dependencies_of(path)
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
                import_count: graph.imports_of(path).len(),
                dependent_count: depended_by.len(),
                depended_by,
            }
        })
        .collect()
}
