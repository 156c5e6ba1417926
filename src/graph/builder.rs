use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::DepGraphConfig;
use crate::error::{FileError, FileErrorKind};
use crate::language::detect_language;
use crate::parser::imports::RawImport;
use crate::parser::languages::grammar_for;
use crate::parser::parse_imports_parallel;
use crate::query::metrics::{self, DEFAULT_TOP_N};
use crate::resolver::Resolver;

use super::{BuildStats, DependencyGraph};

/// Outcome of the extraction pass for one file.
struct Extracted {
    path: String,
    imports: Vec<RawImport>,
    failure: Option<FileError>,
}

/// Builds [`DependencyGraph`]s. Holds no state between builds, so one builder can
/// serve concurrent builds of different repositories.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    resolver: Resolver,
    top_n: usize,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(Resolver::default(), DEFAULT_TOP_N)
    }
}

impl GraphBuilder {
    pub fn new(resolver: Resolver, top_n: usize) -> Self {
        Self { resolver, top_n }
    }

    pub fn from_config(config: &DepGraphConfig) -> Self {
        Self::new(config.resolver(), config.top_n())
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Build the graph for `files` under `repo_root`.
    ///
    /// Runs in two passes separated by a join: extraction (parallel, per file) and then
    /// resolution against the complete node set. Per-file read and parse failures are
    /// logged and the file is kept as a node without imports.
    pub fn build(&self, repo_root: &Path, files: &[PathBuf]) -> DependencyGraph {
        let start = Instant::now();

        let targets: Vec<(String, PathBuf)> = files
            .iter()
            .filter_map(|file| match relative_posix(repo_root, file) {
                Some(rel) => Some((rel, repo_root.join(file_under_root(repo_root, file)))),
                None => {
                    warn!(path = %file.display(), "file is outside the repository root, skipping");
                    None
                }
            })
            .collect();

        // Pass 1: extraction. Each worker owns its parser; results are merged below.
        let extracted: Vec<Extracted> = targets
            .par_iter()
            .map(|(rel, abs)| extract_file(rel, abs))
            .collect();

        let mut entries = Vec::with_capacity(extracted.len());
        let mut failures = Vec::new();
        for item in extracted {
            if let Some(failure) = item.failure {
                match failure.kind {
                    FileErrorKind::Unsupported => {
                        debug!(path = %failure.path, "no grammar registered, keeping as import-less node")
                    }
                    _ => warn!(path = %failure.path, kind = %failure.kind, error = %failure.message, "failed to extract imports"),
                }
                failures.push(failure);
            }
            entries.push((item.path, item.imports));
        }

        info!(
            files = entries.len(),
            failed = failures.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "import extraction complete"
        );

        // Pass 2: resolution, only after every file has been extracted.
        self.assemble(entries, failures)
    }

    /// Assemble a graph from already-extracted imports: add every node, resolve every
    /// import against the full node set, then compute metrics.
    ///
    /// This is the whole build minus parsing, and is how cached graphs are rehydrated.
    pub fn assemble(
        &self,
        mut entries: Vec<(String, Vec<RawImport>)>,
        mut failures: Vec<FileError>,
    ) -> DependencyGraph {
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.dedup_by(|a, b| a.0 == b.0);
        failures.sort_by(|a, b| a.path.cmp(&b.path));
        failures.dedup_by(|a, b| a.path == b.path);

        let mut graph = DependencyGraph::new();
        for (path, _) in &entries {
            graph.add_file(path, detect_language(path));
        }

        let resolved: Vec<Vec<Option<String>>> = {
            let known = &graph.file_index;
            entries
                .par_iter()
                .map(|(path, imports)| {
                    imports
                        .iter()
                        .map(|imp| self.resolver.resolve(imp, path, known))
                        .collect()
                })
                .collect()
        };

        let mut stats = BuildStats::default();
        for ((path, imports), targets) in entries.into_iter().zip(resolved) {
            for (import, target) in imports.iter().zip(targets) {
                match target {
                    Some(target) => {
                        debug!(from = %path, specifier = %import.specifier, to = %target, "resolved import");
                        stats.resolved_imports += 1;
                        if !graph.add_import_edge(&path, &target) {
                            stats.duplicate_edges += 1;
                        }
                    }
                    None => {
                        debug!(from = %path, specifier = %import.specifier, "external import");
                        stats.external_imports += 1;
                        graph.external.push((path.clone(), import.clone()));
                    }
                }
            }
            stats.raw_imports += imports.len();
            graph.imports.insert(path, imports);
        }

        stats.files = graph.file_count();
        stats.unsupported = failures
            .iter()
            .filter(|f| f.kind == FileErrorKind::Unsupported)
            .count();
        stats.failed = failures.len() - stats.unsupported;
        stats.parsed = stats.files.saturating_sub(failures.len());

        graph.failures = failures;
        graph.stats = stats;
        graph.metrics = metrics::compute(&graph, self.top_n);

        info!(
            files = graph.stats.files,
            edges = graph.edge_count(),
            resolved = graph.stats.resolved_imports,
            external = graph.stats.external_imports,
            "dependency graph built"
        );

        graph
    }
}

fn extract_file(rel: &str, abs: &Path) -> Extracted {
    let language = detect_language(rel);
    let failed = |kind: FileErrorKind, message: String| Extracted {
        path: rel.to_owned(),
        imports: Vec::new(),
        failure: Some(FileError {
            path: rel.to_owned(),
            kind,
            message,
        }),
    };

    if grammar_for(language).is_none() {
        return failed(
            FileErrorKind::Unsupported,
            format!("no parser for {}", language.display_name()),
        );
    }

    let source = match std::fs::read(abs) {
        Ok(bytes) => bytes,
        Err(err) => return failed(FileErrorKind::Read, err.to_string()),
    };

    match parse_imports_parallel(language, &source) {
        Ok(imports) => Extracted {
            path: rel.to_owned(),
            imports,
            failure: None,
        },
        Err(err) => failed(FileErrorKind::Parse, err.to_string()),
    }
}

/// `file` relative to `root`: absolute paths have the root stripped, relative paths
/// are taken as already root-relative.
fn file_under_root<'a>(root: &Path, file: &'a Path) -> &'a Path {
    file.strip_prefix(root).unwrap_or(file)
}

/// Repo-relative POSIX path for `file`, or `None` if it lies outside `root` or climbs
/// out of it with `..`.
pub fn relative_posix(root: &Path, file: &Path) -> Option<String> {
    let rel = match file.strip_prefix(root) {
        Ok(rel) => rel,
        Err(_) if file.is_absolute() => return None,
        Err(_) => file,
    };

    let mut parts: Vec<String> = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
