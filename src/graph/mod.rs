pub mod builder;
pub mod edge;
pub mod node;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::Directed;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use serde::Serialize;

use crate::error::FileError;
use crate::language::Language;
use crate::parser::imports::RawImport;
use crate::query::metrics::GraphMetrics;
use crate::resolver::package_name;

use edge::{EdgeKind, ResolvedEdge};
use node::SourceFile;

/// Counters collected while building a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Number of file nodes.
    pub files: usize,
    /// Files whose imports were extracted.
    pub parsed: usize,
    /// Files that could not be read or parsed (kept as import-less nodes).
    pub failed: usize,
    /// Files with no registered grammar (kept as import-less nodes).
    pub unsupported: usize,
    /// Raw import references across all files.
    pub raw_imports: usize,
    /// References that resolved to an in-repository file.
    pub resolved_imports: usize,
    /// References that did not resolve.
    pub external_imports: usize,
    /// Resolved references whose edge already existed.
    pub duplicate_edges: usize,
}

/// The file-level dependency graph of one repository.
///
/// Built by [`builder::GraphBuilder`]; read-only afterwards so the attached
/// [`GraphMetrics`] always describe the current edge set.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    pub(crate) graph: StableGraph<SourceFile, EdgeKind, Directed>,
    /// Maps file paths to their node indices for O(1) lookup.
    pub(crate) file_index: HashMap<String, NodeIndex>,
    /// Raw imports per file, exactly as extracted.
    pub(crate) imports: BTreeMap<String, Vec<RawImport>>,
    /// `(importing file, import)` for every reference that did not resolve.
    pub(crate) external: Vec<(String, RawImport)>,
    pub(crate) failures: Vec<FileError>,
    pub(crate) stats: BuildStats,
    pub(crate) metrics: GraphMetrics,
}

impl DependencyGraph {
    pub(crate) fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            file_index: HashMap::new(),
            imports: BTreeMap::new(),
            external: Vec::new(),
            failures: Vec::new(),
            stats: BuildStats::default(),
            metrics: GraphMetrics::default(),
        }
    }

    /// Add a file node. If the file has already been added, returns the existing index.
    pub(crate) fn add_file(&mut self, path: &str, language: Language) -> NodeIndex {
        if let Some(&existing) = self.file_index.get(path) {
            return existing;
        }
        let idx = self.graph.add_node(SourceFile::new(path, language));
        self.file_index.insert(path.to_owned(), idx);
        self.imports.entry(path.to_owned()).or_default();
        idx
    }

    /// Add an import edge between two existing nodes. Returns `false` when either endpoint
    /// is missing, the edge would be a self-loop, or the edge already exists.
    pub(crate) fn add_import_edge(&mut self, from: &str, to: &str) -> bool {
        let (Some(&a), Some(&b)) = (self.file_index.get(from), self.file_index.get(to)) else {
            return false;
        };
        if a == b || self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, EdgeKind::Import);
        true
    }

    /// Number of file nodes.
    pub fn file_count(&self) -> usize {
        self.file_index.len()
    }

    /// Number of import edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.file_index.contains_key(path)
    }

    pub fn file(&self, path: &str) -> Option<&SourceFile> {
        self.file_index.get(path).map(|&idx| &self.graph[idx])
    }

    /// All file nodes, sorted by path.
    pub fn files(&self) -> Vec<&SourceFile> {
        let mut files: Vec<&SourceFile> =
            self.graph.node_indices().map(|i| &self.graph[i]).collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// All node paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        self.files().into_iter().map(|f| f.path.as_str()).collect()
    }

    /// All edges, sorted by `(source, target)`.
    pub fn edges(&self) -> Vec<ResolvedEdge> {
        let mut edges: Vec<ResolvedEdge> = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (source, target) = self.graph.edge_endpoints(e)?;
                Some(ResolvedEdge {
                    source: self.graph[source].path.clone(),
                    target: self.graph[target].path.clone(),
                    kind: self.graph[e],
                })
            })
            .collect();
        edges.sort();
        edges
    }

    /// Raw imports of one file; empty for unknown paths and import-less files.
    pub fn imports_of(&self, path: &str) -> &[RawImport] {
        self.imports.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Raw imports of every file, keyed by path.
    pub fn raw_imports(&self) -> &BTreeMap<String, Vec<RawImport>> {
        &self.imports
    }

    /// Files with an edge into `path`, sorted.
    pub fn dependents_of(&self, path: &str) -> Vec<&str> {
        self.neighbors(path, Direction::Incoming)
    }

    /// Files `path` has an edge to, sorted.
    pub fn dependencies_of(&self, path: &str) -> Vec<&str> {
        self.neighbors(path, Direction::Outgoing)
    }

    fn neighbors(&self, path: &str, dir: Direction) -> Vec<&str> {
        let Some(&idx) = self.file_index.get(path) else {
            return Vec::new();
        };
        let mut out: Vec<&str> = self
            .graph
            .neighbors_directed(idx, dir)
            .map(|n| self.graph[n].path.as_str())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Distinct specifiers that did not resolve to any file, sorted.
    pub fn external_imports(&self) -> BTreeSet<&str> {
        self.external
            .iter()
            .map(|(_, imp)| imp.specifier.as_str())
            .collect()
    }

    /// Like [`external_imports`](Self::external_imports) but capped at `limit` entries.
    pub fn external_imports_limited(&self, limit: usize) -> Vec<&str> {
        self.external_imports().into_iter().take(limit).collect()
    }

    /// Distinct top-level packages of the unresolved specifiers (`lodash/merge` counts as
    /// `lodash`), sorted and capped at `limit`.
    pub fn external_packages(&self, limit: usize) -> Vec<&str> {
        let packages: BTreeSet<&str> = self
            .external
            .iter()
            .map(|(_, imp)| package_name(imp))
            .collect();
        packages.into_iter().take(limit).collect()
    }

    /// Per-file failures recorded during the build.
    pub fn failures(&self) -> &[FileError] {
        &self.failures
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn metrics(&self) -> &GraphMetrics {
        &self.metrics
    }

    /// Number of files per language, for summaries.
    pub fn files_by_language(&self) -> BTreeMap<Language, usize> {
        let mut map = BTreeMap::new();
        for idx in self.graph.node_indices() {
            *map.entry(self.graph[idx].language).or_insert(0) += 1;
        }
        map
    }

    pub(crate) fn node_index(&self, path: &str) -> Option<NodeIndex> {
        self.file_index.get(path).copied()
    }
}
