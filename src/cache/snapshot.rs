use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::graph::builder::GraphBuilder;
use crate::graph::edge::ResolvedEdge;
use crate::language::detect_language;
use crate::parser::imports::RawImport;
use crate::query::metrics::DEFAULT_TOP_N;
use crate::resolver::Resolver;

use super::envelope::CACHE_VERSION;

/// Serializable form of a [`DependencyGraph`]: every node with its raw imports, plus the
/// edges derived from them.
///
/// Edges are informational. Rehydration re-resolves the raw imports against the node set,
/// so a snapshot written under one resolver configuration stays valid under another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub version: u32,
    pub files: BTreeMap<String, Vec<RawImport>>,
    pub edges: Vec<ResolvedEdge>,
}

impl GraphSnapshot {
    /// Build a snapshot from a flat `path -> [specifier]` map, as written by external
    /// caches that keep only the import strings. Import kinds are inferred from each
    /// file's language.
    pub fn from_import_strings(files: BTreeMap<String, Vec<String>>) -> Self {
        let files = files
            .into_iter()
            .map(|(path, specs)| {
                let language = detect_language(&path);
                let imports = specs
                    .into_iter()
                    .map(|s| RawImport::from_cached(s, language))
                    .collect();
                (path, imports)
            })
            .collect();
        Self {
            version: CACHE_VERSION,
            files,
            edges: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Snapshot(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Snapshot(e.to_string()))
    }
}

impl DependencyGraph {
    pub fn to_snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            version: CACHE_VERSION,
            files: self.imports.clone(),
            edges: self.edges(),
        }
    }

    /// Rehydrate a graph without parsing: nodes come from the snapshot's file map and
    /// edges are re-resolved with `resolver`.
    pub fn from_snapshot(snapshot: GraphSnapshot, resolver: &Resolver) -> DependencyGraph {
        GraphBuilder::new(resolver.clone(), DEFAULT_TOP_N).rehydrate(snapshot)
    }
}

impl GraphBuilder {
    /// Like [`DependencyGraph::from_snapshot`], using this builder's resolver and ranking length.
    pub fn rehydrate(&self, snapshot: GraphSnapshot) -> DependencyGraph {
        let GraphSnapshot { files, edges, .. } = snapshot;
        let graph = self.assemble(files.into_iter().collect(), Vec::new());

        if !edges.is_empty() && graph.edges() != edges {
            warn!(
                stored = edges.len(),
                resolved = graph.edge_count(),
                "snapshot edges differ from re-resolved edges, using re-resolved"
            );
        }
        graph
    }
}
