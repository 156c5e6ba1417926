use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::graph::DependencyGraph;
use crate::graph::edge::ResolvedEdge;

/// Default length of the "most critical" / "most complex" rankings.
pub const DEFAULT_TOP_N: usize = 10;

/// One entry of a degree ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDegree {
    pub file: String,
    pub count: usize,
}

/// Graph-level statistics derived from the edge set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphMetrics {
    /// Top files by in-degree (most depended upon).
    pub most_critical_files: Vec<FileDegree>,
    /// Top files by out-degree (depend on the most other files).
    pub most_complex_files: Vec<FileDegree>,
    /// Mean out-degree over files with at least one outgoing edge.
    pub avg_dependencies: f64,
    pub total_edges: usize,
}

/// Compute metrics for a built graph.
pub fn compute(graph: &DependencyGraph, top_n: usize) -> GraphMetrics {
    compute_from_edges(&graph.edges(), top_n)
}

/// Compute metrics from an edge list in a single tallying pass.
///
/// Rankings are ordered by descending degree, ties broken by path so output is stable.
pub fn compute_from_edges(edges: &[ResolvedEdge], top_n: usize) -> GraphMetrics {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut out_degree: HashMap<&str, usize> = HashMap::new();

    for edge in edges {
        *out_degree.entry(edge.source.as_str()).or_insert(0) += 1;
        *in_degree.entry(edge.target.as_str()).or_insert(0) += 1;
    }

    let avg_dependencies = if out_degree.is_empty() {
        0.0
    } else {
        out_degree.values().sum::<usize>() as f64 / out_degree.len() as f64
    };

    GraphMetrics {
        most_critical_files: top_by_degree(&in_degree, top_n),
        most_complex_files: top_by_degree(&out_degree, top_n),
        avg_dependencies,
        total_edges: edges.len(),
    }
}

fn top_by_degree(degrees: &HashMap<&str, usize>, top_n: usize) -> Vec<FileDegree> {
    let mut ranked: Vec<(&str, usize)> = degrees.iter().map(|(&f, &d)| (f, d)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(top_n)
        .map(|(file, count)| FileDegree {
            file: file.to_owned(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::edge::EdgeKind;

    fn edge(s: &str, t: &str) -> ResolvedEdge {
        ResolvedEdge {
            source: s.into(),
            target: t.into(),
            kind: EdgeKind::Import,
        }
    }

    #[test]
    fn test_empty_graph_metrics() {
        let m = compute_from_edges(&[], DEFAULT_TOP_N);
        assert!(m.most_critical_files.is_empty());
        assert!(m.most_complex_files.is_empty());
        assert_eq!(m.avg_dependencies, 0.0);
        assert_eq!(m.total_edges, 0);
    }

    #[test]
    fn test_rankings_and_average() {
        let edges = vec![
            edge("a.py", "core.py"),
            edge("b.py", "core.py"),
            edge("c.py", "core.py"),
            edge("a.py", "util.py"),
            edge("b.py", "util.py"),
            edge("a.py", "b.py"),
        ];
        let m = compute_from_edges(&edges, DEFAULT_TOP_N);

        assert_eq!(m.total_edges, 6);
        assert_eq!(
            m.most_critical_files[0],
            FileDegree { file: "core.py".into(), count: 3 }
        );
        assert_eq!(
            m.most_critical_files[1],
            FileDegree { file: "util.py".into(), count: 2 }
        );
        assert_eq!(
            m.most_complex_files[0],
            FileDegree { file: "a.py".into(), count: 3 }
        );
        // a=3, b=2, c=1 over 3 files with outgoing edges; core/util do not dilute it.
        assert!((m.avg_dependencies - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ties_broken_by_path() {
        let edges = vec![edge("z.ts", "x.ts"), edge("a.ts", "y.ts"), edge("m.ts", "w.ts")];
        let m = compute_from_edges(&edges, 2);
        let files: Vec<&str> = m.most_complex_files.iter().map(|d| d.file.as_str()).collect();
        assert_eq!(files, vec!["a.ts", "m.ts"]);
        let critical: Vec<&str> = m.most_critical_files.iter().map(|d| d.file.as_str()).collect();
        assert_eq!(critical, vec!["w.ts", "x.ts"]);
    }

    #[test]
    fn test_order_of_edges_does_not_change_metrics() {
        let mut edges = vec![
            edge("a.ts", "b.ts"),
            edge("c.ts", "b.ts"),
            edge("c.ts", "d.ts"),
        ];
        let first = compute_from_edges(&edges, DEFAULT_TOP_N);
        edges.reverse();
        assert_eq!(first, compute_from_edges(&edges, DEFAULT_TOP_N));
    }
}
