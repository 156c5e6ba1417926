use std::collections::{HashSet, VecDeque};

use petgraph::Direction;
use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::graph::node::file_stem;

/// Risk of changing a file, graded on its transitive dependent count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Transitive-dependent counts above which a change is graded medium / high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub high: usize,
    pub medium: usize,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self { high: 10, medium: 3 }
    }
}

impl RiskThresholds {
    pub fn classify(&self, transitive_dependents: usize) -> RiskLevel {
        if transitive_dependents > self.high {
            RiskLevel::High
        } else if transitive_dependents > self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Blast radius of changing one file. All path lists are sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactReport {
    pub file: String,
    /// Files that import `file` directly.
    pub direct_dependents: Vec<String>,
    /// Every file that reaches `file` through imports, excluding `file` itself.
    pub all_dependents: Vec<String>,
    pub dependent_count: usize,
    /// Files `file` imports directly.
    pub direct_dependencies: Vec<String>,
    pub dependency_count: usize,
    pub risk_level: RiskLevel,
    pub test_files: Vec<String>,
    pub impact_summary: String,
}

/// Compute the impact report for `target` using the default thresholds.
///
/// # Errors
/// Returns [`Error::NotFound`] if `target` is not a node of `graph`.
pub fn analyze(target: &str, graph: &DependencyGraph) -> Result<ImpactReport> {
    analyze_with(target, graph, &RiskThresholds::default())
}

/// Compute the impact report for `target`.
///
/// # Errors
/// Returns [`Error::NotFound`] if `target` is not a node of `graph`.
pub fn analyze_with(
    target: &str,
    graph: &DependencyGraph,
    thresholds: &RiskThresholds,
) -> Result<ImpactReport> {
    let start = graph.node_index(target).ok_or_else(|| Error::NotFound {
        path: target.to_owned(),
    })?;

    let direct_dependents = owned_paths(graph.dependents_of(target));
    let direct_dependencies = owned_paths(graph.dependencies_of(target));
    let all_dependents = transitive_dependents(graph, start);
    let risk_level = thresholds.classify(all_dependents.len());

    Ok(ImpactReport {
        file: target.to_owned(),
        dependent_count: all_dependents.len(),
        dependency_count: direct_dependencies.len(),
        impact_summary: impact_summary(all_dependents.len()),
        test_files: find_test_files(target, graph),
        direct_dependents,
        all_dependents,
        direct_dependencies,
        risk_level,
    })
}

/// BFS over incoming import edges. The visited set bounds the walk even if the graph
/// contains cycles; the start node is never reported.
fn transitive_dependents(graph: &DependencyGraph, start: NodeIndex) -> Vec<String> {
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([start]);
    let mut visited: HashSet<NodeIndex> = HashSet::from([start]);

    while let Some(current) = queue.pop_front() {
        for importer in graph.graph.neighbors_directed(current, Direction::Incoming) {
            if visited.insert(importer) {
                queue.push_back(importer);
            }
        }
    }

    let mut out: Vec<String> = visited
        .into_iter()
        .filter(|&idx| idx != start)
        .map(|idx| graph.graph[idx].path.clone())
        .collect();
    out.sort();
    out
}

fn impact_summary(count: usize) -> String {
    match count {
        0 => "No files depend on this - safe to modify".to_owned(),
        1 => "1 file would be affected by changes".to_owned(),
        n => format!("{n} files would be affected by changes"),
    }
}

/// Nodes whose stem contains `test_<stem>`, `<stem>_test`, `<stem>.test` or `<stem>.spec`.
/// Substring matching tolerates prefixes and suffixes such as `test_utils_extra`.
pub fn find_test_files(target: &str, graph: &DependencyGraph) -> Vec<String> {
    let stem = file_stem(target);
    let patterns = [
        format!("test_{stem}"),
        format!("{stem}_test"),
        format!("{stem}.test"),
        format!("{stem}.spec"),
    ];

    graph
        .paths()
        .into_iter()
        .filter(|path| {
            let candidate = file_stem(path);
            patterns.iter().any(|p| candidate.contains(p.as_str()))
        })
        .map(str::to_owned)
        .collect()
}

fn owned_paths(paths: Vec<&str>) -> Vec<String> {
    paths.into_iter().map(str::to_owned).collect()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::detect_language;

    fn graph_from(files: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for f in files {
            graph.add_file(f, detect_language(f));
        }
        for (s, t) in edges {
            graph.add_import_edge(s, t);
        }
        graph
    }

    /// a.ts -> b.ts -> c.ts
    fn three_file_chain() -> DependencyGraph {
        graph_from(&["a.ts", "b.ts", "c.ts"], &[("a.ts", "b.ts"), ("b.ts", "c.ts")])
    }

    #[test]
    fn test_direct_and_transitive_dependents() {
        let graph = three_file_chain();
        let report = analyze("c.ts", &graph).unwrap();
        assert_eq!(report.direct_dependents, vec!["b.ts"]);
        assert_eq!(report.all_dependents, vec!["a.ts", "b.ts"]);
        assert_eq!(report.dependent_count, 2);
        assert!(report.direct_dependencies.is_empty());
        assert_eq!(report.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_direct_dependencies() {
        let graph = three_file_chain();
        let report = analyze("b.ts", &graph).unwrap();
        assert_eq!(report.direct_dependencies, vec!["c.ts"]);
        assert_eq!(report.dependency_count, 1);
        assert_eq!(report.all_dependents, vec!["a.ts"]);
    }

    #[test]
    fn test_missing_target_is_not_found() {
        let graph = three_file_chain();
        let err = analyze("missing.ts", &graph).unwrap_err();
        assert!(matches!(err, Error::NotFound { ref path } if path == "missing.ts"));
    }

    #[test]
    fn test_cycle_terminates_and_excludes_target() {
        let mut graph = graph_from(&["a.ts", "b.ts", "c.ts"], &[("a.ts", "b.ts"), ("b.ts", "c.ts")]);
        graph.add_import_edge("c.ts", "a.ts");
        let report = analyze("a.ts", &graph).unwrap();
        assert_eq!(report.all_dependents, vec!["b.ts", "c.ts"]);
    }

    #[test]
    fn test_unrelated_file_excluded() {
        let graph = graph_from(&["a.ts", "b.ts", "unrelated.ts"], &[("b.ts", "a.ts")]);
        let report = analyze("a.ts", &graph).unwrap();
        assert_eq!(report.all_dependents, vec!["b.ts"]);
    }

    fn fan_in(n: usize) -> DependencyGraph {
        let mut files = vec!["target.py".to_string()];
        files.extend((0..n).map(|i| format!("dep{i}.py")));
        let refs: Vec<&str> = files.iter().map(String::as_str).collect();
        let edges: Vec<(&str, &str)> = refs[1..].iter().map(|d| (*d, "target.py")).collect();
        graph_from(&refs, &edges)
    }

    #[test]
    fn test_risk_thresholds() {
        assert_eq!(analyze("target.py", &fan_in(11)).unwrap().risk_level, RiskLevel::High);
        assert_eq!(analyze("target.py", &fan_in(10)).unwrap().risk_level, RiskLevel::Medium);
        assert_eq!(analyze("target.py", &fan_in(4)).unwrap().risk_level, RiskLevel::Medium);
        assert_eq!(analyze("target.py", &fan_in(3)).unwrap().risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = RiskThresholds { high: 1, medium: 0 };
        let report = analyze_with("target.py", &fan_in(1), &strict).unwrap();
        assert_eq!(report.risk_level, RiskLevel::Medium);
        let report = analyze_with("target.py", &fan_in(2), &strict).unwrap();
        assert_eq!(report.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_impact_summary_wording() {
        assert_eq!(impact_summary(0), "No files depend on this - safe to modify");
        assert_eq!(impact_summary(1), "1 file would be affected by changes");
        assert_eq!(impact_summary(7), "7 files would be affected by changes");
    }

    #[test]
    fn test_find_test_files_patterns() {
        let graph = graph_from(
            &[
                "src/utils.ts",
                "src/utils.test.ts",
                "src/utils.spec.tsx",
                "tests/test_utils.py",
                "tests/utils_test.py",
                "tests/test_utils_extra.py",
                "src/other.test.ts",
                "src/myutils.ts",
            ],
            &[],
        );
        let tests = find_test_files("src/utils.ts", &graph);
        assert_eq!(
            tests,
            vec![
                "src/utils.spec.tsx",
                "src/utils.test.ts",
                "tests/test_utils.py",
                "tests/test_utils_extra.py",
                "tests/utils_test.py",
            ]
        );
    }

    #[test]
    fn test_report_lists_are_sorted() {
        let graph = graph_from(
            &["core.py", "z.py", "a.py", "m.py"],
            &[("z.py", "core.py"), ("a.py", "core.py"), ("m.py", "z.py")],
        );
        let report = analyze("core.py", &graph).unwrap();
        assert_eq!(report.direct_dependents, vec!["a.py", "z.py"]);
        assert_eq!(report.all_dependents, vec!["a.py", "m.py", "z.py"]);
    }
}
