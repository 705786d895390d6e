// SPDX-License-Identifier: MIT OR Apache-2.0
//! Plain-text rendering of validation results.

use pgraph_editor_graph::{GraphStore, IssueCounts, Severity, ValidationReport};

/// Totals over a whole graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    /// Nodes in the graph
    pub nodes: usize,
    /// Nodes reachable from a start node
    pub reachable: usize,
    /// Issue totals
    pub counts: IssueCounts,
}

impl ReportSummary {
    /// Sum up a report
    pub fn new(graph: &GraphStore, report: &ValidationReport) -> Self {
        let counts = report
            .iter()
            .map(|(id, _)| report.counts(id))
            .fold(IssueCounts::default(), |mut total, c| {
                total.errors += c.errors;
                total.warnings += c.warnings;
                total.info += c.info;
                total
            });
        Self {
            nodes: graph.node_count(),
            reachable: report.reachable().len(),
            counts,
        }
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
    }
}

/// Render one line per issue, grouped by node, then a summary line
pub fn render(graph: &GraphStore, report: &ValidationReport) -> String {
    let mut lines: Vec<String> = report
        .iter()
        .flat_map(|(id, issues)| {
            let name = graph.node(id).map_or("<removed>", |n| n.name.as_str());
            issues.iter().map(move |issue| {
                format!(
                    "{}: [{name}] {}",
                    severity_label(issue.severity),
                    issue.message()
                )
            })
        })
        .collect();

    let unreachable: Vec<&str> = graph
        .nodes()
        .filter(|n| !report.is_reachable(n.id))
        .map(|n| n.name.as_str())
        .collect();
    if !unreachable.is_empty() {
        lines.push(format!("skipped (not reachable): {}", unreachable.join(", ")));
    }

    let summary = ReportSummary::new(graph, report);
    lines.push(format!(
        "{} nodes, {} reachable, {} errors, {} warnings",
        summary.nodes, summary.reachable, summary.counts.errors, summary.counts.warnings
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgraph_editor_graph::{validate, DataType, FunctionConfig, Node};

    #[test]
    fn test_render_lists_issues_and_unreachable() {
        let mut graph = GraphStore::new();
        let s = graph.add_node(Node::start("Start"));
        let config = FunctionConfig::new("sum").with_input("a", DataType::Int32);
        let f = graph.add_node(Node::function(&config, "sum"));
        graph.add_node(Node::function(&config, "orphan"));
        let out = graph.node(s).unwrap().ports.control_output.id;
        let inp = graph.node(f).unwrap().ports.control_input.id;
        graph.connect(s, out, f, inp).unwrap();

        let report = validate(&graph);
        let text = render(&graph, &report);
        assert!(text.contains("error: [sum] Input \"a\" is not mapped to a variable"));
        assert!(text.contains("skipped (not reachable): orphan"));
        assert!(text.ends_with("3 nodes, 2 reachable, 1 errors, 0 warnings\n"));

        let summary = ReportSummary::new(&graph, &report);
        assert_eq!(summary.counts.errors, 1);
    }

    #[test]
    fn test_render_clean_graph() {
        let mut graph = GraphStore::new();
        graph.add_node(Node::start("Start"));
        let report = validate(&graph);
        assert_eq!(render(&graph, &report), "1 nodes, 1 reachable, 0 errors, 0 warnings\n");
    }
}
