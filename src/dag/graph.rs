// src/dag/graph.rs

use std::collections::BTreeMap;
use std::fmt;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{MackerelError, Result};

/// Canonical task name type used throughout the task graph.
pub type TaskName = String;

/// What a series does when one of its steps fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesPolicy {
    /// Skip the remaining steps.
    #[default]
    Abort,
    /// Log the failure and keep going; the series still reports failure.
    Continue,
}

/// A composition of named tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskNode {
    Task(TaskName),
    /// Steps run one after another; each starts after the previous settled.
    Series {
        policy: SeriesPolicy,
        steps: Vec<TaskNode>,
    },
    /// Steps start concurrently; the node settles when all of them have.
    Parallel(Vec<TaskNode>),
}

impl TaskNode {
    pub fn task(name: impl Into<TaskName>) -> Self {
        TaskNode::Task(name.into())
    }

    pub fn series(steps: Vec<TaskNode>) -> Self {
        TaskNode::Series {
            policy: SeriesPolicy::Abort,
            steps,
        }
    }

    pub fn series_continue(steps: Vec<TaskNode>) -> Self {
        TaskNode::Series {
            policy: SeriesPolicy::Continue,
            steps,
        }
    }

    pub fn parallel(steps: Vec<TaskNode>) -> Self {
        TaskNode::Parallel(steps)
    }

    /// Every task name this node refers to, in first-appearance order.
    pub fn referenced_tasks(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TaskNode::Task(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            TaskNode::Series { steps, .. } | TaskNode::Parallel(steps) => {
                for step in steps {
                    step.collect_refs(out);
                }
            }
        }
    }
}

impl fmt::Display for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, steps) = match self {
            TaskNode::Task(name) => return f.write_str(name),
            TaskNode::Series {
                policy: SeriesPolicy::Abort,
                steps,
            } => ("series", steps),
            TaskNode::Series {
                policy: SeriesPolicy::Continue,
                steps,
            } => ("series_continue", steps),
            TaskNode::Parallel(steps) => ("parallel", steps),
        };
        write!(f, "{label}(")?;
        for (i, step) in steps.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{step}")?;
        }
        f.write_str(")")
    }
}

/// Check that composites only reference known names and never reach
/// themselves.
///
/// `known` holds every registered name; `composites` maps composite names
/// to their definitions.
pub fn validate_composites<'a, I>(known: I, composites: &BTreeMap<TaskName, TaskNode>) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    // Edge direction: referenced -> composite.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for name in known {
        graph.add_node(name);
    }

    for (name, node) in composites {
        for dep in node.referenced_tasks() {
            if !graph.contains_node(dep) {
                return Err(MackerelError::TaskNotFound(format!(
                    "'{dep}' (referenced by '{name}')"
                )));
            }
            graph.add_edge(dep, name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(MackerelError::TaskCycle(format!(
            "cycle detected in task graph involving task '{}'",
            cycle.node_id()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_nests() {
        let node = TaskNode::series_continue(vec![
            TaskNode::task("browserSync-init"),
            TaskNode::parallel(vec![TaskNode::task("html"), TaskNode::task("css")]),
            TaskNode::task("watch"),
        ]);
        assert_eq!(
            node.to_string(),
            "series_continue(browserSync-init, parallel(html, css), watch)"
        );
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut composites = BTreeMap::new();
        composites.insert("a".to_string(), TaskNode::series(vec![TaskNode::task("a")]));
        let err = validate_composites(["a"], &composites).unwrap_err();
        assert!(matches!(err, MackerelError::TaskCycle(_)));
    }

    #[test]
    fn unknown_reference_is_reported() {
        let mut composites = BTreeMap::new();
        composites.insert("a".to_string(), TaskNode::parallel(vec![TaskNode::task("nope")]));
        let err = validate_composites(["a"], &composites).unwrap_err();
        assert!(matches!(err, MackerelError::TaskNotFound(_)));
    }
}
