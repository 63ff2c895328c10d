// src/dag/registry.rs

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::dag::graph::{validate_composites, TaskName, TaskNode};
use crate::dag::runner::Runner;
use crate::errors::{MackerelError, Result};
use crate::pipeline::{BoxFuture, TaskReport};

/// A leaf task: something that does work when invoked by name.
///
/// The runner is passed in so service tasks (like `watch`) can schedule
/// further task runs later on.
pub trait TaskAction: Send + Sync + Debug {
    fn run<'a>(&'a self, runner: &'a Runner) -> BoxFuture<'a, Result<TaskReport>>;
}

#[derive(Debug, Clone)]
pub enum TaskEntry {
    Action(Arc<dyn TaskAction>),
    Composite(TaskNode),
}

/// Immutable name → task table. Built once, then shared by every run.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    entries: BTreeMap<TaskName, TaskEntry>,
}

impl TaskRegistry {
    pub fn builder() -> TaskRegistryBuilder {
        TaskRegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&TaskEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &TaskEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Debug, Default)]
pub struct TaskRegistryBuilder {
    entries: BTreeMap<TaskName, TaskEntry>,
    duplicates: Vec<TaskName>,
}

impl TaskRegistryBuilder {
    fn insert(mut self, name: TaskName, entry: TaskEntry) -> Self {
        if self.entries.insert(name.clone(), entry).is_some() {
            self.duplicates.push(name);
        }
        self
    }

    pub fn action(self, name: impl Into<TaskName>, action: Arc<dyn TaskAction>) -> Self {
        self.insert(name.into(), TaskEntry::Action(action))
    }

    pub fn composite(self, name: impl Into<TaskName>, node: TaskNode) -> Self {
        self.insert(name.into(), TaskEntry::Composite(node))
    }

    /// Validate and freeze the registry.
    ///
    /// Fails on duplicate names, references to unknown names and cycles
    /// between composites.
    pub fn build(self) -> Result<TaskRegistry> {
        if let Some(dup) = self.duplicates.first() {
            return Err(MackerelError::ConfigError(format!(
                "task '{dup}' registered more than once"
            )));
        }

        let composites: BTreeMap<TaskName, TaskNode> = self
            .entries
            .iter()
            .filter_map(|(name, entry)| match entry {
                TaskEntry::Composite(node) => Some((name.clone(), node.clone())),
                TaskEntry::Action(_) => None,
            })
            .collect();
        validate_composites(self.entries.keys().map(|s| s.as_str()), &composites)?;

        Ok(TaskRegistry {
            entries: self.entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Noop;

    impl TaskAction for Noop {
        fn run<'a>(&'a self, _runner: &'a Runner) -> BoxFuture<'a, Result<TaskReport>> {
            Box::pin(async { Ok(TaskReport::new("noop")) })
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = TaskRegistry::builder()
            .action("html", Arc::new(Noop))
            .action("html", Arc::new(Noop))
            .build()
            .unwrap_err();
        assert!(matches!(err, MackerelError::ConfigError(_)));
    }

    #[test]
    fn composites_may_nest() {
        let reg = TaskRegistry::builder()
            .action("html", Arc::new(Noop))
            .action("css", Arc::new(Noop))
            .composite(
                "build",
                TaskNode::parallel(vec![TaskNode::task("html"), TaskNode::task("css")]),
            )
            .composite("default", TaskNode::series(vec![TaskNode::task("build")]))
            .build()
            .unwrap();
        assert_eq!(reg.names().collect::<Vec<_>>(), ["build", "css", "default", "html"]);
    }

    #[test]
    fn mutual_composites_are_a_cycle() {
        let err = TaskRegistry::builder()
            .composite("a", TaskNode::series(vec![TaskNode::task("b")]))
            .composite("b", TaskNode::series(vec![TaskNode::task("a")]))
            .build()
            .unwrap_err();
        assert!(matches!(err, MackerelError::TaskCycle(_)));
    }
}
