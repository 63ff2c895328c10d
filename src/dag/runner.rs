// src/dag/runner.rs

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::dag::graph::{SeriesPolicy, TaskNode};
use crate::dag::registry::{TaskEntry, TaskRegistry};
use crate::errors::{MackerelError, Result};
use crate::pipeline::BoxFuture;

/// Outcome of running a task or composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

impl TaskOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, TaskOutcome::Success)
    }

    fn and(self, other: TaskOutcome) -> TaskOutcome {
        if self.is_success() && other.is_success() {
            TaskOutcome::Success
        } else {
            TaskOutcome::Failed
        }
    }
}

/// Runs tasks from a shared registry.
///
/// Task failures are logged and folded into [`TaskOutcome::Failed`]; they
/// never tear down the caller.
#[derive(Debug, Clone)]
pub struct Runner {
    registry: Arc<TaskRegistry>,
}

impl Runner {
    pub fn new(registry: Arc<TaskRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Run a registered task by name.
    pub async fn run(&self, name: &str) -> Result<TaskOutcome> {
        if !self.registry.contains(name) {
            return Err(MackerelError::TaskNotFound(name.to_string()));
        }
        Ok(self.run_node(TaskNode::task(name)).await)
    }

    /// Run an arbitrary composition over registered tasks.
    pub fn run_node(&self, node: TaskNode) -> BoxFuture<'static, TaskOutcome> {
        let runner = self.clone();
        Box::pin(async move {
            match node {
                TaskNode::Task(name) => runner.run_named(&name).await,
                TaskNode::Series { policy, steps } => runner.run_series(policy, steps).await,
                TaskNode::Parallel(steps) => runner.run_parallel(steps).await,
            }
        })
    }

    async fn run_named(&self, name: &str) -> TaskOutcome {
        let entry = match self.registry.get(name) {
            Some(entry) => entry.clone(),
            None => {
                error!(task = %name, "task not registered");
                return TaskOutcome::Failed;
            }
        };

        match entry {
            TaskEntry::Composite(node) => self.run_node(node).await,
            TaskEntry::Action(action) => {
                info!(task = %name, "starting task");
                let started = Instant::now();
                match action.run(self).await {
                    Ok(report) => {
                        info!(
                            task = %name,
                            written = report.written.len(),
                            warnings = report.diagnostics.len(),
                            failed_files = report.failures.len(),
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "finished task"
                        );
                        TaskOutcome::Success
                    }
                    Err(e) => {
                        error!(task = %name, error = %e, "task failed");
                        TaskOutcome::Failed
                    }
                }
            }
        }
    }

    async fn run_series(&self, policy: SeriesPolicy, steps: Vec<TaskNode>) -> TaskOutcome {
        let mut outcome = TaskOutcome::Success;
        let total = steps.len();
        for (i, step) in steps.into_iter().enumerate() {
            let label = step.to_string();
            let step_outcome = self.run_node(step).await;
            outcome = outcome.and(step_outcome);

            if !step_outcome.is_success() && policy == SeriesPolicy::Abort {
                let skipped = total - i - 1;
                if skipped > 0 {
                    warn!(step = %label, skipped, "step failed; skipping the rest of the series");
                }
                break;
            }
        }
        outcome
    }

    async fn run_parallel(&self, steps: Vec<TaskNode>) -> TaskOutcome {
        let mut set = JoinSet::new();
        for step in steps {
            set.spawn(self.run_node(step));
        }

        let mut outcome = TaskOutcome::Success;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(step_outcome) => outcome = outcome.and(step_outcome),
                Err(e) => {
                    error!(error = %e, "parallel step panicked or was cancelled");
                    outcome = TaskOutcome::Failed;
                }
            }
        }
        outcome
    }
}
