// src/watch/binding.rs

use crate::dag::{TaskName, TaskNode};
use crate::types::AssetKind;

/// What runs when a category's sources change.
///
/// The task list ends with the reload task whenever a dev server is
/// configured. Steps run strictly in order and every step runs even if an
/// earlier one failed, so a broken source still reaches the reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchBinding {
    pub kind: AssetKind,
    pub tasks: Vec<TaskName>,
}

impl WatchBinding {
    pub fn new(kind: AssetKind, reload_task: Option<&str>) -> Self {
        let mut tasks = vec![kind.task_name().to_string()];
        tasks.extend(reload_task.map(str::to_string));
        Self { kind, tasks }
    }

    pub fn node(&self) -> TaskNode {
        TaskNode::series_continue(self.tasks.iter().map(TaskNode::task).collect())
    }
}

/// One binding per category.
pub fn standard_bindings(reload_task: Option<&str>) -> Vec<WatchBinding> {
    AssetKind::ALL
        .iter()
        .map(|&kind| WatchBinding::new(kind, reload_task))
        .collect()
}
