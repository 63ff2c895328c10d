use std::sync::{Arc, Mutex};
use std::time::Duration;

use mackerel::dag::{Runner, TaskAction};
use mackerel::errors::{MackerelError, Result};
use mackerel::pipeline::{BoxFuture, TaskReport};

/// Shared, ordered event log written by [`RecordingAction`]s.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }
}

/// A task that logs `start:<name>` / `end:<name>`, optionally sleeping in
/// between and optionally failing.
#[derive(Debug)]
pub struct RecordingAction {
    name: String,
    log: EventLog,
    delay: Duration,
    fail: bool,
}

impl RecordingAction {
    pub fn new(name: &str, log: &EventLog) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            log: log.clone(),
            delay: Duration::ZERO,
            fail: false,
        })
    }

    pub fn slow(name: &str, log: &EventLog, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            log: log.clone(),
            delay,
            fail: false,
        })
    }

    pub fn failing(name: &str, log: &EventLog) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            log: log.clone(),
            delay: Duration::ZERO,
            fail: true,
        })
    }
}

impl TaskAction for RecordingAction {
    fn run<'a>(&'a self, _runner: &'a Runner) -> BoxFuture<'a, Result<TaskReport>> {
        Box::pin(async move {
            self.log.push(format!("start:{}", self.name));
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.log.push(format!("end:{}", self.name));

            if self.fail {
                return Err(MackerelError::StageFailed {
                    task: self.name.clone(),
                    stage: "fake".to_string(),
                    detail: "configured to fail".to_string(),
                });
            }
            Ok(TaskReport::new(self.name.clone()))
        })
    }
}
