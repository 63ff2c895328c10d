// src/exec/process.rs

//! Running one external tool invocation.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

/// A shell command plus the environment it runs in.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub cmd: String,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
}

impl ProcessSpec {
    pub fn new(cmd: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            cmd: cmd.into(),
            cwd: cwd.into(),
            env: Vec::new(),
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub success: bool,
}

/// Build a shell command appropriate for the platform.
fn shell_command(cmd: &str, cwd: &Path) -> Command {
    let mut c = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };
    c.current_dir(cwd);
    c
}

/// Run `spec`, feeding `input` on stdin and collecting stdout/stderr.
///
/// Only spawn/IO problems are errors; a non-zero exit is reported through
/// [`ProcessOutput::success`] so callers can apply their own failure policy.
pub async fn run_with_input(spec: &ProcessSpec, input: &[u8]) -> Result<ProcessOutput> {
    debug!(cmd = %spec.cmd, cwd = ?spec.cwd, input_len = input.len(), "spawning tool process");

    let mut cmd = shell_command(&spec.cmd, &spec.cwd);
    for (k, v) in &spec.env {
        cmd.env(k, v);
    }
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for command '{}'", spec.cmd))?;

    // Feed stdin from a separate task so a tool that writes before it has
    // read everything cannot deadlock against us.
    let stdin_task = child.stdin.take().map(|mut stdin| {
        let input = input.to_vec();
        tokio::spawn(async move {
            let res = stdin.write_all(&input).await;
            drop(stdin);
            res
        })
    });

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for process of command '{}'", spec.cmd))?;

    if let Some(task) = stdin_task {
        match task.await {
            Ok(Ok(())) => {}
            // Tools that ignore stdin close it early; that's not an error.
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                trace!(cmd = %spec.cmd, "tool closed stdin early");
            }
            Ok(Err(e)) => {
                return Err(e).with_context(|| format!("writing stdin of '{}'", spec.cmd));
            }
            Err(join_err) => {
                return Err(join_err).with_context(|| format!("stdin writer for '{}'", spec.cmd));
            }
        }
    }

    let exit_code = output.status.code();
    debug!(
        cmd = %spec.cmd,
        exit_code = exit_code.unwrap_or(-1),
        stdout_len = output.stdout.len(),
        "tool process exited"
    );

    Ok(ProcessOutput {
        stdout: output.stdout,
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code,
        success: output.status.success(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pipes_stdin_to_stdout() {
        let spec = ProcessSpec::new("tr a-z A-Z", ".");
        let out = run_with_input(&spec, b"body { color: red }").await.unwrap();
        assert!(out.success);
        assert_eq!(out.stdout, b"BODY { COLOR: RED }");
    }

    #[tokio::test]
    async fn reports_exit_code_and_stderr() {
        let spec = ProcessSpec::new("echo 'bad thing' >&2; exit 3", ".");
        let out = run_with_input(&spec, b"").await.unwrap();
        assert!(!out.success);
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stderr.trim(), "bad thing");
    }

    #[tokio::test]
    async fn passes_environment() {
        let spec = ProcessSpec::new("printf '%s' \"$MACKEREL_TASK\"", ".").env("MACKEREL_TASK", "css");
        let out = run_with_input(&spec, b"").await.unwrap();
        assert_eq!(out.stdout, b"css");
    }
}
