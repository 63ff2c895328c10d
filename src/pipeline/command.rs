// src/pipeline/command.rs

use std::path::PathBuf;

use crate::exec::process::{run_with_input, ProcessSpec};
use crate::pipeline::diagnostics::parse_diagnostics;
use crate::pipeline::{BoxFuture, StageContext, Transform, TransformOutput};

/// Environment variable carrying the task name into tool commands.
pub const TASK_ENV_VAR: &str = "MACKEREL_TASK";
/// Environment variable carrying the processed source file into tool commands.
pub const FILE_ENV_VAR: &str = "MACKEREL_FILE";

/// A transform backed by an external shell command.
///
/// Content goes in on stdin and comes back on stdout; stderr lines become
/// diagnostics. The command runs in the project root.
#[derive(Debug, Clone)]
pub struct CommandTransform {
    cmd: String,
    cwd: PathBuf,
}

impl CommandTransform {
    pub fn new(cmd: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            cmd: cmd.into(),
            cwd: cwd.into(),
        }
    }

    fn spec(&self, ctx: &StageContext) -> ProcessSpec {
        let mut spec = ProcessSpec::new(self.cmd.clone(), self.cwd.clone())
            .env(TASK_ENV_VAR, ctx.task.clone());
        if let Some(file) = &ctx.file {
            spec = spec.env(FILE_ENV_VAR, file.to_string_lossy());
        }
        spec
    }
}

impl Transform for CommandTransform {
    fn label(&self) -> &str {
        &self.cmd
    }

    fn apply<'a>(
        &'a self,
        input: &'a [u8],
        ctx: &'a StageContext,
    ) -> BoxFuture<'a, anyhow::Result<TransformOutput>> {
        Box::pin(async move {
            let output = run_with_input(&self.spec(ctx), input).await?;
            Ok(TransformOutput {
                content: output.stdout,
                diagnostics: parse_diagnostics(&output.stderr),
                success: output.success,
            })
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_variable_is_visible_to_the_command() {
        let t = CommandTransform::new("cat; printf ' %s' \"$(basename \"$MACKEREL_FILE\")\"", ".");
        let ctx = StageContext::new("html", Some(PathBuf::from("/site/src/pug/index.pug")));
        let out = t.apply(b"<p>", &ctx).await.unwrap();
        assert!(out.success);
        assert_eq!(out.content, b"<p> index.pug");
    }

    #[tokio::test]
    async fn stderr_lines_become_diagnostics() {
        let t = CommandTransform::new("echo 'in.scss:2:3: expected \"}\"' >&2; exit 1", ".");
        let out = t.apply(b"", &StageContext::new("css", None)).await.unwrap();
        assert!(!out.success);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].line, Some(2));
    }
}
