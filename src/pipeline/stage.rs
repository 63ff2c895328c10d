// src/pipeline/stage.rs

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::errors::{MackerelError, Result};
use crate::pipeline::diagnostics::parse_diagnostics;
use crate::pipeline::{CheckPolicy, Diagnostic, Stage, StageRole, TaskReport};

/// Per-invocation context handed to transforms.
#[derive(Debug, Clone)]
pub struct StageContext {
    pub task: String,
    /// Source file being processed, when the content came from one file.
    pub file: Option<PathBuf>,
}

impl StageContext {
    pub fn new(task: impl Into<String>, file: Option<PathBuf>) -> Self {
        Self {
            task: task.into(),
            file,
        }
    }
}

fn log_diagnostics(ctx: &StageContext, stage: &Stage, diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        warn!(task = %ctx.task, stage = %stage.name, "{}", d);
    }
}

/// Run one stage over `content` and return the content for the next stage.
///
/// Advisory findings are appended to `report.diagnostics`.
pub async fn run_stage(
    stage: &Stage,
    content: Vec<u8>,
    ctx: &StageContext,
    report: &mut TaskReport,
) -> Result<Vec<u8>> {
    debug!(
        task = %ctx.task,
        stage = %stage.name,
        tool = %stage.transform.label(),
        "running stage"
    );

    let output = stage
        .transform
        .apply(&content, ctx)
        .await
        .map_err(|e| MackerelError::StageFailed {
            task: ctx.task.clone(),
            stage: stage.name.clone(),
            detail: format!("{e:#}"),
        })?;

    match stage.role {
        StageRole::Rewrite => {
            if !output.success {
                log_diagnostics(ctx, stage, &output.diagnostics);
                let detail = output
                    .diagnostics
                    .first()
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "tool exited with failure".to_string());
                return Err(MackerelError::StageFailed {
                    task: ctx.task.clone(),
                    stage: stage.name.clone(),
                    detail,
                });
            }
            Ok(output.content)
        }
        StageRole::Fix => {
            if output.success {
                return Ok(output.content);
            }
            log_diagnostics(ctx, stage, &output.diagnostics);
            report.diagnostics.extend(output.diagnostics);
            // Fixers exit non-zero when problems remain but still print
            // the fixed content. Only an empty result means nothing usable.
            if output.content.is_empty() {
                info!(
                    task = %ctx.task,
                    stage = %stage.name,
                    "auto-fix produced no output; keeping previous content"
                );
                Ok(content)
            } else {
                info!(
                    task = %ctx.task,
                    stage = %stage.name,
                    "auto-fix left unfixable problems; keeping fixed content"
                );
                Ok(output.content)
            }
        }
        StageRole::Check(policy) => {
            // Checkers print findings on stdout or stderr depending on the tool.
            let mut findings = parse_diagnostics(&String::from_utf8_lossy(&output.content));
            findings.extend(output.diagnostics);

            if output.success {
                if !findings.is_empty() {
                    log_diagnostics(ctx, stage, &findings);
                    report.diagnostics.extend(findings);
                }
                return Ok(content);
            }

            log_diagnostics(ctx, stage, &findings);
            match policy {
                CheckPolicy::Advisory => {
                    warn!(
                        task = %ctx.task,
                        stage = %stage.name,
                        problems = findings.len(),
                        "advisory check failed; continuing"
                    );
                    report.diagnostics.extend(findings);
                    Ok(content)
                }
                CheckPolicy::FailOnError => Err(MackerelError::LintFailed {
                    task: ctx.task.clone(),
                    stage: stage.name.clone(),
                    count: findings.len().max(1),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::pipeline::{BoxFuture, Transform, TransformOutput};

    #[derive(Debug)]
    struct Canned {
        out: &'static str,
        success: bool,
    }

    impl Transform for Canned {
        fn label(&self) -> &str {
            "canned"
        }

        fn apply<'a>(
            &'a self,
            _input: &'a [u8],
            _ctx: &'a StageContext,
        ) -> BoxFuture<'a, anyhow::Result<TransformOutput>> {
            Box::pin(async move {
                Ok(TransformOutput {
                    content: self.out.as_bytes().to_vec(),
                    diagnostics: Vec::new(),
                    success: self.success,
                })
            })
        }
    }

    fn canned(out: &'static str, success: bool) -> Arc<dyn Transform> {
        Arc::new(Canned { out, success })
    }

    fn ctx() -> StageContext {
        StageContext::new("css", None)
    }

    #[tokio::test]
    async fn rewrite_replaces_content_or_fails() {
        let mut report = TaskReport::new("css");
        let ok = Stage::rewrite("compile", canned("a{}", true));
        let out = run_stage(&ok, b"a {}".to_vec(), &ctx(), &mut report).await.unwrap();
        assert_eq!(out, b"a{}");

        let bad = Stage::rewrite("compile", canned("", false));
        let err = run_stage(&bad, b"a {".to_vec(), &ctx(), &mut report)
            .await
            .unwrap_err();
        assert!(matches!(err, MackerelError::StageFailed { .. }));
    }

    #[tokio::test]
    async fn fix_keeps_fixed_output_when_problems_remain() {
        let mut report = TaskReport::new("css");
        let stage = Stage::fix("fix", canned("a { color: red; }", false));
        let out = run_stage(&stage, b"a{color:red}".to_vec(), &ctx(), &mut report)
            .await
            .unwrap();
        assert_eq!(out, b"a { color: red; }");
    }

    #[tokio::test]
    async fn fix_keeps_input_when_tool_prints_nothing() {
        let mut report = TaskReport::new("css");
        let stage = Stage::fix("fix", canned("", false));
        let out = run_stage(&stage, b"a {}".to_vec(), &ctx(), &mut report).await.unwrap();
        assert_eq!(out, b"a {}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fix_command_exiting_non_zero_still_applies_its_output() {
        use crate::pipeline::CommandTransform;

        let mut report = TaskReport::new("css");
        let fixer = CommandTransform::new(
            "printf 'a { color: red; }'; echo 'x.css:1:1: unfixable' >&2; exit 2",
            std::env::temp_dir(),
        );
        let stage = Stage::fix("fix", Arc::new(fixer));
        let out = run_stage(&stage, b"a{color:red}".to_vec(), &ctx(), &mut report)
            .await
            .unwrap();
        assert_eq!(out, b"a { color: red; }");
        assert_eq!(report.diagnostics.len(), 1);
    }

    #[tokio::test]
    async fn advisory_check_passes_content_through_and_records_findings() {
        let mut report = TaskReport::new("css");
        let stage = Stage::advisory("report", canned("x.css:1:1: bad indent", false));
        let out = run_stage(&stage, b"a {}".to_vec(), &ctx(), &mut report).await.unwrap();
        assert_eq!(out, b"a {}");
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].line, Some(1));
    }

    #[tokio::test]
    async fn gate_check_fails_the_task() {
        let mut report = TaskReport::new("js");
        let stage = Stage::gate("lint", canned("1:1 error no-undef", false));
        let err = run_stage(&stage, b"x".to_vec(), &StageContext::new("js", None), &mut report)
            .await
            .unwrap_err();
        assert!(matches!(err, MackerelError::LintFailed { count: 1, .. }));
    }
}
