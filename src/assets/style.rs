// src/assets/style.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{ConfigFile, PathConfig};
use crate::errors::{MackerelError, Result};
use crate::fs::FileSystem;
use crate::pipeline::naming::{minified_name, translate_extension};
use crate::pipeline::{run_stage, Stage, StageContext, TaskReport, Toolchain};
use crate::types::AssetKind;

/// Compile the style entry into a readable stylesheet and a minified twin.
///
/// Stage order: compile, fix, report, postprocess (each in turn), then the
/// readable file is written and minified from exactly the written bytes.
#[derive(Debug, Clone)]
pub struct StyleTask {
    pub fs: Arc<dyn FileSystem>,
    pub entry: PathBuf,
    pub dest_dir: PathBuf,
    pub compile: Stage,
    pub fix: Option<Stage>,
    pub report: Option<Stage>,
    pub postprocess: Vec<Stage>,
    pub minify: Stage,
}

impl StyleTask {
    pub fn from_config(
        cfg: &ConfigFile,
        paths: &PathConfig,
        fs: Arc<dyn FileSystem>,
        tools: &Toolchain,
    ) -> Self {
        let s = &cfg.style;
        Self {
            fs,
            entry: paths.source_dir(AssetKind::Style).join(&s.entry),
            dest_dir: paths.dest_dir(AssetKind::Style).to_path_buf(),
            compile: Stage::rewrite("compile", tools.command(&s.compile)),
            fix: s.fix.as_deref().map(|c| Stage::fix("fix", tools.command(c))),
            report: s
                .report
                .as_deref()
                .map(|c| Stage::advisory("report", tools.command(c))),
            postprocess: s
                .postprocess
                .iter()
                .enumerate()
                .map(|(i, c)| Stage::rewrite(format!("postprocess[{i}]"), tools.command(c)))
                .collect(),
            minify: Stage::rewrite("minify", tools.command(&s.minify)),
        }
    }

    /// Readable stylesheet path; the minified one is derived from it.
    pub fn output_path(&self) -> Result<PathBuf> {
        let name = self.entry.file_name().ok_or_else(|| {
            MackerelError::ConfigError(format!("style entry {:?} has no file name", self.entry))
        })?;
        Ok(self.dest_dir.join(translate_extension(Path::new(name), "css")))
    }

    pub async fn build(&self) -> Result<TaskReport> {
        let task = AssetKind::Style.task_name();
        let mut report = TaskReport::new(task);

        if !self.fs.is_file(&self.entry) {
            info!(task, entry = ?self.entry, "style entry not found; nothing to build");
            return Ok(report);
        }

        let ctx = StageContext::new(task, Some(self.entry.clone()));
        let mut content = self.fs.read(&self.entry)?;

        let stages = std::iter::once(&self.compile)
            .chain(self.fix.as_ref())
            .chain(self.report.as_ref())
            .chain(self.postprocess.iter());
        for stage in stages {
            content = run_stage(stage, content, &ctx, &mut report).await?;
        }

        let readable = self.output_path()?;
        self.fs.write(&readable, &content)?;
        report.written.push(readable.clone());
        debug!(task, path = ?readable, bytes = content.len(), "wrote readable stylesheet");

        let minified = run_stage(&self.minify, content, &ctx, &mut report).await?;
        let min_path = minified_name(&readable);
        self.fs.write(&min_path, &minified)?;
        report.written.push(min_path);

        Ok(report)
    }
}
