// src/assets/template.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::config::{ConfigFile, PathConfig};
use crate::errors::{MackerelError, Result};
use crate::fs::FileSystem;
use crate::pipeline::naming::translate_extension;
use crate::pipeline::{run_stage, Stage, StageContext, TaskReport, Toolchain};
use crate::types::AssetKind;

/// Compile one template entry into one markup file.
#[derive(Debug, Clone)]
pub struct TemplateTask {
    pub fs: Arc<dyn FileSystem>,
    pub entry: PathBuf,
    pub dest_dir: PathBuf,
    pub output_extension: String,
    pub compile: Stage,
    pub validate: Option<Stage>,
}

impl TemplateTask {
    pub fn from_config(
        cfg: &ConfigFile,
        paths: &PathConfig,
        fs: Arc<dyn FileSystem>,
        tools: &Toolchain,
    ) -> Self {
        let t = &cfg.template;
        Self {
            fs,
            entry: paths.source_dir(AssetKind::Template).join(&t.entry),
            dest_dir: paths.dest_dir(AssetKind::Template).to_path_buf(),
            output_extension: t.output_extension.clone(),
            compile: Stage::rewrite("compile", tools.command(&t.compile)),
            validate: t
                .validate
                .as_deref()
                .map(|cmd| Stage::advisory("validate", tools.command(cmd))),
        }
    }

    /// Where the compiled entry lands.
    pub fn output_path(&self) -> Result<PathBuf> {
        let name = self.entry.file_name().ok_or_else(|| {
            MackerelError::ConfigError(format!("template entry {:?} has no file name", self.entry))
        })?;
        Ok(self
            .dest_dir
            .join(translate_extension(Path::new(name), &self.output_extension)))
    }

    pub async fn build(&self) -> Result<TaskReport> {
        let task = AssetKind::Template.task_name();
        let mut report = TaskReport::new(task);

        if !self.fs.is_file(&self.entry) {
            info!(task, entry = ?self.entry, "template entry not found; nothing to build");
            return Ok(report);
        }

        let ctx = StageContext::new(task, Some(self.entry.clone()));
        let source = self.fs.read(&self.entry)?;

        let mut content = run_stage(&self.compile, source, &ctx, &mut report).await?;
        if let Some(validate) = &self.validate {
            content = run_stage(validate, content, &ctx, &mut report).await?;
        }

        let out = self.output_path()?;
        self.fs.write(&out, &content)?;
        report.written.push(out);

        Ok(report)
    }
}
