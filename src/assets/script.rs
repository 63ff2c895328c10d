// src/assets/script.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::GlobSet;
use tracing::{debug, info};

use crate::config::{ConfigFile, PathConfig};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::pipeline::naming::minified_name;
use crate::pipeline::sources::{build_globset, collect_sorted};
use crate::pipeline::{run_stage, Stage, StageContext, TaskReport, Toolchain};
use crate::types::AssetKind;

/// Concatenate every script source into one bundle, transpile, lint and
/// minify it.
///
/// The lint stage is a gate: when it fails nothing is written, neither the
/// bundle nor its minified twin.
#[derive(Debug, Clone)]
pub struct ScriptTask {
    pub fs: Arc<dyn FileSystem>,
    pub src_dir: PathBuf,
    pub include: GlobSet,
    pub dest_dir: PathBuf,
    pub bundle: String,
    pub separator: String,
    pub transpile: Stage,
    pub lint: Option<Stage>,
    pub minify: Stage,
}

impl ScriptTask {
    pub fn from_config(
        cfg: &ConfigFile,
        paths: &PathConfig,
        fs: Arc<dyn FileSystem>,
        tools: &Toolchain,
    ) -> Result<Self> {
        let s = &cfg.script;
        Ok(Self {
            fs,
            src_dir: paths.source_dir(AssetKind::Script).to_path_buf(),
            include: build_globset(&s.include)?,
            dest_dir: paths.dest_dir(AssetKind::Script).to_path_buf(),
            bundle: s.bundle.clone(),
            separator: s.separator.clone(),
            transpile: Stage::rewrite("transpile", tools.command(&s.transpile)),
            lint: s.lint.as_deref().map(|c| Stage::gate("lint", tools.command(c))),
            minify: Stage::rewrite("minify", tools.command(&s.minify)),
        })
    }

    pub fn bundle_path(&self) -> PathBuf {
        self.dest_dir.join(&self.bundle)
    }

    pub async fn build(&self) -> Result<TaskReport> {
        let task = AssetKind::Script.task_name();
        let mut report = TaskReport::new(task);

        let sources = collect_sorted(self.fs.as_ref(), &self.src_dir, &self.include)?;
        if sources.is_empty() {
            info!(task, dir = ?self.src_dir, "no script sources; nothing to build");
            return Ok(report);
        }
        debug!(task, files = sources.len(), "concatenating script sources");

        let ctx = StageContext::new(task, None);
        let bundle = concat_sources(self.fs.as_ref(), &sources, &self.separator)?;

        let content = run_stage(&self.transpile, bundle, &ctx, &mut report).await?;
        let content = match &self.lint {
            Some(lint) => run_stage(lint, content, &ctx, &mut report).await?,
            None => content,
        };
        // Minify before writing so a failing minifier leaves no half-built output.
        let minified = run_stage(&self.minify, content.clone(), &ctx, &mut report).await?;

        let out = self.bundle_path();
        self.fs.write(&out, &content)?;
        report.written.push(out.clone());

        let min_path = minified_name(&out);
        self.fs.write(&min_path, &minified)?;
        report.written.push(min_path);

        Ok(report)
    }
}

/// Join the contents of `files`, in order, with `separator` between them.
pub fn concat_sources(fs: &dyn FileSystem, files: &[PathBuf], separator: &str) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for (i, file) in files.iter().enumerate() {
        if i > 0 {
            out.extend_from_slice(separator.as_bytes());
        }
        out.extend(fs.read(Path::new(file))?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn separator_only_between_files() {
        let fs = MockFileSystem::new();
        fs.add_file("/a.js", b"a();".to_vec());
        fs.add_file("/b.js", b"b();".to_vec());

        let files = vec![PathBuf::from("/a.js"), PathBuf::from("/b.js")];
        let out = concat_sources(&fs, &files, "\n").unwrap();
        assert_eq!(out, b"a();\nb();");

        let single = concat_sources(&fs, &files[..1], "\n").unwrap();
        assert_eq!(single, b"a();");
    }
}
