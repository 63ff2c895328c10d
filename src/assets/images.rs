// src/assets/images.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{ConfigFile, PathConfig};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::pipeline::sources::{build_globset, collect_sorted};
use crate::pipeline::{run_stage, FileFailure, Stage, StageContext, TaskReport, Toolchain};
use crate::types::AssetKind;

/// Losslessly compress every recognized image into the image output
/// directory, mirroring the relative layout.
///
/// Best effort: a file that cannot be read, compressed or written is
/// recorded in [`TaskReport::failures`] and the batch moves on.
#[derive(Debug, Clone)]
pub struct ImageTask {
    pub fs: Arc<dyn FileSystem>,
    pub src_dir: PathBuf,
    pub dest_dir: PathBuf,
    /// Recognized extensions, matched case-sensitively.
    pub extensions: Vec<String>,
    /// Compressor per extension; recognized files without one are copied.
    pub compressors: BTreeMap<String, Stage>,
}

impl ImageTask {
    pub fn from_config(
        cfg: &ConfigFile,
        paths: &PathConfig,
        fs: Arc<dyn FileSystem>,
        tools: &Toolchain,
    ) -> Self {
        let compressors = cfg
            .images
            .compress
            .iter()
            .map(|(ext, cmd)| {
                let stage = Stage::rewrite(format!("compress[{ext}]"), tools.command(cmd));
                (ext.clone(), stage)
            })
            .collect();

        Self {
            fs,
            src_dir: paths.source_dir(AssetKind::Image).to_path_buf(),
            dest_dir: paths.dest_dir(AssetKind::Image).to_path_buf(),
            extensions: cfg.images.extensions.clone(),
            compressors,
        }
    }

    fn recognized(&self, path: &Path) -> Option<String> {
        let ext = path.extension()?.to_str()?;
        self.extensions
            .iter()
            .any(|e| e == ext)
            .then(|| ext.to_string())
    }

    pub async fn build(&self) -> Result<TaskReport> {
        let task = AssetKind::Image.task_name();
        let mut report = TaskReport::new(task);

        // `**/*` then filter by extension, so matching stays case-sensitive
        // on every platform.
        let everything = build_globset(&["**/*".to_string()])?;
        let files = collect_sorted(self.fs.as_ref(), &self.src_dir, &everything)?;

        for file in files {
            let Some(ext) = self.recognized(&file) else {
                debug!(task, path = ?file, "skipping unrecognized file");
                continue;
            };
            if let Err(reason) = self.process_one(&file, &ext, &mut report).await {
                warn!(task, path = ?file, %reason, "image failed; continuing");
                report.failures.push(FileFailure { path: file, reason });
            }
        }

        Ok(report)
    }

    async fn process_one(
        &self,
        file: &Path,
        ext: &str,
        report: &mut TaskReport,
    ) -> std::result::Result<(), String> {
        let rel = file.strip_prefix(&self.src_dir).map_err(|e| e.to_string())?;
        let original = self.fs.read(file).map_err(|e| format!("{e:#}"))?;

        let output = match self.compressors.get(ext) {
            Some(stage) => {
                let ctx = StageContext::new(AssetKind::Image.task_name(), Some(file.to_path_buf()));
                let compressed = run_stage(stage, original.clone(), &ctx, report)
                    .await
                    .map_err(|e| e.to_string())?;
                if compressed.is_empty() && !original.is_empty() {
                    return Err("compressor produced no output".to_string());
                }
                // Lossless compression never makes a file worse.
                if compressed.len() > original.len() {
                    original
                } else {
                    compressed
                }
            }
            None => original,
        };

        let out = self.dest_dir.join(rel);
        self.fs.write(&out, &output).map_err(|e| format!("{e:#}"))?;
        report.written.push(out);
        Ok(())
    }
}
