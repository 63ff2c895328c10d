//! In-process stand-ins for external tools.

use std::fmt;
use std::sync::{Arc, Mutex};

use mackerel::pipeline::{
    parse_diagnostics, BoxFuture, StageContext, Transform, TransformOutput,
};

type TransformFn = dyn Fn(&[u8]) -> TransformOutput + Send + Sync;

/// A transform backed by a closure. Every input it sees is recorded.
pub struct FnTransform {
    label: String,
    f: Box<TransformFn>,
    seen: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl fmt::Debug for FnTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransform").field("label", &self.label).finish()
    }
}

impl FnTransform {
    pub fn new(
        label: &str,
        f: impl Fn(&[u8]) -> TransformOutput + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            f: Box::new(f),
            seen: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Inputs received so far, in call order.
    pub fn seen(&self) -> Vec<Vec<u8>> {
        self.seen.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Transform for FnTransform {
    fn label(&self) -> &str {
        &self.label
    }

    fn apply<'a>(
        &'a self,
        input: &'a [u8],
        _ctx: &'a StageContext,
    ) -> BoxFuture<'a, anyhow::Result<TransformOutput>> {
        Box::pin(async move {
            self.seen.lock().unwrap().push(input.to_vec());
            Ok((self.f)(input))
        })
    }
}

fn ok(content: Vec<u8>) -> TransformOutput {
    TransformOutput {
        content,
        diagnostics: Vec::new(),
        success: true,
    }
}

/// Successful tool that maps the content.
pub fn map(label: &str, f: impl Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static) -> Arc<FnTransform> {
    FnTransform::new(label, move |input| ok(f(input)))
}

pub fn identity(label: &str) -> Arc<FnTransform> {
    map(label, |input| input.to_vec())
}

/// Wraps the content as `label(content)`, making stage order visible.
pub fn wrap(label: &str) -> Arc<FnTransform> {
    let name = label.to_string();
    map(label, move |input| {
        format!("{name}({})", String::from_utf8_lossy(input)).into_bytes()
    })
}

/// Drops all whitespace; a toy minifier.
pub fn squeeze(label: &str) -> Arc<FnTransform> {
    map(label, |input| {
        input
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect()
    })
}

/// Tool that exits non-zero with `stderr` as its diagnostics.
pub fn failing(label: &str, stderr: &str) -> Arc<FnTransform> {
    let stderr = stderr.to_string();
    FnTransform::new(label, move |_| TransformOutput {
        content: Vec::new(),
        diagnostics: parse_diagnostics(&stderr),
        success: false,
    })
}

/// Fails when the input contains `needle`, otherwise passes it through.
pub fn fails_on(label: &str, needle: &'static str, stderr: &str) -> Arc<FnTransform> {
    let stderr = stderr.to_string();
    FnTransform::new(label, move |input| {
        if String::from_utf8_lossy(input).contains(needle) {
            TransformOutput {
                content: Vec::new(),
                diagnostics: parse_diagnostics(&stderr),
                success: false,
            }
        } else {
            ok(input.to_vec())
        }
    })
}
