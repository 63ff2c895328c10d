// src/config/validate.rs

use std::path::{Component, Path, PathBuf};

use globset::Glob;

use crate::config::model::{ConfigFile, PathsSection, RawConfigFile};
use crate::errors::{MackerelError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::MackerelError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_paths(&cfg.paths)?;
    validate_template(cfg)?;
    validate_style(cfg)?;
    validate_script(cfg)?;
    validate_images(cfg)?;
    validate_watch_and_server(cfg)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> MackerelError {
    MackerelError::ConfigError(msg.into())
}

/// Normalise a configured relative directory, rejecting absolute paths and
/// `..` components. `.` components are dropped.
fn relative_dir(field: &str, value: &str) -> Result<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(value).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(config_error(format!(
                    "{field} = {value:?} must not contain '..'"
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(config_error(format!(
                    "{field} = {value:?} must be a relative path"
                )));
            }
        }
    }
    Ok(out)
}

fn nested_or_equal(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

fn validate_paths(paths: &PathsSection) -> Result<()> {
    let src = relative_dir("[paths].src", &paths.src)?;
    let dest = relative_dir("[paths].dest", &paths.dest)?;

    if nested_or_equal(&src, &dest) {
        return Err(config_error(format!(
            "[paths].src ({:?}) and [paths].dest ({:?}) must not contain one another",
            paths.src, paths.dest
        )));
    }

    let sources = [
        ("template_src", &paths.template_src),
        ("style_src", &paths.style_src),
        ("script_src", &paths.script_src),
        ("image_src", &paths.image_src),
    ];
    for (field, value) in sources {
        relative_dir(&format!("[paths].{field}"), value)?;
    }

    let dests = [
        ("html_dest", &paths.html_dest),
        ("css_dest", &paths.css_dest),
        ("js_dest", &paths.js_dest),
        ("image_dest", &paths.image_dest),
    ];
    let mut resolved: Vec<(&str, PathBuf)> = Vec::with_capacity(dests.len());
    for (field, value) in dests {
        let dir = relative_dir(&format!("[paths].{field}"), value)?;
        if dir.as_os_str().is_empty() {
            return Err(config_error(format!(
                "[paths].{field} must name a sub-directory of [paths].dest"
            )));
        }
        for (other_field, other) in &resolved {
            if nested_or_equal(&dir, other) {
                return Err(config_error(format!(
                    "[paths].{field} ({:?}) overlaps [paths].{other_field} ({:?}); output directories must be disjoint",
                    dir, other
                )));
            }
        }
        resolved.push((field, dir));
    }

    Ok(())
}

fn validate_globs(section: &str, globs: &[String]) -> Result<()> {
    for pattern in globs {
        Glob::new(pattern).map_err(|e| {
            config_error(format!("[{section}] invalid glob pattern {pattern:?}: {e}"))
        })?;
    }
    Ok(())
}

fn ensure_command(section: &str, field: &str, cmd: &str) -> Result<()> {
    if cmd.trim().is_empty() {
        return Err(config_error(format!("[{section}].{field} must not be empty")));
    }
    Ok(())
}

fn ensure_file_name(section: &str, field: &str, value: &str) -> Result<()> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(config_error(format!(
            "[{section}].{field} = {value:?} must be a plain file name"
        ))),
    }
}

fn validate_template(cfg: &RawConfigFile) -> Result<()> {
    let t = &cfg.template;
    relative_dir("[template].entry", &t.entry)?;
    if t.entry.trim().is_empty() {
        return Err(config_error("[template].entry must not be empty"));
    }
    ensure_command("template", "compile", &t.compile)?;
    if t.output_extension.is_empty() || t.output_extension.contains(['/', '\\', '.']) {
        return Err(config_error(format!(
            "[template].output_extension = {:?} must be a bare extension like \"html\"",
            t.output_extension
        )));
    }
    validate_globs("template", &t.watch)
}

fn validate_style(cfg: &RawConfigFile) -> Result<()> {
    let s = &cfg.style;
    relative_dir("[style].entry", &s.entry)?;
    if s.entry.trim().is_empty() {
        return Err(config_error("[style].entry must not be empty"));
    }
    ensure_command("style", "compile", &s.compile)?;
    ensure_command("style", "minify", &s.minify)?;
    for cmd in &s.postprocess {
        ensure_command("style", "postprocess", cmd)?;
    }
    validate_globs("style", &s.watch)
}

fn validate_script(cfg: &RawConfigFile) -> Result<()> {
    let s = &cfg.script;
    ensure_file_name("script", "bundle", &s.bundle)?;
    ensure_command("script", "transpile", &s.transpile)?;
    ensure_command("script", "minify", &s.minify)?;
    if s.include.is_empty() {
        return Err(config_error("[script].include must contain at least one glob"));
    }
    validate_globs("script", &s.include)
}

fn validate_images(cfg: &RawConfigFile) -> Result<()> {
    let images = &cfg.images;
    for ext in &images.extensions {
        if ext.is_empty() || ext.contains(['.', '/', '\\', '{', '}', ',', '*']) {
            return Err(config_error(format!(
                "[images].extensions entry {ext:?} must be a bare extension like \"png\""
            )));
        }
    }
    for (ext, cmd) in &images.compress {
        if !images.extensions.contains(ext) {
            return Err(config_error(format!(
                "[images.compress] has a compressor for {ext:?}, which is not in [images].extensions"
            )));
        }
        ensure_command("images.compress", ext, cmd)?;
    }
    validate_globs("images", &images.watch_globs())
}

fn validate_watch_and_server(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.queue_length == 0 {
        return Err(config_error(
            "[watch].queue_length must be >= 1 (got 0)",
        ));
    }
    if cfg.server.host.trim().is_empty() {
        return Err(config_error("[server].host must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with_paths(f: impl FnOnce(&mut PathsSection)) -> RawConfigFile {
        let mut raw = RawConfigFile::default();
        f(&mut raw.paths);
        raw
    }

    #[test]
    fn stock_configuration_is_valid() {
        ConfigFile::try_from(RawConfigFile::default()).unwrap();
    }

    #[test]
    fn overlapping_destinations_are_rejected() {
        let raw = raw_with_paths(|p| p.js_dest = "css".to_string());
        let err = ConfigFile::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("disjoint"), "{err}");

        let raw = raw_with_paths(|p| p.image_dest = "html/img".to_string());
        assert!(ConfigFile::try_from(raw).is_err());
    }

    #[test]
    fn parent_components_are_rejected() {
        let raw = raw_with_paths(|p| p.style_src = "../shared/scss".to_string());
        let err = ConfigFile::try_from(raw).unwrap_err();
        assert!(err.to_string().contains(".."), "{err}");
    }

    #[test]
    fn output_root_inside_source_root_is_rejected() {
        let raw = raw_with_paths(|p| p.dest = "src/dist".to_string());
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(MackerelError::ConfigError(_))
        ));
    }

    #[test]
    fn compressor_for_unknown_extension_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.images
            .compress
            .insert("webp".to_string(), "cwebp -o - -- -".to_string());
        let err = ConfigFile::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("webp"), "{err}");
    }

    #[test]
    fn zero_queue_length_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.watch.queue_length = 0;
        assert!(ConfigFile::try_from(raw).is_err());
    }
}
