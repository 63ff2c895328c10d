// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::OverlapPolicy;

/// Top-level configuration as read from a TOML file.
///
/// Every section is optional; an empty file reproduces the stock layout:
///
/// ```toml
/// [paths]
/// src = "src"
/// dest = "dist"
///
/// [style]
/// minify = "npx postcss --no-map --use cssnano"
///
/// [images.compress]
/// png = "npx imagemin --plugin=optipng"
///
/// [watch]
/// overlap = "queue"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub template: TemplateSection,

    #[serde(default)]
    pub style: StyleSection,

    #[serde(default)]
    pub script: ScriptSection,

    #[serde(default)]
    pub images: ImagesSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`),
/// so holders can rely on the path invariants having been checked.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub paths: PathsSection,
    pub template: TemplateSection,
    pub style: StyleSection,
    pub script: ScriptSection,
    pub images: ImagesSection,
    pub server: ServerSection,
    pub watch: WatchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            paths: raw.paths,
            template: raw.template,
            style: raw.style,
            script: raw.script,
            images: raw.images,
            server: raw.server,
            watch: raw.watch,
        }
    }

    /// Built-in configuration, equivalent to an empty `Mackerel.toml`.
    pub fn builtin() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[paths]` section.
///
/// Role directories are relative to `src` (sources) or `dest` (outputs),
/// which are themselves relative to the project root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub src: String,
    pub dest: String,

    pub template_src: String,
    pub style_src: String,
    pub script_src: String,
    pub image_src: String,

    pub html_dest: String,
    pub css_dest: String,
    pub js_dest: String,
    pub image_dest: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            src: "src".to_string(),
            dest: "dist".to_string(),
            template_src: "pug".to_string(),
            style_src: "scss".to_string(),
            script_src: "js".to_string(),
            image_src: "images".to_string(),
            html_dest: "html".to_string(),
            css_dest: "css".to_string(),
            js_dest: "js".to_string(),
            image_dest: "images".to_string(),
        }
    }
}

/// `[template]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplateSection {
    /// Entry file, relative to the template source directory.
    pub entry: String,
    /// Globs (relative to the template source directory) that trigger a rebuild.
    pub watch: Vec<String>,
    /// Extension given to the compiled output.
    pub output_extension: String,
    /// Template compiler, pretty-printing with 4-space indentation.
    pub compile: String,
    /// Markup validator; advisory only.
    pub validate: Option<String>,
}

impl Default for TemplateSection {
    fn default() -> Self {
        Self {
            entry: "index.pug".to_string(),
            watch: vec!["**/*.pug".to_string()],
            output_extension: "html".to_string(),
            compile: "npx pug -O '{\"pretty\":\"    \"}' --path \"$MACKEREL_FILE\"".to_string(),
            validate: Some("npx htmlhint --format unix stdin".to_string()),
        }
    }
}

/// `[style]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleSection {
    pub entry: String,
    pub watch: Vec<String>,
    /// Style compiler producing expanded CSS.
    pub compile: String,
    /// Auto-fixing linter pass.
    pub fix: Option<String>,
    /// Reporting-only linter pass.
    pub report: Option<String>,
    /// Vendor prefixing, declaration sorting and 4-space reformatting,
    /// applied in order.
    pub postprocess: Vec<String>,
    /// Minifier for the `.min` artifact.
    pub minify: String,
}

impl Default for StyleSection {
    fn default() -> Self {
        Self {
            entry: "index.scss".to_string(),
            watch: vec!["**/*.scss".to_string()],
            compile: "npx sass --stdin --style=expanded --no-source-map --load-path=\"$(dirname \"$MACKEREL_FILE\")\"".to_string(),
            fix: Some("npx stylelint --stdin --fix".to_string()),
            report: Some("npx stylelint --stdin --formatter unix".to_string()),
            postprocess: vec![
                "npx postcss --no-map --use autoprefixer --use css-declaration-sorter".to_string(),
                "npx prettier --parser css --tab-width 4".to_string(),
            ],
            minify: "npx postcss --no-map --use cssnano".to_string(),
        }
    }
}

/// `[script]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScriptSection {
    /// Globs (relative to the script source directory) that are bundled.
    pub include: Vec<String>,
    /// Bundle file name.
    pub bundle: String,
    /// Inserted between concatenated sources.
    pub separator: String,
    pub transpile: String,
    /// Linter run on the transpiled bundle; a failure aborts the task.
    pub lint: Option<String>,
    pub minify: String,
}

impl Default for ScriptSection {
    fn default() -> Self {
        Self {
            include: vec!["**/*.js".to_string()],
            bundle: "index.js".to_string(),
            separator: "\n".to_string(),
            transpile: "npx babel --filename index.js".to_string(),
            lint: Some("npx eslint --stdin --stdin-filename index.js --format unix".to_string()),
            minify: "npx uglifyjs".to_string(),
        }
    }
}

/// `[images]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImagesSection {
    /// Recognized extensions (without the dot, matched case-sensitively).
    pub extensions: Vec<String>,
    /// Compressor command per extension. Recognized extensions without a
    /// compressor are copied unchanged.
    pub compress: BTreeMap<String, String>,
}

impl Default for ImagesSection {
    fn default() -> Self {
        let compress = [
            ("gif", "npx imagemin --plugin=gifsicle"),
            ("jpg", "npx imagemin --plugin=mozjpeg"),
            ("png", "npx imagemin --plugin=optipng"),
            ("svg", "npx imagemin --plugin=svgo"),
        ]
        .into_iter()
        .map(|(ext, cmd)| (ext.to_string(), cmd.to_string()))
        .collect();

        Self {
            extensions: ["gif", "jpg", "png", "svg"]
                .into_iter()
                .map(String::from)
                .collect(),
            compress,
        }
    }
}

impl ImagesSection {
    /// Watch globs derived from the recognized extensions, e.g. `**/*.{gif,png}`.
    pub fn watch_globs(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            return Vec::new();
        }
        vec![format!("**/*.{{{}}}", self.extensions.join(","))]
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// When false, `browserSync-init` is a no-op and watch bindings omit reload.
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub directory_listing: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 3000,
            directory_listing: true,
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchSection {
    /// What happens when a category changes while its binding is running.
    pub overlap: OverlapPolicy,
    /// Maximum number of pending reruns per category (`overlap = "queue"`).
    pub queue_length: usize,
    /// Skip triggers when the category's watched content hash is unchanged.
    pub use_hash: bool,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            overlap: OverlapPolicy::default(),
            queue_length: 1,
            use_hash: false,
        }
    }
}
