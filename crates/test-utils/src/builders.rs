use mackerel::config::{ConfigFile, RawConfigFile};
use mackerel::types::OverlapPolicy;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the built-in defaults; `build()` goes through validation.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn without_server(mut self) -> Self {
        self.config.server.enabled = false;
        self
    }

    /// Serve on an ephemeral localhost port.
    pub fn with_ephemeral_port(mut self) -> Self {
        self.config.server.host = "127.0.0.1".to_string();
        self.config.server.port = 0;
        self
    }

    pub fn with_directory_listing(mut self, val: bool) -> Self {
        self.config.server.directory_listing = val;
        self
    }

    pub fn with_overlap(mut self, policy: OverlapPolicy) -> Self {
        self.config.watch.overlap = policy;
        self
    }

    pub fn with_queue_length(mut self, n: usize) -> Self {
        self.config.watch.queue_length = n;
        self
    }

    pub fn with_use_hash(mut self, val: bool) -> Self {
        self.config.watch.use_hash = val;
        self
    }

    pub fn with_image_extensions(mut self, exts: &[&str]) -> Self {
        self.config.images.extensions = exts.iter().map(|e| e.to_string()).collect();
        self.config
            .images
            .compress
            .retain(|ext, _| exts.contains(&ext.as_str()));
        self
    }

    /// Raw access for anything the helpers don't cover.
    pub fn edit(mut self, f: impl FnOnce(&mut RawConfigFile)) -> Self {
        f(&mut self.config);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
