// src/fs/mock.rs

//! In-memory [`FileSystem`] for tests.
//!
//! Directory listings come back in insertion order, which is deliberately
//! not sorted so callers that need a stable order have to impose one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};

use super::FileSystem;

#[derive(Debug, Clone)]
enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn parent_or_dot(path: &Path) -> Option<&Path> {
    let parent = path.parent()?;
    if parent.as_os_str().is_empty() {
        Some(Path::new("."))
    } else {
        Some(parent)
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));
        entries.insert(PathBuf::from("/"), MockEntry::Dir(Vec::new()));

        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert or replace a file, creating parent directories implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.lock();
        entries.insert(path.clone(), MockEntry::File(content.into()));
        Self::link_into_parent(&mut entries, &path);
    }

    /// Create an (empty) directory and its parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.lock();
        Self::ensure_dir(&mut entries, path.as_ref());
    }

    /// Snapshot of every file currently stored, for assertions.
    pub fn files(&self) -> Vec<PathBuf> {
        let entries = self.lock();
        let mut files: Vec<PathBuf> = entries
            .iter()
            .filter(|(_, e)| matches!(e, MockEntry::File(_)))
            .map(|(p, _)| p.clone())
            .collect();
        files.sort();
        files
    }

    fn ensure_dir(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if entries.contains_key(path) {
            return;
        }
        entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        Self::link_into_parent(entries, path);
    }

    fn link_into_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let Some(parent) = parent_or_dot(path) else {
            return;
        };
        if parent == path {
            return;
        }
        Self::ensure_dir(entries, parent);
        if let (Some(MockEntry::Dir(children)), Some(name)) =
            (entries.get_mut(parent), path.file_name().and_then(|n| n.to_str()))
        {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        match self.lock().get(path) {
            Some(MockEntry::File(content)) => Ok(content.clone()),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.add_file(path, contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::Dir(_)))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        match self.lock().get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_files_create_parent_directories() {
        let fs = MockFileSystem::new();
        fs.add_file("/site/src/js/lib/util.js", b"u".to_vec());

        assert!(fs.is_dir(Path::new("/site/src/js/lib")));
        assert!(fs.is_dir(Path::new("/site")));
        assert_eq!(
            fs.read_dir(Path::new("/site/src/js")).unwrap(),
            vec![PathBuf::from("/site/src/js/lib")]
        );
        assert_eq!(fs.read(Path::new("/site/src/js/lib/util.js")).unwrap(), b"u");
    }

    #[test]
    fn write_overwrites_without_duplicating_listing() {
        let fs = MockFileSystem::new();
        fs.write(Path::new("/out/a.css"), b"1").unwrap();
        fs.write(Path::new("/out/a.css"), b"2").unwrap();

        assert_eq!(fs.read_dir(Path::new("/out")).unwrap().len(), 1);
        assert_eq!(fs.read(Path::new("/out/a.css")).unwrap(), b"2");
    }
}
