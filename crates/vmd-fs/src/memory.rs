//! In-memory filesystem.
//!
//! Used by unit tests and by the welcome screen. The whole tree lives in a
//! `BTreeMap<PathBuf, Node>` keyed by normalized absolute paths.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use vmd_types::error::{Result, VmdError};

use crate::path::normalize;
use crate::{EntryKind, FileMetadata, FileSystem};

#[derive(Debug, Clone)]
enum Node {
    File(String),
    Dir,
}

/// A fully in-memory filesystem.
#[derive(Debug)]
pub struct MemoryFs {
    nodes: BTreeMap<PathBuf, Node>,
}

impl MemoryFs {
    /// Create a filesystem containing only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(PathBuf::from("/"), Node::Dir);
        Self { nodes }
    }

    /// Create a directory and any missing parents.
    pub fn mkdir(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = absolute(path.as_ref());
        match self.nodes.get(&path) {
            Some(Node::Dir) => return Ok(()),
            Some(Node::File(_)) => {
                return Err(VmdError::Fs(format!(
                    "not a directory: {}",
                    path.display()
                )));
            },
            None => {},
        }
        if let Some(parent) = path.parent() {
            self.mkdir(parent)?;
        }
        self.nodes.insert(path, Node::Dir);
        Ok(())
    }

    /// Write a file, creating parent directories as needed.
    pub fn write(&mut self, path: impl AsRef<Path>, contents: &str) -> Result<()> {
        let path = absolute(path.as_ref());
        if let Some(parent) = path.parent() {
            self.mkdir(parent)?;
        }
        if let Some(Node::Dir) = self.nodes.get(&path) {
            return Err(VmdError::Fs(format!("is a directory: {}", path.display())));
        }
        self.nodes.insert(path, Node::File(contents.to_string()));
        Ok(())
    }

    /// Remove a file or an empty directory.
    pub fn remove(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = absolute(path.as_ref());
        if !self.nodes.contains_key(&path) {
            return Err(VmdError::NotFound(path.display().to_string()));
        }
        let has_children = self
            .nodes
            .keys()
            .any(|key| key != &path && key.starts_with(&path));
        if has_children {
            return Err(VmdError::Fs(format!(
                "directory not empty: {}",
                path.display()
            )));
        }
        self.nodes.remove(&path);
        Ok(())
    }
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize and anchor at `/`.
fn absolute(path: &Path) -> PathBuf {
    let path = normalize(path);
    if path.has_root() {
        path
    } else {
        normalize(&Path::new("/").join(path))
    }
}

impl FileSystem for MemoryFs {
    fn stat(&self, path: &Path) -> Result<FileMetadata> {
        let path = absolute(path);
        match self.nodes.get(&path) {
            Some(Node::File(_)) => Ok(FileMetadata {
                kind: EntryKind::File,
            }),
            Some(Node::Dir) => Ok(FileMetadata {
                kind: EntryKind::Directory,
            }),
            None => Err(VmdError::NotFound(path.display().to_string())),
        }
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = absolute(path);
        match self.nodes.get(&path) {
            Some(Node::File(data)) => Ok(data.clone()),
            Some(Node::Dir) => Err(VmdError::Fs(format!("is a directory: {}", path.display()))),
            None => Err(VmdError::NotFound(path.display().to_string())),
        }
    }
}
