//! Filesystem capability consumed by the navigation core.
//!
//! The classifier only needs to know whether a resolved path is a file or a
//! directory, and the session needs to read documents. Both go through the
//! [`FileSystem`] trait so tests can run against [`MemoryFs`] while the
//! binary uses [`NativeFs`].

pub mod memory;
pub mod native;
pub mod path;

pub use memory::MemoryFs;
pub use native::NativeFs;
pub use path::{MARKDOWN_EXTENSIONS, extension_of, is_markdown_path, resolve_path};

use std::path::Path;

use vmd_types::error::Result;

/// What a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Sockets, fifos, devices and anything else.
    Other,
}

/// Result of a successful `stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    pub kind: EntryKind,
}

impl FileMetadata {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Read-only filesystem access.
///
/// `stat` reports a missing path as `VmdError::NotFound` and any other
/// failure as `VmdError::Io` / `VmdError::Fs`.
pub trait FileSystem {
    /// Query the type and size of `path`. Follows symlinks.
    fn stat(&self, path: &Path) -> Result<FileMetadata>;

    /// Read a document as text. Backends decode invalid UTF-8 lossily.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}
