//! Filesystem backed by `std::fs`.

use std::io;
use std::path::Path;

use vmd_types::error::{Result, VmdError};

use crate::{EntryKind, FileMetadata, FileSystem};

/// The host filesystem. Calls block; documents are local and small.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFs;

impl NativeFs {
    pub fn new() -> Self {
        Self
    }
}

fn map_io(path: &Path, err: io::Error) -> VmdError {
    if err.kind() == io::ErrorKind::NotFound {
        VmdError::NotFound(path.display().to_string())
    } else {
        VmdError::Io(err)
    }
}

impl FileSystem for NativeFs {
    fn stat(&self, path: &Path) -> Result<FileMetadata> {
        let meta = std::fs::metadata(path).map_err(|e| map_io(path, e))?;
        let kind = if meta.is_file() {
            EntryKind::File
        } else if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        };
        Ok(FileMetadata { kind })
    }

    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).map_err(|e| map_io(path, e))?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                log::debug!("{} is not valid UTF-8, decoding lossily", path.display());
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            },
        }
    }
}
