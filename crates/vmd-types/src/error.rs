//! Error types for vmd.

use std::io;

/// Errors produced by the vmd crates.
#[derive(Debug, thiserror::Error)]
pub enum VmdError {
    #[error("config error: {0}")]
    Config(String),

    #[error("filesystem error: {0}")]
    Fs(String),

    #[error("no such file or directory: {0}")]
    NotFound(String),

    #[error("watch error: {0}")]
    Watch(String),

    #[error("command error: {0}")]
    Command(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl VmdError {
    /// Whether this error means the path simply does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, VmdError>;
