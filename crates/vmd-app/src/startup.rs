//! Resolve what the first window shows.

use std::path::{Path, PathBuf};

use vmd_fs::FileSystem;
use vmd_fs::path::resolve_path;
use vmd_types::ViewerConfig;
use vmd_types::error::{Result, VmdError};

/// Shown when the requested document does not exist.
pub const WELCOME_DOCUMENT: &str = "\
# vmd

Preview markdown files in a separate window.

Open a file with `open <path>`, follow links with `follow <ref>`, and type
`help` for the full list of commands.
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupDocument {
    File(PathBuf),
    Welcome,
}

/// Pick the startup document.
///
/// `requested` falls back to `config.document`. A directory resolves to
/// `config.document` inside it. A missing target yields the welcome
/// document; any other stat failure is an error.
pub fn resolve_startup(
    requested: Option<&Path>,
    config: &ViewerConfig,
    cwd: &Path,
    fs: &dyn FileSystem,
) -> Result<StartupDocument> {
    let requested = requested.unwrap_or_else(|| Path::new(&config.document));
    let mut path = resolve_path(cwd, requested);

    let meta = match fs.stat(&path) {
        Ok(meta) => meta,
        Err(e) if e.is_not_found() => return Ok(welcome(&path)),
        Err(e) => return Err(cannot_open(&path, e)),
    };

    if meta.is_dir() {
        path = path.join(&config.document);
        match fs.stat(&path) {
            Ok(meta) if meta.is_dir() => {
                return Err(VmdError::Fs(format!(
                    "Cannot open {}: is a directory",
                    path.display()
                )));
            },
            Ok(_) => {},
            Err(e) if e.is_not_found() => return Ok(welcome(&path)),
            Err(e) => return Err(cannot_open(&path, e)),
        }
    }

    log::info!("Opening {}", path.display());
    Ok(StartupDocument::File(path))
}

fn welcome(path: &Path) -> StartupDocument {
    log::info!("{} not found, showing the welcome document", path.display());
    StartupDocument::Welcome
}

fn cannot_open(path: &Path, err: VmdError) -> VmdError {
    VmdError::Fs(format!("Cannot open {}: {err}", path.display()))
}
