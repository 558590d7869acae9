//! Handing URLs and files to the operating system.

use std::path::Path;

use vmd_types::error::Result;

pub trait Opener {
    /// Open a URL in the default browser (or mail client, ...).
    fn open_url(&mut self, url: &str) -> Result<()>;
    /// Open a file or folder with its default application.
    fn open_path(&mut self, path: &Path) -> Result<()>;
}

/// Uses the desktop's default handlers.
#[derive(Debug, Default)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open_url(&mut self, url: &str) -> Result<()> {
        log::info!("Opening {url}");
        open::that(url)?;
        Ok(())
    }

    fn open_path(&mut self, path: &Path) -> Result<()> {
        log::info!("Opening {}", path.display());
        open::that(path)?;
        Ok(())
    }
}
