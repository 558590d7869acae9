//! Command-line arguments and how they layer over the config file.

use std::path::{Path, PathBuf};

use clap::Parser;
use vmd_types::ViewerConfig;
use vmd_types::config::MIN_ZOOM;
use vmd_types::error::{Result, VmdError};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "VMD_CONFIG";

#[derive(Parser, Debug)]
#[command(name = "vmd", version)]
#[command(about = "Preview markdown files", long_about = None)]
pub struct Args {
    /// Markdown file or directory to open
    pub file: Option<PathBuf>,

    /// Window title suffix
    #[arg(short, long)]
    pub title: Option<String>,

    /// Open developer tools on startup
    #[arg(short, long)]
    pub devtools: bool,

    /// Initial zoom factor
    #[arg(short, long)]
    pub zoom: Option<f32>,

    /// Document to open when a directory is given
    #[arg(long)]
    pub document: Option<String>,

    /// Config file (defaults to $VMD_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Do not reload documents when they change on disk
    #[arg(long)]
    pub no_watch: bool,

    /// Print version information and exit
    #[arg(long)]
    pub versions: bool,
}

impl Args {
    /// Load the config file (`--config`, else `env_config`) and apply the
    /// flags on top of it.
    pub fn resolve_config(&self, env_config: Option<&Path>) -> Result<ViewerConfig> {
        let mut config = match self.config.as_deref().or(env_config) {
            Some(path) => ViewerConfig::load(path)?,
            None => ViewerConfig::default(),
        };

        if let Some(title) = &self.title {
            config.title.clone_from(title);
        }
        if self.devtools {
            config.devtools = true;
        }
        if let Some(zoom) = self.zoom {
            if !zoom.is_finite() || zoom < MIN_ZOOM {
                return Err(VmdError::Config(format!(
                    "--zoom must be at least {MIN_ZOOM}, got {zoom}"
                )));
            }
            config.zoom = zoom;
        }
        if let Some(document) = &self.document {
            if document.is_empty() {
                return Err(VmdError::Config("--document must not be empty".into()));
            }
            config.document.clone_from(document);
        }
        if self.no_watch {
            config.watch = false;
        }
        Ok(config)
    }
}

/// Lines printed by `--versions`.
pub fn versions() -> Vec<String> {
    vec![
        format!("vmd:      {}", env!("CARGO_PKG_VERSION")),
        format!("os:       {}", std::env::consts::OS),
        format!("arch:     {}", std::env::consts::ARCH),
    ]
}
