//! Viewer configuration loaded from TOML.
//!
//! Every key is optional; missing keys take the defaults below. The
//! binary layers CLI flags on top of whatever the file provides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, VmdError};

/// Smallest zoom factor accepted from configuration.
pub const MIN_ZOOM: f32 = 0.1;

/// Initial window geometry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Stylesheet overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Replaces the built-in markdown stylesheet.
    pub main: Option<PathBuf>,
    /// Appended after the main stylesheet.
    pub extra: Option<PathBuf>,
}

/// Code highlighting configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    /// Explicit stylesheet; takes precedence over `theme`.
    pub stylesheet: Option<PathBuf>,
}

impl HighlightConfig {
    /// What code blocks are highlighted with: the stylesheet when set,
    /// otherwise the theme name.
    pub fn source(&self) -> String {
        match &self.stylesheet {
            Some(path) => path.display().to_string(),
            None => self.theme.clone(),
        }
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            stylesheet: None,
        }
    }
}

/// Top-level viewer configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Document opened when a directory (or nothing) is given.
    pub document: String,
    /// Window title suffix.
    pub title: String,
    /// Initial zoom factor.
    pub zoom: f32,
    /// Open the inspector on startup.
    pub devtools: bool,
    /// Reload the displayed document when it changes on disk.
    pub watch: bool,
    pub window: WindowConfig,
    pub styles: StylesConfig,
    pub highlight: HighlightConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            document: "README.md".to_string(),
            title: "vmd".to_string(),
            zoom: 1.0,
            devtools: false,
            watch: true,
            window: WindowConfig::default(),
            styles: StylesConfig::default(),
            highlight: HighlightConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse a configuration from TOML source.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            VmdError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&source)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// User stylesheets in cascade order: main, extra, highlight.
    pub fn stylesheets(&self) -> Vec<&Path> {
        self.styles
            .main
            .as_deref()
            .into_iter()
            .chain(self.styles.extra.as_deref())
            .chain(self.highlight.stylesheet.as_deref())
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(VmdError::Config(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.document.is_empty() {
            return Err(VmdError::Config("`document` must not be empty".into()));
        }
        if !self.zoom.is_finite() || self.zoom < MIN_ZOOM {
            return Err(VmdError::Config(format!(
                "`zoom` must be at least {MIN_ZOOM}, got {}",
                self.zoom
            )));
        }
        Ok(())
    }
}
