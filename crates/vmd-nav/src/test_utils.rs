//! Shared test fixtures.

use std::path::{Path, PathBuf};

use vmd_fs::MemoryFs;

use crate::navigator::Host;

/// A small documentation tree:
///
/// ```text
/// /docs/a.md
/// /docs/b.md
/// /docs/LICENSE.MD
/// /docs/assets/logo.png
/// /docs/guide/install.md
/// ```
pub fn docs_fs() -> MemoryFs {
    let mut fs = MemoryFs::new();
    fs.write("/docs/a.md", "# A\n\n## Usage\n").unwrap();
    fs.write("/docs/b.md", "# B\n").unwrap();
    fs.write("/docs/LICENSE.MD", "MIT").unwrap();
    fs.write("/docs/assets/logo.png", "").unwrap();
    fs.write("/docs/guide/install.md", "# Install\n").unwrap();
    fs
}

/// One recorded [`Host`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Scroll(Option<String>),
    Load(PathBuf),
    External(String),
    OpenItem(PathBuf),
    NewWindow(PathBuf),
}

/// Host that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Host for RecordingHost {
    fn scroll_to_anchor(&mut self, anchor: Option<&str>) {
        self.calls.push(HostCall::Scroll(anchor.map(str::to_string)));
    }

    fn load_document(&mut self, path: &Path) {
        self.calls.push(HostCall::Load(path.to_path_buf()));
    }

    fn open_external(&mut self, href: &str) {
        self.calls.push(HostCall::External(href.to_string()));
    }

    fn open_item(&mut self, path: &Path) {
        self.calls.push(HostCall::OpenItem(path.to_path_buf()));
    }

    fn open_in_new_window(&mut self, path: &Path) {
        self.calls.push(HostCall::NewWindow(path.to_path_buf()));
    }
}
