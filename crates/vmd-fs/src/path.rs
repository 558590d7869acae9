//! Path resolution helpers.
//!
//! Resolution is purely lexical: `.` and `..` are folded without touching
//! the disk, so symlinked directories behave like plain path strings.

use std::path::{Component, Path, PathBuf};

/// Extensions recognized as markdown, matched literally and case-sensitively.
pub const MARKDOWN_EXTENSIONS: [&str; 8] = [
    ".markdown",
    ".mdown",
    ".mkdn",
    ".md",
    ".mkd",
    ".mdwn",
    ".mdtxt",
    ".mdtext",
];

/// Resolve `relative` against the directory `base`.
///
/// An absolute `relative` replaces `base` entirely. The result is
/// normalized; `..` never climbs above the root.
pub fn resolve_path(base: &Path, relative: &Path) -> PathBuf {
    normalize(&base.join(relative))
}

/// Fold `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {},
            Component::ParentDir => {
                // A relative path keeps its leading `..` segments; popping a
                // bare root is a no-op.
                let ends_with_parent =
                    matches!(out.components().next_back(), Some(Component::ParentDir));
                if ends_with_parent || out.as_os_str().is_empty() {
                    out.push("..");
                } else {
                    out.pop();
                }
            },
            Component::Normal(part) => out.push(part),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Directory containing `path`, or `path` itself when it has no parent.
pub fn dirname(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => path,
    }
}

/// The extension including its leading dot, or `""` when there is none.
///
/// Dotfiles such as `.bashrc` have no extension.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Whether `path` carries one of the [`MARKDOWN_EXTENSIONS`].
pub fn is_markdown_path(path: &Path) -> bool {
    let ext = extension_of(path);
    MARKDOWN_EXTENSIONS.contains(&ext.as_str())
}
