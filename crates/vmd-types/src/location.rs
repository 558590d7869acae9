//! History locations and classified link descriptors.

use std::fmt;
use std::path::{Path, PathBuf};

/// One navigable position: a document plus an optional in-page anchor.
///
/// Equality is structural. Two locations pointing at the same document
/// with different anchors are distinct history entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location {
    /// Absolute path of the document, `None` for "whatever is on screen".
    pub document_path: Option<PathBuf>,
    /// Fragment identifier without the leading `#`; `None` means top.
    pub anchor: Option<String>,
}

impl Location {
    /// Top of a document.
    pub fn document(path: impl Into<PathBuf>) -> Self {
        Self {
            document_path: Some(path.into()),
            anchor: None,
        }
    }

    /// An anchor inside a document.
    pub fn anchored(path: impl Into<PathBuf>, anchor: impl Into<String>) -> Self {
        Self {
            document_path: Some(path.into()),
            anchor: Some(anchor.into()),
        }
    }

    /// An anchor in the currently displayed document.
    pub fn anchor_only(anchor: impl Into<String>) -> Self {
        Self {
            document_path: None,
            anchor: Some(anchor.into()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.document_path {
            Some(p) => write!(f, "{}", p.display())?,
            None => f.write_str("<current>")?,
        }
        if let Some(anchor) = &self.anchor {
            write!(f, "#{anchor}")?;
        }
        Ok(())
    }
}

/// Bare tag of a [`LinkDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    External,
    SameDocumentAnchor,
    MarkdownFile,
    PlainFile,
    Directory,
}

impl LinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::External => "external",
            Self::SameDocumentAnchor => "same-document-anchor",
            Self::MarkdownFile => "markdown-file",
            Self::PlainFile => "plain-file",
            Self::Directory => "directory",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classified type and target of a reference found in rendered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDescriptor {
    /// A URL with a non-`file:` scheme, handed to the OS untouched.
    External { href: String },
    /// A jump inside the document currently on screen.
    SameDocumentAnchor {
        document_path: Option<PathBuf>,
        anchor: Option<String>,
    },
    /// A markdown file the viewer can display itself.
    MarkdownFile { target_path: PathBuf },
    /// Any other regular file.
    PlainFile { target_path: PathBuf },
    /// A directory.
    Directory { target_path: PathBuf },
}

impl LinkDescriptor {
    pub fn kind(&self) -> LinkKind {
        match self {
            Self::External { .. } => LinkKind::External,
            Self::SameDocumentAnchor { .. } => LinkKind::SameDocumentAnchor,
            Self::MarkdownFile { .. } => LinkKind::MarkdownFile,
            Self::PlainFile { .. } => LinkKind::PlainFile,
            Self::Directory { .. } => LinkKind::Directory,
        }
    }

    /// The external URL, for [`LinkDescriptor::External`] only.
    pub fn href(&self) -> Option<&str> {
        match self {
            Self::External { href } => Some(href),
            _ => None,
        }
    }

    /// The resolved filesystem target for file and directory links.
    pub fn target_path(&self) -> Option<&Path> {
        match self {
            Self::MarkdownFile { target_path }
            | Self::PlainFile { target_path }
            | Self::Directory { target_path } => Some(target_path),
            _ => None,
        }
    }

    /// The anchor of a same-document jump.
    pub fn anchor(&self) -> Option<&str> {
        match self {
            Self::SameDocumentAnchor { anchor, .. } => anchor.as_deref(),
            _ => None,
        }
    }

    /// The history entry this link leads to, if it navigates in-viewer.
    pub fn to_location(&self) -> Option<Location> {
        match self {
            Self::SameDocumentAnchor {
                document_path,
                anchor,
            } => Some(Location {
                document_path: document_path.clone(),
                anchor: anchor.clone(),
            }),
            Self::MarkdownFile { target_path } => Some(Location::document(target_path)),
            _ => None,
        }
    }
}

impl fmt::Display for LinkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External { href } => write!(f, "{}: {href}", self.kind()),
            Self::SameDocumentAnchor { anchor, .. } => {
                write!(f, "{}: #{}", self.kind(), anchor.as_deref().unwrap_or(""))
            },
            Self::MarkdownFile { target_path }
            | Self::PlainFile { target_path }
            | Self::Directory { target_path } => {
                write!(f, "{}: {}", self.kind(), target_path.display())
            },
        }
    }
}
