//! Link classification.
//!
//! Every click or context-menu request on rendered content ends up here.
//! The order of checks matters: external schemes are decided before any
//! path is touched, and a same-file anchor is recognized before the target
//! is treated as "another markdown file" (which would reload the document
//! and lose the scroll position).

use std::path::Path;

use vmd_fs::path::{dirname, normalize};
use vmd_fs::{EntryKind, FileSystem, is_markdown_path, resolve_path};
use vmd_types::LinkDescriptor;

use crate::href::Href;

/// Classify `raw_ref` as seen from the document at `current_document`.
///
/// Returns `None` for anything that cannot be acted upon: empty input, a
/// relative path while no document is displayed, or a target that cannot
/// be stat'ed. Stat failures of every kind are swallowed.
pub fn classify(
    current_document: Option<&Path>,
    raw_ref: &str,
    fs: &dyn FileSystem,
) -> Option<LinkDescriptor> {
    if raw_ref.is_empty() {
        return None;
    }

    let href = Href::parse(raw_ref);

    if href.is_external() {
        return Some(LinkDescriptor::External {
            href: raw_ref.to_string(),
        });
    }

    if href.is_bare_fragment() {
        return Some(LinkDescriptor::SameDocumentAnchor {
            document_path: current_document.map(Path::to_path_buf),
            anchor: anchor_of(href.fragment.as_deref()),
        });
    }

    let (Some(current), Some(pathname)) = (current_document, href.pathname.as_deref()) else {
        return None;
    };

    let target = resolve_path(dirname(current), Path::new(pathname));
    let meta = match fs.stat(&target) {
        Ok(meta) => meta,
        Err(e) => {
            log::debug!("Ignoring link {raw_ref:?}: {e}");
            return None;
        },
    };

    match meta.kind {
        EntryKind::File => {
            if href.fragment.is_some() && target == normalize(current) {
                return Some(LinkDescriptor::SameDocumentAnchor {
                    document_path: Some(current.to_path_buf()),
                    anchor: anchor_of(href.fragment.as_deref()),
                });
            }
            if is_markdown_path(&target) {
                Some(LinkDescriptor::MarkdownFile {
                    target_path: target,
                })
            } else {
                Some(LinkDescriptor::PlainFile {
                    target_path: target,
                })
            }
        },
        EntryKind::Directory => Some(LinkDescriptor::Directory {
            target_path: target,
        }),
        EntryKind::Other => {
            log::debug!("Ignoring link {raw_ref:?}: not a file or directory");
            None
        },
    }
}

/// An empty fragment (`#`) means the top of the document.
fn anchor_of(fragment: Option<&str>) -> Option<String> {
    fragment.filter(|f| !f.is_empty()).map(str::to_string)
}
