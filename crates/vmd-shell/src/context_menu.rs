//! Context menu for rendered content.
//!
//! The model is built from whatever is under the pointer: the closest
//! enclosing link and image (both classified like a click would be) and the
//! current text selection.

use std::path::Path;

use vmd_fs::FileSystem;
use vmd_nav::classify;
use vmd_types::{LinkDescriptor, LinkKind};

use crate::menu::{ActionItem, MenuAction, MenuItem};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextModel {
    pub link: Option<LinkDescriptor>,
    pub image: Option<LinkDescriptor>,
    pub selection: Option<String>,
}

impl ContextModel {
    /// Classify the link and image references under the pointer.
    pub fn classify(
        current_document: Option<&Path>,
        link_ref: Option<&str>,
        image_ref: Option<&str>,
        selection: Option<String>,
        fs: &dyn FileSystem,
    ) -> Self {
        Self {
            link: link_ref.and_then(|r| classify(current_document, r, fs)),
            image: image_ref.and_then(|r| classify(current_document, r, fs)),
            selection: selection.filter(|s| !s.is_empty()),
        }
    }

    fn link_kind(&self) -> Option<LinkKind> {
        self.link.as_ref().map(LinkDescriptor::kind)
    }

    fn image_kind(&self) -> Option<LinkKind> {
        self.image.as_ref().map(LinkDescriptor::kind)
    }
}

fn link_is_directory(m: &ContextModel) -> bool {
    m.link_kind() == Some(LinkKind::Directory)
}

fn link_is_file(m: &ContextModel) -> bool {
    matches!(
        m.link_kind(),
        Some(LinkKind::PlainFile | LinkKind::MarkdownFile)
    )
}

fn link_is_markdown(m: &ContextModel) -> bool {
    m.link_kind() == Some(LinkKind::MarkdownFile)
}

fn link_is_anchor(m: &ContextModel) -> bool {
    m.link_kind() == Some(LinkKind::SameDocumentAnchor)
}

fn link_is_external(m: &ContextModel) -> bool {
    m.link_kind() == Some(LinkKind::External)
}

fn link_has_path(m: &ContextModel) -> bool {
    link_is_directory(m) || link_is_file(m)
}

fn has_link(m: &ContextModel) -> bool {
    m.link.is_some()
}

fn has_selection(m: &ContextModel) -> bool {
    m.selection.is_some()
}

fn image_is_file(m: &ContextModel) -> bool {
    m.image_kind() == Some(LinkKind::PlainFile)
}

fn image_is_external(m: &ContextModel) -> bool {
    m.image_kind() == Some(LinkKind::External)
}

fn has_image(m: &ContextModel) -> bool {
    m.image.is_some()
}

pub fn template() -> Vec<MenuItem<ContextModel>> {
    vec![
        ActionItem::new("Open folder", MenuAction::OpenFolder)
            .visible_when(link_is_directory)
            .into(),
        ActionItem::new("Open file", MenuAction::OpenFile)
            .visible_when(link_is_file)
            .into(),
        ActionItem::new("Open image", MenuAction::OpenImage)
            .visible_when(image_is_file)
            .into(),
        ActionItem::new("Open file in new window", MenuAction::OpenFileInNewWindow)
            .visible_when(link_is_markdown)
            .into(),
        ActionItem::new("Scroll to anchor", MenuAction::ScrollToAnchor)
            .visible_when(link_is_anchor)
            .into(),
        ActionItem::new("Open link", MenuAction::OpenLink)
            .visible_when(link_is_external)
            .into(),
        MenuItem::separator_when(has_link),
        ActionItem::new("Copy", MenuAction::Copy)
            .visible_when(has_selection)
            .into(),
        ActionItem::new("Copy link address", MenuAction::CopyLinkAddress)
            .visible_when(link_is_external)
            .into(),
        ActionItem::new("Copy image address", MenuAction::CopyImageAddress)
            .visible_when(image_is_external)
            .into(),
        ActionItem::new("Copy path", MenuAction::CopyPath)
            .visible_when(link_has_path)
            .into(),
        ActionItem::new("Copy image path", MenuAction::CopyImagePath)
            .visible_when(image_is_file)
            .into(),
        ActionItem::new("Copy image", MenuAction::CopyImage)
            .visible_when(has_image)
            .into(),
        ActionItem::new("Select All", MenuAction::SelectAll).into(),
        MenuItem::separator(),
        ActionItem::new("Inspect Element", MenuAction::InspectElement).into(),
    ]
}

/// Text the copy entries put on the clipboard.
pub fn clipboard_text(action: MenuAction, model: &ContextModel) -> Option<String> {
    match action {
        MenuAction::Copy => model.selection.clone(),
        MenuAction::CopyLinkAddress => model.link.as_ref()?.href().map(str::to_string),
        MenuAction::CopyImageAddress => model.image.as_ref()?.href().map(str::to_string),
        MenuAction::CopyPath => path_text(model.link.as_ref()?),
        MenuAction::CopyImagePath => path_text(model.image.as_ref()?),
        _ => None,
    }
}

fn path_text(link: &LinkDescriptor) -> Option<String> {
    link.target_path().map(|p| p.display().to_string())
}
