//! Per-window navigator.
//!
//! Owns the window's [`NavigationHistory`] and knows which document is on
//! screen. Everything with a side effect outside the core (scrolling,
//! loading, asking the OS to open things) goes through [`Host`].

use std::path::{Path, PathBuf};

use vmd_fs::FileSystem;
use vmd_types::{LinkDescriptor, Location};

use crate::classify::classify;
use crate::history::NavigationHistory;

/// Side effects the navigator asks its window to perform.
pub trait Host {
    /// Scroll to an element id, or to the top when `anchor` is `None`.
    fn scroll_to_anchor(&mut self, anchor: Option<&str>);
    /// Replace the displayed document.
    fn load_document(&mut self, path: &Path);
    /// Hand a URL to the OS default handler.
    fn open_external(&mut self, href: &str);
    /// Open a file or folder with the OS default application.
    fn open_item(&mut self, path: &Path);
    /// Open a markdown file in a separate viewer window.
    fn open_in_new_window(&mut self, path: &Path);
}

/// Modifier state of the activating input (shift-click).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkModifiers {
    pub open_in_new_context: bool,
}

#[derive(Debug, Default)]
pub struct Navigator {
    history: NavigationHistory,
    current_document: Option<PathBuf>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &NavigationHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut NavigationHistory {
        &mut self.history
    }

    /// The document currently on screen.
    pub fn current_document(&self) -> Option<&Path> {
        self.current_document.as_deref()
    }

    /// Show `location`: scroll when it is in the displayed document,
    /// otherwise ask the host to load its document.
    pub fn navigate_to(&self, location: Option<&Location>, host: &mut dyn Host) {
        let Some(location) = location else {
            return;
        };

        let same_document = match &location.document_path {
            None => true,
            Some(path) => self.current_document.as_deref() == Some(path.as_path()),
        };

        if same_document {
            log::debug!("Scrolling to {location}");
            host.scroll_to_anchor(location.anchor.as_deref());
        } else if let Some(path) = &location.document_path {
            log::debug!("Loading {}", path.display());
            host.load_document(path);
        }
    }

    /// React to a click (or menu request) on an already classified link.
    pub fn handle_link_activation(
        &mut self,
        link: &LinkDescriptor,
        modifiers: LinkModifiers,
        host: &mut dyn Host,
    ) {
        match link {
            LinkDescriptor::External { href } => host.open_external(href),
            LinkDescriptor::SameDocumentAnchor {
                document_path,
                anchor,
            } => {
                let location = Location {
                    document_path: document_path.clone(),
                    anchor: anchor.clone(),
                };
                self.push_and_navigate(location, host);
            },
            LinkDescriptor::Directory { target_path } | LinkDescriptor::PlainFile { target_path } => {
                host.open_item(target_path);
            },
            LinkDescriptor::MarkdownFile { target_path } => {
                if modifiers.open_in_new_context {
                    host.open_in_new_window(target_path);
                } else {
                    self.push_and_navigate(Location::document(target_path.clone()), host);
                }
            },
        }
    }

    /// Classify `raw_ref` against the displayed document and activate it.
    ///
    /// Returns the descriptor that was acted on, or `None` when the
    /// reference was ignored.
    pub fn follow(
        &mut self,
        raw_ref: &str,
        modifiers: LinkModifiers,
        fs: &dyn FileSystem,
        host: &mut dyn Host,
    ) -> Option<LinkDescriptor> {
        let link = classify(self.current_document(), raw_ref, fs)?;
        log::debug!("Following {raw_ref:?} as {}", link.kind());
        self.handle_link_activation(&link, modifiers, host);
        Some(link)
    }

    pub fn back(&mut self, steps: usize, host: &mut dyn Host) -> Option<Location> {
        let location = self.history.back(steps).cloned();
        self.navigate_to(location.as_ref(), host);
        location
    }

    pub fn forward(&mut self, steps: usize, host: &mut dyn Host) -> Option<Location> {
        let location = self.history.forward(steps).cloned();
        self.navigate_to(location.as_ref(), host);
        location
    }

    /// Record that the window now displays `path`.
    ///
    /// The first document of a window seeds the history. Content without a
    /// backing file pushes an empty location.
    pub fn document_loaded(&mut self, path: Option<&Path>) {
        match path {
            Some(path) => {
                self.current_document = Some(path.to_path_buf());
                if self.history.current().is_none() {
                    self.history.push(Location::document(path));
                }
            },
            None => {
                self.current_document = None;
                self.history.push(Location::default());
            },
        }
    }

    /// The displayed file changed on disk. Re-render it in place without
    /// touching the history.
    pub fn content_updated(&self, host: &mut dyn Host) {
        if let Some(path) = &self.current_document {
            log::debug!("Reloading {}", path.display());
            host.load_document(path);
        }
    }

    fn push_and_navigate(&mut self, location: Location, host: &mut dyn Host) {
        let target = self.history.push(location).clone();
        self.navigate_to(Some(&target), host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::{HostCall, RecordingHost, docs_fs};

    fn at(path: &str) -> Navigator {
        let mut nav = Navigator::new();
        nav.document_loaded(Some(Path::new(path)));
        nav
    }

    fn new_window() -> LinkModifiers {
        LinkModifiers {
            open_in_new_context: true,
        }
    }

    #[test]
    fn navigate_to_none_does_nothing() {
        let nav = at("/docs/a.md");
        let mut host = RecordingHost::new();
        nav.navigate_to(None, &mut host);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn navigate_within_document_scrolls() {
        let nav = at("/docs/a.md");
        let mut host = RecordingHost::new();
        nav.navigate_to(Some(&Location::anchored("/docs/a.md", "usage")), &mut host);
        nav.navigate_to(Some(&Location::anchor_only("intro")), &mut host);
        nav.navigate_to(Some(&Location::document("/docs/a.md")), &mut host);
        assert_eq!(
            host.calls,
            vec![
                HostCall::Scroll(Some("usage".into())),
                HostCall::Scroll(Some("intro".into())),
                HostCall::Scroll(None),
            ]
        );
    }

    #[test]
    fn navigate_to_other_document_loads() {
        let nav = at("/docs/a.md");
        let mut host = RecordingHost::new();
        nav.navigate_to(Some(&Location::anchored("/docs/b.md", "x")), &mut host);
        assert_eq!(host.calls, vec![HostCall::Load("/docs/b.md".into())]);
    }

    #[test]
    fn external_link_goes_to_os() {
        let mut nav = at("/docs/a.md");
        let mut host = RecordingHost::new();
        let link = LinkDescriptor::External {
            href: "https://example.com".into(),
        };
        nav.handle_link_activation(&link, LinkModifiers::default(), &mut host);
        assert_eq!(host.calls, vec![HostCall::External("https://example.com".into())]);
        assert_eq!(nav.history().len(), 1);
    }

    #[test]
    fn anchor_link_pushes_and_scrolls() {
        let mut nav = at("/docs/a.md");
        let mut host = RecordingHost::new();
        let link = LinkDescriptor::SameDocumentAnchor {
            document_path: Some("/docs/a.md".into()),
            anchor: Some("usage".into()),
        };
        nav.handle_link_activation(&link, LinkModifiers::default(), &mut host);

        assert_eq!(host.calls, vec![HostCall::Scroll(Some("usage".into()))]);
        assert_eq!(
            nav.history().current(),
            Some(&Location::anchored("/docs/a.md", "usage"))
        );
    }

    #[test]
    fn files_and_directories_open_externally() {
        let mut nav = at("/docs/a.md");
        let mut host = RecordingHost::new();
        let dir = LinkDescriptor::Directory {
            target_path: "/docs/assets".into(),
        };
        let file = LinkDescriptor::PlainFile {
            target_path: "/docs/assets/logo.png".into(),
        };
        nav.handle_link_activation(&dir, LinkModifiers::default(), &mut host);
        nav.handle_link_activation(&file, new_window(), &mut host);
        assert_eq!(
            host.calls,
            vec![
                HostCall::OpenItem("/docs/assets".into()),
                HostCall::OpenItem("/docs/assets/logo.png".into()),
            ]
        );
        assert_eq!(nav.history().len(), 1);
    }

    #[test]
    fn markdown_link_pushes_and_loads() {
        let mut nav = at("/docs/a.md");
        let mut host = RecordingHost::new();
        let link = LinkDescriptor::MarkdownFile {
            target_path: "/docs/b.md".into(),
        };
        nav.handle_link_activation(&link, LinkModifiers::default(), &mut host);
        assert_eq!(host.calls, vec![HostCall::Load("/docs/b.md".into())]);
        assert_eq!(nav.history().current(), Some(&Location::document("/docs/b.md")));
    }

    #[test]
    fn shift_click_opens_new_window_without_history() {
        let mut nav = at("/docs/a.md");
        let mut host = RecordingHost::new();
        let link = LinkDescriptor::MarkdownFile {
            target_path: "/docs/b.md".into(),
        };
        nav.handle_link_activation(&link, new_window(), &mut host);
        assert_eq!(host.calls, vec![HostCall::NewWindow("/docs/b.md".into())]);
        assert_eq!(nav.history().len(), 1);
    }

    #[test]
    fn follow_classifies_then_activates() {
        let fs = docs_fs();
        let mut nav = at("/docs/a.md");
        let mut host = RecordingHost::new();

        let link = nav.follow("b.md", LinkModifiers::default(), &fs, &mut host);
        assert_eq!(
            link,
            Some(LinkDescriptor::MarkdownFile {
                target_path: "/docs/b.md".into()
            })
        );
        assert_eq!(host.calls, vec![HostCall::Load("/docs/b.md".into())]);
    }

    #[test]
    fn follow_ignores_missing_targets() {
        let fs = docs_fs();
        let mut nav = at("/docs/a.md");
        let mut host = RecordingHost::new();
        assert_eq!(nav.follow("nope.md", LinkModifiers::default(), &fs, &mut host), None);
        assert!(host.calls.is_empty());
        assert_eq!(nav.history().len(), 1);
    }

    #[test]
    fn back_and_forward_across_documents() {
        let fs = docs_fs();
        let mut nav = at("/docs/a.md");
        let mut host = RecordingHost::new();

        nav.follow("b.md", LinkModifiers::default(), &fs, &mut host);
        nav.document_loaded(Some(Path::new("/docs/b.md")));
        host.calls.clear();

        assert_eq!(nav.back(1, &mut host), Some(Location::document("/docs/a.md")));
        assert_eq!(host.calls, vec![HostCall::Load("/docs/a.md".into())]);
        nav.document_loaded(Some(Path::new("/docs/a.md")));

        // Reloading the first document does not reseed the history.
        assert_eq!(nav.history().len(), 2);
        assert_eq!(nav.history().position(), Some(0));

        host.calls.clear();
        assert_eq!(nav.forward(1, &mut host), Some(Location::document("/docs/b.md")));
        assert_eq!(host.calls, vec![HostCall::Load("/docs/b.md".into())]);
    }

    #[test]
    fn anchor_round_trip_scrolls() {
        let fs = docs_fs();
        let mut nav = at("/docs/a.md");
        let mut host = RecordingHost::new();

        nav.follow("#intro", LinkModifiers::default(), &fs, &mut host);
        nav.back(1, &mut host);
        nav.forward(1, &mut host);

        assert_eq!(
            host.calls,
            vec![
                HostCall::Scroll(Some("intro".into())),
                HostCall::Scroll(None),
                HostCall::Scroll(Some("intro".into())),
            ]
        );
    }

    #[test]
    fn back_on_fresh_window_is_a_no_op() {
        let mut nav = Navigator::new();
        let mut host = RecordingHost::new();
        assert_eq!(nav.back(1, &mut host), None);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn pathless_content_pushes_empty_location() {
        let mut nav = Navigator::new();
        nav.document_loaded(None);
        assert_eq!(nav.history().current(), Some(&Location::default()));
        assert!(nav.current_document().is_none());
    }

    #[test]
    fn content_updated_reloads_without_history() {
        let nav = at("/docs/a.md");
        let mut host = RecordingHost::new();
        nav.content_updated(&mut host);
        assert_eq!(host.calls, vec![HostCall::Load("/docs/a.md".into())]);
        assert_eq!(nav.history().len(), 1);

        let mut host = RecordingHost::new();
        Navigator::new().content_updated(&mut host);
        assert!(host.calls.is_empty());
    }
}
