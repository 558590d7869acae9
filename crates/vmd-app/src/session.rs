//! Viewer windows and the state they share.
//!
//! Rendering is out of scope here: a [`Window`] keeps the raw document
//! text, the zoom factor and the anchor it last scrolled to. Navigators
//! talk to their window through an [`EffectQueue`]; the session applies the
//! queued effects once the navigator call has returned, then settles the
//! deferred history notifications into [`SharedState`].

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use vmd_fs::FileSystem;
use vmd_fs::path::resolve_path;
use vmd_nav::{HistoryStatus, Host, LinkModifiers, NavigationHistory, Navigator, Subscription};
use vmd_shell::app_menu::{self, AppMenuModel, Platform};
use vmd_shell::context_menu::{self, ContextModel};
use vmd_shell::menu::render_outline;
use vmd_shell::shared_state::StateSubscription;
use vmd_shell::{HandlerTable, Menu, MenuAction, SharedState, WindowId, Zoom};
use vmd_types::error::{Result, VmdError};
use vmd_types::{LinkDescriptor, Location, ViewerConfig};

use crate::opener::Opener;
use crate::startup::{StartupDocument, WELCOME_DOCUMENT};

/// A side effect requested by a navigator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Scroll(Option<String>),
    Load(PathBuf),
    OpenUrl(String),
    OpenPath(PathBuf),
    OpenWindow(PathBuf),
}

/// [`Host`] that queues effects instead of performing them.
#[derive(Debug, Default)]
pub struct EffectQueue {
    effects: Vec<Effect>,
}

impl EffectQueue {
    fn into_effects(self) -> Vec<Effect> {
        self.effects
    }
}

impl Host for EffectQueue {
    fn scroll_to_anchor(&mut self, anchor: Option<&str>) {
        self.effects.push(Effect::Scroll(anchor.map(str::to_string)));
    }

    fn load_document(&mut self, path: &Path) {
        self.effects.push(Effect::Load(path.to_path_buf()));
    }

    fn open_external(&mut self, href: &str) {
        self.effects.push(Effect::OpenUrl(href.to_string()));
    }

    fn open_item(&mut self, path: &Path) {
        self.effects.push(Effect::OpenPath(path.to_path_buf()));
    }

    fn open_in_new_window(&mut self, path: &Path) {
        self.effects.push(Effect::OpenWindow(path.to_path_buf()));
    }
}

pub struct Window {
    id: WindowId,
    navigator: Navigator,
    zoom: Zoom,
    title: String,
    contents: String,
    scroll: Option<String>,
    devtools: bool,
    hidden: bool,
    size: (u32, u32),
    /// User stylesheets resolved against the working directory.
    stylesheets: Vec<PathBuf>,
    highlight: String,
    /// Last status seen by the history listener.
    latest_status: Rc<Cell<Option<HistoryStatus>>>,
    _history_sub: Subscription,
}

impl Window {
    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn document(&self) -> Option<&Path> {
        self.navigator.current_document()
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    /// Anchor of the last scroll; `None` is the top.
    pub fn scroll_anchor(&self) -> Option<&str> {
        self.scroll.as_deref()
    }

    pub fn history(&self) -> &NavigationHistory {
        self.navigator.history()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Width and height in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn stylesheets(&self) -> &[PathBuf] {
        &self.stylesheets
    }
}

/// `<file name> - <title>`, or just the title for pathless content.
fn window_title(document: Option<&Path>, title: &str) -> String {
    match document.and_then(Path::file_name) {
        Some(name) => format!("{} - {title}", name.to_string_lossy()),
        None => title.to_string(),
    }
}

pub struct Session {
    config: ViewerConfig,
    fs: Box<dyn FileSystem>,
    opener: Box<dyn Opener>,
    cwd: PathBuf,
    shared: SharedState,
    windows: Vec<Window>,
    next_window_id: WindowId,
    app_menu: Rc<RefCell<Menu<AppMenuModel>>>,
    _menu_sub: StateSubscription,
    clipboard: Option<String>,
    output: Vec<String>,
    quit: bool,
}

impl Session {
    pub fn new(
        config: ViewerConfig,
        fs: Box<dyn FileSystem>,
        opener: Box<dyn Opener>,
        cwd: PathBuf,
    ) -> Self {
        Self::with_platform(config, fs, opener, cwd, Platform::current())
    }

    pub fn with_platform(
        config: ViewerConfig,
        fs: Box<dyn FileSystem>,
        opener: Box<dyn Opener>,
        cwd: PathBuf,
        platform: Platform,
    ) -> Self {
        let app_menu = Rc::new(RefCell::new(Menu::new(
            app_menu::template(platform),
            AppMenuModel::default(),
        )));

        // The menu bar follows whatever window has focus.
        let mut shared = SharedState::new();
        let menu = Rc::clone(&app_menu);
        let menu_sub = shared.subscribe(move |state, _| {
            menu.borrow_mut()
                .update(AppMenuModel::from_window(state.focused_window_state()));
        });

        Self {
            config,
            fs,
            opener,
            cwd,
            shared,
            windows: Vec::new(),
            next_window_id: 1,
            app_menu,
            _menu_sub: menu_sub,
            clipboard: None,
            output: Vec::new(),
            quit: false,
        }
    }

    // -- Windows --

    /// Create a window showing `document` and focus it.
    pub fn open_window(&mut self, document: StartupDocument) -> WindowId {
        let id = self.next_window_id;
        self.next_window_id += 1;

        let latest_status = Rc::new(Cell::new(None));
        let mut navigator = Navigator::new();
        let sink = Rc::clone(&latest_status);
        let history_sub = navigator
            .history_mut()
            .subscribe(move |status| sink.set(Some(status)));

        self.windows.push(Window {
            id,
            navigator,
            zoom: Zoom::new(self.config.zoom),
            title: self.config.title.clone(),
            contents: String::new(),
            scroll: None,
            devtools: self.config.devtools,
            hidden: false,
            size: (self.config.window.width, self.config.window.height),
            stylesheets: self
                .config
                .stylesheets()
                .into_iter()
                .map(|p| resolve_path(&self.cwd, p))
                .collect(),
            highlight: self.config.highlight.source(),
            latest_status,
            _history_sub: history_sub,
        });
        self.shared.set_focused_window(Some(id));
        log::info!("Opened window {id}");

        match document {
            StartupDocument::File(path) => self.apply(id, vec![Effect::Load(path)]),
            StartupDocument::Welcome => {
                if let Some(window) = self.windows.iter_mut().find(|w| w.id == id) {
                    window.contents = WELCOME_DOCUMENT.to_string();
                    window.navigator.document_loaded(None);
                }
            },
        }
        self.settle();
        id
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn focused_window(&self) -> Option<&Window> {
        self.shared.focused_window().and_then(|id| self.window(id))
    }

    pub fn focus(&mut self, id: WindowId) -> Result<()> {
        self.index_of(id)?;
        self.shared.set_focused_window(Some(id));
        Ok(())
    }

    /// Close the focused window and focus the most recently opened one left.
    pub fn close_focused(&mut self) -> Result<WindowId> {
        let idx = self.focused_index()?;
        let id = self.windows.remove(idx).id;
        self.shared.remove_window(id);
        if let Some(last) = self.windows.last() {
            let next = last.id;
            self.shared.set_focused_window(Some(next));
        }
        log::info!("Closed window {id}");
        Ok(id)
    }

    pub fn shared_state(&self) -> &SharedState {
        &self.shared
    }

    /// Quit was requested, or the last window was closed.
    pub fn should_quit(&self) -> bool {
        self.quit || self.windows.is_empty()
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    fn index_of(&self, id: WindowId) -> Result<usize> {
        self.windows
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| VmdError::Command(format!("no window {id}")))
    }

    fn focused_index(&self) -> Result<usize> {
        let id = self
            .shared
            .focused_window()
            .ok_or_else(|| VmdError::Command("no focused window".into()))?;
        self.index_of(id)
    }

    // -- Navigation --

    /// Open `path` (relative to the working directory) in the focused window,
    /// or in a new one.
    pub fn open(&mut self, path: &Path, new_window: bool) -> Result<()> {
        let target = resolve_path(&self.cwd, path);
        let meta = self.fs.stat(&target)?;
        if meta.is_dir() {
            return Err(VmdError::Fs(format!(
                "Cannot open {}: is a directory",
                target.display()
            )));
        }
        let link = LinkDescriptor::MarkdownFile {
            target_path: target,
        };
        let modifiers = LinkModifiers {
            open_in_new_context: new_window,
        };
        self.activate_link(&link, modifiers)
    }

    /// Classify `raw_ref` against the focused document and act on it.
    pub fn follow(&mut self, raw_ref: &str, new_window: bool) -> Result<Option<LinkDescriptor>> {
        let idx = self.focused_index()?;
        let id = self.windows[idx].id;
        let modifiers = LinkModifiers {
            open_in_new_context: new_window,
        };
        let mut host = EffectQueue::default();
        let link = self.windows[idx]
            .navigator
            .follow(raw_ref, modifiers, self.fs.as_ref(), &mut host);
        self.apply(id, host.into_effects());
        self.settle();
        Ok(link)
    }

    pub fn activate_link(&mut self, link: &LinkDescriptor, modifiers: LinkModifiers) -> Result<()> {
        let idx = self.focused_index()?;
        let id = self.windows[idx].id;
        let mut host = EffectQueue::default();
        self.windows[idx]
            .navigator
            .handle_link_activation(link, modifiers, &mut host);
        self.apply(id, host.into_effects());
        self.settle();
        Ok(())
    }

    /// Classification only, no side effects.
    pub fn classify(&self, raw_ref: &str) -> Result<Option<LinkDescriptor>> {
        let idx = self.focused_index()?;
        let current = self.windows[idx].document();
        Ok(vmd_nav::classify(current, raw_ref, self.fs.as_ref()))
    }

    pub fn back(&mut self, steps: usize) -> Result<Option<Location>> {
        self.step(|nav, host| nav.back(steps, host))
    }

    pub fn forward(&mut self, steps: usize) -> Result<Option<Location>> {
        self.step(|nav, host| nav.forward(steps, host))
    }

    fn step(
        &mut self,
        f: impl FnOnce(&mut Navigator, &mut EffectQueue) -> Option<Location>,
    ) -> Result<Option<Location>> {
        let idx = self.focused_index()?;
        let id = self.windows[idx].id;
        let mut host = EffectQueue::default();
        let location = f(&mut self.windows[idx].navigator, &mut host);
        self.apply(id, host.into_effects());
        self.settle();
        Ok(location)
    }

    /// Reload every window showing `path`, leaving history untouched.
    pub fn file_changed(&mut self, path: &Path) {
        let ids: Vec<WindowId> = self.shared.windows_showing(path).collect();
        for id in ids {
            let Ok(idx) = self.index_of(id) else {
                continue;
            };
            let mut host = EffectQueue::default();
            self.windows[idx].navigator.content_updated(&mut host);
            self.apply(id, host.into_effects());
        }
        self.settle();
    }

    /// Documents that should be watched for changes.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        if !self.config.watch {
            return Vec::new();
        }
        let mut paths: Vec<PathBuf> = self
            .windows
            .iter()
            .filter_map(|w| w.document().map(Path::to_path_buf))
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }

    fn apply(&mut self, id: WindowId, effects: Vec<Effect>) {
        for effect in effects {
            log::debug!("window {id}: {effect:?}");
            match effect {
                Effect::Scroll(anchor) => {
                    match &anchor {
                        Some(a) => self.say(format!("Scrolled to #{a}")),
                        None => self.say("Scrolled to top"),
                    }
                    if let Ok(idx) = self.index_of(id) {
                        self.windows[idx].scroll = anchor;
                    }
                },
                Effect::Load(path) => self.load(id, &path),
                Effect::OpenUrl(url) => {
                    let result = self.opener.open_url(&url);
                    self.report(result.map(|()| format!("Opened {url}")));
                },
                Effect::OpenPath(path) => {
                    let result = self.opener.open_path(&path);
                    self.report(result.map(|()| format!("Opened {}", path.display())));
                },
                Effect::OpenWindow(path) => {
                    self.open_window(StartupDocument::File(path));
                },
            }
        }
    }

    fn load(&mut self, id: WindowId, path: &Path) {
        let contents = match self.fs.read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("Cannot open {}: {e}", path.display());
                self.say(format!("Cannot open {}: {e}", path.display()));
                return;
            },
        };
        let Ok(idx) = self.index_of(id) else {
            return;
        };

        let window = &mut self.windows[idx];
        window.navigator.document_loaded(Some(path));
        window.title = window_title(Some(path), &self.config.title);
        window.contents = contents;
        // Back/forward onto an anchored entry lands on the anchor.
        window.scroll = window
            .history()
            .current()
            .filter(|loc| loc.document_path.as_deref() == Some(path))
            .and_then(|loc| loc.anchor.clone());
        let title = window.title.clone();
        let anchor = window.scroll.clone();

        self.shared.set_file_path(id, path);
        self.say(format!("Loaded {} [{title}]", path.display()));
        if let Some(anchor) = anchor {
            self.say(format!("Scrolled to #{anchor}"));
        }
    }

    /// Deliver pending history notifications and mirror the result into
    /// the shared state.
    fn settle(&mut self) {
        let mut updates = Vec::new();
        for window in &mut self.windows {
            if window.navigator.history_mut().dispatch_notifications() > 0
                && let Some(status) = window.latest_status.get()
            {
                updates.push((window.id, status));
            }
        }
        for (id, status) in updates {
            self.shared.set_history_status(id, status);
        }
    }

    // -- Selection, zoom, devtools --

    pub fn select(&mut self, text: Option<&str>) -> Result<()> {
        let idx = self.focused_index()?;
        let id = self.windows[idx].id;
        match text {
            Some(text) if !text.is_empty() => self.shared.set_selection(id, text),
            _ => self.shared.clear_selection(id),
        }
        Ok(())
    }

    pub fn select_all(&mut self) -> Result<()> {
        let idx = self.focused_index()?;
        let contents = self.windows[idx].contents.clone();
        self.select(Some(&contents))
    }

    pub fn zoom_in(&mut self) -> Result<f32> {
        let idx = self.focused_index()?;
        Ok(self.windows[idx].zoom.zoom_in())
    }

    pub fn zoom_out(&mut self) -> Result<f32> {
        let idx = self.focused_index()?;
        Ok(self.windows[idx].zoom.zoom_out())
    }

    pub fn zoom_reset(&mut self) -> Result<f32> {
        let idx = self.focused_index()?;
        Ok(self.windows[idx].zoom.reset())
    }

    pub fn toggle_devtools(&mut self) -> Result<bool> {
        let idx = self.focused_index()?;
        let window = &mut self.windows[idx];
        window.devtools = !window.devtools;
        Ok(window.devtools)
    }

    /// Hide the focused window, or with `others` every window but the
    /// focused one. Focus does not move. Returns how many were hidden.
    pub fn hide(&mut self, others: bool) -> Result<usize> {
        let focused = self.windows[self.focused_index()?].id;
        let mut count = 0;
        for window in &mut self.windows {
            if (window.id == focused) != others && !window.hidden {
                window.hidden = true;
                count += 1;
            }
        }
        log::debug!("Hid {count} window(s)");
        Ok(count)
    }

    /// Show every hidden window. Returns how many were shown.
    pub fn unhide_all(&mut self) -> usize {
        let mut count = 0;
        for window in self.windows.iter_mut().filter(|w| w.hidden) {
            window.hidden = false;
            count += 1;
        }
        count
    }

    /// Line numbers (1-based) of the focused document containing `needle`,
    /// case-insensitively.
    pub fn find(&self, needle: &str) -> Result<Vec<usize>> {
        let idx = self.focused_index()?;
        let needle = needle.to_lowercase();
        Ok(self.windows[idx]
            .contents
            .lines()
            .enumerate()
            .filter(|(_, line)| line.to_lowercase().contains(&needle))
            .map(|(i, _)| i + 1)
            .collect())
    }

    // -- Clipboard --

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    fn copy(&mut self, text: Option<String>) {
        match text {
            Some(text) => {
                self.say(format!("Copied {text:?}"));
                self.clipboard = Some(text);
            },
            None => self.say("Nothing to copy"),
        }
    }

    // -- Menus --

    pub fn app_menu_outline(&self) -> String {
        render_outline(self.app_menu.borrow().items())
    }

    pub fn activate_menu(&mut self, action: MenuAction) -> Result<()> {
        let menu = self.app_menu.borrow().clone();
        menu.activate(action, &app_menu_handlers(), self)
    }

    /// Context menu for the link and image references under the pointer.
    pub fn context_menu(
        &self,
        link_ref: Option<&str>,
        image_ref: Option<&str>,
    ) -> Result<Menu<ContextModel>> {
        let idx = self.focused_index()?;
        let window = &self.windows[idx];
        let selection = self
            .shared
            .window_state(window.id)
            .and_then(|w| w.selection.clone());
        let model = ContextModel::classify(
            window.document(),
            link_ref,
            image_ref,
            selection,
            self.fs.as_ref(),
        );
        Ok(Menu::new(context_menu::template(), model))
    }

    pub fn activate_context(&mut self, menu: &Menu<ContextModel>, action: MenuAction) -> Result<()> {
        menu.activate(action, &context_menu_handlers(), self)
    }

    // -- Output --

    pub fn status_report(&self) -> Result<String> {
        let idx = self.focused_index()?;
        let window = &self.windows[idx];
        let status = window.history().status();
        let document = window
            .document()
            .map_or_else(|| "(welcome)".to_string(), |p| p.display().to_string());
        let selection = self
            .shared
            .window_state(window.id)
            .is_some_and(|w| w.has_selection());
        let styles = if window.stylesheets.is_empty() {
            "built-in".to_string()
        } else {
            window
                .stylesheets
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };

        Ok(format!(
            "window {} \"{}\"\ndocument: {document}\nscroll: {}\nhistory: {}/{} back={} forward={}\nzoom: {}%\nsize: {}x{}\nstyles: {styles}\nhighlight: {}\nselection: {}\nhidden: {}",
            window.id,
            window.title,
            window.scroll.as_deref().map_or("top".to_string(), |a| format!("#{a}")),
            status.position.map_or(0, |p| p + 1),
            status.len,
            status.can_go_back,
            status.can_go_forward,
            window.zoom.percent(),
            window.size.0,
            window.size.1,
            window.highlight,
            if selection { "yes" } else { "no" },
            if window.hidden { "yes" } else { "no" },
        ))
    }

    pub fn history_report(&self) -> Result<String> {
        let idx = self.focused_index()?;
        let history = self.windows[idx].history();
        let lines: Vec<String> = history
            .entries()
            .iter()
            .enumerate()
            .map(|(i, loc)| {
                let marker = if Some(i) == history.position() { '*' } else { ' ' };
                format!("{marker} {i:>3}  {loc}")
            })
            .collect();
        Ok(lines.join("\n"))
    }

    pub fn say(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    fn report(&mut self, result: Result<String>) {
        match result {
            Ok(line) => self.say(line),
            Err(e) => {
                log::warn!("{e}");
                self.say(format!("error: {e}"));
            },
        }
    }

    /// Lines produced since the last call.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }
}

fn app_menu_handlers() -> HandlerTable<AppMenuModel, Session> {
    HandlerTable::<AppMenuModel, Session>::new()
        .on(MenuAction::Open, |_, s| s.say("usage: open <path>"))
        .on(MenuAction::OpenInNewWindow, |_, s| {
            s.say("usage: open --new <path>")
        })
        .on(MenuAction::Print, |_, s| {
            let contents = s.focused_window().map(|w| w.contents().to_string());
            if let Some(contents) = contents {
                s.say(contents);
            }
        })
        .on(MenuAction::CloseWindow, |_, s| {
            let result = s.close_focused().map(|id| format!("Closed window {id}"));
            s.report(result);
        })
        .on(MenuAction::Quit, |_, s| s.request_quit())
        .on(MenuAction::Hide, |_, s| {
            let result = s.hide(false).map(|n| format!("Hid {n} window(s)"));
            s.report(result);
        })
        .on(MenuAction::HideOthers, |_, s| {
            let result = s.hide(true).map(|n| format!("Hid {n} window(s)"));
            s.report(result);
        })
        .on(MenuAction::Unhide, |_, s| {
            let n = s.unhide_all();
            s.say(format!("Showed {n} window(s)"));
        })
        .on(MenuAction::Find, |_, s| s.say("usage: find <text>"))
        .on(MenuAction::Copy, |_, s| {
            let selection = s
                .shared
                .focused_window_state()
                .and_then(|w| w.selection.clone());
            s.copy(selection);
        })
        .on(MenuAction::SelectAll, |_, s| {
            let result = s.select_all().map(|()| "Selected all".to_string());
            s.report(result);
        })
        .on(MenuAction::HistoryBack, |_, s| {
            let result = s.back(1).map(|loc| describe_step(loc.as_ref()));
            s.report(result);
        })
        .on(MenuAction::HistoryForward, |_, s| {
            let result = s.forward(1).map(|loc| describe_step(loc.as_ref()));
            s.report(result);
        })
        .on(MenuAction::ZoomIn, |_, s| {
            let result = s.zoom_in().map(describe_zoom);
            s.report(result);
        })
        .on(MenuAction::ZoomOut, |_, s| {
            let result = s.zoom_out().map(describe_zoom);
            s.report(result);
        })
        .on(MenuAction::ZoomReset, |_, s| {
            let result = s.zoom_reset().map(describe_zoom);
            s.report(result);
        })
        .on(MenuAction::ToggleDevTools, |_, s| {
            let result = s
                .toggle_devtools()
                .map(|on| format!("Developer tools {}", if on { "on" } else { "off" }));
            s.report(result);
        })
        .on(MenuAction::SourceCode, open_help_url(MenuAction::SourceCode))
        .on(MenuAction::ReportIssue, open_help_url(MenuAction::ReportIssue))
        .on(MenuAction::Releases, open_help_url(MenuAction::Releases))
        .on(MenuAction::About, |_, s| {
            s.say(format!("vmd {}", env!("CARGO_PKG_VERSION")));
        })
}

fn open_help_url(action: MenuAction) -> impl Fn(&AppMenuModel, &mut Session) {
    move |_, s| {
        if let Some(url) = app_menu::help_url(action) {
            let result = s.opener.open_url(url).map(|()| format!("Opened {url}"));
            s.report(result);
        }
    }
}

fn context_menu_handlers() -> HandlerTable<ContextModel, Session> {
    fn activate(link: Option<&LinkDescriptor>, modifiers: LinkModifiers, s: &mut Session) {
        if let Some(link) = link {
            let result = s.activate_link(link, modifiers);
            if let Err(e) = result {
                s.say(format!("error: {e}"));
            }
        }
    }
    let plain = LinkModifiers::default();
    let new_window = LinkModifiers {
        open_in_new_context: true,
    };

    let mut table = HandlerTable::<ContextModel, Session>::new()
        .on(MenuAction::OpenFolder, move |m, s| {
            activate(m.link.as_ref(), plain, s)
        })
        .on(MenuAction::OpenFile, move |m, s| {
            activate(m.link.as_ref(), plain, s)
        })
        .on(MenuAction::OpenImage, move |m, s| {
            activate(m.image.as_ref(), plain, s)
        })
        .on(MenuAction::OpenFileInNewWindow, move |m, s| {
            activate(m.link.as_ref(), new_window, s)
        })
        .on(MenuAction::ScrollToAnchor, move |m, s| {
            activate(m.link.as_ref(), plain, s)
        })
        .on(MenuAction::OpenLink, move |m, s| {
            activate(m.link.as_ref(), plain, s)
        })
        .on(MenuAction::CopyImage, |m, s| {
            let target = m.image.as_ref().and_then(|img| {
                img.href()
                    .map(str::to_string)
                    .or_else(|| img.target_path().map(|p| p.display().to_string()))
            });
            s.copy(target);
        })
        .on(MenuAction::SelectAll, |_, s| {
            let result = s.select_all().map(|()| "Selected all".to_string());
            s.report(result);
        })
        .on(MenuAction::InspectElement, |_, s| {
            if let Ok(idx) = s.focused_index() {
                s.windows[idx].devtools = true;
                s.say("Developer tools on");
            }
        });

    for action in [
        MenuAction::Copy,
        MenuAction::CopyLinkAddress,
        MenuAction::CopyImageAddress,
        MenuAction::CopyPath,
        MenuAction::CopyImagePath,
    ] {
        table.register(action, move |m: &ContextModel, s: &mut Session| {
            s.copy(context_menu::clipboard_text(action, m));
        });
    }
    table
}

fn describe_step(location: Option<&Location>) -> String {
    match location {
        Some(loc) => format!("At {loc}"),
        None => "History is empty".to_string(),
    }
}

fn describe_zoom(factor: f32) -> String {
    format!("Zoom {:.0}%", factor * 100.0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use vmd_fs::MemoryFs;

    /// Opener that records what it was asked to open.
    #[derive(Default, Clone)]
    pub(crate) struct RecordingOpener {
        pub opened: Rc<RefCell<Vec<String>>>,
    }

    impl Opener for RecordingOpener {
        fn open_url(&mut self, url: &str) -> Result<()> {
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }

        fn open_path(&mut self, path: &Path) -> Result<()> {
            self.opened.borrow_mut().push(path.display().to_string());
            Ok(())
        }
    }

    pub(crate) fn docs_fs() -> MemoryFs {
        let mut fs = MemoryFs::new();
        fs.write("/docs/a.md", "# A\n\nSee [b](b.md).\n\n## Usage\n")
            .unwrap();
        fs.write("/docs/b.md", "# B\n").unwrap();
        fs.write("/docs/logo.png", "").unwrap();
        fs.mkdir("/docs/assets").unwrap();
        fs
    }

    pub(crate) fn session_with(fs: MemoryFs) -> (Session, RecordingOpener) {
        let opener = RecordingOpener::default();
        let session = Session::with_platform(
            ViewerConfig::default(),
            Box::new(fs),
            Box::new(opener.clone()),
            PathBuf::from("/docs"),
            Platform::Other,
        );
        (session, opener)
    }

    fn session_at_a() -> (Session, RecordingOpener) {
        let (mut session, opener) = session_with(docs_fs());
        session.open_window(StartupDocument::File("/docs/a.md".into()));
        session.take_output();
        (session, opener)
    }

    fn focused_status(session: &Session) -> Option<HistoryStatus> {
        session.shared_state().focused_window_state().and_then(|w| w.history)
    }

    #[test]
    fn startup_file_seeds_history_and_shared_state() {
        let (session, _) = session_at_a();
        let window = session.focused_window().unwrap();
        assert_eq!(window.document(), Some(Path::new("/docs/a.md")));
        assert_eq!(window.title(), "a.md - vmd");
        assert!(window.contents().starts_with("# A"));
        assert_eq!(window.history().len(), 1);

        let state = session.shared_state().focused_window_state().unwrap();
        assert_eq!(state.file_path.as_deref(), Some(Path::new("/docs/a.md")));
        assert!(!state.history.unwrap().can_go_back);
    }

    #[test]
    fn welcome_window_has_no_document() {
        let (mut session, _) = session_with(docs_fs());
        session.open_window(StartupDocument::Welcome);
        let window = session.focused_window().unwrap();
        assert!(window.document().is_none());
        assert_eq!(window.contents(), WELCOME_DOCUMENT);
        assert_eq!(window.title(), "vmd");
        assert_eq!(window.history().current(), Some(&Location::default()));
    }

    #[test]
    fn follow_markdown_then_back() {
        let (mut session, _) = session_at_a();
        let link = session.follow("b.md", false).unwrap().unwrap();
        assert_eq!(link.target_path(), Some(Path::new("/docs/b.md")));
        assert_eq!(
            session.focused_window().unwrap().document(),
            Some(Path::new("/docs/b.md"))
        );
        assert!(focused_status(&session).unwrap().can_go_back);
        assert!(session.app_menu.borrow().is_enabled(MenuAction::HistoryBack));

        let loc = session.back(1).unwrap();
        assert_eq!(loc, Some(Location::document("/docs/a.md")));
        assert_eq!(
            session.focused_window().unwrap().document(),
            Some(Path::new("/docs/a.md"))
        );
        assert!(focused_status(&session).unwrap().can_go_forward);
        assert!(session.app_menu.borrow().is_enabled(MenuAction::HistoryForward));
    }

    #[test]
    fn forward_to_anchored_entry_in_other_document_scrolls_after_load() {
        let (mut session, _) = session_at_a();
        session.follow("b.md", false).unwrap();
        session.follow("#intro", false).unwrap();
        session.back(2).unwrap();
        assert_eq!(session.focused_window().unwrap().scroll_anchor(), None);
        session.take_output();

        let loc = session.forward(2).unwrap().unwrap();
        assert_eq!(loc.anchor.as_deref(), Some("intro"));
        let window = session.focused_window().unwrap();
        assert_eq!(window.document(), Some(Path::new("/docs/b.md")));
        assert_eq!(window.scroll_anchor(), Some("intro"));
        assert_eq!(
            session.take_output(),
            vec![
                "Loaded /docs/b.md [b.md - vmd]".to_string(),
                "Scrolled to #intro".to_string(),
            ]
        );
    }

    #[test]
    fn window_carries_size_and_styles_from_config() {
        let config = ViewerConfig::from_toml_str(
            r#"
            [window]
            width = 1024
            height = 768

            [styles]
            main = "theme/main.css"

            [highlight]
            theme = "monokai"
            "#,
        )
        .unwrap();
        let mut session = Session::with_platform(
            config,
            Box::new(docs_fs()),
            Box::new(RecordingOpener::default()),
            PathBuf::from("/docs"),
            Platform::Other,
        );
        session.open_window(StartupDocument::File("/docs/a.md".into()));

        let window = session.focused_window().unwrap();
        assert_eq!(window.size(), (1024, 768));
        assert_eq!(window.stylesheets(), [PathBuf::from("/docs/theme/main.css")]);

        let status = session.status_report().unwrap();
        assert!(status.contains("size: 1024x768"));
        assert!(status.contains("styles: /docs/theme/main.css"));
        assert!(status.contains("highlight: monokai"));
    }

    #[test]
    fn default_status_reports_built_in_styles() {
        let (session, _) = session_at_a();
        let status = session.status_report().unwrap();
        assert!(status.contains("size: 800x600"));
        assert!(status.contains("styles: built-in"));
        assert!(status.contains("highlight: default"));
    }

    #[test]
    fn anchors_scroll_without_reloading() {
        let (mut session, _) = session_at_a();
        session.follow("#usage", false).unwrap();
        assert_eq!(session.take_output(), vec!["Scrolled to #usage".to_string()]);
        assert_eq!(session.focused_window().unwrap().scroll_anchor(), Some("usage"));

        session.back(1).unwrap();
        assert_eq!(session.focused_window().unwrap().scroll_anchor(), None);
    }

    #[test]
    fn external_and_plain_files_go_to_the_opener() {
        let (mut session, opener) = session_at_a();
        session.follow("https://example.com", false).unwrap();
        session.follow("logo.png", false).unwrap();
        session.follow("assets", false).unwrap();
        assert_eq!(
            *opener.opened.borrow(),
            vec!["https://example.com", "/docs/logo.png", "/docs/assets"]
        );
        assert_eq!(session.focused_window().unwrap().history().len(), 1);
    }

    #[test]
    fn unresolvable_reference_is_ignored() {
        let (mut session, _) = session_at_a();
        assert_eq!(session.follow("missing.md", false).unwrap(), None);
        assert!(session.take_output().is_empty());
    }

    #[test]
    fn latin1_document_is_displayed() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.md");
        let b = dir.path().join("b.md");
        std::fs::write(&a, "# A\n").unwrap();
        std::fs::write(&b, b"# caf\xe9\n").unwrap();

        let mut session = Session::with_platform(
            ViewerConfig::default(),
            Box::new(vmd_fs::NativeFs),
            Box::new(RecordingOpener::default()),
            dir.path().to_path_buf(),
            Platform::Other,
        );
        session.open_window(StartupDocument::File(a));
        session.follow("b.md", false).unwrap();

        let window = session.focused_window().unwrap();
        assert_eq!(window.document(), Some(b.as_path()));
        assert_eq!(window.history().current(), Some(&Location::document(&b)));
        assert!(window.contents().starts_with("# caf"));
    }

    #[test]
    fn new_window_gets_focus() {
        let (mut session, _) = session_at_a();
        session.follow("b.md", true).unwrap();
        assert_eq!(session.windows().len(), 2);
        let focused = session.focused_window().unwrap();
        assert_eq!(focused.id(), 2);
        assert_eq!(focused.document(), Some(Path::new("/docs/b.md")));
        assert_eq!(session.window(1).unwrap().history().len(), 1);
    }

    #[test]
    fn mac_app_menu_hides_and_shows_windows() {
        let mut session = Session::with_platform(
            ViewerConfig::default(),
            Box::new(docs_fs()),
            Box::new(RecordingOpener::default()),
            PathBuf::from("/docs"),
            Platform::MacOs,
        );
        session.open_window(StartupDocument::File("/docs/a.md".into()));
        session.open_window(StartupDocument::File("/docs/b.md".into()));
        session.take_output();

        session.activate_menu(MenuAction::HideOthers).unwrap();
        assert!(session.window(1).unwrap().is_hidden());
        assert!(!session.window(2).unwrap().is_hidden());
        assert_eq!(session.focused_window().unwrap().id(), 2);

        session.activate_menu(MenuAction::Hide).unwrap();
        assert!(session.status_report().unwrap().contains("hidden: yes"));

        session.activate_menu(MenuAction::Unhide).unwrap();
        assert!(session.windows().iter().all(|w| !w.is_hidden()));
        assert_eq!(
            session.take_output(),
            vec![
                "Hid 1 window(s)".to_string(),
                "Hid 1 window(s)".to_string(),
                "Showed 2 window(s)".to_string(),
            ]
        );
    }

    #[test]
    fn open_resolves_against_cwd() {
        let (mut session, _) = session_at_a();
        session.open(Path::new("b.md"), false).unwrap();
        assert_eq!(
            session.focused_window().unwrap().document(),
            Some(Path::new("/docs/b.md"))
        );
        assert!(session.open(Path::new("assets"), false).is_err());
        assert!(session.open(Path::new("missing.md"), false).is_err());
    }

    #[test]
    fn file_change_reloads_without_history() {
        let mut fs = docs_fs();
        fs.write("/docs/a.md", "# A\n").unwrap();
        let (mut session, _) = session_with(fs);
        session.open_window(StartupDocument::File("/docs/a.md".into()));
        session.take_output();

        session.file_changed(Path::new("/docs/a.md"));
        assert_eq!(session.take_output().len(), 1);
        assert_eq!(session.focused_window().unwrap().history().len(), 1);

        session.file_changed(Path::new("/docs/b.md"));
        assert!(session.take_output().is_empty());
    }

    #[test]
    fn watched_paths_follow_documents() {
        let (mut session, _) = session_at_a();
        session.follow("b.md", true).unwrap();
        assert_eq!(
            session.watched_paths(),
            vec![PathBuf::from("/docs/a.md"), PathBuf::from("/docs/b.md")]
        );
    }

    #[test]
    fn closing_last_window_quits() {
        let (mut session, _) = session_at_a();
        session.follow("b.md", true).unwrap();
        assert_eq!(session.close_focused().unwrap(), 2);
        assert_eq!(session.focused_window().unwrap().id(), 1);
        assert!(!session.should_quit());
        session.close_focused().unwrap();
        assert!(session.should_quit());
    }

    #[test]
    fn copy_menu_item_tracks_selection() {
        let (mut session, _) = session_at_a();
        assert!(session.activate_menu(MenuAction::Copy).is_err());

        session.select(Some("hello")).unwrap();
        session.activate_menu(MenuAction::Copy).unwrap();
        assert_eq!(session.clipboard(), Some("hello"));

        session.select(None).unwrap();
        assert!(!session.app_menu.borrow().is_enabled(MenuAction::Copy));
    }

    #[test]
    fn zoom_through_menu() {
        let (mut session, _) = session_at_a();
        session.activate_menu(MenuAction::ZoomIn).unwrap();
        assert_eq!(session.focused_window().unwrap().zoom().percent(), 110);
        session.activate_menu(MenuAction::ZoomReset).unwrap();
        assert_eq!(session.focused_window().unwrap().zoom().percent(), 100);
    }

    #[test]
    fn help_menu_opens_project_pages() {
        let (mut session, opener) = session_at_a();
        session.activate_menu(MenuAction::ReportIssue).unwrap();
        assert_eq!(*opener.opened.borrow(), vec![app_menu::ISSUES_URL]);
    }

    #[test]
    fn context_menu_copy_path_and_open() {
        let (mut session, _) = session_at_a();
        let menu = session.context_menu(Some("b.md"), None).unwrap();
        assert!(menu.find(MenuAction::OpenFileInNewWindow).is_some());

        session.activate_context(&menu, MenuAction::CopyPath).unwrap();
        assert_eq!(session.clipboard(), Some("/docs/b.md"));

        session.activate_context(&menu, MenuAction::OpenFile).unwrap();
        assert_eq!(
            session.focused_window().unwrap().document(),
            Some(Path::new("/docs/b.md"))
        );
        assert!(session.activate_context(&menu, MenuAction::OpenLink).is_err());
    }

    #[test]
    fn find_reports_line_numbers() {
        let (session, _) = session_at_a();
        assert_eq!(session.find("usage").unwrap(), vec![5]);
        assert!(session.find("nothing").unwrap().is_empty());
    }

    #[test]
    fn history_report_marks_current() {
        let (mut session, _) = session_at_a();
        session.follow("#usage", false).unwrap();
        session.back(1).unwrap();
        assert_eq!(
            session.history_report().unwrap(),
            "*   0  /docs/a.md\n    1  /docs/a.md#usage"
        );
    }
}
