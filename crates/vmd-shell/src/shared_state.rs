//! Cross-window state.
//!
//! Every viewer window reports what it shows (file, selection, history
//! status) here; the application menu reads the focused window's entry to
//! decide which items are enabled. The container is owned by the app and
//! passed to whoever needs it. State changes only through [`Action`]s, and
//! subscribers run synchronously after each one.

use std::path::{Path, PathBuf};

use vmd_nav::HistoryStatus;

pub type WindowId = u32;

/// What one window reported about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowState {
    pub id: WindowId,
    pub file_path: Option<PathBuf>,
    /// `None` until the window first reports its history.
    pub history: Option<HistoryStatus>,
    pub selection: Option<String>,
}

impl WindowState {
    fn new(id: WindowId) -> Self {
        Self {
            id,
            file_path: None,
            history: None,
            selection: None,
        }
    }

    pub fn has_selection(&self) -> bool {
        self.selection.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// A state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetFocusedWindow(Option<WindowId>),
    SetFilePath(WindowId, PathBuf),
    SetSelection(WindowId, String),
    ClearSelection(WindowId),
    SetHistoryStatus(WindowId, HistoryStatus),
    RemoveWindow(WindowId),
}

type Listener = Box<dyn FnMut(&SharedState, &Action)>;

/// Token returned by [`SharedState::subscribe`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a subscription leaves no way to unsubscribe"]
pub struct StateSubscription(u64);

#[derive(Default)]
pub struct SharedState {
    focused_window: Option<WindowId>,
    windows: Vec<WindowState>,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `action`, then notify every subscriber.
    pub fn dispatch(&mut self, action: Action) {
        log::trace!("shared state: {action:?}");
        self.reduce(&action);

        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in &mut listeners {
            listener(self, &action);
        }
        self.listeners = listeners;
    }

    fn reduce(&mut self, action: &Action) {
        match action {
            Action::SetFocusedWindow(id) => self.focused_window = *id,
            Action::SetFilePath(id, path) => {
                self.window_entry(*id).file_path = Some(path.clone());
            },
            Action::SetSelection(id, text) => {
                self.window_entry(*id).selection = Some(text.clone());
            },
            Action::ClearSelection(id) => self.window_entry(*id).selection = None,
            Action::SetHistoryStatus(id, status) => {
                self.window_entry(*id).history = Some(*status);
            },
            Action::RemoveWindow(id) => {
                self.windows.retain(|w| w.id != *id);
                if self.focused_window == Some(*id) {
                    self.focused_window = None;
                }
            },
        }
    }

    /// Unknown windows get an entry on their first action.
    fn window_entry(&mut self, id: WindowId) -> &mut WindowState {
        let index = match self.windows.iter().position(|w| w.id == id) {
            Some(index) => index,
            None => {
                self.windows.push(WindowState::new(id));
                self.windows.len() - 1
            },
        };
        &mut self.windows[index]
    }

    // -- Action shorthands --

    pub fn set_focused_window(&mut self, id: Option<WindowId>) {
        self.dispatch(Action::SetFocusedWindow(id));
    }

    pub fn set_file_path(&mut self, id: WindowId, path: impl Into<PathBuf>) {
        self.dispatch(Action::SetFilePath(id, path.into()));
    }

    pub fn set_selection(&mut self, id: WindowId, text: impl Into<String>) {
        self.dispatch(Action::SetSelection(id, text.into()));
    }

    pub fn clear_selection(&mut self, id: WindowId) {
        self.dispatch(Action::ClearSelection(id));
    }

    pub fn set_history_status(&mut self, id: WindowId, status: HistoryStatus) {
        self.dispatch(Action::SetHistoryStatus(id, status));
    }

    pub fn remove_window(&mut self, id: WindowId) {
        self.dispatch(Action::RemoveWindow(id));
    }

    // -- Queries --

    pub fn focused_window(&self) -> Option<WindowId> {
        self.focused_window
    }

    pub fn windows(&self) -> &[WindowState] {
        &self.windows
    }

    pub fn window_state(&self, id: WindowId) -> Option<&WindowState> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn focused_window_state(&self) -> Option<&WindowState> {
        self.focused_window.and_then(|id| self.window_state(id))
    }

    /// Windows currently displaying `path`.
    pub fn windows_showing<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = WindowId> + 'a {
        self.windows
            .iter()
            .filter(move |w| w.file_path.as_deref() == Some(path))
            .map(|w| w.id)
    }

    // -- Subscriptions --

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&SharedState, &Action) + 'static,
    ) -> StateSubscription {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        StateSubscription(id)
    }

    pub fn unsubscribe(&mut self, subscription: &StateSubscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription.0);
        self.listeners.len() != before
    }
}

impl std::fmt::Debug for SharedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedState")
            .field("focused_window", &self.focused_window)
            .field("windows", &self.windows)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
