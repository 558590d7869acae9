//! Declarative menus.
//!
//! A menu is a static template of [`MenuItem`]s whose visibility and
//! enabled state are predicates over a model. [`Menu::update`] re-resolves
//! the template against a new model; activating an item looks its
//! [`MenuAction`] up in a [`HandlerTable`].

use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::str::FromStr;

use vmd_types::error::{Result, VmdError};

/// Identifier of every activatable menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    // Application menu
    Open,
    OpenInNewWindow,
    Print,
    CloseWindow,
    Quit,
    Hide,
    HideOthers,
    Unhide,
    Find,
    Copy,
    SelectAll,
    HistoryBack,
    HistoryForward,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ToggleDevTools,
    SourceCode,
    ReportIssue,
    Releases,
    About,
    // Context menu
    OpenFolder,
    OpenFile,
    OpenImage,
    OpenFileInNewWindow,
    ScrollToAnchor,
    OpenLink,
    CopyLinkAddress,
    CopyImageAddress,
    CopyPath,
    CopyImagePath,
    CopyImage,
    InspectElement,
}

impl MenuAction {
    pub const ALL: [Self; 33] = [
        Self::Open,
        Self::OpenInNewWindow,
        Self::Print,
        Self::CloseWindow,
        Self::Quit,
        Self::Hide,
        Self::HideOthers,
        Self::Unhide,
        Self::Find,
        Self::Copy,
        Self::SelectAll,
        Self::HistoryBack,
        Self::HistoryForward,
        Self::ZoomIn,
        Self::ZoomOut,
        Self::ZoomReset,
        Self::ToggleDevTools,
        Self::SourceCode,
        Self::ReportIssue,
        Self::Releases,
        Self::About,
        Self::OpenFolder,
        Self::OpenFile,
        Self::OpenImage,
        Self::OpenFileInNewWindow,
        Self::ScrollToAnchor,
        Self::OpenLink,
        Self::CopyLinkAddress,
        Self::CopyImageAddress,
        Self::CopyPath,
        Self::CopyImagePath,
        Self::CopyImage,
        Self::InspectElement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::OpenInNewWindow => "open-in-new-window",
            Self::Print => "print",
            Self::CloseWindow => "close-window",
            Self::Quit => "quit",
            Self::Hide => "hide",
            Self::HideOthers => "hide-others",
            Self::Unhide => "unhide",
            Self::Find => "find",
            Self::Copy => "copy",
            Self::SelectAll => "select-all",
            Self::HistoryBack => "history-back",
            Self::HistoryForward => "history-forward",
            Self::ZoomIn => "zoom-in",
            Self::ZoomOut => "zoom-out",
            Self::ZoomReset => "zoom-reset",
            Self::ToggleDevTools => "toggle-dev-tools",
            Self::SourceCode => "source-code",
            Self::ReportIssue => "report-issue",
            Self::Releases => "releases",
            Self::About => "about",
            Self::OpenFolder => "open-folder",
            Self::OpenFile => "open-file",
            Self::OpenImage => "open-image",
            Self::OpenFileInNewWindow => "open-file-in-new-window",
            Self::ScrollToAnchor => "scroll-to-anchor",
            Self::OpenLink => "open-link",
            Self::CopyLinkAddress => "copy-link-address",
            Self::CopyImageAddress => "copy-image-address",
            Self::CopyPath => "copy-path",
            Self::CopyImagePath => "copy-image-path",
            Self::CopyImage => "copy-image",
            Self::InspectElement => "inspect-element",
        }
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MenuAction {
    type Err = VmdError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| VmdError::Command(format!("unknown menu action: {s}")))
    }
}

/// Predicate over the menu model.
pub type Predicate<M> = fn(&M) -> bool;

/// One activatable entry of a template.
#[derive(Debug, Clone)]
pub struct ActionItem<M> {
    pub label: String,
    pub action: MenuAction,
    pub accelerator: Option<String>,
    /// Always visible when `None`.
    pub visible: Option<Predicate<M>>,
    /// Always enabled when `None`.
    pub enabled: Option<Predicate<M>>,
}

impl<M> ActionItem<M> {
    pub fn new(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            action,
            accelerator: None,
            visible: None,
            enabled: None,
        }
    }

    pub fn accelerator(mut self, accel: impl Into<String>) -> Self {
        self.accelerator = Some(accel.into());
        self
    }

    pub fn visible_when(mut self, pred: Predicate<M>) -> Self {
        self.visible = Some(pred);
        self
    }

    pub fn enabled_when(mut self, pred: Predicate<M>) -> Self {
        self.enabled = Some(pred);
        self
    }
}

/// A template node.
#[derive(Debug, Clone)]
pub enum MenuItem<M> {
    Separator { visible: Option<Predicate<M>> },
    Action(ActionItem<M>),
    Submenu { label: String, items: Vec<MenuItem<M>> },
}

impl<M> MenuItem<M> {
    pub fn separator() -> Self {
        Self::Separator { visible: None }
    }

    pub fn separator_when(pred: Predicate<M>) -> Self {
        Self::Separator {
            visible: Some(pred),
        }
    }

    pub fn submenu(label: impl Into<String>, items: Vec<MenuItem<M>>) -> Self {
        Self::Submenu {
            label: label.into(),
            items,
        }
    }
}

impl<M> From<ActionItem<M>> for MenuItem<M> {
    fn from(item: ActionItem<M>) -> Self {
        Self::Action(item)
    }
}

/// A template node evaluated against a model. Hidden nodes are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedItem {
    Separator,
    Action {
        label: String,
        action: MenuAction,
        accelerator: Option<String>,
        enabled: bool,
    },
    Submenu {
        label: String,
        items: Vec<ResolvedItem>,
    },
}

fn check<M>(pred: Option<Predicate<M>>, model: &M) -> bool {
    pred.is_none_or(|p| p(model))
}

fn resolve<M>(template: &[MenuItem<M>], model: &M) -> Vec<ResolvedItem> {
    let mut out = Vec::with_capacity(template.len());
    for item in template {
        match item {
            MenuItem::Separator { visible } => {
                if check(*visible, model) {
                    out.push(ResolvedItem::Separator);
                }
            },
            MenuItem::Action(a) => {
                if check(a.visible, model) {
                    out.push(ResolvedItem::Action {
                        label: a.label.clone(),
                        action: a.action,
                        accelerator: a.accelerator.clone(),
                        enabled: check(a.enabled, model),
                    });
                }
            },
            MenuItem::Submenu { label, items } => out.push(ResolvedItem::Submenu {
                label: label.clone(),
                items: resolve(items, model),
            }),
        }
    }
    out
}

fn find_in(items: &[ResolvedItem], action: MenuAction) -> Option<&ResolvedItem> {
    items.iter().find_map(|item| match item {
        ResolvedItem::Action { action: a, .. } if *a == action => Some(item),
        ResolvedItem::Submenu { items, .. } => find_in(items, action),
        _ => None,
    })
}

/// A template bound to its latest model.
#[derive(Debug, Clone)]
pub struct Menu<M> {
    template: Vec<MenuItem<M>>,
    model: M,
    resolved: Vec<ResolvedItem>,
}

impl<M> Menu<M> {
    pub fn new(template: Vec<MenuItem<M>>, model: M) -> Self {
        let resolved = resolve(&template, &model);
        Self {
            template,
            model,
            resolved,
        }
    }

    /// Replace the model and re-evaluate every predicate.
    pub fn update(&mut self, model: M) {
        self.model = model;
        self.resolved = resolve(&self.template, &self.model);
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn items(&self) -> &[ResolvedItem] {
        &self.resolved
    }

    /// The resolved item for `action`, if currently visible.
    pub fn find(&self, action: MenuAction) -> Option<&ResolvedItem> {
        find_in(&self.resolved, action)
    }

    pub fn is_enabled(&self, action: MenuAction) -> bool {
        matches!(
            self.find(action),
            Some(ResolvedItem::Action { enabled: true, .. })
        )
    }

    /// Run the handler of `action` with the current model.
    ///
    /// Fails when the item is hidden, disabled or has no handler.
    pub fn activate<C>(
        &self,
        action: MenuAction,
        handlers: &HandlerTable<M, C>,
        ctx: &mut C,
    ) -> Result<()> {
        match self.find(action) {
            None => Err(VmdError::Command(format!("menu item not available: {action}"))),
            Some(ResolvedItem::Action { enabled: false, .. }) => {
                Err(VmdError::Command(format!("menu item disabled: {action}")))
            },
            Some(_) => {
                if handlers.invoke(action, &self.model, ctx) {
                    Ok(())
                } else {
                    Err(VmdError::Command(format!("no handler for menu item: {action}")))
                }
            },
        }
    }
}

pub type Handler<M, C> = Box<dyn Fn(&M, &mut C)>;

/// Handlers keyed by action id.
pub struct HandlerTable<M, C> {
    handlers: HashMap<MenuAction, Handler<M, C>>,
}

impl<M, C> HandlerTable<M, C> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler. Replaces any existing handler for `action`.
    pub fn register(&mut self, action: MenuAction, handler: impl Fn(&M, &mut C) + 'static) {
        self.handlers.insert(action, Box::new(handler));
    }

    /// Builder form of [`HandlerTable::register`].
    pub fn on(mut self, action: MenuAction, handler: impl Fn(&M, &mut C) + 'static) -> Self {
        self.register(action, handler);
        self
    }

    pub fn contains(&self, action: MenuAction) -> bool {
        self.handlers.contains_key(&action)
    }

    /// Returns `false` when no handler is registered.
    pub fn invoke(&self, action: MenuAction, model: &M, ctx: &mut C) -> bool {
        match self.handlers.get(&action) {
            Some(handler) => {
                handler(model, ctx);
                true
            },
            None => false,
        }
    }
}

impl<M, C> Default for HandlerTable<M, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Render resolved items as an indented outline.
///
/// Disabled items are wrapped in parentheses; accelerators follow a tab.
pub fn render_outline(items: &[ResolvedItem]) -> String {
    let mut out = String::new();
    write_outline(&mut out, items, 0);
    out
}

fn write_outline(out: &mut String, items: &[ResolvedItem], depth: usize) {
    let indent = "  ".repeat(depth);
    for item in items {
        match item {
            ResolvedItem::Separator => {
                let _ = writeln!(out, "{indent}----");
            },
            ResolvedItem::Action {
                label,
                accelerator,
                enabled,
                ..
            } => {
                let label = if *enabled {
                    label.clone()
                } else {
                    format!("({label})")
                };
                match accelerator {
                    Some(accel) => {
                        let _ = writeln!(out, "{indent}{label}\t{accel}");
                    },
                    None => {
                        let _ = writeln!(out, "{indent}{label}");
                    },
                }
            },
            ResolvedItem::Submenu { label, items } => {
                let _ = writeln!(out, "{indent}{label}");
                write_outline(out, items, depth + 1);
            },
        }
    }
}
