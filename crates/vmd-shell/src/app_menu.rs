//! The application menu bar.

use vmd_nav::HistoryStatus;

use crate::menu::{ActionItem, MenuAction, MenuItem};
use crate::shared_state::WindowState;

pub const SOURCE_CODE_URL: &str = "https://github.com/yoshuawuyts/vmd";
pub const ISSUES_URL: &str = "https://github.com/yoshuawuyts/vmd/issues";
pub const RELEASES_URL: &str = "https://github.com/yoshuawuyts/vmd/releases";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Other
        }
    }
}

/// What the menu bar needs to know about the focused window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppMenuModel {
    pub has_selection: bool,
    pub history: Option<HistoryStatus>,
}

impl AppMenuModel {
    /// Model for the focused window; an empty model when nothing is focused.
    pub fn from_window(window: Option<&WindowState>) -> Self {
        window.map_or_else(Self::default, |w| Self {
            has_selection: w.has_selection(),
            history: w.history,
        })
    }
}

fn can_go_back(m: &AppMenuModel) -> bool {
    m.history.is_some_and(|h| h.can_go_back)
}

fn can_go_forward(m: &AppMenuModel) -> bool {
    m.history.is_some_and(|h| h.can_go_forward)
}

fn has_selection(m: &AppMenuModel) -> bool {
    m.has_selection
}

/// Drop the `&` mnemonic marker on macOS, which has no mnemonics.
pub fn menu_label(label: &str, platform: Platform) -> String {
    match platform {
        Platform::MacOs => label.replacen('&', "", 1),
        Platform::Other => label.to_string(),
    }
}

pub fn template(platform: Platform) -> Vec<MenuItem<AppMenuModel>> {
    let label = |s: &str| menu_label(s, platform);
    let mac = platform == Platform::MacOs;
    let mut menus = Vec::new();

    if mac {
        menus.push(MenuItem::submenu(
            "vmd",
            vec![
                ActionItem::new("About vmd", MenuAction::About).into(),
                MenuItem::separator(),
                ActionItem::new("Hide vmd", MenuAction::Hide)
                    .accelerator("Command+H")
                    .into(),
                ActionItem::new("Hide Others", MenuAction::HideOthers)
                    .accelerator("Command+Alt+H")
                    .into(),
                ActionItem::new("Show All", MenuAction::Unhide).into(),
                MenuItem::separator(),
                ActionItem::new("Close window", MenuAction::CloseWindow)
                    .accelerator("CmdOrCtrl+W")
                    .into(),
                ActionItem::new("Quit", MenuAction::Quit)
                    .accelerator("CmdOrCtrl+Q")
                    .into(),
            ],
        ));
    }

    let mut file: Vec<MenuItem<AppMenuModel>> = vec![
        ActionItem::new(label("&Open"), MenuAction::Open)
            .accelerator("CmdOrCtrl+O")
            .into(),
        ActionItem::new(label("Open in &new window"), MenuAction::OpenInNewWindow)
            .accelerator("CmdOrCtrl+Shift+O")
            .into(),
        ActionItem::new(label("&Print"), MenuAction::Print)
            .accelerator("CmdOrCtrl+P")
            .into(),
    ];
    if !mac {
        file.extend([
            MenuItem::separator(),
            ActionItem::new(label("C&lose window"), MenuAction::CloseWindow)
                .accelerator("CmdOrCtrl+W")
                .into(),
            ActionItem::new(label("&Quit"), MenuAction::Quit)
                .accelerator("CmdOrCtrl+Q")
                .into(),
        ]);
    }
    menus.push(MenuItem::submenu(label("&File"), file));

    menus.push(MenuItem::submenu(
        label("&Edit"),
        vec![
            ActionItem::new(label("&Find"), MenuAction::Find)
                .accelerator("CmdOrCtrl+F")
                .into(),
            ActionItem::new(label("&Copy"), MenuAction::Copy)
                .accelerator("CmdOrCtrl+C")
                .enabled_when(has_selection)
                .into(),
            ActionItem::new(label("Select &All"), MenuAction::SelectAll)
                .accelerator("CmdOrCtrl+A")
                .into(),
        ],
    ));

    menus.push(MenuItem::submenu(
        label("&History"),
        vec![
            ActionItem::new(label("&Back"), MenuAction::HistoryBack)
                .accelerator("Alt+Left")
                .enabled_when(can_go_back)
                .into(),
            ActionItem::new(label("&Forward"), MenuAction::HistoryForward)
                .accelerator("Alt+Right")
                .enabled_when(can_go_forward)
                .into(),
        ],
    ));

    let devtools_accel = if mac { "Alt+Command+I" } else { "Ctrl+Shift+I" };
    menus.push(MenuItem::submenu(
        label("&View"),
        vec![
            ActionItem::new(label("Zoom &In"), MenuAction::ZoomIn)
                .accelerator("CmdOrCtrl+Plus")
                .into(),
            ActionItem::new(label("Zoom &Out"), MenuAction::ZoomOut)
                .accelerator("CmdOrCtrl+-")
                .into(),
            ActionItem::new(label("&Reset Zoom"), MenuAction::ZoomReset)
                .accelerator("CmdOrCtrl+0")
                .into(),
            ActionItem::new(label("Toggle &Developer Tools"), MenuAction::ToggleDevTools)
                .accelerator(devtools_accel)
                .into(),
        ],
    ));

    let mut help: Vec<MenuItem<AppMenuModel>> = vec![
        ActionItem::new(label("S&ource Code"), MenuAction::SourceCode).into(),
        ActionItem::new(label("Report an &Issue"), MenuAction::ReportIssue).into(),
        ActionItem::new(label("&Releases"), MenuAction::Releases).into(),
    ];
    if !mac {
        help.extend([
            MenuItem::separator(),
            ActionItem::new(label("&About vmd"), MenuAction::About).into(),
        ]);
    }
    menus.push(MenuItem::submenu(label("He&lp"), help));

    menus
}

/// URL opened by the Help entries.
pub fn help_url(action: MenuAction) -> Option<&'static str> {
    match action {
        MenuAction::SourceCode => Some(SOURCE_CODE_URL),
        MenuAction::ReportIssue => Some(ISSUES_URL),
        MenuAction::Releases => Some(RELEASES_URL),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{Menu, ResolvedItem};

    fn top_labels(menu: &Menu<AppMenuModel>) -> Vec<String> {
        menu.items()
            .iter()
            .filter_map(|item| match item {
                ResolvedItem::Submenu { label, .. } => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    fn history(back: bool, forward: bool) -> Option<HistoryStatus> {
        Some(HistoryStatus {
            can_go_back: back,
            can_go_forward: forward,
            position: Some(0),
            len: 2,
        })
    }

    #[test]
    fn mnemonics_are_kept_off_macos() {
        let menu = Menu::new(template(Platform::Other), AppMenuModel::default());
        assert_eq!(
            top_labels(&menu),
            vec!["&File", "&Edit", "&History", "&View", "He&lp"]
        );
    }

    #[test]
    fn macos_strips_mnemonics_and_adds_app_menu() {
        let menu = Menu::new(template(Platform::MacOs), AppMenuModel::default());
        assert_eq!(
            top_labels(&menu),
            vec!["vmd", "File", "Edit", "History", "View", "Help"]
        );
    }

    #[test]
    fn menu_label_strips_first_marker_only() {
        assert_eq!(menu_label("Select &All", Platform::MacOs), "Select All");
        assert_eq!(menu_label("A&B&C", Platform::MacOs), "AB&C");
        assert_eq!(menu_label("Select &All", Platform::Other), "Select &All");
    }

    #[test]
    fn history_items_follow_status() {
        let mut menu = Menu::new(template(Platform::Other), AppMenuModel::default());
        assert!(!menu.is_enabled(MenuAction::HistoryBack));
        assert!(!menu.is_enabled(MenuAction::HistoryForward));

        menu.update(AppMenuModel {
            has_selection: false,
            history: history(true, false),
        });
        assert!(menu.is_enabled(MenuAction::HistoryBack));
        assert!(!menu.is_enabled(MenuAction::HistoryForward));
    }

    #[test]
    fn copy_requires_selection() {
        let mut menu = Menu::new(template(Platform::Other), AppMenuModel::default());
        assert!(!menu.is_enabled(MenuAction::Copy));
        menu.update(AppMenuModel {
            has_selection: true,
            history: None,
        });
        assert!(menu.is_enabled(MenuAction::Copy));
    }

    #[test]
    fn model_from_focused_window() {
        let mut state = crate::SharedState::new();
        state.set_selection(1, "text");
        state.set_history_status(1, history(false, true).unwrap());
        state.set_focused_window(Some(1));

        let model = AppMenuModel::from_window(state.focused_window_state());
        assert!(model.has_selection);
        assert!(can_go_forward(&model));
        assert_eq!(AppMenuModel::from_window(None), AppMenuModel::default());
    }

    #[test]
    fn help_urls() {
        assert_eq!(help_url(MenuAction::ReportIssue), Some(ISSUES_URL));
        assert_eq!(help_url(MenuAction::About), None);
    }
}
