//! Window chrome for vmd.
//!
//! Everything around the rendered document that is not navigation: the
//! state shared between viewer windows, the declarative application and
//! context menus driven by that state, and page zoom.

pub mod app_menu;
pub mod context_menu;
pub mod menu;
pub mod shared_state;
pub mod zoom;

// -----------------------------------------------------------------------
// Public re-exports
// -----------------------------------------------------------------------

pub use app_menu::{AppMenuModel, Platform};
pub use context_menu::ContextModel;
pub use menu::{ActionItem, HandlerTable, Menu, MenuAction, MenuItem, ResolvedItem};
pub use shared_state::{Action, SharedState, WindowId, WindowState};
pub use zoom::Zoom;
