//! Navigation core: link classification, history and the navigator.
//!
//! [`classify`] turns a raw `href`/`src` into a [`LinkDescriptor`] by
//! resolving it against the displayed document. [`NavigationHistory`] is
//! the per-window back/forward stack. [`Navigator`] ties the two together
//! and drives the [`Host`] collaborator that actually scrolls, loads
//! documents and talks to the OS shell.

pub mod classify;
pub mod history;
pub mod href;
pub mod navigator;

#[cfg(test)]
pub(crate) mod test_utils;

// -----------------------------------------------------------------------
// Public re-exports
// -----------------------------------------------------------------------

pub use classify::classify;
pub use history::{HistoryStatus, NavigationHistory, Subscription};
pub use href::Href;
pub use navigator::{Host, LinkModifiers, Navigator};
pub use vmd_types::{LinkDescriptor, LinkKind, Location};
