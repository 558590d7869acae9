//! The vmd application: CLI, startup resolution, viewer sessions, the
//! command shell and file watching.
//!
//! Rendering is left to whatever drives a [`Session`]; the `vmd` binary
//! drives it from stdin.

pub mod cli;
pub mod commands;
pub mod opener;
pub mod session;
pub mod startup;
pub mod watch;

// -----------------------------------------------------------------------
// Public re-exports
// -----------------------------------------------------------------------

pub use commands::{Command, CommandOutput, CommandRegistry};
pub use opener::{Opener, SystemOpener};
pub use session::{Effect, Session, Window};
pub use startup::{StartupDocument, resolve_startup};
pub use watch::DocumentWatcher;
