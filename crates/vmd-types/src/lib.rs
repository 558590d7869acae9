//! Foundation types for vmd.
//!
//! This crate contains the types shared by every vmd crate: history
//! locations, classified link descriptors, the viewer configuration and
//! the error type.

pub mod config;
pub mod error;
pub mod location;

pub use config::ViewerConfig;
pub use error::{Result, VmdError};
pub use location::{LinkDescriptor, LinkKind, Location};
