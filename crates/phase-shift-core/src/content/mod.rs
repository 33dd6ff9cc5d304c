//! Content wrappers.
//!
//! Caller screens are wrapped in a [`ContentHost`] or [`NavigationHost`]
//! before they reach the presenting host. Both put a [`DismissAction`] in the
//! [`Environment`] every screen receives.

pub mod dismiss;
pub mod environment;
pub mod hosts;

pub use dismiss::DismissAction;
pub use environment::Environment;
pub use hosts::{Content, ContentHost, NavigationDepth, NavigationHost, Navigator, Screen};
