//! Handset device shell.
//!
//! The shell gates everything behind the lock screen, routes between the
//! home grid and exactly one foreground applet, lets the user reorder the
//! home grid in edit mode, and persists user preferences. Applets are peers
//! hosted behind an error boundary; they reach hosted backends only through
//! the collaborator traits in `handset-platform`.

// Re-exports from handset-types.
pub use handset_types::color;
pub use handset_types::config;
pub use handset_types::error;
pub use handset_types::input;

pub use handset_platform as platform;

pub mod applets;
pub mod registry;
pub mod settings;
pub mod shell;
pub mod statusbar;
