//! Foundation types for the handset shell.
//!
//! Platform-agnostic types shared by every handset crate: the error enum,
//! pointer/key input events, RGBA colors and the TOML configuration.

pub mod color;
pub mod config;
pub mod error;
pub mod input;
