//! Error types for the handset shell.

use std::io;

/// Errors produced by the handset crates.
#[derive(Debug, thiserror::Error)]
pub enum HandsetError {
    /// User input rejected locally, before any collaborator call.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A hosted collaborator (store, storage, channel, identity) failed.
    #[error("service error: {0}")]
    Service(String),

    /// The platform refused a camera or microphone request.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("unknown app: {0}")]
    UnknownApp(String),

    #[error("command error: {0}")]
    Command(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HandsetError {
    /// Whether this error belongs to the user (shown inline) rather than
    /// to a collaborator or the platform.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, HandsetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let e = HandsetError::Validation("name is required".into());
        assert_eq!(format!("{e}"), "invalid input: name is required");
    }

    #[test]
    fn service_error_display() {
        let e = HandsetError::Service("store unreachable".into());
        assert_eq!(format!("{e}"), "service error: store unreachable");
    }

    #[test]
    fn permission_error_display() {
        let e = HandsetError::PermissionDenied("camera".into());
        assert_eq!(format!("{e}"), "permission denied: camera");
    }

    #[test]
    fn unknown_app_display() {
        let e = HandsetError::UnknownApp("Fax".into());
        assert_eq!(format!("{e}"), "unknown app: Fax");
    }

    #[test]
    fn only_validation_is_validation() {
        assert!(HandsetError::Validation(String::new()).is_validation());
        assert!(!HandsetError::Service(String::new()).is_validation());
        assert!(!HandsetError::PermissionDenied(String::new()).is_validation());
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: HandsetError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("this is [[[not valid toml").unwrap_err();
        let e: HandsetError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: HandsetError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }
}
