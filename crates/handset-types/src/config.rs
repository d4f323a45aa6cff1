//! Shell configuration loaded from `handset.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{HandsetError, Result};

/// Top-level shell configuration. Every field has a default, so an empty
/// file (or no file at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandsetConfig {
    /// Label printed in the frame around the device.
    #[serde(default = "default_label")]
    pub device_label: String,
    /// Directory backing the local settings storage.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    /// How often the status bar clock refreshes.
    #[serde(default = "default_clock_interval")]
    pub clock_interval_secs: u64,
    #[serde(default)]
    pub grid: GridConfig,
    /// Template for bare-word browser searches; `{}` is replaced by the query.
    #[serde(default = "default_search_url")]
    pub search_url: String,
    #[serde(default = "default_home_url")]
    pub home_url: String,
}

/// Home grid geometry in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    #[serde(default = "default_cols")]
    pub cols: u32,
    #[serde(default = "default_grid_x")]
    pub x: i32,
    #[serde(default = "default_grid_y")]
    pub y: i32,
    #[serde(default = "default_cell")]
    pub cell_w: u32,
    #[serde(default = "default_cell")]
    pub cell_h: u32,
}

fn default_label() -> String {
    "Handset".to_string()
}
fn default_storage_dir() -> PathBuf {
    PathBuf::from(".handset")
}
fn default_clock_interval() -> u64 {
    60
}
fn default_search_url() -> String {
    "https://www.google.com/search?q={}".to_string()
}
fn default_home_url() -> String {
    "https://www.google.com".to_string()
}
fn default_cols() -> u32 {
    4
}
fn default_grid_x() -> i32 {
    16
}
fn default_grid_y() -> i32 {
    64
}
fn default_cell() -> u32 {
    84
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: default_cols(),
            x: default_grid_x(),
            y: default_grid_y(),
            cell_w: default_cell(),
            cell_h: default_cell(),
        }
    }
}

impl Default for HandsetConfig {
    fn default() -> Self {
        Self {
            device_label: default_label(),
            storage_dir: default_storage_dir(),
            clock_interval_secs: default_clock_interval(),
            grid: GridConfig::default(),
            search_url: default_search_url(),
            home_url: default_home_url(),
        }
    }
}

impl HandsetConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file. A missing file yields the defaults; a
    /// file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            },
            Err(e) => Err(e.into()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.grid.cols == 0 {
            return Err(HandsetError::Config("grid.cols must be at least 1".into()));
        }
        if self.grid.cell_w == 0 || self.grid.cell_h == 0 {
            return Err(HandsetError::Config("grid cells must be non-empty".into()));
        }
        if self.clock_interval_secs == 0 {
            return Err(HandsetError::Config(
                "clock_interval_secs must be at least 1".into(),
            ));
        }
        if !self.search_url.contains("{}") {
            return Err(HandsetError::Config(
                "search_url needs a {} placeholder".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = HandsetConfig::from_toml_str("").unwrap();
        assert_eq!(config, HandsetConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = HandsetConfig::from_toml_str(
            r#"
            device_label = "Test Phone"
            [grid]
            cols = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.device_label, "Test Phone");
        assert_eq!(config.grid.cols, 3);
        assert_eq!(config.grid.cell_w, 84);
        assert_eq!(config.clock_interval_secs, 60);
    }

    #[test]
    fn zero_columns_rejected() {
        let err = HandsetConfig::from_toml_str("[grid]\ncols = 0").unwrap_err();
        assert!(matches!(err, HandsetError::Config(_)));
    }

    #[test]
    fn search_url_needs_placeholder() {
        let err = HandsetConfig::from_toml_str("search_url = \"https://x\"").unwrap_err();
        assert!(matches!(err, HandsetError::Config(_)));
    }

    #[test]
    fn unknown_key_is_parse_error() {
        let err = HandsetConfig::from_toml_str("wallpaper = 3").unwrap_err();
        assert!(matches!(err, HandsetError::TomlParse(_)));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = HandsetConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, HandsetConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handset.toml");
        std::fs::write(&path, "clock_interval_secs = 5\n").unwrap();
        let config = HandsetConfig::load(&path).unwrap();
        assert_eq!(config.clock_interval_secs, 5);
    }
}
