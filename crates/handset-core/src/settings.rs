//! User preferences and their local persistence.
//!
//! The record is stored as JSON under [`SETTINGS_KEY`] with camelCase field
//! names. Loading never fails: a missing, unreadable or malformed record
//! yields defaults, and each field that does not parse falls back to its
//! own default without disturbing the others.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::Color;
use crate::error::{HandsetError, Result};
use crate::platform::SettingsStorage;

/// Storage key of the settings record.
pub const SETTINGS_KEY: &str = "handset.settings";

pub const DEFAULT_WALLPAPER: &str = "https://firebasestorage.googleapis.com/v0/b/jessejessexyz.appspot.com/o/wallpaper_iphone.png?alt=media&token=f87e9198-2f22-4f65-89fd-f599a5ddcd34";
pub const DEFAULT_LOCK_WALLPAPER: &str = "https://firebasestorage.googleapis.com/v0/b/jessejessexyz.appspot.com/o/apple-ios-wallpapers.jpg?alt=media&token=d9e65040-0131-4fa7-8224-5293b1e126e0";
pub const DEFAULT_DEVICE_NAME: &str = "iPhone TSX";

/// Named wallpapers offered by the settings screen.
pub const WALLPAPER_OPTIONS: &[(&str, &str)] = &[
    ("Default Blue", DEFAULT_WALLPAPER),
    ("Abstract Purple", DEFAULT_LOCK_WALLPAPER),
    (
        "Dark Gradient",
        "/placeholder.svg?height=750&width=375&text=Dark+Gradient",
    ),
    (
        "Light Gradient",
        "/placeholder.svg?height=750&width=375&text=Light+Gradient",
    ),
];

// ---------------------------------------------------------------------------
// Enumerated preferences
// ---------------------------------------------------------------------------

/// Tint of the dock / taskbar overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskbarColor {
    #[default]
    #[serde(rename = "black/30")]
    Default,
    #[serde(rename = "black/60")]
    Dark,
    #[serde(rename = "blue-900/40")]
    Blue,
    #[serde(rename = "purple-900/40")]
    Purple,
    #[serde(rename = "green-900/40")]
    Green,
    #[serde(rename = "red-900/40")]
    Red,
}

impl TaskbarColor {
    pub const ALL: [TaskbarColor; 6] = [
        Self::Default,
        Self::Dark,
        Self::Blue,
        Self::Purple,
        Self::Green,
        Self::Red,
    ];

    /// Persisted token.
    pub fn token(self) -> &'static str {
        match self {
            Self::Default => "black/30",
            Self::Dark => "black/60",
            Self::Blue => "blue-900/40",
            Self::Purple => "purple-900/40",
            Self::Green => "green-900/40",
            Self::Red => "red-900/40",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Dark => "Dark",
            Self::Blue => "Blue",
            Self::Purple => "Purple",
            Self::Green => "Green",
            Self::Red => "Red",
        }
    }

    /// RGBA overlay drawn behind the dock.
    pub fn overlay(self) -> Color {
        match self {
            Self::Default => Color::BLACK.with_opacity(30),
            Self::Dark => Color::BLACK.with_opacity(60),
            Self::Blue => Color::rgb(0x1e, 0x3a, 0x8a).with_opacity(40),
            Self::Purple => Color::rgb(0x58, 0x1c, 0x87).with_opacity(40),
            Self::Green => Color::rgb(0x14, 0x53, 0x2d).with_opacity(40),
            Self::Red => Color::rgb(0x7f, 0x1d, 0x1d).with_opacity(40),
        }
    }
}

impl FromStr for TaskbarColor {
    type Err = HandsetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.token() == s || c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| HandsetError::Validation(format!("unknown taskbar color {s:?}")))
    }
}

/// Shape of the home button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeButtonStyle {
    #[default]
    Circle,
    Square,
    Pill,
}

impl HomeButtonStyle {
    /// Button size in logical pixels (width, height).
    pub fn size(self) -> (u32, u32) {
        match self {
            Self::Circle | Self::Square => (48, 48),
            Self::Pill => (64, 32),
        }
    }

    pub fn corner_radius(self) -> u32 {
        match self {
            Self::Circle => 24,
            Self::Square => 8,
            Self::Pill => 16,
        }
    }
}

/// Shape of the home grid icons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppIconStyle {
    #[default]
    Rounded,
    Square,
    Circle,
    Glass,
}

impl AppIconStyle {
    /// Icon edge length in logical pixels.
    pub const ICON_SIZE: u32 = 56;

    pub fn corner_radius(self) -> u32 {
        match self {
            Self::Rounded | Self::Glass => 16,
            Self::Square => 8,
            Self::Circle => Self::ICON_SIZE / 2,
        }
    }

    /// Glass icons are drawn translucent over the wallpaper.
    pub fn opacity(self) -> u8 {
        match self {
            Self::Glass => 40,
            _ => 100,
        }
    }
}

/// Status bar text contrast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBarStyle {
    #[default]
    Light,
    Dark,
}

impl StatusBarStyle {
    pub fn text_color(self) -> Color {
        match self {
            Self::Light => Color::rgb(0xe5, 0xe7, 0xeb),
            Self::Dark => Color::rgb(0x1f, 0x29, 0x37),
        }
    }
}

macro_rules! parse_lowercase_enum {
    ($ty:ty, $what:literal) => {
        impl FromStr for $ty {
            type Err = HandsetError;

            fn from_str(s: &str) -> Result<Self> {
                serde_json::from_value(Value::String(s.to_ascii_lowercase()))
                    .map_err(|_| HandsetError::Validation(format!("unknown {} {s:?}", $what)))
            }
        }
    };
}

parse_lowercase_enum!(HomeButtonStyle, "home button style");
parse_lowercase_enum!(AppIconStyle, "icon style");
parse_lowercase_enum!(StatusBarStyle, "status bar style");

// ---------------------------------------------------------------------------
// The record
// ---------------------------------------------------------------------------

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub wallpaper: String,
    pub lock_screen_wallpaper: String,
    pub taskbar_color: TaskbarColor,
    pub home_button_style: HomeButtonStyle,
    pub status_bar_style: StatusBarStyle,
    pub app_icon_style: AppIconStyle,
    pub device_name: String,
    pub battery_percentage: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wallpaper: DEFAULT_WALLPAPER.to_string(),
            lock_screen_wallpaper: DEFAULT_LOCK_WALLPAPER.to_string(),
            taskbar_color: TaskbarColor::Default,
            home_button_style: HomeButtonStyle::Circle,
            status_bar_style: StatusBarStyle::Light,
            app_icon_style: AppIconStyle::Rounded,
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            battery_percentage: true,
        }
    }
}

impl Settings {
    /// Decode a persisted record, merging it field by field over the
    /// defaults. Never fails.
    pub fn from_json_lenient(text: &str) -> Self {
        let defaults = Self::default();
        let Ok(Value::Object(saved)) = serde_json::from_str::<Value>(text) else {
            log::warn!("Stored settings are not a JSON object, using defaults");
            return defaults;
        };
        let Ok(Value::Object(mut merged)) = serde_json::to_value(&defaults) else {
            return defaults;
        };
        for (key, value) in saved {
            if !merged.contains_key(&key) {
                log::debug!("Ignoring unknown settings field {key:?}");
                continue;
            }
            let previous = merged.insert(key.clone(), value);
            if serde_json::from_value::<Self>(Value::Object(merged.clone())).is_err() {
                log::warn!("Stored settings field {key:?} is invalid, using its default");
                if let Some(previous) = previous {
                    merged.insert(key, previous);
                }
            }
        }
        serde_json::from_value(Value::Object(merged)).unwrap_or(defaults)
    }

    /// Apply every field present in `patch`.
    pub fn apply(&mut self, patch: SettingsPatch) {
        let SettingsPatch {
            wallpaper,
            lock_screen_wallpaper,
            taskbar_color,
            home_button_style,
            status_bar_style,
            app_icon_style,
            device_name,
            battery_percentage,
        } = patch;
        if let Some(v) = wallpaper {
            self.wallpaper = v;
        }
        if let Some(v) = lock_screen_wallpaper {
            self.lock_screen_wallpaper = v;
        }
        if let Some(v) = taskbar_color {
            self.taskbar_color = v;
        }
        if let Some(v) = home_button_style {
            self.home_button_style = v;
        }
        if let Some(v) = status_bar_style {
            self.status_bar_style = v;
        }
        if let Some(v) = app_icon_style {
            self.app_icon_style = v;
        }
        if let Some(v) = device_name {
            self.device_name = v;
        }
        if let Some(v) = battery_percentage {
            self.battery_percentage = v;
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "device name      {}", self.device_name)?;
        writeln!(f, "wallpaper        {}", self.wallpaper)?;
        writeln!(f, "lock wallpaper   {}", self.lock_screen_wallpaper)?;
        writeln!(f, "taskbar color    {}", self.taskbar_color.label())?;
        writeln!(f, "home button      {:?}", self.home_button_style)?;
        writeln!(f, "status bar       {:?}", self.status_bar_style)?;
        writeln!(f, "icon style       {:?}", self.app_icon_style)?;
        write!(
            f,
            "battery percent  {}",
            if self.battery_percentage { "on" } else { "off" }
        )
    }
}

/// A partial update: every `Some` field replaces the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub wallpaper: Option<String>,
    pub lock_screen_wallpaper: Option<String>,
    pub taskbar_color: Option<TaskbarColor>,
    pub home_button_style: Option<HomeButtonStyle>,
    pub status_bar_style: Option<StatusBarStyle>,
    pub app_icon_style: Option<AppIconStyle>,
    pub device_name: Option<String>,
    pub battery_percentage: Option<bool>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Owns the current settings and the storage they persist to.
pub struct SettingsStore {
    storage: Box<dyn SettingsStorage>,
    current: Settings,
    remembered: bool,
}

impl SettingsStore {
    /// Open the store and load whatever is persisted.
    pub fn new(storage: Box<dyn SettingsStorage>) -> Self {
        let mut store = Self {
            storage,
            current: Settings::default(),
            remembered: true,
        };
        store.load();
        store
    }

    /// Re-read the persisted record. Absence or any failure yields defaults.
    pub fn load(&mut self) -> &Settings {
        self.current = match self.storage.read(SETTINGS_KEY) {
            Ok(Some(text)) => Settings::from_json_lenient(&text),
            Ok(None) => Settings::default(),
            Err(e) => {
                log::warn!("Could not read settings: {e}");
                Settings::default()
            },
        };
        &self.current
    }

    /// Persist the full record. A storage failure is logged and leaves the
    /// record in effect for this session only.
    pub fn save(&mut self, settings: Settings) {
        let written = serde_json::to_string(&settings)
            .map_err(HandsetError::from)
            .and_then(|json| self.storage.write(SETTINGS_KEY, &json));
        match written {
            Ok(()) => self.remembered = true,
            Err(e) => {
                log::warn!("Settings not remembered: {e}");
                self.remembered = false;
            },
        }
        self.current = settings;
    }

    /// Merge `patch` into the current record and save.
    pub fn update(&mut self, patch: SettingsPatch) -> &Settings {
        let mut next = self.current.clone();
        next.apply(patch);
        self.save(next);
        &self.current
    }

    pub fn current(&self) -> &Settings {
        &self.current
    }

    /// `false` after a save that failed to reach storage.
    pub fn is_remembered(&self) -> bool {
        self.remembered
    }

    /// Raw read of another preference key.
    pub(crate) fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.read(key) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Could not read {key}: {e}");
                None
            },
        }
    }

    /// Raw write of another preference key. Failures are logged only.
    pub(crate) fn write_key(&mut self, key: &str, value: &str) {
        if let Err(e) = self.storage.write(key, value) {
            log::warn!("Could not persist {key}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;

    fn store_with(text: &str) -> SettingsStore {
        SettingsStore::new(Box::new(MemoryStorage::with_entry(SETTINGS_KEY, text)))
    }

    #[test]
    fn no_record_loads_documented_defaults() {
        let store = SettingsStore::new(Box::new(MemoryStorage::new()));
        let s = store.current();
        assert_eq!(s, &Settings::default());
        assert_eq!(s.device_name, "iPhone TSX");
        assert!(s.battery_percentage);
        assert_eq!(s.taskbar_color, TaskbarColor::Default);
        assert_eq!(s.home_button_style, HomeButtonStyle::Circle);
        assert_eq!(s.app_icon_style, AppIconStyle::Rounded);
        assert_eq!(s.wallpaper, DEFAULT_WALLPAPER);
        assert_eq!(s.lock_screen_wallpaper, DEFAULT_LOCK_WALLPAPER);
    }

    #[test]
    fn garbage_loads_defaults() {
        assert_eq!(store_with("{not json").current(), &Settings::default());
        assert_eq!(store_with("[1,2,3]").current(), &Settings::default());
        assert_eq!(store_with("\"text\"").current(), &Settings::default());
    }

    #[test]
    fn missing_fields_fall_back() {
        let store = store_with(r#"{"deviceName":"Pixel"}"#);
        assert_eq!(store.current().device_name, "Pixel");
        assert!(store.current().battery_percentage);
        assert_eq!(store.current().wallpaper, DEFAULT_WALLPAPER);
    }

    #[test]
    fn invalid_field_falls_back_alone() {
        let store = store_with(
            r#"{"deviceName":"Pixel","homeButtonStyle":"hexagon","batteryPercentage":"yes"}"#,
        );
        let s = store.current();
        assert_eq!(s.device_name, "Pixel");
        assert_eq!(s.home_button_style, HomeButtonStyle::Circle);
        assert!(s.battery_percentage);
    }

    #[test]
    fn unknown_fields_ignored() {
        let store = store_with(r#"{"ringtone":"marimba","appIconStyle":"glass"}"#);
        assert_eq!(store.current().app_icon_style, AppIconStyle::Glass);
    }

    #[test]
    fn persisted_shape_uses_camel_case_tokens() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["taskbarColor"], "black/30");
        assert_eq!(json["homeButtonStyle"], "circle");
        assert_eq!(json["batteryPercentage"], true);
        assert_eq!(json["lockScreenWallpaper"], DEFAULT_LOCK_WALLPAPER);
    }

    #[test]
    fn save_then_load_is_identity() {
        let mut store = SettingsStore::new(Box::new(MemoryStorage::new()));
        let mut s = Settings::default();
        s.device_name = "Work Phone".into();
        s.taskbar_color = TaskbarColor::Purple;
        store.save(s.clone());
        assert_eq!(store.load(), &s);
    }

    #[test]
    fn save_of_load_is_idempotent() {
        let mut store = store_with(r#"{"deviceName":"Pixel","taskbarColor":"red-900/40"}"#);
        let loaded = store.load().clone();
        store.save(loaded.clone());
        assert_eq!(store.load(), &loaded);
    }

    #[test]
    fn updates_preserve_unrelated_fields() {
        let mut store = SettingsStore::new(Box::new(MemoryStorage::new()));
        store.update(SettingsPatch {
            device_name: Some("A".into()),
            ..Default::default()
        });
        store.update(SettingsPatch {
            battery_percentage: Some(false),
            ..Default::default()
        });
        let s = store.load();
        assert_eq!(s.device_name, "A");
        assert!(!s.battery_percentage);
    }

    #[test]
    fn failed_save_keeps_session_value() {
        let mut store = SettingsStore::new(Box::new(MemoryStorage::read_only()));
        assert!(store.is_remembered());
        store.update(SettingsPatch {
            device_name: Some("Ephemeral".into()),
            ..Default::default()
        });
        assert!(!store.is_remembered());
        assert_eq!(store.current().device_name, "Ephemeral");
        // Nothing reached storage.
        assert_eq!(store.load(), &Settings::default());
    }

    #[test]
    fn taskbar_tokens_parse() {
        assert_eq!("blue-900/40".parse::<TaskbarColor>().unwrap(), TaskbarColor::Blue);
        assert_eq!("dark".parse::<TaskbarColor>().unwrap(), TaskbarColor::Dark);
        assert!("pink".parse::<TaskbarColor>().is_err());
    }

    #[test]
    fn taskbar_overlays() {
        assert_eq!(TaskbarColor::Default.overlay(), Color::rgba(0, 0, 0, 77));
        assert_eq!(TaskbarColor::Blue.overlay(), Color::rgba(0x1e, 0x3a, 0x8a, 102));
    }

    #[test]
    fn style_enums_parse() {
        assert_eq!("Pill".parse::<HomeButtonStyle>().unwrap(), HomeButtonStyle::Pill);
        assert_eq!("glass".parse::<AppIconStyle>().unwrap(), AppIconStyle::Glass);
        assert_eq!("DARK".parse::<StatusBarStyle>().unwrap(), StatusBarStyle::Dark);
        assert!(matches!(
            "triangle".parse::<AppIconStyle>(),
            Err(HandsetError::Validation(_))
        ));
    }

    #[test]
    fn shapes() {
        assert_eq!(HomeButtonStyle::Pill.size(), (64, 32));
        assert_eq!(AppIconStyle::Circle.corner_radius(), 28);
        assert_eq!(AppIconStyle::Glass.opacity(), 40);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn arb_settings() -> impl Strategy<Value = Settings> {
            (
                "[ -~]{0,24}",
                proptest::sample::select(TaskbarColor::ALL.to_vec()),
                proptest::sample::select(vec![
                    HomeButtonStyle::Circle,
                    HomeButtonStyle::Square,
                    HomeButtonStyle::Pill,
                ]),
                proptest::sample::select(vec![
                    AppIconStyle::Rounded,
                    AppIconStyle::Square,
                    AppIconStyle::Circle,
                    AppIconStyle::Glass,
                ]),
                any::<bool>(),
            )
                .prop_map(|(name, taskbar, button, icon, battery)| Settings {
                    device_name: name,
                    taskbar_color: taskbar,
                    home_button_style: button,
                    app_icon_style: icon,
                    battery_percentage: battery,
                    ..Settings::default()
                })
        }

        proptest! {
            #[test]
            fn load_after_save_returns_saved(settings in arb_settings()) {
                let mut store = SettingsStore::new(Box::new(MemoryStorage::new()));
                store.save(settings.clone());
                prop_assert_eq!(store.load(), &settings);
            }

            #[test]
            fn lenient_decode_never_panics(text in ".{0,64}") {
                let _ = Settings::from_json_lenient(&text);
            }
        }
    }
}
