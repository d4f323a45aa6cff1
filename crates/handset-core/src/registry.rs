//! Applet identifiers and the AppId -> factory registry.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::applets::{
    Applet, AppletConfig, BrowserApplet, CalculatorApplet, CalendarApplet, CameraApplet,
    ChatApplet, ContactsApplet, DialerApplet, DriveApplet, EmailApplet, MapsApplet, MusicApplet,
    NotesApplet, SettingsApplet, SnakeApplet,
};
use crate::color::Color;
use crate::error::{HandsetError, Result};

/// Stable identifier of one applet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AppId {
    Phone,
    Contacts,
    Calendar,
    Calculator,
    Camera,
    Browser,
    Settings,
    Music,
    Notes,
    Chat,
    Email,
    Snake,
    Maps,
    Drive,
}

impl AppId {
    /// Every applet, in default home grid order.
    pub const ALL: [AppId; 14] = [
        AppId::Phone,
        AppId::Contacts,
        AppId::Calendar,
        AppId::Calculator,
        AppId::Camera,
        AppId::Browser,
        AppId::Settings,
        AppId::Music,
        AppId::Notes,
        AppId::Chat,
        AppId::Email,
        AppId::Snake,
        AppId::Maps,
        AppId::Drive,
    ];

    /// Display label under the icon.
    pub fn label(self) -> &'static str {
        match self {
            Self::Phone => "Phone",
            Self::Contacts => "Contacts",
            Self::Calendar => "Calendar",
            Self::Calculator => "Calculator",
            Self::Camera => "Camera",
            Self::Browser => "Browser",
            Self::Settings => "Settings",
            Self::Music => "Music",
            Self::Notes => "Notes",
            Self::Chat => "Chat",
            Self::Email => "Email",
            Self::Snake => "Snake",
            Self::Maps => "Maps",
            Self::Drive => "Drive",
        }
    }

    /// Icon tile color.
    pub fn color(self) -> Color {
        match self {
            Self::Phone => Color::rgb(34, 197, 94),
            Self::Contacts => Color::rgb(107, 114, 128),
            Self::Calendar => Color::rgb(239, 68, 68),
            Self::Calculator => Color::rgb(249, 115, 22),
            Self::Camera => Color::rgb(31, 41, 55),
            Self::Browser => Color::rgb(59, 130, 246),
            Self::Settings => Color::rgb(75, 85, 99),
            Self::Music => Color::rgb(236, 72, 153),
            Self::Notes => Color::rgb(234, 179, 8),
            Self::Chat => Color::rgb(16, 185, 129),
            Self::Email => Color::rgb(14, 165, 233),
            Self::Snake => Color::rgb(132, 204, 22),
            Self::Maps => Color::rgb(20, 184, 166),
            Self::Drive => Color::rgb(99, 102, 241),
        }
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AppId {
    type Err = HandsetError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("dialer") {
            return Ok(Self::Phone);
        }
        Self::ALL
            .into_iter()
            .find(|id| id.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| HandsetError::UnknownApp(s.to_string()))
    }
}

/// Builds a fresh applet for one mounting.
pub type AppletFactory = fn(&AppletConfig) -> Box<dyn Applet>;

/// Mapping from every [`AppId`] to its factory.
pub struct AppletRegistry {
    factories: BTreeMap<AppId, AppletFactory>,
}

impl AppletRegistry {
    /// Build a registry from explicit entries. Every `AppId` must appear
    /// exactly once; anything else is a startup configuration error.
    pub fn new(entries: Vec<(AppId, AppletFactory)>) -> Result<Self> {
        let mut factories = BTreeMap::new();
        for (id, factory) in entries {
            if factories.insert(id, factory).is_some() {
                return Err(HandsetError::Config(format!("{id} registered twice")));
            }
        }
        let missing: Vec<&str> = AppId::ALL
            .iter()
            .filter(|id| !factories.contains_key(id))
            .map(|id| id.label())
            .collect();
        if !missing.is_empty() {
            return Err(HandsetError::Config(format!(
                "no applet registered for {}",
                missing.join(", ")
            )));
        }
        Ok(Self { factories })
    }

    /// The built-in applet set.
    pub fn builtin() -> Self {
        let factories = AppId::ALL
            .into_iter()
            .map(|id| (id, builtin_factory(id)))
            .collect();
        Self { factories }
    }

    /// Instantiate the applet for `id`.
    pub fn build(&self, id: AppId, config: &AppletConfig) -> Result<Box<dyn Applet>> {
        let factory = self
            .factories
            .get(&id)
            .ok_or_else(|| HandsetError::UnknownApp(id.label().to_string()))?;
        let applet = factory(config);
        debug_assert_eq!(applet.id(), id, "factory for {id} built the wrong applet");
        Ok(applet)
    }
}

impl Default for AppletRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_factory(id: AppId) -> AppletFactory {
    match id {
        AppId::Phone => |_| Box::new(DialerApplet::new()),
        AppId::Contacts => |_| Box::new(ContactsApplet::new()),
        AppId::Calendar => |_| Box::new(CalendarApplet::new()),
        AppId::Calculator => |_| Box::new(CalculatorApplet::new()),
        AppId::Camera => |_| Box::new(CameraApplet::new()),
        AppId::Browser => |c| Box::new(BrowserApplet::new(&c.home_url, &c.search_url)),
        AppId::Settings => |_| Box::new(SettingsApplet::new()),
        AppId::Music => |_| Box::new(MusicApplet::new()),
        AppId::Notes => |_| Box::new(NotesApplet::new()),
        AppId::Chat => |_| Box::new(ChatApplet::new()),
        AppId::Email => |_| Box::new(EmailApplet::new()),
        AppId::Snake => |c| Box::new(SnakeApplet::new(c.seed)),
        AppId::Maps => |_| Box::new(MapsApplet::new()),
        AppId::Drive => |_| Box::new(DriveApplet::new()),
    }
}
