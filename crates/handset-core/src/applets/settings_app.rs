//! The Settings screen. Every command is one field of a [`SettingsPatch`].

use crate::applets::{Applet, AppletContext, rest, unknown_command};
use crate::error::{HandsetError, Result};
use crate::registry::AppId;
use crate::settings::{Settings, SettingsPatch, TaskbarColor, WALLPAPER_OPTIONS};

/// A wallpaper by option name, 1-based option number, or literal URI.
fn wallpaper(choice: &str) -> Result<String> {
    let choice = choice.trim();
    if choice.is_empty() {
        return Err(HandsetError::Validation("choose a wallpaper".into()));
    }
    if let Ok(n) = choice.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| WALLPAPER_OPTIONS.get(i))
            .map(|(_, uri)| (*uri).to_string())
            .ok_or_else(|| HandsetError::Validation(format!("no wallpaper {n}")));
    }
    if let Some((_, uri)) = WALLPAPER_OPTIONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(choice))
    {
        return Ok((*uri).to_string());
    }
    Ok(choice.to_string())
}

fn on_off(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(HandsetError::Validation(format!("expected on or off, got {other:?}"))),
    }
}

/// Map a settings command onto a patch.
fn patch_for(command: &str, args: &[&str]) -> Result<SettingsPatch> {
    let value = rest(args);
    let mut patch = SettingsPatch::default();
    match command {
        "wallpaper" => patch.wallpaper = Some(wallpaper(&value)?),
        "lock-wallpaper" => patch.lock_screen_wallpaper = Some(wallpaper(&value)?),
        "taskbar" => patch.taskbar_color = Some(value.parse()?),
        "home-button" => patch.home_button_style = Some(value.parse()?),
        "icons" => patch.app_icon_style = Some(value.parse()?),
        "status-bar" => patch.status_bar_style = Some(value.parse()?),
        "name" => {
            let name = value.trim();
            if name.is_empty() {
                return Err(HandsetError::Validation("device name is required".into()));
            }
            patch.device_name = Some(name.to_string());
        },
        "battery" => patch.battery_percentage = Some(on_off(&value)?),
        other => return Err(unknown_command(AppId::Settings, other)),
    }
    Ok(patch)
}

pub struct SettingsApplet {
    /// Snapshot shown on screen, refreshed after every change.
    shown: Settings,
    remembered: bool,
}

impl SettingsApplet {
    pub fn new() -> Self {
        Self {
            shown: Settings::default(),
            remembered: true,
        }
    }
}

impl Default for SettingsApplet {
    fn default() -> Self {
        Self::new()
    }
}

impl Applet for SettingsApplet {
    fn id(&self) -> AppId {
        AppId::Settings
    }

    fn on_mount(&mut self, cx: &mut AppletContext<'_>) -> Result<()> {
        self.shown = cx.settings.current().clone();
        self.remembered = cx.settings.is_remembered();
        Ok(())
    }

    fn handle(&mut self, command: &str, args: &[&str], cx: &mut AppletContext<'_>) -> Result<()> {
        let patch = patch_for(command, args)?;
        self.shown = cx.settings.update(patch).clone();
        self.remembered = cx.settings.is_remembered();
        Ok(())
    }

    fn view(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.shown.to_string().lines().map(str::to_string).collect();
        lines.push(String::new());
        lines.push("Wallpapers:".into());
        lines.extend(
            WALLPAPER_OPTIONS
                .iter()
                .enumerate()
                .map(|(i, (name, _))| format!("  {}. {name}", i + 1)),
        );
        lines.push(format!(
            "Taskbar colors: {}",
            TaskbarColor::ALL.map(TaskbarColor::label).join(", ")
        ));
        if !self.remembered {
            lines.push("Settings could not be saved and last only for this session".into());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applets::test_support::Harness;
    use crate::platform::MemoryStorage;
    use crate::settings::{
        AppIconStyle, DEFAULT_LOCK_WALLPAPER, HomeButtonStyle, SettingsStore, StatusBarStyle,
    };

    #[test]
    fn every_field_has_a_command() {
        let mut h = Harness::new();
        let mut app = SettingsApplet::new();
        h.mount(&mut app).unwrap();
        for line in [
            "wallpaper 3",
            "lock-wallpaper abstract purple",
            "taskbar blue-900/40",
            "home-button pill",
            "icons glass",
            "status-bar dark",
            "name My Phone",
            "battery off",
        ] {
            h.run(&mut app, line).unwrap();
        }
        let s = h.settings.current();
        assert_eq!(s.wallpaper, WALLPAPER_OPTIONS[2].1);
        assert_eq!(s.lock_screen_wallpaper, DEFAULT_LOCK_WALLPAPER);
        assert_eq!(s.taskbar_color, TaskbarColor::Blue);
        assert_eq!(s.home_button_style, HomeButtonStyle::Pill);
        assert_eq!(s.app_icon_style, AppIconStyle::Glass);
        assert_eq!(s.status_bar_style, StatusBarStyle::Dark);
        assert_eq!(s.device_name, "My Phone");
        assert!(!s.battery_percentage);
    }

    #[test]
    fn changes_persist() {
        let mut h = Harness::new();
        let mut app = SettingsApplet::new();
        h.run(&mut app, "name Persisted").unwrap();
        assert_eq!(h.settings.load().device_name, "Persisted");
    }

    #[test]
    fn bad_values_rejected_without_change() {
        let mut h = Harness::new();
        let mut app = SettingsApplet::new();
        assert!(h.run(&mut app, "home-button hexagon").unwrap_err().is_validation());
        assert!(h.run(&mut app, "battery maybe").unwrap_err().is_validation());
        assert!(h.run(&mut app, "wallpaper 9").unwrap_err().is_validation());
        assert!(h.run(&mut app, "name").unwrap_err().is_validation());
        assert_eq!(h.settings.current(), &Settings::default());
    }

    #[test]
    fn unsaved_changes_flagged() {
        let mut h = Harness::new();
        h.settings = SettingsStore::new(Box::new(MemoryStorage::read_only()));
        let mut app = SettingsApplet::new();
        h.run(&mut app, "taskbar Dark").unwrap();
        assert!(app.view().iter().any(|l| l.contains("could not be saved")));
    }

    #[test]
    fn custom_wallpaper_uri() {
        assert_eq!(wallpaper("https://x/y.png").unwrap(), "https://x/y.png");
        assert_eq!(wallpaper("1").unwrap(), WALLPAPER_OPTIONS[0].1);
    }
}
