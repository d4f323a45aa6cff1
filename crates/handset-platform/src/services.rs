//! Device service traits and the desktop implementation.

use std::fmt;

use handset_types::error::{HandsetError, Result};

/// What the battery is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryState {
    Discharging,
    Charging,
    /// On external power at 100%.
    Full,
    /// Mains-powered device.
    NoBattery,
}

/// Battery reading for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerInfo {
    /// Charge in percent; `None` without a battery.
    pub battery_percent: Option<u8>,
    pub state: BatteryState,
}

/// Battery readings.
pub trait PowerService {
    fn power_info(&self) -> Result<PowerInfo>;
}

/// Calendar breakdown of a UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Day of the week, 0 = Sunday.
    pub weekday: u8,
}

impl SystemTime {
    /// Break a Unix timestamp down into calendar fields.
    pub fn from_unix(secs: u64) -> Self {
        const DAY: u64 = 24 * 60 * 60;
        let (days, secs_today) = (secs / DAY, secs % DAY);
        let (year, month, day) = days_to_ymd(days);
        Self {
            year,
            month,
            day,
            hour: (secs_today / 3600) as u8,
            minute: (secs_today / 60 % 60) as u8,
            second: (secs_today % 60) as u8,
            // 1970-01-01 was a Thursday.
            weekday: ((days + 4) % 7) as u8,
        }
    }
}

impl fmt::Display for SystemTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (y, mo, d) = (self.year, self.month, self.day);
        let (h, mi, s) = (self.hour, self.minute, self.second);
        write!(f, "{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}Z")
    }
}

/// Wall clock.
pub trait TimeService {
    /// Seconds since the Unix epoch.
    fn unix_secs(&self) -> Result<u64>;

    /// [`TimeService::unix_secs`] broken into calendar fields.
    fn now(&self) -> Result<SystemTime> {
        Ok(SystemTime::from_unix(self.unix_secs()?))
    }
}

/// Camera and microphone access. Denials surface as
/// [`HandsetError::PermissionDenied`].
pub trait MediaService {
    fn request_camera(&mut self) -> Result<()>;

    fn request_microphone(&mut self) -> Result<()>;

    /// Grab one encoded frame from the camera. Only valid after a
    /// successful [`MediaService::request_camera`].
    fn capture_frame(&mut self) -> Result<Vec<u8>>;
}

/// Local, synchronous key-value storage (the browser's `localStorage` on the
/// web, a directory of files on desktop).
pub trait SettingsStorage {
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Every device service the shell needs, behind one object.
pub trait Platform: PowerService + TimeService + MediaService {}

/// Desktop platform using `std` facilities. There is no real camera or
/// battery, so both are simulated.
pub struct DesktopPlatform {
    battery_percent: Option<u8>,
    camera_allowed: bool,
    microphone_allowed: bool,
    camera_open: bool,
}

impl DesktopPlatform {
    pub fn new() -> Self {
        Self {
            battery_percent: None,
            camera_allowed: true,
            microphone_allowed: true,
            camera_open: false,
        }
    }

    /// Report a simulated battery at the given charge.
    pub fn with_battery(mut self, percent: u8) -> Self {
        self.battery_percent = Some(percent.min(100));
        self
    }

    /// Answer every camera/microphone request with `allowed`.
    pub fn with_media_permission(mut self, allowed: bool) -> Self {
        self.camera_allowed = allowed;
        self.microphone_allowed = allowed;
        self
    }
}

impl Default for DesktopPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerService for DesktopPlatform {
    fn power_info(&self) -> Result<PowerInfo> {
        let state = match self.battery_percent {
            None => BatteryState::NoBattery,
            Some(100) => BatteryState::Full,
            Some(_) => BatteryState::Discharging,
        };
        Ok(PowerInfo {
            battery_percent: self.battery_percent,
            state,
        })
    }
}

impl TimeService for DesktopPlatform {
    fn unix_secs(&self) -> Result<u64> {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| HandsetError::Service(format!("system clock before 1970: {e}")))
    }
}

impl MediaService for DesktopPlatform {
    fn request_camera(&mut self) -> Result<()> {
        if !self.camera_allowed {
            return Err(HandsetError::PermissionDenied("camera access was denied".into()));
        }
        self.camera_open = true;
        Ok(())
    }

    fn request_microphone(&mut self) -> Result<()> {
        if !self.microphone_allowed {
            return Err(HandsetError::PermissionDenied(
                "microphone access was denied".into(),
            ));
        }
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<Vec<u8>> {
        if !self.camera_open {
            return Err(HandsetError::PermissionDenied("camera is not open".into()));
        }
        // Smallest well-formed JPEG envelope: SOI then EOI.
        Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
    }
}

impl Platform for DesktopPlatform {}

/// `(year, month, day)` of the given day count since 1970-01-01.
pub fn days_to_ymd(days: u64) -> (u16, u8, u8) {
    // Shift the epoch to 0000-03-01 so leap days fall at the end of a
    // 400-year era.
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z % 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year as u16, month, day)
}

pub fn is_leap(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` (1-12) of `year`.
pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        1..=12 => 31,
        _ => 0,
    }
}

/// Day of the week (0 = Sunday) for a calendar date, Sakamoto's method.
pub fn weekday(year: u16, month: u8, day: u8) -> u8 {
    const OFFSETS: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    let m = usize::from(month.clamp(1, 12));
    let y = if m < 3 { year - 1 } else { year };
    let sum = y + y / 4 - y / 100 + y / 400 + OFFSETS[m - 1] + u16::from(day);
    (sum % 7) as u8
}
