//! Status bar text and the clock refresh timer.
//!
//! Shown on the lock screen (large clock and date) and across the top of
//! every other screen (clock, device name, battery).

use crate::platform::{BatteryState, PowerInfo, SystemTime};
use crate::settings::Settings;

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Cached status strings, refreshed by [`StatusBar::update_info`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBar {
    clock_text: String,
    date_text: String,
    device_text: String,
    battery_text: String,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            clock_text: "00:00".to_string(),
            date_text: String::new(),
            device_text: String::new(),
            battery_text: String::new(),
        }
    }

    /// Update cached strings. `None` leaves the previous value in place.
    pub fn update_info(
        &mut self,
        time: Option<&SystemTime>,
        power: Option<&PowerInfo>,
        settings: &Settings,
    ) {
        if let Some(&SystemTime {
            month,
            day,
            hour,
            minute,
            weekday,
            ..
        }) = time
        {
            self.clock_text = format!("{hour:02}:{minute:02}");
            let weekday = WEEKDAYS.get(usize::from(weekday)).copied().unwrap_or("???");
            let month = month
                .checked_sub(1)
                .and_then(|m| MONTHS.get(usize::from(m)))
                .copied()
                .unwrap_or("???");
            self.date_text = format!("{weekday}, {month} {day}");
        }
        self.device_text = settings.device_name.clone();
        if let Some(p) = power {
            self.battery_text = battery_text(p, settings.battery_percentage);
        }
    }

    /// `HH:MM`.
    pub fn clock(&self) -> &str {
        &self.clock_text
    }

    /// Long form, e.g. `Sunday, October 18`.
    pub fn date(&self) -> &str {
        &self.date_text
    }

    pub fn device_name(&self) -> &str {
        &self.device_text
    }

    pub fn battery(&self) -> &str {
        &self.battery_text
    }

    /// One-line rendering for the top of the screen.
    pub fn line(&self) -> String {
        format!(
            "{:<8}{:^24}{:>10}",
            self.clock_text, self.device_text, self.battery_text
        )
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

fn battery_text(p: &PowerInfo, show_percent: bool) -> String {
    if p.state == BatteryState::NoBattery {
        return "AC".to_string();
    }
    let pct = p.battery_percent.unwrap_or(0);
    let bars = usize::from(pct.div_ceil(20)).clamp(1, 5);
    let gauge = format!("[{:<5}]", "|".repeat(bars));
    match (p.state, show_percent) {
        (BatteryState::Charging, true) => format!("{pct}% CHG"),
        (BatteryState::Charging, false) => format!("{gauge} CHG"),
        (_, true) => format!("{pct}% {gauge}"),
        (_, false) => gauge,
    }
}

/// Fires once every `interval` seconds of wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTicker {
    interval: u64,
    last: Option<u64>,
}

impl ClockTicker {
    pub fn new(interval_secs: u64) -> Self {
        Self {
            interval: interval_secs.max(1),
            last: None,
        }
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Whether the clock should refresh at Unix time `now`. The first call
    /// is always due; a clock that steps backwards is due immediately.
    pub fn due(&mut self, now: u64) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now < last || now - last >= self.interval,
        };
        if due {
            self.last = Some(now);
        }
        due
    }
}
