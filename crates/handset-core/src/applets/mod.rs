//! Applets hosted by the shell and the contract they implement.
//!
//! An applet is mounted when the router activates it and dropped when the
//! router leaves it; everything it caches dies with the mounting. Applets
//! never touch shell state. They reach the device through
//! [`AppletContext::platform`], hosted backends through
//! [`AppletContext::services`] for writes, and schedule reads as
//! [`FetchJob`]s that the shell delivers back only while the mounting is
//! still current.

mod browser;
mod calculator;
mod calendar;
mod camera;
mod chat;
mod contacts;
mod dialer;
mod drive;
mod email;
mod host;
mod maps;
mod music;
mod notes;
mod settings_app;
mod snake;

pub use browser::{BrowserApplet, normalize_address};
pub use calculator::{CalculatorApplet, Operator};
pub use calendar::{CalendarApplet, CalendarEvent, MonthView};
pub use camera::{CameraApplet, Facing, Photo};
pub use chat::{ChatApplet, ChatMessage};
pub use contacts::{Contact, ContactsApplet, validate_contact};
pub use dialer::{Call, DialerApplet};
pub use drive::DriveApplet;
pub use email::{EmailApplet, EmailDraft};
pub use host::{AppletHost, Banner};
pub use maps::MapsApplet;
pub use music::{MusicApplet, PLAYLIST, Track};
pub use notes::{Note, NotesApplet};
pub use settings_app::SettingsApplet;
pub use snake::{Cell, Direction, SnakeApplet, SnakeStatus};

use crate::error::{HandsetError, Result};
use crate::platform::{Collaborators, Platform};
use crate::registry::AppId;
use crate::settings::SettingsStore;
use crate::shell::{ActivationToken, FetchJob, FetchQueue, FetchResult};

/// Construction parameters shared by every applet factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppletConfig {
    pub home_url: String,
    /// Search template with a `{}` placeholder.
    pub search_url: String,
    /// Seed for applets that use randomness. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for AppletConfig {
    fn default() -> Self {
        Self {
            home_url: "https://www.google.com".to_string(),
            search_url: "https://www.google.com/search?q={}".to_string(),
            seed: None,
        }
    }
}

/// Everything an applet may touch during one call.
pub struct AppletContext<'a> {
    /// Identity of the mounting being called.
    pub token: ActivationToken,
    pub services: &'a mut Collaborators,
    pub platform: &'a mut dyn Platform,
    pub settings: &'a mut SettingsStore,
    pub fetches: &'a mut FetchQueue,
}

impl AppletContext<'_> {
    /// Schedule a read whose result comes back through
    /// [`Applet::on_fetched`] if this mounting is still current.
    pub fn request(&mut self, job: FetchJob) {
        self.fetches.push(self.token, job);
    }

    /// Current Unix time, or 0 when the clock is unavailable.
    pub fn unix_secs(&self) -> u64 {
        self.platform.unix_secs().unwrap_or_else(|e| {
            log::warn!("Clock unavailable: {e}");
            0
        })
    }
}

/// One applet implementation.
///
/// Commands arrive as a verb plus whitespace-separated arguments, the
/// text form of the applet's buttons and fields.
pub trait Applet {
    fn id(&self) -> AppId;

    /// Called once, right after the router activates this applet.
    fn on_mount(&mut self, _cx: &mut AppletContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called once, right before the applet is dropped.
    fn on_unmount(&mut self, _cx: &mut AppletContext<'_>) {}

    fn handle(&mut self, command: &str, args: &[&str], cx: &mut AppletContext<'_>)
    -> Result<()>;

    /// A fetch this mounting requested has completed.
    fn on_fetched(&mut self, _result: FetchResult, _cx: &mut AppletContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Recurring reads to schedule on every pump (realtime polling).
    fn poll_jobs(&self) -> Vec<FetchJob> {
        Vec::new()
    }

    /// Text rendering of the applet screen, one line per row.
    fn view(&self) -> Vec<String>;
}

/// Error for a verb the applet does not understand.
pub(crate) fn unknown_command(id: AppId, command: &str) -> HandsetError {
    HandsetError::Command(format!("{id} does not understand {command:?}"))
}

/// Join `args` back into free text.
pub(crate) fn rest(args: &[&str]) -> String {
    args.join(" ")
}

/// Parse the argument at `index` as `T`, naming `what` in the error.
pub(crate) fn arg<T: std::str::FromStr>(args: &[&str], index: usize, what: &str) -> Result<T> {
    let raw = args
        .get(index)
        .ok_or_else(|| HandsetError::Command(format!("missing {what}")))?;
    raw.parse()
        .map_err(|_| HandsetError::Command(format!("invalid {what}: {raw:?}")))
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Harness for driving one applet without a shell.

    use super::*;
    use crate::platform::{DesktopPlatform, MemoryStorage};

    pub struct Harness {
        pub token: ActivationToken,
        pub services: Collaborators,
        pub platform: DesktopPlatform,
        pub settings: SettingsStore,
        pub fetches: FetchQueue,
    }

    impl Harness {
        pub fn new() -> Self {
            Self::with_platform(DesktopPlatform::new())
        }

        pub fn with_platform(platform: DesktopPlatform) -> Self {
            Self {
                token: ActivationToken::new(AppId::Phone, 1),
                services: Collaborators::in_memory(),
                platform,
                settings: SettingsStore::new(Box::new(MemoryStorage::new())),
                fetches: FetchQueue::new(),
            }
        }

        pub fn cx(&mut self) -> AppletContext<'_> {
            AppletContext {
                token: self.token,
                services: &mut self.services,
                platform: &mut self.platform,
                settings: &mut self.settings,
                fetches: &mut self.fetches,
            }
        }

        pub fn mount(&mut self, applet: &mut dyn Applet) -> Result<()> {
            self.token = ActivationToken::new(applet.id(), self.token.generation() + 1);
            let result = applet.on_mount(&mut self.cx());
            self.flush(applet)?;
            result
        }

        pub fn run(&mut self, applet: &mut dyn Applet, line: &str) -> Result<()> {
            let mut words = line.split_whitespace();
            let command = words.next().unwrap_or_default();
            let args: Vec<&str> = words.collect();
            applet.handle(command, &args, &mut self.cx())?;
            self.flush(applet)
        }

        /// Run every queued fetch and deliver it, as the shell's pump does.
        pub fn flush(&mut self, applet: &mut dyn Applet) -> Result<()> {
            for job in applet.poll_jobs() {
                self.fetches.push(self.token, job);
            }
            while let Some((_, job)) = self.fetches.pop() {
                let result = job.run(&mut self.services);
                applet.on_fetched(result, &mut self.cx())?;
            }
            Ok(())
        }
    }
}
