use std::time::Instant;

use handset_core::config::HandsetConfig;
use handset_core::shell::DeviceShell;

/// Everything the session loop mutates.
pub struct AppState {
    pub config: HandsetConfig,
    pub shell: DeviceShell,
    /// When edit mode was entered, for the icon wobble.
    pub editing_since: Option<Instant>,
    /// Messages printed under the next frame.
    pub messages: Vec<String>,
}

impl AppState {
    pub fn new(config: HandsetConfig, shell: DeviceShell) -> Self {
        Self {
            config,
            shell,
            editing_since: None,
            messages: Vec::new(),
        }
    }

    /// Seconds since edit mode began, zero while viewing. Starts the
    /// timer on the first call after entering edit mode.
    pub fn edit_elapsed(&mut self) -> f64 {
        if !self.shell.grid().is_editing() {
            self.editing_since = None;
            return 0.0;
        }
        self.editing_since
            .get_or_insert_with(Instant::now)
            .elapsed()
            .as_secs_f64()
    }

    pub fn say(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handset_core::platform::{Collaborators, DesktopPlatform, MemoryStorage};
    use handset_core::shell::ShellAction;

    fn state() -> AppState {
        let config = HandsetConfig::default();
        let shell = DeviceShell::new(
            &config,
            Box::new(DesktopPlatform::new()),
            Box::new(MemoryStorage::new()),
            Collaborators::in_memory(),
        );
        AppState::new(config, shell)
    }

    #[test]
    fn edit_timer_follows_mode() {
        let mut s = state();
        assert_eq!(s.edit_elapsed(), 0.0);
        s.shell.dispatch(ShellAction::Unlock);
        s.shell.dispatch(ShellAction::ToggleEditMode);
        assert!(s.edit_elapsed() >= 0.0);
        assert!(s.editing_since.is_some());
        s.shell.dispatch(ShellAction::ToggleEditMode);
        s.edit_elapsed();
        assert!(s.editing_since.is_none());
    }
}
