//! Which screen is in front: the home grid or exactly one applet.

use crate::registry::AppId;

/// Identity of one mounting of one applet. Two activations of the same
/// applet get different tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivationToken {
    app: AppId,
    generation: u64,
}

impl ActivationToken {
    pub fn new(app: AppId, generation: u64) -> Self {
        Self { app, generation }
    }

    pub fn app(self) -> AppId {
        self.app
    }

    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// Owner of `active_app`. `None` is the home grid.
#[derive(Debug, Default)]
pub struct AppRouter {
    active: Option<AppId>,
    generation: u64,
}

impl AppRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<AppId> {
        self.active
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Token of the current mounting, if an applet is in front.
    pub fn token(&self) -> Option<ActivationToken> {
        self.active
            .map(|app| ActivationToken::new(app, self.generation))
    }

    /// Bring `app` to the front. Returns whether a new mounting began.
    ///
    /// Refused while the home grid is being edited. Opening the applet that
    /// is already in front keeps its mounting.
    pub fn open(&mut self, app: AppId, editing: bool) -> bool {
        if editing {
            log::debug!("Ignoring open({app}) while editing the home grid");
            return false;
        }
        if self.active == Some(app) {
            log::debug!("{app} is already open");
            return false;
        }
        self.active = Some(app);
        self.generation += 1;
        log::info!("Opened {app}");
        true
    }

    /// Return to the home grid. Returns whether anything changed.
    pub fn go_home(&mut self) -> bool {
        match self.active.take() {
            Some(app) => {
                self.generation += 1;
                log::info!("Closed {app}");
                true
            },
            None => false,
        }
    }

    /// Whether `token` names the mounting still in front.
    pub fn is_current(&self, token: ActivationToken) -> bool {
        self.active == Some(token.app) && self.generation == token.generation
    }
}
