//! The device shell: lock gate, router, home grid, and the applet host.
//!
//! Each piece of device state has exactly one writer: [`LockController`]
//! owns `locked`, [`AppRouter`] owns `active_app`, [`HomeGrid`] owns the
//! icon order and edit mode. [`DeviceShell`] sequences them and keeps the
//! mounted applet in step with the router. Applets only ever see an
//! [`AppletContext`], so nothing they do reaches these fields.

mod drag;
mod fetch;
mod home;
mod lock;
mod router;


pub use drag::DragTracker;
pub use fetch::{FetchJob, FetchQueue, FetchResult};
pub use home::{GridGeometry, HomeGrid, LAYOUT_KEY, move_index, repair_order};
pub use lock::LockController;
pub use router::{ActivationToken, AppRouter};

use crate::applets::{AppletConfig, AppletContext, AppletHost, Banner};
use crate::config::HandsetConfig;
use crate::platform::{Collaborators, Platform, SettingsStorage};
use crate::registry::{AppId, AppletRegistry};
use crate::settings::{Settings, SettingsStore};
use crate::statusbar::{ClockTicker, StatusBar};

/// Snapshot of the shell-owned state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    pub locked: bool,
    pub active_app: Option<AppId>,
    pub app_order: Vec<AppId>,
    pub is_editing_layout: bool,
}

/// Everything the user can ask of the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    Unlock,
    /// Lock and return home.
    Lock,
    /// Home button: leaves edit mode, else closes the applet, else locks.
    Home,
    /// Back gesture: leaves edit mode or closes the applet.
    Back,
    Open(AppId),
    /// Tap on a home grid slot.
    Tap(usize),
    ToggleEditMode,
    /// Move an icon directly (keyboard reordering).
    Reorder { from: usize, to: usize },
    PointerDown { x: i32, y: i32 },
    PointerMove { x: i32, y: i32 },
    PointerUp { x: i32, y: i32 },
    PointerCancel,
    /// A verb for the mounted applet.
    Command { verb: String, args: Vec<String> },
    /// Refresh the clock if it is due.
    Tick,
}

/// Applet-facing resources, split from the shell state so a context can
/// borrow them while the host is borrowed separately.
struct Env {
    services: Collaborators,
    platform: Box<dyn Platform>,
    settings: SettingsStore,
    fetches: FetchQueue,
}

impl Env {
    fn cx(&mut self, token: ActivationToken) -> AppletContext<'_> {
        AppletContext {
            token,
            services: &mut self.services,
            platform: self.platform.as_mut(),
            settings: &mut self.settings,
            fetches: &mut self.fetches,
        }
    }
}

pub struct DeviceShell {
    lock: LockController,
    router: AppRouter,
    grid: HomeGrid,
    drag: DragTracker,
    geometry: GridGeometry,
    /// Slot pressed while viewing; a release on the same slot is a tap.
    pressed: Option<usize>,
    host: AppletHost,
    registry: AppletRegistry,
    applet_config: AppletConfig,
    status: StatusBar,
    ticker: ClockTicker,
    env: Env,
}

impl DeviceShell {
    /// Shell with the built-in applets. Settings and the home layout are
    /// restored from `storage`.
    pub fn new(
        config: &HandsetConfig,
        platform: Box<dyn Platform>,
        storage: Box<dyn SettingsStorage>,
        services: Collaborators,
    ) -> Self {
        Self::with_registry(config, platform, storage, services, AppletRegistry::builtin())
    }

    pub fn with_registry(
        config: &HandsetConfig,
        platform: Box<dyn Platform>,
        storage: Box<dyn SettingsStorage>,
        services: Collaborators,
        registry: AppletRegistry,
    ) -> Self {
        let settings = SettingsStore::new(storage);
        let grid = HomeGrid::restore(&settings);
        let mut shell = Self {
            lock: LockController::new(),
            router: AppRouter::new(),
            grid,
            drag: DragTracker::new(),
            geometry: config.grid.into(),
            pressed: None,
            host: AppletHost::new(),
            registry,
            applet_config: AppletConfig {
                home_url: config.home_url.clone(),
                search_url: config.search_url.clone(),
                seed: None,
            },
            status: StatusBar::new(),
            ticker: ClockTicker::new(config.clock_interval_secs),
            env: Env {
                services,
                platform,
                settings,
                fetches: FetchQueue::new(),
            },
        };
        shell.tick();
        shell
    }

    /// Seed for applets that use randomness, for reproducible sessions.
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.applet_config.seed = seed;
    }

    // -- State -------------------------------------------------------------

    pub fn state(&self) -> DeviceState {
        DeviceState {
            locked: self.lock.is_locked(),
            active_app: self.router.active(),
            app_order: self.grid.order().to_vec(),
            is_editing_layout: self.grid.is_editing(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    pub fn active_app(&self) -> Option<AppId> {
        self.router.active()
    }

    pub fn grid(&self) -> &HomeGrid {
        &self.grid
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn drag(&self) -> &DragTracker {
        &self.drag
    }

    pub fn status(&self) -> &StatusBar {
        &self.status
    }

    pub fn settings(&self) -> &Settings {
        self.env.settings.current()
    }

    pub fn settings_remembered(&self) -> bool {
        self.env.settings.is_remembered()
    }

    pub fn applet_view(&self) -> Vec<String> {
        self.host.view()
    }

    pub fn notice(&self) -> Option<&str> {
        self.host.notice()
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.host.banner()
    }

    pub fn pending_fetches(&self) -> usize {
        self.env.fetches.len()
    }

    pub fn services_mut(&mut self) -> &mut Collaborators {
        &mut self.env.services
    }

    // -- Actions -----------------------------------------------------------

    /// Apply one user action. Returns whether it was honored.
    ///
    /// While locked only `Unlock`, `Lock` and `Tick` are honored.
    pub fn dispatch(&mut self, action: ShellAction) -> bool {
        if self.lock.is_locked()
            && !matches!(
                action,
                ShellAction::Unlock | ShellAction::Lock | ShellAction::Tick
            )
        {
            log::debug!("Ignoring {action:?} while locked");
            return false;
        }
        match action {
            ShellAction::Unlock => {
                self.lock.unlock();
                true
            },
            ShellAction::Lock => {
                self.lock();
                true
            },
            ShellAction::Home => {
                if self.grid.is_editing() {
                    self.exit_edit_mode();
                } else if self.router.active().is_some() {
                    self.go_home();
                } else {
                    self.lock();
                }
                true
            },
            ShellAction::Back => {
                if self.grid.is_editing() {
                    self.exit_edit_mode();
                    true
                } else {
                    self.go_home()
                }
            },
            ShellAction::Open(app) => self.open(app),
            ShellAction::Tap(index) => self.tap(index),
            ShellAction::ToggleEditMode => self.toggle_edit_mode(),
            ShellAction::Reorder { from, to } => self.reorder(from, to),
            ShellAction::PointerDown { x, y } => self.pointer_down(x, y),
            ShellAction::PointerMove { x, y } => self.pointer_move(x, y),
            ShellAction::PointerUp { x, y } => self.pointer_up(x, y),
            ShellAction::PointerCancel => {
                self.drag.cancel();
                self.pressed = None;
                true
            },
            ShellAction::Command { verb, args } => self.command(&verb, &args),
            ShellAction::Tick => self.tick(),
        }
    }

    /// Lock and route home in one step.
    pub fn lock(&mut self) {
        self.exit_edit_mode();
        self.pressed = None;
        self.lock.lock();
        self.router.go_home();
        self.sync_mount();
    }

    pub fn open(&mut self, app: AppId) -> bool {
        let opened = self.router.open(app, self.grid.is_editing());
        self.sync_mount();
        opened
    }

    pub fn go_home(&mut self) -> bool {
        let changed = self.router.go_home();
        self.sync_mount();
        changed
    }

    fn tap(&mut self, index: usize) -> bool {
        if self.router.active().is_some() {
            return false;
        }
        match self.grid.tap(index) {
            Some(app) => self.open(app),
            None => false,
        }
    }

    fn toggle_edit_mode(&mut self) -> bool {
        if self.router.active().is_some() {
            log::debug!("Edit mode is only available on the home screen");
            return false;
        }
        if self.grid.is_editing() {
            self.exit_edit_mode();
        } else {
            self.pressed = None;
            self.grid.set_editing(true);
        }
        true
    }

    fn exit_edit_mode(&mut self) {
        self.drag.cancel();
        self.grid.set_editing(false);
    }

    fn reorder(&mut self, from: usize, to: usize) -> bool {
        if !self.grid.is_editing() {
            return false;
        }
        let changed = self.grid.reorder(from, to);
        if changed {
            self.grid.persist(&mut self.env.settings);
        }
        changed
    }

    fn slot_at(&self, x: i32, y: i32) -> Option<usize> {
        self.geometry.slot_at(x, y, self.grid.order().len())
    }

    fn pointer_down(&mut self, x: i32, y: i32) -> bool {
        if self.router.active().is_some() {
            return false;
        }
        let Some(slot) = self.slot_at(x, y) else {
            return false;
        };
        if self.grid.is_editing() {
            self.drag.pointer_down(slot);
        } else {
            self.pressed = Some(slot);
        }
        true
    }

    fn pointer_move(&mut self, x: i32, y: i32) -> bool {
        let slot = self.slot_at(x, y);
        if self.drag.is_dragging() {
            self.drag.pointer_move(slot);
            return true;
        }
        if self.pressed.is_some() && self.pressed != slot {
            self.pressed = None;
        }
        false
    }

    fn pointer_up(&mut self, x: i32, y: i32) -> bool {
        if self.drag.is_dragging() {
            self.drag.pointer_move(self.slot_at(x, y));
            return match self.drag.pointer_up() {
                Some((from, to)) => self.reorder(from, to),
                None => false,
            };
        }
        match self.pressed.take() {
            Some(slot) if self.slot_at(x, y) == Some(slot) => self.tap(slot),
            _ => false,
        }
    }

    fn command(&mut self, verb: &str, args: &[String]) -> bool {
        let Some(token) = self.router.token() else {
            log::debug!("Command {verb:?} on the home screen");
            return false;
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let ok = self.host.handle(verb, &args, &mut self.env.cx(token));
        self.refresh_status();
        ok
    }

    /// Refresh the status bar if the clock interval has elapsed. Returns
    /// whether it refreshed.
    pub fn tick(&mut self) -> bool {
        let now = match self.env.platform.unix_secs() {
            Ok(now) => now,
            Err(e) => {
                log::warn!("Clock unavailable: {e}");
                return false;
            },
        };
        if !self.ticker.due(now) {
            return false;
        }
        self.refresh_status();
        true
    }

    fn refresh_status(&mut self) {
        let time = self
            .env
            .platform
            .now()
            .map_err(|e| log::warn!("Clock unavailable: {e}"))
            .ok();
        let power = self
            .env
            .platform
            .power_info()
            .map_err(|e| log::warn!("Power info unavailable: {e}"))
            .ok();
        self.status
            .update_info(time.as_ref(), power.as_ref(), self.env.settings.current());
    }

    // -- Applet lifecycle ----------------------------------------------------

    /// Bring the host in line with the router: unmount whatever is no
    /// longer current, mount whatever now is.
    fn sync_mount(&mut self) {
        let wanted = self.router.token();
        let mounted = self.host.token();
        if wanted == mounted {
            return;
        }
        if let Some(old) = mounted {
            self.host.unmount(&mut self.env.cx(old));
        }
        let Some(token) = wanted else {
            return;
        };
        match self.registry.build(token.app(), &self.applet_config) {
            Ok(applet) => self.host.mount(applet, &mut self.env.cx(token)),
            Err(e) => {
                log::error!("Cannot open {}: {e}", token.app());
                self.router.go_home();
            },
        }
    }

    /// Run queued fetches and deliver the results that are still wanted.
    /// Returns the number delivered.
    pub fn pump(&mut self) -> usize {
        if let Some(token) = self.host.token() {
            for job in self.host.poll_jobs() {
                self.env.fetches.push(token, job);
            }
        }
        let mut delivered = 0;
        while let Some((token, job)) = self.env.fetches.pop() {
            let result = job.run(&mut self.env.services);
            if !self.router.is_current(token) || self.host.token() != Some(token) {
                log::debug!(
                    "Dropping stale result for {} (generation {})",
                    token.app(),
                    token.generation()
                );
                continue;
            }
            self.host.deliver(result, &mut self.env.cx(token));
            delivered += 1;
        }
        delivered
    }
}
