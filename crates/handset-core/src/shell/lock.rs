//! The lock screen gate.

/// Owner of `locked`. Starts locked; only explicit user actions change it.
#[derive(Debug)]
pub struct LockController {
    locked: bool,
}

impl LockController {
    pub fn new() -> Self {
        Self { locked: true }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn unlock(&mut self) {
        if self.locked {
            log::info!("Unlocked");
        }
        self.locked = false;
    }

    /// Engage the lock. Routing home is the caller's half of the lock
    /// action; see `DeviceShell::lock`.
    pub fn lock(&mut self) {
        if !self.locked {
            log::info!("Locked");
        }
        self.locked = true;
    }
}

impl Default for LockController {
    fn default() -> Self {
        Self::new()
    }
}
