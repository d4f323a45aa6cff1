//! The error boundary around the mounted applet.
//!
//! Every call into the applet goes through [`AppletHost`], which turns an
//! `Err` into something the user can see and returns normally. Shell state
//! is never touched from here.

use crate::applets::{Applet, AppletContext};
use crate::error::{HandsetError, Result};
use crate::registry::AppId;
use crate::shell::{ActivationToken, FetchJob, FetchResult};

/// A message drawn across the top of the applet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    /// The platform refused camera or microphone access. Stays up until the
    /// applet next succeeds or is unmounted.
    Permission(String),
    /// A collaborator failed. Cleared by the next command.
    Failure(String),
}

struct Mounted {
    token: ActivationToken,
    applet: Box<dyn Applet>,
}

/// Owner of the single mounted applet.
#[derive(Default)]
pub struct AppletHost {
    mounted: Option<Mounted>,
    notice: Option<String>,
    banner: Option<Banner>,
}

impl AppletHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `applet` under the context's token, replacing nothing: the
    /// caller unmounts first.
    pub fn mount(&mut self, mut applet: Box<dyn Applet>, cx: &mut AppletContext<'_>) {
        debug_assert!(self.mounted.is_none(), "mount over a live applet");
        self.notice = None;
        self.banner = None;
        log::debug!("Mounting {}", applet.id());
        let result = applet.on_mount(cx);
        self.mounted = Some(Mounted {
            token: cx.token,
            applet,
        });
        self.absorb(result);
    }

    /// Drop the mounted applet, if any, after its unmount hook.
    pub fn unmount(&mut self, cx: &mut AppletContext<'_>) {
        if let Some(mut mounted) = self.mounted.take() {
            log::debug!("Unmounting {}", mounted.applet.id());
            mounted.applet.on_unmount(cx);
        }
        self.notice = None;
        self.banner = None;
    }

    /// Forward one command. Returns whether it succeeded.
    pub fn handle(&mut self, command: &str, args: &[&str], cx: &mut AppletContext<'_>) -> bool {
        self.notice = None;
        if matches!(self.banner, Some(Banner::Failure(_))) {
            self.banner = None;
        }
        let Some(mounted) = self.mounted.as_mut() else {
            log::debug!("Command {command:?} with no applet mounted");
            return false;
        };
        let result = mounted.applet.handle(command, args, cx);
        let ok = result.is_ok();
        if ok {
            self.banner = None;
        }
        self.absorb(result);
        ok
    }

    /// Deliver a completed fetch to the mounted applet.
    pub fn deliver(&mut self, result: FetchResult, cx: &mut AppletContext<'_>) {
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        let outcome = mounted.applet.on_fetched(result, cx);
        self.absorb(outcome);
    }

    /// Recurring jobs of the mounted applet.
    pub fn poll_jobs(&self) -> Vec<FetchJob> {
        self.mounted
            .as_ref()
            .map(|m| m.applet.poll_jobs())
            .unwrap_or_default()
    }

    pub fn mounted_id(&self) -> Option<AppId> {
        self.mounted.as_ref().map(|m| m.applet.id())
    }

    pub fn token(&self) -> Option<ActivationToken> {
        self.mounted.as_ref().map(|m| m.token)
    }

    pub fn view(&self) -> Vec<String> {
        self.mounted
            .as_ref()
            .map(|m| m.applet.view())
            .unwrap_or_default()
    }

    /// Inline message for rejected input.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    fn absorb(&mut self, result: Result<()>) {
        let Err(e) = result else {
            return;
        };
        let app = self.mounted_id().map(|id| id.label()).unwrap_or("applet");
        match e {
            HandsetError::Validation(msg) | HandsetError::Command(msg) => {
                log::debug!("{app}: rejected input: {msg}");
                self.notice = Some(msg);
            },
            HandsetError::PermissionDenied(msg) => {
                log::warn!("{app}: permission denied: {msg}");
                self.banner = Some(Banner::Permission(msg));
            },
            other => {
                log::warn!("{app}: {other}");
                self.banner = Some(Banner::Failure(other.to_string()));
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applets::test_support::Harness;

    /// Applet whose every command fails with the error named by its verb.
    struct Faulty;

    impl Applet for Faulty {
        fn id(&self) -> AppId {
            AppId::Notes
        }

        fn handle(
            &mut self,
            command: &str,
            _args: &[&str],
            _cx: &mut AppletContext<'_>,
        ) -> Result<()> {
            match command {
                "ok" => Ok(()),
                "invalid" => Err(HandsetError::Validation("text is required".into())),
                "denied" => Err(HandsetError::PermissionDenied("camera".into())),
                "offline" => Err(HandsetError::Service("store is unreachable".into())),
                other => Err(crate::applets::unknown_command(self.id(), other)),
            }
        }

        fn view(&self) -> Vec<String> {
            vec!["faulty".into()]
        }
    }

    fn mounted() -> (AppletHost, Harness) {
        let mut harness = Harness::new();
        let mut host = AppletHost::new();
        host.mount(Box::new(Faulty), &mut harness.cx());
        (host, harness)
    }

    #[test]
    fn validation_becomes_notice() {
        let (mut host, mut h) = mounted();
        assert!(!host.handle("invalid", &[], &mut h.cx()));
        assert_eq!(host.notice(), Some("text is required"));
        assert!(host.banner().is_none());
        assert!(host.handle("ok", &[], &mut h.cx()));
        assert!(host.notice().is_none());
    }

    #[test]
    fn unknown_command_becomes_notice() {
        let (mut host, mut h) = mounted();
        assert!(!host.handle("fly", &[], &mut h.cx()));
        assert!(host.notice().is_some_and(|n| n.contains("fly")));
    }

    #[test]
    fn permission_banner_survives_failures() {
        let (mut host, mut h) = mounted();
        host.handle("denied", &[], &mut h.cx());
        assert!(matches!(host.banner(), Some(Banner::Permission(_))));
        host.handle("invalid", &[], &mut h.cx());
        assert!(matches!(host.banner(), Some(Banner::Permission(_))));
        host.handle("ok", &[], &mut h.cx());
        assert!(host.banner().is_none());
    }

    #[test]
    fn failure_banner_is_transient() {
        let (mut host, mut h) = mounted();
        host.handle("offline", &[], &mut h.cx());
        match host.banner() {
            Some(Banner::Failure(msg)) => assert!(msg.contains("unreachable")),
            other => panic!("expected failure banner, got {other:?}"),
        }
        host.handle("invalid", &[], &mut h.cx());
        assert!(host.banner().is_none());
    }

    #[test]
    fn unmount_clears_everything() {
        let (mut host, mut h) = mounted();
        host.handle("denied", &[], &mut h.cx());
        host.unmount(&mut h.cx());
        assert!(host.mounted_id().is_none());
        assert!(host.banner().is_none());
        assert!(host.view().is_empty());
        assert!(!host.handle("ok", &[], &mut h.cx()));
    }
}
