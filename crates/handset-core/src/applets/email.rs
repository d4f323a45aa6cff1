//! Compose-and-send email form delivered through the form relay.

use std::collections::BTreeMap;

use crate::applets::{Applet, AppletContext, rest, unknown_command};
use crate::error::{HandsetError, Result};
use crate::registry::AppId;

/// The fields of the compose form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailDraft {
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// `local@domain.tld` with no whitespace and a dot after the `@`.
fn looks_like_address(address: &str) -> bool {
    if address.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

impl EmailDraft {
    /// Check every field, reporting the first one that fails.
    pub fn validate(&self) -> Result<()> {
        if !looks_like_address(self.email.trim()) {
            return Err(HandsetError::Validation(format!(
                "Email: {:?} is not an email address",
                self.email
            )));
        }
        if self.subject.trim().is_empty() {
            return Err(HandsetError::Validation("Subject is required".into()));
        }
        if self.message.trim().is_empty() {
            return Err(HandsetError::Validation("Message is required".into()));
        }
        Ok(())
    }

    fn fields(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("email".to_string(), self.email.trim().to_string()),
            ("subject".to_string(), self.subject.clone()),
            ("message".to_string(), self.message.clone()),
        ])
    }
}

pub struct EmailApplet {
    draft: EmailDraft,
    sent: bool,
}

impl EmailApplet {
    pub fn new() -> Self {
        Self {
            draft: EmailDraft::default(),
            sent: false,
        }
    }

    pub fn draft(&self) -> &EmailDraft {
        &self.draft
    }

    pub fn was_sent(&self) -> bool {
        self.sent
    }

    pub fn send(&mut self, cx: &mut AppletContext<'_>) -> Result<()> {
        self.draft.validate()?;
        cx.services.forms.submit(&self.draft.fields())?;
        log::info!("Email sent to form relay");
        self.draft = EmailDraft::default();
        self.sent = true;
        Ok(())
    }
}

impl Default for EmailApplet {
    fn default() -> Self {
        Self::new()
    }
}

impl Applet for EmailApplet {
    fn id(&self) -> AppId {
        AppId::Email
    }

    fn handle(&mut self, command: &str, args: &[&str], cx: &mut AppletContext<'_>) -> Result<()> {
        match command {
            "to" | "email" => self.draft.email = rest(args),
            "subject" => self.draft.subject = rest(args),
            "message" | "body" => self.draft.message = rest(args),
            "send" => return self.send(cx),
            "new" => {
                self.draft = EmailDraft::default();
                self.sent = false;
            },
            other => return Err(unknown_command(self.id(), other)),
        }
        self.sent = false;
        Ok(())
    }

    fn view(&self) -> Vec<String> {
        if self.sent {
            return vec!["Email sent successfully!".into()];
        }
        vec![
            "New Email".into(),
            format!("To:      {}", self.draft.email),
            format!("Subject: {}", self.draft.subject),
            format!("Message: {}", self.draft.message),
            "[Send]".into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applets::test_support::Harness;
    use crate::platform::MemoryFormRelay;

    #[test]
    fn address_shapes() {
        assert!(looks_like_address("a@b.c"));
        assert!(looks_like_address("first.last@mail.example.com"));
        assert!(!looks_like_address("a@b"));
        assert!(!looks_like_address("@b.c"));
        assert!(!looks_like_address("a@.c"));
        assert!(!looks_like_address("a@b."));
        assert!(!looks_like_address("a b@c.d"));
        assert!(!looks_like_address("a@b@c.d"));
    }

    #[test]
    fn send_clears_form() {
        let mut h = Harness::new();
        let mut app = EmailApplet::new();
        h.run(&mut app, "to me@example.com").unwrap();
        h.run(&mut app, "subject Hello").unwrap();
        h.run(&mut app, "message See you soon").unwrap();
        h.run(&mut app, "send").unwrap();
        assert!(app.was_sent());
        assert_eq!(app.draft(), &EmailDraft::default());
    }

    #[test]
    fn invalid_draft_never_submitted() {
        let mut h = Harness::new();
        let mut app = EmailApplet::new();
        h.run(&mut app, "to nobody").unwrap();
        h.run(&mut app, "subject Hi").unwrap();
        h.run(&mut app, "message Body").unwrap();
        assert!(h.run(&mut app, "send").unwrap_err().is_validation());
        h.run(&mut app, "to a@b.c").unwrap();
        h.run(&mut app, "subject").unwrap();
        assert!(h.run(&mut app, "send").unwrap_err().is_validation());
        assert!(!app.was_sent());
        assert_eq!(app.draft().email, "a@b.c");
    }

    #[test]
    fn relay_failure_keeps_draft() {
        let mut h = Harness::new();
        let mut relay = MemoryFormRelay::new();
        relay.set_offline(true);
        h.services.forms = Box::new(relay);
        let mut app = EmailApplet::new();
        h.run(&mut app, "to a@b.c").unwrap();
        h.run(&mut app, "subject s").unwrap();
        h.run(&mut app, "body m").unwrap();
        assert!(matches!(
            h.run(&mut app, "send"),
            Err(HandsetError::Service(_))
        ));
        assert_eq!(app.draft().subject, "s");
    }
}
