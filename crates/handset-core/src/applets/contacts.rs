//! Address book backed by the `contacts` key-value collection.

use std::collections::BTreeMap;

use crate::applets::{Applet, AppletContext, rest, unknown_command};
use crate::error::{HandsetError, Result};
use crate::registry::AppId;
use crate::shell::{FetchJob, FetchResult};

/// Key-value collection holding name -> phone.
pub const CONTACTS_COLLECTION: &str = "contacts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub name: String,
    pub phone: String,
}

impl Contact {
    /// Digits and a leading `+`, as dialled.
    pub fn dial_string(&self) -> String {
        dial_string(&self.phone)
    }

    /// Case-insensitive name match or substring phone match.
    pub fn matches(&self, term: &str) -> bool {
        term.is_empty()
            || self.name.to_lowercase().contains(&term.to_lowercase())
            || self.phone.contains(term)
    }
}

/// Strip everything but digits and `+` from a phone number.
pub fn dial_string(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check a new contact before it is written.
pub fn validate_contact(name: &str, phone: &str) -> Result<Contact> {
    let name = name.trim();
    let phone = phone.trim();
    if name.is_empty() {
        return Err(HandsetError::Validation("name is required".into()));
    }
    if phone.is_empty() {
        return Err(HandsetError::Validation("phone is required".into()));
    }
    if let Some(bad) = phone
        .chars()
        .find(|c| !(c.is_ascii_digit() || matches!(*c, ' ' | '+' | '-' | '(' | ')')))
    {
        return Err(HandsetError::Validation(format!(
            "phone may not contain {bad:?}"
        )));
    }
    if !phone.chars().any(|c| c.is_ascii_digit()) {
        return Err(HandsetError::Validation("phone has no digits".into()));
    }
    Ok(Contact {
        name: name.to_string(),
        phone: phone.to_string(),
    })
}

/// Contacts sorted by name from a fetched collection.
pub(crate) fn contacts_from(entries: BTreeMap<String, String>) -> Vec<Contact> {
    entries
        .into_iter()
        .map(|(name, phone)| Contact { name, phone })
        .collect()
}

/// Split `Name words, phone` (or `Name phone` when there is no comma).
fn split_name_phone(text: &str) -> (String, String) {
    if let Some((name, phone)) = text.split_once(',') {
        return (name.trim().to_string(), phone.trim().to_string());
    }
    match text.trim().rsplit_once(' ') {
        Some((name, phone)) => (name.trim().to_string(), phone.to_string()),
        None => (text.trim().to_string(), String::new()),
    }
}

pub struct ContactsApplet {
    contacts: Vec<Contact>,
    search: String,
    loading: bool,
}

impl ContactsApplet {
    pub fn new() -> Self {
        Self {
            contacts: Vec::new(),
            search: String::new(),
            loading: false,
        }
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Contacts matching the search field.
    pub fn visible(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter().filter(|c| c.matches(&self.search))
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn refresh(&mut self, cx: &mut AppletContext<'_>) {
        self.loading = true;
        cx.request(FetchJob::Collection(CONTACTS_COLLECTION.into()));
    }

    pub fn add(&mut self, name: &str, phone: &str, cx: &mut AppletContext<'_>) -> Result<()> {
        let contact = validate_contact(name, phone)?;
        cx.services
            .kv
            .set(CONTACTS_COLLECTION, &contact.name, &contact.phone)?;
        log::debug!("Saved contact {}", contact.name);
        self.refresh(cx);
        Ok(())
    }

    pub fn delete(&mut self, name: &str, cx: &mut AppletContext<'_>) -> Result<()> {
        if name.trim().is_empty() {
            return Err(HandsetError::Validation("which contact?".into()));
        }
        cx.services.kv.delete(CONTACTS_COLLECTION, name.trim())?;
        self.refresh(cx);
        Ok(())
    }
}

impl Default for ContactsApplet {
    fn default() -> Self {
        Self::new()
    }
}

impl Applet for ContactsApplet {
    fn id(&self) -> AppId {
        AppId::Contacts
    }

    fn on_mount(&mut self, cx: &mut AppletContext<'_>) -> Result<()> {
        self.refresh(cx);
        Ok(())
    }

    fn handle(&mut self, command: &str, args: &[&str], cx: &mut AppletContext<'_>) -> Result<()> {
        match command {
            "refresh" => self.refresh(cx),
            "search" => self.search = rest(args),
            "add" => {
                let (name, phone) = split_name_phone(&rest(args));
                self.add(&name, &phone, cx)?;
            },
            "delete" => self.delete(&rest(args), cx)?,
            other => return Err(unknown_command(self.id(), other)),
        }
        Ok(())
    }

    fn on_fetched(&mut self, result: FetchResult, _cx: &mut AppletContext<'_>) -> Result<()> {
        match result {
            FetchResult::Collection { name, entries } if name == CONTACTS_COLLECTION => {
                self.loading = false;
                self.contacts = contacts_from(entries?);
            },
            _ => {},
        }
        Ok(())
    }

    fn view(&self) -> Vec<String> {
        let mut lines = vec![format!("Search: {}", self.search)];
        if self.loading {
            lines.push("Loading...".into());
        }
        if self.contacts.is_empty() {
            lines.push("No contacts found".into());
            lines.push("Add a new contact with add <name>, <phone>".into());
            return lines;
        }
        lines.extend(self.visible().map(|c| format!("{:<24} {}", c.name, c.phone)));
        lines
    }
}
