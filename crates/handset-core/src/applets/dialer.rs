//! Phone: dial pad plus a searchable list of contacts.

use crate::applets::contacts::{CONTACTS_COLLECTION, Contact, contacts_from, dial_string};
use crate::applets::{Applet, AppletContext, rest, unknown_command};
use crate::error::{HandsetError, Result};
use crate::registry::AppId;
use crate::shell::{FetchJob, FetchResult};

const MAX_NUMBER_LEN: usize = 20;

/// An outgoing call in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub number: String,
    /// Contact name when the number belongs to one.
    pub name: Option<String>,
}

impl Call {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.number)
    }
}

pub struct DialerApplet {
    contacts: Vec<Contact>,
    search: String,
    number: String,
    call: Option<Call>,
}

impl DialerApplet {
    pub fn new() -> Self {
        Self {
            contacts: Vec::new(),
            search: String::new(),
            number: String::new(),
            call: None,
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn call(&self) -> Option<&Call> {
        self.call.as_ref()
    }

    /// Type dial pad keys. Anything other than digits, `*`, `#` and `+` is
    /// rejected without changing the buffer.
    pub fn press(&mut self, keys: &str) -> Result<()> {
        if let Some(bad) = keys
            .chars()
            .find(|c| !(c.is_ascii_digit() || matches!(*c, '*' | '#' | '+')))
        {
            return Err(HandsetError::Validation(format!("no dial pad key {bad:?}")));
        }
        for c in keys.chars() {
            if self.number.len() < MAX_NUMBER_LEN {
                self.number.push(c);
            }
        }
        Ok(())
    }

    pub fn backspace(&mut self) {
        self.number.pop();
    }

    /// Contact whose number dials the same as `number`.
    fn lookup(&self, number: &str) -> Option<&Contact> {
        let wanted = dial_string(number);
        self.contacts.iter().find(|c| c.dial_string() == wanted)
    }

    /// Call the number in the buffer.
    pub fn dial(&mut self) -> Result<()> {
        if self.number.is_empty() {
            return Err(HandsetError::Validation("enter a number first".into()));
        }
        let name = self.lookup(&self.number).map(|c| c.name.clone());
        self.call = Some(Call {
            number: self.number.clone(),
            name,
        });
        log::debug!("Calling {}", self.number);
        Ok(())
    }

    /// Call a contact by name.
    pub fn dial_contact(&mut self, name: &str) -> Result<()> {
        let contact = self
            .contacts
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| HandsetError::Validation(format!("no contact named {name:?}")))?;
        self.number = contact.dial_string();
        self.call = Some(Call {
            number: self.number.clone(),
            name: Some(contact.name.clone()),
        });
        Ok(())
    }

    pub fn hang_up(&mut self) {
        self.call = None;
    }
}

impl Default for DialerApplet {
    fn default() -> Self {
        Self::new()
    }
}

impl Applet for DialerApplet {
    fn id(&self) -> AppId {
        AppId::Phone
    }

    fn on_mount(&mut self, cx: &mut AppletContext<'_>) -> Result<()> {
        cx.request(FetchJob::Collection(CONTACTS_COLLECTION.into()));
        Ok(())
    }

    fn handle(&mut self, command: &str, args: &[&str], cx: &mut AppletContext<'_>) -> Result<()> {
        match command {
            "press" | "dial" if !args.is_empty() => {
                self.press(&args.concat())?;
                if command == "dial" {
                    self.dial()?;
                }
            },
            "dial" | "call" if args.is_empty() => self.dial()?,
            "call" => self.dial_contact(&rest(args))?,
            "back" => self.backspace(),
            "clear" => self.number.clear(),
            "hangup" | "end" => self.hang_up(),
            "search" => self.search = rest(args),
            "refresh" => cx.request(FetchJob::Collection(CONTACTS_COLLECTION.into())),
            other => return Err(unknown_command(self.id(), other)),
        }
        Ok(())
    }

    fn on_fetched(&mut self, result: FetchResult, _cx: &mut AppletContext<'_>) -> Result<()> {
        match result {
            FetchResult::Collection { name, entries } if name == CONTACTS_COLLECTION => {
                self.contacts = contacts_from(entries?);
            },
            _ => {},
        }
        Ok(())
    }

    fn view(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(call) = &self.call {
            lines.push(format!("Calling {}...", call.label()));
            lines.push(format!("tel:{}", dial_string(&call.number)));
            return lines;
        }
        lines.push(format!("[{}]", self.number));
        lines.push(" 1  2  3".into());
        lines.push(" 4  5  6".into());
        lines.push(" 7  8  9".into());
        lines.push(" *  0  #".into());
        lines.push(format!("Search: {}", self.search));
        if self.contacts.is_empty() {
            lines.push("No contacts found".into());
        }
        lines.extend(
            self.contacts
                .iter()
                .filter(|c| c.matches(&self.search))
                .map(|c| format!("{:<24} {}", c.name, c.phone)),
        );
        lines
    }
}
