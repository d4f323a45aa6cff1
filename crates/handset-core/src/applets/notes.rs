//! To-do notes kept in the `notes` key-value collection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::applets::{Applet, AppletContext, arg, rest, unknown_command};
use crate::error::{HandsetError, Result};
use crate::registry::AppId;
use crate::shell::{FetchJob, FetchResult};

pub const NOTES_COLLECTION: &str = "notes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: u64,
    pub text: String,
    pub done: bool,
}

/// Stored value of one note; the id is the key.
#[derive(Serialize, Deserialize)]
struct StoredNote {
    text: String,
    #[serde(default)]
    done: bool,
}

fn notes_from(entries: BTreeMap<String, String>) -> Vec<Note> {
    let mut notes: Vec<Note> = entries
        .into_iter()
        .filter_map(|(key, value)| {
            let id = key.parse().ok()?;
            match serde_json::from_str::<StoredNote>(&value) {
                Ok(stored) => Some(Note {
                    id,
                    text: stored.text,
                    done: stored.done,
                }),
                Err(e) => {
                    log::warn!("Skipping unreadable note {key}: {e}");
                    None
                },
            }
        })
        .collect();
    notes.sort_by_key(|n| n.id);
    notes
}

pub struct NotesApplet {
    notes: Vec<Note>,
}

impl NotesApplet {
    pub fn new() -> Self {
        Self { notes: Vec::new() }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    fn write(note: &Note, cx: &mut AppletContext<'_>) -> Result<()> {
        let value = serde_json::to_string(&StoredNote {
            text: note.text.clone(),
            done: note.done,
        })?;
        cx.services
            .kv
            .set(NOTES_COLLECTION, &note.id.to_string(), &value)
    }

    pub fn add(&mut self, text: &str, cx: &mut AppletContext<'_>) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(HandsetError::Validation("note text is required".into()));
        }
        let id = self.notes.iter().map(|n| n.id).max().unwrap_or(0) + 1;
        let note = Note {
            id,
            text: text.to_string(),
            done: false,
        };
        Self::write(&note, cx)?;
        self.notes.push(note);
        Ok(())
    }

    pub fn toggle(&mut self, id: u64, cx: &mut AppletContext<'_>) -> Result<()> {
        let index = self.position(id)?;
        let mut note = self.notes[index].clone();
        note.done = !note.done;
        Self::write(&note, cx)?;
        self.notes[index] = note;
        Ok(())
    }

    pub fn delete(&mut self, id: u64, cx: &mut AppletContext<'_>) -> Result<()> {
        let index = self.position(id)?;
        cx.services.kv.delete(NOTES_COLLECTION, &id.to_string())?;
        self.notes.remove(index);
        Ok(())
    }

    fn position(&self, id: u64) -> Result<usize> {
        self.notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| HandsetError::Validation(format!("no note {id}")))
    }
}

impl Default for NotesApplet {
    fn default() -> Self {
        Self::new()
    }
}

impl Applet for NotesApplet {
    fn id(&self) -> AppId {
        AppId::Notes
    }

    fn on_mount(&mut self, cx: &mut AppletContext<'_>) -> Result<()> {
        cx.request(FetchJob::Collection(NOTES_COLLECTION.into()));
        Ok(())
    }

    fn handle(&mut self, command: &str, args: &[&str], cx: &mut AppletContext<'_>) -> Result<()> {
        match command {
            "add" => self.add(&rest(args), cx),
            "toggle" | "done" => self.toggle(arg(args, 0, "note id")?, cx),
            "delete" => self.delete(arg(args, 0, "note id")?, cx),
            "refresh" => {
                cx.request(FetchJob::Collection(NOTES_COLLECTION.into()));
                Ok(())
            },
            other => Err(unknown_command(self.id(), other)),
        }
    }

    fn on_fetched(&mut self, result: FetchResult, _cx: &mut AppletContext<'_>) -> Result<()> {
        match result {
            FetchResult::Collection { name, entries } if name == NOTES_COLLECTION => {
                self.notes = notes_from(entries?);
            },
            _ => {},
        }
        Ok(())
    }

    fn view(&self) -> Vec<String> {
        if self.notes.is_empty() {
            return vec!["Nothing to do".into()];
        }
        self.notes
            .iter()
            .map(|n| format!("{:>3} [{}] {}", n.id, if n.done { 'x' } else { ' ' }, n.text))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applets::test_support::Harness;

    #[test]
    fn add_toggle_delete() {
        let mut h = Harness::new();
        let mut app = NotesApplet::new();
        h.mount(&mut app).unwrap();
        h.run(&mut app, "add buy milk").unwrap();
        h.run(&mut app, "add call mom").unwrap();
        assert_eq!(app.notes().len(), 2);
        assert_eq!(app.notes()[1].id, 2);

        h.run(&mut app, "toggle 1").unwrap();
        assert!(app.notes()[0].done);
        h.run(&mut app, "delete 2").unwrap();
        assert_eq!(app.notes().len(), 1);

        // A fresh mounting sees the stored state.
        let mut again = NotesApplet::new();
        h.mount(&mut again).unwrap();
        assert_eq!(
            again.notes(),
            &[Note {
                id: 1,
                text: "buy milk".into(),
                done: true
            }]
        );
    }

    #[test]
    fn blank_note_rejected() {
        let mut h = Harness::new();
        let mut app = NotesApplet::new();
        assert!(h.run(&mut app, "add   ").unwrap_err().is_validation());
    }

    #[test]
    fn unknown_id_rejected() {
        let mut h = Harness::new();
        let mut app = NotesApplet::new();
        assert!(h.run(&mut app, "toggle 9").unwrap_err().is_validation());
        assert!(matches!(
            h.run(&mut app, "delete x"),
            Err(HandsetError::Command(_))
        ));
    }

    #[test]
    fn corrupt_entries_skipped() {
        let mut entries = BTreeMap::new();
        entries.insert("1".to_string(), r#"{"text":"ok"}"#.to_string());
        entries.insert("2".to_string(), "garbage".to_string());
        entries.insert("x".to_string(), r#"{"text":"bad key"}"#.to_string());
        let notes = notes_from(entries);
        assert_eq!(notes.len(), 1);
        assert!(!notes[0].done);
    }
}
