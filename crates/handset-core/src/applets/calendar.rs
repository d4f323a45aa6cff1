//! Month calendar with one note per day, stored in `calendar:events`.

use std::collections::BTreeMap;

use crate::applets::{Applet, AppletContext, rest, unknown_command};
use crate::error::{HandsetError, Result};
use crate::platform::services::{days_in_month, weekday};
use crate::registry::AppId;
use crate::shell::{FetchJob, FetchResult};

/// Key-value collection holding `YYYY-MM-DD` -> event text.
pub const EVENTS_COLLECTION: &str = "calendar:events";

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub date: String,
    pub text: String,
}

/// One displayed month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthView {
    pub year: u16,
    /// 1-12.
    pub month: u8,
}

impl MonthView {
    pub fn new(year: u16, month: u8) -> Self {
        Self {
            year,
            month: month.clamp(1, 12),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self::new(self.year.saturating_sub(1), 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    pub fn title(self) -> String {
        format!("{} {}", MONTHS[usize::from(self.month - 1)], self.year)
    }

    pub fn days(self) -> u8 {
        days_in_month(self.year, self.month)
    }

    /// Six weeks of seven cells, Sunday first; `None` pads before the 1st
    /// and after the last day.
    pub fn grid(self) -> [Option<u8>; 42] {
        let first = usize::from(weekday(self.year, self.month, 1));
        let days = usize::from(self.days());
        let mut cells = [None; 42];
        for (i, cell) in cells.iter_mut().enumerate() {
            if i >= first && i - first < days {
                *cell = Some((i - first + 1) as u8);
            }
        }
        cells
    }

    /// `YYYY-MM-DD` key for a day of this month.
    pub fn date_key(self, day: u8) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, day)
    }
}

/// Parse and check a `YYYY-MM-DD` key.
fn parse_date(key: &str) -> Result<(MonthView, u8)> {
    let invalid = || HandsetError::Validation(format!("not a date: {key:?}"));
    let mut parts = key.split('-');
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    if y.len() != 4 || m.len() != 2 || d.len() != 2 {
        return Err(invalid());
    }
    let year: u16 = y.parse().map_err(|_| invalid())?;
    let month: u8 = m.parse().map_err(|_| invalid())?;
    let day: u8 = d.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return Err(invalid());
    }
    Ok((MonthView::new(year, month), day))
}

pub struct CalendarApplet {
    view: MonthView,
    /// Today's date key, for highlighting.
    today: Option<String>,
    selected: Option<String>,
    events: BTreeMap<String, String>,
}

impl CalendarApplet {
    pub fn new() -> Self {
        Self {
            view: MonthView::new(1970, 1),
            today: None,
            selected: None,
            events: BTreeMap::new(),
        }
    }

    pub fn month(&self) -> MonthView {
        self.view
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn events(&self) -> impl Iterator<Item = CalendarEvent> + '_ {
        self.events.iter().map(|(date, text)| CalendarEvent {
            date: date.clone(),
            text: text.clone(),
        })
    }

    /// Select a day of the shown month, or any `YYYY-MM-DD` date (which
    /// also moves the view to its month).
    pub fn select(&mut self, what: &str) -> Result<()> {
        if let Ok(day) = what.parse::<u8>() {
            if day == 0 || day > self.view.days() {
                return Err(HandsetError::Validation(format!(
                    "{} has no day {day}",
                    self.view.title()
                )));
            }
            self.selected = Some(self.view.date_key(day));
            return Ok(());
        }
        let (month, day) = parse_date(what)?;
        self.view = month;
        self.selected = Some(month.date_key(day));
        Ok(())
    }

    /// Save `text` for the selected day.
    pub fn save(&mut self, text: &str, cx: &mut AppletContext<'_>) -> Result<()> {
        let Some(date) = self.selected.clone() else {
            return Err(HandsetError::Validation("select a day first".into()));
        };
        let text = text.trim();
        if text.is_empty() {
            return Err(HandsetError::Validation("event text is required".into()));
        }
        cx.services.kv.set(EVENTS_COLLECTION, &date, text)?;
        self.events.insert(date, text.to_string());
        Ok(())
    }

    /// Delete the event on `date`, or on the selected day.
    pub fn delete(&mut self, date: Option<&str>, cx: &mut AppletContext<'_>) -> Result<()> {
        let date = match date {
            Some(d) => {
                parse_date(d)?;
                d.to_string()
            },
            None => self
                .selected
                .clone()
                .ok_or_else(|| HandsetError::Validation("select a day first".into()))?,
        };
        cx.services.kv.delete(EVENTS_COLLECTION, &date)?;
        self.events.remove(&date);
        Ok(())
    }
}

impl Default for CalendarApplet {
    fn default() -> Self {
        Self::new()
    }
}

impl Applet for CalendarApplet {
    fn id(&self) -> AppId {
        AppId::Calendar
    }

    fn on_mount(&mut self, cx: &mut AppletContext<'_>) -> Result<()> {
        cx.request(FetchJob::Collection(EVENTS_COLLECTION.into()));
        let now = cx.platform.now()?;
        self.view = MonthView::new(now.year, now.month);
        self.today = Some(self.view.date_key(now.day));
        Ok(())
    }

    fn handle(&mut self, command: &str, args: &[&str], cx: &mut AppletContext<'_>) -> Result<()> {
        match command {
            "next" => self.view = self.view.next(),
            "prev" => self.view = self.view.prev(),
            "select" => self.select(&rest(args))?,
            "save" => self.save(&rest(args), cx)?,
            "delete" => self.delete(args.first().copied(), cx)?,
            "refresh" => cx.request(FetchJob::Collection(EVENTS_COLLECTION.into())),
            other => return Err(unknown_command(self.id(), other)),
        }
        Ok(())
    }

    fn on_fetched(&mut self, result: FetchResult, _cx: &mut AppletContext<'_>) -> Result<()> {
        match result {
            FetchResult::Collection { name, entries } if name == EVENTS_COLLECTION => {
                self.events = entries?;
            },
            _ => {},
        }
        Ok(())
    }

    fn view(&self) -> Vec<String> {
        let mut lines = vec![
            format!("<  {}  >", self.view.title()),
            "Sun Mon Tue Wed Thu Fri Sat".to_string(),
        ];
        for week in self.view.grid().chunks(7) {
            let row: Vec<String> = week
                .iter()
                .map(|cell| match cell {
                    Some(day) => {
                        let key = self.view.date_key(*day);
                        let mark = if self.selected.as_deref() == Some(key.as_str()) {
                            '*'
                        } else if self.today.as_deref() == Some(key.as_str()) {
                            '!'
                        } else if self.events.contains_key(&key) {
                            '+'
                        } else {
                            ' '
                        };
                        format!("{day:>2}{mark}")
                    },
                    None => "   ".to_string(),
                })
                .collect();
            lines.push(row.join(" "));
        }
        if let Some(date) = &self.selected {
            lines.push(format!("Add Event for {date}"));
        }
        lines.push("Calendar Events".into());
        if self.events.is_empty() {
            lines.push("No events saved".into());
        }
        lines.extend(self.events.iter().map(|(date, text)| format!("{date}  {text}")));
        lines
    }
}
