//! Line input. Shell controls start with `:`; any other line is a command
//! for the mounted applet.

use handset_core::error::{HandsetError, Result};
use handset_core::input::{InputEvent, Key};
use handset_core::registry::AppId;
use handset_core::shell::{GridGeometry, ShellAction};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Shell actions, applied in order.
    Actions(Vec<ShellAction>),
    /// A device event, mapped against the lock state when applied.
    Event(InputEvent),
    Help,
    /// Print the shell state.
    State,
    Quit,
    Nothing,
}

pub const HELP: &[&str] = &[
    "Shell controls:",
    "  :unlock  :lock  :home  :back  :edit  :tick  :state  :help  :quit",
    "  :open <app>          open an applet by name",
    "  :tap <slot>          tap a home grid slot",
    "  :move <from> <to>    move an icon (edit mode)",
    "  :drag <from> <to>    drag an icon with the pointer (edit mode)",
    "  :down|:to|:up <x> <y>, :cancel   raw pointer events",
    "  :key power|home|escape|enter",
    "Any other line is sent to the open applet, e.g. `press 1 + 2 =`.",
];

fn number<T: std::str::FromStr>(args: &[&str], index: usize, what: &str) -> Result<T> {
    let raw = args
        .get(index)
        .ok_or_else(|| HandsetError::Command(format!("missing {what}")))?;
    raw.parse()
        .map_err(|_| HandsetError::Command(format!("invalid {what}: {raw:?}")))
}

fn key(name: &str) -> Result<Key> {
    match name.to_ascii_lowercase().as_str() {
        "power" => Ok(Key::Power),
        "home" => Ok(Key::Home),
        "escape" | "esc" => Ok(Key::Escape),
        "enter" => Ok(Key::Enter),
        "space" => Ok(Key::Space),
        "up" => Ok(Key::Up),
        "down" => Ok(Key::Down),
        "left" => Ok(Key::Left),
        "right" => Ok(Key::Right),
        "backspace" => Ok(Key::Backspace),
        other => Err(HandsetError::Command(format!("unknown key {other:?}"))),
    }
}

/// Pointer press at the centre of `from`, slide to `to`, release.
/// Slots past the last icon land on the last one.
fn drag_gesture(geometry: GridGeometry, from: usize, to: usize) -> Vec<ShellAction> {
    let last = AppId::ALL.len() - 1;
    let centre = |slot: usize| {
        let (x, y) = geometry.cell_origin(slot.min(last));
        let half = |side: u32| i32::try_from(side / 2).unwrap_or(i32::MAX);
        (
            x.saturating_add(half(geometry.cell_w)),
            y.saturating_add(half(geometry.cell_h)),
        )
    };
    let (x0, y0) = centre(from);
    let (x1, y1) = centre(to);
    vec![
        ShellAction::PointerDown { x: x0, y: y0 },
        ShellAction::PointerMove { x: x1, y: y1 },
        ShellAction::PointerUp { x: x1, y: y1 },
    ]
}

fn pointer(args: &[&str]) -> Result<(i32, i32)> {
    Ok((number(args, 0, "x")?, number(args, 1, "y")?))
}

/// Parse one line of input.
pub fn parse_line(line: &str, geometry: GridGeometry) -> Result<Input> {
    let line = line.trim();
    let Some(control) = line.strip_prefix(':') else {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Input::Nothing);
        };
        return Ok(Input::Actions(vec![ShellAction::Command {
            verb: verb.to_string(),
            args: words.map(str::to_string).collect(),
        }]));
    };

    let mut words = control.split_whitespace();
    let verb = words.next().unwrap_or_default().to_ascii_lowercase();
    let args: Vec<&str> = words.collect();
    let one = |action| Ok(Input::Actions(vec![action]));
    match verb.as_str() {
        "unlock" => one(ShellAction::Unlock),
        "lock" => one(ShellAction::Lock),
        "home" => one(ShellAction::Home),
        "back" => one(ShellAction::Back),
        "edit" => one(ShellAction::ToggleEditMode),
        "tick" => one(ShellAction::Tick),
        "cancel" => one(ShellAction::PointerCancel),
        "open" => {
            let app: AppId = args.join(" ").parse()?;
            one(ShellAction::Open(app))
        },
        "tap" => one(ShellAction::Tap(number(&args, 0, "slot")?)),
        "move" => one(ShellAction::Reorder {
            from: number(&args, 0, "from slot")?,
            to: number(&args, 1, "to slot")?,
        }),
        "drag" => Ok(Input::Actions(drag_gesture(
            geometry,
            number(&args, 0, "from slot")?,
            number(&args, 1, "to slot")?,
        ))),
        "down" => {
            let (x, y) = pointer(&args)?;
            Ok(Input::Event(InputEvent::PointerDown { x, y }))
        },
        "to" => {
            let (x, y) = pointer(&args)?;
            Ok(Input::Event(InputEvent::PointerMove { x, y }))
        },
        "up" => {
            let (x, y) = pointer(&args)?;
            Ok(Input::Event(InputEvent::PointerUp { x, y }))
        },
        "key" => {
            let name = args
                .first()
                .ok_or_else(|| HandsetError::Command("missing key".into()))?;
            Ok(Input::Event(InputEvent::Key(key(name)?)))
        },
        "state" => Ok(Input::State),
        "help" | "?" => Ok(Input::Help),
        "quit" | "q" | "exit" => Ok(Input::Quit),
        other => Err(HandsetError::Command(format!("unknown control :{other}"))),
    }
}

/// Translate a device event into a shell action.
///
/// Power toggles the lock. On the lock screen Home and Enter unlock.
pub fn map_event(event: &InputEvent, locked: bool) -> Option<ShellAction> {
    match *event {
        InputEvent::PointerDown { x, y } => Some(ShellAction::PointerDown { x, y }),
        InputEvent::PointerMove { x, y } => Some(ShellAction::PointerMove { x, y }),
        InputEvent::PointerUp { x, y } => Some(ShellAction::PointerUp { x, y }),
        InputEvent::PointerCancel => Some(ShellAction::PointerCancel),
        InputEvent::Key(Key::Power) if locked => Some(ShellAction::Unlock),
        InputEvent::Key(Key::Power) => Some(ShellAction::Lock),
        InputEvent::Key(Key::Home | Key::Enter) if locked => Some(ShellAction::Unlock),
        InputEvent::Key(Key::Home) => Some(ShellAction::Home),
        InputEvent::Key(Key::Escape) => Some(ShellAction::Back),
        _ => None,
    }
}
