//! Platform-agnostic input events.
//!
//! Frontends map their native pointer/touch/keyboard input to these enums.
//! The shell never sees raw platform input.

/// A platform-agnostic input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Finger or mouse button went down at an absolute position.
    PointerDown { x: i32, y: i32 },
    /// Pointer moved while down.
    PointerMove { x: i32, y: i32 },
    /// Finger or mouse button lifted.
    PointerUp { x: i32, y: i32 },
    /// The platform aborted the gesture (pointer left the window, etc).
    PointerCancel,
    /// A hardware or on-screen key.
    Key(Key),
    /// Character typed.
    TextInput(char),
    /// User requested quit (window close, etc.).
    Quit,
}

/// Keys the shell reacts to directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    Space,
    Backspace,
    /// Side power button: locks the device.
    Power,
    /// Home button / home indicator.
    Home,
}

impl InputEvent {
    /// Pointer position carried by this event, if any.
    pub fn position(&self) -> Option<(i32, i32)> {
        match *self {
            Self::PointerDown { x, y } | Self::PointerMove { x, y } | Self::PointerUp { x, y } => {
                Some((x, y))
            },
            _ => None,
        }
    }
}
