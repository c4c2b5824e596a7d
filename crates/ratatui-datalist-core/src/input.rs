//! Backend-agnostic input model.
//!
//! Widgets in this crate consume [`InputEvent`] rather than terminal-specific events so they can
//! be driven from tests, recorded scripts, or any terminal backend. Enable the `crossterm`
//! feature for a ready-made conversion in [`crate::crossterm_input`].
use ratatui::layout::Rect;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyModifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
    };

    pub fn none() -> Self {
        Self::NONE
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Esc,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Paste(String),
    Mouse(MouseEvent),
}

impl InputEvent {
    /// Shorthand for an unmodified key press.
    pub fn key(code: KeyCode) -> Self {
        Self::Key(KeyEvent::new(code))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseEventKind {
    Down(MouseButton),
    Drag(MouseButton),
    Up(MouseButton),
    /// Pointer motion without a pressed button. Drives hover state.
    Moved,
    ScrollUp,
    ScrollDown,
}

/// A mouse event in absolute terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseEvent {
    pub x: u16,
    pub y: u16,
    pub kind: MouseEventKind,
    pub modifiers: KeyModifiers,
}

impl MouseEvent {
    pub fn new(x: u16, y: u16, kind: MouseEventKind) -> Self {
        Self {
            x,
            y,
            kind,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Returns the event position relative to `area`, or `None` when it falls outside.
    pub fn position_in(&self, area: Rect) -> Option<(u16, u16)> {
        if self.x < area.x
            || self.y < area.y
            || self.x >= area.x.saturating_add(area.width)
            || self.y >= area.y.saturating_add(area.height)
        {
            return None;
        }
        Some((self.x - area.x, self.y - area.y))
    }
}
