//! Raw key presses delivered to [`Editor::on_pressed`](crate::editor::Editor::on_pressed).
//!
//! Printable text arrives separately through `on_typed`; a [`Key`] carries
//! the named keys and modifier chords that never produce text.

use bitflags::bitflags;

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key, only meaningful with modifiers (`Ctrl+S`).
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Backspace,
    Escape,
    Delete,
    Tab,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
}

bitflags! {
    /// Keyboard modifier flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl Key {
    /// An unmodified key.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// `Ctrl+<ch>`. Letters are stored lowercase.
    #[inline]
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self {
            code: KeyCode::Char(ch.to_ascii_lowercase()),
            modifiers: Modifiers::CTRL,
        }
    }

    /// `Ctrl+Shift+<ch>`.
    #[inline]
    #[must_use]
    pub const fn ctrl_shift(ch: char) -> Self {
        Self {
            code: KeyCode::Char(ch.to_ascii_lowercase()),
            modifiers: Modifiers::CTRL.union(Modifiers::SHIFT),
        }
    }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        Self::plain(code)
    }
}
