//! Vim-style modal editing.
//!
//! The editor is always in exactly one [`Mode`]. Modes are bit flags so a
//! motion-table entry can name every mode it applies in with one mask:
//!
//! | Mode        | Cursor limit         | Purpose                  |
//! |-------------|----------------------|--------------------------|
//! | Normal      | `0..line_len-1`      | Navigation, operators    |
//! | Insert      | `0..line_len`        | Typing text              |
//! | Visual      | `0..line_len-1`      | Char-wise selection      |
//! | VisualLine  | `0..line_len-1`      | Line-wise selection      |

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// The current editing mode, or a mask of modes in a motion table.
    ///
    /// The editor holds exactly one bit at a time; unions only appear as
    /// table masks.
    ///
    /// ```
    /// use jot_editor::mode::Mode;
    ///
    /// let mask = Mode::NORMAL | Mode::VISUAL;
    /// assert!(mask.contains(Mode::VISUAL));
    /// assert!(!mask.contains(Mode::INSERT));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mode: u8 {
        const NORMAL      = 1 << 0;
        const INSERT      = 1 << 1;
        const VISUAL      = 1 << 2;
        const VISUAL_LINE = 1 << 3;

        /// Both visual sub-modes.
        const ANY_VISUAL  = Self::VISUAL.bits() | Self::VISUAL_LINE.bits();
        /// Every mode that reads keys as commands.
        const COMMANDS    = Self::NORMAL.bits() | Self::ANY_VISUAL.bits();
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl Mode {
    /// Human-readable name for the status line.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        if self == Self::INSERT {
            "INSERT"
        } else if self == Self::VISUAL {
            "VISUAL"
        } else if self == Self::VISUAL_LINE {
            "VISUAL LINE"
        } else {
            "NORMAL"
        }
    }

    /// True if the cursor may sit one past the last char.
    #[inline]
    #[must_use]
    pub fn cursor_past_end(self) -> bool {
        self == Self::INSERT
    }

    #[inline]
    #[must_use]
    pub fn is_visual(self) -> bool {
        Self::ANY_VISUAL.contains(self) && !self.is_empty()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
