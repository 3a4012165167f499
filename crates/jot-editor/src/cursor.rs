//! Cursor: position tracking with movement and selection.
//!
//! The `Cursor` tracks a position in a buffer, a sticky column for vertical
//! movement, and an optional selection anchor. Movement methods take a
//! `past_end` flag rather than a mode:
//!
//! - **Normal / visual**: `past_end = false` (cursor sits ON a character)
//! - **Insert**: `past_end = true` (cursor can sit after the last char)
//!
//! # Sticky column
//!
//! Moving vertically through a short line and back onto a long one returns
//! the cursor to the column it started at. Horizontal movement resets it.
//!
//! # Selection
//!
//! When `anchor` is set, the text between it and the cursor is selected.
//! Visual selections include the char under both ends; a line-wise
//! selection covers whole lines.

use crate::position::{Position, Range};
use crate::text::Text;
use crate::word;

/// A cursor in a text buffer.
///
/// Lightweight value type. Does not own the text; the text is passed to
/// movement methods as a parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    pos: Position,
    /// Remembered column for vertical movement.
    sticky_col: usize,
    anchor: Option<Position>,
    line_wise: bool,
}

impl Cursor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            sticky_col: 0,
            anchor: None,
            line_wise: false,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.pos.line
    }

    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    #[inline]
    #[must_use]
    pub const fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    #[inline]
    #[must_use]
    pub const fn has_selection(&self) -> bool {
        self.anchor.is_some()
    }

    /// True when the selection covers whole lines (`V`).
    #[inline]
    #[must_use]
    pub const fn is_line_wise(&self) -> bool {
        self.line_wise
    }

    /// The selected span of `text`, if any.
    ///
    /// Char-wise selections include the char under the far end (stepping
    /// onto the line break of an empty line). Line-wise selections run
    /// from the start of the first line to the end of the last.
    #[must_use]
    pub fn selection(&self, text: &Text) -> Option<Range> {
        let anchor = self.anchor?;
        let Range { start, end } = Range::ordered(anchor, self.pos);
        if self.line_wise {
            let last = end.line.min(text.line_count() - 1);
            return Some(Range::new(
                Position::new(start.line, 0),
                Position::new(last, text.line_len(last)),
            ));
        }
        let end = text.position_of(text.char_index(end) + 1);
        Some(Range::new(text.clamp(start), end))
    }

    // -- Selection control --------------------------------------------------

    /// Start a selection at the cursor.
    pub const fn set_anchor(&mut self, line_wise: bool) {
        self.anchor = Some(self.pos);
        self.line_wise = line_wise;
    }

    pub const fn clear_anchor(&mut self) {
        self.anchor = None;
        self.line_wise = false;
    }

    // -- Direct positioning -------------------------------------------------

    /// Move to an exact position, clamped. Resets the sticky column and
    /// leaves the anchor alone.
    pub fn set_position(&mut self, pos: Position, text: &Text, past_end: bool) {
        self.pos = clamp(pos, text, past_end);
        self.sticky_col = self.pos.col;
    }

    // -- Horizontal movement ------------------------------------------------

    /// Move left by `count` chars, stopping at column 0.
    pub fn move_left(&mut self, count: usize, text: &Text, past_end: bool) {
        let col = self.pos.col.min(max_col_for_line(text, self.pos.line, past_end));
        self.pos.col = col.saturating_sub(count);
        self.sticky_col = self.pos.col;
    }

    /// Move right by `count` chars, stopping at the column limit.
    pub fn move_right(&mut self, count: usize, text: &Text, past_end: bool) {
        let max_col = max_col_for_line(text, self.pos.line, past_end);
        self.pos.col = (self.pos.col + count).min(max_col);
        self.sticky_col = self.pos.col;
    }

    /// `0`
    pub const fn move_to_line_start(&mut self) {
        self.pos.col = 0;
        self.sticky_col = 0;
    }

    /// `^`: first non-blank char of the line.
    pub fn move_to_first_non_blank(&mut self, text: &Text, past_end: bool) {
        let col = text
            .line_text(self.pos.line)
            .chars()
            .take_while(|ch| ch.is_whitespace())
            .count();
        self.pos.col = col.min(max_col_for_line(text, self.pos.line, past_end));
        self.sticky_col = self.pos.col;
    }

    /// `$`
    pub fn move_to_line_end(&mut self, text: &Text, past_end: bool) {
        self.pos.col = max_col_for_line(text, self.pos.line, past_end);
        self.sticky_col = usize::MAX;
    }

    // -- Vertical movement --------------------------------------------------

    pub fn move_up(&mut self, count: usize, text: &Text, past_end: bool) {
        self.pos.line = self.pos.line.saturating_sub(count);
        self.pos.col = self.sticky_col.min(max_col_for_line(text, self.pos.line, past_end));
    }

    pub fn move_down(&mut self, count: usize, text: &Text, past_end: bool) {
        let last_line = text.line_count() - 1;
        self.pos.line = self.pos.line.saturating_add(count).min(last_line);
        self.pos.col = self.sticky_col.min(max_col_for_line(text, self.pos.line, past_end));
    }

    /// `gg`
    pub fn move_to_first_line(&mut self, text: &Text, past_end: bool) {
        self.pos.line = 0;
        self.pos.col = self.sticky_col.min(max_col_for_line(text, 0, past_end));
    }

    /// `G`
    pub fn move_to_last_line(&mut self, text: &Text, past_end: bool) {
        let last_line = text.line_count() - 1;
        self.pos.line = last_line;
        self.pos.col = self.sticky_col.min(max_col_for_line(text, last_line, past_end));
    }

    // -- Word motions -------------------------------------------------------

    /// `w`. The column is left unclamped so an operator can reach the end
    /// of the buffer; callers clamp when the motion stands alone.
    pub fn word_forward(&mut self, text: &Text) {
        self.pos = word::word_forward(text, self.pos);
        self.sticky_col = self.pos.col;
    }

    /// `b`
    pub fn word_backward(&mut self, text: &Text) {
        self.pos = word::word_backward(text, self.pos);
        self.sticky_col = self.pos.col;
    }

    /// `e`
    pub fn word_end_forward(&mut self, text: &Text) {
        self.pos = word::word_end_forward(text, self.pos);
        self.sticky_col = self.pos.col;
    }

    // -- Character find motions ---------------------------------------------

    /// `f{ch}`. Returns `true` if the cursor moved.
    pub fn char_find_forward(&mut self, text: &Text, ch: char) -> bool {
        match find_on_line_forward(text, self.pos, ch) {
            Some(col) => self.set_col(col),
            None => false,
        }
    }

    /// `t{ch}`: one before the found char.
    pub fn char_till_forward(&mut self, text: &Text, ch: char) -> bool {
        match find_on_line_forward(text, self.pos, ch) {
            Some(col) if col - 1 > self.pos.col => self.set_col(col - 1),
            _ => false,
        }
    }

    /// `F{ch}`
    pub fn char_find_backward(&mut self, text: &Text, ch: char) -> bool {
        match find_on_line_backward(text, self.pos, ch) {
            Some(col) => self.set_col(col),
            None => false,
        }
    }

    /// `T{ch}`: one after the found char.
    pub fn char_till_backward(&mut self, text: &Text, ch: char) -> bool {
        match find_on_line_backward(text, self.pos, ch) {
            Some(col) if col + 1 < self.pos.col => self.set_col(col + 1),
            _ => false,
        }
    }

    const fn set_col(&mut self, col: usize) -> bool {
        self.pos.col = col;
        self.sticky_col = col;
        true
    }

    // -- Clamping -----------------------------------------------------------

    /// Pull the cursor and anchor back inside `text` after an edit.
    pub fn clamp(&mut self, text: &Text, past_end: bool) {
        self.pos = clamp(self.pos, text, past_end);
        if let Some(anchor) = &mut self.anchor {
            *anchor = clamp(*anchor, text, true);
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Maximum column for `line`: the last char, or one past it when
/// `past_end` is set. Empty lines allow only column 0.
pub(crate) fn max_col_for_line(text: &Text, line: usize, past_end: bool) -> usize {
    let len = text.line_len(line);
    if past_end { len } else { len.saturating_sub(1) }
}

fn clamp(pos: Position, text: &Text, past_end: bool) -> Position {
    let line = pos.line.min(text.line_count() - 1);
    Position::new(line, pos.col.min(max_col_for_line(text, line, past_end)))
}

/// Column of the next `ch` after `from` on its line.
fn find_on_line_forward(text: &Text, from: Position, ch: char) -> Option<usize> {
    text.line_text(from.line)
        .chars()
        .enumerate()
        .skip(from.col + 1)
        .find(|&(_, c)| c == ch)
        .map(|(col, _)| col)
}

/// Column of the previous `ch` before `from` on its line.
fn find_on_line_backward(text: &Text, from: Position, ch: char) -> Option<usize> {
    let line: Vec<char> = text.line_text(from.line).chars().collect();
    let end = from.col.min(line.len());
    line[..end].iter().rposition(|&c| c == ch)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn at(text: &Text, pos: Position) -> Cursor {
        let mut c = Cursor::new();
        c.set_position(pos, text, true);
        c
    }

    // -- Horizontal ---------------------------------------------------------

    #[test]
    fn move_right_stops_at_last_char_in_normal() {
        let text = Text::from_lines(&["abc"]);
        let mut c = at(&text, p(0, 0));
        c.move_right(10, &text, false);
        assert_eq!(c.position(), p(0, 2));
        c.move_right(10, &text, true);
        assert_eq!(c.position(), p(0, 3));
    }

    #[test]
    fn move_left_stops_at_zero() {
        let text = Text::from_lines(&["abc"]);
        let mut c = at(&text, p(0, 1));
        c.move_left(5, &text, false);
        assert_eq!(c.position(), p(0, 0));
    }

    #[test]
    fn first_non_blank_and_line_end() {
        let text = Text::from_lines(&["   foo"]);
        let mut c = at(&text, p(0, 5));
        c.move_to_first_non_blank(&text, false);
        assert_eq!(c.col(), 3);
        c.move_to_line_end(&text, false);
        assert_eq!(c.col(), 5);
        c.move_to_line_start();
        assert_eq!(c.col(), 0);
    }

    // -- Vertical -----------------------------------------------------------

    #[test]
    fn sticky_column_survives_short_line() {
        let text = Text::from_lines(&["long line", "ab", "long line"]);
        let mut c = at(&text, p(0, 7));
        c.move_down(1, &text, false);
        assert_eq!(c.position(), p(1, 1));
        c.move_down(1, &text, false);
        assert_eq!(c.position(), p(2, 7));
    }

    #[test]
    fn vertical_moves_stay_inside() {
        let text = Text::from_lines(&["a", "b"]);
        let mut c = at(&text, p(1, 0));
        c.move_down(usize::MAX, &text, false);
        assert_eq!(c.line(), 1);
        c.move_up(99, &text, false);
        assert_eq!(c.line(), 0);
        c.move_to_last_line(&text, false);
        assert_eq!(c.line(), 1);
        c.move_to_first_line(&text, false);
        assert_eq!(c.line(), 0);
    }

    #[test]
    fn dollar_then_down_tracks_line_end() {
        let text = Text::from_lines(&["ab", "abcdef"]);
        let mut c = at(&text, p(0, 0));
        c.move_to_line_end(&text, false);
        c.move_down(1, &text, false);
        assert_eq!(c.position(), p(1, 5));
    }

    // -- Find ---------------------------------------------------------------

    #[test]
    fn find_char_forward_and_till() {
        let text = Text::from_lines(&["a,b,c"]);
        let mut c = at(&text, p(0, 0));
        assert!(c.char_find_forward(&text, ','));
        assert_eq!(c.col(), 1);
        assert!(c.char_till_forward(&text, 'c'));
        assert_eq!(c.col(), 3);
        assert!(!c.char_till_forward(&text, 'c'));
        assert!(!c.char_find_forward(&text, 'z'));
    }

    #[test]
    fn find_char_backward_and_till() {
        let text = Text::from_lines(&["a,b,c"]);
        let mut c = at(&text, p(0, 4));
        assert!(c.char_find_backward(&text, ','));
        assert_eq!(c.col(), 3);
        assert!(c.char_till_backward(&text, 'a'));
        assert_eq!(c.col(), 1);
    }

    // -- Selection ----------------------------------------------------------

    #[test]
    fn char_selection_includes_both_ends() {
        let text = Text::from_lines(&["hello world"]);
        let mut c = at(&text, p(0, 6));
        c.set_anchor(false);
        c.set_position(p(0, 2), &text, false);
        assert_eq!(c.selection(&text), Some(Range::new(p(0, 2), p(0, 7))));
    }

    #[test]
    fn line_selection_covers_whole_lines() {
        let text = Text::from_lines(&["one", "two", "three"]);
        let mut c = at(&text, p(2, 3));
        c.set_anchor(true);
        c.set_position(p(1, 1), &text, false);
        assert_eq!(c.selection(&text), Some(Range::new(p(1, 0), p(2, 5))));
        c.clear_anchor();
        assert_eq!(c.selection(&text), None);
        assert!(!c.is_line_wise());
    }
}
