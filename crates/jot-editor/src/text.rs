//! Line storage: a rope of `\n`-separated lines.
//!
//! [`Text`] wraps a [`ropey::Rope`] and speaks in [`Position`]s. Line endings
//! are normalized to `\n` on the way in; the style found in the file is kept
//! in [`LineEnding`] and restored on the way out. A file's final line ending
//! is a terminator, not an extra empty line, so `"a\nb\n"` is two lines.
//!
//! The rope always holds at least one (possibly empty) line.

use std::fmt;

use ropey::Rope;

use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// Line ending detection
// ---------------------------------------------------------------------------

/// Line ending style of a file. New buffers use `Lf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r`
    Cr,
}

impl LineEnding {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// The style of the first line ending in `text`, `Lf` if there is none.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let bytes = text.as_bytes();
        for (i, &byte) in bytes.iter().enumerate() {
            match byte {
                b'\n' => return Self::Lf,
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => return Self::CrLf,
                b'\r' => return Self::Cr,
                _ => {}
            }
        }
        Self::Lf
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => f.write_str("LF"),
            Self::CrLf => f.write_str("CRLF"),
            Self::Cr => f.write_str("CR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// The lines of a buffer.
#[derive(Clone, Default)]
pub struct Text {
    rope: Rope,
    line_ending: LineEnding,
}

impl Text {
    /// One empty line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse file contents: detect the line ending, normalize every ending
    /// to `\n`, and drop a single trailing terminator.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let line_ending = LineEnding::detect(raw);
        let mut normalized = normalize_line_endings(raw);
        if normalized.ends_with('\n') {
            normalized.pop();
        }
        Self {
            rope: Rope::from_str(&normalized),
            line_ending,
        }
    }

    /// Build from already-split lines.
    #[must_use]
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let joined = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            rope: Rope::from_str(&joined),
            line_ending: LineEnding::Lf,
        }
    }

    /// Every line followed by the buffer's line ending, as written to disk.
    #[must_use]
    pub fn serialize(&self) -> String {
        let ending = self.line_ending.as_str();
        let mut out = String::with_capacity(self.rope.len_bytes() + self.line_count());
        for line in 0..self.line_count() {
            out.push_str(&self.line_text(line));
            out.push_str(ending);
        }
        out
    }

    /// The text with `\n` between lines and no trailing terminator. This is
    /// what the tokenizer snapshots.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    /// Cheap clone of the underlying rope.
    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    #[inline]
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    // -- Lines --------------------------------------------------------------

    /// Number of lines, never zero.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Total chars including the `\n` separators.
    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// True for a single empty line.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Chars on `line`, excluding the separator. Out-of-range lines are 0.
    #[must_use]
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.line_count() {
            return 0;
        }
        let slice = self.rope.line(line);
        let total = slice.len_chars();
        if total > 0 && slice.char(total - 1) == '\n' {
            total - 1
        } else {
            total
        }
    }

    /// The content of `line` without its separator.
    #[must_use]
    pub fn line_text(&self, line: usize) -> String {
        if line >= self.line_count() {
            return String::new();
        }
        let mut s = self.rope.line(line).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        s
    }

    /// All lines as owned strings.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count()).map(|l| self.line_text(l)).collect()
    }

    // -- Coordinates --------------------------------------------------------

    /// Clamp `pos` to an existing line and to `[0, line_len]`.
    #[must_use]
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.line_count() - 1);
        Position::new(line, pos.col.min(self.line_len(line)))
    }

    /// Absolute char index of `pos` after clamping.
    #[must_use]
    pub fn char_index(&self, pos: Position) -> usize {
        let pos = self.clamp(pos);
        self.rope.line_to_char(pos.line) + pos.col
    }

    /// Position of an absolute char index (clamped to the end of text).
    #[must_use]
    pub fn position_of(&self, idx: usize) -> Position {
        let idx = idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(idx);
        Position::new(line, idx - self.rope.line_to_char(line))
    }

    /// The text in `range` (clamped), separators included.
    #[must_use]
    pub fn slice(&self, range: Range) -> String {
        let start = self.char_index(range.start);
        let end = self.char_index(range.end);
        self.rope.slice(start..end).to_string()
    }

    // -- Primitive edits ----------------------------------------------------

    /// Insert one char at an absolute index.
    pub fn insert_char(&mut self, idx: usize, ch: char) {
        let idx = idx.min(self.rope.len_chars());
        if ch == '\r' {
            self.rope.insert_char(idx, '\n');
        } else {
            self.rope.insert_char(idx, ch);
        }
    }

    /// Remove and return the char at an absolute index.
    pub fn remove_char(&mut self, idx: usize) -> Option<char> {
        if idx >= self.rope.len_chars() {
            return None;
        }
        let ch = self.rope.char(idx);
        self.rope.remove(idx..=idx);
        Some(ch)
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Text")
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .field("line_ending", &self.line_ending)
            .finish()
    }
}

/// Convert `\r\n` and lone `\r` to `\n`.
fn normalize_line_endings(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            result.push('\n');
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
        } else {
            result.push(ch);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // -- LineEnding ---------------------------------------------------------

    #[test]
    fn detect_first_ending_wins() {
        assert_eq!(LineEnding::detect("a\nb\r\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\rb"), LineEnding::Cr);
        assert_eq!(LineEnding::detect("none"), LineEnding::Lf);
    }

    #[test]
    fn line_ending_display() {
        assert_eq!(LineEnding::CrLf.to_string(), "CRLF");
    }

    // -- Parsing ------------------------------------------------------------

    #[test]
    fn parse_drops_one_trailing_terminator() {
        let t = Text::parse("hello\nworld\n");
        assert_eq!(t.lines(), vec!["hello", "world"]);
        let t = Text::parse("a\n\n");
        assert_eq!(t.lines(), vec!["a", ""]);
    }

    #[test]
    fn parse_normalizes_crlf_and_remembers_it() {
        let t = Text::parse("one\r\ntwo\r\n");
        assert_eq!(t.lines(), vec!["one", "two"]);
        assert_eq!(t.line_ending(), LineEnding::CrLf);
        assert_eq!(t.serialize(), "one\r\ntwo\r\n");
    }

    #[test]
    fn empty_text_has_one_line() {
        let t = Text::parse("");
        assert_eq!(t.line_count(), 1);
        assert_eq!(t.line_len(0), 0);
        assert!(t.is_empty());
        assert_eq!(t.serialize(), "\n");
    }

    #[test]
    fn from_lines_joins() {
        let t = Text::from_lines(&["a", "bc", ""]);
        assert_eq!(t.line_count(), 3);
        assert_eq!(t.contents(), "a\nbc\n");
    }

    // -- Coordinates --------------------------------------------------------

    #[test]
    fn clamp_and_index_roundtrip() {
        let t = Text::from_lines(&["hello", "wo"]);
        assert_eq!(t.clamp(Position::new(9, 9)), Position::new(1, 2));
        assert_eq!(t.char_index(Position::new(1, 1)), 7);
        assert_eq!(t.position_of(7), Position::new(1, 1));
        assert_eq!(t.position_of(5), Position::new(0, 5));
        assert_eq!(t.position_of(100), Position::new(1, 2));
    }

    #[test]
    fn slice_spans_lines() {
        let t = Text::from_lines(&["first", "second", "third"]);
        let r = Range::new(Position::new(0, 3), Position::new(2, 2));
        assert_eq!(t.slice(r), "st\nsecond\nth");
    }

    #[test]
    fn unicode_columns_are_chars() {
        let t = Text::from_lines(&["café"]);
        assert_eq!(t.line_len(0), 4);
        let last = Range::new(Position::new(0, 3), Position::new(0, 4));
        assert_eq!(t.slice(last), "é");
    }

    // -- Primitive edits ----------------------------------------------------

    #[test]
    fn insert_and_remove_chars() {
        let mut t = Text::from_lines(&["ac"]);
        t.insert_char(1, 'b');
        assert_eq!(t.line_text(0), "abc");
        t.insert_char(3, '\n');
        assert_eq!(t.line_count(), 2);
        assert_eq!(t.remove_char(3), Some('\n'));
        assert_eq!(t.remove_char(10), None);
        assert_eq!(t.line_text(0), "abc");
    }
}
