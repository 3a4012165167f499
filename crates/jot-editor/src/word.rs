//! Word motions.
//!
//! | Motion | Vim key | Description |
//! |--------|---------|-------------|
//! | [`word_forward`] | `w` | Forward to start of next word |
//! | [`word_backward`] | `b` | Backward to start of previous word |
//! | [`word_end_forward`] | `e` | Forward to end of current/next word |
//!
//! A **word** is a run of identifier characters (letters, digits,
//! underscore) or a run of other non-blank characters (punctuation), so
//! `hello.world` contains three words. An empty line is also a word: `w`
//! and `b` stop on it.

use crate::position::Position;
use crate::text::Text;

// ---------------------------------------------------------------------------
// Character classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    /// Letters, digits, underscore.
    Word,
    /// Non-blank, non-word characters (operators, brackets, etc.).
    Punctuation,
    /// Space, tab.
    Blank,
    Newline,
}

pub(crate) fn classify(ch: char) -> CharClass {
    if ch == '\n' {
        CharClass::Newline
    } else if ch.is_whitespace() {
        CharClass::Blank
    } else if ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// `w`: forward to the start of the next word.
///
/// Skip the run the cursor is on, then skip blanks and line breaks,
/// stopping on an empty line. With no next word the cursor lands past the
/// last char of the buffer, so `dw` on the final word still removes it.
#[must_use]
pub fn word_forward(text: &Text, pos: Position) -> Position {
    let rope = text.rope();
    let total = rope.len_chars();
    let mut idx = text.char_index(pos);
    if idx >= total {
        return pos;
    }

    let start_class = classify(rope.char(idx));
    if matches!(start_class, CharClass::Word | CharClass::Punctuation) {
        while idx < total && classify(rope.char(idx)) == start_class {
            idx += 1;
        }
    }

    while idx < total {
        match classify(rope.char(idx)) {
            CharClass::Word | CharClass::Punctuation => break,
            CharClass::Blank => idx += 1,
            CharClass::Newline => {
                idx += 1;
                if idx < total && classify(rope.char(idx)) == CharClass::Newline {
                    break;
                }
            }
        }
    }

    text.position_of(idx)
}

/// `b`: backward to the start of the previous word.
#[must_use]
pub fn word_backward(text: &Text, pos: Position) -> Position {
    let rope = text.rope();
    let start = text.char_index(pos);
    if start == 0 {
        return pos;
    }

    let mut idx = start - 1;
    loop {
        match classify(rope.char(idx)) {
            CharClass::Word | CharClass::Punctuation => break,
            CharClass::Newline => {
                // The separator ending an empty line: stop on that line.
                let line = rope.char_to_line(idx);
                if text.line_len(line) == 0 {
                    return Position::new(line, 0);
                }
                if idx == 0 {
                    return Position::ZERO;
                }
                idx -= 1;
            }
            CharClass::Blank => {
                if idx == 0 {
                    return Position::ZERO;
                }
                idx -= 1;
            }
        }
    }

    let class = classify(rope.char(idx));
    while idx > 0 && classify(rope.char(idx - 1)) == class {
        idx -= 1;
    }
    text.position_of(idx)
}

/// `e`: forward to the last char of the current or next word.
#[must_use]
pub fn word_end_forward(text: &Text, pos: Position) -> Position {
    let rope = text.rope();
    let total = rope.len_chars();
    let start = text.char_index(pos);
    let last = total.saturating_sub(1);
    if total == 0 || start >= last {
        return pos;
    }

    let mut idx = start + 1;
    while idx < total
        && !matches!(
            classify(rope.char(idx)),
            CharClass::Word | CharClass::Punctuation
        )
    {
        idx += 1;
    }
    if idx >= total {
        return pos;
    }

    let class = classify(rope.char(idx));
    while idx < last && classify(rope.char(idx + 1)) == class {
        idx += 1;
    }
    text.position_of(idx)
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

    fn t(s: &str) -> Text {
        Text::parse(s)
    }

    // -- Classification -----------------------------------------------------

    #[test]
    fn classify_chars() {
        assert_eq!(classify('a'), CharClass::Word);
        assert_eq!(classify('_'), CharClass::Word);
        assert_eq!(classify('é'), CharClass::Word);
        assert_eq!(classify('.'), CharClass::Punctuation);
        assert_eq!(classify('\t'), CharClass::Blank);
        assert_eq!(classify('\n'), CharClass::Newline);
    }

    // -- w ------------------------------------------------------------------

    #[test]
    fn w_simple_two_words() {
        assert_eq!(word_forward(&t("hello world"), p(0, 0)), p(0, 6));
    }

    #[test]
    fn w_from_middle_of_word() {
        assert_eq!(word_forward(&t("hello world"), p(0, 2)), p(0, 6));
    }

    #[test]
    fn w_punctuation_boundary() {
        let text = t("hello.world");
        assert_eq!(word_forward(&text, p(0, 0)), p(0, 5));
        assert_eq!(word_forward(&text, p(0, 5)), p(0, 6));
    }

    #[test]
    fn w_across_lines() {
        assert_eq!(word_forward(&t("hello\nworld"), p(0, 0)), p(1, 0));
    }

    #[test]
    fn w_blank_line_stop() {
        let text = t("hello\n\nworld");
        assert_eq!(word_forward(&text, p(0, 0)), p(1, 0));
        assert_eq!(word_forward(&text, p(1, 0)), p(2, 0));
    }

    #[test]
    fn w_last_word_goes_to_end_of_buffer() {
        assert_eq!(word_forward(&t("hello world"), p(0, 6)), p(0, 11));
    }

    #[test]
    fn w_empty_buffer() {
        assert_eq!(word_forward(&Text::new(), p(0, 0)), p(0, 0));
    }

    #[test]
    fn w_from_whitespace() {
        assert_eq!(word_forward(&t("  hello"), p(0, 0)), p(0, 2));
    }

    // -- b ------------------------------------------------------------------

    #[test]
    fn b_simple_two_words() {
        assert_eq!(word_backward(&t("hello world"), p(0, 6)), p(0, 0));
    }

    #[test]
    fn b_from_middle_of_word() {
        assert_eq!(word_backward(&t("hello world"), p(0, 8)), p(0, 6));
    }

    #[test]
    fn b_across_lines() {
        assert_eq!(word_backward(&t("hello\nworld"), p(1, 0)), p(0, 0));
    }

    #[test]
    fn b_stops_on_blank_line() {
        assert_eq!(word_backward(&t("hello\n\nworld"), p(2, 0)), p(1, 0));
    }

    #[test]
    fn b_at_start_stays() {
        assert_eq!(word_backward(&t("hello"), p(0, 0)), p(0, 0));
    }

    // -- e ------------------------------------------------------------------

    #[test]
    fn e_to_end_of_word() {
        let text = t("hello world");
        assert_eq!(word_end_forward(&text, p(0, 0)), p(0, 4));
        assert_eq!(word_end_forward(&text, p(0, 4)), p(0, 10));
    }

    #[test]
    fn e_skips_lines() {
        assert_eq!(word_end_forward(&t("ab\n\ncd"), p(0, 1)), p(2, 1));
    }

    #[test]
    fn e_at_end_stays() {
        assert_eq!(word_end_forward(&t("abc"), p(0, 2)), p(0, 2));
    }
}
