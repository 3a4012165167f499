//! Search index: every match of a literal pattern, kept per buffer.
//!
//! Matches are found line by line, non-overlapping, and stored in document
//! order (row-major, column ascending). `n`/`N` navigate the stored list;
//! the buffer recomputes it lazily after edits.

use crate::position::Position;
use crate::text::Text;

/// A literal search pattern and its matches in one buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchIndex {
    pattern: String,
    matches: Vec<Position>,
}

impl SearchIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Match start positions in document order.
    #[inline]
    #[must_use]
    pub fn matches(&self) -> &[Position] {
        &self.matches
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.pattern.is_empty()
    }

    /// Replace the pattern and recompute against `text`.
    pub fn set_pattern(&mut self, pattern: &str, text: &Text) {
        pattern.clone_into(&mut self.pattern);
        self.refresh(text);
    }

    /// Recompute every match of the current pattern.
    pub fn refresh(&mut self, text: &Text) {
        self.matches = find_all(text, &self.pattern);
    }

    /// The first match strictly after `pos`, wrapping to the first match.
    #[must_use]
    pub fn next_after(&self, pos: Position) -> Option<Position> {
        self.matches
            .iter()
            .copied()
            .find(|&m| m > pos)
            .or_else(|| self.matches.first().copied())
    }

    /// The last match strictly before `pos`, wrapping to the last match.
    #[must_use]
    pub fn prev_before(&self, pos: Position) -> Option<Position> {
        self.matches
            .iter()
            .rev()
            .copied()
            .find(|&m| m < pos)
            .or_else(|| self.matches.last().copied())
    }
}

/// Every non-overlapping occurrence of `pattern`, in document order.
#[must_use]
pub fn find_all(text: &Text, pattern: &str) -> Vec<Position> {
    if pattern.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    for line in 0..text.line_count() {
        let content = text.line_text(line);
        out.extend(
            find_in_line(&content, pattern)
                .into_iter()
                .map(|col| Position::new(line, col)),
        );
    }
    out
}

/// Char columns of the non-overlapping occurrences of `pattern` in `line`.
#[must_use]
pub fn find_in_line(line: &str, pattern: &str) -> Vec<usize> {
    if pattern.is_empty() {
        return Vec::new();
    }
    line.match_indices(pattern)
        .map(|(byte, _)| line[..byte].chars().count())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn text() -> Text {
        Text::from_lines(&["", "", "  foo", "", "", "foo foo", ""])
    }

    // -- find_all -----------------------------------------------------------

    #[test]
    fn matches_are_row_major() {
        assert_eq!(find_all(&text(), "foo"), vec![p(2, 2), p(5, 0), p(5, 4)]);
    }

    #[test]
    fn matches_do_not_overlap() {
        assert_eq!(find_in_line("aaaa", "aa"), vec![0, 2]);
    }

    #[test]
    fn columns_count_chars() {
        assert_eq!(find_in_line("é foo", "foo"), vec![2]);
    }

    #[test]
    fn empty_pattern_matches_nothing() {
        assert!(find_all(&text(), "").is_empty());
    }

    // -- navigation ---------------------------------------------------------

    #[test]
    fn next_walks_and_wraps() {
        let mut idx = SearchIndex::new();
        idx.set_pattern("foo", &text());

        let first = idx.next_after(p(0, 0));
        assert_eq!(first, Some(p(2, 2)));
        let second = idx.next_after(p(2, 2));
        assert_eq!(second, Some(p(5, 0)));
        assert_eq!(idx.next_after(p(5, 0)), Some(p(5, 4)));
        assert_eq!(idx.next_after(p(5, 4)), Some(p(2, 2)));
    }

    #[test]
    fn prev_walks_and_wraps() {
        let mut idx = SearchIndex::new();
        idx.set_pattern("foo", &text());
        assert_eq!(idx.prev_before(p(5, 4)), Some(p(5, 0)));
        assert_eq!(idx.prev_before(p(2, 2)), Some(p(5, 4)));
    }

    #[test]
    fn no_matches_navigates_nowhere() {
        let mut idx = SearchIndex::new();
        idx.set_pattern("zzz", &text());
        assert!(idx.is_active());
        assert_eq!(idx.next_after(p(0, 0)), None);
        assert_eq!(idx.prev_before(p(0, 0)), None);
    }

    #[test]
    fn refresh_follows_edits() {
        let mut idx = SearchIndex::new();
        let mut t = Text::from_lines(&["ab"]);
        idx.set_pattern("b", &t);
        assert_eq!(idx.matches(), &[p(0, 1)]);
        t.insert_char(0, 'b');
        idx.refresh(&t);
        assert_eq!(idx.matches(), &[p(0, 0), p(0, 2)]);
    }
}
