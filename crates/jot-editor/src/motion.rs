//! Table-driven command matching for Normal and Visual modes.
//!
//! Typed keys accumulate in the editor's pending command. After each key,
//! [`dispatch`] scans the command from the left: at each offset it walks
//! [`BINDINGS`] in declaration order and runs the first entry whose mode
//! mask includes the current mode and whose keys start the command there.
//! Multi-key entries (`dd`, `gg`, `yy`) are therefore declared before any
//! entry that is a prefix of them.
//!
//! An entry either completes at once or waits for an argument:
//!
//! - [`Arg::Char`]: `f t F T` need one more character.
//! - [`Arg::Motion`]: `d` and `y` need a motion to give them a range.
//!
//! While waiting, the command stays pending. [`retain_viable`] trims it back
//! to the longest tail that some entry could still complete, so stray keys
//! never block later commands.
//!
//! # Operator ranges
//!
//! | Motions            | Range      |
//! |--------------------|------------|
//! | `h l w b 0 ^ n N`  | exclusive  |
//! | `e $ f t F T`      | inclusive  |
//! | `j k gg G`         | line-wise  |

use tracing::debug;

use crate::buffer::{Buffer, FindChar, PromptKind, WordMotion};
use crate::clipboard::Clip;
use crate::editor::Editor;
use crate::error::CommandError;
use crate::mode::Mode;
use crate::position::{Position, Range};

/// Result of running a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Flush the pending command.
    Done,
    /// Keep buffering keys.
    Pending,
}

/// What an entry needs after its keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    None,
    Char,
    Motion,
}

/// How an operator treats the span a motion covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Exclusive,
    Inclusive,
    Linewise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Motions
    Left,
    Down,
    Up,
    Right,
    WordForward,
    WordBackward,
    WordEnd,
    LineStart,
    FirstNonBlank,
    LineEnd,
    Top,
    Bottom,
    FindForward,
    TillForward,
    FindBackward,
    TillBackward,
    SearchNext,
    SearchPrev,
    // Entering Insert
    Insert,
    Append,
    AppendEnd,
    InsertStart,
    OpenBelow,
    OpenAbove,
    // Visual
    Visual,
    VisualLine,
    DeleteSelection,
    YankSelection,
    // Editing
    DeleteChar,
    DeleteToEnd,
    DeleteLine,
    Delete,
    YankLine,
    Yank,
    PasteAfter,
    PasteBefore,
    Undo,
    // Prompts
    CommandPrompt,
    SearchPrompt,
}

impl Action {
    /// The operator span for motions; `None` for every other action.
    #[must_use]
    pub const fn span(self) -> Option<Span> {
        match self {
            Self::Left
            | Self::Right
            | Self::WordForward
            | Self::WordBackward
            | Self::LineStart
            | Self::FirstNonBlank
            | Self::SearchNext
            | Self::SearchPrev => Some(Span::Exclusive),
            Self::WordEnd
            | Self::LineEnd
            | Self::FindForward
            | Self::TillForward
            | Self::FindBackward
            | Self::TillBackward => Some(Span::Inclusive),
            Self::Down | Self::Up | Self::Top | Self::Bottom => Some(Span::Linewise),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_motion(self) -> bool {
        self.span().is_some()
    }
}

/// One row of the motion table.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub keys: &'static str,
    pub modes: Mode,
    pub arg: Arg,
    pub action: Action,
}

const fn bind(keys: &'static str, modes: Mode, arg: Arg, action: Action) -> Binding {
    Binding {
        keys,
        modes,
        arg,
        action,
    }
}

const N: Mode = Mode::NORMAL;
const V: Mode = Mode::ANY_VISUAL;
const NV: Mode = Mode::COMMANDS;

/// The motion table, in match priority order.
pub const BINDINGS: &[Binding] = &[
    bind("dd", N, Arg::None, Action::DeleteLine),
    bind("yy", N, Arg::None, Action::YankLine),
    bind("gg", NV, Arg::None, Action::Top),
    bind("h", NV, Arg::None, Action::Left),
    bind("j", NV, Arg::None, Action::Down),
    bind("k", NV, Arg::None, Action::Up),
    bind("l", NV, Arg::None, Action::Right),
    bind("w", NV, Arg::None, Action::WordForward),
    bind("b", NV, Arg::None, Action::WordBackward),
    bind("e", NV, Arg::None, Action::WordEnd),
    bind("0", NV, Arg::None, Action::LineStart),
    bind("^", NV, Arg::None, Action::FirstNonBlank),
    bind("$", NV, Arg::None, Action::LineEnd),
    bind("G", NV, Arg::None, Action::Bottom),
    bind("f", NV, Arg::Char, Action::FindForward),
    bind("t", NV, Arg::Char, Action::TillForward),
    bind("F", NV, Arg::Char, Action::FindBackward),
    bind("T", NV, Arg::Char, Action::TillBackward),
    bind("n", NV, Arg::None, Action::SearchNext),
    bind("N", NV, Arg::None, Action::SearchPrev),
    bind("i", N, Arg::None, Action::Insert),
    bind("a", N, Arg::None, Action::Append),
    bind("A", N, Arg::None, Action::AppendEnd),
    bind("I", N, Arg::None, Action::InsertStart),
    bind("o", N, Arg::None, Action::OpenBelow),
    bind("O", N, Arg::None, Action::OpenAbove),
    bind("v", N, Arg::None, Action::Visual),
    bind("V", N, Arg::None, Action::VisualLine),
    bind("d", V, Arg::None, Action::DeleteSelection),
    bind("x", V, Arg::None, Action::DeleteSelection),
    bind("y", V, Arg::None, Action::YankSelection),
    bind("x", N, Arg::None, Action::DeleteChar),
    bind("D", N, Arg::None, Action::DeleteToEnd),
    bind("d", N, Arg::Motion, Action::Delete),
    bind("y", N, Arg::Motion, Action::Yank),
    bind("p", N, Arg::None, Action::PasteAfter),
    bind("P", N, Arg::None, Action::PasteBefore),
    bind("u", N, Arg::None, Action::Undo),
    bind(":", NV, Arg::None, Action::CommandPrompt),
    bind("/", NV, Arg::None, Action::SearchPrompt),
];

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Leftmost offset, first table match.
fn find_binding(command: &str, mode: Mode) -> Option<(&'static Binding, &str)> {
    command.char_indices().find_map(|(i, _)| {
        let tail = &command[i..];
        BINDINGS
            .iter()
            .find(|b| b.modes.contains(mode) && tail.starts_with(b.keys))
            .map(|b| (b, &tail[b.keys.len()..]))
    })
}

/// The first motion whose keys start `command`, with what follows them.
fn find_motion(command: &str) -> Option<(&'static Binding, &str)> {
    BINDINGS
        .iter()
        .find(|b| b.action.is_motion() && b.modes.contains(Mode::NORMAL) && command.starts_with(b.keys))
        .map(|b| (b, &command[b.keys.len()..]))
}

/// True if more keys could still turn `command` into a motion.
fn motion_viable(command: &str) -> bool {
    BINDINGS
        .iter()
        .any(|b| b.action.is_motion() && b.modes.contains(Mode::NORMAL) && b.keys.starts_with(command))
}

/// True if some entry could still complete `command`.
#[must_use]
pub fn is_viable(command: &str, mode: Mode) -> bool {
    BINDINGS.iter().filter(|b| b.modes.contains(mode)).any(|b| {
        if b.keys.starts_with(command) {
            return true;
        }
        let Some(rest) = command.strip_prefix(b.keys) else {
            return false;
        };
        b.arg == Arg::Motion && motion_viable(rest)
    })
}

/// Drop leading keys until what is left could still complete, or clear
/// the command if nothing could.
pub fn retain_viable(command: &mut String, mode: Mode) {
    let keep = command
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| is_viable(&command[i..], mode));
    match keep {
        Some(0) => {}
        Some(i) => {
            debug!(dropped = &command[..i], "pending command trimmed");
            command.drain(..i);
        }
        None => {
            debug!(%command, "pending command flushed");
            command.clear();
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run the command in `command` against `editor`.
pub fn dispatch(editor: &mut Editor, command: &str) -> Outcome {
    let mode = editor.mode();
    let Some((binding, rest)) = find_binding(command, mode) else {
        return Outcome::Pending;
    };
    debug!(keys = binding.keys, %mode, "dispatch");
    match binding.arg {
        Arg::None => {
            perform(editor, binding.action, None);
            Outcome::Done
        }
        Arg::Char => match rest.chars().next() {
            Some(ch) => {
                perform(editor, binding.action, Some(ch));
                Outcome::Done
            }
            None => Outcome::Pending,
        },
        Arg::Motion => operate(editor, binding.action, rest),
    }
}

/// Move the cursor for a motion. Returns `false` when the motion failed
/// (no match for `f`, no line to move to for `j`).
fn apply_motion(buffer: &mut Buffer, action: Action, arg: Option<char>, past_end: bool) -> bool {
    let line = buffer.cursor().line;
    match action {
        Action::Left => buffer.move_x(-1, past_end),
        Action::Right => buffer.move_x(1, past_end),
        Action::Down => {
            buffer.move_y(1, past_end);
            return buffer.cursor().line != line;
        }
        Action::Up => {
            buffer.move_y(-1, past_end);
            return buffer.cursor().line != line;
        }
        Action::WordForward => buffer.word_move(WordMotion::Forward),
        Action::WordBackward => buffer.word_move(WordMotion::Backward),
        Action::WordEnd => buffer.word_move(WordMotion::End),
        Action::LineStart => buffer.goto_line_start(),
        Action::FirstNonBlank => buffer.goto_first_non_blank(past_end),
        Action::LineEnd => buffer.goto_line_end(past_end),
        Action::Top => buffer.goto_top(past_end),
        Action::Bottom => buffer.goto_bottom(past_end),
        Action::FindForward => return find(buffer, FindChar::Forward, arg),
        Action::TillForward => return find(buffer, FindChar::TillForward, arg),
        Action::FindBackward => return find(buffer, FindChar::Backward, arg),
        Action::TillBackward => return find(buffer, FindChar::TillBackward, arg),
        Action::SearchNext => return buffer.goto_next_search(),
        Action::SearchPrev => return buffer.goto_prev_search(),
        _ => return false,
    }
    true
}

fn find(buffer: &mut Buffer, kind: FindChar, arg: Option<char>) -> bool {
    arg.is_some_and(|ch| buffer.find_char(kind, ch))
}

fn perform(editor: &mut Editor, action: Action, arg: Option<char>) {
    if action.is_motion() {
        let buffer = editor.buffer_mut();
        let moved = apply_motion(buffer, action, arg, false);
        buffer.clamp_cursor(false);
        let pattern = buffer.search().pattern().to_string();
        if !moved && matches!(action, Action::SearchNext | Action::SearchPrev) && !pattern.is_empty() {
            editor.notify_error(CommandError::PatternNotFound(pattern));
        }
        return;
    }

    match action {
        Action::Insert => editor.set_mode(Mode::INSERT),
        Action::Append => {
            editor.set_mode(Mode::INSERT);
            let buffer = editor.buffer_mut();
            if buffer.text().line_len(buffer.cursor().line) > 0 {
                buffer.move_x(1, true);
            }
        }
        Action::AppendEnd => {
            editor.set_mode(Mode::INSERT);
            editor.buffer_mut().goto_line_end(true);
        }
        Action::InsertStart => {
            editor.set_mode(Mode::INSERT);
            editor.buffer_mut().goto_first_non_blank(true);
        }
        Action::OpenBelow | Action::OpenAbove => {
            editor.set_mode(Mode::INSERT);
            editor.buffer_mut().open_line(action == Action::OpenAbove);
        }
        Action::Visual => editor.set_mode(Mode::VISUAL),
        Action::VisualLine => editor.set_mode(Mode::VISUAL_LINE),
        Action::DeleteSelection => {
            if let Some(clip) = editor.buffer_mut().delete_selection() {
                editor.yank(clip, None);
            }
            editor.set_mode(Mode::NORMAL);
        }
        Action::YankSelection => {
            if let Some((clip, range)) = editor.buffer().copy_selection() {
                editor.buffer_mut().goto(range.start, false);
                editor.yank(clip, Some(range));
            }
            editor.set_mode(Mode::NORMAL);
        }
        Action::DeleteChar => {
            let buffer = editor.buffer_mut();
            buffer.break_edit();
            if buffer.text().line_len(buffer.cursor().line) > 0 {
                buffer.delete_forward();
            }
            buffer.clamp_cursor(false);
        }
        Action::DeleteToEnd => {
            let buffer = editor.buffer_mut();
            buffer.break_edit();
            let start = buffer.cursor();
            let end = Position::new(start.line, buffer.text().line_len(start.line));
            let removed = buffer.delete_range(Range::new(start, end));
            buffer.clamp_cursor(false);
            if !removed.is_empty() {
                editor.yank(Clip::chars(removed), None);
            }
        }
        Action::DeleteLine => {
            let buffer = editor.buffer_mut();
            if buffer.is_read_only() {
                return;
            }
            buffer.break_edit();
            let line = buffer.cursor().line;
            let removed = buffer.delete_lines(line, line);
            buffer.break_edit();
            editor.yank(Clip::lines(removed), None);
        }
        Action::YankLine => {
            let buffer = editor.buffer();
            let line = buffer.cursor().line;
            let clip = buffer.copy_lines(line, line);
            let range = Range::new(
                Position::new(line, 0),
                Position::new(line, buffer.text().line_len(line)),
            );
            editor.yank(clip, Some(range));
        }
        Action::PasteAfter => editor.paste(false),
        Action::PasteBefore => editor.paste(true),
        Action::Undo => editor.undo(),
        Action::CommandPrompt => editor.open_prompt(PromptKind::Command),
        Action::SearchPrompt => editor.open_prompt(PromptKind::Search),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// What an operator acts on once its motion has resolved.
enum Target {
    Chars(Range),
    Lines(usize, usize),
}

/// `d<motion>` / `y<motion>`.
fn operate(editor: &mut Editor, operator: Action, rest: &str) -> Outcome {
    if rest.is_empty() {
        return Outcome::Pending;
    }
    let Some((motion, after)) = find_motion(rest) else {
        return if motion_viable(rest) {
            Outcome::Pending
        } else {
            Outcome::Done
        };
    };
    let arg = match motion.arg {
        Arg::Char => match after.chars().next() {
            Some(ch) => Some(ch),
            None => return Outcome::Pending,
        },
        _ => None,
    };
    let Some(span) = motion.action.span() else {
        return Outcome::Done;
    };

    let buffer = editor.buffer_mut();
    let start = buffer.cursor();
    let moved = apply_motion(buffer, motion.action, arg, true);
    let end = buffer.cursor();
    buffer.goto(start, true);
    debug!(keys = motion.keys, ?span, ?start, ?end, moved, "operator motion");

    let Some(target) = resolve(buffer, motion.action, span, start, end, moved) else {
        buffer.clamp_cursor(false);
        return Outcome::Done;
    };

    match operator {
        Action::Delete => {
            let buffer = editor.buffer_mut();
            if buffer.is_read_only() {
                return Outcome::Done;
            }
            buffer.break_edit();
            let clip = match target {
                Target::Chars(range) => Clip::chars(buffer.delete_range(range)),
                Target::Lines(first, last) => Clip::lines(buffer.delete_lines(first, last)),
            };
            buffer.break_edit();
            buffer.clamp_cursor(false);
            editor.yank(clip, None);
        }
        Action::Yank => {
            let buffer = editor.buffer_mut();
            let (clip, range) = match target {
                Target::Chars(range) => (Clip::chars(buffer.text().slice(range)), range),
                Target::Lines(first, last) => (
                    buffer.copy_lines(first, last),
                    Range::new(
                        Position::new(first, 0),
                        Position::new(last, buffer.text().line_len(last)),
                    ),
                ),
            };
            buffer.goto(start.min(end), false);
            editor.yank(clip, Some(range));
        }
        _ => {}
    }
    Outcome::Done
}

/// Turn a motion from `start` to `end` into the text an operator covers.
/// `None` means there is nothing to act on.
fn resolve(
    buffer: &Buffer,
    motion: Action,
    span: Span,
    start: Position,
    end: Position,
    moved: bool,
) -> Option<Target> {
    if !moved {
        return None;
    }
    let text = buffer.text();
    let (from, to) = if start <= end { (start, end) } else { (end, start) };
    match span {
        Span::Linewise => Some(Target::Lines(from.line, to.line)),
        Span::Inclusive => {
            let to = Position::new(to.line, (to.col + 1).min(text.line_len(to.line)));
            let range = Range::new(from, to);
            (!range.is_empty()).then_some(Target::Chars(range))
        }
        Span::Exclusive => {
            if from == to {
                return None;
            }
            let mut to = to;
            // `w` over the last word of a line stops at that line's end.
            if motion == Action::WordForward && to.line > from.line {
                let len = text.line_len(from.line);
                if from.col < len {
                    to = Position::new(from.line, len);
                }
            } else if to.line > from.line && to.col == 0 {
                to = Position::new(to.line - 1, text.line_len(to.line - 1));
            }
            let range = Range::new(from, to);
            (!range.is_empty()).then_some(Target::Chars(range))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::ClipKind;
    use crate::config::{ClipboardBackend, Config};
    use crate::key::{Key, KeyCode};
    use pretty_assertions::assert_eq;

    fn editor(lines: &[&str]) -> Editor {
        let config = Config {
            clipboard: ClipboardBackend::Memory,
            ..Config::default()
        };
        let mut ed = Editor::new(config);
        let scratch = ed.buffer_id();
        ed.open_lines(lines);
        ed.close(scratch);
        ed
    }

    fn typed(ed: &mut Editor, keys: &str) {
        for ch in keys.chars() {
            ed.on_typed(ch);
        }
    }

    fn at(ed: &mut Editor, line: usize, col: usize) {
        ed.buffer_mut().goto(Position::new(line, col), false);
    }

    fn pos(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    // -- Table --------------------------------------------------------------

    #[test]
    fn longer_keys_precede_their_prefixes() {
        for (i, short) in BINDINGS.iter().enumerate() {
            for long in &BINDINGS[i + 1..] {
                let overlap = short.modes.intersects(long.modes);
                assert!(
                    !(overlap && long.keys.len() > short.keys.len() && long.keys.starts_with(short.keys)),
                    "{:?} shadows {:?}",
                    short.keys,
                    long.keys
                );
            }
        }
    }

    #[test]
    fn leftmost_first_match() {
        let (b, rest) = find_binding("dd", Mode::NORMAL).map(|(b, r)| (b.action, r)).unwrap();
        assert_eq!((b, rest), (Action::DeleteLine, ""));
        let (b, rest) = find_binding("dw", Mode::NORMAL).map(|(b, r)| (b.action, r)).unwrap();
        assert_eq!((b, rest), (Action::Delete, "w"));
        let (b, _) = find_binding("zj", Mode::NORMAL).unwrap();
        assert_eq!(b.action, Action::Down);
        let (b, _) = find_binding("d", Mode::VISUAL).unwrap();
        assert_eq!(b.action, Action::DeleteSelection);
        assert!(find_binding("i", Mode::VISUAL).is_none());
    }

    #[test]
    fn viability() {
        assert!(is_viable("g", Mode::NORMAL));
        assert!(is_viable("d", Mode::NORMAL));
        assert!(is_viable("dg", Mode::NORMAL));
        assert!(is_viable("df", Mode::NORMAL));
        assert!(!is_viable("z", Mode::NORMAL));
        assert!(!is_viable("dz", Mode::NORMAL));
        assert!(!is_viable("i", Mode::VISUAL));
    }

    #[test]
    fn retain_viable_trims_junk() {
        let mut cmd = String::from("zg");
        retain_viable(&mut cmd, Mode::NORMAL);
        assert_eq!(cmd, "g");
        let mut cmd = String::from("qz");
        retain_viable(&mut cmd, Mode::NORMAL);
        assert_eq!(cmd, "");
    }

    // -- Motions ------------------------------------------------------------

    #[test]
    fn hjkl_stay_inside() {
        let mut ed = editor(&["ab", "c"]);
        typed(&mut ed, "lllll");
        assert_eq!(ed.cursor(), pos(0, 1));
        typed(&mut ed, "jjj");
        assert_eq!(ed.cursor(), pos(1, 0));
        typed(&mut ed, "hkkk");
        assert_eq!(ed.cursor(), pos(0, 0));
    }

    #[test]
    fn line_and_buffer_motions() {
        let mut ed = editor(&["  indented", "x", "last line"]);
        typed(&mut ed, "$");
        assert_eq!(ed.cursor(), pos(0, 9));
        typed(&mut ed, "0");
        assert_eq!(ed.cursor(), pos(0, 0));
        typed(&mut ed, "^");
        assert_eq!(ed.cursor(), pos(0, 2));
        typed(&mut ed, "G");
        assert_eq!(ed.cursor().line, 2);
        typed(&mut ed, "gg");
        assert_eq!(ed.cursor().line, 0);
        assert_eq!(ed.pending(), "");
    }

    #[test]
    fn word_motions_clamp_in_normal() {
        let mut ed = editor(&["foo bar"]);
        typed(&mut ed, "w");
        assert_eq!(ed.cursor(), pos(0, 4));
        typed(&mut ed, "w");
        assert_eq!(ed.cursor(), pos(0, 6));
        typed(&mut ed, "b");
        assert_eq!(ed.cursor(), pos(0, 4));
        typed(&mut ed, "0e");
        assert_eq!(ed.cursor(), pos(0, 2));
    }

    #[test]
    fn find_char_waits_for_argument() {
        let mut ed = editor(&["a,b,c"]);
        typed(&mut ed, "f");
        assert_eq!(ed.pending(), "f");
        typed(&mut ed, ",");
        assert_eq!(ed.pending(), "");
        assert_eq!(ed.cursor(), pos(0, 1));
        typed(&mut ed, "t,");
        assert_eq!(ed.cursor(), pos(0, 2));
        typed(&mut ed, "$F,");
        assert_eq!(ed.cursor(), pos(0, 3));
        typed(&mut ed, "T,");
        assert_eq!(ed.cursor(), pos(0, 2));
    }

    #[test]
    fn junk_keys_do_not_block() {
        let mut ed = editor(&["ab"]);
        typed(&mut ed, "z");
        assert_eq!(ed.pending(), "");
        typed(&mut ed, "l");
        assert_eq!(ed.cursor(), pos(0, 1));
    }

    // -- Insert entry -------------------------------------------------------

    #[test]
    fn insert_entries() {
        let mut ed = editor(&["  abc"]);
        typed(&mut ed, "A");
        assert_eq!(ed.mode(), Mode::INSERT);
        assert_eq!(ed.cursor(), pos(0, 5));
        ed.on_pressed(Key::plain(KeyCode::Escape));
        typed(&mut ed, "I");
        assert_eq!(ed.cursor(), pos(0, 2));
        ed.on_pressed(Key::plain(KeyCode::Escape));
        typed(&mut ed, "a");
        assert_eq!(ed.cursor(), pos(0, 2));
    }

    #[test]
    fn open_below_and_above_undo_with_text() {
        let mut ed = editor(&["one"]);
        typed(&mut ed, "otwo");
        ed.on_pressed(Key::plain(KeyCode::Escape));
        typed(&mut ed, "ggOzero");
        ed.on_pressed(Key::plain(KeyCode::Escape));
        assert_eq!(ed.lines(), vec!["zero", "one", "two"]);
        typed(&mut ed, "u");
        assert_eq!(ed.lines(), vec!["one", "two"]);
        typed(&mut ed, "u");
        assert_eq!(ed.lines(), vec!["one"]);
    }

    // -- Operators ----------------------------------------------------------

    #[test]
    fn dw_is_exclusive() {
        let mut ed = editor(&["foo bar baz"]);
        typed(&mut ed, "dw");
        assert_eq!(ed.lines(), vec!["bar baz"]);
        assert_eq!(ed.clipboard(), Some(Clip::chars("foo ")));
    }

    #[test]
    fn dw_on_last_word_stays_on_line() {
        let mut ed = editor(&["foo bar", "next"]);
        at(&mut ed, 0, 4);
        typed(&mut ed, "dw");
        assert_eq!(ed.lines(), vec!["foo ", "next"]);
    }

    #[test]
    fn dw_at_end_of_buffer_deletes_last_word() {
        let mut ed = editor(&["foo bar"]);
        at(&mut ed, 0, 4);
        typed(&mut ed, "dw");
        assert_eq!(ed.lines(), vec!["foo "]);
        assert_eq!(ed.cursor(), pos(0, 3));
    }

    #[test]
    fn de_and_dollar_are_inclusive() {
        let mut ed = editor(&["foo bar"]);
        typed(&mut ed, "de");
        assert_eq!(ed.lines(), vec![" bar"]);
        typed(&mut ed, "l");
        typed(&mut ed, "d$");
        assert_eq!(ed.lines(), vec![" "]);
    }

    #[test]
    fn df_and_dt() {
        let mut ed = editor(&["a(b)c"]);
        typed(&mut ed, "dt)");
        assert_eq!(ed.lines(), vec![")c"]);
        typed(&mut ed, "u");
        typed(&mut ed, "df)");
        assert_eq!(ed.lines(), vec!["c"]);
    }

    #[test]
    fn failed_find_deletes_nothing() {
        let mut ed = editor(&["abc"]);
        typed(&mut ed, "dfz");
        assert_eq!(ed.lines(), vec!["abc"]);
        assert_eq!(ed.pending(), "");
    }

    #[test]
    fn zero_width_motion_deletes_nothing() {
        let mut ed = editor(&["abc"]);
        typed(&mut ed, "d0");
        assert_eq!(ed.lines(), vec!["abc"]);
        assert!(ed.buffer().history().is_empty());
        assert_eq!(ed.pending(), "");
    }

    #[test]
    fn operator_pending_stays_until_motion() {
        let mut ed = editor(&["a", "b", "c"]);
        typed(&mut ed, "d");
        assert_eq!(ed.pending(), "d");
        typed(&mut ed, "g");
        assert_eq!(ed.pending(), "dg");
        typed(&mut ed, "G");
        assert_eq!(ed.pending(), "");
        assert_eq!(ed.lines(), vec!["a", "b", "c"]);
    }

    #[test]
    fn dj_and_dk_are_linewise() {
        let mut ed = editor(&["a", "b", "c", "d"]);
        typed(&mut ed, "jdj");
        assert_eq!(ed.lines(), vec!["a", "d"]);
        assert_eq!(ed.clipboard().map(|c| c.kind), Some(ClipKind::Line));
        typed(&mut ed, "dk");
        assert_eq!(ed.lines(), vec![""]);
    }

    #[test]
    fn dj_on_last_line_does_nothing() {
        let mut ed = editor(&["a", "b"]);
        typed(&mut ed, "jdj");
        assert_eq!(ed.lines(), vec!["a", "b"]);
    }

    #[test]
    fn invalid_operator_motion_cancels() {
        let mut ed = editor(&["abc"]);
        typed(&mut ed, "dz");
        assert_eq!(ed.pending(), "");
        typed(&mut ed, "x");
        assert_eq!(ed.lines(), vec!["bc"]);
    }

    #[test]
    fn yank_motion_and_paste() {
        let mut ed = editor(&["foo bar"]);
        typed(&mut ed, "yw");
        assert_eq!(ed.lines(), vec!["foo bar"]);
        assert!(ed.flash().is_some());
        typed(&mut ed, "$p");
        assert_eq!(ed.lines(), vec!["foo barfoo "]);
    }

    #[test]
    fn yy_and_p_paste_lines_below() {
        let mut ed = editor(&["one", "two"]);
        typed(&mut ed, "yyjp");
        assert_eq!(ed.lines(), vec!["one", "two", "one"]);
        assert_eq!(ed.cursor(), pos(2, 0));
        typed(&mut ed, "ggP");
        assert_eq!(ed.lines(), vec!["one", "one", "two", "one"]);
    }

    #[test]
    fn x_and_big_d() {
        let mut ed = editor(&["abcdef"]);
        typed(&mut ed, "x");
        assert_eq!(ed.lines(), vec!["bcdef"]);
        assert_eq!(ed.clipboard(), None);
        typed(&mut ed, "lD");
        assert_eq!(ed.lines(), vec!["b"]);
        assert_eq!(ed.cursor(), pos(0, 0));
        assert_eq!(ed.clipboard(), Some(Clip::chars("cdef")));
    }

    #[test]
    fn x_on_empty_line_does_not_join() {
        let mut ed = editor(&["", "b"]);
        typed(&mut ed, "x");
        assert_eq!(ed.lines(), vec!["", "b"]);
    }

    // -- Visual -------------------------------------------------------------

    #[test]
    fn visual_delete_and_yank() {
        let mut ed = editor(&["hello world"]);
        typed(&mut ed, "vll");
        assert_eq!(ed.selection(), Some(Range::new(pos(0, 0), pos(0, 3))));
        typed(&mut ed, "y");
        assert_eq!(ed.mode(), Mode::NORMAL);
        assert_eq!(ed.selection(), None);
        assert_eq!(ed.clipboard(), Some(Clip::chars("hel")));

        typed(&mut ed, "wvex");
        assert_eq!(ed.lines(), vec!["hello "]);
        assert_eq!(ed.clipboard(), Some(Clip::chars("world")));
    }

    #[test]
    fn visual_line_delete() {
        let mut ed = editor(&["a", "b", "c"]);
        typed(&mut ed, "Vjd");
        assert_eq!(ed.lines(), vec!["c"]);
        assert_eq!(ed.clipboard(), Some(Clip::lines("a\nb\n")));
        typed(&mut ed, "u");
        assert_eq!(ed.lines(), vec!["a", "b", "c"]);
    }

    #[test]
    fn escape_leaves_visual() {
        let mut ed = editor(&["abc"]);
        typed(&mut ed, "vl");
        ed.on_pressed(Key::plain(KeyCode::Escape));
        assert_eq!(ed.mode(), Mode::NORMAL);
        assert_eq!(ed.selection(), None);
    }

    // -- Search -------------------------------------------------------------

    #[test]
    fn n_and_big_n_follow_search() {
        let mut ed = editor(&["x.", "x", "..x"]);
        typed(&mut ed, "/x");
        ed.on_pressed(Key::plain(KeyCode::Enter));
        assert_eq!(ed.cursor(), pos(1, 0));
        typed(&mut ed, "n");
        assert_eq!(ed.cursor(), pos(2, 2));
        typed(&mut ed, "n");
        assert_eq!(ed.cursor(), pos(0, 0));
        typed(&mut ed, "N");
        assert_eq!(ed.cursor(), pos(2, 2));
    }
}
