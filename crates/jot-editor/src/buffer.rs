//! Text buffer: lines, cursor, selection, history and per-buffer services.
//!
//! Every text change goes through four private primitives (`op_insert`,
//! `op_delete_back`, `op_delete_forward`, `op_jump`) that perform the change
//! and append the matching [`EditOp`] to the open [`Edit`](crate::history::Edit).
//! Higher-level operations (backspace over an indent, deleting lines,
//! pasting, substituting) are sequences of primitives, so each undoes as a
//! single unit.
//!
//! # Edit coalescing
//!
//! `broken_edit` decides whether the next primitive extends the open edit or
//! opens a new one. Cursor movement, undo/redo and mode changes break it;
//! typing a run of characters does not.
//!
//! # Read-only buffers
//!
//! Directory listings are read-only. Every mutating operation silently does
//! nothing on them.

use std::fmt;
use std::fs;
use std::io;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use bitflags::bitflags;
use tracing::{debug, error, info, warn};

use crate::clipboard::{Clip, ClipKind};
use crate::config::Config;
use crate::cursor::Cursor;
use crate::error::BufferError;
use crate::history::{EditOp, History};
use crate::position::{Position, Range};
use crate::search::SearchIndex;
use crate::text::Text;
use crate::tokenizer::{Language, Token, Tokenizer};

bitflags! {
    /// Buffer state bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct BufferFlags: u8 {
        /// Mutations are discarded.
        const READ_ONLY        = 1 << 0;
        /// The lines are a directory listing.
        const DIRECTORY        = 1 << 1;
        /// The tokenizer should start a pass with the current text.
        const NEEDS_RETOKENIZE = 1 << 2;
        /// Text changed since the last frame; consumed by `update`.
        const MODIFIED         = 1 << 3;
        /// Text changed since the last save.
        const UNSAVED          = 1 << 4;
    }
}

/// What a prompt buffer is asking for. Enter dispatches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// `:` commands.
    Command,
    /// `/` search pattern.
    Search,
    /// Path to open.
    OpenFile,
    /// Shell command to run.
    Compile,
}

impl PromptKind {
    /// The character shown before the prompt text.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Command => ":",
            Self::Search => "/",
            Self::OpenFile => "open: ",
            Self::Compile => "compile: ",
        }
    }
}

/// Word motion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordMotion {
    /// `w`
    Forward,
    /// `b`
    Backward,
    /// `e`
    End,
}

/// In-line character search (`f t F T`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindChar {
    /// `f`: onto the next match.
    Forward,
    /// `t`: just before the next match.
    TillForward,
    /// `F`: onto the previous match.
    Backward,
    /// `T`: just after the previous match.
    TillBackward,
}

pub struct Buffer {
    text: Text,
    path: Option<PathBuf>,
    cursor: Cursor,
    /// First visible line.
    camera: usize,
    history: History,
    broken_edit: bool,
    flags: BufferFlags,
    tokenizer: Option<Tokenizer>,
    tokens: Vec<Token>,
    search: SearchIndex,
    prompt: Option<PromptKind>,
    tab_width: usize,
    view_rows: usize,
    scroll_off: usize,
}

impl Buffer {
    /// An empty scratch buffer.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            text: Text::new(),
            path: None,
            cursor: Cursor::new(),
            camera: 0,
            history: History::new(config.history_limit),
            broken_edit: true,
            flags: BufferFlags::empty(),
            tokenizer: None,
            tokens: Vec::new(),
            search: SearchIndex::new(),
            prompt: None,
            tab_width: config.indent_width(),
            view_rows: config.view_rows,
            scroll_off: config.scroll_off,
        }
    }

    /// An empty prompt buffer.
    #[must_use]
    pub fn prompt(kind: PromptKind, config: &Config) -> Self {
        let mut buf = Self::new(config);
        buf.prompt = Some(kind);
        buf
    }

    /// A scratch buffer holding `lines`, mainly for tests.
    #[must_use]
    pub fn from_lines<S: AsRef<str>>(lines: &[S], config: &Config) -> Self {
        let mut buf = Self::new(config);
        buf.text = Text::from_lines(lines);
        buf
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn text(&self) -> &Text {
        &self.text
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.text.lines()
    }

    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.text.line_count()
    }

    #[must_use]
    pub fn line_text(&self, line: usize) -> String {
        self.text.line_text(line)
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor.position()
    }

    /// Cursor column clamped onto an existing char (`[0, len-1]`).
    #[must_use]
    pub fn x(&self) -> usize {
        self.cursor
            .col()
            .min(self.text.line_len(self.cursor.line()).saturating_sub(1))
    }

    #[must_use]
    pub fn selection(&self) -> Option<Range> {
        self.cursor.selection(&self.text)
    }

    #[inline]
    #[must_use]
    pub const fn has_selection(&self) -> bool {
        self.cursor.has_selection()
    }

    #[inline]
    #[must_use]
    pub const fn camera(&self) -> usize {
        self.camera
    }

    #[inline]
    #[must_use]
    pub const fn flags(&self) -> BufferFlags {
        self.flags
    }

    #[inline]
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.flags.contains(BufferFlags::READ_ONLY)
    }

    #[inline]
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        self.flags.contains(BufferFlags::DIRECTORY)
    }

    #[inline]
    #[must_use]
    pub const fn is_unsaved(&self) -> bool {
        self.flags.contains(BufferFlags::UNSAVED)
    }

    #[inline]
    #[must_use]
    pub const fn prompt_kind(&self) -> Option<PromptKind> {
        self.prompt
    }

    #[inline]
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[inline]
    #[must_use]
    pub const fn search(&self) -> &SearchIndex {
        &self.search
    }

    #[inline]
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn language(&self) -> Option<Language> {
        self.tokenizer.as_ref().map(Tokenizer::language)
    }

    // -- Edit recording -----------------------------------------------------

    /// Close the open edit; the next change starts a new one.
    pub fn break_edit(&mut self) {
        self.history.discard_unchanged_tip();
        self.broken_edit = true;
    }

    fn begin_edit(&mut self) {
        if self.broken_edit || self.history.tip_mut().is_none() {
            self.history.open(self.cursor.position());
            self.broken_edit = false;
        }
    }

    fn record(&mut self, op: EditOp, removed: Option<char>) {
        let end = self.cursor.position();
        if let Some(edit) = self.history.tip_mut() {
            edit.record(op, removed, end);
        }
        if !matches!(op, EditOp::Jump { .. }) {
            self.mark_changed();
        }
    }

    fn mark_changed(&mut self) {
        self.flags |= BufferFlags::MODIFIED | BufferFlags::UNSAVED;
        if self.tokenizer.is_some() {
            self.flags |= BufferFlags::NEEDS_RETOKENIZE;
        }
    }

    fn place(&mut self, idx: usize) {
        let pos = self.text.position_of(idx);
        self.cursor.set_position(pos, &self.text, true);
    }

    // -- Primitives ---------------------------------------------------------

    fn op_insert(&mut self, ch: char) {
        let ch = if ch == '\r' { '\n' } else { ch };
        let idx = self.text.char_index(self.cursor.position());
        self.text.insert_char(idx, ch);
        self.place(idx + 1);
        self.record(EditOp::Insert(ch), None);
    }

    fn op_delete_back(&mut self) -> bool {
        let idx = self.text.char_index(self.cursor.position());
        if idx == 0 {
            return false;
        }
        let removed = self.text.remove_char(idx - 1);
        self.place(idx - 1);
        self.record(EditOp::DeleteBack, removed);
        true
    }

    fn op_delete_forward(&mut self) -> bool {
        let idx = self.text.char_index(self.cursor.position());
        let Some(removed) = self.text.remove_char(idx) else {
            return false;
        };
        self.place(idx);
        self.record(EditOp::DeleteForward, Some(removed));
        true
    }

    fn op_jump(&mut self, to: Position) {
        let from = self.cursor.position();
        let to = self.text.clamp(to);
        if from == to {
            return;
        }
        self.cursor.set_position(to, &self.text, true);
        self.record(EditOp::Jump { from, to }, None);
    }

    // -- Editing ------------------------------------------------------------

    /// Type one char at the cursor. `'\n'` splits the line. An active
    /// selection is replaced.
    pub fn insert(&mut self, ch: char) {
        if self.is_read_only() {
            return;
        }
        self.begin_edit();
        if self.cursor.has_selection() {
            self.delete_selection_in_edit();
        }
        self.op_insert(ch);
        self.scroll_to_cursor();
    }

    /// Type a string as one continuous run.
    pub fn insert_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.insert(ch);
        }
    }

    /// Delete before the cursor. A full indent unit of spaces at an indent
    /// stop, with only spaces before it, goes in one press. With a selection,
    /// deletes the selection instead.
    pub fn backspace(&mut self) {
        if self.is_read_only() {
            return;
        }
        if self.cursor.has_selection() {
            self.delete_selection();
            return;
        }
        if self.text.char_index(self.cursor.position()) == 0 {
            return;
        }
        let col = self.cursor.col().min(self.text.line_len(self.cursor.line()));
        let line = self.text.line_text(self.cursor.line());
        let tab = self.tab_width;
        let count = if col >= tab && col % tab == 0 && line.chars().take(col).all(|c| c == ' ') {
            tab
        } else {
            1
        };
        self.begin_edit();
        for _ in 0..count {
            self.op_delete_back();
        }
        self.scroll_to_cursor();
    }

    /// Delete the char under the cursor; at end of line, join the next one.
    pub fn delete_forward(&mut self) {
        if self.is_read_only() {
            return;
        }
        if self.cursor.has_selection() {
            self.delete_selection();
            return;
        }
        let idx = self.text.char_index(self.cursor.position());
        if idx >= self.text.len_chars() {
            return;
        }
        self.begin_edit();
        self.op_delete_forward();
    }

    /// Delete `range` in the open edit. Returns the removed text; the cursor
    /// ends at `range.start`.
    pub fn delete_range(&mut self, range: Range) -> String {
        if self.is_read_only() {
            return String::new();
        }
        let start = self.text.char_index(range.start);
        let end = self.text.char_index(range.end);
        let removed = self.text.slice(range);
        if start >= end {
            return removed;
        }
        self.begin_edit();
        self.op_jump(self.text.position_of(start));
        for _ in start..end {
            self.op_delete_forward();
        }
        self.scroll_to_cursor();
        removed
    }

    /// Delete lines `first..=last` in the open edit and park the cursor on
    /// the first non-blank of the line that takes their place. Returns the
    /// removed lines, each ending in `\n`. The buffer keeps at least one line.
    pub fn delete_lines(&mut self, first: usize, last: usize) -> String {
        if self.is_read_only() {
            return String::new();
        }
        let final_line = self.text.line_count() - 1;
        let last = last.min(final_line);
        let first = first.min(last);

        let mut removed = String::new();
        for line in first..=last {
            removed.push_str(&self.text.line_text(line));
            removed.push('\n');
        }

        let range = if last < final_line {
            Range::new(Position::new(first, 0), Position::new(last + 1, 0))
        } else if first > 0 {
            Range::new(
                Position::new(first - 1, self.text.line_len(first - 1)),
                Position::new(last, self.text.line_len(last)),
            )
        } else {
            Range::new(Position::ZERO, Position::new(last, self.text.line_len(last)))
        };
        self.delete_range(range);

        let line = first.min(self.text.line_count() - 1);
        let indent = self
            .text
            .line_text(line)
            .chars()
            .take_while(|c| c.is_whitespace())
            .count();
        self.begin_edit();
        self.op_jump(Position::new(line, indent));
        self.scroll_to_cursor();
        removed
    }

    /// Delete the selection as one edit and clear it. Returns what was
    /// removed, line-wise for `V` selections.
    pub fn delete_selection(&mut self) -> Option<Clip> {
        if self.is_read_only() || !self.cursor.has_selection() {
            return None;
        }
        self.break_edit();
        self.begin_edit();
        let clip = self.delete_selection_in_edit();
        self.break_edit();
        clip
    }

    fn delete_selection_in_edit(&mut self) -> Option<Clip> {
        let range = self.cursor.selection(&self.text)?;
        let line_wise = self.cursor.is_line_wise();
        self.cursor.clear_anchor();
        if line_wise {
            Some(Clip::lines(self.delete_lines(range.start.line, range.end.line)))
        } else {
            Some(Clip::chars(self.delete_range(range)))
        }
    }

    /// `o` / `O`: open an empty line below or above and put the cursor
    /// on it.
    pub fn open_line(&mut self, above: bool) {
        if self.is_read_only() {
            return;
        }
        let line = self.cursor.line();
        self.begin_edit();
        if above {
            self.op_jump(Position::new(line, 0));
            self.op_insert('\n');
            self.op_jump(Position::new(line, 0));
        } else {
            self.op_jump(Position::new(line, self.text.line_len(line)));
            self.op_insert('\n');
        }
        self.scroll_to_cursor();
    }

    /// Replace `len` chars at `at` with `replacement` inside the open edit.
    /// The cursor ends just after the replacement.
    pub fn replace_at(&mut self, at: Position, len: usize, replacement: &str) {
        if self.is_read_only() {
            return;
        }
        self.begin_edit();
        self.op_jump(at);
        for _ in 0..len {
            self.op_delete_forward();
        }
        for ch in replacement.chars() {
            self.op_insert(ch);
        }
    }

    /// Move the cursor as part of the open edit, so the move replays with
    /// it instead of breaking it.
    pub fn jump_in_edit(&mut self, to: Position) {
        if self.is_read_only() {
            self.goto(to, true);
            return;
        }
        self.begin_edit();
        self.op_jump(to);
        self.scroll_to_cursor();
    }

    // -- Undo / redo --------------------------------------------------------

    /// Revert one edit. Returns `false` when already at the oldest change.
    pub fn undo(&mut self) -> bool {
        self.break_edit();
        let Some(edit) = self.history.step_back() else {
            return false;
        };
        let pos = edit.revert(&mut self.text).unwrap_or_else(|| {
            error!(start = ?edit.start(), "edit deleted text ran out during undo");
            edit.start()
        });
        self.cursor.clear_anchor();
        self.cursor.set_position(pos, &self.text, true);
        self.mark_changed();
        self.scroll_to_cursor();
        debug!(level = self.history.undo_level(), "undo");
        true
    }

    /// Re-apply one undone edit. Returns `false` when already at the newest
    /// change.
    pub fn redo(&mut self) -> bool {
        self.break_edit();
        let Some(edit) = self.history.step_forward() else {
            return false;
        };
        let pos = edit.apply(&mut self.text);
        self.cursor.clear_anchor();
        self.cursor.set_position(pos, &self.text, true);
        self.mark_changed();
        self.scroll_to_cursor();
        debug!(level = self.history.undo_level(), "redo");
        true
    }

    // -- Clipboard ----------------------------------------------------------

    /// The selected text and its range, without touching the buffer.
    #[must_use]
    pub fn copy_selection(&self) -> Option<(Clip, Range)> {
        let range = self.cursor.selection(&self.text)?;
        if self.cursor.is_line_wise() {
            Some((self.copy_lines(range.start.line, range.end.line), range))
        } else {
            Some((Clip::chars(self.text.slice(range)), range))
        }
    }

    /// Lines `first..=last` as a line-wise clip.
    #[must_use]
    pub fn copy_lines(&self, first: usize, last: usize) -> Clip {
        let last = last.min(self.text.line_count() - 1);
        let mut out = String::new();
        for line in first.min(last)..=last {
            out.push_str(&self.text.line_text(line));
            out.push('\n');
        }
        Clip::lines(out)
    }

    /// `p` (after the cursor) or `P` (before). Line-wise clips go below or
    /// above the cursor line.
    pub fn paste(&mut self, clip: &Clip, before: bool) {
        if self.is_read_only() || clip.is_empty() {
            return;
        }
        self.break_edit();
        self.begin_edit();
        let line = self.cursor.line();
        match clip.kind {
            ClipKind::Line => {
                let body = clip.text.strip_suffix('\n').unwrap_or(&clip.text);
                if before {
                    self.op_jump(Position::new(line, 0));
                    for ch in body.chars() {
                        self.op_insert(ch);
                    }
                    self.op_insert('\n');
                    self.op_jump(Position::new(line, 0));
                } else {
                    self.op_jump(Position::new(line, self.text.line_len(line)));
                    self.op_insert('\n');
                    for ch in body.chars() {
                        self.op_insert(ch);
                    }
                    self.op_jump(Position::new(line + 1, 0));
                }
            }
            ClipKind::Char => {
                if !before && self.text.line_len(line) > 0 {
                    let col = self.x() + 1;
                    self.op_jump(Position::new(line, col));
                }
                for ch in clip.text.chars() {
                    self.op_insert(ch);
                }
                let idx = self.text.char_index(self.cursor.position());
                self.op_jump(self.text.position_of(idx.saturating_sub(1)));
            }
        }
        self.break_edit();
        self.scroll_to_cursor();
    }

    // -- Movement -----------------------------------------------------------

    fn moved(&mut self) {
        self.break_edit();
        self.scroll_to_cursor();
    }

    /// Move horizontally by `delta` columns, clamped to the line.
    pub fn move_x(&mut self, delta: isize, past_end: bool) {
        if delta < 0 {
            self.cursor.move_left(delta.unsigned_abs(), &self.text, past_end);
        } else {
            self.cursor.move_right(delta.unsigned_abs(), &self.text, past_end);
        }
        self.moved();
    }

    /// Move vertically by `delta` lines, clamped to the buffer.
    pub fn move_y(&mut self, delta: isize, past_end: bool) {
        if delta < 0 {
            self.cursor.move_up(delta.unsigned_abs(), &self.text, past_end);
        } else {
            self.cursor.move_down(delta.unsigned_abs(), &self.text, past_end);
        }
        self.moved();
    }

    /// Word motions. The column may land one past the end of the buffer so
    /// that an operator reaches the last char.
    pub fn word_move(&mut self, motion: WordMotion) {
        match motion {
            WordMotion::Forward => self.cursor.word_forward(&self.text),
            WordMotion::Backward => self.cursor.word_backward(&self.text),
            WordMotion::End => self.cursor.word_end_forward(&self.text),
        }
        self.moved();
    }

    /// Jump to `pos`, clamped.
    pub fn goto(&mut self, pos: Position, past_end: bool) {
        self.cursor.set_position(pos, &self.text, past_end);
        self.moved();
    }

    /// `0`
    pub fn goto_line_start(&mut self) {
        self.cursor.move_to_line_start();
        self.moved();
    }

    /// `^`
    pub fn goto_first_non_blank(&mut self, past_end: bool) {
        self.cursor.move_to_first_non_blank(&self.text, past_end);
        self.moved();
    }

    /// `$`
    pub fn goto_line_end(&mut self, past_end: bool) {
        self.cursor.move_to_line_end(&self.text, past_end);
        self.moved();
    }

    /// `gg`
    pub fn goto_top(&mut self, past_end: bool) {
        self.cursor.move_to_first_line(&self.text, past_end);
        self.moved();
    }

    /// `G`
    pub fn goto_bottom(&mut self, past_end: bool) {
        self.cursor.move_to_last_line(&self.text, past_end);
        self.moved();
    }

    /// `f t F T`. Returns `true` if the cursor moved.
    pub fn find_char(&mut self, kind: FindChar, ch: char) -> bool {
        let found = match kind {
            FindChar::Forward => self.cursor.char_find_forward(&self.text, ch),
            FindChar::TillForward => self.cursor.char_till_forward(&self.text, ch),
            FindChar::Backward => self.cursor.char_find_backward(&self.text, ch),
            FindChar::TillBackward => self.cursor.char_till_backward(&self.text, ch),
        };
        if found {
            self.moved();
        }
        found
    }

    /// Pull the cursor back inside its line after a mode change or edit.
    pub fn clamp_cursor(&mut self, past_end: bool) {
        let before = self.cursor.position();
        self.cursor.clamp(&self.text, past_end);
        if self.cursor.position() != before {
            self.moved();
        }
    }

    // -- Selection ----------------------------------------------------------

    /// Anchor a selection at the cursor.
    pub fn start_selection(&mut self, line_wise: bool) {
        self.cursor.set_anchor(line_wise);
    }

    pub fn clear_selection(&mut self) {
        self.cursor.clear_anchor();
    }

    // -- Camera -------------------------------------------------------------

    /// Keep the cursor at least `scroll_off` lines inside the viewport.
    fn scroll_to_cursor(&mut self) {
        let line = self.cursor.line();
        let low = self.scroll_off;
        let high = self.view_rows.saturating_sub(self.scroll_off).max(low);
        if line > self.camera + high {
            self.camera = line - high;
        }
        if line < self.camera + low {
            self.camera = line.saturating_sub(low);
        }
        self.camera = self.camera.min(self.text.line_count() - 1);
    }

    // -- Search -------------------------------------------------------------

    /// Set the search pattern and recompute matches.
    pub fn set_search(&mut self, pattern: &str) {
        self.search.set_pattern(pattern, &self.text);
    }

    /// Jump to the first match after the cursor, wrapping. Returns `false`
    /// when there are no matches.
    pub fn goto_next_search(&mut self) -> bool {
        match self.search.next_after(self.cursor.position()) {
            Some(pos) => {
                self.goto(pos, false);
                true
            }
            None => false,
        }
    }

    /// Jump to the last match before the cursor, wrapping.
    pub fn goto_prev_search(&mut self) -> bool {
        match self.search.prev_before(self.cursor.position()) {
            Some(pos) => {
                self.goto(pos, false);
                true
            }
            None => false,
        }
    }

    // -- Per-frame work -----------------------------------------------------

    /// Refresh search matches after edits and drive the tokenizer handoff.
    pub fn update(&mut self) {
        if self.flags.contains(BufferFlags::MODIFIED) {
            if self.search.is_active() {
                self.search.refresh(&self.text);
            }
            self.flags.remove(BufferFlags::MODIFIED);
        }

        let Some(tokenizer) = self.tokenizer.as_mut() else {
            return;
        };
        if let Some(tokens) = tokenizer.poll() {
            self.tokens = tokens;
        }
        if self.flags.contains(BufferFlags::NEEDS_RETOKENIZE)
            && tokenizer.start(self.text.contents())
        {
            self.flags.remove(BufferFlags::NEEDS_RETOKENIZE);
        }
    }

    /// Block until no tokenizer pass is pending and the tokens match the
    /// current text.
    pub fn settle(&mut self) {
        loop {
            self.update();
            let Some(tokenizer) = self.tokenizer.as_mut() else {
                return;
            };
            if !tokenizer.is_busy() {
                return;
            }
            if let Some(tokens) = tokenizer.wait() {
                self.tokens = tokens;
            }
        }
    }

    /// Stop any tokenizer pass and join its worker.
    pub fn close(&mut self) {
        if let Some(tokenizer) = self.tokenizer.as_mut() {
            tokenizer.cancel();
        }
    }

    // -- File I/O -----------------------------------------------------------

    /// Load a file or directory into this buffer, replacing its contents.
    ///
    /// A missing file becomes an empty, writable buffer at that path. On a
    /// read error the buffer is left holding one empty line.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or directory exists but cannot be read.
    pub fn load(&mut self, path: &Path) -> Result<(), BufferError> {
        self.close();
        self.text = Text::new();
        self.cursor = Cursor::new();
        self.camera = 0;
        self.history = History::new(self.history.limit());
        self.broken_edit = true;
        self.flags = BufferFlags::empty();
        self.tokens.clear();
        self.search = SearchIndex::new();
        self.tokenizer = None;

        let is_dir = match fs::metadata(path) {
            Ok(meta) => meta.is_dir(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "new file");
                self.set_path(path.to_path_buf());
                return Ok(());
            }
            Err(source) => {
                self.path = Some(path.to_path_buf());
                warn!(path = %path.display(), "cannot stat: {source}");
                return Err(BufferError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        if is_dir {
            let dir = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            self.path = Some(dir.clone());
            self.flags = BufferFlags::READ_ONLY | BufferFlags::DIRECTORY;
            let lines = list_directory(&dir).map_err(|source| {
                warn!(path = %dir.display(), "cannot list: {source}");
                BufferError::List {
                    path: dir.clone(),
                    source,
                }
            })?;
            info!(path = %dir.display(), entries = lines.len() - 1, "listed directory");
            self.text = Text::from_lines(&lines);
            return Ok(());
        }

        self.set_path(path.to_path_buf());
        let raw = fs::read_to_string(path).map_err(|source| {
            warn!(path = %path.display(), "cannot read: {source}");
            BufferError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        self.text = Text::parse(&raw);
        if self.tokenizer.is_some() {
            self.flags |= BufferFlags::NEEDS_RETOKENIZE;
        }
        info!(path = %path.display(), lines = self.text.line_count(), "loaded");
        Ok(())
    }

    /// Write every line plus a line ending to the backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has no path, is read-only, or the
    /// write fails.
    pub fn save(&mut self) -> Result<(), BufferError> {
        if self.is_read_only() {
            return Err(BufferError::ReadOnly);
        }
        let path = self.path.clone().ok_or(BufferError::NoPath)?;
        fs::write(&path, self.text.serialize()).map_err(|source| {
            warn!(path = %path.display(), "cannot write: {source}");
            BufferError::Write {
                path: path.clone(),
                source,
            }
        })?;
        self.flags.remove(BufferFlags::UNSAVED);
        info!(path = %path.display(), lines = self.text.line_count(), "saved");
        Ok(())
    }

    /// Save under a new path, which becomes the buffer's path.
    ///
    /// # Errors
    ///
    /// As [`save`](Self::save).
    pub fn save_as(&mut self, path: &Path) -> Result<(), BufferError> {
        if self.is_read_only() {
            return Err(BufferError::ReadOnly);
        }
        self.set_path(path.to_path_buf());
        if self.tokenizer.is_some() {
            self.flags |= BufferFlags::NEEDS_RETOKENIZE;
        }
        self.save()
    }

    /// Point the buffer at `path` and pick its tokenizer language.
    fn set_path(&mut self, path: PathBuf) {
        let language = Language::from_path(&path);
        if language != self.language() {
            self.close();
            self.tokens.clear();
            self.tokenizer = language.map(Tokenizer::new);
        }
        self.path = Some(path);
    }
}

/// `".."` followed by every entry name, sorted, directories suffixed with
/// the path separator.
fn list_directory(dir: &Path) -> io::Result<Vec<String>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if name == "." || name == ".." {
            continue;
        }
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            name.push(MAIN_SEPARATOR);
        }
        entries.push(name);
    }
    entries.sort();
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push("..".to_string());
    lines.extend(entries);
    Ok(lines)
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("path", &self.path)
            .field("lines", &self.text.line_count())
            .field("cursor", &self.cursor.position())
            .field("flags", &self.flags)
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
