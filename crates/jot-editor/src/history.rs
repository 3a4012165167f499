//! Undo/redo history built from fine-grained edit records.
//!
//! An [`Edit`] is one undoable transaction: the position it started at, the
//! position it ended at, and the stream of [`EditOp`]s performed in between.
//! Typing `ab<BS>c` in one burst is a single edit whose stream is
//! `Insert('a') Insert('b') DeleteBack Insert('c')`, with `"b"` saved in the
//! deleted-text side channel.
//!
//! [`History`] is an append-only log with an `undo_level` counting how many
//! edits back from the tip the buffer currently sits. Opening a new edit
//! while `undo_level > 0` drops every edit past that point.
//!
//! ```text
//! edits:        [e0] [e1] [e2] [e3]
//! undo_level=2             ^ visible state ends after e1
//! open(..)  ->  [e0] [e1] [new]
//! ```

use crate::position::Position;
use crate::text::Text;

// ---------------------------------------------------------------------------
// EditOp
// ---------------------------------------------------------------------------

/// One primitive step of an edit, relative to a moving replay position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// Insert the char at the replay position and advance past it.
    Insert(char),
    /// Delete the char before the replay position and step back.
    DeleteBack,
    /// Delete the char at the replay position.
    DeleteForward,
    /// Move the replay position without touching text. Lets a single edit
    /// span several sites (line deletes, substitutions).
    Jump { from: Position, to: Position },
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

/// A recorded transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    start: Position,
    end: Position,
    ops: Vec<EditOp>,
    /// Chars removed by `DeleteBack`/`DeleteForward`, in forward order.
    deleted: String,
}

impl Edit {
    #[must_use]
    pub const fn new(start: Position) -> Self {
        Self {
            start,
            end: start,
            ops: Vec::new(),
            deleted: String::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn start(&self) -> Position {
        self.start
    }

    #[inline]
    #[must_use]
    pub const fn end(&self) -> Position {
        self.end
    }

    #[inline]
    #[must_use]
    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    #[inline]
    #[must_use]
    pub fn deleted_text(&self) -> &str {
        &self.deleted
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// True if any op inserts or deletes; an edit of pure jumps is a no-op.
    #[must_use]
    pub fn changes_text(&self) -> bool {
        self.ops.iter().any(|op| !matches!(op, EditOp::Jump { .. }))
    }

    /// Append an op that has already been performed. `removed` is the char a
    /// delete took out; `end` is the cursor after the op.
    pub fn record(&mut self, op: EditOp, removed: Option<char>, end: Position) {
        debug_assert_eq!(
            matches!(op, EditOp::DeleteBack | EditOp::DeleteForward),
            removed.is_some(),
            "deletes record exactly one removed char"
        );
        self.ops.push(op);
        if let Some(ch) = removed {
            self.deleted.push(ch);
        }
        self.end = end;
    }

    /// Replay the stream from `start`. Returns the position reached, which
    /// is `end` for any edit recorded against the same text.
    pub fn apply(&self, text: &mut Text) -> Position {
        let mut idx = text.char_index(self.start);
        for op in &self.ops {
            match *op {
                EditOp::Insert(ch) => {
                    text.insert_char(idx, ch);
                    idx += 1;
                }
                EditOp::DeleteBack => {
                    if idx > 0 {
                        idx -= 1;
                        text.remove_char(idx);
                    }
                }
                EditOp::DeleteForward => {
                    text.remove_char(idx);
                }
                EditOp::Jump { to, .. } => idx = text.char_index(to),
            }
        }
        text.position_of(idx)
    }

    /// Replay the inverse stream from `end`, last op first. Returns the
    /// position reached (`start`), or `None` if the deleted-text channel ran
    /// dry, which means the edit was not recorded against this text.
    pub fn revert(&self, text: &mut Text) -> Option<Position> {
        let mut idx = text.char_index(self.end);
        let mut restored = self.deleted.chars().rev();
        for op in self.ops.iter().rev() {
            match *op {
                EditOp::Insert(_) => {
                    if idx > 0 {
                        idx -= 1;
                        text.remove_char(idx);
                    }
                }
                EditOp::DeleteBack => {
                    text.insert_char(idx, restored.next()?);
                    idx += 1;
                }
                EditOp::DeleteForward => {
                    // Re-insert, then step back onto it.
                    text.insert_char(idx, restored.next()?);
                }
                EditOp::Jump { from, .. } => idx = text.char_index(from),
            }
        }
        Some(text.position_of(idx))
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Bounded, linear edit log with a movable undo cursor.
#[derive(Debug, Clone)]
pub struct History {
    edits: Vec<Edit>,
    undo_level: usize,
    limit: usize,
}

impl History {
    /// An empty history keeping at most `limit` edits (at least one).
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            edits: Vec::new(),
            undo_level: 0,
            limit: limit.max(1),
        }
    }

    /// Start a new edit at `start`, discarding the redo branch and the
    /// oldest edit when over the limit. Returns the new tip.
    pub fn open(&mut self, start: Position) -> &mut Edit {
        let keep = self.edits.len() - self.undo_level;
        self.edits.truncate(keep);
        self.undo_level = 0;
        self.edits.push(Edit::new(start));
        if self.edits.len() > self.limit {
            let excess = self.edits.len() - self.limit;
            self.edits.drain(..excess);
        }
        let last = self.edits.len() - 1;
        &mut self.edits[last]
    }

    /// The edit at the tip, if the buffer currently sits there.
    pub fn tip_mut(&mut self) -> Option<&mut Edit> {
        if self.undo_level > 0 {
            return None;
        }
        self.edits.last_mut()
    }

    /// Move one edit back. Returns the edit to revert, or `None` when
    /// already at the oldest change.
    pub fn step_back(&mut self) -> Option<&Edit> {
        if self.undo_level == self.edits.len() {
            return None;
        }
        self.undo_level += 1;
        Some(&self.edits[self.edits.len() - self.undo_level])
    }

    /// Move one edit forward. Returns the edit to re-apply, or `None` when
    /// already at the newest change.
    pub fn step_forward(&mut self) -> Option<&Edit> {
        if self.undo_level == 0 {
            return None;
        }
        let edit = &self.edits[self.edits.len() - self.undo_level];
        self.undo_level -= 1;
        Some(edit)
    }

    /// Remove a tip edit that never changed the text.
    pub fn discard_unchanged_tip(&mut self) {
        if self.undo_level == 0 && self.edits.last().is_some_and(|e| !e.changes_text()) {
            self.edits.pop();
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    #[inline]
    #[must_use]
    pub const fn undo_level(&self) -> usize {
        self.undo_level
    }

    #[inline]
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(1000)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
