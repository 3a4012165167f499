//! Timed banners and the copy flash.
//!
//! Both count down from the elapsed time handed to
//! [`Editor::update`](crate::editor::Editor::update) once per frame.

use std::time::Duration;

use crate::position::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// One banner line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    remaining: Duration,
}

impl Notice {
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }
}

/// Stack of live notices. The newest is on top.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    stack: Vec<Notice>,
}

impl Notices {
    #[must_use]
    pub const fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>, ttl: Duration) {
        self.stack.push(Notice {
            kind,
            message: message.into(),
            remaining: ttl,
        });
    }

    /// Age every notice and drop the expired ones.
    pub fn tick(&mut self, elapsed: Duration) {
        for notice in &mut self.stack {
            notice.remaining = notice.remaining.saturating_sub(elapsed);
        }
        self.stack.retain(|n| !n.remaining.is_zero());
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.stack.iter().rev()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Notice> {
        self.stack.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}

/// A briefly highlighted range, shown after a yank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flash {
    pub range: Range,
    remaining: Duration,
}

impl Flash {
    #[must_use]
    pub const fn new(range: Range, ttl: Duration) -> Self {
        Self {
            range,
            remaining: ttl,
        }
    }

    /// Count down; returns `false` once the flash has expired.
    pub const fn tick(&mut self, elapsed: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(elapsed);
        !self.remaining.is_zero()
    }
}
