//! Clipboard: storage for yanked and deleted text.
//!
//! Every yank (`y`, `yy`) and delete (`d`, `x`, `dd`) copies text here;
//! paste (`p`, `P`) reads it back. A clip remembers whether it was captured
//! character-wise or line-wise, because paste behaves differently:
//!
//! - **Char-wise**: inserted inline at the cursor.
//! - **Line-wise**: inserted as whole lines below (`p`) or above (`P`).
//!
//! The system clipboard only stores text. The kind of the last clip the
//! editor set is remembered beside it; text that changed outside the editor
//! is classified by its trailing `\n`.

use tracing::warn;

/// How a clip was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipKind {
    #[default]
    Char,
    Line,
}

/// Text plus the way it was captured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Clip {
    pub text: String,
    pub kind: ClipKind,
}

impl Clip {
    #[must_use]
    pub fn chars(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ClipKind::Char,
        }
    }

    /// Whole lines; a missing final `\n` is added.
    #[must_use]
    pub fn lines(text: impl Into<String>) -> Self {
        let mut text = text.into();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Self {
            text,
            kind: ClipKind::Line,
        }
    }

    /// Classify text read from outside the editor.
    #[must_use]
    pub fn detect(text: String) -> Self {
        if text.ends_with('\n') {
            Self::lines(text)
        } else {
            Self::chars(text)
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Where yanked text goes.
pub trait Clipboard {
    /// The current clip, `None` when empty or unavailable.
    fn get(&mut self) -> Option<Clip>;
    fn set(&mut self, clip: Clip);
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// A process-local clipboard for headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    clip: Option<Clip>,
}

impl MemoryClipboard {
    #[must_use]
    pub const fn new() -> Self {
        Self { clip: None }
    }
}

impl Clipboard for MemoryClipboard {
    fn get(&mut self) -> Option<Clip> {
        self.clip.clone().filter(|c| !c.is_empty())
    }

    fn set(&mut self, clip: Clip) {
        self.clip = Some(clip);
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// The OS clipboard through `arboard`.
///
/// The handle is opened on first use. If the platform has no clipboard the
/// clip is kept in memory instead, so yank/paste keep working.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Option<arboard::Clipboard>,
    fallback: MemoryClipboard,
}

impl SystemClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Option<&mut arboard::Clipboard> {
        if self.handle.is_none() {
            match arboard::Clipboard::new() {
                Ok(handle) => self.handle = Some(handle),
                Err(err) => {
                    warn!("system clipboard unavailable: {err}");
                    return None;
                }
            }
        }
        self.handle.as_mut()
    }
}

impl Clipboard for SystemClipboard {
    fn get(&mut self) -> Option<Clip> {
        let from_system = self.handle().and_then(|h| h.get_text().ok());
        reconcile(from_system, self.fallback.get())
    }

    fn set(&mut self, clip: Clip) {
        if let Some(handle) = self.handle() {
            if let Err(err) = handle.set_text(clip.text.clone()) {
                warn!("failed to write system clipboard: {err}");
            }
        }
        self.fallback.set(clip);
    }
}

/// Pick the clip to paste from what the system clipboard holds now and the
/// last clip this editor set. Unchanged text keeps its recorded kind.
fn reconcile(system: Option<String>, last: Option<Clip>) -> Option<Clip> {
    match (system, last) {
        (Some(text), Some(last)) if text == last.text => Some(last),
        (Some(text), _) if !text.is_empty() => Some(Clip::detect(text)),
        (_, last) => last,
    }
}

impl std::fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemClipboard")
            .field("open", &self.handle.is_some())
            .finish()
    }
}
