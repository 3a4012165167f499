//! # jot-editor: Editor core for jot
//!
//! Everything a modal editor needs short of a screen:
//!
//! - **[`position`]**: `Position` (line, col) and `Range` types, 0-indexed
//! - **[`text`]**: rope-backed line storage with line-ending detection
//! - **[`history`]**: edit records and the undo/redo ring
//! - **[`cursor`]**: cursor, desired column and selection anchor
//! - **[`buffer`]**: text, cursor, history, search and tokens for one file
//! - **[`mode`]**: `Normal`, `Insert`, `Visual` and `VisualLine`
//! - **[`motion`]**: the key binding table and its dispatcher
//! - **[`command`]**: the `:` prompt language
//! - **[`search`]**: literal match index
//! - **[`tokenizer`]**: background lexer for syntax tokens
//! - **[`editor`]**: the buffer arena plus shared state, driven by keys

pub mod buffer;
pub mod clipboard;
pub mod command;
pub mod config;
pub mod cursor;
pub mod editor;
pub mod error;
pub mod history;
pub mod key;
pub mod mode;
pub mod motion;
pub mod notice;
pub mod position;
pub mod runner;
pub mod search;
pub mod text;
pub mod tokenizer;
pub mod word;

pub use buffer::Buffer;
pub use clipboard::{Clip, ClipKind, Clipboard, MemoryClipboard, SystemClipboard};
pub use config::{ClipboardBackend, Config};
pub use editor::{BufferId, Editor};
pub use error::{BufferError, CommandError, EditorError};
pub use key::{Key, KeyCode, Modifiers};
pub use mode::Mode;
pub use position::{Position, Range};
pub use runner::{CommandRunner, RecordingRunner, ShellRunner};
