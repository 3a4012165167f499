//! Error types surfaced to the user as notices.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// File-system failures while loading or saving a buffer.
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot list {}: {source}", .path.display())]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No file name")]
    NoPath,

    #[error("Buffer is read-only")]
    ReadOnly,
}

/// Prompt command failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Not an editor command: {0}")]
    UnknownCommand(String),

    #[error("Invalid substitution: {0}")]
    InvalidSubstitution(String),

    #[error("Unsupported substitution flag: {0}")]
    UnsupportedFlag(char),

    #[error("No write since last change (add ! to override)")]
    UnsavedChanges,

    #[error("Argument required: {0}")]
    MissingArgument(&'static str),

    #[error("Pattern not found: {0}")]
    PatternNotFound(String),
}

/// Anything a prompt command can fail with.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Buffer(#[from] BufferError),
}
