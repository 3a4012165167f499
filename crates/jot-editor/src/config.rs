//! Editor configuration.
//!
//! Every field has a default, so a config file only names what it changes:
//!
//! ```yaml
//! tab_width: 2
//! compile_command: cargo build
//! clipboard: memory
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which clipboard backend the editor talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardBackend {
    /// The OS clipboard.
    #[default]
    System,
    /// A process-local clipboard.
    Memory,
}

/// User preferences read at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Columns per indent unit; backspace removes a whole unit of spaces.
    pub tab_width: usize,
    /// Edits kept for undo per buffer.
    pub history_limit: usize,
    /// Lines visible in the viewport.
    pub view_rows: usize,
    /// Lines kept between the cursor and the viewport edge.
    pub scroll_off: usize,
    pub notice_duration_ms: u64,
    pub flash_duration_ms: u64,
    /// Shell command run by the compile prompt when it is submitted empty.
    pub compile_command: Option<String>,
    pub clipboard: ClipboardBackend,
    /// Also write logs to this file.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tab_width: 4,
            history_limit: 1000,
            view_rows: 25,
            scroll_off: 5,
            notice_duration_ms: 3000,
            flash_duration_ms: 250,
            compile_command: None,
            clipboard: ClipboardBackend::System,
            log_file: None,
        }
    }
}

impl Config {
    #[must_use]
    pub const fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }

    #[must_use]
    pub const fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_duration_ms)
    }

    /// Indent width, never zero.
    #[must_use]
    pub fn indent_width(&self) -> usize {
        self.tab_width.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.tab_width, 4);
        assert_eq!(c.history_limit, 1000);
        assert_eq!(c.notice_duration(), Duration::from_secs(3));
        assert_eq!(c.clipboard, ClipboardBackend::System);
    }

    #[test]
    fn zero_tab_width_still_indents() {
        let c = Config {
            tab_width: 0,
            ..Config::default()
        };
        assert_eq!(c.indent_width(), 1);
    }
}
