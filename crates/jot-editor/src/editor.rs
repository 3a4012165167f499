//! The editor context: every buffer plus the state shared between them.
//!
//! An [`Editor`] owns its buffers in a slot-map arena addressed by
//! [`BufferId`], tracks which one has focus (and which had it before, so a
//! prompt can hand focus back), and holds the mode, the pending command,
//! the clipboard, notices and configuration.
//!
//! The host drives it with three calls:
//!
//! - [`on_typed`](Editor::on_typed) for every printable character,
//! - [`on_pressed`](Editor::on_pressed) for named keys and Ctrl chords,
//! - [`update`](Editor::update) once per frame with the elapsed time.

use std::fmt::Display;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::time::Duration;

use slotmap::{SlotMap, new_key_type};
use tracing::{debug, info, warn};

use crate::buffer::{Buffer, PromptKind};
use crate::clipboard::{Clip, Clipboard, MemoryClipboard, SystemClipboard};
use crate::command::{Command, Substitution, parse_command};
use crate::config::{ClipboardBackend, Config};
use crate::error::{CommandError, EditorError};
use crate::key::{Key, KeyCode, Modifiers};
use crate::mode::Mode;
use crate::motion::{self, Outcome};
use crate::notice::{Flash, NoticeKind, Notices};
use crate::position::{Position, Range};
use crate::runner::{CommandRunner, ShellRunner};
use crate::tokenizer::Token;

new_key_type! {
    /// Handle to a buffer in the editor's arena.
    pub struct BufferId;
}

/// An interactive `:s///c` in progress.
#[derive(Debug)]
struct Confirm {
    sub: Substitution,
    /// Match sites as found before any replacement.
    sites: Vec<Position>,
    next: usize,
    /// Column shift on one line caused by earlier replacements on it.
    shift: Option<(usize, isize)>,
    replaced: usize,
}

impl Confirm {
    fn site(&self) -> Option<Position> {
        let site = *self.sites.get(self.next)?;
        Some(match self.shift {
            Some((line, delta)) if line == site.line => {
                site.with_col(site.col.saturating_add_signed(delta))
            }
            _ => site,
        })
    }

    fn record_replacement(&mut self, line: usize) {
        let delta = char_delta(&self.sub);
        self.shift = match self.shift {
            Some((l, d)) if l == line => Some((l, d + delta)),
            _ => Some((line, delta)),
        };
        self.replaced += 1;
    }
}

#[allow(clippy::cast_possible_wrap)]
fn char_delta(sub: &Substitution) -> isize {
    sub.replacement.chars().count() as isize - sub.find_len() as isize
}

pub struct Editor {
    buffers: SlotMap<BufferId, Buffer>,
    current: BufferId,
    previous: Option<BufferId>,
    mode: Mode,
    pending: String,
    clipboard: Box<dyn Clipboard>,
    runner: Box<dyn CommandRunner>,
    notices: Notices,
    flash: Option<Flash>,
    confirm: Option<Confirm>,
    config: Config,
    quit: bool,
}

impl Editor {
    /// An editor with one empty scratch buffer, using the clipboard backend
    /// named in `config` and the platform shell.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let clipboard: Box<dyn Clipboard> = match config.clipboard {
            ClipboardBackend::System => Box::new(SystemClipboard::new()),
            ClipboardBackend::Memory => Box::new(MemoryClipboard::new()),
        };
        Self::with_services(config, clipboard, Box::new(ShellRunner::new()))
    }

    /// An editor talking to the given clipboard and command runner.
    #[must_use]
    pub fn with_services(
        config: Config,
        clipboard: Box<dyn Clipboard>,
        runner: Box<dyn CommandRunner>,
    ) -> Self {
        let mut buffers = SlotMap::with_key();
        let current = buffers.insert(Buffer::new(&config));
        Self {
            buffers,
            current,
            previous: None,
            mode: Mode::NORMAL,
            pending: String::new(),
            clipboard,
            runner,
            notices: Notices::new(),
            flash: None,
            confirm: None,
            config,
            quit: false,
        }
    }

    // -- Read-only view -----------------------------------------------------

    /// The focused buffer (a prompt while one is open).
    #[must_use]
    pub fn buffer(&self) -> &Buffer {
        &self.buffers[self.current]
    }

    #[must_use]
    pub const fn buffer_id(&self) -> BufferId {
        self.current
    }

    #[must_use]
    pub fn get(&self, id: BufferId) -> Option<&Buffer> {
        self.buffers.get(id)
    }

    /// The buffer a prompt was opened over, or the focused buffer.
    #[must_use]
    pub fn document(&self) -> &Buffer {
        let buffer = self.buffer();
        if buffer.prompt_kind().is_some() {
            if let Some(prev) = self.previous.and_then(|id| self.buffers.get(id)) {
                return prev;
            }
        }
        buffer
    }

    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.buffer().lines()
    }

    #[must_use]
    pub fn cursor(&self) -> Position {
        self.buffer().cursor()
    }

    #[must_use]
    pub fn selection(&self) -> Option<Range> {
        self.buffer().selection()
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        self.buffer().tokens()
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Command keys typed so far that have not completed yet.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.pending
    }

    #[must_use]
    pub const fn notices(&self) -> &Notices {
        &self.notices
    }

    #[must_use]
    pub const fn flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// True once the last buffer has been closed.
    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.quit
    }

    /// True while a `:s///c` is waiting for y/n/a/q.
    #[must_use]
    pub const fn is_confirming(&self) -> bool {
        self.confirm.is_some()
    }

    /// Current clipboard contents.
    pub fn clipboard(&mut self) -> Option<Clip> {
        self.clipboard.get()
    }

    // -- Buffers ------------------------------------------------------------

    pub(crate) fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffers[self.current]
    }

    fn focus(&mut self, id: BufferId) {
        if id != self.current {
            self.previous = Some(self.current);
            self.current = id;
        }
        self.pending.clear();
    }

    /// Open a file or directory in a new buffer and focus it. Load errors
    /// become notices; the buffer is still opened.
    pub fn open(&mut self, path: &Path) -> BufferId {
        self.set_mode(Mode::NORMAL);
        let mut buffer = Buffer::new(&self.config);
        if let Err(err) = buffer.load(path) {
            self.notify_error(err);
        }
        let id = self.buffers.insert(buffer);
        self.focus(id);
        id
    }

    /// Open a scratch buffer holding `lines` and focus it.
    pub fn open_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> BufferId {
        self.set_mode(Mode::NORMAL);
        let id = self.buffers.insert(Buffer::from_lines(lines, &self.config));
        self.focus(id);
        id
    }

    /// Close a buffer. Focus falls back to the previous buffer, or any
    /// other. Closing the last buffer requests quit and leaves a fresh
    /// scratch buffer so there is always one to focus.
    pub fn close(&mut self, id: BufferId) {
        let Some(mut buffer) = self.buffers.remove(id) else {
            return;
        };
        buffer.close();
        if self.previous == Some(id) {
            self.previous = None;
        }
        if self.current != id {
            return;
        }
        let next = self
            .previous
            .take()
            .filter(|prev| self.buffers.contains_key(*prev))
            .or_else(|| self.buffers.keys().next());
        self.current = match next {
            Some(next) => next,
            None => {
                info!("last buffer closed");
                self.quit = true;
                self.buffers.insert(Buffer::new(&self.config))
            }
        };
        self.pending.clear();
    }

    /// Replace the focused buffer with a freshly opened one.
    fn replace_with(&mut self, path: &Path) {
        let old = self.current;
        let previous = self.previous;
        self.open(path);
        self.close(old);
        self.previous = previous.filter(|prev| self.buffers.contains_key(*prev));
    }

    // -- Mode ---------------------------------------------------------------

    pub(crate) fn set_mode(&mut self, mode: Mode) {
        let old = self.mode;
        self.mode = mode;
        let buffer = self.buffer_mut();
        if mode == Mode::INSERT {
            buffer.break_edit();
        }
        if mode.is_visual() && !old.is_visual() {
            buffer.start_selection(mode == Mode::VISUAL_LINE);
        } else if !mode.is_visual() && old.is_visual() {
            buffer.clear_selection();
        }
        if mode != Mode::INSERT {
            buffer.clamp_cursor(false);
        }
        if old != mode {
            debug!(from = %old, to = %mode, "mode");
        }
    }

    // -- Notices ------------------------------------------------------------

    pub(crate) fn notify_info(&mut self, message: impl Display) {
        let message = message.to_string();
        debug!(%message, "notice");
        let ttl = self.config.notice_duration();
        self.notices.push(NoticeKind::Info, message, ttl);
    }

    pub(crate) fn notify_error(&mut self, message: impl Display) {
        let message = message.to_string();
        debug!(%message, "error notice");
        let ttl = self.config.notice_duration();
        self.notices.push(NoticeKind::Error, message, ttl);
    }

    // -- Shared actions -----------------------------------------------------

    /// Put `clip` on the clipboard and flash `range`, if given.
    pub(crate) fn yank(&mut self, clip: Clip, range: Option<Range>) {
        if let Some(range) = range {
            self.flash = Some(Flash::new(range, self.config.flash_duration()));
        }
        self.clipboard.set(clip);
    }

    pub(crate) fn paste(&mut self, before: bool) {
        let Some(clip) = self.clipboard.get() else {
            return;
        };
        let buffer = self.buffer_mut();
        buffer.paste(&clip, before);
        buffer.clamp_cursor(false);
    }

    pub(crate) fn undo(&mut self) {
        if !self.buffer_mut().undo() {
            self.notify_error("Already at oldest change");
        }
        let past_end = self.mode.cursor_past_end();
        self.buffer_mut().clamp_cursor(past_end);
    }

    pub(crate) fn redo(&mut self) {
        if !self.buffer_mut().redo() {
            self.notify_error("Already at newest change");
        }
        let past_end = self.mode.cursor_past_end();
        self.buffer_mut().clamp_cursor(past_end);
    }

    fn save(&mut self) -> Result<(), EditorError> {
        let buffer = self.buffer_mut();
        buffer.save()?;
        let message = format!(
            "\"{}\" {}L written",
            buffer.path().map_or_else(String::new, |p| p.display().to_string()),
            buffer.line_count()
        );
        self.notify_info(message);
        Ok(())
    }

    fn save_or_notify(&mut self) {
        if let Err(err) = self.save() {
            self.notify_error(err);
        }
    }

    // -- Prompts ------------------------------------------------------------

    pub(crate) fn open_prompt(&mut self, kind: PromptKind) {
        if self.buffer().prompt_kind().is_some() {
            self.cancel_prompt();
        }
        let id = self.buffers.insert(Buffer::prompt(kind, &self.config));
        self.focus(id);
        debug!(?kind, "prompt opened");
    }

    /// Close the focused prompt and return focus. Returns its kind and text.
    fn take_prompt(&mut self) -> Option<(PromptKind, String)> {
        let kind = self.buffer().prompt_kind()?;
        let text = self.buffer().line_text(0);
        self.close(self.current);
        Some((kind, text))
    }

    fn cancel_prompt(&mut self) {
        if let Some((kind, _)) = self.take_prompt() {
            debug!(?kind, "prompt cancelled");
        }
    }

    fn submit_prompt(&mut self) {
        let Some((kind, text)) = self.take_prompt() else {
            return;
        };
        debug!(?kind, %text, "prompt submitted");
        match kind {
            PromptKind::Command => {
                let result = parse_command(&text)
                    .map_err(EditorError::from)
                    .and_then(|cmd| self.execute(cmd));
                if let Err(err) = result {
                    self.notify_error(err);
                }
                if self.mode.is_visual() {
                    self.set_mode(Mode::NORMAL);
                }
            }
            PromptKind::Search => self.search(&text),
            PromptKind::OpenFile => {
                let path = text.trim();
                if !path.is_empty() {
                    self.open(Path::new(path));
                }
            }
            PromptKind::Compile => self.compile(&text),
        }
    }

    fn search(&mut self, pattern: &str) {
        let buffer = self.buffer_mut();
        buffer.set_search(pattern);
        if pattern.is_empty() {
            return;
        }
        if buffer.goto_next_search() {
            buffer.clamp_cursor(false);
        } else {
            self.notify_error(CommandError::PatternNotFound(pattern.to_string()));
        }
    }

    fn compile(&mut self, text: &str) {
        let command = match text.trim() {
            "" => self.config.compile_command.clone(),
            given => Some(given.to_string()),
        };
        let Some(command) = command else {
            self.notify_error(CommandError::MissingArgument("compile"));
            return;
        };
        match self.runner.run(&command) {
            Ok(()) => self.notify_info(format!("Running: {command}")),
            Err(err) => {
                warn!(%command, "spawn failed: {err}");
                self.notify_error(format!("Cannot run {command}: {err}"));
            }
        }
    }

    // -- Commands -----------------------------------------------------------

    fn execute(&mut self, command: Command) -> Result<(), EditorError> {
        match command {
            Command::Write => self.save(),
            Command::WriteAs(path) => {
                self.buffer_mut().save_as(&path)?;
                self.notify_info(format!("\"{}\" written", path.display()));
                Ok(())
            }
            Command::Quit => {
                if self.buffer().is_unsaved() {
                    return Err(CommandError::UnsavedChanges.into());
                }
                self.close(self.current);
                Ok(())
            }
            Command::ForceQuit => {
                self.close(self.current);
                Ok(())
            }
            Command::WriteQuit => {
                self.save()?;
                self.close(self.current);
                Ok(())
            }
            Command::Edit(path) => {
                self.open(&path);
                Ok(())
            }
            Command::Substitute(sub) => self.substitute(sub),
        }
    }

    fn substitute(&mut self, sub: Substitution) -> Result<(), EditorError> {
        let buffer = self.buffer();
        let (first, last) = if sub.whole_buffer {
            (0, buffer.line_count() - 1)
        } else if let Some(range) = buffer.selection() {
            (range.start.line, range.end.line)
        } else {
            let line = buffer.cursor().line;
            (line, line)
        };
        let sites = sub.sites(buffer.text(), first, last);
        if sites.is_empty() {
            return Err(CommandError::PatternNotFound(sub.find).into());
        }
        debug!(find = %sub.find, sites = sites.len(), "substitute");

        if sub.flags.confirm {
            self.buffer_mut().break_edit();
            self.confirm = Some(Confirm {
                sub,
                sites,
                next: 0,
                shift: None,
                replaced: 0,
            });
            self.show_confirm_site();
            return Ok(());
        }

        let find_len = sub.find_len();
        let buffer = self.buffer_mut();
        buffer.break_edit();
        for &site in sites.iter().rev() {
            buffer.replace_at(site, find_len, &sub.replacement);
        }
        let last_line = sites.last().map_or(first, |s| s.line);
        buffer.jump_in_edit(Position::new(last_line, 0));
        buffer.break_edit();
        buffer.goto_first_non_blank(false);
        let lines = count_lines(&sites);
        self.notify_info(format!("{} substitutions on {lines} lines", sites.len()));
        Ok(())
    }

    fn show_confirm_site(&mut self) {
        let Some(confirm) = &self.confirm else {
            return;
        };
        let Some(site) = confirm.site() else {
            self.finish_confirm();
            return;
        };
        let message = format!("replace with {} (y/n/a/q)?", confirm.sub.replacement);
        // Until something is replaced there is no edit to join, and opening
        // one would cut off the redo branch.
        if confirm.replaced == 0 {
            self.buffer_mut().goto(site, false);
        } else {
            self.buffer_mut().jump_in_edit(site);
        }
        self.notify_info(message);
    }

    fn on_confirm_key(&mut self, ch: char) {
        match ch {
            'y' => {
                self.replace_confirm_site();
                self.show_confirm_site();
            }
            'n' => {
                if let Some(confirm) = &mut self.confirm {
                    confirm.next += 1;
                }
                self.show_confirm_site();
            }
            'a' => {
                while self.confirm.as_ref().and_then(Confirm::site).is_some() {
                    self.replace_confirm_site();
                }
                self.finish_confirm();
            }
            'q' => self.finish_confirm(),
            _ => {}
        }
    }

    fn replace_confirm_site(&mut self) {
        let Some(confirm) = &mut self.confirm else {
            return;
        };
        let Some(site) = confirm.site() else {
            return;
        };
        let find_len = confirm.sub.find_len();
        let replacement = confirm.sub.replacement.clone();
        confirm.record_replacement(site.line);
        confirm.next += 1;
        self.buffer_mut().replace_at(site, find_len, &replacement);
    }

    fn finish_confirm(&mut self) {
        let Some(confirm) = self.confirm.take() else {
            return;
        };
        let buffer = self.buffer_mut();
        buffer.break_edit();
        buffer.clamp_cursor(false);
        self.notify_info(format!("{} substitutions", confirm.replaced));
    }

    // -- Directory navigation -----------------------------------------------

    fn open_entry(&mut self) {
        let buffer = self.buffer();
        let Some(dir) = buffer.path().map(Path::to_path_buf) else {
            return;
        };
        let entry = buffer.line_text(buffer.cursor().line);
        let target = if entry == ".." {
            parent_of(&dir)
        } else {
            dir.join(entry.trim_end_matches(MAIN_SEPARATOR))
        };
        self.replace_with(&target);
    }

    fn open_parent(&mut self) {
        let Some(dir) = self.buffer().path().map(Path::to_path_buf) else {
            return;
        };
        self.replace_with(&parent_of(&dir));
    }

    /// Ctrl+Shift+O: the directory holding the focused file.
    fn open_containing_directory(&mut self) {
        let buffer = self.document();
        let dir = match buffer.path() {
            Some(path) if buffer.is_directory() => path.to_path_buf(),
            Some(path) => path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
            None => PathBuf::from("."),
        };
        if self.buffer().prompt_kind().is_some() {
            self.cancel_prompt();
        }
        self.open(&dir);
    }

    // -- Input --------------------------------------------------------------

    /// A printable character. Inserted in Insert mode and prompts, fed to
    /// the motion engine otherwise.
    pub fn on_typed(&mut self, ch: char) {
        if self.confirm.is_some() {
            self.on_confirm_key(ch);
            return;
        }
        if self.buffer().prompt_kind().is_some() || self.mode == Mode::INSERT {
            self.buffer_mut().insert(ch);
            return;
        }
        if ch == '-' && self.pending.is_empty() && self.buffer().is_directory() {
            self.open_parent();
            return;
        }

        self.pending.push(ch);
        let command = self.pending.clone();
        match motion::dispatch(self, &command) {
            Outcome::Done => self.pending.clear(),
            Outcome::Pending => motion::retain_viable(&mut self.pending, self.mode),
        }
    }

    /// A named key or a modifier chord.
    pub fn on_pressed(&mut self, key: Key) {
        if self.confirm.is_some() {
            if key.code == KeyCode::Escape {
                self.finish_confirm();
            }
            return;
        }
        if key.modifiers.contains(Modifiers::CTRL) {
            self.pending.clear();
            self.on_chord(key);
            return;
        }

        let in_prompt = self.buffer().prompt_kind().is_some();
        let typing = in_prompt || self.mode == Mode::INSERT;
        let past_end = typing;
        match key.code {
            KeyCode::Escape => self.on_escape(),
            KeyCode::Enter if in_prompt => self.submit_prompt(),
            KeyCode::Enter if self.buffer().is_directory() => self.open_entry(),
            KeyCode::Enter if typing => self.buffer_mut().insert('\n'),
            KeyCode::Enter => self.buffer_mut().move_y(1, false),
            KeyCode::Backspace if typing => self.buffer_mut().backspace(),
            KeyCode::Backspace => self.buffer_mut().move_x(-1, false),
            KeyCode::Delete => {
                let buffer = self.buffer_mut();
                if !typing {
                    buffer.break_edit();
                }
                buffer.delete_forward();
                buffer.clamp_cursor(past_end);
            }
            KeyCode::Tab if typing => {
                let width = self.config.indent_width();
                let buffer = self.buffer_mut();
                let spaces = width - buffer.cursor().col % width;
                buffer.insert_str(&" ".repeat(spaces));
            }
            KeyCode::Left => self.buffer_mut().move_x(-1, past_end),
            KeyCode::Right => self.buffer_mut().move_x(1, past_end),
            KeyCode::Up if !in_prompt => self.buffer_mut().move_y(-1, past_end),
            KeyCode::Down if !in_prompt => self.buffer_mut().move_y(1, past_end),
            _ => {}
        }
    }

    fn on_chord(&mut self, key: Key) {
        if key.modifiers == Modifiers::CTRL | Modifiers::SHIFT && key.code == KeyCode::Char('o') {
            self.open_containing_directory();
            return;
        }
        let KeyCode::Char(ch) = key.code else {
            return;
        };
        if key.modifiers != Modifiers::CTRL {
            return;
        }
        match ch {
            's' => self.save_or_notify(),
            'z' => self.undo(),
            'r' | 'y' => self.redo(),
            'f' => self.open_prompt(PromptKind::Search),
            'o' => self.open_prompt(PromptKind::OpenFile),
            'b' => self.open_prompt(PromptKind::Compile),
            _ => {}
        }
    }

    fn on_escape(&mut self) {
        self.pending.clear();
        if self.buffer().prompt_kind().is_some() {
            self.cancel_prompt();
            return;
        }
        self.buffer_mut().move_x(-1, true);
        self.set_mode(Mode::NORMAL);
    }

    // -- Frame --------------------------------------------------------------

    /// Advance timers and service every buffer's search and tokenizer.
    pub fn update(&mut self, elapsed: Duration) {
        self.notices.tick(elapsed);
        if let Some(flash) = &mut self.flash {
            if !flash.tick(elapsed) {
                self.flash = None;
            }
        }
        for buffer in self.buffers.values_mut() {
            buffer.update();
        }
    }

    /// Wait until every buffer's tokens match its text.
    pub fn settle(&mut self) {
        for buffer in self.buffers.values_mut() {
            buffer.settle();
        }
    }
}

fn parent_of(dir: &Path) -> PathBuf {
    dir.parent().map_or_else(|| dir.join(".."), Path::to_path_buf)
}

fn count_lines(sites: &[Position]) -> usize {
    let mut lines: Vec<usize> = sites.iter().map(|s| s.line).collect();
    lines.dedup();
    lines.len()
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("buffers", &self.buffers.len())
            .field("current", &self.current)
            .field("mode", &self.mode)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
