//! Background syntax tokenizer.
//!
//! A hand-rolled scanner per language family turns a snapshot of buffer
//! text into a flat list of [`Token`]s. Passes run on a worker thread; the
//! interactive side polls once per frame and swaps the finished list in.
//!
//! # Handoff
//!
//! ```text
//! start(snapshot) ──spawn──▶ worker: lex, checking `cancel` between tokens
//!                                   └─ store done = true
//! poll() ── done? ──▶ join ──▶ Some(tokens)
//! ```
//!
//! At most one pass is in flight per tokenizer. Dropping the tokenizer
//! raises `cancel` and joins the worker.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use crate::position::Position;

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Normal,
    Keyword,
    Comment,
    String,
    Punct,
    Number,
}

/// A half-open span `[start, end)` of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start: Position,
    pub end: Position,
    pub kind: TokenKind,
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Lexer family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// `//` and `/* */` comments.
    CLike,
    /// `--` and `--[[ ]]` comments, `[[ ]]` strings.
    LuaLike,
}

const C_KEYWORDS: &[&str] = &[
    "as", "auto", "break", "case", "catch", "char", "class", "const", "continue", "default",
    "defer", "delete", "do", "double", "else", "enum", "export", "extern", "false", "float",
    "fn", "for", "func", "function", "go", "if", "impl", "import", "in", "int", "interface",
    "let", "long", "loop", "match", "mod", "mut", "namespace", "new", "null", "nullptr",
    "package", "private", "protected", "pub", "public", "return", "self", "short", "signed",
    "sizeof", "static", "struct", "switch", "template", "this", "throw", "trait", "true", "try",
    "type", "typedef", "union", "unsigned", "use", "using", "var", "virtual", "void",
    "volatile", "where", "while",
];

const LUA_KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if",
    "in", "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

impl Language {
    /// Pick a lexer from the file extension; `None` means plain text.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "c" | "h" | "cpp" | "hpp" | "cc" | "cxx" | "rs" | "js" | "ts" | "java" | "go"
            | "cs" | "zig" => Some(Self::CLike),
            "lua" => Some(Self::LuaLike),
            _ => None,
        }
    }

    #[must_use]
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::CLike => C_KEYWORDS,
            Self::LuaLike => LUA_KEYWORDS,
        }
    }

    const fn line_comment(self) -> &'static str {
        match self {
            Self::CLike => "//",
            Self::LuaLike => "--",
        }
    }

    const fn block_comment(self) -> (&'static str, &'static str) {
        match self {
            Self::CLike => ("/*", "*/"),
            Self::LuaLike => ("--[[", "]]"),
        }
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

/// Char cursor that tracks line and column as it advances.
struct Scanner {
    chars: Vec<char>,
    i: usize,
    pos: Position,
}

impl Scanner {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            i: 0,
            pos: Position::ZERO,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.i).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.i + ahead).copied()
    }

    fn at_end(&self) -> bool {
        self.i >= self.chars.len()
    }

    fn starts_with(&self, lit: &str) -> bool {
        lit.chars()
            .enumerate()
            .all(|(k, c)| self.chars.get(self.i + k) == Some(&c))
    }

    fn bump(&mut self) {
        if let Some(ch) = self.peek() {
            self.i += 1;
            if ch == '\n' {
                self.pos.line += 1;
                self.pos.col = 0;
            } else {
                self.pos.col += 1;
            }
        }
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    /// Advance past `close`, or to the end of input if it never comes.
    fn bump_through(&mut self, close: &str) {
        while !self.at_end() {
            if self.starts_with(close) {
                self.bump_n(close.chars().count());
                return;
            }
            self.bump();
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_ident(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn is_punct(ch: char) -> bool {
    ch.is_ascii_punctuation() && ch != '"' && ch != '\'' && ch != '_'
}

/// Lex `source` in one pass. Returns `None` if `cancel` was raised.
#[must_use]
pub fn tokenize(source: &str, language: Language, cancel: &AtomicBool) -> Option<Vec<Token>> {
    let mut sc = Scanner::new(source);
    let mut tokens = Vec::new();
    let (block_open, block_close) = language.block_comment();
    let line_comment = language.line_comment();

    while !sc.at_end() {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        let Some(ch) = sc.peek() else { break };
        let start = sc.pos;

        let kind = if ch.is_whitespace() {
            sc.bump_while(char::is_whitespace);
            None
        } else if sc.starts_with(block_open) {
            sc.bump_n(block_open.chars().count());
            sc.bump_through(block_close);
            Some(TokenKind::Comment)
        } else if sc.starts_with(line_comment) {
            sc.bump_while(|c| c != '\n');
            Some(TokenKind::Comment)
        } else if ch == '"' || ch == '\'' {
            sc.bump();
            lex_quoted(&mut sc, ch);
            Some(TokenKind::String)
        } else if language == Language::LuaLike && sc.starts_with("[[") {
            sc.bump_n(2);
            sc.bump_through("]]");
            Some(TokenKind::String)
        } else if ch.is_ascii_digit() {
            sc.bump_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
            Some(TokenKind::Number)
        } else if is_ident_start(ch) {
            let from = sc.i;
            sc.bump_while(is_ident);
            let word: String = sc.chars[from..sc.i].iter().collect();
            if language.keywords().contains(&word.as_str()) {
                Some(TokenKind::Keyword)
            } else {
                Some(TokenKind::Normal)
            }
        } else if is_punct(ch) {
            sc.bump();
            while sc.peek().is_some_and(is_punct)
                && !sc.starts_with(line_comment)
                && !sc.starts_with(block_open)
                && !(language == Language::LuaLike && sc.starts_with("[["))
            {
                sc.bump();
            }
            Some(TokenKind::Punct)
        } else {
            sc.bump();
            None
        };

        if let Some(kind) = kind {
            tokens.push(Token {
                start,
                end: sc.pos,
                kind,
            });
        }
    }

    Some(tokens)
}

/// Consume a quoted string body after the opening quote. Backslash escapes
/// the next char; a line break ends an unterminated string.
fn lex_quoted(sc: &mut Scanner, quote: char) {
    while let Some(ch) = sc.peek() {
        match ch {
            '\\' => sc.bump_n(2),
            '\n' => return,
            c if c == quote => {
                sc.bump();
                return;
            }
            _ => sc.bump(),
        }
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

struct Pass {
    handle: JoinHandle<Option<Vec<Token>>>,
    done: Arc<AtomicBool>,
    cancel: Arc<AtomicBool>,
}

/// Owns at most one in-flight lexing pass.
pub struct Tokenizer {
    language: Language,
    pass: Option<Pass>,
}

impl Tokenizer {
    #[must_use]
    pub const fn new(language: Language) -> Self {
        Self {
            language,
            pass: None,
        }
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// True while a pass is running or finished but not yet collected.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.pass.is_some()
    }

    /// Start lexing `snapshot` on a worker. Returns `false` (and does
    /// nothing) if a pass is already in flight.
    pub fn start(&mut self, snapshot: String) -> bool {
        if self.pass.is_some() {
            return false;
        }
        let done = Arc::new(AtomicBool::new(false));
        let cancel = Arc::new(AtomicBool::new(false));
        let language = self.language;
        let worker_done = Arc::clone(&done);
        let worker_cancel = Arc::clone(&cancel);
        let handle = thread::spawn(move || {
            let tokens = tokenize(&snapshot, language, &worker_cancel);
            worker_done.store(true, Ordering::Release);
            tokens
        });
        debug!(?language, "tokenizer pass started");
        self.pass = Some(Pass {
            handle,
            done,
            cancel,
        });
        true
    }

    /// Collect a finished pass without blocking.
    pub fn poll(&mut self) -> Option<Vec<Token>> {
        let finished = self
            .pass
            .as_ref()
            .is_some_and(|p| p.done.load(Ordering::Acquire));
        if finished { self.join() } else { None }
    }

    /// Block until the current pass finishes and collect it.
    pub fn wait(&mut self) -> Option<Vec<Token>> {
        self.join()
    }

    /// Raise the cancel flag and join the worker, discarding its result.
    pub fn cancel(&mut self) {
        if let Some(pass) = &self.pass {
            pass.cancel.store(true, Ordering::Relaxed);
        }
        let _ = self.join();
    }

    fn join(&mut self) -> Option<Vec<Token>> {
        let pass = self.pass.take()?;
        match pass.handle.join() {
            Ok(tokens) => {
                debug!(
                    count = tokens.as_ref().map_or(0, Vec::len),
                    "tokenizer pass collected"
                );
                tokens
            }
            Err(_) => {
                error!("tokenizer worker panicked");
                None
            }
        }
    }
}

impl Drop for Tokenizer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("language", &self.language)
            .field("busy", &self.is_busy())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
