//! Prompt mini-language: the text typed after `:`.
//!
//! # Supported commands
//!
//! | Command                | Action                                   |
//! |------------------------|------------------------------------------|
//! | `:w`                   | Save to the buffer's path                |
//! | `:w <path>`            | Save to a new path                       |
//! | `:q`                   | Close (refused on unsaved changes)       |
//! | `:q!`                  | Close, discarding changes                |
//! | `:wq`                  | Save, then close                         |
//! | `:e <path>`            | Open a file or directory                 |
//! | `:s/find/repl/[g][c]`  | Substitute in the selection or line      |
//! | `:%s/find/repl/[g][c]` | Substitute in every line                 |
//!
//! A `%` leading the find field (`:s/%foo/bar/`) also selects every line.
//! Matching is literal. `\<delim>` escapes the delimiter in either field.
//!
//! # Flags
//!
//! | Flag | Effect                                  |
//! |------|-----------------------------------------|
//! | `g`  | Replace every match on a line           |
//! | `c`  | Ask before each replacement             |

use std::path::PathBuf;

use crate::error::CommandError;
use crate::position::Position;
use crate::search::find_in_line;
use crate::text::Text;

// ---------------------------------------------------------------------------
// Substitution
// ---------------------------------------------------------------------------

/// Flags for `:s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubFlags {
    /// `g`: every match on each line, not just the first.
    pub global: bool,
    /// `c`: confirm each match.
    pub confirm: bool,
}

/// A parsed `:s` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// `%` given: every line of the buffer.
    pub whole_buffer: bool,
    pub find: String,
    pub replacement: String,
    pub flags: SubFlags,
}

impl Substitution {
    /// Match sites in lines `first..=last`, in document order.
    #[must_use]
    pub fn sites(&self, text: &Text, first: usize, last: usize) -> Vec<Position> {
        let last = last.min(text.line_count().saturating_sub(1));
        let mut sites = Vec::new();
        for line in first..=last {
            let cols = find_in_line(&text.line_text(line), &self.find);
            let cols = if self.flags.global {
                cols.as_slice()
            } else {
                &cols[..cols.len().min(1)]
            };
            sites.extend(cols.iter().map(|&col| Position::new(line, col)));
        }
        sites
    }

    /// Length of the find string in chars.
    #[must_use]
    pub fn find_len(&self) -> usize {
        self.find.chars().count()
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A parsed prompt command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `:w`
    Write,
    /// `:w <path>`
    WriteAs(PathBuf),
    /// `:q`
    Quit,
    /// `:q!`
    ForceQuit,
    /// `:wq`
    WriteQuit,
    /// `:e <path>`
    Edit(PathBuf),
    /// `:[%]s/find/replacement/[flags]`
    Substitute(Substitution),
}

/// Parse prompt text (without the leading `:`).
///
/// # Errors
///
/// Unknown commands, `:e` without a path, malformed substitutions and
/// unsupported substitution flags.
pub fn parse_command(input: &str) -> Result<Command, CommandError> {
    let trimmed = input.trim();

    let (whole_buffer, rest) = trimmed
        .strip_prefix('%')
        .map_or((false, trimmed), |rest| (true, rest));
    if let Some(body) = rest.strip_prefix('s') {
        if body.is_empty() || body.starts_with(is_delimiter) {
            return parse_substitute(whole_buffer, body).map(Command::Substitute);
        }
    }
    if whole_buffer {
        return Err(CommandError::UnknownCommand(trimmed.to_string()));
    }

    let (cmd, arg) = trimmed
        .find(char::is_whitespace)
        .map_or((trimmed, ""), |pos| {
            (&trimmed[..pos], trimmed[pos..].trim_start())
        });

    match cmd {
        "w" if arg.is_empty() => Ok(Command::Write),
        "w" => Ok(Command::WriteAs(PathBuf::from(arg))),
        "q" => Ok(Command::Quit),
        "q!" => Ok(Command::ForceQuit),
        "wq" => Ok(Command::WriteQuit),
        "e" if arg.is_empty() => Err(CommandError::MissingArgument("e")),
        "e" => Ok(Command::Edit(PathBuf::from(arg))),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

fn is_delimiter(ch: char) -> bool {
    !ch.is_alphanumeric() && !ch.is_whitespace() && ch != '\\' && ch != '"'
}

/// Parse everything after the `s`: `<d>find<d>replacement[<d>flags]`.
fn parse_substitute(mut whole_buffer: bool, body: &str) -> Result<Substitution, CommandError> {
    let malformed = || CommandError::InvalidSubstitution(format!("s{body}"));

    let mut chars = body.chars();
    let delim = chars.next().ok_or_else(malformed)?;
    let after_delim = chars.as_str();

    let (find, rest) = split_at_unescaped(after_delim, delim).ok_or_else(malformed)?;
    let (replacement, flags) = split_at_unescaped(rest, delim).unwrap_or((rest, ""));

    let mut find = unescape_delim(find, delim);
    if let Some(stripped) = find.strip_prefix('%') {
        find = stripped.to_string();
        whole_buffer = true;
    }
    if find.is_empty() {
        return Err(malformed());
    }

    Ok(Substitution {
        whole_buffer,
        find,
        replacement: unescape_delim(replacement, delim),
        flags: parse_sub_flags(flags)?,
    })
}

/// Split at the first unescaped `delim`. `\<delim>` is not a split point.
fn split_at_unescaped(s: &str, delim: char) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (byte_idx, ch) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == delim {
            return Some((&s[..byte_idx], &s[byte_idx + ch.len_utf8()..]));
        }
    }
    None
}

/// `\<delim>` → `<delim>`; every other `\X` passes through unchanged.
fn unescape_delim(s: &str, delim: char) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' && chars.peek() == Some(&delim) {
            result.push(delim);
            chars.next();
            continue;
        }
        result.push(ch);
    }
    result
}

fn parse_sub_flags(s: &str) -> Result<SubFlags, CommandError> {
    let mut flags = SubFlags::default();
    for ch in s.trim().chars() {
        match ch {
            'g' => flags.global = true,
            'c' => flags.confirm = true,
            other => return Err(CommandError::UnsupportedFlag(other)),
        }
    }
    Ok(flags)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sub(input: &str) -> Substitution {
        match parse_command(input) {
            Ok(Command::Substitute(s)) => s,
            other => panic!("expected a substitution, got {other:?}"),
        }
    }

    // -- Standard commands --------------------------------------------------

    #[test]
    fn parse_write() {
        assert_eq!(parse_command("w"), Ok(Command::Write));
        assert_eq!(
            parse_command("w /tmp/my file.txt"),
            Ok(Command::WriteAs(PathBuf::from("/tmp/my file.txt")))
        );
    }

    #[test]
    fn parse_quit_variants() {
        assert_eq!(parse_command("q"), Ok(Command::Quit));
        assert_eq!(parse_command("  q!  "), Ok(Command::ForceQuit));
        assert_eq!(parse_command("wq"), Ok(Command::WriteQuit));
    }

    #[test]
    fn parse_edit() {
        assert_eq!(
            parse_command("e src/main.rs"),
            Ok(Command::Edit(PathBuf::from("src/main.rs")))
        );
        assert_eq!(parse_command("e"), Err(CommandError::MissingArgument("e")));
    }

    #[test]
    fn parse_unknown() {
        assert_eq!(
            parse_command("foobar"),
            Err(CommandError::UnknownCommand("foobar".into()))
        );
        assert_eq!(
            parse_command(""),
            Err(CommandError::UnknownCommand(String::new()))
        );
        assert_eq!(
            parse_command("%w"),
            Err(CommandError::UnknownCommand("%w".into()))
        );
    }

    #[test]
    fn word_starting_with_s_is_not_a_substitution() {
        assert_eq!(
            parse_command("set"),
            Err(CommandError::UnknownCommand("set".into()))
        );
    }

    // -- Substitution -------------------------------------------------------

    #[test]
    fn substitute_current_line() {
        let s = sub("s/foo/bar/");
        assert!(!s.whole_buffer);
        assert_eq!(s.find, "foo");
        assert_eq!(s.replacement, "bar");
        assert_eq!(s.flags, SubFlags::default());
    }

    #[test]
    fn substitute_percent_prefix_and_find_field() {
        assert!(sub("%s/foo/bar/g").whole_buffer);
        let s = sub("s/%foo/bar/g");
        assert!(s.whole_buffer);
        assert_eq!(s.find, "foo");
        assert!(s.flags.global);
    }

    #[test]
    fn substitute_flags() {
        let s = sub("s/a/b/gc");
        assert!(s.flags.global);
        assert!(s.flags.confirm);
        assert_eq!(
            parse_command("s/a/b/gi"),
            Err(CommandError::UnsupportedFlag('i'))
        );
    }

    #[test]
    fn substitute_without_trailing_delimiter() {
        let s = sub("s/a/b");
        assert_eq!(s.replacement, "b");
        assert_eq!(s.flags, SubFlags::default());
    }

    #[test]
    fn substitute_escaped_and_custom_delimiters() {
        let s = sub(r"s/a\/b/c/");
        assert_eq!(s.find, "a/b");
        let s = sub("s#/usr#/opt#g");
        assert_eq!(s.find, "/usr");
        assert_eq!(s.replacement, "/opt");
    }

    #[test]
    fn substitute_malformed() {
        assert!(matches!(
            parse_command("s"),
            Err(CommandError::InvalidSubstitution(_))
        ));
        assert!(matches!(
            parse_command("s/foo"),
            Err(CommandError::InvalidSubstitution(_))
        ));
        assert!(matches!(
            parse_command("s//bar/"),
            Err(CommandError::InvalidSubstitution(_))
        ));
        assert!(matches!(
            parse_command("s/%/bar/"),
            Err(CommandError::InvalidSubstitution(_))
        ));
    }

    // -- Match sites --------------------------------------------------------

    #[test]
    fn sites_first_per_line_or_all() {
        let text = Text::from_lines(&["foo foo", "bar", "xfoo"]);
        let s = sub("s/foo/bar/");
        assert_eq!(
            s.sites(&text, 0, 2),
            vec![Position::new(0, 0), Position::new(2, 1)]
        );
        let g = sub("s/foo/bar/g");
        assert_eq!(
            g.sites(&text, 0, 2),
            vec![Position::new(0, 0), Position::new(0, 4), Position::new(2, 1)]
        );
        assert_eq!(g.sites(&text, 1, 99), vec![Position::new(2, 1)]);
        assert_eq!(g.find_len(), 3);
    }
}
