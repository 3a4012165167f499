// SPDX-License-Identifier: MIT
//
// Key scripts: vim-style notation for driving the editor without a terminal.
//
//   ihello<Esc>:w<CR>      type "hello", leave Insert mode, save
//   <C-z><C-S-o>           Ctrl+Z, then Ctrl+Shift+O
//   a<lt>b<Esc>            type "a<b"
//
// Plain characters are typed; `<Name>` is a named key. A `<` that does not
// start a complete `<...>` group is typed literally.

use anyhow::{Result, bail};
use jot_editor::{Key, KeyCode};

/// One step of a key script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A printable character, fed to `on_typed`.
    Typed(char),
    /// A named key or chord, fed to `on_pressed`.
    Pressed(Key),
}

/// Parse a key script.
///
/// # Errors
///
/// Fails on a `<...>` group that names no known key.
pub fn parse(script: &str) -> Result<Vec<Input>> {
    let mut inputs = Vec::new();
    let mut rest = script;
    while let Some(ch) = rest.chars().next() {
        if ch == '<' {
            if let Some(end) = rest.find('>') {
                let name = &rest[1..end];
                if !name.is_empty() && !name.contains('<') {
                    inputs.push(named(name)?);
                    rest = &rest[end + 1..];
                    continue;
                }
            }
        }
        inputs.push(match ch {
            '\n' => Input::Pressed(Key::plain(KeyCode::Enter)),
            '\t' => Input::Pressed(Key::plain(KeyCode::Tab)),
            '\r' => {
                rest = &rest[1..];
                continue;
            }
            c => Input::Typed(c),
        });
        rest = &rest[ch.len_utf8()..];
    }
    Ok(inputs)
}

fn named(name: &str) -> Result<Input> {
    let code = match name.to_ascii_lowercase().as_str() {
        "lt" => return Ok(Input::Typed('<')),
        "esc" => KeyCode::Escape,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "bs" => KeyCode::Backspace,
        "del" => KeyCode::Delete,
        "tab" => KeyCode::Tab,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        _ => return chord(name),
    };
    Ok(Input::Pressed(Key::plain(code)))
}

/// `C-x` and `C-S-x`.
fn chord(name: &str) -> Result<Input> {
    let lower = name.to_ascii_lowercase();
    let (shift, tail) = if let Some(tail) = lower.strip_prefix("c-s-") {
        (true, tail)
    } else if let Some(tail) = lower.strip_prefix("c-") {
        (false, tail)
    } else {
        bail!("unknown key <{name}>");
    };
    let mut chars = tail.chars();
    let (Some(ch), None) = (chars.next(), chars.next()) else {
        bail!("unknown key <{name}>");
    };
    Ok(Input::Pressed(if shift {
        Key::ctrl_shift(ch)
    } else {
        Key::ctrl(ch)
    }))
}

// ─── Tests ──────────────────────────────────────────────────────────────────
