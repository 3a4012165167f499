// SPDX-License-Identifier: MIT
//
// jot: a modal text editor core, driven headless from key scripts.
//
// The binary wires together:
//
//   jot-editor → buffers, history, motions, search, tokenizer
//   keys       → vim-style key notation (`ihello<Esc>:w<CR>`)
//   logging    → tracing subscriber for stderr and an optional log file
//
// Each script step flows through:
//
//   parse → on_typed / on_pressed → update(frame) → notices on stderr
//
// When the script ends the driver waits for every tokenizer pass to land and
// optionally prints the focused document.

mod keys;
mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use jot_editor::notice::NoticeKind;
use jot_editor::{Config, Editor};
use tracing::{debug, info, warn};

use crate::keys::Input;

/// Time handed to `Editor::update` after every key.
const FRAME: Duration = Duration::from_millis(16);

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "jot", version, about = "Modal text editor core driven by key scripts")]
struct Cli {
    /// File or directory to open.
    path: Option<PathBuf>,

    /// Keys to feed the editor, in vim notation (`ihello<Esc>:w<CR>`).
    #[arg(short, long, value_name = "SCRIPT")]
    keys: Option<String>,

    /// Config file to read instead of `<config dir>/jot/config.yaml`.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the focused document to stdout when the script ends.
    #[arg(short, long)]
    print: bool,
}

// ─── Configuration ──────────────────────────────────────────────────────────

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jot").join("config.yaml"))
}

/// Load the configuration. A file named on the command line must parse;
/// problems with the default file only produce a warning, returned so it
/// can be logged once the subscriber is up.
fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<String>)> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse config {}", path.display()))?;
        return Ok((config, None));
    }

    let Some(path) = default_config_path().filter(|p| p.exists()) else {
        return Ok((Config::default(), None));
    };
    let loaded = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read config at {}: {e}", path.display()))
        .and_then(|content| {
            serde_yaml::from_str(&content)
                .map_err(|e| format!("Failed to parse config at {}: {e}", path.display()))
        });
    Ok(match loaded {
        Ok(config) => (config, None),
        Err(warning) => (Config::default(), Some(warning)),
    })
}

// ─── Driver ─────────────────────────────────────────────────────────────────

/// Feed `inputs` to the editor one frame at a time, echoing new notices.
fn drive(editor: &mut Editor, inputs: &[Input]) {
    let mut last_notice: Option<String> = None;
    for (step, input) in inputs.iter().enumerate() {
        match *input {
            Input::Typed(ch) => editor.on_typed(ch),
            Input::Pressed(key) => editor.on_pressed(key),
        }
        editor.update(FRAME);

        if let Some(notice) = editor.notices().latest() {
            if last_notice.as_deref() != Some(notice.message.as_str()) {
                let tag = match notice.kind {
                    NoticeKind::Info => "info",
                    NoticeKind::Error => "error",
                };
                eprintln!("jot: {tag}: {}", notice.message);
                last_notice = Some(notice.message.clone());
            }
        }

        if editor.should_quit() {
            debug!(step, remaining = inputs.len() - step - 1, "quit requested");
            break;
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let (config, warning) = load_config(cli.config.as_deref())?;
    let _guard = logging::init(config.log_file.as_deref())?;
    if let Some(warning) = warning {
        warn!("{warning}");
    }

    let inputs = keys::parse(cli.keys.as_deref().unwrap_or_default())
        .context("invalid key script")?;

    let mut editor = Editor::new(config);
    if let Some(path) = &cli.path {
        let scratch = editor.buffer_id();
        editor.open(path);
        editor.close(scratch);
        info!(path = %path.display(), "opened");
    }

    drive(&mut editor, &inputs);
    editor.settle();

    if cli.print {
        for line in editor.document().lines() {
            println!("{line}");
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("jot: {e:#}");
        std::process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
