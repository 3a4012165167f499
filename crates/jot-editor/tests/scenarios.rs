//! End-to-end key sequences driven through the public `Editor` API.

use std::fs;
use std::time::Duration;

use jot_editor::clipboard::ClipKind;
use jot_editor::{
    ClipboardBackend, Config, Editor, Key, KeyCode, MemoryClipboard, Mode, Position,
    RecordingRunner, ShellRunner,
};
use pretty_assertions::assert_eq;

const FRAME: Duration = Duration::from_millis(16);

fn editor() -> Editor {
    let config = Config {
        clipboard: ClipboardBackend::Memory,
        ..Config::default()
    };
    Editor::with_services(
        config,
        Box::new(MemoryClipboard::new()),
        Box::new(RecordingRunner::default()),
    )
}

fn editor_with(lines: &[&str]) -> Editor {
    let mut ed = editor();
    ed.open_lines(lines);
    ed
}

fn typed(ed: &mut Editor, keys: &str) {
    for ch in keys.chars() {
        ed.on_typed(ch);
        ed.update(FRAME);
    }
}

fn press(ed: &mut Editor, code: KeyCode) {
    ed.on_pressed(Key::plain(code));
    ed.update(FRAME);
}

// -- Scenarios ----------------------------------------------------------------

#[test]
fn type_escape_undo_restores_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "").unwrap();

    let mut ed = editor();
    ed.open(&path);
    typed(&mut ed, "ihello");
    assert_eq!(ed.mode(), Mode::INSERT);
    assert_eq!(ed.lines(), vec!["hello"]);

    press(&mut ed, KeyCode::Escape);
    assert_eq!(ed.mode(), Mode::NORMAL);
    typed(&mut ed, "u");

    assert_eq!(ed.lines(), vec![""]);
    assert_eq!(ed.cursor(), Position::new(0, 0));
}

#[test]
fn dd_removes_line_onto_clipboard() {
    let mut ed = editor_with(&["one", "two", "three"]);
    typed(&mut ed, "j");
    assert_eq!(ed.cursor().line, 1);

    typed(&mut ed, "dd");

    assert_eq!(ed.lines(), vec!["one", "three"]);
    let clip = ed.clipboard().unwrap();
    assert_eq!(clip.text, "two\n");
    assert_eq!(clip.kind, ClipKind::Line);
    assert_eq!(ed.pending(), "");
}

#[test]
fn gg_d_capital_g_empties_buffer() {
    let mut ed = editor_with(&["alpha", "beta", "gamma", "delta"]);
    typed(&mut ed, "jj");
    typed(&mut ed, "ggdG");

    assert_eq!(ed.lines(), vec![""]);
    assert_eq!(ed.cursor(), Position::new(0, 0));
}

#[test]
fn search_visits_matches_in_row_major_order() {
    let mut ed = editor_with(&["alpha", "beta", "foo here", "x", "y", "a foo b foo"]);

    ed.on_pressed(Key::ctrl('f'));
    typed(&mut ed, "foo");
    press(&mut ed, KeyCode::Enter);
    assert_eq!(ed.cursor(), Position::new(2, 0));

    typed(&mut ed, "n");
    assert_eq!(ed.cursor(), Position::new(5, 2));
    typed(&mut ed, "n");
    assert_eq!(ed.cursor(), Position::new(5, 8));
    typed(&mut ed, "N");
    assert_eq!(ed.cursor(), Position::new(5, 2));
}

#[test]
fn substitute_whole_buffer_with_and_without_g() {
    let lines = ["foo foo", "bar foo", "none"];

    let mut ed = editor_with(&lines);
    typed(&mut ed, ":s/%foo/bar/g");
    press(&mut ed, KeyCode::Enter);
    assert_eq!(ed.lines(), vec!["bar bar", "bar bar", "none"]);

    let mut ed = editor_with(&lines);
    typed(&mut ed, ":s/%foo/bar/");
    press(&mut ed, KeyCode::Enter);
    assert_eq!(ed.lines(), vec!["bar foo", "bar bar", "none"]);

    typed(&mut ed, "u");
    assert_eq!(ed.lines(), vec!["foo foo", "bar foo", "none"]);
}

#[test]
fn yanked_line_break_pastes_inline() {
    let mut ed = editor_with(&["ab", "", "c"]);
    typed(&mut ed, "jvy");
    let clip = ed.clipboard().unwrap();
    assert_eq!(clip.text, "\n");
    assert_eq!(clip.kind, ClipKind::Char);

    typed(&mut ed, "ggp");
    assert_eq!(ed.lines(), vec!["a", "b", "", "c"]);
}

#[test]
fn cancelled_confirm_substitute_keeps_history() {
    let mut ed = editor_with(&["foo"]);
    typed(&mut ed, "xu");
    typed(&mut ed, ":s/foo/bar/c");
    press(&mut ed, KeyCode::Enter);
    typed(&mut ed, "q");
    assert_eq!(ed.lines(), vec!["foo"]);

    ed.on_pressed(Key::ctrl('r'));
    assert_eq!(ed.lines(), vec!["oo"]);
    ed.on_pressed(Key::ctrl('z'));
    assert_eq!(ed.lines(), vec!["foo"]);
}

#[cfg(not(windows))]
#[test]
fn compile_command_runs_past_editor_exit() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("built");
    let config = Config {
        clipboard: ClipboardBackend::Memory,
        ..Config::default()
    };
    let mut ed = Editor::with_services(
        config,
        Box::new(MemoryClipboard::new()),
        Box::new(ShellRunner::new()),
    );
    ed.on_pressed(Key::ctrl('b'));
    typed(&mut ed, &format!("sleep 0.3; touch '{}'", marker.display()));
    press(&mut ed, KeyCode::Enter);
    drop(ed);

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while !marker.exists() && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(50));
    }
    assert!(marker.exists());
}

// -- Properties ---------------------------------------------------------------

#[test]
fn undo_redo_round_trip_restores_text_and_cursor() {
    let mut ed = editor_with(&["fn main"]);
    typed(&mut ed, "A() {}");
    press(&mut ed, KeyCode::Escape);
    let after = (ed.lines(), ed.cursor());

    ed.on_pressed(Key::ctrl('z'));
    assert_eq!(ed.lines(), vec!["fn main"]);
    ed.on_pressed(Key::ctrl('r'));

    assert_eq!((ed.lines(), ed.cursor()), after);
}

#[test]
fn deleting_the_only_line_keeps_one_line() {
    let mut ed = editor_with(&["only"]);
    typed(&mut ed, "dd");
    assert_eq!(ed.lines(), vec![""]);
    typed(&mut ed, "dd");
    assert_eq!(ed.lines(), vec![""]);
}

#[test]
fn cursor_stays_inside_buffer() {
    let mut ed = editor_with(&["ab", "", "longer line"]);
    for code in [KeyCode::Up, KeyCode::Left, KeyCode::Left] {
        press(&mut ed, code);
    }
    assert_eq!(ed.cursor(), Position::new(0, 0));
    for _ in 0..10 {
        press(&mut ed, KeyCode::Down);
        press(&mut ed, KeyCode::Right);
    }
    let cursor = ed.cursor();
    assert_eq!(cursor.line, 2);
    assert!(cursor.col < "longer line".len());
}

#[test]
fn empty_source_file_tokenizes_to_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.c");
    fs::write(&path, "").unwrap();

    let mut ed = editor();
    ed.open(&path);
    ed.settle();
    assert!(ed.tokens().is_empty());

    typed(&mut ed, "iint x;");
    press(&mut ed, KeyCode::Escape);
    ed.settle();
    assert!(!ed.tokens().is_empty());
}
