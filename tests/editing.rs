use plume_editor::{
    input::{BACKSPACE, CTRL_F, CTRL_Q, CTRL_S, ENTER},
    syntax::Highlight,
    Editor, FileBuffer, Key, Size,
};
use std::{fs, path::Path};
use tempfile::tempdir;

const SIZE: Size = Size {
    width: 80,
    height: 24,
};

fn open(path: &Path) -> Editor {
    Editor::new(FileBuffer::open(path).unwrap(), SIZE, 1)
}

fn type_str(editor: &mut Editor, s: &str) {
    for c in s.bytes() {
        editor.process_key(Key::Char(c)).unwrap();
    }
}

fn press(editor: &mut Editor, keys: &[Key]) {
    for &key in keys {
        editor.process_key(key).unwrap();
    }
}

fn lines(editor: &Editor) -> Vec<String> {
    editor
        .buffer()
        .rows()
        .iter()
        .map(|row| String::from_utf8_lossy(row.chars()).into_owned())
        .collect()
}

#[test]
fn loads_rows_and_strips_line_endings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("three.txt");
    fs::write(&path, "one\r\ntwo\nthree").unwrap();

    let editor = open(&path);
    assert_eq!(lines(&editor), ["one", "two", "three"]);
    assert!(!editor.buffer().file_is_dirty);
    assert_eq!(
        editor
            .buffer()
            .rows()
            .iter()
            .map(|row| row.idx)
            .collect::<Vec<_>>(),
        [0, 1, 2]
    );
}

#[test]
fn missing_file_starts_empty_and_is_created_on_save() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("new.txt");

    let mut editor = open(&path);
    assert!(editor.buffer().is_empty());
    type_str(&mut editor, "hello");
    press(&mut editor, &[Key::Char(CTRL_S)]);

    assert_eq!(fs::read(&path).unwrap(), b"hello\n");
    assert!(!editor.buffer().file_is_dirty);
    assert_eq!(editor.status(), Some("6 bytes written on disk"));
}

#[test]
fn insert_in_the_middle_of_a_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ab.txt");
    fs::write(&path, "ab\n").unwrap();

    let mut editor = open(&path);
    press(&mut editor, &[Key::ArrowRight]);
    type_str(&mut editor, "x");
    assert_eq!(lines(&editor), ["axb"]);
    assert_eq!(editor.view().file_col(), 2);
    assert!(editor.buffer().file_is_dirty);
}

#[test]
fn backspace_at_row_start_merges_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("merge.txt");
    fs::write(&path, "ab\ncd\n").unwrap();

    let mut editor = open(&path);
    press(&mut editor, &[Key::ArrowDown, Key::Char(BACKSPACE)]);
    assert_eq!(lines(&editor), ["abcd"]);
    assert_eq!(editor.view().file_row(), 0);
    assert_eq!(editor.view().file_col(), 2);
}

#[test]
fn enter_splits_and_save_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("split.txt");
    fs::write(&path, "hello world\n").unwrap();

    let mut editor = open(&path);
    for _ in 0..5 {
        press(&mut editor, &[Key::ArrowRight]);
    }
    press(&mut editor, &[Key::Char(ENTER), Key::Delete]);
    assert_eq!(lines(&editor), ["hello", "world"]);

    press(&mut editor, &[Key::Char(CTRL_S)]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello\nworld\n");

    let reloaded = open(&path);
    assert_eq!(lines(&reloaded), lines(&editor));
}

#[test]
fn c_files_get_comment_highlighting() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("main.c");
    fs::write(&path, "int x; // note\n/* start\n\nend */ int y;\n").unwrap();

    let editor = open(&path);
    let rows = editor.buffer().rows();
    assert_eq!(editor.buffer().syntax().map(|s| s.name), Some("c"));

    assert_eq!(rows[0].hl[0], Highlight::Keyword2);
    assert!(rows[0].hl[7..].iter().all(|&h| h == Highlight::Comment));

    assert!(rows[1].hl_open_comment);
    assert!(rows[2].hl_open_comment);
    assert!(rows[3].hl[..6]
        .iter()
        .all(|&h| h == Highlight::MultilineComment));
    assert!(!rows[3].hl_open_comment);
    assert_eq!(rows[3].hl[7], Highlight::Keyword2);
}

#[test]
fn opening_a_comment_rehighlights_following_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lib.rs");
    fs::write(&path, "x\nlet a = 1;\n").unwrap();

    let mut editor = open(&path);
    assert_eq!(editor.buffer().rows()[1].hl[0], Highlight::Keyword1);

    press(&mut editor, &[Key::End]);
    type_str(&mut editor, " /*");
    let rows = editor.buffer().rows();
    assert!(rows[0].hl_open_comment);
    assert!(rows[1]
        .hl
        .iter()
        .all(|&h| h == Highlight::MultilineComment));
}

#[test]
fn search_jumps_to_match_and_escape_restores() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("find.txt");
    fs::write(&path, "alpha\nbeta\ngamma\n").unwrap();

    let mut editor = open(&path);
    press(&mut editor, &[Key::Char(CTRL_F)]);
    type_str(&mut editor, "mm");
    assert_eq!(editor.view().file_row(), 2);
    assert_eq!(editor.view().file_col(), 2);
    assert_eq!(editor.buffer().rows()[2].hl[2], Highlight::Match);

    press(&mut editor, &[Key::Escape]);
    assert_eq!(editor.view().file_row(), 0);
    assert_eq!(editor.view().file_col(), 0);
    assert_eq!(editor.buffer().rows()[2].hl[2], Highlight::Normal);
}

#[test]
fn dirty_quit_needs_confirmation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quit.txt");

    let mut editor = open(&path);
    type_str(&mut editor, "z");
    press(&mut editor, &[Key::Char(CTRL_Q)]);
    assert!(!editor.should_quit());
    assert!(editor.status().unwrap().starts_with("WARNING!!!"));
    press(&mut editor, &[Key::Char(CTRL_Q)]);
    assert!(editor.should_quit());
}

#[test]
fn frame_shows_status_bar() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("status.txt");
    fs::write(&path, "a\nb\n").unwrap();

    let editor = open(&path);
    let frame = String::from_utf8(editor.frame().unwrap()).unwrap();
    assert!(frame.contains(" - 2 lines"));
    assert!(frame.contains("1/2"));
}
