#![warn(clippy::all, clippy::pedantic)]

use crate::{
    error::Result,
    input::{Key, BACKSPACE, CTRL_C, CTRL_F, CTRL_H, CTRL_L, CTRL_Q, CTRL_S, ENTER},
    render,
    terminal::{Size, Terminal},
    FileBuffer, Viewport,
};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// How long a status message stays on screen.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Rows reserved below the text for the status and message bars.
const BAR_ROWS: u16 = 2;

struct StatusMessage {
    text: String,
    time: Instant,
}

/// State of an incremental search in progress.
struct Search {
    query: Vec<u8>,
    last_match: Option<usize>,
    marked_row: Option<usize>,
    saved_view: Viewport,
}

pub struct Editor {
    should_quit: bool,
    buffer: FileBuffer,
    view: Viewport,
    status: Option<StatusMessage>,
    quit_times: u8,
    quit_confirmations: u8,
    search: Option<Search>,
}

impl Editor {
    /// Takes a buffer, the terminal size and how many extra Ctrl-Q
    /// presses quitting with unsaved changes needs.
    /// Builds an `Editor` to store program state.
    #[must_use]
    pub fn new(buffer: FileBuffer, size: Size, quit_confirmations: u8) -> Self {
        let view = Viewport::new(
            usize::from(size.height.saturating_sub(BAR_ROWS)),
            usize::from(size.width),
        );
        Self {
            should_quit: false,
            buffer,
            view,
            status: None,
            quit_times: quit_confirmations,
            quit_confirmations,
            search: None,
        }
    }

    #[must_use]
    pub fn buffer(&self) -> &FileBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn view(&self) -> &Viewport {
        &self.view
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Takes itself and a message.
    /// Shows the message in the message bar for a few seconds.
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            time: Instant::now(),
        });
    }

    /// Takes itself.
    /// Returns the status message if it is still fresh.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|status| !status.text.is_empty() && status.time.elapsed() < STATUS_TIMEOUT)
            .map(|status| status.text.as_str())
    }

    /// Takes itself and a terminal.
    /// Runs the editor until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal fails or an edit produces a row
    /// too long to render.
    pub fn run(&mut self, terminal: &mut Terminal) -> Result<()> {
        self.set_status("HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find");
        loop {
            if Terminal::take_resize() {
                let size = terminal.refresh_size()?;
                debug!(width = size.width, height = size.height, "terminal resized");
                self.resize(size);
            }
            if self.should_quit {
                break;
            }
            Terminal::write_frame(&self.frame()?)?;
            if let Some(key) = terminal.read_key()? {
                trace!(?key, "key");
                self.process_key(key)?;
            }
        }
        Ok(())
    }

    /// Takes itself.
    /// Returns the bytes of one full screen update.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be composed.
    pub fn frame(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        render::draw(&mut out, &self.buffer, &self.view, self.status())?;
        Ok(out)
    }

    /// Takes itself and the new terminal size.
    /// Fits the viewport to the new size.
    pub fn resize(&mut self, size: Size) {
        self.view.resize(
            usize::from(size.height.saturating_sub(BAR_ROWS)),
            usize::from(size.width),
        );
    }

    /// Takes itself and a key.
    /// Applies the key to the buffer and the viewport.
    ///
    /// # Errors
    ///
    /// Returns an error if an edit produces a row too long to render.
    pub fn process_key(&mut self, key: Key) -> Result<()> {
        if self.search.is_some() {
            self.process_search_key(key);
            return Ok(());
        }
        match key {
            Key::Char(CTRL_Q) => {
                if self.buffer.file_is_dirty && self.quit_times > 0 {
                    self.set_status(format!(
                        "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
                        self.quit_times
                    ));
                    self.quit_times -= 1;
                    return Ok(());
                }
                self.should_quit = true;
            }
            Key::Char(CTRL_S) => self.save(),
            Key::Char(CTRL_F) => self.start_search(),
            Key::Char(ENTER) => self.insert_newline()?,
            Key::Char(BACKSPACE | CTRL_H) => self.delete_char()?,
            Key::Delete => self.delete_forward()?,
            // Interrupt and refresh need no action; the next frame redraws.
            Key::Char(CTRL_C | CTRL_L) | Key::Escape => {}
            Key::ArrowLeft
            | Key::ArrowRight
            | Key::ArrowUp
            | Key::ArrowDown
            | Key::PageUp
            | Key::PageDown
            | Key::Home
            | Key::End => self.view.move_cursor(key, &self.buffer),
            Key::Char(c) => self.insert_char(c)?,
        }
        self.quit_times = self.quit_confirmations;
        Ok(())
    }

    fn save(&mut self) {
        match self.buffer.save() {
            Ok(len) => self.set_status(format!("{len} bytes written on disk")),
            Err(e) => {
                warn!(error = %e, "save failed");
                self.set_status(format!("Can't save! {e}"));
            }
        }
    }

    /// Takes itself and a byte.
    /// Types the byte at the cursor, creating rows if the cursor sits
    /// past the end of the file.
    fn insert_char(&mut self, c: u8) -> Result<()> {
        let file_row = self.view.file_row();
        while self.buffer.len() <= file_row {
            self.buffer.insert_row(self.buffer.len(), b"")?;
        }
        self.buffer.insert_char(file_row, self.view.file_col(), c)?;
        self.view.advance_col();
        Ok(())
    }

    /// Takes itself.
    /// Splits the current row at the cursor and moves to the start of
    /// the new row.
    fn insert_newline(&mut self) -> Result<()> {
        let file_row = self.view.file_row();
        if file_row < self.buffer.len() {
            self.buffer.split_row(file_row, self.view.file_col())?;
        } else if file_row == self.buffer.len() {
            self.buffer.insert_row(file_row, b"")?;
        } else {
            return Ok(());
        }
        self.view.scroll_down();
        self.view.cx = 0;
        self.view.col_offset = 0;
        Ok(())
    }

    /// Takes itself.
    /// Deletes the byte left of the cursor. At the start of a row the row
    /// is joined onto the previous one.
    fn delete_char(&mut self) -> Result<()> {
        let file_row = self.view.file_row();
        let file_col = self.view.file_col();
        if file_row > self.buffer.len() || (file_row == 0 && file_col == 0) {
            return Ok(());
        }
        if file_row == self.buffer.len() {
            // Nothing to delete on the append line; step back like Left.
            self.view.move_cursor(Key::ArrowLeft, &self.buffer);
            return Ok(());
        }
        if file_col == 0 {
            let prev_len = self.buffer.row_len(file_row - 1);
            let chars = self
                .buffer
                .row(file_row)
                .map(|row| row.chars().to_vec())
                .unwrap_or_default();
            self.buffer.append_string(file_row - 1, &chars)?;
            self.buffer.delete_row(file_row);
            self.view.scroll_up();
            self.view.set_col(prev_len);
        } else {
            self.buffer.delete_char(file_row, file_col - 1)?;
            self.view.retreat_col();
        }
        Ok(())
    }

    /// Takes itself.
    /// Deletes the byte under the cursor. At the end of a row the next
    /// row is joined onto it.
    fn delete_forward(&mut self) -> Result<()> {
        let file_row = self.view.file_row();
        let file_col = self.view.file_col();
        if file_row >= self.buffer.len() {
            return Ok(());
        }
        if file_col < self.buffer.row_len(file_row) {
            self.buffer.delete_char(file_row, file_col)?;
        } else if let Some(next) = self.buffer.row(file_row + 1) {
            let chars = next.chars().to_vec();
            self.buffer.append_string(file_row, &chars)?;
            self.buffer.delete_row(file_row + 1);
        }
        Ok(())
    }

    fn start_search(&mut self) {
        self.search = Some(Search {
            query: Vec::new(),
            last_match: None,
            marked_row: None,
            saved_view: self.view,
        });
        self.show_search_prompt();
    }

    fn show_search_prompt(&mut self) {
        if let Some(search) = &self.search {
            let prompt = format!(
                "Search: {} (Use ESC/Arrows/Enter)",
                String::from_utf8_lossy(&search.query)
            );
            self.set_status(prompt);
        }
    }

    /// Takes itself and a key typed while the search prompt is open.
    /// Edits the query, steps between matches or leaves the prompt.
    fn process_search_key(&mut self, key: Key) {
        let Some(mut search) = self.search.take() else {
            return;
        };
        if let Some(row) = search.marked_row.take() {
            self.buffer.refresh_highlight(row);
        }

        let mut forward = None;
        match key {
            Key::Escape | Key::Char(ENTER) => {
                if key == Key::Escape {
                    self.view = search.saved_view;
                }
                self.set_status("");
                return;
            }
            Key::Char(BACKSPACE | CTRL_H) | Key::Delete => {
                search.query.pop();
                search.last_match = None;
            }
            Key::ArrowRight | Key::ArrowDown => forward = Some(true),
            Key::ArrowLeft | Key::ArrowUp => forward = Some(false),
            Key::Char(c) if c == b' ' || c.is_ascii_graphic() => {
                search.query.push(c);
                search.last_match = None;
            }
            _ => {}
        }
        if search.last_match.is_none() {
            forward = Some(true);
        }

        if let Some(forward) = forward {
            self.find_next(&mut search, forward);
        }
        self.search = Some(search);
        self.show_search_prompt();
    }

    /// Takes itself, the search state and a direction.
    /// Moves to the next row (wrapping around) whose rendered text
    /// contains the query and marks the match.
    fn find_next(&mut self, search: &mut Search, forward: bool) {
        let rows = self.buffer.len();
        if search.query.is_empty() || rows == 0 {
            return;
        }
        let mut current = search.last_match;
        for _ in 0..rows {
            let next = match current {
                None => 0,
                Some(row) if forward => (row + 1) % rows,
                Some(0) => rows - 1,
                Some(row) => row - 1,
            };
            current = Some(next);
            let Some(row) = self.buffer.row(next) else {
                continue;
            };
            let found = row
                .render()
                .windows(search.query.len())
                .position(|window| window == search.query.as_slice());
            if let Some(rx) = found {
                let cx = row.rx_to_cx(rx);
                search.last_match = Some(next);
                search.marked_row = Some(next);
                self.buffer.highlight_match(next, rx, search.query.len());
                self.view.scroll_to(next, cx);
                debug!(row = next, col = cx, "search match");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Highlight;

    fn editor(lines: &[&str]) -> Editor {
        let mut buffer = FileBuffer::default();
        for line in lines {
            buffer.insert_row(buffer.len(), line.as_bytes()).unwrap();
        }
        buffer.file_is_dirty = false;
        Editor::new(
            buffer,
            Size {
                width: 40,
                height: 12,
            },
            1,
        )
    }

    fn press(editor: &mut Editor, keys: &[Key]) {
        for &key in keys {
            editor.process_key(key).unwrap();
        }
    }

    fn type_str(editor: &mut Editor, s: &str) {
        for c in s.bytes() {
            editor.process_key(Key::Char(c)).unwrap();
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
    fn view_leaves_room_for_bars() {
        let editor = editor(&[]);
        assert_eq!(editor.view().screen_rows, 10);
        assert_eq!(editor.view().screen_cols, 40);
    }

    #[test]
    fn typing_into_empty_file_creates_a_row() {
        let mut editor = editor(&[]);
        type_str(&mut editor, "hi");
        assert_eq!(lines(&editor), vec!["hi"]);
        assert_eq!(editor.view().file_col(), 2);
        assert!(editor.buffer().file_is_dirty);
    }

    #[test]
    fn enter_splits_and_moves_down() {
        let mut editor = editor(&["hello"]);
        press(&mut editor, &[Key::ArrowRight, Key::ArrowRight, Key::Char(ENTER)]);
        assert_eq!(lines(&editor), vec!["he", "llo"]);
        assert_eq!((editor.view().file_row(), editor.view().file_col()), (1, 0));
    }

    #[test]
    fn enter_at_append_position_adds_row() {
        let mut editor = editor(&["a"]);
        press(&mut editor, &[Key::ArrowDown, Key::Char(ENTER)]);
        assert_eq!(lines(&editor), vec!["a", ""]);
        assert_eq!(editor.view().file_row(), 2);
    }

    #[test]
    fn backspace_at_column_zero_merges_rows() {
        let mut editor = editor(&["ab", "cd"]);
        press(&mut editor, &[Key::ArrowDown, Key::Char(BACKSPACE)]);
        assert_eq!(lines(&editor), vec!["abcd"]);
        assert_eq!((editor.view().file_row(), editor.view().file_col()), (0, 2));
    }

    #[test]
    fn backspace_in_row_deletes_left() {
        let mut editor = editor(&["abc"]);
        press(&mut editor, &[Key::End, Key::Char(CTRL_H)]);
        assert_eq!(lines(&editor), vec!["ab"]);
        assert_eq!(editor.view().file_col(), 2);
    }

    #[test]
    fn backspace_at_top_left_is_noop() {
        let mut editor = editor(&["abc"]);
        press(&mut editor, &[Key::Char(BACKSPACE)]);
        assert_eq!(lines(&editor), vec!["abc"]);
        assert!(!editor.buffer().file_is_dirty);
    }

    #[test]
    fn backspace_on_append_line_moves_to_previous_row_end() {
        let mut editor = editor(&["ab", "cde"]);
        press(&mut editor, &[Key::ArrowDown, Key::ArrowDown]);
        assert_eq!(editor.view().file_row(), 2);
        press(&mut editor, &[Key::Char(BACKSPACE)]);
        assert_eq!(lines(&editor), vec!["ab", "cde"]);
        assert_eq!((editor.view().file_row(), editor.view().file_col()), (1, 3));
        assert!(!editor.buffer().file_is_dirty);
    }

    #[test]
    fn delete_forward_joins_next_row() {
        let mut editor = editor(&["ab", "cd"]);
        press(&mut editor, &[Key::Delete, Key::End, Key::Delete]);
        assert_eq!(lines(&editor), vec!["bcd"]);
    }

    #[test]
    fn quit_with_unsaved_changes_needs_confirmation() {
        let mut editor = editor(&["x"]);
        type_str(&mut editor, "y");
        press(&mut editor, &[Key::Char(CTRL_Q)]);
        assert!(!editor.should_quit());
        assert!(editor.status().unwrap().starts_with("WARNING"));
        press(&mut editor, &[Key::Char(CTRL_Q)]);
        assert!(editor.should_quit());
    }

    #[test]
    fn other_keys_reset_quit_counter() {
        let mut editor = editor(&["x"]);
        type_str(&mut editor, "y");
        press(&mut editor, &[Key::Char(CTRL_Q), Key::ArrowLeft, Key::Char(CTRL_Q)]);
        assert!(!editor.should_quit());
    }

    #[test]
    fn clean_buffer_quits_at_once() {
        let mut editor = editor(&["x"]);
        press(&mut editor, &[Key::Char(CTRL_Q)]);
        assert!(editor.should_quit());
    }

    #[test]
    fn interrupt_is_ignored() {
        let mut editor = editor(&["x"]);
        press(&mut editor, &[Key::Char(CTRL_C), Key::Escape, Key::Char(CTRL_L)]);
        assert_eq!(lines(&editor), vec!["x"]);
        assert!(!editor.should_quit());
    }

    #[test]
    fn failed_save_is_reported() {
        let mut editor = editor(&["x"]);
        type_str(&mut editor, "y");
        press(&mut editor, &[Key::Char(CTRL_S)]);
        assert!(editor.status().unwrap().starts_with("Can't save!"));
        assert!(editor.buffer().file_is_dirty);
    }

    #[test]
    fn search_moves_to_match_and_marks_it() {
        let mut editor = editor(&["alpha", "beta", "gamma beta"]);
        press(&mut editor, &[Key::Char(CTRL_F)]);
        type_str(&mut editor, "beta");
        assert_eq!(editor.view().file_row(), 1);
        assert_eq!(editor.buffer().row(1).unwrap().hl[0], Highlight::Match);

        press(&mut editor, &[Key::ArrowDown]);
        assert_eq!((editor.view().file_row(), editor.view().file_col()), (2, 6));
        assert_eq!(editor.buffer().row(1).unwrap().hl[0], Highlight::Normal);

        press(&mut editor, &[Key::ArrowDown]);
        assert_eq!(editor.view().file_row(), 1);
        press(&mut editor, &[Key::ArrowUp]);
        assert_eq!(editor.view().file_row(), 2);

        press(&mut editor, &[Key::Char(ENTER)]);
        assert_eq!(editor.view().file_row(), 2);
        assert!(editor.buffer().row(2).unwrap().hl.iter().all(|&h| h == Highlight::Normal));
        type_str(&mut editor, "!");
        assert_eq!(lines(&editor)[2], "gamma !beta");
    }

    #[test]
    fn escape_restores_view() {
        let mut editor = editor(&["one", "two", "three"]);
        press(&mut editor, &[Key::Char(CTRL_F)]);
        type_str(&mut editor, "thr");
        assert_eq!(editor.view().file_row(), 2);
        press(&mut editor, &[Key::Escape]);
        assert_eq!((editor.view().file_row(), editor.view().file_col()), (0, 0));
        assert!(editor.status().is_none());
        assert_eq!(lines(&editor), vec!["one", "two", "three"]);
    }

    #[test]
    fn resize_clamps_cursor() {
        let mut editor = editor(&["a"; 20]);
        for _ in 0..9 {
            editor.process_key(Key::ArrowDown).unwrap();
        }
        editor.resize(Size {
            width: 10,
            height: 5,
        });
        assert_eq!(editor.view().cy, 2);
        assert_eq!(editor.view().file_row(), 9);
    }

    #[test]
    fn frame_shows_status_message() {
        let mut editor = editor(&["x"]);
        editor.set_status("saved it");
        let frame = String::from_utf8(editor.frame().unwrap()).unwrap();
        assert!(frame.contains("saved it"));
    }
}
