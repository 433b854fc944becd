#![warn(clippy::all, clippy::pedantic)]
use crate::{input::Key, row::Row, FileBuffer};

/// Screen-relative cursor plus the scroll offsets that place the screen
/// over the file. The file position is `(row_offset + cy, col_offset + cx)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub screen_rows: usize,
    pub screen_cols: usize,
    pub row_offset: usize,
    pub col_offset: usize,
    pub cx: usize,
    pub cy: usize,
}

impl Viewport {
    /// Takes the number of text rows and columns on screen.
    /// Builds a `Viewport` with the cursor at the top left of the file.
    #[must_use]
    pub fn new(screen_rows: usize, screen_cols: usize) -> Self {
        Self {
            screen_rows: screen_rows.max(1),
            screen_cols: screen_cols.max(1),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn file_row(&self) -> usize {
        self.row_offset + self.cy
    }

    #[must_use]
    pub fn file_col(&self) -> usize {
        self.col_offset + self.cx
    }

    /// Takes itself, a key and the buffer being viewed.
    /// Moves the cursor for navigation keys and ignores everything else.
    pub fn move_cursor(&mut self, key: Key, buffer: &FileBuffer) {
        match key {
            Key::ArrowLeft => self.move_left(buffer),
            Key::ArrowRight => self.move_right(buffer),
            Key::ArrowUp => self.move_up(),
            Key::ArrowDown => self.move_down(buffer),
            Key::PageUp => {
                self.cy = 0;
                for _ in 0..self.screen_rows {
                    self.move_up();
                }
            }
            Key::PageDown => {
                let below = buffer.len().saturating_sub(self.row_offset);
                self.cy = below.min(self.screen_rows - 1);
                for _ in 0..self.screen_rows {
                    self.move_down(buffer);
                }
            }
            Key::Home => {
                self.cx = 0;
                self.col_offset = 0;
            }
            Key::End => self.set_col(buffer.row_len(self.file_row())),
            _ => return,
        }
        self.clamp_col(buffer);
    }

    fn move_left(&mut self, buffer: &FileBuffer) {
        if self.cx > 0 {
            self.cx -= 1;
        } else if self.col_offset > 0 {
            self.col_offset -= 1;
        } else if self.file_row() > 0 {
            self.scroll_up();
            self.set_col(buffer.row_len(self.file_row()));
        }
    }

    fn move_right(&mut self, buffer: &FileBuffer) {
        let Some(row) = buffer.row(self.file_row()) else {
            return;
        };
        let file_col = self.file_col();
        if file_col < row.len() {
            self.advance_col();
        } else if file_col == row.len() {
            self.cx = 0;
            self.col_offset = 0;
            self.scroll_down();
        }
    }

    fn move_up(&mut self) {
        if self.cy > 0 {
            self.cy -= 1;
        } else if self.row_offset > 0 {
            self.row_offset -= 1;
        }
    }

    fn move_down(&mut self, buffer: &FileBuffer) {
        if self.file_row() < buffer.len() {
            self.scroll_down();
        }
    }

    /// Moves one row up, scrolling when the cursor is on the top line.
    pub fn scroll_up(&mut self) {
        if self.cy == 0 {
            self.row_offset = self.row_offset.saturating_sub(1);
        } else {
            self.cy -= 1;
        }
    }

    /// Moves one row down, scrolling when the cursor is on the bottom line.
    pub fn scroll_down(&mut self) {
        if self.cy + 1 >= self.screen_rows {
            self.row_offset += 1;
        } else {
            self.cy += 1;
        }
    }

    /// Moves one column right, scrolling at the right edge.
    pub fn advance_col(&mut self) {
        if self.cx + 1 >= self.screen_cols {
            self.col_offset += 1;
        } else {
            self.cx += 1;
        }
    }

    /// Moves one column left, scrolling at the left edge.
    pub fn retreat_col(&mut self) {
        if self.cx == 0 {
            self.col_offset = self.col_offset.saturating_sub(1);
        } else {
            self.cx -= 1;
        }
    }

    /// Takes itself and a file column.
    /// Puts the cursor on the column of the current row, scrolling
    /// horizontally only if the column is off screen.
    pub fn set_col(&mut self, col: usize) {
        if col >= self.screen_cols {
            self.col_offset = col - self.screen_cols + 1;
            self.cx = self.screen_cols - 1;
        } else {
            self.col_offset = 0;
            self.cx = col;
        }
    }

    /// Takes itself, a file row and a file column.
    /// Scrolls so that the row is on the top line and puts the cursor on
    /// the column.
    pub fn scroll_to(&mut self, row: usize, col: usize) {
        self.row_offset = row;
        self.cy = 0;
        self.set_col(col);
    }

    /// Pulls the cursor back to the end of the current row if it sits
    /// past it.
    fn clamp_col(&mut self, buffer: &FileBuffer) {
        let row_len = buffer.row_len(self.file_row());
        let file_col = self.file_col();
        if file_col > row_len {
            let excess = file_col - row_len;
            if excess <= self.cx {
                self.cx -= excess;
            } else {
                self.col_offset -= excess - self.cx;
                self.cx = 0;
            }
        }
    }

    /// Takes itself and the new number of text rows and columns.
    /// Resizes the screen, keeping the cursor on the same file position.
    pub fn resize(&mut self, screen_rows: usize, screen_cols: usize) {
        self.screen_rows = screen_rows.max(1);
        self.screen_cols = screen_cols.max(1);
        if self.cy >= self.screen_rows {
            self.row_offset += self.cy - (self.screen_rows - 1);
            self.cy = self.screen_rows - 1;
        }
        if self.cx >= self.screen_cols {
            self.col_offset += self.cx - (self.screen_cols - 1);
            self.cx = self.screen_cols - 1;
        }
    }

    /// Takes itself and the buffer being viewed.
    /// Returns the screen column of the cursor once tabs are expanded.
    #[must_use]
    pub fn render_x(&self, buffer: &FileBuffer) -> usize {
        buffer.row(self.file_row()).map_or(self.cx, |row| {
            row.render_width(0, self.file_col())
                .saturating_sub(self.render_offset(row))
        })
    }

    /// Takes itself and a row.
    /// Returns the first rendered column of the row that is on screen.
    #[must_use]
    pub fn render_offset(&self, row: &Row) -> usize {
        row.render_width(0, self.col_offset)
    }
}
