#![warn(clippy::all, clippy::pedantic)]
use crate::{
    error::{Error, Result},
    row::Row,
    syntax::{self, Highlight, Syntax},
};
use std::{
    fs::{File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    os::unix::fs::OpenOptionsExt,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct FileBuffer {
    rows: Vec<Row>,
    pub file_path: Option<PathBuf>,
    pub file_is_dirty: bool,
    syntax: Option<&'static Syntax>,
}

impl FileBuffer {
    /// Takes a file path.
    /// Builds a `FileBuffer` from the contents of the file at the given
    /// path. A missing file gives an empty buffer that will be created
    /// on the first save.
    ///
    /// # Errors
    ///
    /// Will return an error if the file exists but cannot be opened or
    /// read, or if one of its lines is too long to render.
    pub fn open(file_path: impl AsRef<Path>) -> Result<Self> {
        let path = file_path.as_ref();
        let mut buffer = Self {
            file_path: Some(path.to_path_buf()),
            syntax: syntax::select(&path.to_string_lossy()),
            ..Default::default()
        };
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "file does not exist yet, starting empty");
                return Ok(buffer);
            }
            Err(source) => {
                return Err(Error::Open {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        buffer.load(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            rows = buffer.len(),
            syntax = buffer.syntax.map(|s| s.name),
            "loaded file"
        );
        Ok(buffer)
    }

    /// Takes itself and a reader.
    /// Appends every line of the reader as a row, stripping a trailing
    /// `\n` and then a trailing `\r`, and clears the dirty flag.
    ///
    /// # Errors
    ///
    /// Will return an error if the reader fails or a line is too long.
    pub fn load<R: BufRead>(&mut self, mut reader: R) -> Result<()> {
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            if line.last() == Some(&b'\n') {
                line.pop();
            }
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            self.insert_row(self.rows.len(), &line)?;
        }
        self.file_is_dirty = false;
        Ok(())
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the length of the file in rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Takes itself and a row index.
    /// Returns the raw length of the row, or zero past the last row.
    #[must_use]
    pub fn row_len(&self, index: usize) -> usize {
        self.rows.get(index).map_or(0, Row::len)
    }

    #[must_use]
    pub fn syntax(&self) -> Option<&'static Syntax> {
        self.syntax
    }

    /// Takes itself and a profile.
    /// Switches the active profile and re-highlights every row.
    pub fn set_syntax(&mut self, syntax: Option<&'static Syntax>) {
        self.syntax = syntax;
        let mut open = false;
        for row in &mut self.rows {
            let (hl, ends_open) = syntax::highlight(row.render(), self.syntax, open);
            row.hl = hl;
            row.hl_open_comment = ends_open;
            open = ends_open;
        }
    }

    /// Takes itself and a row index.
    /// Re-highlights the row, then keeps walking down for as long as the
    /// "ends inside a block comment" state of the last row changed.
    fn update_syntax_from(&mut self, mut at: usize) {
        while at < self.rows.len() {
            let starts_in_comment = at > 0 && self.rows[at - 1].hl_open_comment;
            let row = &mut self.rows[at];
            let (hl, open) = syntax::highlight(row.render(), self.syntax, starts_in_comment);
            row.hl = hl;
            let changed = row.hl_open_comment != open;
            row.hl_open_comment = open;
            if !changed {
                break;
            }
            at += 1;
        }
    }

    /// Takes itself and a row index.
    /// Restores the classifier tags of a row, dropping search marks.
    pub fn refresh_highlight(&mut self, at: usize) {
        self.update_syntax_from(at);
    }

    /// Takes itself, a row index, a rendered column and a length.
    /// Tags the rendered range as a search match.
    pub fn highlight_match(&mut self, at: usize, rx: usize, len: usize) {
        if let Some(row) = self.rows.get_mut(at) {
            let end = rx.saturating_add(len).min(row.hl.len());
            if rx < end {
                row.hl[rx..end].fill(Highlight::Match);
            }
        }
    }

    /// Takes itself, a row index and the raw bytes of a line.
    /// Inserts a row at the index. Indices past the append position
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Will return an error if the line is too long to render.
    pub fn insert_row(&mut self, at: usize, s: &[u8]) -> Result<()> {
        if at > self.rows.len() {
            return Ok(());
        }
        let mut row = Row::new(at, s)?;
        // The next row was highlighted against this state.
        row.hl_open_comment = at > 0 && self.rows[at - 1].hl_open_comment;
        self.rows.insert(at, row);
        for row in &mut self.rows[at + 1..] {
            row.idx += 1;
        }
        self.update_syntax_from(at);
        self.file_is_dirty = true;
        Ok(())
    }

    /// Takes itself and a row index.
    /// Removes the row, shifting the following rows up.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        for row in &mut self.rows[at..] {
            row.idx -= 1;
        }
        self.update_syntax_from(at);
        self.file_is_dirty = true;
    }

    /// Takes itself, a position and a byte.
    /// Inserts the byte, padding the row with spaces when the column is
    /// past its end.
    ///
    /// # Errors
    ///
    /// Will return an error if the row grows too long to render.
    pub fn insert_char(&mut self, at: usize, col: usize, c: u8) -> Result<()> {
        let Some(row) = self.rows.get_mut(at) else {
            return Ok(());
        };
        row.insert_char(col, c)?;
        self.update_syntax_from(at);
        self.file_is_dirty = true;
        Ok(())
    }

    /// Takes itself and a position.
    /// Removes the byte at the position, if there is one.
    ///
    /// # Errors
    ///
    /// Will return an error if the row cannot be re-rendered.
    pub fn delete_char(&mut self, at: usize, col: usize) -> Result<()> {
        let Some(row) = self.rows.get_mut(at) else {
            return Ok(());
        };
        if row.delete_char(col)? {
            self.update_syntax_from(at);
            self.file_is_dirty = true;
        }
        Ok(())
    }

    /// Takes itself and a position.
    /// Breaks the row in two at the column. Splitting at column zero
    /// inserts an empty row above.
    ///
    /// # Errors
    ///
    /// Will return an error if either half cannot be rendered.
    pub fn split_row(&mut self, at: usize, col: usize) -> Result<()> {
        let Some(row) = self.rows.get_mut(at) else {
            return Ok(());
        };
        let col = col.min(row.len());
        if col == 0 {
            return self.insert_row(at, b"");
        }
        let tail = row.split_off(col)?;
        self.insert_row(at + 1, &tail)?;
        self.update_syntax_from(at);
        Ok(())
    }

    /// Takes itself, a row index and some bytes.
    /// Appends the bytes to the end of the row.
    ///
    /// # Errors
    ///
    /// Will return an error if the row grows too long to render.
    pub fn append_string(&mut self, at: usize, s: &[u8]) -> Result<()> {
        let Some(row) = self.rows.get_mut(at) else {
            return Ok(());
        };
        row.append(s)?;
        self.update_syntax_from(at);
        self.file_is_dirty = true;
        Ok(())
    }

    /// Takes itself.
    /// Returns the file contents with a `\n` after every row.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let total = self.rows.iter().map(|row| row.len() + 1).sum();
        let mut buf = Vec::with_capacity(total);
        for row in &self.rows {
            buf.extend_from_slice(row.chars());
            buf.push(b'\n');
        }
        buf
    }

    /// Takes itself.
    /// Writes the contents to the file path with a truncate and a single
    /// write. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Will return an error if there is no file path, if the file cannot
    /// be opened or truncated, or if the write comes up short. The dirty
    /// flag is left set in every error case.
    pub fn save(&mut self) -> Result<usize> {
        let path = self.file_path.as_ref().ok_or(Error::NoFileName)?;
        let buf = self.serialize();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(0o644)
            .open(path)?;
        file.set_len(buf.len() as u64)?;
        let written = file.write(&buf)?;
        if written != buf.len() {
            return Err(Error::ShortWrite {
                written,
                expected: buf.len(),
            });
        }
        self.file_is_dirty = false;
        info!(path = %path.display(), bytes = written, "saved file");
        Ok(written)
    }
}
