#![warn(clippy::all, clippy::pedantic)]
use crate::{
    error::{Error, Result},
    syntax::Highlight,
};

pub const TAB_STOP: usize = 8;

/// Largest rendered row the editor accepts.
const MAX_RENDER_LEN: u64 = u32::MAX as u64;

#[derive(Debug, Default, Clone)]
pub struct Row {
    pub idx: usize,
    chars: Vec<u8>,
    render: Vec<u8>,
    pub hl: Vec<Highlight>,
    pub hl_open_comment: bool,
}

impl Row {
    /// Takes an index and the raw bytes of a line.
    /// Builds a `Row` with its rendered form already derived.
    /// Tags are left normal until the owning buffer highlights the row.
    ///
    /// # Errors
    ///
    /// Will return an error if the rendered row would be too long.
    pub fn new(idx: usize, chars: &[u8]) -> Result<Self> {
        let mut row = Self {
            idx,
            chars: chars.to_vec(),
            ..Default::default()
        };
        row.update()?;
        Ok(row)
    }

    /// Raw content of the row.
    #[must_use]
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    /// Tab-expanded content of the row.
    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Takes itself.
    /// Rebuilds the rendered row from the raw bytes and resizes the
    /// tag array to match it.
    ///
    /// # Errors
    ///
    /// Will return an error if the rendered row would exceed the
    /// addressable length.
    pub fn update(&mut self) -> Result<()> {
        let tabs = self.chars.iter().filter(|&&c| c == b'\t').count();
        let worst = self.chars.len() as u64 + (tabs * (TAB_STOP - 1)) as u64;
        if worst > MAX_RENDER_LEN {
            return Err(Error::RowTooLong {
                row: self.idx,
                len: worst,
            });
        }

        self.render.clear();
        self.render.reserve(self.chars.len() + tabs * (TAB_STOP - 1));
        for &c in &self.chars {
            if c == b'\t' {
                self.render.push(b' ');
                while self.render.len() % TAB_STOP != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(c);
            }
        }
        self.hl.clear();
        self.hl.resize(self.render.len(), Highlight::Normal);
        Ok(())
    }

    /// Takes itself, a column and a byte.
    /// Inserts the byte at the column, padding the row with spaces first
    /// if the column lies past its end.
    ///
    /// # Errors
    ///
    /// Will return an error if the row becomes too long to render.
    pub fn insert_char(&mut self, at: usize, c: u8) -> Result<()> {
        if at > self.chars.len() {
            self.chars.resize(at, b' ');
        }
        self.chars.insert(at, c);
        self.update()
    }

    /// Takes itself and a column.
    /// Removes the byte at the column. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Will return an error if the row cannot be re-rendered.
    pub fn delete_char(&mut self, at: usize) -> Result<bool> {
        if at >= self.chars.len() {
            return Ok(false);
        }
        self.chars.remove(at);
        self.update()?;
        Ok(true)
    }

    /// Appends the bytes to the end of the row.
    ///
    /// # Errors
    ///
    /// Will return an error if the row becomes too long to render.
    pub fn append(&mut self, s: &[u8]) -> Result<()> {
        self.chars.extend_from_slice(s);
        self.update()
    }

    /// Takes itself and a column.
    /// Cuts the row at the column and returns the removed suffix.
    ///
    /// # Errors
    ///
    /// Will return an error if the row cannot be re-rendered.
    pub fn split_off(&mut self, at: usize) -> Result<Vec<u8>> {
        let at = at.min(self.chars.len());
        let tail = self.chars.split_off(at);
        self.update()?;
        Ok(tail)
    }

    /// Takes itself and two raw columns.
    /// Returns the rendered width of `chars[start..end]` as seen when the
    /// walk starts on a tab stop.
    #[must_use]
    pub fn render_width(&self, start: usize, end: usize) -> usize {
        let mut rx = 0;
        for j in start..end {
            if self.chars.get(j) == Some(&b'\t') {
                rx += TAB_STOP - rx % TAB_STOP;
            } else {
                rx += 1;
            }
        }
        rx
    }

    /// Takes itself and a rendered column.
    /// Returns the raw column that produced it.
    #[must_use]
    pub fn rx_to_cx(&self, rx: usize) -> usize {
        let mut cur = 0;
        for (cx, &c) in self.chars.iter().enumerate() {
            if c == b'\t' {
                cur += TAB_STOP - cur % TAB_STOP;
            } else {
                cur += 1;
            }
            if cur > rx {
                return cx;
            }
        }
        self.chars.len()
    }
}
