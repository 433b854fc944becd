#![warn(clippy::all, clippy::pedantic)]
//! Frame composition. Everything for one screen update is queued into a
//! single writer so the terminal receives it in one write.
use crate::{row::Row, FileBuffer, Viewport};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{Attribute, Color, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Longest file name shown in the status bar.
const STATUS_NAME_LEN: usize = 20;

/// Takes a writer, the buffer, the viewport and the transient message
/// (if it is still fresh).
/// Queues a complete frame: text rows, status bar, message bar and the
/// cursor.
///
/// # Errors
///
/// Will return an error if the writer fails.
pub fn draw<W: Write>(
    out: &mut W,
    buffer: &FileBuffer,
    view: &Viewport,
    message: Option<&str>,
) -> io::Result<()> {
    queue!(out, Hide, MoveTo(0, 0))?;
    draw_rows(out, buffer, view)?;
    draw_status_bar(out, buffer, view)?;
    draw_message_bar(out, view, message)?;
    let x = to_u16(view.render_x(buffer));
    let y = to_u16(view.cy);
    queue!(out, MoveTo(x, y), Show)
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

fn is_printable(c: u8) -> bool {
    c == b' ' || c.is_ascii_graphic()
}

fn draw_rows<W: Write>(out: &mut W, buffer: &FileBuffer, view: &Viewport) -> io::Result<()> {
    for y in 0..view.screen_rows {
        match buffer.row(view.row_offset + y) {
            Some(row) => draw_row(out, row, view)?,
            None if buffer.is_empty() && y == view.screen_rows / 3 => {
                draw_welcome_msg(out, view.screen_cols)?;
            }
            None => out.write_all(b"~")?,
        }
        queue!(out, Clear(ClearType::UntilNewLine))?;
        out.write_all(b"\r\n")?;
    }
    Ok(())
}

fn draw_welcome_msg<W: Write>(out: &mut W, width: usize) -> io::Result<()> {
    let mut welcome_msg = format!("Plume editor -- version {VERSION}");
    let padding = width.saturating_sub(welcome_msg.len()) / 2;
    let spaces = " ".repeat(padding.saturating_sub(1));
    welcome_msg = format!("~{spaces}{welcome_msg}");
    welcome_msg.truncate(width);
    out.write_all(welcome_msg.as_bytes())
}

/// Takes a writer, a row and the viewport.
/// Draws the visible window of the rendered row, switching colors only
/// when the tag color changes.
fn draw_row<W: Write>(out: &mut W, row: &Row, view: &Viewport) -> io::Result<()> {
    let render = row.render();
    let start = view.render_offset(row).min(render.len());
    let end = start.saturating_add(view.screen_cols).min(render.len());
    let mut current: Option<Color> = None;

    for (&c, &hl) in render[start..end].iter().zip(&row.hl[start..end]) {
        if !is_printable(c) {
            let sym = if c <= 26 { b'@' + c } else { b'?' };
            queue!(out, SetAttribute(Attribute::Reverse))?;
            out.write_all(&[sym])?;
            queue!(out, SetAttribute(Attribute::NoReverse))?;
            continue;
        }
        let color = hl.color();
        if color != current {
            queue!(out, SetForegroundColor(color.unwrap_or(Color::Reset)))?;
            current = color;
        }
        out.write_all(&[c])?;
    }
    queue!(out, SetForegroundColor(Color::Reset))
}

fn draw_status_bar<W: Write>(out: &mut W, buffer: &FileBuffer, view: &Viewport) -> io::Result<()> {
    let file_name: String = buffer.file_path.as_ref().map_or_else(
        || "[No Name]".to_string(),
        |path| path.to_string_lossy().chars().take(STATUS_NAME_LEN).collect(),
    );
    let dirty_status = if buffer.file_is_dirty { "(modified)" } else { "" };
    let mut status = format!("{file_name} - {} lines {dirty_status}", buffer.len()).into_bytes();
    let rstatus = format!("{}/{}", view.file_row() + 1, buffer.len()).into_bytes();

    let width = view.screen_cols;
    status.truncate(width);
    while status.len() < width {
        if width - status.len() == rstatus.len() {
            status.extend_from_slice(&rstatus);
            break;
        }
        status.push(b' ');
    }

    queue!(out, Clear(ClearType::UntilNewLine), SetAttribute(Attribute::Reverse))?;
    out.write_all(&status)?;
    queue!(out, SetAttribute(Attribute::Reset))?;
    out.write_all(b"\r\n")
}

fn draw_message_bar<W: Write>(out: &mut W, view: &Viewport, message: Option<&str>) -> io::Result<()> {
    queue!(out, Clear(ClearType::UntilNewLine))?;
    if let Some(message) = message {
        let bytes = message.as_bytes();
        out.write_all(&bytes[..bytes.len().min(view.screen_cols)])?;
    }
    Ok(())
}
