#![warn(clippy::all, clippy::pedantic)]
//! Decoding of raw terminal bytes into keys.
use std::{io, time::Duration};

/// How long to wait for the rest of an escape sequence before deciding
/// the user pressed Escape on its own.
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(100);

pub const CTRL_C: u8 = 3;
pub const CTRL_F: u8 = 6;
pub const CTRL_H: u8 = 8;
pub const CTRL_L: u8 = 12;
pub const ENTER: u8 = 13;
pub const CTRL_Q: u8 = 17;
pub const CTRL_S: u8 = 19;
pub const ESC: u8 = 27;
pub const BACKSPACE: u8 = 127;

/// A logical key. Anything that is not a recognised escape sequence
/// arrives as the literal byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(u8),
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
}

/// Somewhere to pull input bytes from.
pub trait ByteSource {
    /// Takes itself and an optional timeout.
    /// Returns the next byte, or `None` if the timeout expired (or, with
    /// no timeout, if the wait was interrupted).
    ///
    /// # Errors
    ///
    /// Will return an error if the underlying read fails.
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>>;
}

/// Takes a byte source.
/// Blocks for one key and decodes it. Returns `None` when the wait was
/// interrupted before any byte arrived.
///
/// # Errors
///
/// Will return an error if reading from the source fails.
pub fn read_key<S: ByteSource + ?Sized>(source: &mut S) -> io::Result<Option<Key>> {
    let Some(c) = source.read_byte(None)? else {
        return Ok(None);
    };
    if c != ESC {
        return Ok(Some(Key::Char(c)));
    }

    let Some(first) = source.read_byte(Some(ESCAPE_TIMEOUT))? else {
        return Ok(Some(Key::Escape));
    };
    let Some(second) = source.read_byte(Some(ESCAPE_TIMEOUT))? else {
        return Ok(Some(Key::Escape));
    };

    let key = match (first, second) {
        (b'[', digit) if digit.is_ascii_digit() => {
            let Some(third) = source.read_byte(Some(ESCAPE_TIMEOUT))? else {
                return Ok(Some(Key::Escape));
            };
            match (digit, third) {
                (b'3', b'~') => Key::Delete,
                (b'5', b'~') => Key::PageUp,
                (b'6', b'~') => Key::PageDown,
                _ => Key::Escape,
            }
        }
        (b'[', b'A') => Key::ArrowUp,
        (b'[', b'B') => Key::ArrowDown,
        (b'[', b'C') => Key::ArrowRight,
        (b'[', b'D') => Key::ArrowLeft,
        (b'[' | b'O', b'H') => Key::Home,
        (b'[' | b'O', b'F') => Key::End,
        _ => Key::Escape,
    };
    Ok(Some(key))
}
