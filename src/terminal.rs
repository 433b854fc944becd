#![warn(clippy::all, clippy::pedantic)]
//! The real terminal: raw mode, screen size, frame output and raw input
//! bytes from stdin.
use crate::{
    error::{Error, Result},
    input::{self, ByteSource, Key},
};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{
    io::{self, Write},
    os::unix::io::RawFd,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};
use tracing::warn;

/// Set from the SIGWINCH handler, drained by the main loop.
static RESIZED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigwinch(_signal: libc::c_int) {
    RESIZED.store(true, Ordering::SeqCst);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

/// Raw bytes straight from the stdin file descriptor, bypassing any
/// buffering so that `poll` sees every pending byte.
pub struct StdinSource {
    fd: RawFd,
}

impl Default for StdinSource {
    fn default() -> Self {
        Self {
            fd: libc::STDIN_FILENO,
        }
    }
}

impl ByteSource for StdinSource {
    #[allow(unsafe_code)]
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>> {
        let timeout_ms = timeout.map_or(-1, |t| libc::c_int::try_from(t.as_millis()).unwrap_or(libc::c_int::MAX));
        let mut fds = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: poll is given exactly one valid pollfd.
        let ready = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
        if ready < 0 {
            let err = io::Error::last_os_error();
            return if err.kind() == io::ErrorKind::Interrupted {
                Ok(None)
            } else {
                Err(err)
            };
        }
        if ready == 0 {
            return Ok(None);
        }

        let mut byte = 0u8;
        // SAFETY: the destination is a single valid, writable byte.
        let n = unsafe { libc::read(self.fd, std::ptr::addr_of_mut!(byte).cast(), 1) };
        match n {
            1 => Ok(Some(byte)),
            0 => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed")),
            _ => {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }
}

pub struct Terminal {
    size: Size,
    input: StdinSource,
    raw_mode: bool,
    alt_screen: bool,
}

impl Terminal {
    /// Takes nothing.
    /// Creates a new `Terminal`: queries its size, installs the resize
    /// handler, enters raw mode and the alternate screen.
    ///
    /// # Errors
    ///
    /// Will return an error if the terminal size is unknown or raw mode
    /// cannot be entered.
    pub fn new() -> Result<Self> {
        let size = Self::query_size()?;
        install_resize_handler()?;
        let mut terminal = Self {
            size,
            input: StdinSource::default(),
            raw_mode: false,
            alt_screen: false,
        };
        enable_raw_mode()?;
        terminal.raw_mode = true;
        match execute!(io::stdout(), EnterAlternateScreen) {
            Ok(()) => terminal.alt_screen = true,
            Err(e) => warn!(error = %e, "alternate screen unavailable"),
        }
        Ok(terminal)
    }

    /// Takes itself.
    /// Returns the terminal's size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Takes nothing.
    /// Asks the terminal for its current size.
    ///
    /// # Errors
    ///
    /// Will return an error if the size cannot be determined.
    pub fn query_size() -> Result<Size> {
        let (width, height) = crossterm::terminal::size().map_err(Error::TerminalSize)?;
        if width == 0 || height == 0 {
            return Err(Error::TerminalSize(io::Error::new(
                io::ErrorKind::InvalidData,
                "terminal reported zero dimensions",
            )));
        }
        Ok(Size { width, height })
    }

    /// Takes itself.
    /// Re-reads the terminal size after a resize.
    ///
    /// # Errors
    ///
    /// Will return an error if the size cannot be determined.
    pub fn refresh_size(&mut self) -> Result<Size> {
        self.size = Self::query_size()?;
        Ok(self.size)
    }

    /// Takes nothing.
    /// Returns whether a resize was signalled since the last call.
    #[must_use]
    pub fn take_resize() -> bool {
        RESIZED.swap(false, Ordering::SeqCst)
    }

    /// Takes a complete frame.
    /// Writes it to stdout in one go and flushes.
    ///
    /// # Errors
    ///
    /// Will return an error if stdout cannot be written.
    pub fn write_frame(frame: &[u8]) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(frame)?;
        stdout.flush()
    }

    /// Takes itself.
    /// Blocks for the next key. Returns `None` if a signal interrupted
    /// the wait.
    ///
    /// # Errors
    ///
    /// Will return an error if stdin cannot be read.
    pub fn read_key(&mut self) -> io::Result<Option<Key>> {
        input::read_key(&mut self.input)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show);
        if self.alt_screen {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
        if self.raw_mode {
            let _ = disable_raw_mode();
        }
    }
}

#[allow(unsafe_code)]
fn install_resize_handler() -> io::Result<()> {
    let handler = on_sigwinch as extern "C" fn(libc::c_int);
    // SAFETY: the handler only stores to an atomic.
    let previous = unsafe { libc::signal(libc::SIGWINCH, handler as libc::sighandler_t) };
    if previous == libc::SIG_ERR {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
