#![warn(clippy::all, clippy::pedantic)]
//! Error types for the editor.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Editor error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The terminal would not report its dimensions
    #[error("Unable to query the screen for size (columns / rows): {0}")]
    TerminalSize(io::Error),

    /// The target file exists but could not be opened
    #[error("Opening file {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    /// A row grew past what the renderer can address
    #[error("Row {row} is too long to edit ({len} rendered bytes)")]
    RowTooLong { row: usize, len: u64 },

    /// The save path wrote fewer bytes than requested
    #[error("Short write: {written} of {expected} bytes written")]
    ShortWrite { written: usize, expected: usize },

    /// Save was requested without a file path
    #[error("No file name")]
    NoFileName,
}

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, Error>;
