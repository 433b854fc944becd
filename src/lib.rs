#![warn(clippy::all, clippy::pedantic)]
pub mod config;
pub mod editor;
pub mod error;
pub mod filebuffer;
pub mod input;
pub mod render;
pub mod row;
pub mod syntax;
pub mod terminal;
pub mod viewport;

pub use editor::Editor;
pub use error::{Error, Result};
pub use filebuffer::FileBuffer;
pub use input::Key;
pub use row::Row;
pub use terminal::Size;
pub use terminal::Terminal;
pub use viewport::Viewport;
