#![warn(clippy::all, clippy::pedantic)]
use clap::Parser;
use plume_editor::{
    config::{self, Args},
    Editor, FileBuffer, Result, Terminal,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = config::init_logging(&args) {
        eprintln!("Unable to open log file: {e}");
        return ExitCode::FAILURE;
    }
    tracing::debug!(path = %args.path.display(), "starting");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Takes the arguments.
/// Opens the file and runs the editor. The terminal is restored when it
/// goes out of scope, before any error reaches the user.
fn run(args: &Args) -> Result<()> {
    let buffer = FileBuffer::open(&args.path)?;
    let mut terminal = Terminal::new()?;
    let mut editor = Editor::new(buffer, terminal.size(), args.quit_times);
    editor.run(&mut terminal)
}
