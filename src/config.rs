#![warn(clippy::all, clippy::pedantic)]
//! Command line arguments and log setup.
use clap::Parser;
use std::{fs::OpenOptions, io, path::PathBuf, sync::Mutex};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// CLI arguments for Plume
#[derive(Parser, Debug, Clone)]
#[command(name = "plume")]
#[command(version)]
#[command(about = "A small terminal text editor", long_about = None)]
pub struct Args {
    /// File to edit; created on first save if it does not exist
    pub path: PathBuf,

    /// Extra Ctrl-Q presses needed to quit with unsaved changes
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub quit_times: u8,

    /// Append logs to this file (filtered by RUST_LOG, default "info")
    #[arg(long, value_name = "FILE", env = "PLUME_LOG")]
    pub log_file: Option<PathBuf>,
}

/// Takes the arguments.
/// Installs the tracing subscriber. The terminal belongs to the editor,
/// so logs only go to a file and nothing is installed without one.
///
/// # Errors
///
/// Will return an error if the log file cannot be opened.
pub fn init_logging(args: &Args) -> io::Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .init();
    Ok(())
}
