//! Command-line front end for the bookmark store.
//!
//! # Responsibility
//! - Parse configuration, start logging and pick the storage backend.
//! - Report failures on stderr with a non-zero exit code.

mod commands;
mod config;
mod form;
mod icon;

use bookmarks_core::{default_log_level, init_logging, FileBackend, SqliteBackend};
use clap::Parser;
use commands::{execute, CliError};
use config::{BackendKind, BookmarksConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = BookmarksConfig::parse();

    if let Some(log_dir) = config.absolute_log_dir() {
        let level = config.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, &log_dir) {
            eprintln!("warning: {}", CliError::from(err));
        }
    }
    config.log_summary();

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: BookmarksConfig) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match config.backend {
        BackendKind::File => {
            let backend = FileBackend::new(&config.data_dir);
            execute(backend, config.command, &mut out)
        }
        BackendKind::Sqlite => {
            let backend = SqliteBackend::open(config.sqlite_path())?;
            execute(backend, config.command, &mut out)
        }
    }
}
