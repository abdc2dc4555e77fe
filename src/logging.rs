//! File-backed `env_logger` setup, so log lines never land on the terminal
//! the game is drawing into.

use std::fs::OpenOptions;
use std::path::Path;

use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;

use crate::error::LogInitError;

pub const DEFAULT_LOG_PATH: &str = "invaders.log";

/// A logger builder that appends plain (uncoloured) records to `path`.
pub fn file_builder(path: impl AsRef<Path>, level: LevelFilter) -> Result<Builder, LogInitError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(file)));
    Ok(builder)
}

/// Install the file logger as the global `log` backend.
pub fn init(path: impl AsRef<Path>, level: LevelFilter) -> Result<(), LogInitError> {
    file_builder(path, level)?.try_init()?;
    Ok(())
}
