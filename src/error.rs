//! Error types for configuration, service resolution and spawning.

use thiserror::Error;

/// Errors that can occur when loading the game configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Failed to read config '{path}': {details}")]
    Read { path: String, details: String },

    /// TOML parsing failed.
    #[error("Parse error in '{path}': {details}")]
    Parse { path: String, details: String },

    /// Values parsed but make no sense together.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors raised by the service locator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("No factory registered for {0}")]
    NotRegistered(&'static str),

    #[error("Circular dependency detected while resolving {0}")]
    CircularDependency(&'static str),

    #[error("Cached service for {0} has an unexpected type")]
    TypeMismatch(&'static str),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormationError {
    /// A grid is still alive; the previous wave was never torn down.
    #[error("Enemy grid {rows}x{cols} is still present; clear it before spawning")]
    GridOccupied { rows: usize, cols: usize },
}

#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("Failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("A logger is already installed: {0}")]
    SetLogger(#[from] log::SetLoggerError),
}
