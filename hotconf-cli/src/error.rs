//! CLI-specific error types with exit codes.
//!
//! This module defines error types specific to the CLI layer,
//! wrapping library errors and providing appropriate exit codes.

use hotconf::Error as LibError;
use std::fmt;

/// CLI-specific error type with exit code mapping.
#[derive(Debug)]
pub enum CliError {
    /// Library error (wrapped).
    Library(LibError),

    /// Invalid command-line arguments.
    InvalidArguments(String),

    /// I/O error.
    Io(std::io::Error),

    /// The configuration could not be rendered in the requested format.
    Format(String),
}

impl CliError {
    /// Get the appropriate exit code for this error.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 2: No base file found for the name
    /// - 3: A file could not be parsed or the result could not be decoded
    /// - 4: Invalid arguments (including invalid names and settings)
    /// - 5: I/O error
    /// - 6: Other error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Library(lib_err) => library_exit_code(lib_err),
            CliError::InvalidArguments(_) => 4,
            CliError::Io(_) => 5,
            CliError::Format(_) => 6,
        }
    }
}

fn library_exit_code(err: &LibError) -> i32 {
    match err {
        LibError::ResolutionEmpty { .. } => 2,
        LibError::Reload { source, .. } => library_exit_code(source),
        LibError::EmptyName | LibError::InvalidName { .. } | LibError::Validation { .. } => 4,
        LibError::Read { .. } => 5,
        e if e.is_malformed() => 3,
        _ => 6,
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Library(e) => write!(f, "{e}"),
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
            CliError::Format(msg) => write!(f, "Cannot render configuration: {msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Library(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LibError> for CliError {
    fn from(e: LibError) -> Self {
        CliError::Library(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
