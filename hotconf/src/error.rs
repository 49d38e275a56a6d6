//! Error types for the hotconf library.
//!
//! Fatal load failures (no base file, unparsable base, decode failure) are
//! returned to the caller of a first load. Overlay problems never appear
//! here; they are logged and recorded in the merge report instead.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with a hotconf error.
///
/// # Examples
///
/// ```
/// use hotconf::{Error, Result};
///
/// fn example_operation() -> Result<u16> {
///     Ok(8080)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the hotconf library.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration name was empty after trimming.
    #[error("configuration name is empty")]
    EmptyName,

    /// A configuration name cannot be used as a filename stem.
    #[error("invalid configuration name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No base file exists on any search directory.
    #[error("no configuration file found for '{name}' (searched: {})", display_paths(searched))]
    ResolutionEmpty {
        /// The configuration name being resolved.
        name: String,
        /// Every base candidate that was checked.
        searched: Vec<PathBuf>,
    },

    /// A configuration file could not be read.
    #[error("failed to read configuration file {}: {source}", path.display())]
    Read {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid YAML.
    #[error("failed to parse configuration file {}: {source}", path.display())]
    Parse {
        /// The file that failed to parse.
        path: PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A configuration file parsed but its root is not a mapping.
    #[error("configuration file {} must contain a mapping at its root", path.display())]
    NotAMapping {
        /// The offending file.
        path: PathBuf,
    },

    /// The merged tree does not fit the requested target type.
    #[error("failed to decode configuration '{name}': {source}")]
    Decode {
        /// The configuration name being decoded.
        name: String,
        /// The underlying decoder error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A reload triggered after the first load failed.
    ///
    /// Watchers only log this; it is returned by manual reloads.
    #[error("failed to reload configuration '{name}': {source}")]
    Reload {
        /// The configuration name being reloaded.
        name: String,
        /// What went wrong during the reload.
        #[source]
        source: Box<Error>,
    },

    /// The cache holds a different type under this name.
    #[error("configuration '{name}' is cached as a different type than {expected}")]
    TypeMismatch {
        /// The configuration name.
        name: String,
        /// The type the caller asked for.
        expected: &'static str,
    },

    /// An operation needed a loaded configuration that is not cached.
    #[error("configuration '{name}' has not been loaded")]
    NotLoaded {
        /// The configuration name.
        name: String,
    },

    /// The file watcher could not be created or registered.
    #[error("file watch error: {0}")]
    Watch(#[from] notify::Error),

    /// A loader setting was invalid.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The setting that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no search directories".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Check if the error means no base file was found.
    ///
    /// # Examples
    ///
    /// ```
    /// use hotconf::Error;
    ///
    /// let err = Error::ResolutionEmpty { name: "events".into(), searched: vec![] };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResolutionEmpty { .. })
    }

    /// Check if the error came from parsing or decoding file contents.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        match self {
            Self::Parse { .. } | Self::NotAMapping { .. } | Self::Decode { .. } => true,
            Self::Reload { source, .. } => source.is_malformed(),
            _ => false,
        }
    }
}
