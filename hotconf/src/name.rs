//! Configuration names.
//!
//! A [`ConfigName`] is the cache key and the filename stem of the base file.
//! It is normalized exactly once, at construction, so every lookup site
//! addresses the same cache entry regardless of the caller's casing.

use std::borrow::Borrow;
use std::fmt;

use crate::error::{Error, Result};

/// A normalized (trimmed, lower-cased) configuration name.
///
/// # Examples
///
/// ```
/// use hotconf::ConfigName;
///
/// let name = ConfigName::new("  Events ").unwrap();
/// assert_eq!(name.as_str(), "events");
/// assert_eq!(name, ConfigName::new("EVENTS").unwrap());
///
/// assert!(ConfigName::new("").is_err());
/// assert!(ConfigName::new("../secrets").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigName(String);

impl ConfigName {
    /// Normalizes and validates a configuration name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyName`] for empty or whitespace-only input and
    /// [`Error::InvalidName`] if the name contains a path separator or `..`.
    pub fn new(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(Error::EmptyName);
        }
        if let Some(reason) = filename_problem(&normalized) {
            return Err(Error::InvalidName {
                name: raw.to_string(),
                reason: reason.to_string(),
            });
        }
        Ok(Self(normalized))
    }

    /// Returns the normalized name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reports why `stem` cannot be used as a bare filename stem, if it can't.
pub(crate) fn filename_problem(stem: &str) -> Option<&'static str> {
    if stem.contains('/') || stem.contains('\\') {
        Some("must not contain path separators")
    } else if stem.contains("..") {
        Some("must not contain '..'")
    } else if stem.contains('\0') {
        Some("must not contain NUL bytes")
    } else {
        None
    }
}

impl TryFrom<&str> for ConfigName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for ConfigName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl TryFrom<&String> for ConfigName {
    type Error = Error;

    fn try_from(value: &String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&ConfigName> for ConfigName {
    type Error = Error;

    fn try_from(value: &ConfigName) -> Result<Self> {
        Ok(value.clone())
    }
}

impl AsRef<str> for ConfigName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ConfigName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
