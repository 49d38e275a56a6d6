//! Environment variable handling.
//!
//! Two concerns live here: reading `HOTCONF_*` variables that configure the
//! loader itself, and the [`EnvLookup`] seam the path resolver uses to pick
//! the environment-selected overlay.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::settings::StoreSettings;

/// Overrides the overlay directory.
pub const CONFIG_DIR_VAR: &str = "HOTCONF_CONFIG_DIR";
/// Overrides the base-file search path (platform path-list syntax).
pub const SEARCH_PATH_VAR: &str = "HOTCONF_SEARCH_PATH";
/// Enables or disables file watching.
pub const WATCH_VAR: &str = "HOTCONF_WATCH";

/// Read access to environment variables.
///
/// The resolver only needs lookups, so tests can hand it a map instead of
/// mutating the process environment.
pub trait EnvLookup: Send + Sync {
    /// Returns the value of `key`, or `None` if unset or not unicode.
    fn var(&self, key: &str) -> Option<String>;
}

/// [`EnvLookup`] backed by the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Applies `HOTCONF_*` overrides to loader settings.
///
/// # Examples
///
/// ```
/// use hotconf::settings::{EnvironmentSettings, StoreSettings};
/// use std::collections::HashMap;
///
/// let mut env = HashMap::new();
/// env.insert("HOTCONF_WATCH".to_string(), "off".to_string());
///
/// let mut settings = StoreSettings::default();
/// EnvironmentSettings::apply_overrides(&mut settings, &env).unwrap();
/// assert!(!settings.watch);
/// ```
pub struct EnvironmentSettings;

impl EnvironmentSettings {
    /// Apply environment variable overrides to `settings`.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `HOTCONF_WATCH` is not a boolean.
    pub fn apply_overrides(settings: &mut StoreSettings, env: &dyn EnvLookup) -> Result<()> {
        if let Some(dir) = non_empty(env.var(CONFIG_DIR_VAR)) {
            settings.config_dir = PathBuf::from(dir);
        }

        if let Some(list) = non_empty(env.var(SEARCH_PATH_VAR)) {
            let dirs: Vec<PathBuf> = env::split_paths(&list)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if !dirs.is_empty() {
                settings.search_dirs = dirs;
            }
        }

        if let Some(val) = non_empty(env.var(WATCH_VAR)) {
            settings.watch = Self::parse_bool(WATCH_VAR, &val)?;
        }

        Ok(())
    }

    /// Parse a boolean value from a string.
    ///
    /// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
    pub(crate) fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
