//! Settings for the loader itself.
//!
//! These control where files are looked up and which overlays apply. They
//! are merged from the following sources (highest precedence first):
//!
//! 1. Programmatic setters on [`StoreBuilder`]
//! 2. Environment variables (`HOTCONF_CONFIG_DIR`, `HOTCONF_SEARCH_PATH`,
//!    `HOTCONF_WATCH`) when [`StoreBuilder::from_env`] is used
//! 3. Built-in defaults
//!
//! # Examples
//!
//! ```
//! use hotconf::StoreBuilder;
//!
//! let store = StoreBuilder::new()
//!     .search_dir("/etc/my-app")
//!     .search_dir("./config")
//!     .config_dir("./config")
//!     .watch(false)
//!     .build();
//!
//! assert_eq!(store.settings().search_dirs.len(), 2);
//! ```

mod environment;

pub use environment::{
    EnvLookup, EnvironmentSettings, ProcessEnv, CONFIG_DIR_VAR, SEARCH_PATH_VAR, WATCH_VAR,
};

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::source::{FileSource, FsSource};
use crate::store::ConfigStore;

/// Default directory for base files and overlays.
pub const DEFAULT_CONFIG_DIR: &str = "./config";

/// Environment variable naming the production overlay.
pub const PROD_CONFIG_VAR: &str = "HOTCONF_PROD_CONFIG";
/// Environment variable naming the staging overlay.
pub const STAGE_CONFIG_VAR: &str = "HOTCONF_STAGE_CONFIG";
/// Environment variable naming the local overlay.
pub const LOCAL_CONFIG_VAR: &str = "HOTCONF_LOCAL_CONFIG";

/// Where to look for configuration files and which overlays to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Directories searched, in order, for `<name>.<ext>`. First match wins.
    pub search_dirs: Vec<PathBuf>,
    /// Directory holding the override, tests and environment overlays.
    pub config_dir: PathBuf,
    /// File extensions tried for the base file, in order.
    pub extensions: Vec<String>,
    /// Stem of the fixed override overlay.
    pub override_stem: String,
    /// Stem of the fixed tests overlay.
    pub tests_stem: String,
    /// Variables selecting the environment overlay, highest priority first.
    pub env_vars: Vec<String>,
    /// Whether loaded configurations are watched for changes.
    pub watch: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            search_dirs: vec![PathBuf::from(DEFAULT_CONFIG_DIR)],
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            extensions: vec!["yaml".to_string(), "yml".to_string()],
            override_stem: "override".to_string(),
            tests_stem: "tests".to_string(),
            env_vars: vec![
                PROD_CONFIG_VAR.to_string(),
                STAGE_CONFIG_VAR.to_string(),
                LOCAL_CONFIG_VAR.to_string(),
            ],
            watch: true,
        }
    }
}

/// Builder for a [`ConfigStore`].
pub struct StoreBuilder {
    settings: StoreSettings,
    search_dirs_set: bool,
    source: Arc<dyn FileSource>,
    env: Arc<dyn EnvLookup>,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBuilder {
    /// Starts from the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: StoreSettings::default(),
            search_dirs_set: false,
            source: Arc::new(FsSource),
            env: Arc::new(ProcessEnv),
        }
    }

    /// Starts from the defaults with `HOTCONF_*` environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if an override has an invalid value.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::new();
        EnvironmentSettings::apply_overrides(&mut builder.settings, &ProcessEnv)?;
        Ok(builder)
    }

    /// Appends a search directory.
    ///
    /// The first call replaces the default search path.
    #[must_use]
    pub fn search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        if !self.search_dirs_set {
            self.settings.search_dirs.clear();
            self.search_dirs_set = true;
        }
        self.settings.search_dirs.push(dir.into());
        self
    }

    /// Replaces the search path.
    #[must_use]
    pub fn search_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.settings.search_dirs = dirs.into_iter().map(Into::into).collect();
        self.search_dirs_set = true;
        self
    }

    /// Sets the overlay directory.
    #[must_use]
    pub fn config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.config_dir = dir.into();
        self
    }

    /// Replaces the environment variables consulted for the environment
    /// overlay, highest priority first.
    #[must_use]
    pub fn env_vars<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.env_vars = vars.into_iter().map(Into::into).collect();
        self
    }

    /// Enables or disables file watching.
    #[must_use]
    pub fn watch(mut self, enabled: bool) -> Self {
        self.settings.watch = enabled;
        self
    }

    /// Routes all file access through `source`.
    #[must_use]
    pub fn file_source(mut self, source: Arc<dyn FileSource>) -> Self {
        self.source = source;
        self
    }

    /// Resolves environment overlays through `env` instead of the process
    /// environment.
    #[must_use]
    pub fn env_lookup(mut self, env: Arc<dyn EnvLookup>) -> Self {
        self.env = env;
        self
    }

    /// Replaces all settings at once.
    #[must_use]
    pub fn settings(mut self, settings: StoreSettings) -> Self {
        self.settings = settings;
        self.search_dirs_set = true;
        self
    }

    /// Builds the store.
    #[must_use]
    pub fn build(self) -> ConfigStore {
        ConfigStore::from_parts(self.settings, self.source, self.env)
    }
}
