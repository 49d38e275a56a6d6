//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with a temporary config directory
//! - Command builder helpers with the `HOTCONF_*` environment cleared

use assert_cmd::Command;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

const HOTCONF_VARS: [&str; 7] = [
    "HOTCONF_CONFIG_DIR",
    "HOTCONF_SEARCH_PATH",
    "HOTCONF_WATCH",
    "HOTCONF_PROD_CONFIG",
    "HOTCONF_STAGE_CONFIG",
    "HOTCONF_LOCAL_CONFIG",
    "HOTCONF_LOG_MODE",
];

/// Test environment with an isolated config directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Directory passed as --config-dir
    pub config_dir: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment with an empty config directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().join("config");
        std::fs::create_dir_all(&config_dir).expect("Failed to create config dir");
        Self {
            temp_dir,
            config_dir,
        }
    }

    /// Get a bare command builder with no flags and a clean environment.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("hotconf").expect("Failed to find hotconf binary");
        for var in HOTCONF_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Get a command builder with --config-dir pointing at this environment.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--config-dir").arg(&self.config_dir);
        cmd
    }

    /// A std command for long-running invocations such as `watch`.
    pub fn std_command(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin("hotconf"));
        for var in HOTCONF_VARS {
            cmd.env_remove(var);
        }
        cmd.arg("--config-dir").arg(&self.config_dir);
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Atomically write `<stem>.yaml` into the config directory.
    pub fn write(&self, stem: &str, contents: &str) -> PathBuf {
        self.write_in(&self.config_dir, stem, contents)
    }

    /// Atomically write `<stem>.yaml` into `dir`, creating it if needed.
    pub fn write_in(&self, dir: &Path, stem: &str, contents: &str) -> PathBuf {
        std::fs::create_dir_all(dir).expect("Failed to create directory");
        let path = dir.join(format!("{stem}.yaml"));
        let mut tmp = NamedTempFile::new_in(dir).expect("Failed to create temp file");
        tmp.write_all(contents.as_bytes())
            .expect("Failed to write temp file");
        tmp.persist(&path).expect("Failed to persist config file");
        path
    }
}
