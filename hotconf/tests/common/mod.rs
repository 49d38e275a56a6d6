//! Common test utilities for integration tests.
//!
//! Provides a temporary configuration tree, a file source that counts reads,
//! and an environment variable guard.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use hotconf::{ConfigStore, FileSource, FsSource, StoreBuilder};
use serde::Deserialize;
use tempfile::{NamedTempFile, TempDir};

/// A typical service configuration used across the tests.
#[allow(dead_code)]
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Events {
    pub topic: String,
    pub retries: u32,
    pub brokers: Vec<String>,
    pub tls: Tls,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Tls {
    pub enabled: bool,
    pub ca: String,
}

/// A temporary directory used both as search path and overlay directory.
pub struct ConfigTree {
    dir: TempDir,
}

#[allow(dead_code)]
impl ConfigTree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `<stem>.yaml` atomically and returns its path.
    ///
    /// Watchers may reload at any moment; a rename guarantees they never
    /// read a half-written file.
    pub fn write(&self, stem: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(format!("{stem}.yaml"));
        let mut tmp = NamedTempFile::new_in(self.dir.path()).unwrap();
        tmp.write_all(contents.as_bytes()).unwrap();
        tmp.persist(&path).unwrap();
        path
    }

    pub fn remove(&self, stem: &str) {
        fs::remove_file(self.dir.path().join(format!("{stem}.yaml"))).unwrap();
    }

    /// A builder pointed at this tree with no environment overlay.
    pub fn builder(&self) -> StoreBuilder {
        StoreBuilder::new()
            .search_dir(self.path())
            .config_dir(self.path())
            .env_lookup(Arc::new(HashMap::<String, String>::new()))
    }

    /// A store without file watching.
    pub fn store(&self) -> ConfigStore {
        self.builder().watch(false).build()
    }

    /// A store without file watching whose reads are counted.
    pub fn counted_store(&self) -> (ConfigStore, Arc<CountingSource>) {
        let source = Arc::new(CountingSource::default());
        let store = self
            .builder()
            .watch(false)
            .file_source(source.clone())
            .build();
        (store, source)
    }
}

/// Reads through to the file system, recording every read.
#[derive(Default)]
pub struct CountingSource {
    reads: Mutex<Vec<PathBuf>>,
}

#[allow(dead_code)]
impl CountingSource {
    pub fn total(&self) -> usize {
        self.reads.lock().unwrap().len()
    }

    pub fn reads_of(&self, path: &Path) -> usize {
        self.reads
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.as_path() == path)
            .count()
    }
}

impl FileSource for CountingSource {
    fn exists(&self, path: &Path) -> bool {
        FsSource.exists(path)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        self.reads.lock().unwrap().push(path.to_path_buf());
        FsSource.read(path)
    }
}

/// RAII guard for setting and restoring environment variables.
///
/// Tests using it must be marked `#[serial]`.
#[allow(dead_code)]
pub struct EnvGuard {
    key: String,
    old_value: Option<String>,
}

#[allow(dead_code)]
impl EnvGuard {
    pub fn new(key: &str, value: &str) -> Self {
        let old_value = env::var(key).ok();
        env::set_var(key, value);
        Self {
            key: key.to_string(),
            old_value,
        }
    }

    pub fn remove(key: &str) -> Self {
        let old_value = env::var(key).ok();
        env::remove_var(key);
        Self {
            key: key.to_string(),
            old_value,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.old_value {
            Some(val) => env::set_var(&self.key, val),
            None => env::remove_var(&self.key),
        }
    }
}

/// Clears every `HOTCONF_*` variable for the duration of a test.
#[allow(dead_code)]
pub fn clear_hotconf_env_vars() -> Vec<EnvGuard> {
    [
        "HOTCONF_CONFIG_DIR",
        "HOTCONF_SEARCH_PATH",
        "HOTCONF_WATCH",
        "HOTCONF_PROD_CONFIG",
        "HOTCONF_STAGE_CONFIG",
        "HOTCONF_LOCAL_CONFIG",
    ]
    .iter()
    .map(|k| EnvGuard::remove(k))
    .collect()
}
