//! The configuration store.
//!
//! [`ConfigStore`] is constructed once at startup and passed by reference to
//! whatever needs configuration. It owns the cache and one watcher per
//! loaded name; dropping it stops all watchers.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;

use crate::cache::ConfigCache;
use crate::decode::decode;
use crate::error::{Error, Result};
use crate::layers::ConfigMerger;
use crate::live::Live;
use crate::name::ConfigName;
use crate::resolve::{resolve, ResolvedPaths};
use crate::settings::{EnvLookup, ProcessEnv, StoreBuilder, StoreSettings};
use crate::source::{FileSource, FsSource};
use crate::watcher::{PendingWatch, Reload, ReloadWatcher, Reloader, WatchHandle, WatchState};

/// Loads, caches and hot-reloads named configurations.
///
/// # Examples
///
/// ```no_run
/// use hotconf::StoreBuilder;
/// use serde::Deserialize;
///
/// #[derive(Debug, Clone, Default, Deserialize)]
/// #[serde(default)]
/// struct Events {
///     topic: String,
///     retries: u32,
/// }
///
/// let store = StoreBuilder::from_env()?.build();
/// let events = store.load_config::<Events>("events")?;
///
/// // later reads observe reloads without going back to the store
/// println!("topic = {}", events.read().topic);
/// # Ok::<(), hotconf::Error>(())
/// ```
pub struct ConfigStore {
    settings: StoreSettings,
    source: Arc<dyn FileSource>,
    env: Arc<dyn EnvLookup>,
    cache: ConfigCache,
    watchers: Mutex<HashMap<ConfigName, WatchHandle>>,
}

impl ConfigStore {
    /// Creates a store reading the local file system and process environment.
    #[must_use]
    pub fn new(settings: StoreSettings) -> Self {
        Self::from_parts(settings, Arc::new(FsSource), Arc::new(ProcessEnv))
    }

    /// Starts a [`StoreBuilder`].
    #[must_use]
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    pub(crate) fn from_parts(
        settings: StoreSettings,
        source: Arc<dyn FileSource>,
        env: Arc<dyn EnvLookup>,
    ) -> Self {
        Self {
            settings,
            source,
            env,
            cache: ConfigCache::new(),
            watchers: Mutex::new(HashMap::new()),
        }
    }

    /// The settings this store was built with.
    #[must_use]
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// The underlying cache.
    #[must_use]
    pub fn cache(&self) -> &ConfigCache {
        &self.cache
    }

    fn watchers(&self) -> MutexGuard<'_, HashMap<ConfigName, WatchHandle>> {
        self.watchers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Computes the candidate files for `name` without touching the disk.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a valid configuration name.
    pub fn resolve<N>(&self, name: N) -> Result<ResolvedPaths>
    where
        N: TryInto<ConfigName, Error = Error>,
    {
        let name = name.try_into()?;
        Ok(resolve(&name, &self.settings, self.env.as_ref()))
    }

    /// Returns the configuration for `name`, loading it on first use.
    ///
    /// The first call resolves, merges and decodes the files, caches the
    /// result and arms a watcher. Every later call returns the same cached
    /// instance without touching the file system. Concurrent first calls
    /// share one load.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyName`] / [`Error::InvalidName`] for bad names
    /// - [`Error::ResolutionEmpty`] if no base file exists
    /// - [`Error::Read`], [`Error::Parse`], [`Error::NotAMapping`] for an
    ///   unusable base file
    /// - [`Error::Decode`] if the merged tree does not fit `T`
    /// - [`Error::TypeMismatch`] if `name` is cached as another type
    pub fn load_config<T>(&self, name: impl TryInto<ConfigName, Error = Error>) -> Result<Live<T>>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let name = name.try_into()?;
        let mut first_load = None;

        let (live, created) = self.cache.load_or_create_tracked(&name, || {
            let paths = resolve(&name, &self.settings, self.env.as_ref());
            // watch before reading so an edit during the load is not lost
            let pending = self.prepare_watch(&paths);
            let value = self.load_fresh::<T>(&paths)?;
            first_load = Some((paths, pending));
            Ok(value)
        })?;

        if created {
            if let Some((paths, pending)) = first_load {
                self.arm(paths, pending, live.clone());
            }
        }
        Ok(live)
    }

    fn load_fresh<T>(&self, paths: &ResolvedPaths) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let name = &paths.name;
        let attempt = ConfigMerger::merge_all(paths, self.source.as_ref()).and_then(|merged| {
            let value: T = decode(name, &merged.tree)?;
            Ok((value, merged.report))
        });

        match attempt {
            Ok((value, report)) => {
                log::info!(
                    name = name.as_str(),
                    path:% = report.base.display(),
                    overlays = report.applied.len();
                    "configuration loaded"
                );
                Ok(value)
            }
            Err(e) => {
                log::error!(name = name.as_str(); "failed to load configuration: {e}");
                Err(e)
            }
        }
    }

    fn prepare_watch(&self, paths: &ResolvedPaths) -> Option<PendingWatch> {
        if !self.settings.watch {
            return None;
        }
        ReloadWatcher::prepare(&paths.name, &watched_files(paths))
            .map_err(|e| {
                log::error!(
                    name = paths.name.as_str();
                    "could not watch configuration files, reloads are manual only: {e}"
                );
            })
            .ok()
    }

    fn arm<T>(&self, paths: ResolvedPaths, pending: Option<PendingWatch>, live: Live<T>)
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let name = paths.name.clone();
        let reloader: Arc<dyn Reload> =
            Arc::new(Reloader::new(paths, Arc::clone(&self.source), live));

        let handle = match pending {
            Some(pending) => pending.start(Arc::clone(&reloader)).unwrap_or_else(|e| {
                log::error!(
                    name = name.as_str();
                    "could not start reload watcher, reloads are manual only: {e}"
                );
                ReloadWatcher::unarmed(reloader)
            }),
            None => ReloadWatcher::unarmed(reloader),
        };

        // a replaced handle is dropped after the lock is released
        let _previous = self.watchers().insert(name, handle);
    }

    /// Returns the cached configuration for `name` without loading it.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid names or [`Error::TypeMismatch`].
    pub fn load_from_cache<T>(
        &self,
        name: impl TryInto<ConfigName, Error = Error>,
    ) -> Result<Option<Live<T>>>
    where
        T: Send + Sync + 'static,
    {
        let name = name.try_into()?;
        self.cache.get(&name)
    }

    /// Seeds the cache with `value` unless `name` is already cached.
    ///
    /// Returns the canonical handle. Seeded values are never watched; a
    /// later [`load_config`](Self::load_config) returns the seeded value.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid names or [`Error::TypeMismatch`].
    pub fn store_in_cache<T>(
        &self,
        name: impl TryInto<ConfigName, Error = Error>,
        value: T,
    ) -> Result<Live<T>>
    where
        T: Send + Sync + 'static,
    {
        let name = name.try_into()?;
        self.cache.put(&name, value)
    }

    /// Re-reads the files for a loaded configuration on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoaded`] if `name` was not loaded through
    /// [`load_config`](Self::load_config), or [`Error::Reload`] if the
    /// reload failed (the cached value is unchanged).
    pub fn reload(&self, name: impl TryInto<ConfigName, Error = Error>) -> Result<()> {
        let name = name.try_into()?;
        let reloader = self
            .watchers()
            .get(&name)
            .map(WatchHandle::reloader)
            .ok_or_else(|| Error::NotLoaded {
                name: name.to_string(),
            })?;

        let result = reloader.reload();
        if let Err(e) = &result {
            log::error!(name = name.as_str(); "keeping previous configuration: {e}");
        }
        result
    }

    /// Delivers a change notification for `name` to its watcher thread.
    ///
    /// Returns `false` if `name` has no running watcher.
    pub fn notify_changed(&self, name: impl TryInto<ConfigName, Error = Error>) -> bool {
        name.try_into()
            .ok()
            .and_then(|name| self.watchers().get(&name).map(WatchHandle::trigger))
            .unwrap_or(false)
    }

    /// Current watcher state for `name`.
    #[must_use]
    pub fn watch_state(&self, name: impl TryInto<ConfigName, Error = Error>) -> WatchState {
        name.try_into()
            .ok()
            .and_then(|name| self.watchers().get(&name).map(WatchHandle::state))
            .unwrap_or(WatchState::Unarmed)
    }

    /// Forgets `name`: stops its watcher and removes it from the cache.
    ///
    /// Returns `true` if anything was removed. Handles already held keep
    /// their last value but no longer receive reloads.
    pub fn invalidate(&self, name: impl TryInto<ConfigName, Error = Error>) -> bool {
        let Ok(name) = name.try_into() else {
            return false;
        };
        let removed = self.watchers().remove(&name);
        let had_watcher = removed.is_some();
        let had_entry = self.cache.remove(&name);
        if had_watcher || had_entry {
            log::info!(name = name.as_str(); "configuration invalidated");
        }
        had_watcher || had_entry
    }
}

/// Files whose changes should trigger a reload: every base candidate and
/// every overlay, so a file created later is picked up.
fn watched_files(paths: &ResolvedPaths) -> Vec<PathBuf> {
    paths
        .base_candidates
        .iter()
        .chain(paths.overlays.iter().map(|o| &o.path))
        .cloned()
        .collect()
}
