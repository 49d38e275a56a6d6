//! Process-wide cache of loaded configurations.
//!
//! Each name maps to a slot holding at most one [`Live<T>`]. Slots carry a
//! load lock so that concurrent misses for the same name run the loader
//! once; misses for different names only contend on the brief map lock.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::error::{Error, Result};
use crate::live::Live;
use crate::name::ConfigName;

type Erased = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct Slot {
    value: OnceLock<Erased>,
    load_lock: Mutex<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Concurrency-safe map from configuration name to its live value.
///
/// The cache never evicts on its own; [`remove`](Self::remove) is the only
/// way an entry goes away.
///
/// # Examples
///
/// ```
/// use hotconf::{ConfigCache, ConfigName};
///
/// let cache = ConfigCache::new();
/// let name = ConfigName::new("events").unwrap();
///
/// let first = cache.put(&name, 1_u32).unwrap();
/// let second = cache.put(&name, 2_u32).unwrap();
///
/// // first writer wins
/// assert!(first.ptr_eq(&second));
/// assert_eq!(*second.read(), 1);
/// ```
#[derive(Default)]
pub struct ConfigCache {
    slots: Mutex<HashMap<ConfigName, Arc<Slot>>>,
}

impl ConfigCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, name: &ConfigName) -> Arc<Slot> {
        Arc::clone(lock(&self.slots).entry(name.clone()).or_default())
    }

    fn existing_slot(&self, name: &ConfigName) -> Option<Arc<Slot>> {
        lock(&self.slots).get(name).cloned()
    }

    fn downcast<T: Send + Sync + 'static>(name: &ConfigName, erased: &Erased) -> Result<Live<T>> {
        erased
            .downcast_ref::<Live<T>>()
            .cloned()
            .ok_or_else(|| Error::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Returns the cached value for `name`, if any.
    ///
    /// Never touches the file system and never waits for an in-flight load.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `name` holds a different type.
    pub fn get<T: Send + Sync + 'static>(&self, name: &ConfigName) -> Result<Option<Live<T>>> {
        match self.existing_slot(name).and_then(|slot| slot.value.get().cloned()) {
            Some(erased) => Self::downcast(name, &erased).map(Some),
            None => Ok(None),
        }
    }

    /// Stores `value` under `name` unless something is already there.
    ///
    /// Returns the canonical handle: the new one if this call won, the
    /// existing one otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `name` already holds a different type.
    pub fn put<T: Send + Sync + 'static>(&self, name: &ConfigName, value: T) -> Result<Live<T>> {
        let slot = self.slot(name);
        let erased = slot
            .value
            .get_or_init(|| Arc::new(Live::new(value)) as Erased);
        Self::downcast(name, erased)
    }

    /// Returns the cached value, or runs `loader` once and caches its result.
    ///
    /// Concurrent callers missing on the same name wait for the single
    /// in-flight load. A failed load caches nothing.
    ///
    /// # Errors
    ///
    /// Propagates the loader's error, or [`Error::TypeMismatch`].
    pub fn load_or_create<T, F>(&self, name: &ConfigName, loader: F) -> Result<Live<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<T>,
    {
        self.load_or_create_tracked(name, loader).map(|(live, _)| live)
    }

    /// Like [`load_or_create`](Self::load_or_create), also reporting whether
    /// this call created the entry.
    pub(crate) fn load_or_create_tracked<T, F>(
        &self,
        name: &ConfigName,
        loader: F,
    ) -> Result<(Live<T>, bool)>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<T>,
    {
        let slot = self.slot(name);
        if let Some(erased) = slot.value.get() {
            return Ok((Self::downcast(name, erased)?, false));
        }

        let _loading = lock(&slot.load_lock);
        if let Some(erased) = slot.value.get() {
            return Ok((Self::downcast(name, erased)?, false));
        }

        let fresh: Erased = Arc::new(Live::new(loader()?));
        let mut created = false;
        let stored = slot.value.get_or_init(|| {
            created = true;
            fresh
        });
        Ok((Self::downcast(name, stored)?, created))
    }

    /// Drops the entry for `name`. Returns `true` if there was one.
    ///
    /// Handles already given out stay valid but are no longer reachable
    /// through the cache.
    pub fn remove(&self, name: &ConfigName) -> bool {
        lock(&self.slots)
            .remove(name)
            .is_some_and(|slot| slot.value.get().is_some())
    }

    /// Returns `true` if `name` has a cached value.
    #[must_use]
    pub fn contains(&self, name: &ConfigName) -> bool {
        self.existing_slot(name)
            .is_some_and(|slot| slot.value.get().is_some())
    }

    /// Names with cached values, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<ConfigName> {
        let mut names: Vec<ConfigName> = lock(&self.slots)
            .iter()
            .filter(|(_, slot)| slot.value.get().is_some())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Number of cached values.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.slots)
            .values()
            .filter(|slot| slot.value.get().is_some())
            .count()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
