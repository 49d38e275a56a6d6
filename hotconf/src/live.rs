//! Shared, in-place updatable configuration values.
//!
//! A [`Live<T>`] is the handle the cache gives out. All clones point at the
//! same slot; a reload swaps a whole new value into that slot, so holders
//! see the update on their next read and never see a half-written value.
//! Readers never block a reload and a reload never blocks readers.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;

struct Shared<T> {
    value: ArcSwap<T>,
    generation: Mutex<u64>,
    changed: Condvar,
}

/// A cached configuration value that reloads update in place.
///
/// # Examples
///
/// ```
/// use hotconf::StoreBuilder;
///
/// let store = StoreBuilder::new().watch(false).build();
/// let live = store.store_in_cache("limits", 10_u32).unwrap();
///
/// assert_eq!(*live.read(), 10);
/// assert_eq!(live.generation(), 0);
///
/// let again = store.load_from_cache::<u32>("LIMITS").unwrap().unwrap();
/// assert!(live.ptr_eq(&again));
/// ```
pub struct Live<T> {
    inner: Arc<Shared<T>>,
}

impl<T> Clone for Live<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Live<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Shared {
                value: ArcSwap::from_pointee(value),
                generation: Mutex::new(0),
                changed: Condvar::new(),
            }),
        }
    }

    /// Returns the current value.
    ///
    /// The returned `Arc` is a consistent view; a reload that lands while it
    /// is held does not change it.
    #[must_use]
    pub fn read(&self) -> Arc<T> {
        self.inner.value.load_full()
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        T::clone(&self.read())
    }

    /// Number of in-place updates applied since the first load.
    #[must_use]
    pub fn generation(&self) -> u64 {
        *self
            .inner
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until [`generation`](Self::generation) reaches `at_least` or
    /// `timeout` elapses. Returns `true` if the generation was reached.
    ///
    /// A timeout too large to represent waits without a deadline.
    pub fn wait_for_generation(&self, at_least: u64, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut generation = self
            .inner
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        while *generation < at_least {
            generation = match deadline {
                None => self
                    .inner
                    .changed
                    .wait(generation)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    self.inner
                        .changed
                        .wait_timeout(generation, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
        true
    }

    /// Returns `true` if both handles refer to the same cached value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Swaps in a new value and bumps the generation.
    pub(crate) fn replace(&self, value: T) -> u64 {
        self.inner.value.store(Arc::new(value));

        let mut generation = self
            .inner
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        self.inner.changed.notify_all();
        *generation
    }
}

impl<T: fmt::Debug> fmt::Debug for Live<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Live")
            .field("value", &*self.read())
            .field("generation", &self.generation())
            .finish()
    }
}
