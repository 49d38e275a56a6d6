//! Background reloading of cached configurations.
//!
//! # Data Flow
//! ```text
//! notify event for a watched file
//!     → filtered against the configuration's file set
//!     → signal on the per-name channel
//!     → reload thread: merge + decode into a fresh value
//!     → Live<T>::replace swaps the new value in
//! ```
//!
//! File watches are registered before the first load reads anything, so an
//! edit racing that load still produces a reload. Each watched name gets one
//! thread, so reloads of a name never overlap.
//! Signals that pile up while a reload runs are coalesced into a single
//! follow-up reload. A failed reload is logged and the cached value is left
//! as it was.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use serde::de::DeserializeOwned;

use crate::decode::decode;
use crate::error::{Error, Result};
use crate::layers::ConfigMerger;
use crate::live::Live;
use crate::name::ConfigName;
use crate::resolve::ResolvedPaths;
use crate::source::FileSource;

/// Lifecycle of a configuration's watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Not watching (never loaded, watching disabled, or stopped).
    Unarmed,
    /// Waiting for change notifications.
    Armed,
    /// A reload is running.
    Reloading,
}

impl WatchState {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Unarmed => 0,
            Self::Armed => 1,
            Self::Reloading => 2,
        }
    }

    const fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Armed,
            2 => Self::Reloading,
            _ => Self::Unarmed,
        }
    }
}

#[derive(Debug)]
struct StateCell(AtomicU8);

impl StateCell {
    fn new(state: WatchState) -> Self {
        Self(AtomicU8::new(state.as_u8()))
    }

    fn get(&self) -> WatchState {
        WatchState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn set(&self, state: WatchState) {
        self.0.store(state.as_u8(), Ordering::Release);
    }
}

/// Re-runs the load pipeline for one cached configuration.
pub(crate) trait Reload: Send + Sync {
    fn name(&self) -> &ConfigName;
    fn reload(&self) -> Result<()>;
}

/// The typed reload pipeline for a `Live<T>`.
pub(crate) struct Reloader<T> {
    paths: ResolvedPaths,
    source: Arc<dyn FileSource>,
    live: Live<T>,
    serial: Mutex<()>,
}

impl<T> Reloader<T> {
    pub(crate) fn new(paths: ResolvedPaths, source: Arc<dyn FileSource>, live: Live<T>) -> Self {
        Self {
            paths,
            source,
            live,
            serial: Mutex::new(()),
        }
    }
}

impl<T> Reload for Reloader<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    fn name(&self) -> &ConfigName {
        &self.paths.name
    }

    fn reload(&self) -> Result<()> {
        let _serial = self.serial.lock().unwrap_or_else(PoisonError::into_inner);

        let attempt = ConfigMerger::merge_all(&self.paths, self.source.as_ref()).and_then(|merged| {
            let value: T = decode(&self.paths.name, &merged.tree)?;
            Ok((value, merged.report))
        });

        match attempt {
            Ok((value, report)) => {
                let generation = self.live.replace(value);
                log::info!(
                    name = self.paths.name.as_str(),
                    path:% = report.base.display(),
                    generation = generation;
                    "configuration reloaded"
                );
                Ok(())
            }
            Err(e) => Err(Error::Reload {
                name: self.paths.name.to_string(),
                source: Box::new(e),
            }),
        }
    }
}

enum Signal {
    Changed,
    Stop,
}

/// Keeps a configuration's watcher alive; dropping it stops watching.
pub struct WatchHandle {
    reloader: Arc<dyn Reload>,
    state: Arc<StateCell>,
    signals: Option<Sender<Signal>>,
    fs_watcher: Option<RecommendedWatcher>,
}

impl WatchHandle {
    /// Current state of the watcher.
    #[must_use]
    pub fn state(&self) -> WatchState {
        self.state.get()
    }

    /// Whether file-system notifications are being delivered.
    #[must_use]
    pub fn is_watching_files(&self) -> bool {
        self.fs_watcher.is_some()
    }

    /// Delivers a change notification as if a watched file had changed.
    ///
    /// The reload happens on the watcher thread; returns `false` if the
    /// watcher is not running.
    pub fn trigger(&self) -> bool {
        self.signals
            .as_ref()
            .is_some_and(|tx| tx.send(Signal::Changed).is_ok())
    }

    /// Reloads on the calling thread and returns the outcome.
    ///
    /// Serialized with reloads run by the watcher thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Reload`] if merging or decoding failed; the cached
    /// value is unchanged in that case.
    pub fn reload_now(&self) -> Result<()> {
        self.reloader.reload()
    }

    pub(crate) fn reloader(&self) -> Arc<dyn Reload> {
        Arc::clone(&self.reloader)
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        // stop file events before asking the thread to exit
        self.fs_watcher.take();
        if let Some(tx) = self.signals.take() {
            let _ = tx.send(Signal::Stop);
        }
    }
}

/// Arms reload watchers.
pub(crate) struct ReloadWatcher;

impl ReloadWatcher {
    /// Creates a handle that only reloads on demand.
    pub(crate) fn unarmed(reloader: Arc<dyn Reload>) -> WatchHandle {
        WatchHandle {
            reloader,
            state: Arc::new(StateCell::new(WatchState::Unarmed)),
            signals: None,
            fs_watcher: None,
        }
    }

    /// Starts the reload thread and, if `files` is non-empty, watches them.
    ///
    /// # Errors
    ///
    /// See [`prepare`](Self::prepare).
    pub(crate) fn arm(reloader: Arc<dyn Reload>, files: &[PathBuf]) -> Result<WatchHandle> {
        Self::prepare(reloader.name(), files)?.start(reloader)
    }

    /// Registers `files` with the OS watcher without starting a reload thread.
    ///
    /// Changes seen from here on are queued and replayed once the thread
    /// starts, so a load that runs in between cannot miss an edit. Files are
    /// watched through their parent directories so that editors replacing a
    /// file by rename are still noticed. Directories that do not exist are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Watch`] if the OS watcher cannot be created or a
    /// directory cannot be registered.
    pub(crate) fn prepare(name: &ConfigName, files: &[PathBuf]) -> Result<PendingWatch> {
        let (tx, rx) = mpsc::channel();

        let fs_watcher = if files.is_empty() {
            None
        } else {
            Some(Self::watch_files(name, files, tx.clone())?)
        };

        Ok(PendingWatch {
            files: files.len(),
            tx,
            rx,
            fs_watcher,
        })
    }

    fn run(reloader: &dyn Reload, rx: &Receiver<Signal>, state: &StateCell) {
        while let Ok(signal) = rx.recv() {
            if matches!(signal, Signal::Stop) || Self::drain(rx) {
                break;
            }

            state.set(WatchState::Reloading);
            if let Err(e) = reloader.reload() {
                log::error!(
                    name = reloader.name().as_str();
                    "keeping previous configuration: {e}"
                );
            }
            state.set(WatchState::Armed);
        }
        state.set(WatchState::Unarmed);
    }

    /// Swallows queued change signals. Returns `true` if a stop was seen.
    fn drain(rx: &Receiver<Signal>) -> bool {
        loop {
            match rx.try_recv() {
                Ok(Signal::Changed) => {}
                Ok(Signal::Stop) | Err(TryRecvError::Disconnected) => return true,
                Err(TryRecvError::Empty) => return false,
            }
        }
    }

    fn watch_files(
        name: &ConfigName,
        files: &[PathBuf],
        tx: Sender<Signal>,
    ) -> Result<RecommendedWatcher> {
        let mut targets = HashSet::new();
        let mut dirs = BTreeSet::new();
        for file in files {
            if let Some((dir, target)) = watch_target(file) {
                dirs.insert(dir);
                targets.insert(target);
            }
        }

        let log_name = name.to_string();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if is_change(&event.kind) && event.paths.iter().any(|p| targets.contains(p)) {
                        log::debug!(name = log_name.as_str(); "configuration file changed");
                        let _ = tx.send(Signal::Changed);
                    }
                }
                Err(e) => log::warn!(name = log_name.as_str(); "watch error: {e}"),
            }
        })?;

        for dir in &dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
        }
        Ok(watcher)
    }
}

/// File watches registered ahead of the reload thread.
pub(crate) struct PendingWatch {
    files: usize,
    tx: Sender<Signal>,
    rx: Receiver<Signal>,
    fs_watcher: Option<RecommendedWatcher>,
}

impl PendingWatch {
    /// Starts the reload thread for `reloader`, draining any queued changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Watch`] if the thread cannot be spawned. The file
    /// watches are dropped in that case.
    pub(crate) fn start(self, reloader: Arc<dyn Reload>) -> Result<WatchHandle> {
        let Self {
            files,
            tx,
            rx,
            fs_watcher,
        } = self;

        let state = Arc::new(StateCell::new(WatchState::Armed));
        let worker_state = Arc::clone(&state);
        let worker_reloader = Arc::clone(&reloader);
        thread::Builder::new()
            .name(format!("hotconf-{}", reloader.name()))
            .spawn(move || ReloadWatcher::run(worker_reloader.as_ref(), &rx, &worker_state))
            .map_err(|e| Error::Watch(notify::Error::io(e)))?;

        log::debug!(
            name = reloader.name().as_str(),
            files = files;
            "reload watcher armed"
        );

        Ok(WatchHandle {
            reloader,
            state,
            signals: Some(tx),
            fs_watcher,
        })
    }
}

/// Canonical parent directory and canonical file path for `file`.
fn watch_target(file: &Path) -> Option<(PathBuf, PathBuf)> {
    let parent = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let dir = parent.canonicalize().ok()?;
    let target = dir.join(file.file_name()?);
    Some((dir, target))
}

fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) | EventKind::Any
    )
}
