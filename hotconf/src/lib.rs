#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # hotconf
//!
//! Layered YAML configuration with a process-wide cache and hot reload.
//!
//! A configuration is identified by a case-insensitive name. Loading it
//! finds `<name>.yaml` in the search path, deep-merges the `override`,
//! `tests` and environment-selected overlays on top, decodes the result into
//! the caller's type and caches it. Later loads return the same instance,
//! which a background watcher updates in place when the files change.
//!
//! ## Core Types
//!
//! - [`ConfigStore`] and [`StoreBuilder`]: the loading facade and its setup
//! - [`Live`]: a cached value that reloads update in place
//! - [`ConfigName`]: normalized configuration names
//! - [`ConfigCache`]: the single-flight name to value map
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`] and [`LogLevel`]: a stderr backend for the `log` facade
//!
//! ## Examples
//!
//! ```no_run
//! use hotconf::StoreBuilder;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! #[serde(default)]
//! struct Gateway {
//!     host: String,
//!     port: u16,
//! }
//!
//! let store = StoreBuilder::from_env()?.build();
//! let gateway = store.load_config::<Gateway>("gateway")?;
//! println!("listening on {}:{}", gateway.read().host, gateway.read().port);
//! # Ok::<(), hotconf::Error>(())
//! ```

pub mod cache;
pub mod decode;
pub mod error;
pub mod layers;
pub mod live;
pub mod logging;
pub mod name;
pub mod resolve;
pub mod settings;
pub mod source;
pub mod store;
pub mod watcher;

// Re-export key types at crate root for convenience
pub use cache::ConfigCache;
pub use decode::{decode, decode_into};
pub use error::{Error, Result};
pub use layers::{ConfigMerger, MergeReport, MergedTree, SkippedOverlay};
pub use live::Live;
pub use logging::{init_logger, LogLevel, Logger};
pub use name::ConfigName;
pub use resolve::{resolve, Overlay, OverlayKind, ResolvedPaths};
pub use settings::{StoreBuilder, StoreSettings};
pub use source::{FileSource, FsSource};
pub use store::ConfigStore;
pub use watcher::{WatchHandle, WatchState};
