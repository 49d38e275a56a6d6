//! Layered configuration loading.
//!
//! # Precedence
//!
//! Layers are applied from lowest to highest precedence:
//!
//! 1. Base file: `<search-dir>/<name>.yaml`, first parsable match on the
//!    search path
//! 2. `<config-dir>/override.yaml`
//! 3. `<config-dir>/tests.yaml`
//! 4. `<config-dir>/<value>.yaml`, where `<value>` comes from the first
//!    non-empty of `HOTCONF_PROD_CONFIG`, `HOTCONF_STAGE_CONFIG`,
//!    `HOTCONF_LOCAL_CONFIG`
//!
//! Only the base file is required.

pub mod loader;
pub mod merger;

#[cfg(test)]
mod proptests;

pub use loader::{load_file, parse_document};
pub use merger::{ConfigMerger, MergeReport, MergedTree, SkippedOverlay};
