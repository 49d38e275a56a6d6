//! Utility functions for CLI operations.
//!
//! This module provides common utilities used across CLI commands: the
//! global options, store construction and output rendering.

use crate::error::CliError;
use clap::ValueEnum;
use hotconf::settings::SEARCH_PATH_VAR;
use hotconf::{ConfigStore, StoreBuilder};
use serde_yaml::Value;
use std::env;
use std::path::PathBuf;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
#[allow(dead_code)] // verbose/quiet are consumed by the logger in main.rs
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Directory holding base files and overlays.
    pub config_dir: Option<PathBuf>,

    /// Directories searched for base files, in order.
    pub search_dirs: Vec<PathBuf>,

    /// Disable file watching.
    pub no_watch: bool,
}

/// Build a store from the environment and the global options.
///
/// Options take precedence over `HOTCONF_*` variables. When no search
/// directory is given anywhere, base files are looked up in the config
/// directory.
pub fn build_store(global: &GlobalOptions) -> Result<ConfigStore, CliError> {
    Ok(store_builder(global)?.build())
}

/// Like [`build_store`], but never watches files.
///
/// For one-shot commands that exit right after loading.
pub fn build_static_store(global: &GlobalOptions) -> Result<ConfigStore, CliError> {
    Ok(store_builder(global)?.watch(false).build())
}

fn store_builder(global: &GlobalOptions) -> Result<StoreBuilder, CliError> {
    let mut builder = StoreBuilder::from_env()?;

    if let Some(dir) = &global.config_dir {
        builder = builder.config_dir(dir);
    }

    if !global.search_dirs.is_empty() {
        builder = builder.search_dirs(global.search_dirs.iter());
    } else if let Some(dir) = &global.config_dir {
        if env::var_os(SEARCH_PATH_VAR).is_none() {
            builder = builder.search_dirs([dir]);
        }
    }

    if global.no_watch {
        builder = builder.watch(false);
    }

    Ok(builder)
}

/// Output format for configuration trees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML (the format the files are written in)
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
}

/// Render a configuration tree in the given format.
pub fn render(tree: &Value, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Yaml => {
            serde_yaml::to_string(tree).map_err(|e| CliError::Format(e.to_string()))
        }
        OutputFormat::Json => serde_json::to_string_pretty(tree)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| CliError::Format(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_static_store_never_watches() {
        let dir = tempfile::TempDir::new().unwrap();
        let global = GlobalOptions {
            config_dir: Some(dir.path().to_path_buf()),
            ..GlobalOptions::default()
        };

        assert!(!build_static_store(&global).unwrap().settings().watch);
    }

    #[test]
    fn test_render_yaml() {
        let out = render(&yaml("topic: orders\nretries: 3"), OutputFormat::Yaml).unwrap();
        assert_eq!(out, "topic: orders\nretries: 3\n");
    }

    #[test]
    fn test_render_json() {
        let out = render(&yaml("topic: orders\nnested: {a: [1, 2]}"), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["nested"]["a"][1], 2);
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_render_json_rejects_non_string_keys() {
        let tree = yaml("? [1, 2]\n: value");
        assert!(matches!(
            render(&tree, OutputFormat::Json),
            Err(CliError::Format(_))
        ));
    }
}
