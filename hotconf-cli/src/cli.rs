//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{PathsCommand, ShowCommand, WatchCommand};
use crate::utils::GlobalOptions;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect layered YAML configuration.
#[derive(Parser)]
#[command(name = "hotconf")]
#[command(version, about = "Inspect layered YAML configuration", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Directory holding overlays (and base files unless --search-dir is given)
    #[arg(long, value_name = "PATH", global = true, env = "HOTCONF_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory searched for base files; may be repeated, first match wins
    #[arg(long = "search-dir", value_name = "PATH", global = true)]
    pub search_dirs: Vec<PathBuf>,

    /// Disable file watching
    #[arg(long, global = true)]
    pub no_watch: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Split off the options every command shares.
    pub fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            verbose: self.verbose,
            quiet: self.quiet,
            config_dir: self.config_dir.clone(),
            search_dirs: self.search_dirs.clone(),
            no_watch: self.no_watch,
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Print the merged configuration for a name
    Show(ShowCommand),

    /// Show where a configuration would be loaded from
    Paths(PathsCommand),

    /// Print a configuration again after every reload
    Watch(WatchCommand),
}
