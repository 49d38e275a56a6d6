//! Command to follow a configuration as it is reloaded.

use crate::error::CliError;
use crate::utils::{build_store, render, GlobalOptions, OutputFormat};
use clap::Args;
use serde_yaml::Value;
use std::io::Write;
use std::time::Duration;

/// Print a configuration, then print it again after every reload.
#[derive(Args)]
pub struct WatchCommand {
    /// Configuration name (case-insensitive)
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Exit after this many reloads
    #[arg(long, value_name = "N")]
    pub count: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

impl WatchCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        if global.no_watch {
            return Err(CliError::InvalidArguments(
                "watch cannot be combined with --no-watch".to_string(),
            ));
        }

        let store = build_store(global)?;
        if !store.settings().watch {
            return Err(CliError::InvalidArguments(
                "file watching is disabled (HOTCONF_WATCH)".to_string(),
            ));
        }

        let live = store.load_config::<Value>(self.name.as_str())?;
        self.emit(&live.snapshot())?;

        let mut seen = live.generation();
        let mut reloads = 0;
        while self.count.map_or(true, |limit| reloads < limit) {
            if !live.wait_for_generation(seen + 1, Duration::from_secs(60)) {
                continue;
            }
            let generation = live.generation();
            reloads += generation - seen;
            seen = generation;

            log::info!(name = self.name.as_str(), generation = generation; "reloaded");
            self.emit(&live.snapshot())?;
        }
        Ok(())
    }

    fn emit(&self, tree: &Value) -> Result<(), CliError> {
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "---\n{}", render(tree, self.format)?)?;
        stdout.flush()?;
        Ok(())
    }
}
