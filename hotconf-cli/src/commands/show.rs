//! Command to print a merged configuration.

use crate::error::CliError;
use crate::utils::{build_static_store, render, GlobalOptions, OutputFormat};
use clap::Args;
use hotconf::{ConfigMerger, FsSource, MergeReport};
use serde_yaml::Value;

/// Load a configuration and print the merged result.
#[derive(Args)]
pub struct ShowCommand {
    /// Configuration name (case-insensitive)
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Also print which files contributed, as comments (YAML) or a wrapper object (JSON)
    #[arg(long)]
    pub report: bool,
}

impl ShowCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let store = build_static_store(global)?;

        if !self.report {
            let live = store.load_config::<Value>(self.name.as_str())?;
            print!("{}", render(&live.read(), self.format)?);
            return Ok(());
        }

        let paths = store.resolve(self.name.as_str())?;
        let merged = ConfigMerger::merge_all(&paths, &FsSource)?;

        match self.format {
            OutputFormat::Yaml => {
                print!("{}", report_comments(&merged.report));
                print!("{}", render(&merged.tree, OutputFormat::Yaml)?);
            }
            OutputFormat::Json => {
                let mut wrapper = serde_yaml::Mapping::new();
                wrapper.insert("report".into(), report_value(&merged.report));
                wrapper.insert("config".into(), merged.tree);
                print!("{}", render(&Value::Mapping(wrapper), OutputFormat::Json)?);
            }
        }
        Ok(())
    }
}

fn report_comments(report: &MergeReport) -> String {
    let mut out = format!("# base: {}\n", report.base.display());
    for path in &report.applied {
        out.push_str(&format!("# applied: {}\n", path.display()));
    }
    for skipped in &report.skipped {
        out.push_str(&format!(
            "# skipped: {} ({})\n",
            skipped.path.display(),
            skipped.error
        ));
    }
    out
}

fn report_value(report: &MergeReport) -> Value {
    let mut map = serde_yaml::Mapping::new();
    map.insert("base".into(), report.base.display().to_string().into());

    let applied = report
        .applied
        .iter()
        .map(|p| Value::from(p.display().to_string()))
        .collect();
    map.insert("applied".into(), Value::Sequence(applied));

    let skipped = report
        .skipped
        .iter()
        .map(|s| {
            let mut entry = serde_yaml::Mapping::new();
            entry.insert("path".into(), s.path.display().to_string().into());
            entry.insert("error".into(), s.error.to_string().into());
            Value::Mapping(entry)
        })
        .collect();
    map.insert("skipped".into(), Value::Sequence(skipped));
    Value::Mapping(map)
}
