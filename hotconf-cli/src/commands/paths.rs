//! Command to show where a configuration would be loaded from.

use crate::error::CliError;
use crate::utils::{build_static_store, GlobalOptions};
use clap::Args;
use hotconf::{OverlayKind, ResolvedPaths};
use std::path::Path;

/// Print base candidates and overlays for a name, marking which exist.
#[derive(Args)]
pub struct PathsCommand {
    /// Configuration name (case-insensitive)
    #[arg(value_name = "NAME")]
    pub name: String,
}

impl PathsCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let store = build_static_store(global)?;
        let paths = store.resolve(self.name.as_str())?;
        print!("{}", describe(&paths, |p| p.is_file()));
        Ok(())
    }
}

fn mark(found: bool) -> &'static str {
    if found {
        "[found]  "
    } else {
        "[missing]"
    }
}

fn label(kind: &OverlayKind) -> String {
    match kind {
        OverlayKind::Override => "override".to_string(),
        OverlayKind::Tests => "tests".to_string(),
        OverlayKind::Environment { var } => format!("env ({var})"),
    }
}

fn describe(paths: &ResolvedPaths, exists: impl Fn(&Path) -> bool) -> String {
    let mut out = format!("base candidates for '{}':\n", paths.name);
    for candidate in &paths.base_candidates {
        out.push_str(&format!("  {} {}\n", mark(exists(candidate)), candidate.display()));
    }

    out.push_str("overlays (later wins):\n");
    for overlay in &paths.overlays {
        out.push_str(&format!(
            "  {} {:<8} {}\n",
            mark(exists(&overlay.path)),
            label(&overlay.kind),
            overlay.path.display()
        ));
    }
    out
}
