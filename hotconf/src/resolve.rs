//! Path resolution.
//!
//! Turns a configuration name into the ordered list of base-file candidates
//! and the ordered list of overlay candidates. Nothing here touches the file
//! system; absence of files is dealt with by the merger.

use std::path::{Path, PathBuf};

use crate::name::{filename_problem, ConfigName};
use crate::settings::{EnvLookup, StoreSettings};

/// Which overlay slot a candidate occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayKind {
    /// The fixed override file.
    Override,
    /// The fixed tests file.
    Tests,
    /// The file selected by an environment variable.
    Environment {
        /// The variable that selected it.
        var: String,
    },
}

/// An optional file merged on top of the base file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    /// Where the overlay would live.
    pub path: PathBuf,
    /// Which slot it fills.
    pub kind: OverlayKind,
}

/// The output of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// The configuration these paths belong to.
    pub name: ConfigName,
    /// Base candidates, tried in order; the first that parses wins.
    pub base_candidates: Vec<PathBuf>,
    /// Overlays in application order; later entries win.
    pub overlays: Vec<Overlay>,
}

impl ResolvedPaths {
    /// All paths that could contribute to this configuration.
    pub fn all_paths(&self) -> impl Iterator<Item = &Path> {
        self.base_candidates
            .iter()
            .map(PathBuf::as_path)
            .chain(self.overlays.iter().map(|o| o.path.as_path()))
    }
}

/// Computes base and overlay candidates for `name`.
///
/// The environment overlay comes from the first variable in
/// `settings.env_vars` with a non-empty value; later variables are not
/// consulted once one matches.
///
/// # Examples
///
/// ```
/// use hotconf::{resolve, ConfigName, StoreSettings};
/// use std::collections::HashMap;
/// use std::path::PathBuf;
///
/// let mut env = HashMap::new();
/// env.insert("HOTCONF_STAGE_CONFIG".to_string(), "staging".to_string());
///
/// let name = ConfigName::new("Events").unwrap();
/// let paths = resolve(&name, &StoreSettings::default(), &env);
///
/// assert_eq!(paths.base_candidates[0], PathBuf::from("./config/events.yaml"));
/// assert_eq!(paths.overlays.len(), 3);
/// assert_eq!(paths.overlays[2].path, PathBuf::from("./config/staging.yaml"));
/// ```
#[must_use]
pub fn resolve(name: &ConfigName, settings: &StoreSettings, env: &dyn EnvLookup) -> ResolvedPaths {
    let base_candidates = settings
        .search_dirs
        .iter()
        .flat_map(|dir| {
            settings
                .extensions
                .iter()
                .map(move |ext| dir.join(format!("{}.{ext}", name.as_str())))
        })
        .collect();

    let mut overlays = vec![
        Overlay {
            path: settings
                .config_dir
                .join(format!("{}.yaml", settings.override_stem)),
            kind: OverlayKind::Override,
        },
        Overlay {
            path: settings.config_dir.join(format!("{}.yaml", settings.tests_stem)),
            kind: OverlayKind::Tests,
        },
    ];

    if let Some((var, value)) = select_environment(settings, env) {
        overlays.push(Overlay {
            path: settings.config_dir.join(format!("{value}.yaml")),
            kind: OverlayKind::Environment { var },
        });
    }

    ResolvedPaths {
        name: name.clone(),
        base_candidates,
        overlays,
    }
}

fn select_environment(settings: &StoreSettings, env: &dyn EnvLookup) -> Option<(String, String)> {
    let (var, value) = settings.env_vars.iter().find_map(|var| {
        env.var(var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|v| (var.clone(), v))
    })?;

    if let Some(reason) = filename_problem(&value) {
        log::warn!(
            var = var.as_str();
            "ignoring environment overlay '{value}': {reason}"
        );
        return None;
    }
    Some((var, value))
}
