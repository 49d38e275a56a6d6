//! Overlay merging and precedence handling.
//!
//! The base file is located on the search path; overlays are then merged on
//! top in their fixed order so that later overlays win. Overlays are optional:
//! a missing one is skipped silently and a broken one is skipped with a
//! warning.

use std::path::PathBuf;

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::layers::loader::load_file;
use crate::resolve::ResolvedPaths;
use crate::source::FileSource;

/// An overlay that exists on disk but could not be applied.
#[derive(Debug)]
pub struct SkippedOverlay {
    /// The overlay file.
    pub path: PathBuf,
    /// Why it was skipped.
    pub error: Error,
}

/// Which files contributed to a merged tree.
#[derive(Debug)]
pub struct MergeReport {
    /// The base file that was used.
    pub base: PathBuf,
    /// Overlays that were merged, in application order.
    pub applied: Vec<PathBuf>,
    /// Overlays that exist but were skipped.
    pub skipped: Vec<SkippedOverlay>,
}

/// A merged configuration tree and how it was produced.
#[derive(Debug)]
pub struct MergedTree {
    /// The merged document.
    pub tree: Value,
    /// Provenance of the merge.
    pub report: MergeReport,
}

/// Merges configuration layers.
///
/// # Examples
///
/// ```
/// use hotconf::layers::ConfigMerger;
/// use serde_yaml::Value;
///
/// let mut base: Value = serde_yaml::from_str("a: 1\nnested: {x: 1, y: 2}").unwrap();
/// let overlay: Value = serde_yaml::from_str("a: 2\nnested: {y: 3}").unwrap();
///
/// ConfigMerger::merge_into(&mut base, overlay);
///
/// let expected: Value = serde_yaml::from_str("a: 2\nnested: {x: 1, y: 3}").unwrap();
/// assert_eq!(base, expected);
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Loads the base file and applies every overlay in `paths`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResolutionEmpty`] if no base candidate exists, or the
    /// last base parse error if every existing candidate is malformed.
    /// Overlay failures never produce an error.
    pub fn merge_all(paths: &ResolvedPaths, source: &dyn FileSource) -> Result<MergedTree> {
        let (base, mut tree) = Self::load_base(paths, source)?;

        let mut applied = Vec::new();
        let mut skipped = Vec::new();

        for overlay in &paths.overlays {
            if !source.exists(&overlay.path) {
                continue;
            }

            match load_file(source, &overlay.path) {
                Ok(map) => {
                    Self::merge_into(&mut tree, Value::Mapping(map));
                    log::debug!(
                        name = paths.name.as_str(),
                        path:% = overlay.path.display();
                        "applied overlay"
                    );
                    applied.push(overlay.path.clone());
                }
                Err(error) => {
                    log::warn!(
                        name = paths.name.as_str(),
                        path:% = overlay.path.display();
                        "failed to merge overlay, skipping: {error}"
                    );
                    skipped.push(SkippedOverlay {
                        path: overlay.path.clone(),
                        error,
                    });
                }
            }
        }

        Ok(MergedTree {
            tree,
            report: MergeReport {
                base,
                applied,
                skipped,
            },
        })
    }

    /// Finds the first base candidate that exists and parses.
    fn load_base(paths: &ResolvedPaths, source: &dyn FileSource) -> Result<(PathBuf, Value)> {
        let mut last_error = None;

        for candidate in &paths.base_candidates {
            if !source.exists(candidate) {
                continue;
            }
            match load_file(source, candidate) {
                Ok(map) => return Ok((candidate.clone(), Value::Mapping(map))),
                Err(error) => {
                    log::warn!(
                        name = paths.name.as_str(),
                        path:% = candidate.display();
                        "base candidate unusable, trying next: {error}"
                    );
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::ResolutionEmpty {
            name: paths.name.to_string(),
            searched: paths.base_candidates.clone(),
        }))
    }

    /// Merge `overlay` into `target` (overlay wins).
    ///
    /// # Merging Rules
    ///
    /// - Mapping onto mapping: key-by-key, recursively
    /// - Anything else (scalars, sequences, null): overlay replaces target
    ///
    /// Sequences are replaced wholesale, never concatenated.
    pub fn merge_into(target: &mut Value, overlay: Value) {
        match (target, overlay) {
            (Value::Mapping(target_map), Value::Mapping(overlay_map)) => {
                Self::merge_mappings(target_map, overlay_map);
            }
            (target, overlay) => *target = overlay,
        }
    }

    fn merge_mappings(target: &mut Mapping, overlay: Mapping) {
        for (key, value) in overlay {
            match target.get_mut(&key) {
                Some(existing) => Self::merge_into(existing, value),
                None => {
                    target.insert(key, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::ConfigName;
    use crate::resolve::{Overlay, OverlayKind};
    use crate::source::{FsSource, MockFileSource};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    fn paths_in(dir: &Path, overlays: &[&str]) -> ResolvedPaths {
        ResolvedPaths {
            name: ConfigName::new("events").unwrap(),
            base_candidates: vec![dir.join("events.yaml")],
            overlays: overlays
                .iter()
                .map(|stem| Overlay {
                    path: dir.join(format!("{stem}.yaml")),
                    kind: OverlayKind::Override,
                })
                .collect(),
        }
    }

    #[test]
    fn test_merge_overwrites_scalars() {
        let mut target = yaml("a: 1\nb: keep");
        ConfigMerger::merge_into(&mut target, yaml("a: 2"));
        assert_eq!(target, yaml("a: 2\nb: keep"));
    }

    #[test]
    fn test_merge_nested_mappings() {
        let mut target = yaml("db:\n  host: localhost\n  pool: {min: 1, max: 5}");
        ConfigMerger::merge_into(&mut target, yaml("db:\n  pool: {max: 50}"));
        assert_eq!(
            target,
            yaml("db:\n  host: localhost\n  pool: {min: 1, max: 50}")
        );
    }

    #[test]
    fn test_merge_sequences_replace() {
        let mut target = yaml("brokers: [a, b, c]");
        ConfigMerger::merge_into(&mut target, yaml("brokers: [z]"));
        assert_eq!(target, yaml("brokers: [z]"));
    }

    #[test]
    fn test_merge_scalar_replaces_mapping() {
        let mut target = yaml("db: {host: localhost}");
        ConfigMerger::merge_into(&mut target, yaml("db: disabled"));
        assert_eq!(target, yaml("db: disabled"));
    }

    #[test]
    fn test_merge_adds_new_keys() {
        let mut target = yaml("a: 1");
        ConfigMerger::merge_into(&mut target, yaml("b: {c: 2}"));
        assert_eq!(target, yaml("a: 1\nb: {c: 2}"));
    }

    #[test]
    fn test_merge_all_applies_overlays_in_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("events.yaml"), "a: 1\nb: base\n").unwrap();
        fs::write(dir.path().join("override.yaml"), "a: 2\n").unwrap();
        fs::write(dir.path().join("tests.yaml"), "a: 3\n").unwrap();

        let paths = paths_in(dir.path(), &["override", "tests"]);
        let merged = ConfigMerger::merge_all(&paths, &FsSource).unwrap();

        assert_eq!(merged.tree, yaml("a: 3\nb: base"));
        assert_eq!(merged.report.base, dir.path().join("events.yaml"));
        assert_eq!(merged.report.applied.len(), 2);
        assert!(merged.report.skipped.is_empty());
    }

    #[test]
    fn test_missing_overlay_skipped_silently() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("events.yaml"), "a: 1\n").unwrap();

        let paths = paths_in(dir.path(), &["override", "tests"]);
        let merged = ConfigMerger::merge_all(&paths, &FsSource).unwrap();

        assert_eq!(merged.tree, yaml("a: 1"));
        assert!(merged.report.applied.is_empty());
        assert!(merged.report.skipped.is_empty());
    }

    #[test]
    fn test_malformed_overlay_skipped_with_report() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("events.yaml"), "a: 1\n").unwrap();
        fs::write(dir.path().join("override.yaml"), "a: [unclosed\n").unwrap();
        fs::write(dir.path().join("tests.yaml"), "b: 2\n").unwrap();

        let paths = paths_in(dir.path(), &["override", "tests"]);
        let merged = ConfigMerger::merge_all(&paths, &FsSource).unwrap();

        assert_eq!(merged.tree, yaml("a: 1\nb: 2"));
        assert_eq!(merged.report.skipped.len(), 1);
        assert_eq!(
            merged.report.skipped[0].path,
            dir.path().join("override.yaml")
        );
        assert!(merged.report.skipped[0].error.is_malformed());
    }

    #[test]
    fn test_non_mapping_overlay_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("events.yaml"), "a: 1\n").unwrap();
        fs::write(dir.path().join("override.yaml"), "- just\n- a list\n").unwrap();

        let paths = paths_in(dir.path(), &["override"]);
        let merged = ConfigMerger::merge_all(&paths, &FsSource).unwrap();
        assert_eq!(merged.tree, yaml("a: 1"));
        assert_eq!(merged.report.skipped.len(), 1);
    }

    #[test]
    fn test_no_base_is_resolution_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("override.yaml"), "a: 2\n").unwrap();

        let paths = paths_in(dir.path(), &["override"]);
        let err = ConfigMerger::merge_all(&paths, &FsSource).unwrap_err();
        match err {
            Error::ResolutionEmpty { name, searched } => {
                assert_eq!(name, "events");
                assert_eq!(searched, vec![dir.path().join("events.yaml")]);
            }
            other => panic!("expected ResolutionEmpty, got {other:?}"),
        }
    }

    #[test]
    fn test_first_parsable_base_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let third = TempDir::new().unwrap();
        fs::write(first.path().join("events.yaml"), "a: [broken\n").unwrap();
        fs::write(second.path().join("events.yaml"), "a: second\n").unwrap();
        fs::write(third.path().join("events.yaml"), "a: third\n").unwrap();

        let paths = ResolvedPaths {
            name: ConfigName::new("events").unwrap(),
            base_candidates: vec![
                first.path().join("events.yaml"),
                second.path().join("events.yaml"),
                third.path().join("events.yaml"),
            ],
            overlays: vec![],
        };
        let merged = ConfigMerger::merge_all(&paths, &FsSource).unwrap();
        assert_eq!(merged.tree, yaml("a: second"));
        assert_eq!(merged.report.base, second.path().join("events.yaml"));
    }

    #[test]
    fn test_all_bases_malformed_returns_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("events.yaml"), "a: [broken\n").unwrap();

        let paths = paths_in(dir.path(), &[]);
        let err = ConfigMerger::merge_all(&paths, &FsSource).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_unreadable_overlay_is_skipped() {
        let mut source = MockFileSource::new();
        source.expect_exists().returning(|_| true);
        source.expect_read().returning(|path| {
            if path.ends_with("events.yaml") {
                Ok("a: 1\n".to_string())
            } else {
                Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "denied",
                ))
            }
        });

        let paths = paths_in(Path::new("/cfg"), &["override"]);
        let merged = ConfigMerger::merge_all(&paths, &source).unwrap();
        assert_eq!(merged.tree, yaml("a: 1"));
        assert!(matches!(
            merged.report.skipped[0].error,
            Error::Read { .. }
        ));
    }

    #[test]
    fn test_each_file_read_at_most_once() {
        let mut source = MockFileSource::new();
        source.expect_exists().returning(|_| true);
        source
            .expect_read()
            .withf(|p| p.ends_with("events.yaml"))
            .times(1)
            .returning(|_| Ok("a: 1\n".to_string()));
        source
            .expect_read()
            .withf(|p| p.ends_with("override.yaml"))
            .times(1)
            .returning(|_| Ok("a: 2\n".to_string()));

        let paths = paths_in(Path::new("/cfg"), &["override"]);
        let merged = ConfigMerger::merge_all(&paths, &source).unwrap();
        assert_eq!(merged.tree, yaml("a: 2"));
    }
}
