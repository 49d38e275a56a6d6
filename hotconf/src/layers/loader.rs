//! Reading configuration files into YAML trees.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::source::FileSource;

/// Reads and parses one configuration file.
///
/// An empty document (or one holding only `~`) is an empty mapping.
///
/// # Errors
///
/// Returns [`Error::Read`] if the file can't be read, [`Error::Parse`] if it
/// is not valid YAML, and [`Error::NotAMapping`] if its root is a scalar or
/// a sequence.
pub fn load_file(source: &dyn FileSource, path: &Path) -> Result<Mapping> {
    let contents = source.read(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_document(path, &contents)
}

/// Parses YAML text that came from `path`.
///
/// # Errors
///
/// See [`load_file`].
pub fn parse_document(path: &Path, contents: &str) -> Result<Mapping> {
    let value: Value = if contents.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(contents).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            source: e,
        })?
    };

    match value {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(Error::NotAMapping {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FsSource, MockFileSource};
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_file(&FsSource, Path::new("/nonexistent/path/events.yaml"));
        assert!(matches!(result, Err(Error::Read { .. })));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        fs::write(&path, "invalid: yaml: syntax:").unwrap();

        let result = load_file(&FsSource, &path);
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_load_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("events.yaml");
        fs::write(&path, "topic: orders\nretries: 3\n").unwrap();

        let map = load_file(&FsSource, &path).unwrap();
        assert_eq!(map.get("topic"), Some(&Value::from("orders")));
        assert_eq!(map.get("retries"), Some(&Value::from(3)));
    }

    #[test]
    fn test_empty_document_is_empty_mapping() {
        let path = Path::new("empty.yaml");
        assert!(parse_document(path, "").unwrap().is_empty());
        assert!(parse_document(path, "   \n").unwrap().is_empty());
        assert!(parse_document(path, "~\n").unwrap().is_empty());
    }

    #[test]
    fn test_non_mapping_root_rejected() {
        let path = Path::new("list.yaml");
        assert!(matches!(
            parse_document(path, "- a\n- b\n"),
            Err(Error::NotAMapping { .. })
        ));
        assert!(matches!(
            parse_document(path, "42"),
            Err(Error::NotAMapping { .. })
        ));
    }

    #[test]
    fn test_read_failure_from_source() {
        let mut source = MockFileSource::new();
        source
            .expect_read()
            .returning(|_| Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")));

        let result = load_file(&source, Path::new("locked.yaml"));
        match result {
            Err(Error::Read { path, source }) => {
                assert_eq!(path, Path::new("locked.yaml"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected read error, got {other:?}"),
        }
    }
}
