//! File access seam.
//!
//! Every existence check and read performed while loading goes through a
//! [`FileSource`]. Production code uses [`FsSource`]; callers can wrap it to
//! observe or redirect I/O.

use std::fs;
use std::io;
use std::path::Path;

/// Existence checks and whole-file reads.
#[cfg_attr(test, mockall::automock)]
pub trait FileSource: Send + Sync {
    /// Returns `true` if `path` names an existing regular file.
    fn exists(&self, path: &Path) -> bool;

    /// Reads the whole file as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// [`FileSource`] backed by the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl FileSource for FsSource {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_source_reads_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.yaml");
        fs::write(&path, "port: 1\n").unwrap();

        assert!(FsSource.exists(&path));
        assert_eq!(FsSource.read(&path).unwrap(), "port: 1\n");
    }

    #[test]
    fn test_directories_do_not_exist_as_files() {
        let dir = TempDir::new().unwrap();
        assert!(!FsSource.exists(dir.path()));
        assert!(!FsSource.exists(&dir.path().join("missing.yaml")));
    }
}
