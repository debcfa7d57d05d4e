//! # Local File Store
//!
//! Thin filesystem layer used by the state engine for every on-disk
//! operation. Two write paths are provided:
//!
//! 1. **`write`**: creates parent directories and writes directly.
//!    Last-writer-wins; a crash mid-write can leave a partial file.
//!
//! 2. **`write_atomic`**: writes to a temporary sibling in the destination
//!    directory and renames it over the target. The rename is atomic on
//!    POSIX filesystems, so no partial file is ever observable at the
//!    destination path. Used for the persisted state document.
//!
//! Reads and deletes distinguish "not found" from other I/O failures so
//! that best-effort callers can treat absence as data.

use std::fs;
use std::path::Path;
use std::process;

use crate::error::{Error, Result};

/// Write content to a path, creating parent directories as needed.
///
/// Non-atomic; a concurrent reader may observe a partially written file.
pub fn write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Atomically write content to a path via a temporary sibling and rename.
///
/// The temporary file lives in the destination directory so the rename
/// never crosses a filesystem boundary.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidPath {
            path: path.display().to_string(),
            message: "path has no file name".to_string(),
        })?;
    let tmp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, process::id()));

    fs::write(&tmp_path, content)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        // Leave no temp file behind on a failed rename.
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

/// Read the full content of a file.
///
/// Returns [`Error::NotFound`] when the file is absent, distinguishing it
/// from other I/O failures.
pub fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })
}

/// Delete a file.
///
/// Returns [`Error::NotFound`] when the file is absent.
pub fn delete(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })
}

/// Check whether a path exists as a regular file.
pub fn exists(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a/b/c.txt");

        write(&path, b"nested").unwrap();

        assert!(path.exists());
        assert_eq!(fs::read(&path).unwrap(), b"nested");
    }

    #[test]
    fn test_write_overwrites() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.txt");

        write(&path, b"old").unwrap();
        write(&path, b"new").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_write_atomic_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");

        write_atomic(&path, b"{\"v\": 1}").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"{\"v\": 1}");
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");

        write_atomic(&path, b"content").unwrap();

        let entries: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], "state.json");
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn test_read_not_found_is_distinguishable() {
        let temp = TempDir::new().unwrap();
        let err = read(&temp.path().join("missing.txt")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_and_exists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.txt");

        write(&path, b"x").unwrap();
        assert!(exists(&path));

        delete(&path).unwrap();
        assert!(!exists(&path));

        let err = delete(&path).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_exists_is_false_for_directory() {
        let temp = TempDir::new().unwrap();
        assert!(!exists(temp.path()));
    }
}
