//! Blocking filesystem helpers used by the store, which writes its snapshot synchronously.

use crate::Result;
use anyhow::Context;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Reads the raw bytes of a file, returning `None` if the file does not exist.
pub(crate) fn read_optional(path: impl AsRef<Path>) -> Result<Option<Vec<u8>>> {
    let path = path.as_ref();
    match std::fs::read(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Unable to read file {}", path.display())),
    }
}

pub(crate) fn write_all(path: impl AsRef<Path>, data: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    let mut f = std::fs::File::create(path)
        .with_context(|| format!("Unable to create file {}", path.display()))?;
    f.write_all(data.as_ref())
        .with_context(|| format!("Unable to write data to {}", path.display()))?;
    f.sync_all()
        .with_context(|| format!("Unable to flush {}", path.display()))
}

/// Writes `data` to a temporary sibling of `path` and renames it into place, so readers see
/// either the old contents or the new contents, never a partial write. On failure the temporary
/// file is removed and `path` is left as it was.
pub(crate) fn replace(path: impl AsRef<Path>, data: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    let tmp = tmp_sibling(path);
    let result = write_all(&tmp, data).and_then(|()| {
        std::fs::rename(&tmp, path).with_context(|| {
            format!(
                "Unable to move '{}' to '{}'",
                tmp.display(),
                path.display()
            )
        })
    });
    if result.is_err() && tmp.exists() {
        if let Err(e) = std::fs::remove_file(&tmp) {
            warn!("Unable to remove the temporary file {}: {e}", tmp.display());
        }
    }
    result
}

pub(crate) fn remove(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::remove_file(path).with_context(|| format!("Unable to remove {}", path.display()))
}

/// Lists the file names in `dir`.
pub(crate) fn file_names(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Unable to read directory {}", dir.display()))?
    {
        let entry = entry.context("Failed to read directory entry")?;
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    Ok(names)
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_optional_missing() {
        let dir = TempDir::new().unwrap();
        assert!(read_optional(dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn test_replace_overwrites_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.json");
        replace(&path, "[]").unwrap();
        replace(&path, "[1]").unwrap();
        assert_eq!(read_optional(&path).unwrap().unwrap(), b"[1]");
        assert_eq!(file_names(dir.path()).unwrap(), vec!["expenses.json".to_string()]);
    }

    #[test]
    fn test_replace_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("expenses.json");
        assert!(replace(path, "[]").is_err());
    }

    #[test]
    fn test_read_optional_keeps_bytes_that_are_not_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.json");
        std::fs::write(&path, b"Caf\xe9").unwrap();
        assert_eq!(read_optional(&path).unwrap().unwrap(), b"Caf\xe9");
    }

    #[test]
    fn test_replace_failure_removes_temporary_file() {
        let dir = TempDir::new().unwrap();
        // The target is a non-empty directory, so the rename fails after the write succeeded
        let path = dir.path().join("expenses.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        assert!(replace(&path, "[]").is_err());
        assert!(!dir.path().join("expenses.json.tmp").exists());
        assert!(path.join("keep").is_file());
    }
}
