//! Backup management for snapshots that could not be read.
//!
//! When the store finds a snapshot it cannot decode it starts out empty, and the next mutation
//! would overwrite the unreadable file. Before that happens the contents are copied here.

use crate::{fs, Result};
use chrono::Local;
use std::path::PathBuf;

/// Prefix for backups of snapshots that failed to decode.
pub const UNREADABLE: &str = "snapshot-unreadable";

const EXTENSION: &str = "json";

/// Manages backup file creation and rotation.
///
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    pub fn new(backups_dir: impl Into<PathBuf>, backup_copies: u32) -> Self {
        Self {
            backups_dir: backups_dir.into(),
            backup_copies,
        }
    }

    /// Saves the raw bytes of an unreadable snapshot, exactly as they were read.
    ///
    /// The filename format is `snapshot-unreadable.YYYY-MM-DD-NNN.json` where NNN is a sequence
    /// number. Automatically rotates old backups, keeping only `backup_copies` files.
    ///
    /// Returns the path to the created backup file.
    pub fn save_unreadable(&self, contents: &[u8]) -> Result<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(UNREADABLE, &date)?;
        let path = self
            .backups_dir
            .join(format!("{UNREADABLE}.{date}-{seq:03}.{EXTENSION}"));
        fs::write_all(&path, contents)?;
        self.rotate(UNREADABLE)?;
        Ok(path)
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let max_seq = fs::file_names(&self.backups_dir)?
            .iter()
            .filter_map(|name| parse_sequence_number(name, prefix, date))
            .max()
            .unwrap_or(0);
        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    fn rotate(&self, prefix: &str) -> Result<()> {
        let mut names: Vec<String> = fs::file_names(&self.backups_dir)?
            .into_iter()
            .filter(|name| is_backup_file(name, prefix))
            .collect();

        // The name format sorts by date and then sequence number
        names.sort();

        let to_delete = names.len().saturating_sub(self.backup_copies as usize);
        for name in names.into_iter().take(to_delete) {
            fs::remove(self.backups_dir.join(name))?;
        }
        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename.
/// Returns None if the filename doesn't match `{prefix}.{date}-{NNN}.json`.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    filename
        .strip_prefix(&format!("{prefix}.{date}-"))?
        .strip_suffix(&format!(".{EXTENSION}"))?
        .parse()
        .ok()
}

fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(&format!(".{EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number(
                "snapshot-unreadable.2026-10-16-001.json",
                UNREADABLE,
                "2026-10-16"
            ),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number(
                "snapshot-unreadable.2026-10-16-042.json",
                UNREADABLE,
                "2026-10-16"
            ),
            Some(42)
        );
        // Wrong date
        assert_eq!(
            parse_sequence_number(
                "snapshot-unreadable.2026-10-15-001.json",
                UNREADABLE,
                "2026-10-16"
            ),
            None
        );
        // Wrong extension
        assert_eq!(
            parse_sequence_number(
                "snapshot-unreadable.2026-10-16-001",
                UNREADABLE,
                "2026-10-16"
            ),
            None
        );
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file(
            "snapshot-unreadable.2026-10-16-001.json",
            UNREADABLE
        ));
        assert!(!is_backup_file("expenses.json", UNREADABLE));
        assert!(!is_backup_file(
            "snapshot-unreadable.2026-10-16-001.txt",
            UNREADABLE
        ));
    }

    #[test]
    fn test_save_unreadable_sequence_and_rotation() {
        let dir = TempDir::new().unwrap();
        let backup = Backup::new(dir.path(), 2);

        let first = backup.save_unreadable(b"garbage 1").unwrap();
        let second = backup.save_unreadable(b"garbage 2").unwrap();
        assert!(first.to_string_lossy().ends_with("-001.json"));
        assert!(second.to_string_lossy().ends_with("-002.json"));

        let third = backup.save_unreadable(b"garbage 3").unwrap();
        assert!(third.to_string_lossy().ends_with("-003.json"));

        let mut names = fs::file_names(dir.path()).unwrap();
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(!first.exists());
        assert_eq!(
            std::fs::read_to_string(&third).unwrap(),
            "garbage 3".to_string()
        );
    }
}
