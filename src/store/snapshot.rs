//! Where the store keeps its snapshot: the whole record collection serialized as one JSON blob.

use crate::backup::Backup;
use crate::model::ExpenseRecord;
use crate::{fs, Result};
use anyhow::{bail, Context};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, warn};

/// A single keyed blob holding the serialized record collection.
///
/// Reads happen once when the store is opened and writes replace the whole blob. Writes must be
/// complete when `write` returns.
pub trait Snapshot {
    /// Returns the blob, or `None` if nothing has been written yet. The bytes are returned as
    /// stored; whether they decode is for the caller to find out.
    fn read(&self) -> Result<Option<Vec<u8>>>;

    /// Replaces the blob with `contents`.
    fn write(&mut self, contents: &str) -> Result<()>;

    /// Called with a blob that could not be decoded, before anything overwrites it.
    fn set_aside(&mut self, _contents: &[u8]) -> Result<()> {
        Ok(())
    }

    /// A short description of the location for log messages.
    fn describe(&self) -> String;
}

/// Serializes records into the snapshot format: a JSON array of `{id, name, type, amount}`.
pub fn encode<'a>(records: impl IntoIterator<Item = &'a ExpenseRecord>) -> Result<String> {
    let records: Vec<&ExpenseRecord> = records.into_iter().collect();
    serde_json::to_string_pretty(&records).context("Unable to serialize expenses")
}

/// Parses the snapshot format. Any malformed element, including text that is not UTF-8, makes
/// the whole blob unreadable.
pub fn decode(contents: impl AsRef<[u8]>) -> Result<Vec<ExpenseRecord>> {
    let contents = contents.as_ref();
    if is_blank(contents) {
        bail!("The snapshot is empty")
    }
    serde_json::from_slice(contents).context("Unable to parse the expenses snapshot")
}

/// True for a blob holding nothing but whitespace.
pub(super) fn is_blank(contents: &[u8]) -> bool {
    contents.iter().all(u8::is_ascii_whitespace)
}

/// A snapshot stored in a file.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    path: PathBuf,
    backup: Option<Backup>,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup: None,
        }
    }

    /// Unreadable snapshots will be copied into `backup` before they can be overwritten.
    pub fn with_backup(mut self, backup: Backup) -> Self {
        self.backup = Some(backup);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Snapshot for FileSnapshot {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        fs::read_optional(&self.path)
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        fs::replace(&self.path, contents)
    }

    fn set_aside(&mut self, contents: &[u8]) -> Result<()> {
        match &self.backup {
            Some(backup) => {
                let path = backup.save_unreadable(contents)?;
                warn!("Saved the unreadable snapshot to {}", path.display());
            }
            None => debug!("No backup location, the unreadable snapshot will be overwritten"),
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A snapshot held in memory. Clones share the same blob, which lets a test inspect what a store
/// wrote or open a second store on the same data.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    inner: Rc<RefCell<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    contents: Option<Vec<u8>>,
    set_aside: Vec<Vec<u8>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a snapshot that already holds `contents`.
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        let snapshot = Self::default();
        snapshot.inner.borrow_mut().contents = Some(contents.into());
        snapshot
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.inner.borrow().contents.clone()
    }

    /// The blobs that were handed to `set_aside`, oldest first.
    pub fn set_aside_contents(&self) -> Vec<Vec<u8>> {
        self.inner.borrow().set_aside.clone()
    }

    /// When `fail` is true every subsequent `read` returns an error.
    pub fn fail_reads(&self, fail: bool) {
        self.inner.borrow_mut().fail_reads = fail;
    }

    /// When `fail` is true every subsequent `write` returns an error and leaves the blob alone.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }
}

impl Snapshot for MemorySnapshot {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        if self.inner.borrow().fail_reads {
            bail!("The in-memory snapshot is refusing reads")
        }
        Ok(self.contents())
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            bail!("The in-memory snapshot is refusing writes")
        }
        inner.contents = Some(contents.as_bytes().to_vec());
        Ok(())
    }

    fn set_aside(&mut self, contents: &[u8]) -> Result<()> {
        self.inner.borrow_mut().set_aside.push(contents.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        String::from("memory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Category};
    use tempfile::TempDir;

    fn records() -> Vec<ExpenseRecord> {
        vec![
            ExpenseRecord::new("Coffee", Category::personal(), "4.50".parse().unwrap()),
            ExpenseRecord::new("Flight", Category::business(), "350.00".parse().unwrap()),
            ExpenseRecord::new("", "Travel", "-12.25".parse().unwrap()),
            ExpenseRecord::new("Refund", Category::personal(), Amount::ZERO),
        ]
    }

    #[test]
    fn test_encode_decode_equal_by_value() {
        let original = records();
        let json = encode(&original).unwrap();
        let mut decoded = decode(&json).unwrap();
        let mut original = original;
        original.sort_by_key(|r| r.id());
        decoded.sort_by_key(|r| r.id());
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_decode_foreign_snapshot() {
        let json = r#"[
            {"id":"0D5C7F0E-8A55-4C4B-9F5E-0B8F3C1A2D4E","name":"Bananas","type":"Personal","amount":5.99}
        ]"#;
        let decoded = decode(json).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].name(), "Bananas");
        assert_eq!(decoded[0].amount(), "5.99".parse::<Amount>().unwrap());
    }

    #[test]
    fn test_decode_rejects_bad_blobs() {
        assert!(decode("").is_err());
        assert!(decode("   \n").is_err());
        assert!(decode("{not json").is_err());
        assert!(decode(r#"{"id":"x"}"#).is_err());
        assert!(decode(r#"[{"name":"no id","type":"Personal","amount":1}]"#).is_err());
        let not_utf8: &[u8] =
            b"[{\"id\":\"0D5C7F0E-8A55-4C4B-9F5E-0B8F3C1A2D4E\",\"name\":\"Caf\xe9\",\"type\":\"Personal\",\"amount\":1}]";
        assert!(decode(not_utf8).is_err());
    }

    #[test]
    fn test_memory_snapshot_shared_between_clones() {
        let a = MemorySnapshot::new();
        let mut b = a.clone();
        b.write("[]").unwrap();
        assert_eq!(a.contents().as_deref(), Some(b"[]".as_slice()));

        a.fail_writes(true);
        assert!(b.write("[1]").is_err());
        assert_eq!(a.contents().as_deref(), Some(b"[]".as_slice()));

        a.fail_reads(true);
        assert!(b.read().is_err());
    }

    #[test]
    fn test_file_snapshot_write_read() {
        let dir = TempDir::new().unwrap();
        let mut snapshot = FileSnapshot::new(dir.path().join("expenses.json"));
        assert!(snapshot.read().unwrap().is_none());
        snapshot.write("[]").unwrap();
        assert_eq!(snapshot.read().unwrap().as_deref(), Some(b"[]".as_slice()));
    }

    #[test]
    fn test_file_snapshot_set_aside() {
        let dir = TempDir::new().unwrap();
        let backups = dir.path().join(".backups");
        std::fs::create_dir_all(&backups).unwrap();
        let mut snapshot =
            FileSnapshot::new(dir.path().join("expenses.json")).with_backup(Backup::new(&backups, 5));
        snapshot.set_aside(b"{oops\xff").unwrap();
        let names = fs::file_names(&backups).unwrap();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("snapshot-unreadable."));
        assert_eq!(std::fs::read(backups.join(&names[0])).unwrap(), b"{oops\xff");
    }
}
