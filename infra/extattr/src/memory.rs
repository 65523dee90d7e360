//! In-memory [`AttributeStore`] used by tests and by embedders that want to
//! evaluate feature states without touching the filesystem.

use crate::error::StoreError;
use crate::listing::encode_listing;
use crate::store::AttributeStore;
use fxhash::{FxHashMap, FxHashSet};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// A mutation observed by a [`MemoryStore`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Set { file: PathBuf, attribute: String, value: u8 },
    Delete { file: PathBuf, attribute: String },
    SetImmutable { file: PathBuf },
}

#[derive(Debug, Default)]
struct FileEntry {
    // Insertion order doubles as listing order.
    attributes: Vec<(String, Vec<u8>)>,
    immutable: bool,
}

impl FileEntry {
    fn position(&self, attribute: &str) -> Option<usize> {
        self.attributes.iter().position(|(name, _)| name == attribute)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: FxHashMap<PathBuf, FileEntry>,
    failing: FxHashSet<String>,
    journal: Vec<StoreOp>,
}

impl MemoryState {
    fn file(&self, file: &Path) -> Result<&FileEntry, StoreError> {
        self.files.get(file).ok_or_else(|| not_found(file))
    }

    fn file_mut(&mut self, file: &Path) -> Result<&mut FileEntry, StoreError> {
        self.files.get_mut(file).ok_or_else(|| not_found(file))
    }

    fn check_writable(&self, file: &Path, attribute: &str) -> Result<(), StoreError> {
        if self.failing.contains(attribute) {
            return Err(StoreError::Io {
                source: std::io::Error::other("injected write failure"),
                context: Some(format!("{}: {attribute}", file.display()).into()),
            });
        }
        if self.file(file)?.immutable {
            return Err(StoreError::PermissionDenied {
                message: file.display().to_string().into(),
                context: Some("File is immutable".into()),
            });
        }
        Ok(())
    }
}

fn not_found(file: &Path) -> StoreError {
    StoreError::FileNotFound { message: file.display().to_string().into(), context: None }
}

/// Thread-safe attribute store held entirely in memory.
///
/// Files must be registered with [`MemoryStore::add_file`] before use; operations on
/// unknown paths fail with [`StoreError::FileNotFound`] just like the real facility.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `file` with no attributes. Existing files are left untouched.
    pub fn add_file(&self, file: impl Into<PathBuf>) {
        self.state.lock().files.entry(file.into()).or_default();
    }

    /// Stores raw bytes under `attribute` without journaling, the way an unrelated
    /// writer of the namespace would. Registers the file if needed.
    pub fn insert_raw(&self, file: impl Into<PathBuf>, attribute: &str, value: &[u8]) {
        let mut state = self.state.lock();
        let entry = state.files.entry(file.into()).or_default();
        match entry.position(attribute) {
            Some(idx) => entry.attributes[idx].1 = value.to_vec(),
            None => entry.attributes.push((attribute.to_owned(), value.to_vec())),
        }
    }

    /// Makes every later `set` or `delete` of `attribute` fail with an I/O error.
    pub fn fail_writes_to(&self, attribute: &str) {
        self.state.lock().failing.insert(attribute.to_owned());
    }

    /// Returns the raw value of `attribute`, if stored.
    #[must_use]
    pub fn attribute(&self, file: &Path, attribute: &str) -> Option<Vec<u8>> {
        let state = self.state.lock();
        let entry = state.files.get(file)?;
        entry.position(attribute).map(|idx| entry.attributes[idx].1.clone())
    }

    /// Returns the names stored on `file`, in listing order.
    #[must_use]
    pub fn attribute_names(&self, file: &Path) -> Vec<String> {
        self.state.lock().files.get(file).map_or_else(Vec::new, |entry| {
            entry.attributes.iter().map(|(name, _)| name.clone()).collect()
        })
    }

    #[must_use]
    pub fn is_immutable(&self, file: &Path) -> bool {
        self.state.lock().files.get(file).is_some_and(|entry| entry.immutable)
    }

    /// Returns every mutation attempted so far, including failed ones.
    #[must_use]
    pub fn journal(&self) -> Vec<StoreOp> {
        self.state.lock().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.state.lock().journal.clear();
    }
}

impl AttributeStore for MemoryStore {
    fn list(&self, file: &Path) -> Result<Vec<u8>, StoreError> {
        let state = self.state.lock();
        let entry = state.file(file)?;
        encode_listing(entry.attributes.iter().map(|(name, _)| name.as_bytes()))
    }

    fn get(&self, file: &Path, attribute: &str) -> Result<Vec<u8>, StoreError> {
        let state = self.state.lock();
        let entry = state.file(file)?;
        entry.position(attribute).map(|idx| entry.attributes[idx].1.clone()).ok_or_else(|| {
            StoreError::AttributeNotFound {
                message: attribute.to_owned().into(),
                context: Some(file.display().to_string().into()),
            }
        })
    }

    fn set(&self, file: &Path, attribute: &str, value: u8) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state.journal.push(StoreOp::Set {
            file: file.to_path_buf(),
            attribute: attribute.to_owned(),
            value,
        });
        state.check_writable(file, attribute)?;

        let encoded = value.to_string().into_bytes();
        let entry = state.file_mut(file)?;
        match entry.position(attribute) {
            Some(idx) => entry.attributes[idx].1 = encoded,
            None => entry.attributes.push((attribute.to_owned(), encoded)),
        }
        Ok(())
    }

    fn delete(&self, file: &Path, attribute: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state
            .journal
            .push(StoreOp::Delete { file: file.to_path_buf(), attribute: attribute.to_owned() });
        state.check_writable(file, attribute)?;

        let entry = state.file_mut(file)?;
        if let Some(idx) = entry.position(attribute) {
            entry.attributes.remove(idx);
        }
        Ok(())
    }

    fn set_immutable(&self, file: &Path) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state.journal.push(StoreOp::SetImmutable { file: file.to_path_buf() });
        state.file_mut(file)?.immutable = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIN: &str = "/usr/bin/true";

    #[test]
    fn test_unknown_file_is_not_found() {
        let store = MemoryStore::new();
        let err = store.list(Path::new(BIN)).unwrap_err();
        assert!(matches!(err, StoreError::FileNotFound { .. }));
    }

    #[test]
    fn test_set_stores_decimal_string_in_listing_order() {
        let store = MemoryStore::new();
        store.add_file(BIN);
        let file = Path::new(BIN);

        store.set(file, "hbsd.pax.noaslr", 0).unwrap();
        store.set(file, "hbsd.pax.aslr", 1).unwrap();

        assert_eq!(store.get(file, "hbsd.pax.noaslr").unwrap(), b"0");
        assert_eq!(store.get(file, "hbsd.pax.aslr").unwrap(), b"1");
        assert_eq!(
            store.list(file).unwrap(),
            encode_listing(["hbsd.pax.noaslr", "hbsd.pax.aslr"]).unwrap()
        );
    }

    #[test]
    fn test_delete_missing_attribute_is_noop() {
        let store = MemoryStore::new();
        store.add_file(BIN);
        let file = Path::new(BIN);

        store.delete(file, "hbsd.pax.mprotect").unwrap();
        assert!(store.list(file).unwrap().is_empty());
        assert_eq!(store.journal().len(), 1);
    }

    #[test]
    fn test_get_missing_attribute() {
        let store = MemoryStore::new();
        store.add_file(BIN);
        let err = store.get(Path::new(BIN), "hbsd.pax.aslr").unwrap_err();
        assert!(matches!(err, StoreError::AttributeNotFound { .. }));
    }

    #[test]
    fn test_immutable_rejects_writes() {
        let store = MemoryStore::new();
        store.add_file(BIN);
        let file = Path::new(BIN);

        store.set_immutable(file).unwrap();
        assert!(store.is_immutable(file));
        assert!(matches!(
            store.set(file, "hbsd.pax.aslr", 1),
            Err(StoreError::PermissionDenied { .. })
        ));
        assert!(matches!(
            store.delete(file, "hbsd.pax.aslr"),
            Err(StoreError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_injected_failure_is_journaled() {
        let store = MemoryStore::new();
        store.add_file(BIN);
        store.fail_writes_to("hbsd.pax.noaslr");
        let file = Path::new(BIN);

        assert!(matches!(store.set(file, "hbsd.pax.noaslr", 1), Err(StoreError::Io { .. })));
        assert!(store.attribute(file, "hbsd.pax.noaslr").is_none());
        assert_eq!(
            store.journal(),
            vec![StoreOp::Set {
                file: PathBuf::from(BIN),
                attribute: "hbsd.pax.noaslr".to_owned(),
                value: 1
            }]
        );
    }

    #[test]
    fn test_insert_raw_overwrites_in_place() {
        let store = MemoryStore::new();
        store.insert_raw(BIN, "md5", b"abc");
        store.insert_raw(BIN, "hbsd.pax.aslr", b"1");
        store.insert_raw(BIN, "md5", b"def");

        let file = Path::new(BIN);
        assert_eq!(store.attribute_names(file), vec!["md5", "hbsd.pax.aslr"]);
        assert_eq!(store.attribute(file, "md5").unwrap(), b"def");
        assert!(store.journal().is_empty());
    }
}
