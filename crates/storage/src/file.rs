use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::{Result, StateStorage, StorageError, validate_key};

/// File-backed storage.
///
/// Every record lives in `<dir>/<key>.json`. Writes go to a sibling
/// temporary file that is then renamed over the record, so a reader never
/// observes a half-written document.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens storage rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        tracing::debug!(dir = %dir.display(), "opened file storage");
        Ok(Self { dir })
    }

    /// Returns the storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StateStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.record_path(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.record_path(key)?;
        let tmp = path.with_extension("json.tmp");

        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(value.as_bytes())?;
                file.sync_all()
            })
            .map_err(|e| StorageError::io(&tmp, e))
            .and_then(|()| fs::rename(&tmp, &path).map_err(|e| StorageError::io(&path, e)));

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp)
                && cleanup.kind() != ErrorKind::NotFound
            {
                tracing::warn!(path = %tmp.display(), error = %cleanup, "failed to remove temporary file");
            }
            return Err(e);
        }

        tracing::trace!(key, bytes = value.len(), "record written");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("state");

        let storage = FileStorage::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(storage.dir(), dir.as_path());
    }

    #[test]
    fn failed_write_leaves_no_temporary_file() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(tmp.path()).unwrap();
        // A directory in the record's place makes the final rename fail.
        fs::create_dir(tmp.path().join("cart.json")).unwrap();
        fs::write(tmp.path().join("cart.json").join("keep"), "x").unwrap();

        let err = storage.set_item("cart", "{}").unwrap_err();

        assert!(matches!(err, StorageError::Io { .. }));
        assert!(!tmp.path().join("cart.json.tmp").exists());
    }

    #[test]
    fn set_get_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(tmp.path()).unwrap();

        assert_eq!(storage.get_item("user-store").unwrap(), None);

        storage.set_item("user-store", r#"{"a":1}"#).unwrap();
        assert_eq!(
            storage.get_item("user-store").unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
        assert!(tmp.path().join("user-store.json").is_file());
        assert!(!tmp.path().join("user-store.json.tmp").exists());

        storage.remove_item("user-store").unwrap();
        assert_eq!(storage.get_item("user-store").unwrap(), None);
        storage.remove_item("user-store").unwrap();
    }

    #[test]
    fn overwrite_replaces_record() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(tmp.path()).unwrap();

        storage.set_item("data-storage", "first").unwrap();
        storage.set_item("data-storage", "second").unwrap();

        assert_eq!(
            storage.get_item("data-storage").unwrap().as_deref(),
            Some("second")
        );
    }

    #[test]
    fn rejects_path_traversal_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(tmp.path()).unwrap();

        let result = storage.set_item("../outside", "x");
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
