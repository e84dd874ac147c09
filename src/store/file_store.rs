use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, warn};

use super::{Storage, StorageError};

/// Keeps the token keys in a small JSON object on disk.
///
/// Every write rewrites the whole document through a sibling temp file and a
/// rename, so a reader never observes a half-written file.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        FileStorage { path }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Like `read_all`, but a document that no longer parses reads as empty
    /// so the next write replaces it. The flag is set when that happened.
    fn read_for_update(&self) -> Result<(BTreeMap<String, String>, bool), StorageError> {
        match self.read_all() {
            Ok(values) => Ok((values, false)),
            Err(StorageError::Corrupt(e)) => {
                warn!(
                    event_name = "store.file.corrupt",
                    event_domain = "store",
                    path = %self.path.display(),
                    "token file is unreadable, starting from an empty document: {}",
                    e
                );
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Wrote {} key(s) to '{}'", values.len(), self.path.display());
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let (mut values, _) = self.read_for_update()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let (mut values, corrupt) = self.read_for_update()?;
        if values.remove(key).is_some() || corrupt {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tokens.json");

        let storage = FileStorage::new(path.clone());
        storage.set("access_token", "a1").unwrap();
        storage.set("refresh_token", "r1").unwrap();

        let reopened = FileStorage::new(path);
        assert_eq!(reopened.get("access_token").unwrap().as_deref(), Some("a1"));
        assert_eq!(reopened.get("refresh_token").unwrap().as_deref(), Some("r1"));

        reopened.remove("access_token").unwrap();
        assert_eq!(storage.get("access_token").unwrap(), None);
        assert_eq!(storage.get("refresh_token").unwrap().as_deref(), Some("r1"));
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));
        assert_eq!(storage.get("access_token").unwrap(), None);
        // Removing from an absent file must not create it
        storage.remove("access_token").unwrap();
        assert!(!dir.path().join("absent.json").exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, "not json").unwrap();
        let storage = FileStorage::new(path);
        assert!(matches!(
            storage.get("access_token"),
            Err(StorageError::Corrupt(_))
        ));
    }

    #[test]
    fn test_corrupt_file_is_overwritten_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, "{broken").unwrap();
        let storage = FileStorage::new(path);

        storage.set("access_token", "a1").unwrap();
        assert_eq!(storage.get("access_token").unwrap().as_deref(), Some("a1"));
        assert_eq!(storage.get("refresh_token").unwrap(), None);
    }

    #[test]
    fn test_remove_from_corrupt_file_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, "{broken").unwrap();
        let storage = FileStorage::new(path);

        storage.remove("refresh_token").unwrap();
        assert_eq!(storage.get("access_token").unwrap(), None);
    }
}
