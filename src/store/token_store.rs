use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use super::{Storage, StorageError, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::models::TokenPair;

/// The process-wide holder of the access/refresh token pair.
///
/// Token contents are opaque. Storage failures never reach the caller: they
/// are logged and the store reads as empty, which lands the client in the
/// logged-out state. A single lock serializes every call, so no reader sees
/// half of a pair that is being written.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
    lock: Arc<Mutex<()>>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        TokenStore {
            storage,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// The stored pair, if an access token is present.
    pub fn load(&self) -> Option<TokenPair> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let access = self.read(ACCESS_TOKEN_KEY)?;
        Some(TokenPair::new(access, self.read(REFRESH_TOKEN_KEY)))
    }

    pub fn save(&self, pair: &TokenPair) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write(ACCESS_TOKEN_KEY, Some(&pair.access));
        self.write(REFRESH_TOKEN_KEY, pair.refresh.as_deref());
        debug!(
            event_name = "store.tokens.saved",
            event_domain = "store",
            has_refresh = pair.refresh.is_some(),
            "token pair saved"
        );
    }

    /// Replace only the access token, as a successful refresh does.
    pub fn set_access_token(&self, access: &str) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write(ACCESS_TOKEN_KEY, Some(access));
    }

    pub fn access_token(&self) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read(REFRESH_TOKEN_KEY)
    }

    pub fn clear(&self) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write(ACCESS_TOKEN_KEY, None);
        self.write(REFRESH_TOKEN_KEY, None);
        debug!(
            event_name = "store.tokens.cleared",
            event_domain = "store",
            "token pair cleared"
        );
    }

    pub fn is_persistent(&self) -> bool {
        self.storage.is_enabled()
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                self.report(key, "read", &e);
                None
            }
        }
    }

    fn write(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(value) => self.storage.set(key, value),
            None => self.storage.remove(key),
        };
        if let Err(e) = result {
            self.report(key, "write", &e);
        }
    }

    fn report(&self, key: &str, operation: &str, error: &StorageError) {
        // A disabled store is a configuration choice, not a fault
        if matches!(error, StorageError::Disabled) {
            debug!("Token storage disabled; {} of '{}' skipped", operation, key);
        } else {
            warn!(
                event_name = "store.tokens.unavailable",
                event_domain = "store",
                key,
                operation,
                "token storage failed, treating tokens as absent: {}",
                error
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::file_store::FileStorage;
    use crate::store::memory_store::MemoryStorage;
    use crate::store::no_store::NoStorage;

    fn memory_store() -> TokenStore {
        TokenStore::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_save_then_load() {
        let store = memory_store();
        assert_eq!(store.load(), None);

        store.save(&TokenPair::new("a1", Some("r1".to_string())));
        assert_eq!(
            store.load(),
            Some(TokenPair::new("a1", Some("r1".to_string())))
        );
        assert_eq!(store.access_token().as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().as_deref(), Some("r1"));
    }

    #[test]
    fn test_set_access_token_keeps_refresh() {
        let store = memory_store();
        store.save(&TokenPair::new("a1", Some("r1".to_string())));
        store.set_access_token("a2");
        assert_eq!(store.access_token().as_deref(), Some("a2"));
        assert_eq!(store.refresh_token().as_deref(), Some("r1"));
    }

    #[test]
    fn test_save_without_refresh_drops_old_refresh() {
        let store = memory_store();
        store.save(&TokenPair::new("a1", Some("r1".to_string())));
        store.save(&TokenPair::new("a2", None));
        assert_eq!(store.load(), Some(TokenPair::new("a2", None)));
    }

    #[test]
    fn test_clear_empties_both_keys() {
        let store = memory_store();
        store.save(&TokenPair::new("a1", Some("r1".to_string())));
        store.clear();
        assert_eq!(store.load(), None);
        assert_eq!(store.refresh_token(), None);
    }

    #[test]
    fn test_disabled_storage_reads_as_logged_out() {
        let store = TokenStore::new(Arc::new(NoStorage::new()));
        store.save(&TokenPair::new("a1", Some("r1".to_string())));
        assert_eq!(store.load(), None);
        assert!(!store.is_persistent());
        // Never panics or errors
        store.clear();
    }

    #[test]
    fn test_corrupt_file_reads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "{broken").unwrap();
        let store = TokenStore::new(Arc::new(FileStorage::new(path)));
        assert_eq!(store.load(), None);
        assert_eq!(store.refresh_token(), None);
    }
}
