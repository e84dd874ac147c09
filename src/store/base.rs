use std::sync::Arc;

use tracing::{info, warn};

use super::{file_store::FileStorage, memory_store::MemoryStorage, no_store::NoStorage};
use crate::config::{StorageBackend, StorageConfig};

/// Key holding the bearer credential.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key holding the long-lived credential used to mint new access tokens.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("token storage is disabled")]
    Disabled,
    #[error("token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("token storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The Storage trait abstracts durable string key-value storage (get, set, remove).
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn is_enabled(&self) -> bool {
        // Real backends are always enabled.
        // NoStorage returns false so we can write better debug messages
        true
    }
}

/// Creates a concrete storage implementation based on the StorageConfig.
/// If `storage.enabled = false`, returns NoStorage. Otherwise, picks the specified backend.
pub fn create_storage(config: &StorageConfig) -> Arc<dyn Storage> {
    if !config.enabled {
        info!("Token storage is disabled. Using NoStorage.");
        return Arc::new(NoStorage::new());
    }

    match &config.backend {
        Some(StorageBackend::File(file_config)) => {
            info!(
                "Persisting tokens to file '{}'.",
                file_config.path.display()
            );
            Arc::new(FileStorage::new(file_config.path.clone()))
        }
        Some(StorageBackend::Memory) => {
            info!("Keeping tokens in memory only.");
            Arc::new(MemoryStorage::new())
        }
        None => {
            // Fail open: without a backend every session starts logged out.
            warn!("Token storage is enabled, but no backend config is provided. Using NoStorage.");
            Arc::new(NoStorage::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileStorageConfig;

    #[test]
    fn test_disabled_config_yields_no_storage() {
        let storage = create_storage(&StorageConfig {
            enabled: false,
            backend: Some(StorageBackend::Memory),
        });
        assert!(!storage.is_enabled());
    }

    #[test]
    fn test_missing_backend_yields_no_storage() {
        let storage = create_storage(&StorageConfig {
            enabled: true,
            backend: None,
        });
        assert!(!storage.is_enabled());
    }

    #[test]
    fn test_file_backend_is_selected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = create_storage(&StorageConfig {
            enabled: true,
            backend: Some(StorageBackend::File(FileStorageConfig {
                path: dir.path().join("tokens.json"),
            })),
        });
        assert!(storage.is_enabled());
        storage.set(ACCESS_TOKEN_KEY, "abc").unwrap();
        assert!(dir.path().join("tokens.json").exists());
    }
}
