//! Durable Token Storage
//!
//! Persists the access token so a session survives process restarts.
//!
//! ## Security Features
//!
//! - Token values are never logged or placed in error messages
//! - Storage goes through the platform `SecureStore` bridge
//! - Corrupted entries are erased on read
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::TokenStore;
//! use std::sync::Arc;
//! # use bridge_traits::storage::SecureStore;
//! # async fn example(secure_store: Arc<dyn SecureStore>) -> core_auth::Result<()> {
//! let token_store = TokenStore::new(secure_store, "accessToken");
//!
//! token_store.store_token("eyJhbGciOiJIUzI1NiJ9...").await?;
//! assert!(token_store.load_token().await?.is_some());
//! token_store.delete_token().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use bridge_traits::storage::SecureStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stores a single access token as raw UTF-8 bytes under one key.
#[derive(Clone)]
pub struct TokenStore {
    secure_store: Arc<dyn SecureStore>,
    key: String,
}

impl TokenStore {
    pub fn new(secure_store: Arc<dyn SecureStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        debug!(key = %key, "Initializing TokenStore");
        Self { secure_store, key }
    }

    /// The storage key tokens are written under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Store the access token, replacing any previous value.
    pub async fn store_token(&self, token: &str) -> Result<()> {
        self.secure_store
            .set_secret(&self.key, token.as_bytes())
            .await
            .map_err(|e| {
                warn!(key = %self.key, error = %e, "Failed to store access token");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        info!(key = %self.key, "Access token stored");
        Ok(())
    }

    /// Load the access token.
    ///
    /// Returns:
    /// - `Ok(Some(token))` if a usable token is stored
    /// - `Ok(None)` if nothing is stored, or the stored value was corrupted
    ///   (it is deleted)
    /// - `Err` if the secure store is unavailable
    pub async fn load_token(&self) -> Result<Option<String>> {
        let data = self.secure_store.get_secret(&self.key).await.map_err(|e| {
            warn!(key = %self.key, error = %e, "Failed to read access token");
            AuthError::SecureStorageUnavailable(e.to_string())
        })?;

        let Some(data) = data else {
            debug!(key = %self.key, "No access token in storage");
            return Ok(None);
        };

        match String::from_utf8(data) {
            Ok(token) if !token.trim().is_empty() => {
                debug!(key = %self.key, "Access token loaded");
                Ok(Some(token))
            }
            Ok(_) => {
                self.discard_corrupted("empty value").await;
                Ok(None)
            }
            Err(_) => {
                self.discard_corrupted("value is not valid UTF-8").await;
                Ok(None)
            }
        }
    }

    /// Delete the stored token. Deleting a missing token succeeds.
    pub async fn delete_token(&self) -> Result<()> {
        self.secure_store.delete_secret(&self.key).await.map_err(|e| {
            warn!(key = %self.key, error = %e, "Failed to delete access token");
            AuthError::SecureStorageUnavailable(e.to_string())
        })?;

        debug!(key = %self.key, "Access token deleted");
        Ok(())
    }

    pub async fn has_token(&self) -> Result<bool> {
        self.secure_store.has_secret(&self.key).await.map_err(|e| {
            warn!(key = %self.key, error = %e, "Failed to check access token");
            AuthError::SecureStorageUnavailable(e.to_string())
        })
    }

    async fn discard_corrupted(&self, reason: &str) {
        warn!(key = %self.key, reason = reason, "Stored access token is corrupted; deleting it");
        if let Err(e) = self.secure_store.delete_secret(&self.key).await {
            warn!(key = %self.key, error = %e, "Failed to delete corrupted access token");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::BridgeError;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockSecureStore {
        storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    #[async_trait::async_trait]
    impl SecureStore for MockSecureStore {
        async fn set_secret(&self, key: &str, value: &[u8]) -> bridge_traits::error::Result<()> {
            let mut storage = self.storage.lock().await;
            storage.insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn get_secret(&self, key: &str) -> bridge_traits::error::Result<Option<Vec<u8>>> {
            let storage = self.storage.lock().await;
            Ok(storage.get(key).cloned())
        }

        async fn delete_secret(&self, key: &str) -> bridge_traits::error::Result<()> {
            let mut storage = self.storage.lock().await;
            storage.remove(key);
            Ok(())
        }
    }

    struct FailingSecureStore;

    #[async_trait::async_trait]
    impl SecureStore for FailingSecureStore {
        async fn set_secret(&self, _key: &str, _value: &[u8]) -> bridge_traits::error::Result<()> {
            Err(BridgeError::NotAvailable("keychain locked".to_string()))
        }

        async fn get_secret(&self, _key: &str) -> bridge_traits::error::Result<Option<Vec<u8>>> {
            Err(BridgeError::NotAvailable("keychain locked".to_string()))
        }

        async fn delete_secret(&self, _key: &str) -> bridge_traits::error::Result<()> {
            Err(BridgeError::NotAvailable("keychain locked".to_string()))
        }
    }

    #[tokio::test]
    async fn test_store_and_load_token() {
        let secure_store = MockSecureStore::default();
        let token_store = TokenStore::new(Arc::new(secure_store.clone()), "accessToken");

        token_store.store_token("token-123").await.unwrap();

        assert_eq!(
            token_store.load_token().await.unwrap().as_deref(),
            Some("token-123")
        );
        assert_eq!(
            secure_store.storage.lock().await.get("accessToken"),
            Some(&b"token-123".to_vec())
        );
        assert!(token_store.has_token().await.unwrap());
    }

    #[tokio::test]
    async fn test_store_replaces_previous_token() {
        let token_store = TokenStore::new(Arc::new(MockSecureStore::default()), "accessToken");

        token_store.store_token("old").await.unwrap();
        token_store.store_token("new").await.unwrap();

        assert_eq!(token_store.load_token().await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_load_missing_token() {
        let token_store = TokenStore::new(Arc::new(MockSecureStore::default()), "accessToken");
        assert!(token_store.load_token().await.unwrap().is_none());
        assert!(!token_store.has_token().await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_token_is_idempotent() {
        let token_store = TokenStore::new(Arc::new(MockSecureStore::default()), "accessToken");

        token_store.store_token("token").await.unwrap();
        token_store.delete_token().await.unwrap();
        token_store.delete_token().await.unwrap();

        assert!(token_store.load_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupted_token_is_deleted() {
        let secure_store = MockSecureStore::default();
        secure_store
            .storage
            .lock()
            .await
            .insert("accessToken".to_string(), vec![0xff, 0xfe, 0x00]);

        let token_store = TokenStore::new(Arc::new(secure_store.clone()), "accessToken");

        assert!(token_store.load_token().await.unwrap().is_none());
        assert!(secure_store.storage.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_token_is_deleted() {
        let secure_store = MockSecureStore::default();
        secure_store
            .storage
            .lock()
            .await
            .insert("accessToken".to_string(), Vec::new());

        let token_store = TokenStore::new(Arc::new(secure_store.clone()), "accessToken");

        assert!(token_store.load_token().await.unwrap().is_none());
        assert!(secure_store.storage.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failures_map_to_unavailable() {
        let token_store = TokenStore::new(Arc::new(FailingSecureStore), "accessToken");

        assert!(matches!(
            token_store.store_token("t").await,
            Err(AuthError::SecureStorageUnavailable(_))
        ));
        assert!(matches!(
            token_store.load_token().await,
            Err(AuthError::SecureStorageUnavailable(_))
        ));
        assert!(matches!(
            token_store.delete_token().await,
            Err(AuthError::SecureStorageUnavailable(_))
        ));
    }

    #[test]
    fn test_custom_key() {
        let token_store = TokenStore::new(Arc::new(MockSecureStore::default()), "pettact.token");
        assert_eq!(token_store.key(), "pettact.token");
    }
}
