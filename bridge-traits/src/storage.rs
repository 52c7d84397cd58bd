//! Durable Credential Storage Abstraction
//!
//! Provides a platform-agnostic trait for persisting small secrets (access
//! tokens) across process restarts.

use async_trait::async_trait;

use crate::error::Result;

/// Secure credential storage trait
///
/// Abstracts durable secret storage mechanisms:
/// - macOS/iOS: Keychain
/// - Windows: Credential Manager
/// - Linux: Secret Service / libsecret
/// - Web: localStorage
///
/// # Security Requirements
///
/// Implementations MUST:
/// - Use platform-provided secure storage when available
/// - Never log or expose stored values
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SecureStore;
///
/// async fn store_token(store: &dyn SecureStore, token: &str) -> Result<()> {
///     store.set_secret("accessToken", token.as_bytes()).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Store a secret value, replacing any previous value under `key`.
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Retrieve a secret value
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete a secret
    ///
    /// Deleting a missing key succeeds.
    async fn delete_secret(&self, key: &str) -> Result<()>;

    /// Check if a secret exists without retrieving it
    async fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.get_secret(key).await?.is_some())
    }
}
