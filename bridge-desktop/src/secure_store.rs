//! Secure Credential Storage using OS Keychain

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SecureStore,
};
use keyring::Entry;
use tracing::{debug, warn};

/// Default keychain service name.
pub const DEFAULT_SERVICE_NAME: &str = "pettact-client";

/// Keyring-based secure storage implementation
///
/// Uses platform-specific secure storage:
/// - macOS: Keychain
/// - Windows: Credential Manager (DPAPI)
/// - Linux: Secret Service (libsecret)
///
/// Values are base64-encoded since keyring entries hold strings.
pub struct KeyringSecureStore {
    service_name: String,
}

impl KeyringSecureStore {
    /// Create a new secure store with default service name
    pub fn new() -> Self {
        Self::with_service_name(DEFAULT_SERVICE_NAME)
    }

    /// Create a new secure store with custom service name
    pub fn with_service_name(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn get_entry(&self, key: &str) -> std::result::Result<Entry, keyring::Error> {
        Entry::new(&self.service_name, key)
    }

    fn map_keyring_error(e: keyring::Error) -> BridgeError {
        BridgeError::OperationFailed(format!("Keyring error: {}", e))
    }
}

impl Default for KeyringSecureStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecureStore for KeyringSecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        let encoded = base64::encode(value);

        let entry = self.get_entry(key).map_err(Self::map_keyring_error)?;

        entry
            .set_password(&encoded)
            .map_err(Self::map_keyring_error)?;

        debug!(key = key, "Stored secret in keyring");
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entry = self.get_entry(key).map_err(Self::map_keyring_error)?;

        match entry.get_password() {
            Ok(encoded) => {
                let decoded = base64::decode(&encoded).map_err(|e| {
                    warn!(key = key, error = %e, "Failed to decode secret");
                    BridgeError::OperationFailed(format!("Failed to decode secret: {}", e))
                })?;

                debug!(key = key, "Retrieved secret from keyring");
                Ok(Some(decoded))
            }
            Err(keyring::Error::NoEntry) => {
                debug!(key = key, "Secret not found in keyring");
                Ok(None)
            }
            Err(e) => Err(Self::map_keyring_error(e)),
        }
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        let entry = self.get_entry(key).map_err(Self::map_keyring_error)?;

        match entry.delete_credential() {
            Ok(_) => debug!(key = key, "Deleted secret from keyring"),
            Err(keyring::Error::NoEntry) => {
                debug!(key = key, "Secret not found (already deleted)")
            }
            Err(e) => return Err(Self::map_keyring_error(e)),
        }

        Ok(())
    }

    async fn has_secret(&self, key: &str) -> Result<bool> {
        let entry = self.get_entry(key).map_err(Self::map_keyring_error)?;

        match entry.get_password() {
            Ok(_) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(Self::map_keyring_error(e)),
        }
    }
}

mod base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    pub fn encode(data: &[u8]) -> String {
        STANDARD.encode(data)
    }

    pub fn decode(data: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(data)
    }
}
