//! # Session Configuration Module
//!
//! Provides configuration management for the client session core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `SessionConfig` instance that holds the API location, endpoint paths and
//! every injected bridge. It enforces fail-fast validation so a missing
//! capability is reported at startup rather than on the first login.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - Calls the identity endpoints
//! - `SecureStore` - Persists the access token across restarts
//!
//! ## Optional Dependencies
//!
//! - `PushChannel` - Server push subscription opened after login
//! - `NotificationPresenter` - Surfaces incoming notifications to the user
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults for
//! all four are injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::SessionConfig;
//!
//! let config = SessionConfig::builder()
//!     .api_base_url("https://api.pettact.com")
//!     .build()
//!     .expect("Failed to build config");
//!
//! assert_eq!(config.login_url().unwrap().path(), "/v1/user/login");
//! ```
//!
//! ## Error Handling
//!
//! Without `desktop-shims`, omitting a required bridge yields
//! [`Error::CapabilityMissing`] with an actionable message.

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{HttpClient, NotificationPresenter, PushChannel, SecureStore};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Path of the credential exchange endpoint.
pub const DEFAULT_LOGIN_PATH: &str = "/v1/user/login";

/// Path of the current-user profile endpoint.
pub const DEFAULT_PROFILE_PATH: &str = "/v1/user/me";

/// Path of the server push (SSE) subscription endpoint.
pub const DEFAULT_NOTIFICATION_PATH: &str = "/v1/notification/subscribe";

/// Durable storage key holding the raw access token.
pub const DEFAULT_TOKEN_STORAGE_KEY: &str = "accessToken";

/// Per-request timeout attached to identity API calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoint paths, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub login: String,
    pub profile: String,
    pub notifications: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            login: DEFAULT_LOGIN_PATH.to_string(),
            profile: DEFAULT_PROFILE_PATH.to_string(),
            notifications: DEFAULT_NOTIFICATION_PATH.to_string(),
        }
    }
}

impl ApiEndpoints {
    fn validate(&self) -> Result<()> {
        for (name, path) in [
            ("login", &self.login),
            ("profile", &self.profile),
            ("notifications", &self.notifications),
        ] {
            if !path.starts_with('/') {
                return Err(Error::Config(format!(
                    "The {} endpoint path must start with '/': {:?}",
                    name, path
                )));
            }
        }
        Ok(())
    }
}

/// Joins an endpoint path onto the base URL, keeping any base path prefix.
///
/// `https://host/api/` + `/v1/user/me` yields `https://host/api/v1/user/me`.
pub fn join_endpoint(base: &Url, path: &str) -> Result<Url> {
    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), path);
    Url::parse(&joined)
        .map_err(|e| Error::Config(format!("Invalid endpoint URL {}: {}", joined, e)))
}

/// Session core configuration.
///
/// Use [`SessionConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct SessionConfig {
    /// Base URL every endpoint path is resolved against
    pub api_base_url: Url,

    pub endpoints: ApiEndpoints,

    /// Durable storage key of the access token
    pub token_storage_key: String,

    /// Per-request timeout; `None` leaves the client default in place
    pub request_timeout: Option<Duration>,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,

    pub http_client: Arc<dyn HttpClient>,

    pub secure_store: Arc<dyn SecureStore>,

    /// Server push channel (optional; without it, login skips the subscription)
    pub push_channel: Option<Arc<dyn PushChannel>>,

    /// Presenter for incoming notifications (optional)
    pub notification_presenter: Option<Arc<dyn NotificationPresenter>>,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("endpoints", &self.endpoints)
            .field("token_storage_key", &self.token_storage_key)
            .field("request_timeout", &self.request_timeout)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("http_client", &"HttpClient { ... }")
            .field("secure_store", &"SecureStore { ... }")
            .field(
                "push_channel",
                &self.push_channel.as_ref().map(|_| "PushChannel { ... }"),
            )
            .field(
                "notification_presenter",
                &self
                    .notification_presenter
                    .as_ref()
                    .map(|_| "NotificationPresenter { ... }"),
            )
            .finish()
    }
}

impl SessionConfig {
    /// Creates a new builder for constructing a `SessionConfig`.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The base URL uses http or https
    /// - Endpoint paths are absolute
    /// - The token storage key is not empty
    /// - Timeout and event buffer size are non-zero
    pub fn validate(&self) -> Result<()> {
        match self.api_base_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::Config(format!(
                    "API base URL must use http or https, got '{}'",
                    other
                )))
            }
        }

        self.endpoints.validate()?;

        if self.token_storage_key.trim().is_empty() {
            return Err(Error::Config(
                "Token storage key cannot be empty".to_string(),
            ));
        }

        if self.request_timeout == Some(Duration::ZERO) {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Full URL of the login endpoint.
    pub fn login_url(&self) -> Result<Url> {
        join_endpoint(&self.api_base_url, &self.endpoints.login)
    }

    /// Full URL of the profile endpoint.
    pub fn profile_url(&self) -> Result<Url> {
        join_endpoint(&self.api_base_url, &self.endpoints.profile)
    }

    /// Full URL of the push subscription endpoint.
    pub fn notifications_url(&self) -> Result<Url> {
        join_endpoint(&self.api_base_url, &self.endpoints.notifications)
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required to reach the identity API. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default ReqwestHttpClient. \
                 Web: inject a fetch-based client."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn secure_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SecureStore".to_string(),
        message: "SecureStore implementation is required for access token persistence. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default KeyringSecureStore. \
                 Web: inject localStorage-backed storage."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Option<Duration>) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_timeout(timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Option<Duration>) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    use bridge_desktop::KeyringSecureStore;

    let store: Arc<dyn SecureStore> = Arc::new(KeyringSecureStore::new());
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    Err(secure_store_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_push_channel(endpoint: Url) -> Result<Option<Arc<dyn PushChannel>>> {
    use bridge_desktop::SsePushChannel;

    let channel = SsePushChannel::new(endpoint)?;
    Ok(Some(Arc::new(channel)))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_push_channel(_endpoint: Url) -> Result<Option<Arc<dyn PushChannel>>> {
    Ok(None)
}

#[cfg(feature = "desktop-shims")]
fn provide_default_presenter() -> Option<Arc<dyn NotificationPresenter>> {
    Some(Arc::new(bridge_desktop::ConsoleNotificationPresenter))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_presenter() -> Option<Arc<dyn NotificationPresenter>> {
    None
}

/// Builder for constructing [`SessionConfig`] instances.
#[derive(Default)]
pub struct SessionConfigBuilder {
    api_base_url: Option<String>,
    endpoints: ApiEndpoints,
    token_storage_key: Option<String>,
    request_timeout: Option<Option<Duration>>,
    event_buffer_size: Option<usize>,
    http_client: Option<Arc<dyn HttpClient>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    push_channel: Option<Arc<dyn PushChannel>>,
    notification_presenter: Option<Arc<dyn NotificationPresenter>>,
}

impl SessionConfigBuilder {
    /// Sets the API base URL (required).
    ///
    /// ```
    /// use core_runtime::config::SessionConfig;
    ///
    /// let builder = SessionConfig::builder().api_base_url("https://api.pettact.com");
    /// ```
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Overrides the login endpoint path. Default: `/v1/user/login`
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.endpoints.login = path.into();
        self
    }

    /// Overrides the profile endpoint path. Default: `/v1/user/me`
    pub fn profile_path(mut self, path: impl Into<String>) -> Self {
        self.endpoints.profile = path.into();
        self
    }

    /// Overrides the push subscription path. Default: `/v1/notification/subscribe`
    pub fn notifications_path(mut self, path: impl Into<String>) -> Self {
        self.endpoints.notifications = path.into();
        self
    }

    /// Overrides the durable storage key. Default: `accessToken`
    pub fn token_storage_key(mut self, key: impl Into<String>) -> Self {
        self.token_storage_key = Some(key.into());
        self
    }

    /// Sets the per-request timeout. Default: 30 seconds.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(Some(timeout));
        self
    }

    /// Leaves request timeouts to the HTTP client.
    pub fn without_request_timeout(mut self) -> Self {
        self.request_timeout = Some(None);
        self
    }

    /// Sets the event bus capacity. Default: 100
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    pub fn push_channel(mut self, channel: Arc<dyn PushChannel>) -> Self {
        self.push_channel = Some(channel);
        self
    }

    pub fn notification_presenter(mut self, presenter: Arc<dyn NotificationPresenter>) -> Self {
        self.notification_presenter = Some(presenter);
        self
    }

    /// Builds the configuration, filling in platform defaults and validating.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the base URL is missing or malformed, or
    ///   validation fails
    /// - [`Error::CapabilityMissing`] if a required bridge is absent and no
    ///   platform default exists
    pub fn build(self) -> Result<SessionConfig> {
        let raw_url = self.api_base_url.ok_or_else(|| {
            Error::Config("API base URL is required. Use .api_base_url() to set it.".to_string())
        })?;
        let api_base_url = Url::parse(&raw_url)
            .map_err(|e| Error::Config(format!("Invalid API base URL {}: {}", raw_url, e)))?;

        self.endpoints.validate()?;

        let request_timeout = self
            .request_timeout
            .unwrap_or(Some(DEFAULT_REQUEST_TIMEOUT));

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let secure_store = match self.secure_store {
            Some(store) => store,
            None => provide_default_secure_store()?,
        };

        let push_channel = match self.push_channel {
            Some(channel) => Some(channel),
            None => provide_default_push_channel(join_endpoint(
                &api_base_url,
                &self.endpoints.notifications,
            )?)?,
        };

        let notification_presenter = self
            .notification_presenter
            .or_else(provide_default_presenter);

        let config = SessionConfig {
            api_base_url,
            endpoints: self.endpoints,
            token_storage_key: self
                .token_storage_key
                .unwrap_or_else(|| DEFAULT_TOKEN_STORAGE_KEY.to_string()),
            request_timeout,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            http_client,
            secure_store,
            push_channel,
            notification_presenter,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{BridgeError, HttpRequest, HttpResponse, RetryPolicy};

    struct MockHttpClient;

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(
            &self,
            _request: HttpRequest,
        ) -> std::result::Result<HttpResponse, BridgeError> {
            Err(BridgeError::NotAvailable("offline".to_string()))
        }

        async fn execute_with_retry(
            &self,
            request: HttpRequest,
            _policy: RetryPolicy,
        ) -> std::result::Result<HttpResponse, BridgeError> {
            self.execute(request).await
        }
    }

    struct MockSecureStore;

    #[async_trait]
    impl SecureStore for MockSecureStore {
        async fn set_secret(
            &self,
            _key: &str,
            _value: &[u8],
        ) -> std::result::Result<(), BridgeError> {
            Ok(())
        }

        async fn get_secret(
            &self,
            _key: &str,
        ) -> std::result::Result<Option<Vec<u8>>, BridgeError> {
            Ok(None)
        }

        async fn delete_secret(&self, _key: &str) -> std::result::Result<(), BridgeError> {
            Ok(())
        }
    }

    fn builder() -> SessionConfigBuilder {
        SessionConfig::builder()
            .api_base_url("https://api.pettact.com")
            .http_client(Arc::new(MockHttpClient))
            .secure_store(Arc::new(MockSecureStore))
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = SessionConfig::builder()
            .http_client(Arc::new(MockHttpClient))
            .secure_store(Arc::new(MockSecureStore))
            .build();

        assert!(result
            .unwrap_err()
            .to_string()
            .contains("API base URL is required"));
    }

    #[test]
    fn test_builder_rejects_malformed_base_url() {
        let result = builder().api_base_url("not a url").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_rejects_non_http_scheme() {
        let result = builder().api_base_url("ftp://api.pettact.com").build();
        assert!(result.unwrap_err().to_string().contains("http or https"));
    }

    #[test]
    fn test_builder_defaults() {
        let config = builder().build().unwrap();

        assert_eq!(config.endpoints, ApiEndpoints::default());
        assert_eq!(config.token_storage_key, "accessToken");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.event_buffer_size, 100);
    }

    #[test]
    fn test_endpoint_urls() {
        let config = builder().build().unwrap();

        assert_eq!(
            config.login_url().unwrap().as_str(),
            "https://api.pettact.com/v1/user/login"
        );
        assert_eq!(
            config.profile_url().unwrap().as_str(),
            "https://api.pettact.com/v1/user/me"
        );
        assert_eq!(
            config.notifications_url().unwrap().as_str(),
            "https://api.pettact.com/v1/notification/subscribe"
        );
    }

    #[test]
    fn test_join_keeps_base_path_prefix() {
        let base = Url::parse("https://pettact.com/api/").unwrap();
        assert_eq!(
            join_endpoint(&base, "/v1/user/me").unwrap().as_str(),
            "https://pettact.com/api/v1/user/me"
        );
    }

    #[test]
    fn test_custom_endpoints() {
        let config = builder()
            .login_path("/auth/login")
            .profile_path("/auth/me")
            .notifications_path("/sse")
            .token_storage_key("pettact.token")
            .request_timeout(Duration::from_secs(5))
            .event_buffer_size(8)
            .build()
            .unwrap();

        assert_eq!(config.login_url().unwrap().path(), "/auth/login");
        assert_eq!(config.profile_url().unwrap().path(), "/auth/me");
        assert_eq!(config.notifications_url().unwrap().path(), "/sse");
        assert_eq!(config.token_storage_key, "pettact.token");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.event_buffer_size, 8);
    }

    #[test]
    fn test_relative_endpoint_path_rejected() {
        let result = builder().profile_path("v1/user/me").build();
        assert!(result.unwrap_err().to_string().contains("profile"));
    }

    #[test]
    fn test_validate_rejects_empty_storage_key() {
        let result = builder().token_storage_key("  ").build();
        assert!(result.unwrap_err().to_string().contains("storage key"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let result = builder().request_timeout(Duration::ZERO).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_without_request_timeout() {
        let config = builder().without_request_timeout().build().unwrap();
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_event_buffer() {
        let result = builder().event_buffer_size(0).build();
        assert!(result.unwrap_err().to_string().contains("Event buffer"));
    }

    #[test]
    fn test_debug_hides_bridges() {
        let config = builder().build().unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("HttpClient { ... }"));
        assert!(debug.contains("api.pettact.com"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_http_client() {
        let result = SessionConfig::builder()
            .api_base_url("https://api.pettact.com")
            .secure_store(Arc::new(MockSecureStore))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "HttpClient")
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_secure_store() {
        let result = SessionConfig::builder()
            .api_base_url("https://api.pettact.com")
            .http_client(Arc::new(MockHttpClient))
            .build();

        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("SecureStore"));
        assert!(err_msg.contains("token persistence"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_push_channel_is_optional() {
        let config = builder().build().unwrap();
        assert!(config.push_channel.is_none());
        assert!(config.notification_presenter.is_none());
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_desktop_defaults_fill_push_bridges() {
        let config = builder().build().unwrap();
        assert!(config.push_channel.is_some());
        assert!(config.notification_presenter.is_some());
    }
}
