//! Identity API client
//!
//! Typed wrapper over the `HttpClient` bridge for the two identity endpoints:
//! credential exchange and current-user profile.

use crate::error::{AuthError, Result};
use crate::types::{Credentials, LoginRequest, LoginResponse, UserProfile};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use core_runtime::config::SessionConfig;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Longest slice of an error body carried into [`AuthError::Rejected`].
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Clone)]
pub struct IdentityApi {
    http_client: Arc<dyn HttpClient>,
    login_url: Url,
    profile_url: Url,
    timeout: Option<Duration>,
}

impl IdentityApi {
    pub fn new(http_client: Arc<dyn HttpClient>, login_url: Url, profile_url: Url) -> Self {
        Self {
            http_client,
            login_url,
            profile_url,
            timeout: None,
        }
    }

    /// Build from a validated session configuration.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::clone(&config.http_client),
            config.login_url()?,
            config.profile_url()?,
        )
        .with_timeout(config.request_timeout))
    }

    /// Per-request timeout attached to every call.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exchange credentials for an access token.
    ///
    /// The request is sent once; a login is not retried automatically.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Network`] if no response was received
    /// - [`AuthError::Rejected`] on a non-2xx status
    /// - [`AuthError::InvalidResponse`] if a 2xx body carries no usable token
    #[instrument(skip(self, credentials), fields(url = %self.login_url))]
    pub async fn login(&self, credentials: &Credentials) -> Result<String> {
        let request = HttpRequest::new(HttpMethod::Post, self.login_url.as_str())
            .json(&LoginRequest::from(credentials))
            .map_err(|e| AuthError::InvalidResponse(format!("Failed to encode login body: {}", e)))?
            .maybe_timeout(self.timeout);

        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::no_retry())
            .await
            .map_err(|e| {
                warn!(error = %e, "Login request failed");
                AuthError::Network(e.to_string())
            })?;

        let response = ensure_success(response)?;

        let body: LoginResponse = response.json().map_err(|e| {
            warn!(error = %e, "Login response is not valid JSON");
            AuthError::InvalidResponse(format!("Malformed login response: {}", e))
        })?;

        match body.access_token {
            Some(token) if !token.trim().is_empty() => {
                debug!("Login endpoint issued an access token");
                Ok(token)
            }
            _ => {
                warn!("Login response did not contain an access token");
                Err(AuthError::InvalidResponse(
                    "Login response did not contain an access token".to_string(),
                ))
            }
        }
    }

    /// Fetch the profile of the user owning `token`.
    ///
    /// # Errors
    ///
    /// Same mapping as [`login`](Self::login). A `null` body is an
    /// [`AuthError::InvalidResponse`].
    #[instrument(skip(self, token), fields(url = %self.profile_url))]
    pub async fn fetch_profile(&self, token: &str) -> Result<UserProfile> {
        let request = HttpRequest::new(HttpMethod::Get, self.profile_url.as_str())
            .bearer_token(token)
            .header("Accept", "application/json")
            .maybe_timeout(self.timeout);

        let response = self.http_client.execute(request).await.map_err(|e| {
            warn!(error = %e, "Profile request failed");
            AuthError::Network(e.to_string())
        })?;

        let response = ensure_success(response)?;

        let value: Value = response.json().map_err(|e| {
            warn!(error = %e, "Profile response is not valid JSON");
            AuthError::InvalidResponse(format!("Malformed profile response: {}", e))
        })?;

        if value.is_null() {
            return Err(AuthError::InvalidResponse(
                "Profile response was empty".to_string(),
            ));
        }

        Ok(UserProfile::new(value))
    }
}

fn ensure_success(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let body: String = String::from_utf8_lossy(&response.body)
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect();
    warn!(status = response.status, "Identity endpoint rejected the request");

    Err(AuthError::Rejected {
        status: response.status,
        body,
    })
}
