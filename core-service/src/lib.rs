//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, secure
//! storage, push channel, notification presenter) into the session core.
//! Desktop apps typically enable the `desktop-shims` feature, which lets
//! [`bootstrap_desktop`] fill in every bridge from `bridge-desktop`; other
//! hosts build a [`SessionConfig`] with their own adapters and call
//! [`CoreService::new`].

pub mod error;

pub use error::{CoreError, Result};

pub use core_auth::{
    AuthError, AuthState, Credentials, SessionReader, SessionSnapshot, SessionStore, UserProfile,
};
pub use core_runtime::config::{SessionConfig, SessionConfigBuilder};
pub use core_runtime::events::{AuthEvent, CoreEvent, EventBus, NotificationEvent};

use std::sync::Arc;
use tracing::{debug, info};

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<SessionConfig>,
    session: Arc<SessionStore>,
    event_bus: EventBus,
}

impl CoreService {
    /// Create a new service from a validated configuration.
    ///
    /// # Errors
    ///
    /// Fails if the configured endpoints cannot be resolved.
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::new(config.event_buffer_size);
        let session = SessionStore::from_config(&config, event_bus.clone())?;

        debug!(api_base_url = %config.api_base_url, "Core service initialized");

        Ok(Self {
            config: Arc::new(config),
            session: Arc::new(session),
            event_bus,
        })
    }

    /// The session store shared by every caller of this service.
    pub fn session(&self) -> Arc<SessionStore> {
        Arc::clone(&self.session)
    }

    /// The event bus carrying session and notification events.
    pub fn events(&self) -> EventBus {
        self.event_bus.clone()
    }

    pub fn config(&self) -> Arc<SessionConfig> {
        Arc::clone(&self.config)
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Every bridge comes from `bridge-desktop` and the persisted session, if
/// any, is restored before returning.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// let core = core_service::bootstrap_desktop("https://api.pettact.com").await?;
/// let mut events = core.events().subscribe();
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop(api_base_url: impl Into<String>) -> Result<CoreService> {
    let config = SessionConfig::builder().api_base_url(api_base_url).build()?;
    let core = CoreService::new(config)?;

    let state = core.session.restore_user_from_token().await?;
    info!(state = %state, "Desktop core bootstrapped");

    Ok(core)
}
