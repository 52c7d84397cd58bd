//! # Session Store
//!
//! Single authoritative in-memory holder of the user session, kept in sync
//! with durable storage so a login survives restarts.
//!
//! ## State machine
//!
//! ```text
//! LoggedOut ──login ok──> PendingProfile ──fetch_user ok──> LoggedIn
//!     ^                          │                              │
//!     └──── fetch_user failure / logout ────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! State lives behind a `tokio::sync::RwLock` together with a generation
//! counter bumped on every token adoption and every logout. `fetch_user`
//! captures the generation before its request and only commits when it is
//! unchanged, so a slow response can neither resurrect a logged-out session
//! nor tear down a newer one.
//!
//! Transitions that touch durable storage or the push channel (persisting and
//! adopting a token, opening the subscription, tearing a session down) run
//! under a separate `tokio::sync::Mutex`, so memory, storage and subscription
//! always move together.
//!
//! ## Example
//!
//! ```ignore
//! use core_auth::{Credentials, SessionReader, SessionStore};
//!
//! let session = SessionStore::from_config(&config, event_bus)?;
//! session.restore_user_from_token().await?;
//!
//! if !session.is_authenticated().await {
//!     session.login(&Credentials::new("kim@pettact.com", "secret")).await?;
//! }
//! ```

use crate::api::IdentityApi;
use crate::error::{AuthError, Result};
use crate::notifications::{notification_handler, NotificationSubscription};
use crate::token_store::TokenStore;
use crate::types::{AuthState, Credentials, SessionId, SessionSnapshot, UserProfile};
use async_trait::async_trait;
use bridge_traits::push::NotificationPresenter;
use core_runtime::config::SessionConfig;
use core_runtime::events::{
    AuthEvent, CoreEvent, EventBus, LogoutReason, NotificationEvent, Receiver,
};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

/// Read access to the session.
#[async_trait]
pub trait SessionReader: Send + Sync {
    async fn snapshot(&self) -> SessionSnapshot;

    async fn current_user(&self) -> Option<UserProfile> {
        self.snapshot().await.user
    }

    async fn access_token(&self) -> Option<String> {
        self.snapshot().await.access_token
    }

    async fn state(&self) -> AuthState {
        self.snapshot().await.state
    }

    /// True once the profile has been loaded.
    async fn is_authenticated(&self) -> bool {
        self.state().await.is_logged_in()
    }
}

#[derive(Default)]
struct SessionState {
    session_id: Option<SessionId>,
    access_token: Option<String>,
    user: Option<UserProfile>,
    generation: u64,
}

impl SessionState {
    fn auth_state(&self) -> AuthState {
        AuthState::from_parts(self.access_token.is_some(), self.user.is_some())
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            user: self.user.clone(),
            access_token: self.access_token.clone(),
            state: self.auth_state(),
        }
    }
}

/// Token adopted into memory, with the generation it was adopted at.
struct Adopted {
    token: String,
    session_id: SessionId,
    generation: u64,
}

/// The session store.
///
/// Created empty; hydrate it with [`restore_user_from_token`](Self::restore_user_from_token).
pub struct SessionStore {
    api: IdentityApi,
    token_store: TokenStore,
    subscription: NotificationSubscription,
    presenter: Option<Arc<dyn NotificationPresenter>>,
    event_bus: EventBus,
    state: RwLock<SessionState>,
    transition: Mutex<()>,
}

impl SessionStore {
    pub fn new(
        api: IdentityApi,
        token_store: TokenStore,
        subscription: NotificationSubscription,
        presenter: Option<Arc<dyn NotificationPresenter>>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            api,
            token_store,
            subscription,
            presenter,
            event_bus,
            state: RwLock::new(SessionState::default()),
            transition: Mutex::new(()),
        }
    }

    /// Wire every collaborator from a validated configuration.
    pub fn from_config(config: &SessionConfig, event_bus: EventBus) -> Result<Self> {
        Ok(Self::new(
            IdentityApi::from_config(config)?,
            TokenStore::new(
                Arc::clone(&config.secure_store),
                config.token_storage_key.clone(),
            ),
            NotificationSubscription::new(config.push_channel.clone()),
            config.notification_presenter.clone(),
            event_bus,
        ))
    }

    /// Subscribe to session and notification events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    /// Whether a push subscription is currently open.
    pub async fn is_subscribed(&self) -> bool {
        self.subscription.current().await.is_some()
    }

    /// Log in with email and password.
    ///
    /// On success the token is persisted, then adopted in memory, the
    /// profile is fetched, and the push subscription is (re)opened.
    ///
    /// # Errors
    ///
    /// Endpoint and storage errors are returned; the session is left
    /// exactly as it was before the call. A failing profile fetch is not an
    /// error here: it logs the session out and the returned state says so.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthState> {
        info!("Logging in");
        self.emit(AuthEvent::LoggingIn);

        let token = match self.api.login(credentials).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.emit_error(None, &e, true);
                return Err(e);
            }
        };

        let adopted = {
            let _transition = self.transition.lock().await;

            if let Err(e) = self.token_store.store_token(&token).await {
                warn!(error = %e, "Failed to persist access token; login aborted");
                self.emit_error(None, &e, true);
                return Err(e);
            }

            self.adopt_token(token).await
        };
        info!(session_id = %adopted.session_id, "Logged in");
        self.emit(AuthEvent::LoggedIn {
            session_id: adopted.session_id.to_string(),
        });

        self.fetch_user().await;
        self.open_subscription(&adopted).await;

        Ok(self.state().await)
    }

    /// Fetch the current user's profile.
    ///
    /// Does nothing when no token is held. Any failure logs the session out.
    /// Never returns an error.
    #[instrument(skip(self))]
    pub async fn fetch_user(&self) {
        let (token, generation, session_id) = {
            let state = self.state.read().await;
            match (&state.access_token, state.session_id) {
                (Some(token), Some(session_id)) => (token.clone(), state.generation, session_id),
                _ => {
                    debug!("No access token; skipping profile fetch");
                    return;
                }
            }
        };

        match self.api.fetch_profile(&token).await {
            Ok(profile) => {
                {
                    let mut state = self.state.write().await;
                    if state.generation != generation {
                        debug!(session_id = %session_id, "Discarding stale profile response");
                        return;
                    }
                    state.user = Some(profile);
                }
                info!(session_id = %session_id, "User profile loaded");
                self.emit(AuthEvent::ProfileLoaded {
                    session_id: session_id.to_string(),
                });
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Profile fetch failed; logging out");
                self.emit_error(Some(session_id), &e, false);
                self.clear_session(LogoutReason::SessionRejected, Some(generation))
                    .await;
            }
        }
    }

    /// Clear the session, remove the persisted token and close the push
    /// subscription. Idempotent; storage and channel errors are logged.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.clear_session(LogoutReason::UserRequested, None).await;
    }

    /// Adopt the persisted token, if any, and fetch its profile.
    ///
    /// Does not open the push subscription.
    ///
    /// # Errors
    ///
    /// [`AuthError::SecureStorageUnavailable`] if storage cannot be read.
    #[instrument(skip(self))]
    pub async fn restore_user_from_token(&self) -> Result<AuthState> {
        let adopted = {
            let _transition = self.transition.lock().await;

            let token = match self.token_store.load_token().await {
                Ok(Some(token)) => token,
                Ok(None) => {
                    debug!("No persisted session to restore");
                    return Ok(self.state().await);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read persisted session");
                    self.emit_error(None, &e, true);
                    return Err(e);
                }
            };

            self.adopt_token(token).await
        };
        info!(session_id = %adopted.session_id, "Restoring persisted session");
        self.emit(AuthEvent::SessionRestored {
            session_id: adopted.session_id.to_string(),
        });

        self.fetch_user().await;

        Ok(self.state().await)
    }

    async fn adopt_token(&self, token: String) -> Adopted {
        let mut state = self.state.write().await;
        let session_id = SessionId::new();
        state.generation += 1;
        state.session_id = Some(session_id);
        state.access_token = Some(token.clone());
        state.user = None;

        Adopted {
            token,
            session_id,
            generation: state.generation,
        }
    }

    async fn is_current(&self, generation: u64) -> bool {
        let state = self.state.read().await;
        state.generation == generation && state.access_token.is_some()
    }

    async fn open_subscription(&self, adopted: &Adopted) {
        if !self.subscription.is_enabled() {
            return;
        }

        let _transition = self.transition.lock().await;

        if !self.is_current(adopted.generation).await {
            debug!(session_id = %adopted.session_id, "Session ended during login; not subscribing");
            return;
        }

        let handler = notification_handler(self.presenter.clone(), self.event_bus.clone());

        match self
            .subscription
            .open(&adopted.token, adopted.session_id, handler)
            .await
        {
            Ok(true) => {
                self.emit_notification(NotificationEvent::Subscribed {
                    session_id: adopted.session_id.to_string(),
                });
            }
            Ok(false) => {}
            Err(e) => {
                warn!(session_id = %adopted.session_id, error = %e, "Failed to open push subscription");
                self.emit_error(Some(adopted.session_id), &e, true);
            }
        }
    }

    async fn close_subscription(&self) {
        match self.subscription.close().await {
            Ok(true) => self.emit_notification(NotificationEvent::Unsubscribed),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Failed to close push subscription"),
        }
    }

    /// Tear the session down. With `expected_generation`, only when that
    /// generation is still current.
    /// Storage and channel teardown run under the transition lock.
    async fn clear_session(&self, reason: LogoutReason, expected_generation: Option<u64>) {
        let _transition = self.transition.lock().await;

        let (had_session, session_id) = {
            let mut state = self.state.write().await;
            if let Some(expected) = expected_generation {
                if state.generation != expected {
                    debug!("Session changed since the failing request; keeping it");
                    return;
                }
            }
            let had_session = state.access_token.is_some() || state.user.is_some();
            let session_id = state.session_id.take();
            state.access_token = None;
            state.user = None;
            state.generation += 1;
            (had_session, session_id)
        };

        if let Err(e) = self.token_store.delete_token().await {
            warn!(error = %e, "Failed to remove persisted access token");
        }

        self.close_subscription().await;

        if had_session {
            info!(reason = ?reason, "Logged out");
            self.emit(AuthEvent::LoggedOut {
                session_id: session_id.map(|id| id.to_string()),
                reason,
            });
        } else {
            debug!("Logout with no active session");
        }
    }

    fn emit(&self, event: AuthEvent) {
        let _ = self.event_bus.emit(CoreEvent::Auth(event));
    }

    fn emit_notification(&self, event: NotificationEvent) {
        let _ = self.event_bus.emit(CoreEvent::Notification(event));
    }

    fn emit_error(&self, session_id: Option<SessionId>, error: &AuthError, recoverable: bool) {
        self.emit(AuthEvent::AuthError {
            session_id: session_id.map(|id| id.to_string()),
            message: error.to_string(),
            recoverable,
        });
    }
}

#[async_trait]
impl SessionReader for SessionStore {
    async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.snapshot()
    }

    async fn access_token(&self) -> Option<String> {
        self.state.read().await.access_token.clone()
    }

    async fn state(&self) -> AuthState {
        self.state.read().await.auth_state()
    }
}
