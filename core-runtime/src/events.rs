//! # Event Bus System
//!
//! Provides an event-driven architecture for the session core using `tokio::sync::broadcast`.
//! Host UIs subscribe to typed events instead of polling session state.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies for auth and notification domains
//! - **EventBus**: Central broadcast channel for publishing events
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐     emit      ┌───────────┐
//! │ SessionStore  ├──────────────>│           │     subscribe    ┌────────────┐
//! └───────────────┘               │ EventBus  ├─────────────────>│  Host UI   │
//!                                 │ (broadcast│                  └────────────┘
//! ┌───────────────┐     emit      │  channel) │     subscribe    ┌────────────┐
//! │ Push handler  ├──────────────>│           ├─────────────────>│ Subscriber │
//! └───────────────┘               └───────────┘                  └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Auth(AuthEvent::LoggedIn {
//!         session_id: "session-1".to_string(),
//!     }))
//!     .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "User logged in");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   Non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped. Treat as shutdown.
//!
//! Emitting with no subscribers returns an error; publishers in this
//! workspace ignore it, since events are advisory.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Session lifecycle events
    Auth(AuthEvent),
    /// Push notification events
    Notification(NotificationEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Auth(e) => e.description(),
            CoreEvent::Notification(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Auth(AuthEvent::AuthError {
                recoverable: false, ..
            }) => EventSeverity::Error,
            CoreEvent::Auth(AuthEvent::AuthError { .. }) => EventSeverity::Warning,
            CoreEvent::Auth(AuthEvent::LoggedOut {
                reason: LogoutReason::SessionRejected,
                ..
            }) => EventSeverity::Warning,
            CoreEvent::Auth(AuthEvent::LoggedIn { .. }) => EventSeverity::Info,
            CoreEvent::Auth(AuthEvent::LoggedOut { .. }) => EventSeverity::Info,
            CoreEvent::Notification(NotificationEvent::Received { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Authentication Events
// ============================================================================

/// Why a session was torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogoutReason {
    /// The host called `logout`.
    UserRequested,
    /// The identity endpoint failed or rejected the token.
    SessionRejected,
}

/// Events related to the session lifecycle.
///
/// Payloads never include tokens, passwords or email addresses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// Credentials were submitted to the login endpoint.
    LoggingIn,
    /// The login endpoint issued a token and it was persisted.
    LoggedIn {
        /// Identifier of the session the token belongs to.
        session_id: String,
    },
    /// A persisted token was adopted at startup.
    SessionRestored { session_id: String },
    /// The user profile was fetched and stored.
    ProfileLoaded { session_id: String },
    /// The session was cleared.
    LoggedOut {
        /// The session that was cleared, if one was active.
        session_id: Option<String>,
        reason: LogoutReason,
    },
    /// An authentication error occurred.
    AuthError {
        session_id: Option<String>,
        /// Human-readable error message.
        message: String,
        /// Whether the session survived the error.
        recoverable: bool,
    },
}

impl AuthEvent {
    fn description(&self) -> &str {
        match self {
            AuthEvent::LoggingIn => "Login in progress",
            AuthEvent::LoggedIn { .. } => "User logged in",
            AuthEvent::SessionRestored { .. } => "Session restored from storage",
            AuthEvent::ProfileLoaded { .. } => "User profile loaded",
            AuthEvent::LoggedOut { .. } => "User logged out",
            AuthEvent::AuthError { .. } => "Authentication error",
        }
    }
}

// ============================================================================
// Notification Events
// ============================================================================

/// Events related to the server push subscription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum NotificationEvent {
    /// The push subscription was opened.
    Subscribed { session_id: String },
    /// A notification arrived.
    Received {
        title: String,
        content: Option<String>,
        notification_type: Option<String>,
    },
    /// The push subscription was closed.
    Unsubscribed,
}

impl NotificationEvent {
    fn description(&self) -> &str {
        match self {
            NotificationEvent::Subscribed { .. } => "Notification channel opened",
            NotificationEvent::Received { .. } => "Notification received",
            NotificationEvent::Unsubscribed => "Notification channel closed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to core events.
///
/// Cloning is cheap; all clones share the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// Subscribers falling behind by more than `capacity` events receive
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
