//! # Authentication Module
//!
//! Client-side session store for the Pettact API.
//!
//! ## Overview
//!
//! This crate holds the current user and access token, exchanges
//! credentials at the identity endpoint, persists the token through the
//! platform `SecureStore`, and keeps the server push subscription tied to
//! the logged-in session.
//!
//! ## Features
//!
//! - Email/password login with durable token persistence
//! - Session restore at startup from the persisted token
//! - Fail-closed profile loading: any profile error logs the session out
//! - Push notification subscription opened after login, closed on logout
//! - Session and notification events on the core event bus

pub mod api;
pub mod error;
pub mod notifications;
pub mod session;
pub mod token_store;
pub mod types;

pub use api::IdentityApi;
pub use error::{AuthError, Result};
pub use notifications::{notification_handler, NotificationSubscription};
pub use session::{SessionReader, SessionStore};
pub use token_store::TokenStore;
pub use types::{AuthState, Credentials, SessionId, SessionSnapshot, UserProfile};
