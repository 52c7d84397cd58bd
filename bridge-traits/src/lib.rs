//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the session core and platform-specific
//! implementations. Each trait represents a capability that the core requires but
//! that must be implemented differently per platform (desktop, web, mobile).
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async request/response HTTP operations
//! - [`PushChannel`](push::PushChannel) - Long-lived server push subscription (SSE)
//!
//! ### Storage
//! - [`SecureStore`](storage::SecureStore) - Credential persistence (Keychain/localStorage)
//!
//! ### Presentation & Diagnostics
//! - [`NotificationPresenter`](push::NotificationPresenter) - Surface a notification to the user
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | Web      | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should convert platform-specific errors to `BridgeError`
//! and include actionable context (endpoint, key name) but never secret values.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so the core can share them across
//! async tasks behind `Arc<dyn Trait>`.
//!
//! ## Examples
//!
//! ### Implementing SecureStore
//!
//! ```ignore
//! use bridge_traits::storage::SecureStore;
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct LocalStorageStore;
//!
//! #[async_trait]
//! impl SecureStore for LocalStorageStore {
//!     async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> { todo!() }
//!     async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> { todo!() }
//!     async fn delete_secret(&self, key: &str) -> Result<()> { todo!() }
//! }
//! ```

pub mod error;
pub mod http;
pub mod log;
pub mod push;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use push::{Notification, NotificationHandler, NotificationPresenter, PushChannel};
pub use storage::SecureStore;
