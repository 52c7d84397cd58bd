//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` with retry and backoff
//! - `SecureStore` using the `keyring` crate
//! - `PushChannel` streaming Server-Sent Events over `reqwest`
//! - `NotificationPresenter` printing to stdout
//!
//! ## Feature Flags
//!
//! - `secure-store`: Enable OS keychain integration (default)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SsePushChannel};
//! use url::Url;
//!
//! let http_client = ReqwestHttpClient::new()?;
//! let push = SsePushChannel::new(Url::parse("https://api.pettact.com/v1/notification/subscribe")?)?;
//! ```

mod http;
mod presenter;
mod sse;

#[cfg(feature = "secure-store")]
mod secure_store;

pub use http::ReqwestHttpClient;
pub use presenter::ConsoleNotificationPresenter;
pub use sse::{SseFrame, SseParser, SsePushChannel};

#[cfg(feature = "secure-store")]
pub use secure_store::{KeyringSecureStore, DEFAULT_SERVICE_NAME};
