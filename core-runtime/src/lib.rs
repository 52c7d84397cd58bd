//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the session core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on.
//! It establishes the logging conventions, the validated configuration that
//! carries every injected bridge, and the event broadcasting mechanism used
//! to publish session changes to host UIs.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
