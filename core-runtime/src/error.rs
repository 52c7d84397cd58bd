use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors raised while configuring the session core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// A platform default bridge could not be constructed.
    #[error("Bridge initialization failed: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Logging initialization failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
