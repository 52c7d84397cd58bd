use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("Request rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// A 2xx response whose body could not be used.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Secure storage unavailable: {0}")]
    SecureStorageUnavailable(String),

    #[error("Push channel error: {0}")]
    PushChannel(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    /// HTTP status of a rejected request, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<core_runtime::Error> for AuthError {
    fn from(e: core_runtime::Error) -> Self {
        AuthError::Configuration(e.to_string())
    }
}

/// Bridge failures that reach this crate unmapped come from the push channel
/// or the transport underneath it.
impl From<BridgeError> for AuthError {
    fn from(e: BridgeError) -> Self {
        match e {
            BridgeError::PushChannel(msg) => AuthError::PushChannel(msg),
            other => AuthError::Network(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_errors_map_by_kind() {
        assert!(matches!(
            AuthError::from(BridgeError::PushChannel("HTTP 401".to_string())),
            AuthError::PushChannel(msg) if msg == "HTTP 401"
        ));
        assert!(matches!(
            AuthError::from(BridgeError::OperationFailed("reset".to_string())),
            AuthError::Network(_)
        ));
    }

    #[test]
    fn test_status_only_for_rejections() {
        let rejected = AuthError::Rejected {
            status: 401,
            body: String::new(),
        };
        assert_eq!(rejected.status(), Some(401));
        assert_eq!(AuthError::Network("down".to_string()).status(), None);
    }
}
