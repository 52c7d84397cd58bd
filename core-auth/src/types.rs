use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Identifier of one adopted access token.
///
/// A new `SessionId` is generated every time a token is taken into memory,
/// by login or by restore. It is safe to log and carried in every session
/// event so observers can correlate them.
///
/// # Examples
///
/// ```
/// use core_auth::SessionId;
///
/// let a = SessionId::new();
/// let b = SessionId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a session ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Profile record returned by the identity endpoint.
///
/// The record is passed through uninterpreted; accessors are read-only
/// conveniences for hosts.
///
/// ```
/// use core_auth::UserProfile;
/// use serde_json::json;
///
/// let profile = UserProfile::new(json!({ "userNo": 7, "userNickname": "coco" }));
/// assert_eq!(profile.get("userNickname").and_then(|v| v.as_str()), Some("coco"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(Value);

impl UserProfile {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Top-level field lookup; `None` when absent or the profile is not an object.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Derived view of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthState {
    /// No access token.
    LoggedOut,
    /// Access token held, profile not fetched yet.
    PendingProfile,
    /// Access token and profile held.
    LoggedIn,
}

impl AuthState {
    pub fn from_parts(has_token: bool, has_user: bool) -> Self {
        match (has_token, has_user) {
            (false, _) => AuthState::LoggedOut,
            (true, false) => AuthState::PendingProfile,
            (true, true) => AuthState::LoggedIn,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, AuthState::LoggedIn)
    }

    pub fn has_token(&self) -> bool {
        !matches!(self, AuthState::LoggedOut)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthState::LoggedOut => "LoggedOut",
            AuthState::PendingProfile => "PendingProfile",
            AuthState::LoggedIn => "LoggedIn",
        };
        f.write_str(name)
    }
}

/// Read-only copy of the session handed to readers.
#[derive(Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: Option<SessionId>,
    pub user: Option<UserProfile>,
    pub access_token: Option<String>,
    pub state: AuthState,
}

impl SessionSnapshot {
    pub fn logged_out() -> Self {
        Self {
            session_id: None,
            user: None,
            access_token: None,
            state: AuthState::LoggedOut,
        }
    }
}

impl fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("session_id", &self.session_id)
            .field("has_user", &self.user.is_some())
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("state", &self.state)
            .finish()
    }
}

/// Login credentials. Never validated locally.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of the login request.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub user_email: &'a str,
    pub user_password: &'a str,
}

impl<'a> From<&'a Credentials> for LoginRequest<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            user_email: credentials.email(),
            user_password: credentials.password(),
        }
    }
}

/// Body of a successful login response. Other fields are ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}
