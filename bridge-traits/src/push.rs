//! Server Push Abstractions
//!
//! Provides the long-lived notification subscription used while a user is
//! logged in, plus the presenter that surfaces each notification to the user.
//!
//! The desktop implementation streams Server-Sent Events; a web host would
//! wrap the browser `EventSource`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;

/// A notification delivered over the push channel.
///
/// Only `notification_title` is required; every other field is passed
/// through when the server sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub notification_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_content: Option<String>,
    /// Server-side category, e.g. `COMMENT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<i64>,
    /// Kind of entity `target_id` refers to, e.g. `BOARD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_no: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_no: Option<i64>,
}

impl Notification {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            notification_title: title.into(),
            notification_content: None,
            notification_type: None,
            target_id: None,
            target_type: None,
            sender_no: None,
            receiver_no: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.notification_content = Some(content.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.notification_title
    }
}

/// Callback invoked for every notification received on an open channel.
pub type NotificationHandler = Arc<dyn Fn(Notification) + Send + Sync>;

/// Server push subscription trait
///
/// A channel carries at most one live subscription. Implementations must:
/// - Treat `connect` on an already-connected channel as a replacement
///   (the old stream is closed first)
/// - Make `disconnect` idempotent
/// - Invoke the handler from their own task, never while holding locks the
///   handler might need
///
/// # Example
///
/// ```ignore
/// use bridge_traits::push::{PushChannel, NotificationHandler};
/// use std::sync::Arc;
///
/// async fn subscribe(channel: &dyn PushChannel, token: &str) -> Result<()> {
///     let handler: NotificationHandler = Arc::new(|n| println!("{}", n.title()));
///     channel.connect(token, handler).await
/// }
/// ```
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Open the subscription authorized by `token`.
    async fn connect(&self, token: &str, on_message: NotificationHandler) -> Result<()>;

    /// Close the subscription, if any.
    async fn disconnect(&self) -> Result<()>;

    /// Whether a subscription is currently open.
    fn is_connected(&self) -> bool;
}

/// Surfaces a notification to the user (an alert, toast, or system
/// notification). Called synchronously from the push handler, so
/// implementations should not block for long.
pub trait NotificationPresenter: Send + Sync {
    fn present(&self, notification: &Notification);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_deserialization_full() {
        let json = r#"{
            "notificationTitle": "새 댓글이 달렸습니다.",
            "notificationContent": "someone left a comment",
            "notificationType": "COMMENT",
            "targetId": 42,
            "targetType": "BOARD",
            "senderNo": 7,
            "receiverNo": 9,
            "createdAt": "2024-05-01T10:00:00"
        }"#;

        let notification: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(notification.title(), "새 댓글이 달렸습니다.");
        assert_eq!(notification.notification_type.as_deref(), Some("COMMENT"));
        assert_eq!(notification.target_id, Some(42));
        assert_eq!(notification.target_type.as_deref(), Some("BOARD"));
        assert_eq!(notification.sender_no, Some(7));
        assert_eq!(notification.receiver_no, Some(9));
    }

    #[test]
    fn test_notification_deserialization_minimal() {
        let notification: Notification =
            serde_json::from_str(r#"{"notificationTitle":"hello"}"#).unwrap();
        assert_eq!(notification, Notification::new("hello"));
    }

    #[test]
    fn test_notification_requires_title() {
        let result = serde_json::from_str::<Notification>(r#"{"notificationContent":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_notification_serialization_skips_absent_fields() {
        let json = serde_json::to_string(&Notification::new("t").with_content("c")).unwrap();
        assert_eq!(json, r#"{"notificationTitle":"t","notificationContent":"c"}"#);
    }
}
