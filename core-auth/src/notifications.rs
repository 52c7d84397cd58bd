//! Push notification subscription
//!
//! Tracks the single server push subscription tied to the logged-in
//! session and builds the handler that surfaces incoming notifications.

use crate::error::Result;
use crate::types::SessionId;
use bridge_traits::push::{Notification, NotificationHandler, NotificationPresenter, PushChannel};
use core_runtime::events::{CoreEvent, EventBus, NotificationEvent};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Owns the `PushChannel` bridge; at most one subscription is open.
///
/// Without a configured channel every call is a logged no-op.
pub struct NotificationSubscription {
    channel: Option<Arc<dyn PushChannel>>,
    open: Mutex<Option<SessionId>>,
}

impl NotificationSubscription {
    pub fn new(channel: Option<Arc<dyn PushChannel>>) -> Self {
        Self {
            channel,
            open: Mutex::new(None),
        }
    }

    /// Subscription that never connects.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.channel.is_some()
    }

    /// Session the open subscription belongs to, if any.
    pub async fn current(&self) -> Option<SessionId> {
        *self.open.lock().await
    }

    /// Open a subscription for `session_id`, closing any existing one first.
    ///
    /// Returns `Ok(false)` when no push channel is configured.
    pub async fn open(
        &self,
        token: &str,
        session_id: SessionId,
        handler: NotificationHandler,
    ) -> Result<bool> {
        let Some(channel) = self.channel.as_ref() else {
            debug!("No push channel configured; skipping subscription");
            return Ok(false);
        };

        let mut open = self.open.lock().await;

        if let Some(previous) = open.take() {
            debug!(session_id = %previous, "Closing previous push subscription");
            if let Err(e) = channel.disconnect().await {
                warn!(session_id = %previous, error = %e, "Failed to close previous push subscription");
            }
        }

        channel.connect(token, handler).await?;

        *open = Some(session_id);
        info!(session_id = %session_id, "Push subscription opened");
        Ok(true)
    }

    /// Close the open subscription.
    ///
    /// Returns whether one was open. The subscription is forgotten even if
    /// the channel reports an error.
    pub async fn close(&self) -> Result<bool> {
        let Some(channel) = self.channel.as_ref() else {
            return Ok(false);
        };

        let mut open = self.open.lock().await;
        let Some(session_id) = open.take() else {
            return Ok(false);
        };

        channel.disconnect().await?;

        info!(session_id = %session_id, "Push subscription closed");
        Ok(true)
    }
}

/// Handler that presents each notification and republishes it on the bus.
pub fn notification_handler(
    presenter: Option<Arc<dyn NotificationPresenter>>,
    event_bus: EventBus,
) -> NotificationHandler {
    Arc::new(move |notification: Notification| {
        debug!(
            notification_type = ?notification.notification_type,
            target_id = ?notification.target_id,
            "Notification received"
        );

        if let Some(presenter) = presenter.as_ref() {
            presenter.present(&notification);
        }

        let _ = event_bus.emit(CoreEvent::Notification(NotificationEvent::Received {
            title: notification.notification_title,
            content: notification.notification_content,
            notification_type: notification.notification_type,
        }));
    })
}
