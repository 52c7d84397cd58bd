//! Console notification presenter

use bridge_traits::push::{Notification, NotificationPresenter};

/// Prints each notification title to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotificationPresenter;

impl ConsoleNotificationPresenter {
    fn render(notification: &Notification) -> String {
        match &notification.notification_content {
            Some(content) => format!("[notification] {}\n  {}", notification.title(), content),
            None => format!("[notification] {}", notification.title()),
        }
    }
}

impl NotificationPresenter for ConsoleNotificationPresenter {
    fn present(&self, notification: &Notification) {
        println!("{}", Self::render(notification));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_title_only() {
        let rendered = ConsoleNotificationPresenter::render(&Notification::new("새 댓글"));
        assert_eq!(rendered, "[notification] 새 댓글");
    }

    #[test]
    fn test_render_with_content() {
        let notification = Notification::new("title").with_content("body");
        assert_eq!(
            ConsoleNotificationPresenter::render(&notification),
            "[notification] title\n  body"
        );
        ConsoleNotificationPresenter.present(&notification);
    }
}
