//! Server-Sent Events push channel
//!
//! Opens a streaming `GET` against the notification endpoint and decodes each
//! SSE frame's `data` as a [`Notification`]. The stream is read by a tokio
//! task which `disconnect` cancels through a [`CancellationToken`].

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    push::{Notification, NotificationHandler, PushChannel},
};
use futures_util::StreamExt;
use reqwest::Client;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::http::USER_AGENT;

/// One dispatched SSE event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, if the server named the event
    pub event: Option<String>,
    /// `data:` lines joined with `\n`
    pub data: String,
    /// Last event ID seen on the stream when this frame was dispatched
    pub id: Option<String>,
}

/// Incremental parser for the `text/event-stream` format.
///
/// Accepts arbitrary byte chunks; frames and multi-byte characters may be
/// split anywhere across chunk boundaries. Lines end in LF, CRLF or CR.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    last_event_id: Option<String>,
    seen_first_line: bool,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every frame completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();

        while let Some(pos) = self
            .buffer
            .iter()
            .position(|b| *b == b'\n' || *b == b'\r')
        {
            let terminator_len = if self.buffer[pos] == b'\r' {
                match self.buffer.get(pos + 1) {
                    Some(b'\n') => 2,
                    Some(_) => 1,
                    // A trailing CR may be the first half of CRLF
                    None => break,
                }
            } else {
                1
            };

            let raw: Vec<u8> = self.buffer.drain(..pos + terminator_len).collect();
            let line = String::from_utf8_lossy(&raw[..pos]).into_owned();

            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }

        frames
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        let line = if self.seen_first_line {
            line
        } else {
            self.seen_first_line = true;
            line.strip_prefix('\u{feff}').unwrap_or(line)
        };

        if line.is_empty() {
            return self.dispatch();
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" if !value.contains('\0') => self.last_event_id = Some(value.to_string()),
            _ => {}
        }

        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        let data = std::mem::take(&mut self.data).join("\n");
        if data.is_empty() {
            return None;
        }

        Some(SseFrame {
            event,
            data,
            id: self.last_event_id.clone(),
        })
    }
}

/// Hands a frame to the handler if its data is a notification payload.
///
/// Returns whether the handler was invoked.
fn dispatch_frame(frame: &SseFrame, handler: &NotificationHandler) -> bool {
    match serde_json::from_str::<Notification>(&frame.data) {
        Ok(notification) => {
            debug!(event = ?frame.event, "Received notification frame");
            handler(notification);
            true
        }
        Err(e) => {
            debug!(event = ?frame.event, error = %e, "Skipping non-notification frame");
            false
        }
    }
}

struct ActiveStream {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// `PushChannel` over Server-Sent Events.
///
/// The stream is not reconnected when the server closes it; the session
/// core opens a new subscription on the next login.
pub struct SsePushChannel {
    client: Client,
    endpoint: Url,
    active: Mutex<Option<ActiveStream>>,
}

impl SsePushChannel {
    /// Create a channel subscribing to `endpoint`.
    pub fn new(endpoint: Url) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BridgeError::NotAvailable(format!("Failed to build SSE client: {}", e)))?;

        Ok(Self::with_client(client, endpoint))
    }

    /// Use a preconfigured reqwest client. It should not set an overall
    /// request timeout, since the stream is long-lived.
    pub fn with_client(client: Client, endpoint: Url) -> Self {
        Self {
            client,
            endpoint,
            active: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn active(&self) -> MutexGuard<'_, Option<ActiveStream>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn stop_active(&self) -> bool {
        match self.active().take() {
            Some(stream) => {
                stream.cancel.cancel();
                true
            }
            None => false,
        }
    }
}

async fn read_stream(
    response: reqwest::Response,
    handler: NotificationHandler,
    cancel: CancellationToken,
) {
    let mut stream = response.bytes_stream();
    let mut parser = SseParser::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("SSE stream cancelled");
                break;
            }
            chunk = stream.next() => match chunk {
                Some(Ok(bytes)) => {
                    for frame in parser.push(&bytes) {
                        dispatch_frame(&frame, &handler);
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "SSE stream failed");
                    break;
                }
                None => {
                    info!("SSE stream closed by server");
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl PushChannel for SsePushChannel {
    #[instrument(skip(self, token, on_message), fields(endpoint = %self.endpoint))]
    async fn connect(&self, token: &str, on_message: NotificationHandler) -> Result<()> {
        if self.stop_active() {
            debug!("Replacing open SSE subscription");
        }

        let response = self
            .client
            .get(self.endpoint.clone())
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| BridgeError::PushChannel(format!("Failed to open SSE stream: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::PushChannel(format!(
                "SSE subscription rejected with HTTP {}",
                status.as_u16()
            )));
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(read_stream(response, on_message, cancel.clone()));

        // A concurrent connect may have won the race; keep only the newest.
        if let Some(previous) = self.active().replace(ActiveStream { cancel, task }) {
            previous.cancel.cancel();
        }

        info!("SSE subscription opened");
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        if self.stop_active() {
            info!(endpoint = %self.endpoint, "SSE subscription closed");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.active()
            .as_ref()
            .map_or(false, |stream| !stream.task.is_finished())
    }
}

impl Drop for SsePushChannel {
    fn drop(&mut self) {
        self.stop_active();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_single_frame() {
        let mut parser = SseParser::new();
        let frames = parser.push(b"event: notification\ndata: {\"notificationTitle\":\"hi\"}\n\n");

        assert_eq!(
            frames,
            vec![SseFrame {
                event: Some("notification".to_string()),
                data: r#"{"notificationTitle":"hi"}"#.to_string(),
                id: None,
            }]
        );
    }

    #[test]
    fn test_multi_line_data() {
        let mut parser = SseParser::new();
        let frames = parser.push(b"data: {\ndata: \"notificationTitle\": \"x\"\ndata: }\n\n");

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\n\"notificationTitle\": \"x\"\n}");
        let notification: Notification = serde_json::from_str(&frames[0].data).unwrap();
        assert_eq!(notification.title(), "x");
    }

    #[test]
    fn test_comments_are_ignored() {
        let mut parser = SseParser::new();
        let frames = parser.push(b": keep-alive\n\n:another\ndata: a\n\n");

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "a");
    }

    #[test]
    fn test_crlf_and_cr_line_endings() {
        let mut parser = SseParser::new();
        let frames = parser.push(b"data: one\r\n\r\ndata: two\r\rdata: three\n\n");

        let data: Vec<_> = frames.iter().map(|f| f.data.as_str()).collect();
        assert_eq!(data, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.push(b"event: noti").is_empty());
        assert!(parser.push(b"fication\ndata: {\"notificationTi").is_empty());
        assert!(parser.push(b"tle\":\"split\"}\r").is_empty());
        let frames = parser.push(b"\n\r\n");

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("notification"));
        assert_eq!(frames[0].data, r#"{"notificationTitle":"split"}"#);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let payload = "data: 새 댓글\n\n".as_bytes();
        let (first, second) = payload.split_at(8);

        let mut parser = SseParser::new();
        assert!(parser.push(first).is_empty());
        let frames = parser.push(second);
        assert_eq!(frames[0].data, "새 댓글");
    }

    #[test]
    fn test_event_without_data_is_not_dispatched() {
        let mut parser = SseParser::new();
        assert!(parser.push(b"event: ping\n\n").is_empty());

        let frames = parser.push(b"data: x\n\n");
        assert_eq!(frames[0].event, None);
    }

    #[test]
    fn test_id_persists_across_frames() {
        let mut parser = SseParser::new();
        let frames = parser.push(b"id: 7\ndata: a\n\ndata: b\n\n");

        assert_eq!(frames[0].id.as_deref(), Some("7"));
        assert_eq!(frames[1].id.as_deref(), Some("7"));
    }

    #[test]
    fn test_field_without_colon_and_leading_bom() {
        let mut parser = SseParser::new();
        let frames = parser.push("\u{feff}data\n\ndata:no-space\n\n".as_bytes());

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "no-space");
    }

    #[test]
    fn test_dispatch_frame_skips_non_json() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let handler: NotificationHandler = Arc::new(move |n: Notification| {
            sink.lock().unwrap().push(n.notification_title);
        });

        let connect_message = SseFrame {
            event: Some("connect".to_string()),
            data: "EventStream Created. [userNo=1]".to_string(),
            id: None,
        };
        assert!(!dispatch_frame(&connect_message, &handler));

        let notification = SseFrame {
            event: Some("notification".to_string()),
            data: r#"{"notificationTitle":"새 댓글이 달렸습니다.","targetId":3}"#.to_string(),
            id: None,
        };
        assert!(dispatch_frame(&notification, &handler));

        assert_eq!(*calls.lock().unwrap(), vec!["새 댓글이 달렸습니다.".to_string()]);
    }

    #[tokio::test]
    async fn test_disconnect_without_subscription() {
        let channel =
            SsePushChannel::new(Url::parse("http://127.0.0.1:9/v1/notification/subscribe").unwrap())
                .unwrap();

        assert!(!channel.is_connected());
        channel.disconnect().await.unwrap();
        assert!(!channel.is_connected());
    }

    #[tokio::test]
    async fn test_connect_failure_is_push_channel_error() {
        let channel =
            SsePushChannel::new(Url::parse("http://127.0.0.1:9/v1/notification/subscribe").unwrap())
                .unwrap();
        let handler: NotificationHandler = Arc::new(|_| {});

        let result = channel.connect("token", handler).await;
        assert!(matches!(result, Err(BridgeError::PushChannel(_))));
        assert!(!channel.is_connected());
    }
}
