pub mod dispatch;
pub mod identity;
pub mod registry;
pub mod stream;

use tokio::sync::mpsc;

/// Sender half of a push connection's channel.
/// Other parts of the system clone this to deliver events to one client;
/// send() is non-blocking and fails once the receiving stream is gone.
pub type EventSender = mpsc::UnboundedSender<NotificationEvent>;

/// A named event plus its JSON payload. Constructed, dispatched, discarded —
/// never persisted, never queued for offline subjects.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub name: String,
    pub payload: serde_json::Value,
}

impl NotificationEvent {
    pub fn new(name: &str, payload: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            payload,
        }
    }

    /// Render as an SSE frame (`event: name` + single-line JSON data).
    pub fn into_sse(self) -> axum::response::sse::Event {
        axum::response::sse::Event::default()
            .event(self.name)
            .data(self.payload.to_string())
    }
}
