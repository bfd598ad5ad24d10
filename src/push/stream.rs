//! The long-lived push endpoint.
//!
//! Each connection gets an unbounded channel: the sender half is filed in the
//! ConnectionRegistry, the receiver half feeds the SSE response stream. When
//! the client goes away axum drops the stream, the Drop guard unregisters the
//! connection exactly once, and any sender still held by a dispatch snapshot
//! simply starts failing (which dispatch swallows).

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::Utc;
use futures_util::stream::Stream;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::push::registry::{ConnectionRegistry, RegistrationHandle};
use crate::push::{identity, EventSender, NotificationEvent};
use crate::state::AppState;

/// Query parameters for the push endpoint. All optional: a token-derived
/// identity wins, explicit parameters are the fallback, and nothing at all
/// yields a guest connection.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub token: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Unregisters the connection when the SSE stream is dropped.
/// Holding the handle in an Option makes the removal exactly-once even if
/// drop glue runs more than one path in the future.
struct StreamGuard {
    registry: Arc<ConnectionRegistry>,
    handle: Option<RegistrationHandle>,
    // Keeps the channel open for unretained (guest) connections: without a
    // live sender the receiver stream would end right after the handshake
    // and the server, not the client, would close the connection.
    _sender: EventSender,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.registry.unregister(handle);
            tracing::debug!("push connection closed and unregistered");
        }
    }
}

/// GET /events?token=&role=&userId=
/// Server-Sent Events endpoint for real-time notifications.
pub async fn events(
    State(state): State<AppState>,
    Query(params): Query<EventsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let identity = identity::resolve_identity(
        &state.jwt_secret,
        params.token.as_deref(),
        params.role.as_deref(),
        params.user_id.as_deref(),
    );

    let (tx, rx) = mpsc::unbounded_channel::<NotificationEvent>();

    // Initial handshake event — delivered to every connection, guests included
    let _ = tx.send(NotificationEvent::new(
        "connected",
        json!({
            "role": identity.role.as_str(),
            "timestamp": Utc::now().timestamp_millis(),
        }),
    ));

    let keepalive_sender = tx.clone();
    let handle = state.registry.register(&identity, tx);
    tracing::info!(
        role = identity.role.as_str(),
        subject_id = identity.subject_id.as_deref().unwrap_or("-"),
        registered = handle.is_registered(),
        "push connection opened"
    );

    let guard = StreamGuard {
        registry: state.registry.clone(),
        handle: Some(handle),
        _sender: keepalive_sender,
    };

    let stream = UnboundedReceiverStream::new(rx).map(move |event| {
        // The guard lives as long as the stream; dropping the stream
        // (client disconnect) unregisters the connection.
        let _guard = &guard;
        Ok(event.into_sse())
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
