//! Event delivery over the connection registry.
//!
//! Every delivery is best-effort and isolated per connection: a closed or
//! broken channel is logged and skipped, and never prevents delivery to the
//! remaining members of a broadcast. Dispatch always iterates a registry
//! snapshot, so concurrent connects/disconnects cannot tear a broadcast.

use crate::push::registry::ConnectionRegistry;
use crate::push::{EventSender, NotificationEvent};

/// Attempt one delivery. Returns false when the connection is gone;
/// the failure never propagates to the caller.
pub fn send_to(connection: &EventSender, event: &NotificationEvent) -> bool {
    connection.send(event.clone()).is_ok()
}

/// Deliver an event to every connected admin. Failed members are skipped.
pub fn broadcast_admins(registry: &ConnectionRegistry, event: &NotificationEvent) {
    let mut failed = 0usize;
    let members = registry.snapshot_admins();
    for connection in &members {
        if !send_to(connection, event) {
            failed += 1;
        }
    }
    if failed > 0 {
        tracing::debug!(
            event = %event.name,
            failed,
            total = members.len(),
            "dropped admin broadcast deliveries to closed connections"
        );
    }
}

/// Deliver an event to every live connection of one subject.
/// A subject with no live connections is a silent no-op — events are not
/// queued for later delivery.
pub fn notify_subject(registry: &ConnectionRegistry, subject_id: &str, event: &NotificationEvent) {
    for connection in registry.snapshot_subject(subject_id) {
        if !send_to(&connection, event) {
            tracing::debug!(
                event = %event.name,
                subject_id,
                "dropped delivery to closed subject connection"
            );
        }
    }
}
