//! Connection registry: tracks all live push connections.
//!
//! Connections are filed under exactly one group: the admin broadcast group,
//! or the per-subject group for one user id. Guests are never retained.
//! Dispatch works on point-in-time snapshots so iteration never observes a
//! concurrent insert/remove; the admin group has its own lock and each
//! subject group is locked independently through the DashMap entry.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::push::identity::{Identity, Role};
use crate::push::EventSender;

struct RegisteredConnection {
    id: u64,
    sender: EventSender,
}

/// Where a connection was filed at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Admin,
    Subject(String),
    /// Guest connections get the handshake event only and are never retained.
    Unregistered,
}

/// Returned by register(); consumed by unregister(). Identifies one
/// connection within one group.
#[derive(Debug)]
pub struct RegistrationHandle {
    slot: Slot,
    conn_id: u64,
}

impl RegistrationHandle {
    /// Whether the connection was actually filed in a group.
    pub fn is_registered(&self) -> bool {
        self.slot != Slot::Unregistered
    }
}

/// Registry of live push connections, shared across all handler tasks.
/// Constructed once at server start, dropped at shutdown.
#[derive(Default)]
pub struct ConnectionRegistry {
    admins: Mutex<Vec<RegisteredConnection>>,
    subjects: DashMap<String, Vec<RegisteredConnection>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a connection under the group its identity selects:
    /// admins go to the broadcast group, anyone with a subject id goes to
    /// that subject's group, everyone else is discarded unregistered.
    pub fn register(&self, identity: &Identity, sender: EventSender) -> RegistrationHandle {
        let conn_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = RegisteredConnection {
            id: conn_id,
            sender,
        };

        let slot = if identity.role == Role::Admin {
            self.admins
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(entry);
            Slot::Admin
        } else if let Some(subject_id) = &identity.subject_id {
            self.subjects
                .entry(subject_id.clone())
                .or_default()
                .push(entry);
            Slot::Subject(subject_id.clone())
        } else {
            Slot::Unregistered
        };

        RegistrationHandle { slot, conn_id }
    }

    /// Remove a connection from whichever group it was filed under.
    /// Benign no-op when the connection is already gone; removing the last
    /// connection for a subject drops that subject's group entry entirely.
    pub fn unregister(&self, handle: RegistrationHandle) {
        match handle.slot {
            Slot::Admin => {
                self.admins
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .retain(|c| c.id != handle.conn_id);
            }
            Slot::Subject(subject_id) => {
                let mut drop_entry = false;
                if let Some(mut connections) = self.subjects.get_mut(&subject_id) {
                    connections.retain(|c| c.id != handle.conn_id);
                    drop_entry = connections.is_empty();
                }
                if drop_entry {
                    // Re-check emptiness under the entry lock: a concurrent
                    // register may have refiled the subject in between.
                    self.subjects
                        .remove_if(&subject_id, |_, connections| connections.is_empty());
                }
            }
            Slot::Unregistered => {}
        }
    }

    /// Point-in-time copy of the admin group's members.
    pub fn snapshot_admins(&self) -> Vec<EventSender> {
        self.admins
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .map(|c| c.sender.clone())
            .collect()
    }

    /// Point-in-time copy of one subject's connections.
    /// Empty when the subject has no live connections.
    pub fn snapshot_subject(&self, subject_id: &str) -> Vec<EventSender> {
        self.subjects
            .get(subject_id)
            .map(|connections| connections.iter().map(|c| c.sender.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of distinct subjects with at least one live connection.
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }
}
