//! # In-Memory Audit Log
//!
//! Append-only store for handshake audit entries. Entries are never
//! modified or removed once written.

use crate::domain::entities::{AuditAction, AuditEntry};
use crate::domain::request::sanitize;
use crate::ports::outbound::AuditLog;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Default number of entries returned by [`InMemoryAuditLog::recent`].
pub const DEFAULT_RECENT_LIMIT: usize = 10;

#[derive(Default)]
pub struct InMemoryAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
    next_id: AtomicU64,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest entries first.
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        self.entries.read().iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for InMemoryAuditLog {
    fn append(&self, site_id: &str, action: AuditAction, actor_id: u64, note: Option<&str>) -> bool {
        if actor_id == 0 {
            warn!(action = action.as_str(), "audit entry without an actor refused");
            return false;
        }

        let entry = AuditEntry {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            site_id: sanitize(site_id),
            action,
            actor_user_id: actor_id,
            timestamp: Utc::now(),
            note: note.map(sanitize).filter(|n| !n.is_empty()),
        };
        debug!(id = entry.id, site_id = %entry.site_id, action = entry.action.as_str(), "audit");
        self.entries.write().push(entry);
        true
    }
}

impl<T: AuditLog + ?Sized> AuditLog for std::sync::Arc<T> {
    fn append(&self, site_id: &str, action: AuditAction, actor_id: u64, note: Option<&str>) -> bool {
        (**self).append(site_id, action, actor_id, note)
    }
}
