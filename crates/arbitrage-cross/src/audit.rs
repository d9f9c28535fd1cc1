//! Bounded, FIFO audit ring owned by the executor (§3, §9: "global mutable
//! state... specify them as owned by the ... executor objects respectively,
//! constructed once per process").

use crate::types::AuditEventType;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::VecDeque;

pub use crate::types::AuditEntry;

pub struct AuditRing {
    capacity: usize,
    entries: RwLock<VecDeque<AuditEntry>>,
}

impl AuditRing {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn push(&self, event_type: AuditEventType, market: &str, details: &str) {
        let entry = AuditEntry {
            event_type,
            market: market.to_string(),
            timestamp: Utc::now(),
            details: details.to_string(),
        };
        let mut guard = self.entries.write();
        if guard.len() >= self.capacity {
            guard.pop_front();
        }
        guard.push_back(entry);
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<AuditEntry> {
        self.entries.read().iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
