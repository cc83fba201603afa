//! Per-connection cancellation flags

use super::ConnectionId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Registry of cancellation flags keyed by connection
///
/// Cheap to clone; all clones share one map behind one lock. The lock is
/// only held for a single map operation, never across an await.
#[derive(Debug, Clone, Default)]
pub struct CancellationRegistry {
    flags: Arc<Mutex<HashMap<ConnectionId, bool>>>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cancelled(&self, conn_id: ConnectionId, cancelled: bool) {
        self.lock().insert(conn_id, cancelled);
    }

    /// A connection with no entry is not cancelled
    pub fn is_cancelled(&self, conn_id: ConnectionId) -> bool {
        self.lock().get(&conn_id).copied().unwrap_or(false)
    }

    pub fn remove(&self, conn_id: ConnectionId) {
        self.lock().remove(&conn_id);
    }

    #[cfg(test)]
    pub fn contains(&self, conn_id: ConnectionId) -> bool {
        self.lock().contains_key(&conn_id)
    }

    #[cfg(test)]
    pub fn flag_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, bool>> {
        // Entries are plain booleans; a panic elsewhere cannot leave one
        // half-written
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
