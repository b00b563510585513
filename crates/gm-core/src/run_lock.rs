//! Per-user run mutual exclusion.
//!
//! Two concurrent reconciliation runs for the same user could both observe
//! the same deficit and jointly overshoot the daily minimum. The registry
//! guarantees at-most-one in-flight run per user within this process:
//! `try_begin` has exactly one winner, the loser backs off and retries on
//! the next sweep.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

/// Tracks which users currently have a reconciliation run in flight.
#[derive(Debug, Clone, Default)]
pub struct RunRegistry {
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the run slot for `user_id`.
    ///
    /// Returns `None` when a run is already in flight for that user. The
    /// returned guard releases the slot on drop, including on panic.
    pub fn try_begin(&self, user_id: Uuid) -> Option<RunGuard> {
        let mut set = self.in_flight.lock().expect("run registry poisoned");
        if set.insert(user_id) {
            Some(RunGuard {
                registry: Arc::clone(&self.in_flight),
                user_id,
            })
        } else {
            None
        }
    }

    /// Number of runs currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().expect("run registry poisoned").len()
    }
}

/// RAII claim on a user's run slot.
#[derive(Debug)]
pub struct RunGuard {
    registry: Arc<Mutex<HashSet<Uuid>>>,
    user_id: Uuid,
}

impl RunGuard {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if let Ok(mut set) = self.registry.lock() {
            set.remove(&self.user_id);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
