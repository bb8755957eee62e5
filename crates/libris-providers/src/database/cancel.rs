//! Server-side cancellation for blocking queries
//!
//! A [`CancelOnDrop`] guard lives in the async caller. The blocking worker
//! publishes its connection's cancel token into the shared [`CancelSlot`]
//! while a statement runs. If the guard is dropped before being disarmed,
//! a cancel request is sent over a fresh connection.

use r2d2_postgres::postgres::{CancelToken, NoTls};
use std::sync::{Arc, Mutex};

/// Shared slot holding the cancel token of the running statement
#[derive(Clone, Default)]
pub struct CancelSlot {
    token: Arc<Mutex<Option<CancelToken>>>,
}

impl CancelSlot {
    /// Publish the token of the connection about to run a statement
    pub fn arm(&self, token: CancelToken) {
        if let Ok(mut slot) = self.token.lock() {
            *slot = Some(token);
        }
    }

    /// The statement finished; nothing to cancel anymore
    pub fn clear(&self) {
        if let Ok(mut slot) = self.token.lock() {
            *slot = None;
        }
    }

    fn take(&self) -> Option<CancelToken> {
        self.token.lock().ok().and_then(|mut slot| slot.take())
    }
}

/// Sends a query cancel unless disarmed before drop
pub struct CancelOnDrop {
    slot: CancelSlot,
    armed: bool,
}

impl CancelOnDrop {
    /// Create an armed guard with an empty slot
    pub fn new() -> Self {
        Self {
            slot: CancelSlot::default(),
            armed: true,
        }
    }

    /// Slot to hand to the blocking worker
    pub fn slot(&self) -> CancelSlot {
        self.slot.clone()
    }

    /// The caller observed completion; dropping is now a no-op
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Default for CancelOnDrop {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Some(token) = self.slot.take() else {
            return;
        };
        // cancel_query opens its own connection; keep it off the async runtime
        std::thread::spawn(move || {
            if let Err(e) = token.cancel_query(NoTls) {
                tracing::warn!(error = %e, "Failed to cancel abandoned query");
            } else {
                tracing::debug!("Cancelled abandoned query");
            }
        });
    }
}
