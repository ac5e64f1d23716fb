//! Single-slot command mailbox.
//!
//! A bounded channel of capacity exactly one, used for one-shot command
//! delivery between a producer task and a consumer task.  Delivery is
//! best-effort by design: a timed send that finds the slot still occupied
//! hands the value back instead of overwriting or blocking forever, and
//! callers treat that as an expected outcome — control decisions are
//! re-derived from persistent state on the next cycle, so a dropped
//! command self-heals.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Returned by [`Mailbox::send_timeout`] when the slot stayed occupied for
/// the whole timeout.  Carries the undelivered value back to the caller.
#[derive(Debug, PartialEq, Eq)]
pub struct SendTimeout<T>(pub T);

impl<T> core::fmt::Display for SendTimeout<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "mailbox full, command not delivered")
    }
}

/// Capacity-one mailbox with timed, non-overwriting enqueue.
pub struct Mailbox<T> {
    slot: Mutex<Option<T>>,
    slot_freed: Condvar,
    slot_filled: Condvar,
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            slot_freed: Condvar::new(),
            slot_filled: Condvar::new(),
        }
    }

    /// Enqueue `value`, waiting up to `timeout` for the slot to free if a
    /// previous command is still pending.  Never overwrites: on timeout the
    /// value is returned inside [`SendTimeout`].
    pub fn send_timeout(&self, value: T, timeout: Duration) -> Result<(), SendTimeout<T>> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        while slot.is_some() {
            let now = Instant::now();
            if now >= deadline {
                return Err(SendTimeout(value));
            }
            let (guard, _) = self
                .slot_freed
                .wait_timeout(slot, deadline - now)
                .unwrap_or_else(|e| e.into_inner());
            slot = guard;
        }
        *slot = Some(value);
        self.slot_filled.notify_one();
        Ok(())
    }

    /// Dequeue the pending command, waiting up to `timeout` for one to
    /// arrive.  `None` on timeout — the normal idle path for consumer
    /// tasks, not an error.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if let Some(value) = slot.take() {
                self.slot_freed.notify_one();
                return Some(value);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _) = self
                .slot_filled
                .wait_timeout(slot, deadline - now)
                .unwrap_or_else(|e| e.into_inner());
            slot = guard;
        }
    }

    /// Dequeue without waiting.
    pub fn try_recv(&self) -> Option<T> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        let value = slot.take();
        if value.is_some() {
            self.slot_freed.notify_one();
        }
        value
    }

    /// Whether a command is currently pending.
    pub fn is_pending(&self) -> bool {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }
}
