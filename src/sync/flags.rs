//! Shared status-flag set.
//!
//! The cross-task signalling substrate: a small set of independently
//! settable boolean conditions that any task may poll or block-wait on.
//! Each flag has exactly one owning writer (the network manager owns the
//! two network flags, the motor task owns `MotorRunning`); readers are
//! unrestricted.
//!
//! Implemented as a bitmask under a `Mutex` with a `Condvar` for the
//! blocking waits — on ESP-IDF's std layer these map straight onto
//! FreeRTOS primitives, so a `wait_any` behaves like an event-group wait.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Individual status conditions.  Discriminants are the bit positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StatusFlag {
    /// WiFi station is associated and has an IP.
    NetworkConnected = 0b0000_0001,
    /// WiFi bring-up exhausted its retries.
    NetworkFailed = 0b0000_0010,
    /// The pump motor is energised, per the hardware sense input.
    MotorRunning = 0b0000_0100,
}

impl StatusFlag {
    /// Return the bitmask for this flag.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

/// Atomic set/clear/get flag set with bounded and unbounded waits.
pub struct StatusFlags {
    bits: Mutex<u8>,
    changed: Condvar,
}

impl StatusFlags {
    pub fn new() -> Self {
        Self {
            bits: Mutex::new(0),
            changed: Condvar::new(),
        }
    }

    /// Set a flag and wake every waiter.
    pub fn set(&self, flag: StatusFlag) {
        let mut bits = self.bits.lock().unwrap_or_else(|e| e.into_inner());
        *bits |= flag.mask();
        self.changed.notify_all();
    }

    /// Clear a flag and wake every waiter.
    pub fn clear(&self, flag: StatusFlag) {
        let mut bits = self.bits.lock().unwrap_or_else(|e| e.into_inner());
        *bits &= !flag.mask();
        self.changed.notify_all();
    }

    /// Snapshot of all flag bits.
    pub fn get(&self) -> u8 {
        *self.bits.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether a single flag is currently set.
    pub fn is_set(&self, flag: StatusFlag) -> bool {
        self.get() & flag.mask() != 0
    }

    /// Block until any bit in `mask` is set, or until `timeout` elapses
    /// (`None` = wait indefinitely).  Returns the snapshot of the flag
    /// bits restricted to `mask` — zero means the wait timed out with no
    /// requested flag set.
    pub fn wait_any(&self, mask: u8, timeout: Option<Duration>) -> u8 {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut bits = self.bits.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if *bits & mask != 0 {
                return *bits & mask;
            }
            match deadline {
                None => {
                    bits = self.changed.wait(bits).unwrap_or_else(|e| e.into_inner());
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return 0;
                    }
                    let (guard, _) = self
                        .changed
                        .wait_timeout(bits, deadline - now)
                        .unwrap_or_else(|e| e.into_inner());
                    bits = guard;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn set_clear_get() {
        let flags = StatusFlags::new();
        assert_eq!(flags.get(), 0);
        flags.set(StatusFlag::MotorRunning);
        assert!(flags.is_set(StatusFlag::MotorRunning));
        assert!(!flags.is_set(StatusFlag::NetworkConnected));
        flags.set(StatusFlag::NetworkConnected);
        assert_eq!(
            flags.get(),
            StatusFlag::MotorRunning.mask() | StatusFlag::NetworkConnected.mask()
        );
        flags.clear(StatusFlag::MotorRunning);
        assert!(!flags.is_set(StatusFlag::MotorRunning));
        assert!(flags.is_set(StatusFlag::NetworkConnected));
    }

    #[test]
    fn wait_any_returns_immediately_when_set() {
        let flags = StatusFlags::new();
        flags.set(StatusFlag::MotorRunning);
        let got = flags.wait_any(
            StatusFlag::MotorRunning.mask(),
            Some(Duration::from_millis(10)),
        );
        assert_eq!(got, StatusFlag::MotorRunning.mask());
    }

    #[test]
    fn wait_any_times_out_when_unset() {
        let flags = StatusFlags::new();
        let got = flags.wait_any(
            StatusFlag::MotorRunning.mask(),
            Some(Duration::from_millis(20)),
        );
        assert_eq!(got, 0);
    }

    #[test]
    fn wait_any_wakes_on_set_from_other_thread() {
        let flags = Arc::new(StatusFlags::new());
        let setter = Arc::clone(&flags);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            setter.set(StatusFlag::MotorRunning);
        });
        let got = flags.wait_any(StatusFlag::MotorRunning.mask(), Some(Duration::from_secs(5)));
        assert_eq!(got, StatusFlag::MotorRunning.mask());
        handle.join().unwrap();
    }

    #[test]
    fn wait_any_ignores_unrelated_flags() {
        let flags = StatusFlags::new();
        flags.set(StatusFlag::NetworkConnected);
        let got = flags.wait_any(
            StatusFlag::MotorRunning.mask(),
            Some(Duration::from_millis(20)),
        );
        assert_eq!(got, 0);
    }
}
