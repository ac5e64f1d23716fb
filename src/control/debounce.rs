//! Majority-vote debounce window for the tank level switch.
//!
//! A float switch bobbing at the full mark produces a noisy bit stream;
//! a single sample is worthless.  The window keeps the last *K* raw
//! samples in a circular buffer together with a running count of "full"
//! readings, so each insert is O(1) and the verdict is a simple count
//! comparison.  Sample order within the window is irrelevant — only the
//! count matters.

/// Upper bound on the configurable window size (fixed backing storage,
/// no allocation).
pub const MAX_WINDOW: usize = 32;

/// Sliding window of raw level samples with an O(1) full-count.
#[derive(Debug)]
pub struct DebounceWindow {
    samples: [bool; MAX_WINDOW],
    size: usize,
    next: usize,
    full_count: u32,
}

impl DebounceWindow {
    /// `size` is clamped to `1..=MAX_WINDOW` (config validation rejects
    /// out-of-range values before this is ever hit).
    pub fn new(size: usize) -> Self {
        Self {
            samples: [false; MAX_WINDOW],
            size: size.clamp(1, MAX_WINDOW),
            next: 0,
            full_count: 0,
        }
    }

    /// Insert one raw sample, evicting the oldest, and return the updated
    /// full-count.
    ///
    /// The buffer starts zeroed, so for the first `size - 1` inserts the
    /// evicted slots are implicit "not full" samples — early verdicts are
    /// biased toward "not full" until the window is populated, which is
    /// the accepted startup behavior.
    pub fn push(&mut self, sample: bool) -> u32 {
        let evicted = self.samples[self.next];
        if evicted {
            self.full_count -= 1;
        }
        self.samples[self.next] = sample;
        if sample {
            self.full_count += 1;
        }
        self.next = (self.next + 1) % self.size;
        self.full_count
    }

    /// Number of "full" samples currently in the window.
    pub fn full_count(&self) -> u32 {
        self.full_count
    }

    /// Majority verdict: at least `threshold` of the last `size` samples
    /// read full.
    pub fn is_full(&self, threshold: u32) -> bool {
        self.full_count >= threshold
    }

    /// Zero the window (used when the motor starts and stale history must
    /// not influence the fresh fill cycle).
    pub fn clear(&mut self) {
        self.samples = [false; MAX_WINDOW];
        self.next = 0;
        self.full_count = 0;
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_tracks_true_entries() {
        let mut w = DebounceWindow::new(4);
        assert_eq!(w.push(true), 1);
        assert_eq!(w.push(false), 1);
        assert_eq!(w.push(true), 2);
        assert_eq!(w.push(true), 3);
        // Window is now [T,F,T,T]; next insert evicts the first T.
        assert_eq!(w.push(false), 2);
    }

    #[test]
    fn verdict_is_majority_over_window() {
        let mut w = DebounceWindow::new(10);
        // Noisy fill: [T,T,T,F,T,...] — the 4th T enters on cycle 4
        // (0-based), and the verdict holds from there on.
        let samples = [true, true, true, false, true, true, true, true, true, true];
        let mut first_full = None;
        for (i, &s) in samples.iter().enumerate() {
            w.push(s);
            if w.is_full(4) && first_full.is_none() {
                first_full = Some(i);
            }
        }
        assert_eq!(first_full, Some(4));
        assert!(w.is_full(4));
    }

    #[test]
    fn startup_biases_toward_not_full() {
        let mut w = DebounceWindow::new(10);
        for _ in 0..3 {
            w.push(true);
        }
        // Only 3 of 10 slots populated — below a threshold of 4.
        assert!(!w.is_full(4));
    }

    #[test]
    fn clear_resets_history() {
        let mut w = DebounceWindow::new(5);
        for _ in 0..5 {
            w.push(true);
        }
        assert_eq!(w.full_count(), 5);
        w.clear();
        assert_eq!(w.full_count(), 0);
        assert!(!w.is_full(1));
    }

    #[test]
    fn eviction_wraps_at_window_size_not_capacity() {
        let mut w = DebounceWindow::new(3);
        w.push(true);
        w.push(true);
        w.push(true);
        // Fourth sample must evict the first, not land in slot 3.
        assert_eq!(w.push(false), 2);
        assert_eq!(w.push(false), 1);
        assert_eq!(w.push(false), 0);
    }
}
