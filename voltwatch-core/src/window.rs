//! Fixed-Capacity Reading Window
//!
//! ## Overview
//!
//! The stability test looks at the last `K` readings of a cycle. This module
//! holds them in a ring buffer whose size is a compile-time constant, so the
//! sampling path never allocates.
//!
//! ## Design Rationale
//!
//! ### Why a ring buffer?
//!
//! A cycle may take more reads than the window holds (`m >= k`). Pushing
//! every read into a ring of size `k` leaves exactly the last `k` in place
//! when the cycle ends, with no index arithmetic in the scheduler:
//!
//! ```text
//! m = 7, k = 5
//! reads:   r0 r1 r2 r3 r4 r5 r6
//! window:        [r2 r3 r4 r5 r6]   <- evaluated once, after r6
//! ```
//!
//! ### Why not `heapless::Deque`?
//!
//! A deque rejects pushes when full; the window must overwrite. Readings are
//! `Copy`, so the storage is a plain array with no `Option` slots.
//!
//! ### Full-only evaluation
//!
//! A partially filled window is never evaluated. [`ReadingWindow::snapshot`]
//! returns `None` until `K` readings have been pushed since the last clear,
//! and the scheduler clears at the start of every cycle.
//!
//! ## Usage Example
//!
//! ```rust
//! use voltwatch_core::window::ReadingWindow;
//! use voltwatch_core::traits::Reading;
//!
//! let mut window: ReadingWindow<3> = ReadingWindow::new();
//! window.push(Reading::new(1.0));
//! window.push(Reading::new(1.1));
//! assert!(window.snapshot().is_none());
//!
//! window.push(Reading::new(0.9));
//! window.push(Reading::new(1.2));
//! assert_eq!(window.snapshot(), Some([1.1, 0.9, 1.2]));
//! ```

use crate::traits::Reading;

/// Ring buffer of the most recent `K` readings
///
/// ## Internal Invariants
///
/// - `write_pos < K` whenever `K > 0`
/// - `len <= K`
/// - Iteration yields readings oldest first
#[derive(Debug, Clone)]
pub struct ReadingWindow<const K: usize> {
    data: [Reading; K],

    /// Index where the next write will occur
    write_pos: usize,

    /// Valid readings, saturates at K
    len: usize,
}

impl<const K: usize> ReadingWindow<K> {
    /// Creates an empty window
    pub const fn new() -> Self {
        Self {
            data: [Reading::new(0.0); K],
            write_pos: 0,
            len: 0,
        }
    }

    /// Window capacity
    pub const fn capacity(&self) -> usize {
        K
    }

    /// Adds a reading, overwriting the oldest once full
    pub fn push(&mut self, reading: Reading) {
        if K == 0 {
            return;
        }

        self.data[self.write_pos] = reading;
        self.write_pos = (self.write_pos + 1) % K;

        if self.len < K {
            self.len += 1;
        }
    }

    /// Number of readings held
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if window is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if window holds `K` readings
    pub fn is_full(&self) -> bool {
        K > 0 && self.len == K
    }

    /// Most recent reading
    pub fn last(&self) -> Option<Reading> {
        if self.is_empty() {
            return None;
        }

        let idx = if self.write_pos == 0 { K - 1 } else { self.write_pos - 1 };
        Some(self.data[idx])
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = Reading> + '_ {
        // When not yet full the data starts at 0, otherwise at write_pos
        let start = if self.len < K { 0 } else { self.write_pos };
        (0..self.len).map(move |i| self.data[(start + i) % K])
    }

    /// Voltages in chronological order, only once the window is full
    pub fn snapshot(&self) -> Option<[f32; K]> {
        if !self.is_full() {
            return None;
        }

        let mut out = [0.0; K];
        for (slot, reading) in out.iter_mut().zip(self.iter()) {
            *slot = reading.volts;
        }
        Some(out)
    }

    /// Drop all readings
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }
}

impl<const K: usize> Default for ReadingWindow<K> {
    fn default() -> Self {
        Self::new()
    }
}
