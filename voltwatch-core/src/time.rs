//! Time management for the sampling loop
//!
//! Two separate notions of time:
//! - Monotonic milliseconds, used only to gate the cycle cadence
//! - Wall-clock strings from network time, attached to published samples

use core::cell::Cell;
use core::fmt::Write;

use heapless::String;

use crate::constants::time::{SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE, TIME_STRING_CAPACITY};
use crate::traits::{Delay, WallClock};

/// Timestamp in milliseconds since device boot
pub type Timestamp = u64;

/// Formatted local time, `HH:MM:SS`
pub type TimeString = String<TIME_STRING_CAPACITY>;

/// Source of monotonic time
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// Monotonic time source backed by `std::time::Instant`
///
/// Starts at 0 when created, always increases
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    started: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicTime {
    /// Start counting from now
    pub fn new() -> Self {
        Self {
            started: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicTime {
    fn now(&self) -> Timestamp {
        self.started.elapsed().as_millis() as Timestamp
    }
}

/// Manually driven time source for simulation and tests
///
/// Interior mutability lets a simulated delay advance the same clock the
/// scheduler reads from.
#[derive(Debug, Clone, Default)]
pub struct FixedTime {
    timestamp: Cell<Timestamp>,
}

impl FixedTime {
    /// Start at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp: Cell::new(timestamp),
        }
    }

    /// Jump to `timestamp`
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.set(timestamp);
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.timestamp.set(self.timestamp.get() + ms);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp.get()
    }
}

/// Simulated blocking delay: waiting moves the shared clock forward
impl Delay for &FixedTime {
    fn delay_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms));
    }
}

/// Render seconds since the Unix epoch as `HH:MM:SS` after applying `offset_secs`
pub fn format_time_of_day(epoch_secs: u64, offset_secs: i64) -> TimeString {
    let local = (epoch_secs as i64)
        .wrapping_add(offset_secs)
        .rem_euclid(SECONDS_PER_DAY as i64) as u64;

    let hours = local / SECONDS_PER_HOUR;
    let minutes = (local % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = local % SECONDS_PER_MINUTE;

    let mut out = TimeString::new();
    // 8 chars always fit
    let _ = write!(out, "{:02}:{:02}:{:02}", hours, minutes, seconds);
    out
}

/// Freshness of the time string handed out by [`TimeKeeper`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Refreshed successfully this tick
    Fresh,
    /// Last refresh failed, previous value reused
    Stale,
    /// Never obtained a time
    Unsynced,
}

/// Wraps a [`WallClock`] and remembers the last good time string
///
/// A failed refresh never clears a value obtained earlier, and a value that
/// was never obtained is reported as `Unsynced` instead of being made up.
pub struct TimeKeeper<C: WallClock> {
    clock: C,
    last: Option<TimeString>,
    freshness: Freshness,
}

impl<C: WallClock> TimeKeeper<C> {
    /// Wrap `clock`; nothing is cached until the first refresh
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            last: None,
            freshness: Freshness::Unsynced,
        }
    }

    /// Refresh from the network and return the freshness of the result
    pub fn refresh(&mut self) -> Freshness {
        match self.clock.refresh() {
            Ok(()) => {
                if let Some(now) = self.clock.current_time_string() {
                    self.last = Some(now);
                    self.freshness = Freshness::Fresh;
                } else {
                    self.mark_failed();
                }
            }
            Err(err) => {
                log_warn!("Clock refresh failed: {}", err);
                self.mark_failed();
            }
        }
        self.freshness
    }

    fn mark_failed(&mut self) {
        self.freshness = if self.last.is_some() {
            Freshness::Stale
        } else {
            Freshness::Unsynced
        };
    }

    /// Last good time string, if any
    pub fn current(&self) -> Option<&TimeString> {
        self.last.as_ref()
    }

    /// Freshness as of the last refresh
    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    /// Access the wrapped clock
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
