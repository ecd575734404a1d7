//! Wall clock backed by the host's system time
//!
//! The host is assumed to run its own time sync (NTP daemon, RTC). A system
//! clock still sitting near the epoch is treated as not synced.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use voltwatch_core::constants::time::WALL_CLOCK_OFFSET_S;
use voltwatch_core::{ClockError, TimeString, WallClock};

/// 2020-01-01T00:00:00Z; anything earlier means the clock was never set
const EARLIEST_PLAUSIBLE_S: i64 = 1_577_836_800;

/// [`WallClock`] reading `chrono::Utc::now()` and rendering local `HH:MM:SS`
#[derive(Debug, Clone)]
pub struct SystemWallClock {
    offset: FixedOffset,
    synced_at: Option<DateTime<FixedOffset>>,
}

impl SystemWallClock {
    /// Clock rendering times `offset_secs` east of UTC
    ///
    /// Returns `None` for offsets outside ±24 h.
    pub fn new(offset_secs: i32) -> Option<Self> {
        Some(Self {
            offset: FixedOffset::east_opt(offset_secs)?,
            synced_at: None,
        })
    }

    /// Offset from UTC in seconds
    pub fn offset_secs(&self) -> i32 {
        self.offset.local_minus_utc()
    }

    /// Sync to an explicit epoch time instead of the system clock
    pub fn sync_to(&mut self, epoch_secs: i64) -> Result<(), ClockError> {
        if epoch_secs < EARLIEST_PLAUSIBLE_S {
            return Err(ClockError::NotSynced);
        }
        let utc = DateTime::from_timestamp(epoch_secs, 0).ok_or(ClockError::Unreachable {
            reason: "timestamp out of range",
        })?;
        self.synced_at = Some(utc.with_timezone(&self.offset));
        Ok(())
    }
}

impl Default for SystemWallClock {
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(WALL_CLOCK_OFFSET_S as i32).unwrap_or_else(|| Utc.fix()),
            synced_at: None,
        }
    }
}

impl WallClock for SystemWallClock {
    fn refresh(&mut self) -> Result<(), ClockError> {
        self.sync_to(Utc::now().timestamp())
    }

    fn current_time_string(&self) -> Option<TimeString> {
        let rendered = self.synced_at?.format("%H:%M:%S").to_string();
        TimeString::try_from(rendered.as_str()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voltwatch_core::format_time_of_day;

    #[test]
    fn renders_with_reference_offset() {
        let mut clock = SystemWallClock::default();
        assert_eq!(clock.offset_secs(), 68_400);

        // 2024-01-01T12:00:00Z
        clock.sync_to(1_704_110_400).unwrap();
        assert_eq!(clock.current_time_string().unwrap().as_str(), "07:00:00");
    }

    #[test]
    fn agrees_with_core_formatter() {
        let epoch = 1_718_000_123;
        for offset in [0, 3_600, -18_000, 68_400] {
            let mut clock = SystemWallClock::new(offset).unwrap();
            clock.sync_to(epoch).unwrap();
            assert_eq!(
                clock.current_time_string(),
                Some(format_time_of_day(epoch as u64, i64::from(offset)))
            );
        }
    }

    #[test]
    fn unset_clock_is_not_synced() {
        let mut clock = SystemWallClock::default();
        assert_eq!(clock.sync_to(0), Err(ClockError::NotSynced));
        assert!(clock.current_time_string().is_none());
    }

    #[test]
    fn rejects_impossible_offset() {
        assert!(SystemWallClock::new(90_000).is_none());
    }

    #[test]
    fn system_clock_refreshes() {
        let mut clock = SystemWallClock::new(0).unwrap();
        clock.refresh().unwrap();
        assert_eq!(clock.current_time_string().map(|s| s.len()), Some(8));
    }
}
