//! Time-Related Constants

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u64 = 60;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;

/// Seconds per day.
pub const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

// ===== WALL CLOCK =====

/// Offset applied to network UTC before formatting (seconds).
///
/// The reference deployment shifts by +19 h. Kept for compatibility with
/// the `real_time` values already sitting in the remote schema.
pub const WALL_CLOCK_OFFSET_S: i64 = 19 * 3600;

/// Capacity of a formatted `HH:MM:SS` string.
pub const TIME_STRING_CAPACITY: usize = 16;
