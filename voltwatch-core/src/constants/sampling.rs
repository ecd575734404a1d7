//! Sampling Constants
//!
//! Cadence and stability parameters for the settled-voltage detector.

// ===== WINDOW =====

/// Number of readings in the stability window (k).
///
/// Five readings at 50 ms spacing cover a quarter second, long enough to
/// see ripple from a switching supply but short enough to fit a 1 s cycle.
pub const WINDOW_SIZE: usize = 5;

/// Number of ADC reads performed per cycle (m).
///
/// Must be at least [`WINDOW_SIZE`]; the window holds the last k of them.
pub const READS_PER_CYCLE: u32 = 5;

// ===== CADENCE =====

/// Length of one sampling cycle (milliseconds).
pub const CYCLE_PERIOD_MS: u32 = 1000;

/// Blocking delay after each ADC read within a cycle (milliseconds).
pub const INTER_READ_DELAY_MS: u32 = 50;

// ===== STABILITY =====

/// Population variance below which a window counts as settled (V²).
///
/// 0.05 V² is a standard deviation of ~0.22 V. Comparison is strict:
/// a window sitting exactly on the threshold is unstable.
pub const VARIANCE_THRESHOLD_V2: f32 = 0.05;

// ===== UNITS =====

/// Millivolts per volt. The ADC driver reports calibrated millivolts.
pub const MV_PER_VOLT: f32 = 1000.0;
