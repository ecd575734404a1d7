//! Error Types for the Sampling Loop
//!
//! ## Design Philosophy
//!
//! The firmware runs unattended, so every error here is something the loop
//! reports and survives. Nothing in this module terminates the process.
//!
//! 1. **Small Size**: Errors are returned once per cycle at most and carry only
//!    what an operator needs to read on the serial console.
//!
//! 2. **No Heap Allocation**: Local reasons are `&'static str`. Reasons coming
//!    back from the remote store are copied into a fixed-capacity
//!    `heapless::String` and truncated if they do not fit.
//!
//! ## Error Categories
//!
//! ### Per-cycle failures
//! - `SamplingError::Acquisition`: the ADC could not produce a reading. The
//!   cycle is abandoned, nothing is published.
//!
//! ### Programmer errors
//! - `SamplingError::WindowLength` / `EmptyWindow`: the detector was handed
//!   a slice that is not exactly one full window.
//! - `ConfigError`: the cadence cannot fill a window. Rejected once at startup.
//!
//! ### Collaborator failures
//! - `StoreError`: a remote write was rejected or unreachable. Dropped until
//!   the next cycle re-emits.
//! - `ClockError`: network time could not be refreshed.
//! - `LinkError`: the network never came up at startup.
//!
//! ## Handling Strategy
//!
//! ```rust
//! use voltwatch_core::SamplingError;
//!
//! fn on_cycle_error(err: SamplingError) {
//!     match err {
//!         SamplingError::Acquisition { .. } => {
//!             // Skip this cycle, try again next period
//!         }
//!         _ => {
//!             // Configuration bug - fix the build
//!         }
//!     }
//! }
//! ```

use heapless::String;
use thiserror_no_std::Error;

use crate::constants::network::REASON_CAPACITY;

/// Result type for sampling operations
pub type SamplingResult<T> = Result<T, SamplingError>;

/// Errors raised by the sampling core
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SamplingError {
    /// The analog source could not produce a reading
    #[error("Acquisition failed: {reason}")]
    Acquisition {
        /// Driver-supplied description of the fault
        reason: &'static str,
    },

    /// A window of the wrong length was handed to the detector
    #[error("Window length mismatch: expected {expected}, got {actual}")]
    WindowLength {
        /// Configured window size
        expected: usize,
        /// Length actually supplied
        actual: usize,
    },

    /// Variance requested over zero readings
    #[error("Cannot compute statistics over an empty window")]
    EmptyWindow,

    /// Configuration rejected at startup
    #[error("Invalid configuration: {0}")]
    Config(ConfigError),
}

impl From<ConfigError> for SamplingError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Startup configuration errors
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Window size of zero can never be evaluated
    #[error("Window size must be non-zero")]
    ZeroWindow,

    /// Fewer reads per cycle than the window holds
    #[error("Reads per cycle ({reads}) below window size ({window})")]
    ReadsBelowWindow {
        /// Configured reads per cycle
        reads: u32,
        /// Window size
        window: usize,
    },

    /// Cycle period of zero
    #[error("Cycle period must be non-zero")]
    ZeroPeriod,

    /// Threshold NaN, infinite or not positive
    #[error("Variance threshold {threshold} must be finite and positive")]
    InvalidThreshold {
        /// Rejected threshold
        threshold: f32,
    },

    /// The blocking reads alone take longer than one cycle
    #[error("Read budget {budget_ms} ms exceeds cycle period {period_ms} ms")]
    ReadBudgetExceedsPeriod {
        /// (reads - 1) × inter-read delay
        budget_ms: u32,
        /// Cycle period
        period_ms: u32,
    },

    /// Store namespace does not fit the path buffer
    #[error("Store path longer than {capacity} bytes")]
    PathTooLong {
        /// Path buffer capacity
        capacity: usize,
    },
}

/// Remote store write or read failure
///
/// Carries the reason reported by the store so it can be printed on the
/// diagnostic stream. Terminal for that write within the cycle.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{reason}")]
pub struct StoreError {
    reason: String<REASON_CAPACITY>,
}

impl StoreError {
    /// Build from any reason string, truncating at a char boundary if too long
    pub fn new(reason: &str) -> Self {
        let mut buf = String::new();
        for ch in reason.chars() {
            if buf.push(ch).is_err() {
                break;
            }
        }
        Self { reason: buf }
    }

    /// Reason reported by the store
    pub fn reason(&self) -> &str {
        self.reason.as_str()
    }
}

/// Wall-clock refresh failures
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ClockError {
    /// No time has been obtained since boot
    #[error("Clock not synchronised yet")]
    NotSynced,

    /// The time server could not be reached
    #[error("Time source unreachable: {reason}")]
    Unreachable {
        /// Collaborator-supplied description
        reason: &'static str,
    },
}

/// Link establishment failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkError {
    /// All attempts used up without the link coming up
    #[error("Link not up after {attempts} attempts")]
    Exhausted {
        /// Attempts made
        attempts: u32,
    },

    /// A single attempt was refused
    #[error("Link attempt rejected: {reason}")]
    Rejected {
        /// Collaborator-supplied description
        reason: &'static str,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for SamplingError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Acquisition { reason } =>
                defmt::write!(fmt, "Acquisition failed: {}", reason),
            Self::WindowLength { expected, actual } =>
                defmt::write!(fmt, "Window length {} != {}", actual, expected),
            Self::EmptyWindow =>
                defmt::write!(fmt, "Empty window"),
            Self::Config(_) =>
                defmt::write!(fmt, "Invalid configuration"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StoreError {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Store error: {}", self.reason.as_str())
    }
}
