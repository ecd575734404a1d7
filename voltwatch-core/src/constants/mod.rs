//! Constants for VoltWatch Core
//!
//! Every number the sampling loop depends on lives here, with its unit in
//! the name. The values reproduce the reference deployment: an ESP32 reading
//! a divider on an ADC pin and pushing to a realtime database once a second.
//!
//! ## Organization
//!
//! - **Sampling**: window size, cadence, stability threshold
//! - **Time**: unit conversions and wall-clock formatting
//! - **Network**: store paths, retry budgets, timeouts

/// Sampling cadence and stability detection parameters.
pub mod sampling;

/// Time unit conversions and wall-clock settings.
pub mod time;

/// Remote store layout and link retry budgets.
pub mod network;

// Re-export commonly used constants for convenience
pub use sampling::{
    WINDOW_SIZE, READS_PER_CYCLE, CYCLE_PERIOD_MS, INTER_READ_DELAY_MS,
    VARIANCE_THRESHOLD_V2, MV_PER_VOLT,
};

pub use time::{MS_PER_SECOND, SECONDS_PER_DAY, WALL_CLOCK_OFFSET_S};

pub use network::{
    DEFAULT_NAMESPACE, VOLTAGE_KEY, REAL_TIME_KEY,
    LINK_MAX_ATTEMPTS, LINK_RETRY_DELAY_MS,
};
