//! Sampling core for VoltWatch
//!
//! Samples an analog voltage at a fixed cadence, decides whether the signal
//! has settled, and hands one timestamped reading per cycle to a remote store.
//! Designed for unattended microcontrollers on flaky WiFi.
//!
//! Key constraints:
//! - No heap allocation anywhere in the sampling path
//! - Single control flow, no locks
//! - A failed write never stops the loop
//!
//! ```no_run
//! use voltwatch_core::{SamplerConfig, StabilityDetector, Stability};
//!
//! let config = SamplerConfig::default();
//! config.validate::<5>().expect("reference cadence is valid");
//!
//! let detector = StabilityDetector::<5>::new(config.variance_threshold);
//! let window = [1.00, 1.01, 0.99, 1.00, 1.00];
//! assert_eq!(detector.classify(&window), Stability::Stable);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod config;
pub mod constants;
pub mod detector;
pub mod errors;
pub mod link;
#[cfg(feature = "memory")]
pub mod memory;
pub mod publisher;
pub mod scheduler;
pub mod station;
pub mod time;
pub mod traits;
pub mod window;

// Public API
pub use config::SamplerConfig;
pub use detector::{Stability, StabilityDetector, WindowStats};
pub use errors::{ClockError, ConfigError, LinkError, SamplingError, SamplingResult, StoreError};
pub use link::RetryPolicy;
#[cfg(feature = "memory")]
pub use memory::{MemoryStore, ReplaySource};
pub use publisher::{DeliveryReport, Publisher, PublisherStats, TelemetrySample, WriteOutcome};
pub use scheduler::{Cycle, Sampler};
pub use station::{CycleReport, Station};
pub use time::{format_time_of_day, FixedTime, Freshness, TimeKeeper, TimeSource, TimeString, Timestamp};
pub use traits::{AnalogSource, Delay, Link, Reading, RemoteStore, StoreValue, WallClock};
pub use window::ReadingWindow;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
