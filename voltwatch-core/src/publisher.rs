//! Telemetry publisher
//!
//! Writes one sample as two independent keyed writes:
//!
//! ```text
//! <namespace>/voltage    <- Float(volts)
//! <namespace>/real_time  <- Text("HH:MM:SS")
//! ```
//!
//! Each write is attempted exactly once and reported on its own. A rejected
//! voltage write does not stop the time write, and nothing is rolled back.
//! Failed samples are not queued; the next cycle publishes a fresh one.
//!
//! The path names are what the existing database schema expects. Changing
//! them orphans every dashboard reading the node.

use core::fmt::Write;

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::network::{PATH_CAPACITY, REAL_TIME_KEY, VOLTAGE_KEY};
use crate::errors::{ConfigError, StoreError};
use crate::time::TimeString;
use crate::traits::{RemoteStore, StoreValue};

/// Fixed-capacity store path
pub type StorePath = String<PATH_CAPACITY>;

/// One reading paired with the wall-clock time it is published at
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TelemetrySample {
    /// Voltage (V)
    pub volts: f32,
    /// Formatted local time, `None` if network time was never obtained
    pub timestamp: Option<TimeString>,
}

/// Outcome of a single keyed write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// Store accepted the write
    Saved,
    /// Store rejected the write or could not be reached
    Failed(StoreError),
    /// Nothing to write (no wall-clock time yet)
    Skipped,
}

impl WriteOutcome {
    /// True for `Saved`
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }

    /// Failure reason, if the write failed
    pub fn failure(&self) -> Option<&StoreError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Per-field outcome of publishing one sample
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReport {
    /// Voltage write
    pub voltage: WriteOutcome,
    /// Timestamp write
    pub timestamp: WriteOutcome,
}

impl DeliveryReport {
    /// Both writes saved
    pub fn is_complete(&self) -> bool {
        self.voltage.is_saved() && self.timestamp.is_saved()
    }
}

/// Running totals since boot
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PublisherStats {
    /// Samples handed to the publisher
    pub samples: u32,
    /// Writes accepted by the store
    pub writes_ok: u32,
    /// Writes rejected or unreachable
    pub writes_failed: u32,
    /// Timestamp writes skipped for lack of time
    pub writes_skipped: u32,
}

/// Delivers samples to a [`RemoteStore`] under a fixed namespace
pub struct Publisher<S: RemoteStore> {
    store: S,
    voltage_path: StorePath,
    time_path: StorePath,
    stats: PublisherStats,
}

/// Join `namespace` and `key` into `namespace/key`
pub fn store_path(namespace: &str, key: &str) -> Result<StorePath, ConfigError> {
    let mut path = StorePath::new();
    let namespace = namespace.trim_end_matches('/');
    let result = if namespace.is_empty() {
        path.push_str(key)
    } else {
        write!(path, "{}/{}", namespace, key).map_err(|_| ())
    };
    result.map_err(|_| ConfigError::PathTooLong {
        capacity: PATH_CAPACITY,
    })?;
    Ok(path)
}

impl<S: RemoteStore> Publisher<S> {
    /// Publisher writing under `namespace`
    pub fn new(store: S, namespace: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            store,
            voltage_path: store_path(namespace, VOLTAGE_KEY)?,
            time_path: store_path(namespace, REAL_TIME_KEY)?,
            stats: PublisherStats::default(),
        })
    }

    /// Write both fields of `sample`, reporting each independently
    pub fn publish(&mut self, sample: &TelemetrySample) -> DeliveryReport {
        self.stats.samples = self.stats.samples.saturating_add(1);

        let voltage = match self
            .store
            .set_value(&self.voltage_path, &StoreValue::Float(sample.volts))
        {
            Ok(()) => {
                log_info!("Voltage {:.3}V saved to: {} (float)", sample.volts, self.voltage_path);
                WriteOutcome::Saved
            }
            Err(err) => {
                log_warn!("Failed to save voltage: {}", err);
                WriteOutcome::Failed(err)
            }
        };
        self.record(&voltage);

        let timestamp = match &sample.timestamp {
            Some(time) => match self
                .store
                .set_value(&self.time_path, &StoreValue::text(time))
            {
                Ok(()) => {
                    log_info!("Time {} saved to: {}", time, self.time_path);
                    WriteOutcome::Saved
                }
                Err(err) => {
                    log_warn!("Failed to save time: {}", err);
                    WriteOutcome::Failed(err)
                }
            },
            None => {
                log_warn!("No wall-clock time yet, not writing {}", self.time_path);
                WriteOutcome::Skipped
            }
        };
        self.record(&timestamp);

        DeliveryReport { voltage, timestamp }
    }

    fn record(&mut self, outcome: &WriteOutcome) {
        let counter = match outcome {
            WriteOutcome::Saved => &mut self.stats.writes_ok,
            WriteOutcome::Failed(_) => &mut self.stats.writes_failed,
            WriteOutcome::Skipped => &mut self.stats.writes_skipped,
        };
        *counter = counter.saturating_add(1);
    }

    /// Read a typed value from a sibling key under the same namespace
    pub fn fetch(&mut self, key: &str) -> Result<StoreValue, StoreError> {
        let namespace = self
            .voltage_path
            .strip_suffix(VOLTAGE_KEY)
            .unwrap_or("");
        let path = store_path(namespace, key).map_err(|_| StoreError::new("path too long"))?;
        self.store.get_value(&path)
    }

    /// Path the voltage is written to
    pub fn voltage_path(&self) -> &str {
        &self.voltage_path
    }

    /// Path the time string is written to
    pub fn time_path(&self) -> &str {
        &self.time_path
    }

    /// Totals since boot
    pub fn stats(&self) -> PublisherStats {
        self.stats
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Underlying store, mutably
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        writes: Vec<(std::string::String, StoreValue)>,
        reject: Option<&'static str>,
    }

    impl RemoteStore for Recorder {
        fn set_value(&mut self, path: &str, value: &StoreValue) -> Result<(), StoreError> {
            if self.reject == Some(path) {
                return Err(StoreError::new("permission denied"));
            }
            self.writes.push((path.into(), value.clone()));
            Ok(())
        }

        fn get_value(&mut self, path: &str) -> Result<StoreValue, StoreError> {
            self.writes
                .iter()
                .rev()
                .find(|(p, _)| p == path)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| StoreError::new("not found"))
        }
    }

    fn sample(volts: f32, time: &str) -> TelemetrySample {
        TelemetrySample {
            volts,
            timestamp: Some(TimeString::try_from(time).unwrap()),
        }
    }

    #[test]
    fn paths_follow_namespace() {
        let publisher = Publisher::new(Recorder::default(), "SensorTest").unwrap();
        assert_eq!(publisher.voltage_path(), "SensorTest/voltage");
        assert_eq!(publisher.time_path(), "SensorTest/real_time");

        let trailing = Publisher::new(Recorder::default(), "Lab/").unwrap();
        assert_eq!(trailing.voltage_path(), "Lab/voltage");
    }

    #[test]
    fn oversized_namespace_is_rejected() {
        let long = "n".repeat(PATH_CAPACITY);
        assert!(matches!(
            Publisher::new(Recorder::default(), &long),
            Err(ConfigError::PathTooLong { .. })
        ));
    }

    #[test]
    fn writes_value_then_time() {
        let mut publisher = Publisher::new(Recorder::default(), "SensorTest").unwrap();
        let report = publisher.publish(&sample(1.0, "12:30:05"));

        assert!(report.is_complete());
        let writes = &publisher.store().writes;
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], ("SensorTest/voltage".into(), StoreValue::Float(1.0)));
        assert_eq!(writes[1], ("SensorTest/real_time".into(), StoreValue::text("12:30:05")));
    }

    #[test]
    fn voltage_failure_does_not_block_time() {
        let store = Recorder {
            reject: Some("SensorTest/voltage"),
            ..Default::default()
        };
        let mut publisher = Publisher::new(store, "SensorTest").unwrap();
        let report = publisher.publish(&sample(0.9, "08:00:00"));

        assert_eq!(report.voltage.failure().map(|e| e.reason()), Some("permission denied"));
        assert!(report.timestamp.is_saved());
        assert_eq!(publisher.stats().writes_failed, 1);
        assert_eq!(publisher.stats().writes_ok, 1);
    }

    #[test]
    fn missing_time_is_skipped() {
        let mut publisher = Publisher::new(Recorder::default(), "SensorTest").unwrap();
        let report = publisher.publish(&TelemetrySample { volts: 2.0, timestamp: None });

        assert!(report.voltage.is_saved());
        assert_eq!(report.timestamp, WriteOutcome::Skipped);
        assert_eq!(publisher.store().writes.len(), 1);
        assert_eq!(publisher.stats().writes_skipped, 1);
    }

    #[test]
    fn fetch_reads_sibling_key() {
        let mut publisher = Publisher::new(Recorder::default(), "SensorTest").unwrap();
        publisher
            .store_mut()
            .set_value("SensorTest/sensornum", &StoreValue::Int(3))
            .unwrap();

        assert_eq!(publisher.fetch("sensornum"), Ok(StoreValue::Int(3)));
        assert!(publisher.fetch("missing").is_err());
    }
}
