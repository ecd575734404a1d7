//! Common test utilities for integration tests
//!
//! This module provides:
//! - A scripted ADC with fault injection
//! - A simulated wall clock driven by the same [`FixedTime`] as the delay
//! - A store that records every write in order
//! - A link that comes up after a set number of attempts

#![allow(dead_code)]

use std::collections::VecDeque;

use voltwatch_core::{
    errors::{ClockError, LinkError, SamplingError, StoreError},
    format_time_of_day, AnalogSource, FixedTime, Link, Publisher, Reading, RemoteStore, Sampler,
    SamplerConfig, Station, StoreValue, TimeSource, TimeString, WallClock,
};

pub mod scenarios;

/// Epoch seconds for 2024-01-01 12:00:00 UTC
pub const EPOCH_BASE_S: u64 = 1_704_110_400;

/// ADC that plays back a script; `None` entries are acquisition faults
pub struct ScriptedAdc {
    readings: VecDeque<Option<f32>>,
    pub taken: usize,
}

impl ScriptedAdc {
    pub fn new(readings: &[Option<f32>]) -> Self {
        Self {
            readings: readings.iter().copied().collect(),
            taken: 0,
        }
    }

    /// Script of good readings only
    pub fn volts(readings: &[f32]) -> Self {
        let script: Vec<Option<f32>> = readings.iter().copied().map(Some).collect();
        Self::new(&script)
    }
}

impl AnalogSource for ScriptedAdc {
    fn sample(&mut self) -> nb::Result<Reading, SamplingError> {
        self.taken += 1;
        match self.readings.pop_front() {
            Some(Some(volts)) => Ok(Reading::new(volts)),
            Some(None) => Err(nb::Error::Other(SamplingError::Acquisition {
                reason: "injected fault",
            })),
            None => Err(nb::Error::Other(SamplingError::Acquisition {
                reason: "script exhausted",
            })),
        }
    }
}

/// Wall clock reading the simulated monotonic time
///
/// `script` decides whether each refresh succeeds; once it runs out every
/// refresh succeeds.
pub struct SimClock<'a> {
    time: &'a FixedTime,
    script: VecDeque<bool>,
    synced_at: Option<u64>,
    pub refreshes: u32,
}

impl<'a> SimClock<'a> {
    pub fn new(time: &'a FixedTime) -> Self {
        Self::scripted(time, &[])
    }

    pub fn scripted(time: &'a FixedTime, script: &[bool]) -> Self {
        Self {
            time,
            script: script.iter().copied().collect(),
            synced_at: None,
            refreshes: 0,
        }
    }

    /// Expected string for a refresh at monotonic `now_ms`
    pub fn expected(now_ms: u64) -> TimeString {
        format_time_of_day(EPOCH_BASE_S + now_ms / 1000, 0)
    }
}

impl WallClock for SimClock<'_> {
    fn refresh(&mut self) -> Result<(), ClockError> {
        self.refreshes += 1;
        if self.script.pop_front().unwrap_or(true) {
            self.synced_at = Some(self.time.now());
            Ok(())
        } else {
            Err(ClockError::Unreachable { reason: "ntp timeout" })
        }
    }

    fn current_time_string(&self) -> Option<TimeString> {
        self.synced_at.map(Self::expected)
    }
}

/// Store that records writes in order, with per-path rejection
#[derive(Default)]
pub struct RecordingStore {
    pub writes: Vec<(String, StoreValue)>,
    pub rejected: Vec<(String, &'static str)>,
    pub attempts: u32,
}

impl RecordingStore {
    pub fn rejecting(path: &str, reason: &'static str) -> Self {
        Self {
            rejected: vec![(path.to_string(), reason)],
            ..Default::default()
        }
    }

    /// Values written to `path`, oldest first
    pub fn values_at(&self, path: &str) -> Vec<StoreValue> {
        self.writes
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

impl RemoteStore for RecordingStore {
    fn set_value(&mut self, path: &str, value: &StoreValue) -> Result<(), StoreError> {
        self.attempts += 1;
        if let Some((_, reason)) = self.rejected.iter().find(|(p, _)| p == path) {
            return Err(StoreError::new(reason));
        }
        self.writes.push((path.to_string(), value.clone()));
        Ok(())
    }

    fn get_value(&mut self, path: &str) -> Result<StoreValue, StoreError> {
        Ok(self
            .values_at(path)
            .pop()
            .unwrap_or(StoreValue::Null))
    }
}

/// Link that fails `failures` times before coming up
pub struct FlakyLink {
    failures: u32,
    pub attempts: u32,
    up: bool,
}

impl FlakyLink {
    pub fn new(failures: u32) -> Self {
        Self {
            failures,
            attempts: 0,
            up: false,
        }
    }
}

impl Link for FlakyLink {
    fn attempt(&mut self) -> Result<(), LinkError> {
        self.attempts += 1;
        if self.attempts > self.failures {
            self.up = true;
            Ok(())
        } else {
            Err(LinkError::Rejected { reason: "no ap" })
        }
    }

    fn is_up(&self) -> bool {
        self.up
    }
}

pub type SimStation<'a> = Station<ScriptedAdc, &'a FixedTime, SimClock<'a>, RecordingStore, 5>;

/// Station on the reference cadence, all collaborators simulated
pub fn station<'a>(
    time: &'a FixedTime,
    adc: ScriptedAdc,
    clock: SimClock<'a>,
    store: RecordingStore,
) -> SimStation<'a> {
    let sampler = Sampler::new(adc, time, SamplerConfig::default()).expect("reference config");
    let publisher = Publisher::new(store, "SensorTest").expect("namespace fits");
    Station::new(sampler, clock, publisher)
}
