//! In-memory collaborators
//!
//! A replaying ADC and a map-backed store, for dry runs on the bench and
//! for tests. Both are fixed-capacity and work without an allocator.

use heapless::{FnvIndexMap, Vec};

use crate::errors::{SamplingError, StoreError};
use crate::publisher::StorePath;
use crate::traits::{AnalogSource, Reading, RemoteStore, StoreValue};

/// Maximum number of distinct paths a [`MemoryStore`] holds
pub const MEMORY_STORE_CAPACITY: usize = 16;

/// Maximum number of rejection rules on a [`MemoryStore`]
pub const MEMORY_STORE_RULES: usize = 4;

/// Analog source that replays a fixed sequence of millivolt readings
///
/// Wraps around at the end. A reading of `None` is reported as an
/// acquisition fault.
pub struct ReplaySource<'a> {
    millivolts: &'a [Option<u32>],
    position: usize,
}

impl<'a> ReplaySource<'a> {
    /// Replay `millivolts` in order, forever
    pub fn new(millivolts: &'a [Option<u32>]) -> Self {
        Self {
            millivolts,
            position: 0,
        }
    }

    /// Readings produced so far, faults included
    pub fn position(&self) -> usize {
        self.position
    }
}

impl AnalogSource for ReplaySource<'_> {
    fn sample(&mut self) -> nb::Result<Reading, SamplingError> {
        if self.millivolts.is_empty() {
            return Err(nb::Error::Other(SamplingError::Acquisition {
                reason: "replay sequence is empty",
            }));
        }

        let slot = self.millivolts[self.position % self.millivolts.len()];
        self.position = self.position.wrapping_add(1);

        match slot {
            Some(mv) => Ok(Reading::from_millivolts(mv)),
            None => Err(nb::Error::Other(SamplingError::Acquisition {
                reason: "replayed fault",
            })),
        }
    }
}

/// Map-backed [`RemoteStore`] with failure injection
#[derive(Default)]
pub struct MemoryStore {
    values: FnvIndexMap<StorePath, StoreValue, MEMORY_STORE_CAPACITY>,
    rejections: Vec<(StorePath, &'static str), MEMORY_STORE_RULES>,
    offline: Option<&'static str>,
    writes: u32,
}

fn to_path(path: &str) -> Result<StorePath, StoreError> {
    StorePath::try_from(path).map_err(|_| StoreError::new("path too long"))
}

impl MemoryStore {
    /// Empty store, every write accepted
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every write to `path` with `reason`
    pub fn reject(&mut self, path: &str, reason: &'static str) -> Result<(), StoreError> {
        let path = to_path(path)?;
        self.rejections
            .push((path, reason))
            .map_err(|_| StoreError::new("too many rejection rules"))
    }

    /// Fail every operation with `reason` until [`MemoryStore::go_online`]
    pub fn go_offline(&mut self, reason: &'static str) {
        self.offline = Some(reason);
    }

    /// Clear the offline state
    pub fn go_online(&mut self) {
        self.offline = None;
    }

    /// Successful writes so far
    pub fn writes(&self) -> u32 {
        self.writes
    }

    /// Value at `path`, if any
    pub fn get(&self, path: &str) -> Option<&StoreValue> {
        let path = StorePath::try_from(path).ok()?;
        self.values.get(&path)
    }
}

impl RemoteStore for MemoryStore {
    fn set_value(&mut self, path: &str, value: &StoreValue) -> Result<(), StoreError> {
        if let Some(reason) = self.offline {
            return Err(StoreError::new(reason));
        }

        let path = to_path(path)?;
        if let Some((_, reason)) = self.rejections.iter().find(|(p, _)| *p == path) {
            return Err(StoreError::new(reason));
        }

        self.values
            .insert(path, value.clone())
            .map_err(|_| StoreError::new("store full"))?;
        self.writes = self.writes.saturating_add(1);
        Ok(())
    }

    fn get_value(&mut self, path: &str) -> Result<StoreValue, StoreError> {
        if let Some(reason) = self.offline {
            return Err(StoreError::new(reason));
        }

        let path = to_path(path)?;
        Ok(self.values.get(&path).cloned().unwrap_or(StoreValue::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_wraps_and_faults() {
        let script = [Some(1000), None];
        let mut source = ReplaySource::new(&script);

        assert_eq!(source.sample(), Ok(Reading::new(1.0)));
        assert!(matches!(
            source.sample(),
            Err(nb::Error::Other(SamplingError::Acquisition { .. }))
        ));
        assert_eq!(source.sample(), Ok(Reading::new(1.0)));
        assert_eq!(source.position(), 3);
    }

    #[test]
    fn store_round_trip() {
        let mut store = MemoryStore::new();
        store.set_value("SensorTest/voltage", &StoreValue::Float(1.2)).unwrap();

        assert_eq!(store.get("SensorTest/voltage"), Some(&StoreValue::Float(1.2)));
        assert_eq!(store.get_value("SensorTest/missing"), Ok(StoreValue::Null));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn rejection_rules_apply_per_path() {
        let mut store = MemoryStore::new();
        store.reject("SensorTest/real_time", "quota exceeded").unwrap();

        assert!(store.set_value("SensorTest/voltage", &StoreValue::Float(1.0)).is_ok());
        let err = store
            .set_value("SensorTest/real_time", &StoreValue::text("10:00:00"))
            .unwrap_err();
        assert_eq!(err.reason(), "quota exceeded");
    }

    #[test]
    fn offline_rejects_everything() {
        let mut store = MemoryStore::new();
        store.go_offline("network unreachable");
        assert!(store.set_value("a", &StoreValue::Bool(true)).is_err());
        assert!(store.get_value("a").is_err());

        store.go_online();
        assert!(store.set_value("a", &StoreValue::Bool(true)).is_ok());
    }
}
