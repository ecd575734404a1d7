//! Capability traits for the collaborators the sampling core drives
//!
//! The core owns no hardware and no sockets. The ADC, the delay provider,
//! network time, the remote store and the network link are all injected
//! through these traits so the loop can run against a real board or a test
//! harness unchanged.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::sampling::MV_PER_VOLT;
use crate::errors::{ClockError, LinkError, SamplingError, StoreError};
use crate::link::{self, RetryPolicy};
use crate::time::TimeString;

/// Capacity of a text value written to or read from the store
pub const TEXT_VALUE_CAPACITY: usize = 64;

/// Single instantaneous voltage reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Measured voltage in volts
    pub volts: f32,
}

impl Reading {
    /// Wrap a value already in volts
    pub const fn new(volts: f32) -> Self {
        Self { volts }
    }

    /// Convert a calibrated millivolt reading from the ADC driver
    pub fn from_millivolts(millivolts: u32) -> Self {
        Self {
            volts: millivolts as f32 / MV_PER_VOLT,
        }
    }
}

/// Analog input producing one reading on demand
///
/// `nb::Error::WouldBlock` means a conversion is still running; the scheduler
/// spins on it. `nb::Error::Other` is a hardware fault and abandons the cycle.
pub trait AnalogSource {
    /// Capture one reading
    fn sample(&mut self) -> nb::Result<Reading, SamplingError>;
}

/// Blocking delay provider
pub trait Delay {
    /// Block for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// Network-synchronised wall clock
pub trait WallClock {
    /// Pull fresh time from the network. Failure is non-fatal.
    fn refresh(&mut self) -> Result<(), ClockError>;

    /// Formatted local time, `None` if no time was ever obtained
    fn current_time_string(&self) -> Option<TimeString>;
}

/// Value held at a store path
///
/// Reads come back tagged so callers match on the variant instead of
/// comparing type names.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreValue {
    /// Path holds nothing
    Null,
    /// Boolean leaf
    Bool(bool),
    /// Integral number
    Int(i64),
    /// Floating point number
    Float(f32),
    /// Text leaf
    Text(String<TEXT_VALUE_CAPACITY>),
}

impl StoreValue {
    /// Build a text value, truncating if it does not fit
    pub fn text(value: &str) -> Self {
        let mut buf = String::new();
        for ch in value.chars() {
            if buf.push(ch).is_err() {
                break;
            }
        }
        Self::Text(buf)
    }

    /// Name of the variant, as printed in status lines
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
        }
    }

    /// Integer payload, if this is an `Int`
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric payload as f32 for `Float` and `Int`
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// Text payload, if this is a `Text`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// Keyed remote data store
///
/// Writes are single attempts. Retrying is the caller's call, and the
/// publisher never does.
pub trait RemoteStore {
    /// Write `value` at `path`
    fn set_value(&mut self, path: &str, value: &StoreValue) -> Result<(), StoreError>;

    /// Read the value at `path`
    fn get_value(&mut self, path: &str) -> Result<StoreValue, StoreError>;
}

impl<T: RemoteStore + ?Sized> RemoteStore for &mut T {
    fn set_value(&mut self, path: &str, value: &StoreValue) -> Result<(), StoreError> {
        (**self).set_value(path, value)
    }

    fn get_value(&mut self, path: &str) -> Result<StoreValue, StoreError> {
        (**self).get_value(path)
    }
}

/// Network link that must be up before the first publish
pub trait Link {
    /// Make one connection attempt
    fn attempt(&mut self) -> Result<(), LinkError>;

    /// Whether the link is currently up
    fn is_up(&self) -> bool;

    /// Try up to `max_attempts` times with a fixed `delay_ms` between tries.
    /// Returns the number of attempts used.
    fn connect<D: Delay>(
        &mut self,
        max_attempts: u32,
        delay_ms: u32,
        delay: &mut D,
    ) -> Result<u32, LinkError>
    where
        Self: Sized,
    {
        link::establish(self, &RetryPolicy::fixed(max_attempts, delay_ms), delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millivolts_convert_to_volts() {
        let reading = Reading::from_millivolts(1250);
        assert!((reading.volts - 1.25).abs() < 1e-6);
    }

    #[test]
    fn store_value_accessors() {
        assert_eq!(StoreValue::Int(7).as_int(), Some(7));
        assert_eq!(StoreValue::Float(1.5).as_int(), None);
        assert_eq!(StoreValue::Int(2).as_f32(), Some(2.0));
        assert_eq!(StoreValue::text("12:00:00").as_str(), Some("12:00:00"));
        assert_eq!(StoreValue::Null.type_name(), "null");
    }

    #[test]
    fn text_value_truncates() {
        let long = "a".repeat(TEXT_VALUE_CAPACITY * 2);
        let value = StoreValue::text(&long);
        assert_eq!(value.as_str().map(str::len), Some(TEXT_VALUE_CAPACITY));
    }
}
