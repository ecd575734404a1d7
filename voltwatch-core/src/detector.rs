//! Stability detector
//!
//! Classifies one full window of readings as settled or noisy using the
//! population variance (divisor `k`, not `k - 1`):
//!
//! ```text
//! mean     = Σ x / k
//! variance = Σ (x - mean)² / k
//! stable   = variance < threshold        (strict)
//! ```
//!
//! Pure and allocation-free. The window length is part of the type, so a
//! short window cannot be classified by accident; the slice entry point
//! checks the length and returns an error instead.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{SamplingError, SamplingResult};

/// Outcome of one stability test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Stability {
    /// Variance below threshold
    Stable,
    /// Variance at or above threshold
    Unstable,
}

impl Stability {
    /// True for `Stable`
    pub fn is_stable(self) -> bool {
        matches!(self, Self::Stable)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Stability {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Stable => defmt::write!(fmt, "stable"),
            Self::Unstable => defmt::write!(fmt, "unstable"),
        }
    }
}

/// Mean and population variance of a window
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindowStats {
    /// Arithmetic mean (V)
    pub mean: f32,
    /// Population variance (V²)
    pub variance: f32,
}

impl WindowStats {
    /// Compute over any non-empty slice
    pub fn from_readings(values: &[f32]) -> SamplingResult<Self> {
        if values.is_empty() {
            return Err(SamplingError::EmptyWindow);
        }
        Ok(Self::compute(values))
    }

    // Caller guarantees `values` is non-empty
    fn compute(values: &[f32]) -> Self {
        let n = values.len() as f32;
        // Shift by the first reading so a flat window yields exactly zero
        let shift = values[0];
        let mean = shift + values.iter().map(|v| v - shift).sum::<f32>() / n;
        let sq_diff: f32 = values
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum();

        Self {
            mean,
            variance: sq_diff / n,
        }
    }

    /// Standard deviation (V)
    pub fn std_dev(&self) -> f32 {
        libm::sqrtf(self.variance)
    }
}

/// Population-variance stability test over windows of `K` readings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityDetector<const K: usize> {
    threshold: f32,
}

impl<const K: usize> StabilityDetector<K> {
    const NON_EMPTY: () = assert!(K > 0, "stability window must hold at least one reading");

    /// Detector with the given variance threshold (V²)
    pub fn new(threshold: f32) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;
        Self { threshold }
    }

    /// Configured threshold (V²)
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Statistics and classification for a full window
    pub fn evaluate(&self, window: &[f32; K]) -> (Stability, WindowStats) {
        // K > 0 is enforced at construction
        let stats = WindowStats::compute(window);
        (self.classify_stats(&stats), stats)
    }

    /// Classification for a full window
    pub fn classify(&self, window: &[f32; K]) -> Stability {
        self.evaluate(window).0
    }

    /// Classification for a slice, which must be exactly `K` long
    pub fn classify_slice(&self, readings: &[f32]) -> SamplingResult<Stability> {
        let window: &[f32; K] = readings.try_into().map_err(|_| SamplingError::WindowLength {
            expected: K,
            actual: readings.len(),
        })?;
        Ok(self.classify(window))
    }

    /// Apply the threshold to precomputed statistics
    pub fn classify_stats(&self, stats: &WindowStats) -> Stability {
        if stats.variance < self.threshold {
            Stability::Stable
        } else {
            Stability::Unstable
        }
    }
}
