//! Sampling cadence configuration
//!
//! Defaults reproduce the reference deployment: five reads 50 ms apart,
//! once per second, stable below 0.05 V². A configuration is validated once
//! at startup; the sampler refuses to build from one that cannot fill its
//! window.

use fugit::MillisDurationU32;

use crate::constants::sampling::{
    CYCLE_PERIOD_MS, INTER_READ_DELAY_MS, READS_PER_CYCLE, VARIANCE_THRESHOLD_V2,
};
use crate::errors::ConfigError;

/// Cadence and threshold for the sampler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig {
    /// ADC reads per cycle (m)
    pub reads_per_cycle: u32,
    /// Minimum time between cycle starts
    pub cycle_period: MillisDurationU32,
    /// Blocking wait between consecutive reads
    pub inter_read_delay: MillisDurationU32,
    /// Variance below which a window is stable (V²)
    pub variance_threshold: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            reads_per_cycle: READS_PER_CYCLE,
            cycle_period: MillisDurationU32::millis(CYCLE_PERIOD_MS),
            inter_read_delay: MillisDurationU32::millis(INTER_READ_DELAY_MS),
            variance_threshold: VARIANCE_THRESHOLD_V2,
        }
    }
}

impl SamplerConfig {
    /// Set reads per cycle
    pub fn reads_per_cycle(mut self, reads: u32) -> Self {
        self.reads_per_cycle = reads;
        self
    }

    /// Set cycle period in milliseconds
    pub fn cycle_period_ms(mut self, ms: u32) -> Self {
        self.cycle_period = MillisDurationU32::millis(ms);
        self
    }

    /// Set inter-read delay in milliseconds
    pub fn inter_read_delay_ms(mut self, ms: u32) -> Self {
        self.inter_read_delay = MillisDurationU32::millis(ms);
        self
    }

    /// Set variance threshold (V²)
    pub fn variance_threshold(mut self, threshold: f32) -> Self {
        self.variance_threshold = threshold;
        self
    }

    /// Total blocking time spent between reads in one cycle (ms)
    pub fn read_budget_ms(&self) -> u32 {
        self.reads_per_cycle
            .saturating_sub(1)
            .saturating_mul(self.inter_read_delay.to_millis())
    }

    /// Check that this cadence can fill a window of `K` readings
    pub fn validate<const K: usize>(&self) -> Result<(), ConfigError> {
        if K == 0 {
            return Err(ConfigError::ZeroWindow);
        }

        if (self.reads_per_cycle as usize) < K {
            return Err(ConfigError::ReadsBelowWindow {
                reads: self.reads_per_cycle,
                window: K,
            });
        }

        let period_ms = self.cycle_period.to_millis();
        if period_ms == 0 {
            return Err(ConfigError::ZeroPeriod);
        }

        if !self.variance_threshold.is_finite() || self.variance_threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold {
                threshold: self.variance_threshold,
            });
        }

        let budget_ms = self.read_budget_ms();
        if budget_ms > period_ms {
            return Err(ConfigError::ReadBudgetExceedsPeriod { budget_ms, period_ms });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_cadence_is_valid() {
        let config = SamplerConfig::default();
        assert_eq!(config.reads_per_cycle, 5);
        assert_eq!(config.cycle_period.to_millis(), 1000);
        assert_eq!(config.read_budget_ms(), 200);
        assert!(config.validate::<5>().is_ok());
    }

    #[test]
    fn more_reads_than_window_is_valid() {
        let config = SamplerConfig::default().reads_per_cycle(8);
        assert!(config.validate::<5>().is_ok());
    }

    #[test]
    fn fewer_reads_than_window_is_rejected() {
        let config = SamplerConfig::default().reads_per_cycle(3);
        assert_eq!(
            config.validate::<5>(),
            Err(ConfigError::ReadsBelowWindow { reads: 3, window: 5 })
        );
    }

    #[test]
    fn zero_window_is_rejected() {
        assert_eq!(SamplerConfig::default().validate::<0>(), Err(ConfigError::ZeroWindow));
    }

    #[test]
    fn bad_threshold_is_rejected() {
        for threshold in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = SamplerConfig::default().variance_threshold(threshold);
            assert!(matches!(
                config.validate::<5>(),
                Err(ConfigError::InvalidThreshold { .. })
            ));
        }
    }

    #[test]
    fn zero_period_is_rejected() {
        let config = SamplerConfig::default().cycle_period_ms(0);
        assert_eq!(config.validate::<5>(), Err(ConfigError::ZeroPeriod));
    }

    #[test]
    fn read_budget_longer_than_period_is_rejected() {
        let config = SamplerConfig::default().inter_read_delay_ms(300);
        assert_eq!(
            config.validate::<5>(),
            Err(ConfigError::ReadBudgetExceedsPeriod { budget_ms: 1200, period_ms: 1000 })
        );
    }
}
