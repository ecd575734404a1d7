//! Time-gated sampling scheduler
//!
//! ## Overview
//!
//! The main loop calls [`Sampler::tick`] as often as it likes. Most calls
//! return immediately; once per cycle period the sampler runs a full cycle:
//!
//! ```text
//! tick(now)
//!   ├─ now - last_start < period ──► Ok(None)            (not due)
//!   └─ due
//!        ├─ clear window
//!        ├─ m × { read ADC, push into window, wait delay } (no wait after last)
//!        ├─ classify the full window once
//!        └─ Ok(Some(Cycle { last reading, stability, stats }))
//! ```
//!
//! The very first tick after boot always fires. Cadence is measured from
//! cycle start to cycle start, so the read time does not drift the period.
//!
//! ## Emission
//!
//! A completed cycle yields exactly one [`Cycle`], and [`Cycle::emission`]
//! is always the last reading of that cycle. The classification rides along
//! but does not decide what gets published. Settled readings and noisy
//! readings go out the same way.
//!
//! ## Failures
//!
//! An ADC fault abandons the cycle: no classification, no emission, and the
//! error is logged and returned. The cycle still counts for cadence, so a
//! dead sensor is polled once per period rather than in a tight loop.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::SamplerConfig;
use crate::detector::{Stability, StabilityDetector, WindowStats};
use crate::errors::{ConfigError, SamplingError, SamplingResult};
use crate::time::Timestamp;
use crate::traits::{AnalogSource, Delay, Reading};
use crate::window::ReadingWindow;

/// Result of one completed sampling cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cycle {
    /// 1-based count of completed cycles since boot
    pub sequence: u32,
    /// Monotonic time the cycle started (ms)
    pub started_at: Timestamp,
    /// Last reading taken in the cycle
    pub last: Reading,
    /// Classification of the cycle's window
    pub stability: Stability,
    /// Window mean and variance
    pub stats: WindowStats,
}

impl Cycle {
    /// Reading to forward to the publisher
    ///
    /// Always the last reading, whatever the classification.
    pub fn emission(&self) -> Reading {
        self.last
    }
}

/// Drives the ADC at a fixed cadence and classifies each cycle's window
pub struct Sampler<A: AnalogSource, D: Delay, const K: usize> {
    source: A,
    delay: D,
    config: SamplerConfig,
    detector: StabilityDetector<K>,
    window: ReadingWindow<K>,
    last_cycle_start: Option<Timestamp>,
    completed: u32,
    abandoned: u32,
}

impl<A: AnalogSource, D: Delay, const K: usize> Sampler<A, D, K> {
    /// Build a sampler; fails if `config` cannot fill a window of `K`
    pub fn new(source: A, delay: D, config: SamplerConfig) -> Result<Self, ConfigError> {
        config.validate::<K>()?;

        Ok(Self {
            source,
            delay,
            config,
            detector: StabilityDetector::new(config.variance_threshold),
            window: ReadingWindow::new(),
            last_cycle_start: None,
            completed: 0,
            abandoned: 0,
        })
    }

    /// Whether a cycle would fire at `now`
    pub fn is_due(&self, now: Timestamp) -> bool {
        match self.last_cycle_start {
            None => true,
            Some(start) => {
                now.saturating_sub(start) >= u64::from(self.config.cycle_period.to_millis())
            }
        }
    }

    /// Run a cycle if one is due
    ///
    /// `Ok(None)` when the period has not elapsed yet. `Err` when the cycle
    /// was abandoned because the ADC failed.
    pub fn tick(&mut self, now: Timestamp) -> SamplingResult<Option<Cycle>> {
        if !self.is_due(now) {
            return Ok(None);
        }

        self.last_cycle_start = Some(now);

        match self.run_cycle(now) {
            Ok(cycle) => {
                self.completed = cycle.sequence;
                log_debug!(
                    "Cycle {}: last {:.3} V, mean {:.3} V, sigma {:.4} V, {:?}",
                    cycle.sequence,
                    cycle.last.volts,
                    cycle.stats.mean,
                    cycle.stats.std_dev(),
                    cycle.stability
                );
                Ok(Some(cycle))
            }
            Err(err) => {
                self.abandoned = self.abandoned.saturating_add(1);
                log_error!("Cycle abandoned: {}", err);
                Err(err)
            }
        }
    }

    fn run_cycle(&mut self, started_at: Timestamp) -> SamplingResult<Cycle> {
        self.window.clear();
        let delay_ms = self.config.inter_read_delay.to_millis();

        for i in 0..self.config.reads_per_cycle {
            if i > 0 {
                self.delay.delay_ms(delay_ms);
            }
            let reading = nb::block!(self.source.sample())?;
            self.window.push(reading);
        }

        // reads_per_cycle >= K was validated, so the window is full here
        let volts = self.window.snapshot().ok_or(SamplingError::WindowLength {
            expected: K,
            actual: self.window.len(),
        })?;
        let (stability, stats) = self.detector.evaluate(&volts);

        Ok(Cycle {
            sequence: self.completed.wrapping_add(1),
            started_at,
            last: Reading::new(volts[K - 1]),
            stability,
            stats,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Detector in use
    pub fn detector(&self) -> &StabilityDetector<K> {
        &self.detector
    }

    /// Start time of the most recent cycle, completed or abandoned
    pub fn last_cycle_start(&self) -> Option<Timestamp> {
        self.last_cycle_start
    }

    /// Cycles that produced an emission
    pub fn completed_cycles(&self) -> u32 {
        self.completed
    }

    /// Cycles dropped because of acquisition failures
    pub fn abandoned_cycles(&self) -> u32 {
        self.abandoned
    }

    /// Analog source, for inspection
    pub fn source(&self) -> &A {
        &self.source
    }

    /// Delay provider, for inspection
    pub fn delay(&self) -> &D {
        &self.delay
    }

    pub(crate) fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    struct ScriptedAdc {
        values: Vec<Result<f32, &'static str>>,
        reads: usize,
    }

    impl ScriptedAdc {
        fn new(values: &[f32]) -> Self {
            Self {
                values: values.iter().copied().map(Ok).collect(),
                reads: 0,
            }
        }
    }

    impl AnalogSource for ScriptedAdc {
        fn sample(&mut self) -> nb::Result<Reading, SamplingError> {
            let value = self.values[self.reads % self.values.len()];
            self.reads += 1;
            value
                .map(Reading::new)
                .map_err(|reason| nb::Error::Other(SamplingError::Acquisition { reason }))
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        total_ms: u64,
        calls: u32,
    }

    impl Delay for CountingDelay {
        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += u64::from(ms);
            self.calls += 1;
        }
    }

    fn sampler(values: &[f32]) -> Sampler<ScriptedAdc, CountingDelay, 5> {
        Sampler::new(ScriptedAdc::new(values), CountingDelay::default(), SamplerConfig::default())
            .unwrap()
    }

    #[test]
    fn first_tick_fires_immediately() {
        let mut sampler = sampler(&[1.0]);
        assert!(sampler.tick(0).unwrap().is_some());
        assert_eq!(sampler.source().reads, 5);
        // Four gaps between five reads
        assert_eq!(sampler.delay().calls, 4);
        assert_eq!(sampler.delay().total_ms, 200);
    }

    #[test]
    fn waits_for_period() {
        let mut sampler = sampler(&[1.0]);
        assert!(sampler.tick(100).unwrap().is_some());
        assert!(sampler.tick(101).unwrap().is_none());
        assert!(sampler.tick(1099).unwrap().is_none());
        assert!(sampler.tick(1100).unwrap().is_some());
        assert_eq!(sampler.completed_cycles(), 2);
    }

    #[test]
    fn emits_last_reading_when_noisy() {
        let mut sampler = sampler(&[0.5, 1.5, 0.2, 1.8, 0.9]);
        let cycle = sampler.tick(0).unwrap().unwrap();

        assert_eq!(cycle.stability, Stability::Unstable);
        assert_eq!(cycle.emission(), Reading::new(0.9));
    }

    #[test]
    fn window_holds_last_k_of_m_reads() {
        let config = SamplerConfig::default().reads_per_cycle(7).inter_read_delay_ms(10);
        let adc = ScriptedAdc::new(&[9.0, 9.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let mut sampler: Sampler<_, _, 5> =
            Sampler::new(adc, CountingDelay::default(), config).unwrap();

        let cycle = sampler.tick(0).unwrap().unwrap();
        // The two early outliers fall out of the window
        assert_eq!(cycle.stability, Stability::Stable);
        assert_eq!(cycle.stats.mean, 1.0);
    }

    #[test]
    fn rejects_config_that_cannot_fill_window() {
        let config = SamplerConfig::default().reads_per_cycle(4);
        let result: Result<Sampler<_, _, 5>, _> =
            Sampler::new(ScriptedAdc::new(&[1.0]), CountingDelay::default(), config);
        assert!(matches!(result, Err(ConfigError::ReadsBelowWindow { reads: 4, window: 5 })));
    }

    #[test]
    fn acquisition_failure_abandons_cycle() {
        let adc = ScriptedAdc {
            values: vec![Ok(1.0), Ok(1.0), Err("adc timeout"), Ok(1.0), Ok(1.0)],
            reads: 0,
        };
        let mut sampler: Sampler<_, _, 5> =
            Sampler::new(adc, CountingDelay::default(), SamplerConfig::default()).unwrap();

        let result = sampler.tick(0);
        assert_eq!(result, Err(SamplingError::Acquisition { reason: "adc timeout" }));
        assert_eq!(sampler.abandoned_cycles(), 1);
        assert_eq!(sampler.completed_cycles(), 0);

        // Still gated: no retry until the period elapses
        assert!(sampler.tick(500).unwrap().is_none());
    }
}
