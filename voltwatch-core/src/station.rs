//! The firmware loop
//!
//! A [`Station`] owns everything the loop touches: the sampler (with its ADC,
//! delay and window), the wall clock, and the publisher (with its store).
//! There are no globals and no locks; one control flow calls [`Station::poll`]
//! over and over.
//!
//! ```text
//! boot ─► bring_up(link)            once, bounded retries
//!   loop:
//!     poll(now)
//!       ├─ not due ─────────────────► Ok(None)
//!       └─ due
//!            ├─ refresh wall clock   (failure: reuse last time, warn)
//!            ├─ sampler.tick(now)    (ADC fault: Err, nothing published)
//!            └─ publish(last reading, time string) ─► Ok(Some(report))
//! ```

use crate::errors::{LinkError, SamplingResult};
use crate::link::{self, RetryPolicy};
use crate::publisher::{DeliveryReport, Publisher, TelemetrySample};
use crate::scheduler::{Cycle, Sampler};
use crate::time::{Freshness, TimeKeeper, TimeSource, Timestamp};
use crate::traits::{AnalogSource, Delay, Link, RemoteStore, WallClock};

/// Everything that happened in one published cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Sampler output
    pub cycle: Cycle,
    /// What was handed to the publisher
    pub sample: TelemetrySample,
    /// Per-field write outcomes
    pub delivery: DeliveryReport,
    /// Whether the time string was fresh, reused or missing
    pub freshness: Freshness,
}

/// Sampling loop wired to its collaborators
pub struct Station<A, D, C, S, const K: usize>
where
    A: AnalogSource,
    D: Delay,
    C: WallClock,
    S: RemoteStore,
{
    sampler: Sampler<A, D, K>,
    time: TimeKeeper<C>,
    publisher: Publisher<S>,
}

impl<A, D, C, S, const K: usize> Station<A, D, C, S, K>
where
    A: AnalogSource,
    D: Delay,
    C: WallClock,
    S: RemoteStore,
{
    /// Assemble a station
    pub fn new(sampler: Sampler<A, D, K>, clock: C, publisher: Publisher<S>) -> Self {
        Self {
            sampler,
            time: TimeKeeper::new(clock),
            publisher,
        }
    }

    /// Bring the network up before the first cycle
    ///
    /// Waits between attempts use the sampler's delay provider.
    pub fn bring_up<L: Link>(&mut self, link: &mut L, policy: &RetryPolicy) -> Result<u32, LinkError> {
        link::establish(link, policy, self.sampler.delay_mut())
    }

    /// One pass of the main loop
    ///
    /// Returns `Ok(None)` when no cycle was due and `Err` when a due cycle
    /// was abandoned. Neither stops the loop.
    pub fn poll(&mut self, now: Timestamp) -> SamplingResult<Option<CycleReport>> {
        if !self.sampler.is_due(now) {
            return Ok(None);
        }

        let freshness = self.time.refresh();

        let cycle = match self.sampler.tick(now)? {
            Some(cycle) => cycle,
            None => return Ok(None),
        };

        let sample = TelemetrySample {
            volts: cycle.emission().volts,
            timestamp: self.time.current().cloned(),
        };
        let delivery = self.publisher.publish(&sample);

        Ok(Some(CycleReport {
            cycle,
            sample,
            delivery,
            freshness,
        }))
    }

    /// Poll forever
    pub fn run<T: TimeSource>(&mut self, time: &T) -> ! {
        loop {
            // Failures are logged where they happen; the loop keeps going
            let _ = self.poll(time.now());
            core::hint::spin_loop();
        }
    }

    /// The sampler
    pub fn sampler(&self) -> &Sampler<A, D, K> {
        &self.sampler
    }

    /// The publisher
    pub fn publisher(&self) -> &Publisher<S> {
        &self.publisher
    }

    /// The publisher, mutably (for typed reads between cycles)
    pub fn publisher_mut(&mut self) -> &mut Publisher<S> {
        &mut self.publisher
    }

    /// The wall-clock cache
    pub fn time_keeper(&self) -> &TimeKeeper<C> {
        &self.time
    }
}
