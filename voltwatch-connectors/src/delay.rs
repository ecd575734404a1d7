//! Blocking delay on the host

use std::thread;
use std::time::Duration;

use voltwatch_core::Delay;

/// Sleeps the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn sleeps_at_least_requested() {
        let started = Instant::now();
        StdDelay.delay_ms(5);
        assert!(started.elapsed() >= Duration::from_millis(5));
    }
}
