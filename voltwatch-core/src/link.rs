//! Bounded link establishment
//!
//! Bringing the network up is a startup precondition, not part of the
//! sampling loop. The station calls [`establish`] once before the first
//! cycle; reconnection after that is the link's own business.
//!
//! Retry delay:
//! ```text
//! fixed:        delay = base
//! exponential:  delay = min(base * 2^(attempt - 1), max)
//! ```

use crate::constants::network::{LINK_MAX_ATTEMPTS, LINK_MAX_BACKOFF_MS, LINK_RETRY_DELAY_MS};
use crate::errors::LinkError;
use crate::traits::{Delay, Link};

/// How many times to try and how long to wait between tries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Attempts before giving up
    pub max_attempts: u32,
    /// Delay after the first failed attempt (ms)
    pub base_delay_ms: u32,
    /// Ceiling for any single delay (ms)
    pub max_delay_ms: u32,
    /// Double the delay after every failure
    pub exponential: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(LINK_MAX_ATTEMPTS, LINK_RETRY_DELAY_MS)
    }
}

impl RetryPolicy {
    /// Same delay between every attempt
    pub const fn fixed(max_attempts: u32, delay_ms: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: delay_ms,
            max_delay_ms: delay_ms,
            exponential: false,
        }
    }

    /// Doubling delay, capped at [`LINK_MAX_BACKOFF_MS`]
    pub const fn exponential(max_attempts: u32, base_delay_ms: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
            max_delay_ms: LINK_MAX_BACKOFF_MS,
            exponential: true,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> u32 {
        if !self.exponential {
            return self.base_delay_ms;
        }

        let shift = attempt.saturating_sub(1).min(31);
        self.base_delay_ms
            .saturating_mul(1u32 << shift)
            .min(self.max_delay_ms)
    }
}

/// Bring `link` up within the budget of `policy`
///
/// Returns the attempt number that succeeded, or 0 if the link was already
/// up. No delay follows the final failed attempt.
pub fn establish<L, D>(link: &mut L, policy: &RetryPolicy, delay: &mut D) -> Result<u32, LinkError>
where
    L: Link + ?Sized,
    D: Delay,
{
    if link.is_up() {
        return Ok(0);
    }

    for attempt in 1..=policy.max_attempts {
        match link.attempt() {
            Ok(()) => {
                log_info!("Link up after {} attempt(s)", attempt);
                return Ok(attempt);
            }
            Err(err) => {
                log_debug!("Link attempt {} failed: {}", attempt, err);
                if attempt < policy.max_attempts {
                    delay.delay_ms(policy.delay_after(attempt));
                }
            }
        }
    }

    log_error!("Failed to bring link up after {} attempts", policy.max_attempts);
    Err(LinkError::Exhausted {
        attempts: policy.max_attempts,
    })
}
