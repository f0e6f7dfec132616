use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::RetryPolicy;

/// Exponential reconnect delay with jitter.
///
/// The ceiling doubles with every consecutive failure, starting at the
/// policy's base and capped at its maximum. Each delay is drawn from the
/// upper half of the current ceiling.
pub struct Backoff {
    policy: RetryPolicy,
    failures: u32,
    rng: StdRng,
}

impl Backoff {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_rng(policy, StdRng::from_entropy())
    }

    /// Use a fixed generator, for reproducible delays
    pub fn with_rng(policy: RetryPolicy, rng: StdRng) -> Self {
        Self {
            policy,
            failures: 0,
            rng,
        }
    }

    /// Forget past failures
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Upper bound of the next delay
    #[must_use]
    pub fn ceiling(&self) -> Duration {
        let factor = 1u32 << self.failures.min(31);
        self.policy.base.saturating_mul(factor).min(self.policy.max)
    }

    /// Delay before the next attempt
    pub fn next_delay(&mut self) -> Duration {
        let ceiling = self.ceiling();
        self.failures = self.failures.saturating_add(1);

        let half = ceiling / 2;
        #[allow(clippy::cast_possible_truncation)] // capped by the policy maximum
        let jitter_ms = self.rng.gen_range(0..=half.as_millis() as u64);
        half + Duration::from_millis(jitter_ms)
    }
}
