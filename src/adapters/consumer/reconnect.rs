//! Reconnect policy: exponential backoff with jitter and an optional
//! attempt cap.

use rand::Rng;
use std::time::Duration;

/// Fraction of the delay that jitter may add or remove.
const JITTER_FRACTION: f64 = 0.25;

/// How the consumer retries a lost subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for the un-jittered delay.
    pub max_delay: Duration,
    /// Growth factor per failed attempt. Values below 1.0 are treated as 1.0.
    pub multiplier: f64,
    /// Randomize each delay by ±25 %.
    pub jitter: bool,
    /// Give up after this many consecutive failures. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: true,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Fixed delay, no growth, no jitter.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            max_delay: delay,
            multiplier: 1.0,
            jitter: false,
            max_attempts: None,
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    fn effective_multiplier(&self) -> f64 {
        if self.multiplier.is_finite() {
            self.multiplier.max(1.0)
        } else {
            1.0
        }
    }
}

/// Retry state for one run of consecutive failures.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    attempt: u32,
    current_delay: Duration,
}

impl Backoff {
    pub fn new(policy: ReconnectPolicy) -> Self {
        let current_delay = policy.initial_delay.min(policy.max_delay);
        Self {
            policy,
            attempt: 0,
            current_delay,
        }
    }

    /// Number of retries handed out since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn exhausted(&self) -> bool {
        self.policy
            .max_attempts
            .is_some_and(|max| self.attempt >= max)
    }

    /// Forget previous failures after a successful connection.
    pub fn reset(&mut self) {
        self.attempt = 0;
        self.current_delay = self.policy.initial_delay.min(self.policy.max_delay);
    }

    /// Delay before the next attempt, or `None` once the cap is reached.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.exhausted() {
            return None;
        }
        self.attempt += 1;

        let base = self.current_delay;
        let delay = if self.policy.jitter {
            let factor = 1.0 + rand::thread_rng().gen_range(-JITTER_FRACTION..=JITTER_FRACTION);
            Duration::try_from_secs_f64(base.as_secs_f64() * factor).unwrap_or(base)
        } else {
            base
        };

        let grown = base.as_secs_f64() * self.policy.effective_multiplier();
        self.current_delay = Duration::try_from_secs_f64(grown)
            .unwrap_or(self.policy.max_delay)
            .min(self.policy.max_delay);

        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn no_jitter() -> ReconnectPolicy {
        ReconnectPolicy::default().with_jitter(false)
    }

    #[test]
    fn default_matches_documented_values() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.initial_delay, Duration::from_secs(5));
        assert_eq!(policy.max_delay, Duration::from_secs(60));
        assert_eq!(policy.multiplier, 2.0);
        assert!(policy.jitter);
        assert_eq!(policy.max_attempts, None);
    }

    #[test]
    fn delays_double_until_capped() {
        let mut backoff = Backoff::new(no_jitter());
        let delays: Vec<u64> = (0..6)
            .map(|_| backoff.next_delay().unwrap().as_secs())
            .collect();
        assert_eq!(delays, vec![5, 10, 20, 40, 60, 60]);
        assert_eq!(backoff.attempt(), 6);
    }

    #[test]
    fn reset_restarts_from_initial_delay() {
        let mut backoff = Backoff::new(no_jitter());
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut backoff = Backoff::new(no_jitter().with_max_attempts(2));
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert!(backoff.exhausted());
        assert_eq!(backoff.next_delay(), None);
    }

    #[test]
    fn fixed_policy_never_grows() {
        let mut backoff = Backoff::new(ReconnectPolicy::fixed(Duration::from_millis(20)));
        for _ in 0..10 {
            assert_eq!(backoff.next_delay(), Some(Duration::from_millis(20)));
        }
    }

    #[test]
    fn nonsense_multiplier_is_clamped() {
        let mut backoff = Backoff::new(no_jitter().with_multiplier(f64::NAN));
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(5)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(5)));

        let mut backoff = Backoff::new(no_jitter().with_multiplier(1e300));
        backoff.next_delay();
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(60)));
    }

    proptest! {
        #[test]
        fn jittered_delays_stay_in_bounds(
            initial_ms in 1u64..10_000,
            max_ms in 1u64..120_000,
            multiplier in 1.0f64..4.0,
            steps in 1usize..20,
        ) {
            let policy = ReconnectPolicy::default()
                .with_initial_delay(Duration::from_millis(initial_ms))
                .with_max_delay(Duration::from_millis(max_ms))
                .with_multiplier(multiplier);
            let mut backoff = Backoff::new(policy);

            let ceiling = Duration::from_millis(max_ms).mul_f64(1.0 + JITTER_FRACTION);
            for _ in 0..steps {
                let delay = backoff.next_delay().unwrap();
                prop_assert!(delay <= ceiling + Duration::from_millis(1));
            }
        }

        #[test]
        fn attempts_never_exceed_cap(cap in 0u32..10, tries in 0usize..30) {
            let mut backoff = Backoff::new(no_jitter().with_max_attempts(cap));
            let handed_out = (0..tries).filter_map(|_| backoff.next_delay()).count();
            prop_assert!(handed_out as u32 <= cap);
            prop_assert_eq!(handed_out, tries.min(cap as usize));
        }
    }
}
