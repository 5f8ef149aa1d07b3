//! Poll scheduling: the fixed cadence and the optional jittered backoff.

use rand::Rng;
use std::time::Duration;

/// Default time between two poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How the delay before the next poll reacts to failed cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Always wait one interval, whatever happened to the previous cycle.
    #[default]
    Fixed,
    /// After `n` consecutive failures wait `interval * 2^n`, capped at `max_delay`,
    /// scaled by a random factor in `[0.5, 1.0]` and never shorter than `interval`.
    JitteredBackoff { max_delay: Duration },
}

impl RetryPolicy {
    pub fn next_delay(&self, interval: Duration, consecutive_failures: u32) -> Duration {
        match *self {
            RetryPolicy::Fixed => interval,
            RetryPolicy::JitteredBackoff { max_delay } => {
                if consecutive_failures == 0 {
                    return interval;
                }
                let ceiling = backoff_ceiling(interval, consecutive_failures, max_delay);
                let factor: f64 = rand::thread_rng().gen_range(0.5..=1.0);
                ceiling.mul_f64(factor).max(interval)
            }
        }
    }
}

fn backoff_ceiling(interval: Duration, consecutive_failures: u32, max_delay: Duration) -> Duration {
    let factor = 1u32 << consecutive_failures.min(16);
    interval
        .saturating_mul(factor)
        .min(max_delay.max(interval))
}

/// Settings for one tracking session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// Stop polling once a delivered snapshot (terminal stage plus `deliveredAt`) is applied.
    pub stop_on_delivered: bool,
    pub retry: RetryPolicy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            stop_on_delivered: false,
            retry: RetryPolicy::Fixed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_ignores_failures() {
        let interval = Duration::from_secs(1);
        for failures in [0, 1, 5, 100] {
            assert_eq!(RetryPolicy::Fixed.next_delay(interval, failures), interval);
        }
    }

    #[test]
    fn test_backoff_stays_within_bounds() {
        let interval = Duration::from_secs(1);
        let policy = RetryPolicy::JitteredBackoff {
            max_delay: Duration::from_secs(30),
        };

        assert_eq!(policy.next_delay(interval, 0), interval);
        for failures in 1..40 {
            let ceiling = backoff_ceiling(interval, failures, Duration::from_secs(30));
            for _ in 0..20 {
                let delay = policy.next_delay(interval, failures);
                assert!(delay >= interval, "{delay:?} below interval");
                assert!(delay <= ceiling, "{delay:?} above {ceiling:?}");
            }
        }
    }

    #[test]
    fn test_backoff_ceiling_doubles_then_caps() {
        let interval = Duration::from_secs(1);
        let max = Duration::from_secs(10);
        assert_eq!(backoff_ceiling(interval, 1, max), Duration::from_secs(2));
        assert_eq!(backoff_ceiling(interval, 3, max), Duration::from_secs(8));
        assert_eq!(backoff_ceiling(interval, 4, max), max);
        assert_eq!(backoff_ceiling(interval, u32::MAX, max), max);
        // A cap below the interval never shortens the cadence.
        assert_eq!(
            backoff_ceiling(interval, 2, Duration::from_millis(10)),
            interval
        );
    }
}
