use std::time::Duration;

/// Reconnect backoff: a fixed base delay that doubles after every failed
/// connect attempt, capped at a configurable ceiling. There is no maximum
/// attempt count; reconnection is retried until it succeeds, because losing
/// telemetry is worse than a stalled shipper.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    base: Duration,
    ceiling: Duration,
    current: Duration,
}

impl BackoffPolicy {
    pub fn new(base: Duration, ceiling: Duration) -> Self {
        Self {
            base,
            ceiling: ceiling.max(base),
            current: base,
        }
    }

    /// The delay to sleep before the next connect attempt; doubles for the
    /// attempt after that, up to the ceiling.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.ceiling);
        delay
    }

    /// Back to the base delay, called once a connect attempt succeeds.
    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_until_the_ceiling() {
        let mut backoff = BackoffPolicy::new(Duration::from_secs(1), Duration::from_secs(5));

        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
        assert_eq!(backoff.next_delay(), Duration::from_secs(4));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
    }

    #[test]
    fn reset_returns_to_base() {
        let mut backoff = BackoffPolicy::new(Duration::from_secs(1), Duration::from_secs(60));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
    }

    #[test]
    fn ceiling_below_base_is_clamped() {
        let mut backoff = BackoffPolicy::new(Duration::from_secs(2), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
    }
}
