use std::time::Duration;

use stepwise_core::api::{ExponentialBackoff, RetryConfig, RetryStrategy};

/// `min(base * retry, max)`
pub struct LinearBackoffPlugin {
    base_delay_ms: u64,
    max_delay_ms: u64,
}

/// Same delay before every retry.
pub struct FixedDelayPlugin {
    delay_ms: u64,
}

impl LinearBackoffPlugin {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }
}

impl FixedDelayPlugin {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            delay_ms: config.base_delay_ms,
        }
    }
}

impl RetryStrategy for LinearBackoffPlugin {
    fn name(&self) -> &str {
        "linear"
    }

    fn delay_for(&self, retry: u32) -> Duration {
        let delay = self.base_delay_ms.saturating_mul(retry.max(1) as u64);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }
}

impl RetryStrategy for FixedDelayPlugin {
    fn name(&self) -> &str {
        "fixed"
    }

    fn delay_for(&self, _retry: u32) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Exponential backoff from the config's base and cap.
pub fn exponential_from_config(config: &RetryConfig) -> ExponentialBackoff {
    ExponentialBackoff::new(config.base_delay_ms, config.max_delay_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(strategy: &str, base: u64, max: u64) -> RetryConfig {
        RetryConfig {
            strategy: strategy.to_string(),
            base_delay_ms: base,
            max_delay_ms: max,
        }
    }

    #[test]
    fn test_exponential_backoff() {
        let plugin = exponential_from_config(&cfg("exponential-backoff", 100, 1000));
        assert_eq!(plugin.delay_for(1).as_millis(), 100);
        assert_eq!(plugin.delay_for(2).as_millis(), 200);
        assert_eq!(plugin.delay_for(10).as_millis(), 1000);
    }

    #[test]
    fn test_linear_backoff() {
        let plugin = LinearBackoffPlugin::new(&cfg("linear", 50, 200));
        assert_eq!(plugin.delay_for(1).as_millis(), 50);
        assert_eq!(plugin.delay_for(3).as_millis(), 150);
        assert_eq!(plugin.delay_for(9).as_millis(), 200);
    }

    #[test]
    fn test_fixed_delay() {
        let plugin = FixedDelayPlugin::new(&cfg("fixed", 75, 10));
        assert_eq!(plugin.delay_for(1), plugin.delay_for(5));
        assert_eq!(plugin.delay_for(1).as_millis(), 75);
    }
}
